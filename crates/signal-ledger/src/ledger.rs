//! Position ledger.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use signal_core::error::LedgerError;
use signal_core::types::{Position, PositionStatus, Side, SignalLevel};
use tracing::{info, warn};
use uuid::Uuid;

use crate::store::{PositionBook, PositionStore};

/// Trade statistics over one instrument or the whole book.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerStatistics {
    pub total_trades: usize,
    pub open_trades: usize,
    pub closed_trades: usize,
    /// Closed trades with a positive profit
    pub win_trades: usize,
    pub loss_trades: usize,
    /// Wins as a percentage of closed trades
    pub win_rate: f64,
    pub total_profit: f64,
    pub avg_profit_per_trade: f64,
}

/// Real positions per instrument, persisted after every change.
///
/// Mutations are applied to a copy of the book, which is saved and only then
/// swapped in. A failed save leaves the ledger exactly as it was.
pub struct PositionLedger<S: PositionStore> {
    store: S,
    book: PositionBook,
    max_holding_days: u32,
}

impl<S: PositionStore> PositionLedger<S> {
    /// Load the ledger from `store`. An unreadable store starts an empty book.
    pub fn open(store: S, max_holding_days: u32) -> Self {
        let book = match store.load() {
            Ok(book) => book,
            Err(e) => {
                warn!(error = %e, "Position store unreadable, starting with an empty ledger");
                PositionBook::new()
            }
        };

        info!(
            instruments = book.len(),
            open = book.values().flatten().filter(|p| p.is_open()).count(),
            max_holding_days,
            "Position ledger loaded"
        );

        Self {
            store,
            book,
            max_holding_days,
        }
    }

    pub fn max_holding_days(&self) -> u32 {
        self.max_holding_days
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Every position recorded for `instrument`, oldest first.
    pub fn positions(&self, instrument: &str) -> &[Position] {
        self.book.get(instrument).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every position, open or closed, for one instrument or all of them.
    pub fn all_positions(&self, instrument: Option<&str>) -> Vec<&Position> {
        self.select(instrument).collect()
    }

    /// Open positions, for one instrument or all of them.
    pub fn open_positions(&self, instrument: Option<&str>) -> Vec<&Position> {
        self.select(instrument).filter(|p| p.is_open()).collect()
    }

    pub fn open_position(
        &mut self,
        instrument: &str,
        side: Side,
        price: f64,
        strength: f64,
        level: SignalLevel,
    ) -> Result<Position, LedgerError> {
        self.open_position_at(instrument, side, price, strength, level, Utc::now())
    }

    /// Open a position at `price`. Fails if `instrument` already has one open.
    pub fn open_position_at(
        &mut self,
        instrument: &str,
        side: Side,
        price: f64,
        strength: f64,
        level: SignalLevel,
        now: DateTime<Utc>,
    ) -> Result<Position, LedgerError> {
        check_price(price)?;

        if let Some(existing) = self.positions(instrument).iter().find(|p| p.is_open()) {
            return Err(LedgerError::AlreadyOpen {
                instrument: instrument.to_string(),
                id: existing.id.clone(),
            });
        }

        let position = Position {
            id: format!("{}-{}", instrument, Uuid::new_v4()),
            instrument: instrument.to_string(),
            side,
            entry_price: price,
            entry_time: now,
            exit_price: None,
            exit_time: None,
            strength_at_entry: strength,
            level_at_entry: level,
            status: PositionStatus::Open,
            profit_loss: None,
            profit_loss_pct: None,
            holding_days: None,
        };

        let mut book = self.book.clone();
        book.entry(instrument.to_string())
            .or_default()
            .push(position.clone());
        self.commit(book)?;

        info!(
            instrument,
            id = %position.id,
            side = %side,
            price,
            strength,
            level = %level,
            "Position opened"
        );
        Ok(position)
    }

    pub fn close_position(
        &mut self,
        instrument: &str,
        price: f64,
        id: Option<&str>,
        forced: bool,
    ) -> Result<Vec<Position>, LedgerError> {
        self.close_position_at(instrument, price, id, forced, Utc::now())
    }

    /// Close the open position `id`, or every open position when `id` is `None`.
    ///
    /// Returns the closed positions. Closing nothing is not an error unless a
    /// specific id was asked for.
    pub fn close_position_at(
        &mut self,
        instrument: &str,
        price: f64,
        id: Option<&str>,
        forced: bool,
        now: DateTime<Utc>,
    ) -> Result<Vec<Position>, LedgerError> {
        check_price(price)?;

        let matching = |p: &Position| p.is_open() && id.map_or(true, |id| p.id == id);
        if !self.positions(instrument).iter().any(matching) {
            return match id {
                Some(id) => Err(LedgerError::PositionNotFound {
                    instrument: instrument.to_string(),
                    id: id.to_string(),
                }),
                None => Ok(Vec::new()),
            };
        }

        let mut book = self.book.clone();
        let mut closed = Vec::new();
        if let Some(positions) = book.get_mut(instrument) {
            for position in positions.iter_mut().filter(|p| matching(&**p)) {
                settle(position, price, forced, now);
                closed.push(position.clone());
            }
        }
        self.commit(book)?;

        for position in &closed {
            info!(
                instrument,
                id = %position.id,
                exit_price = price,
                profit_loss = position.profit_loss,
                profit_loss_pct = position.profit_loss_pct,
                holding_days = position.holding_days,
                forced,
                "Position closed"
            );
        }
        Ok(closed)
    }

    pub fn check_forced_close(
        &mut self,
        instrument: &str,
        current_price: f64,
    ) -> Result<Vec<Position>, LedgerError> {
        self.check_forced_close_at(instrument, current_price, Utc::now())
    }

    /// Force-close every open position held for at least the maximum number
    /// of whole days.
    pub fn check_forced_close_at(
        &mut self,
        instrument: &str,
        current_price: f64,
        now: DateTime<Utc>,
    ) -> Result<Vec<Position>, LedgerError> {
        check_price(current_price)?;

        let limit = i64::from(self.max_holding_days);
        let expired = |p: &Position| p.is_open() && p.age_days(now) >= limit;
        if !self.positions(instrument).iter().any(expired) {
            return Ok(Vec::new());
        }

        let mut book = self.book.clone();
        let mut closed = Vec::new();
        if let Some(positions) = book.get_mut(instrument) {
            for position in positions.iter_mut().filter(|p| expired(&**p)) {
                settle(position, current_price, true, now);
                closed.push(position.clone());
            }
        }
        self.commit(book)?;

        for position in &closed {
            warn!(
                instrument,
                id = %position.id,
                holding_days = position.holding_days,
                max_holding_days = self.max_holding_days,
                profit_loss_pct = position.profit_loss_pct,
                "Position force-closed after maximum holding period"
            );
        }
        Ok(closed)
    }

    /// Statistics for one instrument, or the whole book when `None`.
    pub fn statistics(&self, instrument: Option<&str>) -> LedgerStatistics {
        let mut stats = LedgerStatistics::default();

        for position in self.select(instrument) {
            stats.total_trades += 1;
            if position.is_open() {
                stats.open_trades += 1;
                continue;
            }

            stats.closed_trades += 1;
            let pnl = position.profit_loss.unwrap_or(0.0);
            stats.total_profit += pnl;
            if pnl > 0.0 {
                stats.win_trades += 1;
            } else {
                stats.loss_trades += 1;
            }
        }

        if stats.closed_trades > 0 {
            let closed = stats.closed_trades as f64;
            stats.win_rate = stats.win_trades as f64 / closed * 100.0;
            stats.avg_profit_per_trade = stats.total_profit / closed;
        }
        stats
    }

    fn select(&self, instrument: Option<&str>) -> Box<dyn Iterator<Item = &Position> + '_> {
        match instrument {
            Some(instrument) => Box::new(self.positions(instrument).iter()),
            None => Box::new(self.book.values().flatten()),
        }
    }

    fn commit(&mut self, book: PositionBook) -> Result<(), LedgerError> {
        self.store.save(&book)?;
        self.book = book;
        Ok(())
    }
}

fn check_price(price: f64) -> Result<(), LedgerError> {
    if price.is_finite() && price > 0.0 {
        Ok(())
    } else {
        Err(LedgerError::InvalidPrice(price))
    }
}

fn settle(position: &mut Position, price: f64, forced: bool, now: DateTime<Utc>) {
    let pnl = position.pnl_at(price);

    position.exit_price = Some(price);
    position.exit_time = Some(now);
    position.profit_loss = Some(pnl);
    position.profit_loss_pct = Some(pnl / position.entry_price * 100.0);
    position.holding_days = Some(position.age_days(now));
    position.status = if forced {
        PositionStatus::ForcedClosed
    } else {
        PositionStatus::Closed
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{JsonFileStore, MemoryStore};
    use chrono::{Duration, TimeZone};
    use std::fs;
    use std::path::PathBuf;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 8, 0, 0).unwrap()
    }

    fn ledger() -> PositionLedger<MemoryStore> {
        PositionLedger::open(MemoryStore::new(), 7)
    }

    struct FailingStore;

    impl PositionStore for FailingStore {
        fn load(&self) -> Result<PositionBook, LedgerError> {
            Ok(PositionBook::new())
        }

        fn save(&mut self, _book: &PositionBook) -> Result<(), LedgerError> {
            Err(LedgerError::Persist {
                path: PathBuf::from("/unwritable/positions.json"),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            })
        }
    }

    #[test]
    fn test_open_and_close_long() {
        let mut ledger = ledger();
        let opened = ledger
            .open_position_at("AR/USDT", Side::Long, 5.50, 0.72, SignalLevel::Medium, t0())
            .unwrap();

        assert!(opened.id.starts_with("AR/USDT-"));
        assert_eq!(ledger.open_positions(Some("AR/USDT")).len(), 1);

        let closed = ledger
            .close_position_at("AR/USDT", 5.05, None, false, t0() + Duration::days(3))
            .unwrap();
        assert_eq!(closed.len(), 1);

        let pos = &closed[0];
        assert_eq!(pos.status, PositionStatus::Closed);
        assert!((pos.profit_loss.unwrap() + 0.45).abs() < 1e-9);
        assert!((pos.profit_loss_pct.unwrap() + 8.1818).abs() < 1e-3);
        assert_eq!(pos.holding_days, Some(3));

        let stats = ledger.statistics(Some("AR/USDT"));
        assert_eq!(stats.closed_trades, 1);
        assert_eq!(stats.loss_trades, 1);
        assert_eq!(stats.win_rate, 0.0);
    }

    #[test]
    fn test_short_pnl_is_mirrored() {
        let mut ledger = ledger();
        ledger
            .open_position_at("X", Side::Short, 10.0, 0.5, SignalLevel::Weak, t0())
            .unwrap();
        let closed = ledger.close_position_at("X", 9.0, None, false, t0()).unwrap();

        assert!((closed[0].profit_loss.unwrap() - 1.0).abs() < 1e-12);
        assert!((closed[0].profit_loss_pct.unwrap() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_second_open_is_rejected() {
        let mut ledger = ledger();
        let first = ledger
            .open_position_at("X", Side::Long, 1.0, 0.9, SignalLevel::Strong, t0())
            .unwrap();
        let err = ledger
            .open_position_at("X", Side::Long, 1.1, 0.9, SignalLevel::Strong, t0())
            .unwrap_err();

        match err {
            LedgerError::AlreadyOpen { id, .. } => assert_eq!(id, first.id),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(ledger.positions("X").len(), 1);

        // Other instruments are independent
        assert!(ledger
            .open_position_at("Y", Side::Long, 1.0, 0.9, SignalLevel::Strong, t0())
            .is_ok());
    }

    #[test]
    fn test_close_by_id() {
        let mut ledger = ledger();
        let pos = ledger
            .open_position_at("X", Side::Long, 2.0, 0.6, SignalLevel::Medium, t0())
            .unwrap();

        let err = ledger
            .close_position_at("X", 2.5, Some("X-missing"), false, t0())
            .unwrap_err();
        assert!(matches!(err, LedgerError::PositionNotFound { .. }));

        let closed = ledger
            .close_position_at("X", 2.5, Some(&pos.id), false, t0())
            .unwrap();
        assert_eq!(closed[0].id, pos.id);
        assert!(ledger.open_positions(None).is_empty());
    }

    #[test]
    fn test_close_without_open_is_noop() {
        let mut ledger = ledger();
        assert!(ledger.close_position_at("X", 1.0, None, false, t0()).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_price() {
        let mut ledger = ledger();
        for price in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = ledger
                .open_position_at("X", Side::Long, price, 0.5, SignalLevel::Weak, t0())
                .unwrap_err();
            assert!(matches!(err, LedgerError::InvalidPrice(_)));
        }
        assert!(ledger.positions("X").is_empty());
    }

    #[test]
    fn test_forced_close_boundary() {
        let mut ledger = ledger();
        ledger
            .open_position_at("X", Side::Long, 4.0, 0.7, SignalLevel::Medium, t0())
            .unwrap();

        // Six days and 23 hours is still six whole days
        let almost = t0() + Duration::days(7) - Duration::hours(1);
        assert!(ledger.check_forced_close_at("X", 4.2, almost).unwrap().is_empty());

        let closed = ledger
            .check_forced_close_at("X", 4.2, t0() + Duration::days(7))
            .unwrap();
        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].status, PositionStatus::ForcedClosed);
        assert_eq!(closed[0].holding_days, Some(7));

        let stats = ledger.statistics(None);
        assert_eq!(stats.win_trades, 1);
        assert_eq!(stats.win_rate, 100.0);
    }

    #[test]
    fn test_statistics_across_instruments() {
        let mut ledger = ledger();
        ledger.open_position_at("A", Side::Long, 10.0, 0.7, SignalLevel::Medium, t0()).unwrap();
        ledger.close_position_at("A", 12.0, None, false, t0()).unwrap();
        ledger.open_position_at("A", Side::Long, 10.0, 0.7, SignalLevel::Medium, t0()).unwrap();
        ledger.open_position_at("B", Side::Long, 5.0, 0.7, SignalLevel::Medium, t0()).unwrap();
        ledger.close_position_at("B", 4.0, None, false, t0()).unwrap();

        let all = ledger.statistics(None);
        assert_eq!(all.total_trades, 3);
        assert_eq!(all.open_trades, 1);
        assert_eq!(all.closed_trades, 2);
        assert_eq!(all.win_trades, 1);
        assert_eq!(all.loss_trades, 1);
        assert!((all.win_rate - 50.0).abs() < 1e-12);
        assert!((all.total_profit - 1.0).abs() < 1e-12);
        assert!((all.avg_profit_per_trade - 0.5).abs() < 1e-12);

        assert_eq!(ledger.statistics(Some("B")).total_trades, 1);
        assert_eq!(ledger.all_positions(Some("A")).len(), 2);
        assert_eq!(ledger.all_positions(None).len(), 3);
        assert_eq!(ledger.statistics(Some("C")), LedgerStatistics::default());
    }

    #[test]
    fn test_position_views_outlive_instrument_name() {
        let mut ledger = ledger();
        ledger.open_position_at("A", Side::Long, 10.0, 0.7, SignalLevel::Medium, t0()).unwrap();

        let open = {
            let name = String::from("A");
            ledger.open_positions(Some(&name))
        };
        let all = {
            let name = String::from("A");
            ledger.all_positions(Some(name.as_str()))
        };
        assert_eq!(open.len(), 1);
        assert_eq!(all[0].id, open[0].id);
        assert!(ledger.open_positions(Some("missing")).is_empty());
    }

    #[test]
    fn test_persist_failure_leaves_memory_unchanged() {
        let mut ledger = PositionLedger::open(FailingStore, 7);
        let err = ledger
            .open_position_at("X", Side::Long, 1.0, 0.5, SignalLevel::Weak, t0())
            .unwrap_err();

        assert!(matches!(err, LedgerError::Persist { .. }));
        assert!(ledger.positions("X").is_empty());
    }

    #[test]
    fn test_reload_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("positions.json");

        let mut ledger = PositionLedger::open(JsonFileStore::new(&path), 7);
        let pos = ledger
            .open_position_at("AR/USDT", Side::Long, 5.5, 0.8, SignalLevel::Strong, t0())
            .unwrap();

        let reloaded = PositionLedger::open(JsonFileStore::new(&path), 7);
        assert_eq!(reloaded.positions("AR/USDT"), &[pos][..]);
    }

    #[test]
    fn test_corrupt_store_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("positions.json");
        fs::write(&path, "[[[").unwrap();

        let mut ledger = PositionLedger::open(JsonFileStore::new(&path), 7);
        assert!(ledger.open_positions(None).is_empty());

        // The next save replaces the corrupt file
        ledger
            .open_position_at("X", Side::Long, 1.0, 0.5, SignalLevel::Weak, t0())
            .unwrap();
        assert_eq!(JsonFileStore::new(&path).load().unwrap().len(), 1);
    }
}
