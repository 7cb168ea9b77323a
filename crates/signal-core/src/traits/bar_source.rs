//! Bar source trait definition.

use crate::error::DataError;
use crate::types::{BarSeries, Timeframe};
use async_trait::async_trait;

/// Trait for anything that can supply an ordered bar series.
///
/// The exchange fetcher lives outside this workspace; implementations here
/// read bars that were already fetched.
#[async_trait]
pub trait BarSource: Send + Sync {
    /// Fetch the most recent `limit` bars for `symbol`, oldest first.
    ///
    /// # Arguments
    /// * `symbol` - The instrument to fetch
    /// * `timeframe` - The bar interval
    /// * `limit` - Maximum number of bars (0 = all available)
    async fn get_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<BarSeries, DataError>;

    /// Get the source name.
    fn name(&self) -> &str;
}
