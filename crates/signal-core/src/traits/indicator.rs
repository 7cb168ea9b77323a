//! Indicator trait definitions.

/// Trait for technical indicators.
///
/// Indicators process price data and produce a derived series aligned
/// one-to-one with the input. Positions before the warm-up are `f64::NAN`
/// so that consumers can tell "no opinion yet" apart from a real zero.
pub trait Indicator: Send + Sync {
    /// The output type of the indicator.
    type Output;

    /// Calculate indicator values for the given data.
    ///
    /// # Arguments
    /// * `data` - Input data (typically prices)
    ///
    /// # Returns
    /// A vector with exactly `data.len()` values
    fn calculate(&self, data: &[f64]) -> Vec<Self::Output>;

    /// Number of data points needed before the first defined value.
    fn period(&self) -> usize;

    /// Get the name of the indicator.
    fn name(&self) -> &str;

    /// Check whether `available` points are enough for a defined value.
    fn is_ready(&self, available: usize) -> bool {
        available >= self.period()
    }
}

/// Multi-output indicator (e.g., Bollinger Bands, MACD).
///
/// Some indicators produce multiple related values per bar.
pub trait MultiOutputIndicator: Send + Sync {
    /// The output type containing multiple aligned series.
    type Outputs;

    /// Calculate indicator values for the given data.
    fn calculate(&self, data: &[f64]) -> Self::Outputs;

    /// Number of data points needed before the first defined value.
    fn period(&self) -> usize;

    /// Get the name of the indicator.
    fn name(&self) -> &str;
}
