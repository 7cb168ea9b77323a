//! Core traits for the signal desk.

mod bar_source;
mod detector;
mod indicator;

pub use bar_source::BarSource;
pub use detector::Detector;
pub use indicator::{Indicator, MultiOutputIndicator};
