//! Bus observers for runtime observability.

mod log;

pub use log::LogWriter;
