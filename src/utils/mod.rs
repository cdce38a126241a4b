/// Utility functions
pub mod logging;

pub use logging::{init_logging, TracingObserver};
