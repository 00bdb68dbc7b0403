//! Shared pieces of the blob read benchmark: logger setup and the constants
//! both the harness and its tooling agree on.

pub mod constants;
pub mod logging;

pub use logging::initialize_logger;
