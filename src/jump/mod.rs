//! Jump detection over the vertical acceleration magnitude.

mod hsm;
#[cfg(test)]
mod tests;
mod types;

pub use hsm::JumpDetector;
pub use types::{JumpEvent, JumpPhase, JumpTrace, Landing};
