//! Domain models for patient triage.

mod guidance;
mod visit;

pub use guidance::*;
pub use visit::*;
