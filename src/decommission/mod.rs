// Decommission Module - scale-down, claim sweep and bounded wait per StatefulSet
//
// Handles are processed strictly in input order. The first failure aborts the
// whole run; nothing already scaled down or deleted is restored.

pub mod types;
pub mod claims;
pub mod errors;
pub mod wait;
pub mod orchestrator;

#[cfg(test)]
pub mod mocks;


pub use types::{WorkloadHandle, WorkloadSnapshot, HandleReport, DecommissionReport, Phase};
pub use errors::DecommissionError;
pub use orchestrator::{Decommissioner, DEFAULT_POLL_DELAY};
