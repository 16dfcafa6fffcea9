//! # v2meter-config
//!
//! Runtime config generation for the supervised daemon.
//!
//! Call [`generate_runtime_config`] to read the daemon's original config,
//! inject the stats API plumbing, bind the tracked identity, and atomically
//! write the result to the runtime path. [`transform`] is the pure half.

pub mod error;
pub mod transform;
pub mod writer;

pub use error::ConfigError;
pub use transform::{transform, TransformOutcome};
pub use writer::{generate_runtime_config, RuntimeConfigReport};
