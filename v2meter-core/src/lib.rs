//! v2meter core library — settings, identity, traffic snapshot, errors.
//!
//! Public API surface:
//! - [`types`] — [`Identity`], [`StatsSnapshot`], [`ApiEndpoint`]
//! - [`settings`] — [`Settings`] and YAML loading
//! - [`error`] — [`SettingsError`]

pub mod error;
pub mod settings;
pub mod types;

pub use error::SettingsError;
pub use settings::Settings;
pub use types::{ApiEndpoint, Identity, StatsSnapshot};
