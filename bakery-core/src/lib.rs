//! Bakery core library — chart identity, cache keys, settings, errors.
//!
//! Public API surface:
//! - [`types`] — newtypes and domain structs
//! - [`identity`] — chart reference parsing ([`identity::resolve`])
//! - [`key`] — cache key derivation ([`key::derive_key`])
//! - [`settings`] — load / save / validate
//! - [`error`] — [`ReferenceError`], [`SettingsError`]

pub mod error;
pub mod identity;
pub mod key;
pub mod settings;
pub mod types;

pub use error::{ReferenceError, SettingsError};
pub use settings::{BakerCommand, Settings};
pub use types::{CacheKey, ChartId, ChartReference, ExportRecord};
