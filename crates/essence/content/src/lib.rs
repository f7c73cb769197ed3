//! Data-driven configuration for the essence engine.
//!
//! Loads [`essence_core::EssenceConfig`] from TOML so unlock levels, costs,
//! cooldowns and drain tuning can change without a rebuild. Every field in
//! the file is optional and falls back to the built-in default.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, ContentFactory, LoadResult};
