//! Application wiring
//!
//! Configuration types and loading, plus provider construction.

pub mod config;
pub mod loader;
pub mod providers;

pub use config::AppConfig;
pub use loader::load_config;
pub use providers::make_provider;
