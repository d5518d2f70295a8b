pub mod config;
pub mod manager;

#[cfg(test)]
mod tests;

pub use config::{resolve_api_key, Settings, API_KEY_ENV, FALLBACK_API_KEY_ENV};
pub use manager::SettingsManager;
