//! UI layer for desktop GUI: the token manager window.

pub mod app;

pub use app::{PersistedSettings, TokenManagerApp, SETTINGS_STORAGE_KEY};
