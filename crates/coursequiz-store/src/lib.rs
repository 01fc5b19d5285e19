//! coursequiz-store — Persistent user data.
//!
//! Stores watched media, notes, settings and exam attempt histories in a
//! single JSON document, and loads the application configuration that says
//! where that document lives.

pub mod config;
pub mod error;
pub mod store;

pub use config::{load_config, load_config_from, CoursequizConfig};
pub use error::StoreError;
pub use store::{JsonStore, NoteRow, NoteScope};
