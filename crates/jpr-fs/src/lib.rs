//! Filesystem layer for the Jenkins plugins resolver
//!
//! Provides the working-directory store layout, atomic writes and
//! format-agnostic document loading.

pub mod checksum;
pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod layout;

pub use config::ConfigStore;
pub use constants::StoreDir;
pub use error::{Error, Result};
pub use layout::StoreLayout;
