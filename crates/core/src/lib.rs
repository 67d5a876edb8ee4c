//! Taskdeck Core Library
//!
//! Models, token persistence, configuration and chart shaping for the
//! Taskdeck client.

pub mod charts;
pub mod config;
pub mod error;
pub mod models;
pub mod storage;

pub use charts::{DashboardCharts, PieSlice, ProgressView, Series};
pub use config::{AppDirs, ClientConfig};
pub use error::{Error, Result};
pub use models::*;
pub use storage::{KeyValueStore, MemoryStore, SqliteStore, TokenStore, TOKEN_KEY};
