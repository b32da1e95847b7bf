#![allow(clippy::collapsible_if)]

pub mod config;
pub mod core;
pub mod jmes;
pub mod logging;
pub mod services;
pub mod sql;

// Re-export commonly used types
pub use core::{
    ConnectionParams, Dataset, EngineError, PageSize, Record, SelectionWarning, TransformError,
    TransformLanguage,
};
pub use services::{PageView, RemoteSource, Session};
