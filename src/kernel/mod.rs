//! Headless outline core (document controller + command dispatch).

pub mod dispatch;
pub mod document;
pub mod services;

pub use dispatch::{dispatch, DispatchResult};
pub use document::{Document, DocumentError};
