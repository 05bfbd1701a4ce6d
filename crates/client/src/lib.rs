//! Board API client
//!
//! Fetches the complete item and connector collections of a whiteboard,
//! following pagination, and packages them as a snapshot for the
//! conversion pipeline.

pub mod error;
pub mod miro;

pub use error::{ClientError, Result};
pub use miro::MiroClient;
