//! Shared types used by both the projection and the query paths.

pub mod error;
pub mod types;

pub use error::ErrorKind;
pub use types::{Meow, MeowId};
