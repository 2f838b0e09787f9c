//! Domain layer for coachtalk
//!
//! Contains the conversation model, turn state, and the value objects shared
//! by every other crate. This layer performs no I/O.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
