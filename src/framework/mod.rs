//! Generic service framework for the in-memory collaborators.
//!
//! # Main Components
//!
//! - [`Backend`] - Trait implemented by the state a service owns
//! - [`ServiceActor`] - Request loop that owns a backend
//! - [`ServiceClient`] - Cloneable handle used to talk to a service
//! - [`UpstreamError`] - What a caller sees when a service fails
//!
//! # Testing
//!
//! See [`mock`] module for scripting a service without running a backend.

pub mod core;
pub mod error;
pub mod mock;

pub use self::core::*;
pub use self::error::UpstreamError;
