//! Records exchanged with the orchestration API and the query protocol.

pub mod actor;
pub mod build;
pub mod environment;
pub mod query;
pub mod tags;

pub use actor::*;
pub use build::*;
pub use environment::*;
pub use query::*;
pub use tags::*;
