//! Typed wrappers around the [`EngineHandle`](crate::framework::EngineHandle).

pub mod calculation;
pub mod olca_client;
pub mod repository;

pub use calculation::*;
pub use olca_client::*;
pub use repository::*;
