//! Engine access framework.
//!
//! This module provides the building blocks for talking to the calculation engine
//! from many concurrent tasks through one owned connection.
//!
//! # Main Components
//!
//! - [`Engine`] - Trait the engine connection implements
//! - [`EngineActor`] - Task that owns the connection and serializes calls
//! - [`EngineHandle`] - Cloneable sender used by everything else
//! - [`EngineError`] - Common error type
//!
//! # Testing
//!
//! See [`mock`] for an in-memory engine and [`fixtures`] for a seeded tomato model.

pub mod actor;
pub mod client;
pub mod engine;
pub mod error;
pub mod fixtures;
pub mod message;
pub mod mock;

pub use actor::EngineActor;
pub use client::EngineHandle;
pub use engine::{decode, decode_entity, Engine};
pub use error::EngineError;
pub use message::{EngineRequest, Response};
