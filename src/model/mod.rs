//! Data structures exchanged with the engine and with the web form.
//!
//! Engine objects mirror the engine's JSON-LD shape (`@type`, `@id`, camelCase)
//! and implement [`EngineEntity`] so the client can read and write them by type.

pub mod calculation;
pub mod flow;
pub mod input;
pub mod process;
pub mod refs;
pub mod system;

pub use calculation::*;
pub use flow::*;
pub use input::*;
pub use process::*;
pub use refs::*;
pub use system::*;
