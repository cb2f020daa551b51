//! # System Lifecycle
//!
//! Starting, wiring and stopping the engine actor.
//!
//! 1. **Actor Creation** - [`LcaSystem::start`] wraps any [`Engine`](crate::framework::Engine)
//!    in an actor; [`LcaSystem::connect`] does so for the IPC endpoint from the config.
//! 2. **Dependency Wiring** - the client and the assessment service share the actor's handle.
//! 3. **Graceful Shutdown** - [`LcaSystem::shutdown`] closes the channel and joins the task.
//! 4. **Observability Setup** - [`setup_tracing`].

pub mod system;
pub mod tracing;

pub use self::system::LcaSystem;
pub use self::tracing::setup_tracing;
