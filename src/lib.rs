//! # Tomato LCA
//!
//! > **Life-cycle assessment of open-field tomato, driven through an openLCA-style engine.**
//!
//! A questionnaire record (irrigation, pump house, fertilizers, pesticides, crop
//! management, machinery) is translated into exchange amounts on four subsystem
//! processes of a stored product system. The system is calculated once and its
//! impacts are reported per subsystem and in total.
//!
//! ## Core Concepts
//!
//! ### One owner for the engine
//! Every engine call goes through a single [`EngineActor`](framework::EngineActor).
//! It owns the connection, serves requests in order and bounds each call with a
//! timeout. Callers hold a cloneable [`EngineHandle`](framework::EngineHandle).
//!
//! ### Results are resources
//! A calculation leaves a result in engine memory until it is disposed.
//! [`CalculationResult`](clients::CalculationResult) owns that id: `dispose(self)`
//! consumes it, and dropping one that was never disposed schedules the dispose.
//!
//! ### Map first, write second
//! The record is mapped completely before the engine is touched, and all four
//! processes are staged before any is written. A missing key never leaves the
//! database half-updated.
//!
//! ## Module Tour
//!
//! ### 1. The Engine ([`framework`], [`ipc`])
//! - **Role**: The [`Engine`](framework::Engine) trait, the actor that serializes
//!   calls to it, the JSON-RPC implementation and an in-memory fake for tests.
//! - **Key items**: [`EngineActor`](framework::EngineActor),
//!   [`IpcEngine`](ipc::IpcEngine), [`FakeEngine`](framework::mock::FakeEngine).
//!
//! ### 2. The Interface ([`clients`])
//! - **Role**: Typed lookups and writes by id or name, calculation with polling.
//! - **Key items**: [`OlcaClient`](clients::OlcaClient), [`Repository`](clients::Repository).
//!
//! ### 3. The Domain ([`model`], [`mapping`], [`assessment`])
//! - **Role**: Engine object shapes, the form-to-flow tables, and the request workflow.
//! - **Key items**: [`AssessmentService`](assessment::AssessmentService),
//!   [`map_subsystems`](mapping::map_subsystems).
//!
//! ### 4. The Outside ([`server`], [`config`], [`lifecycle`])
//! - **Role**: HTTP routes, `LCA_*` settings, startup and shutdown.
//! - **Key items**: [`router`](server::router), [`LcaConfig`](config::LcaConfig),
//!   [`LcaSystem`](lifecycle::LcaSystem).
//!
//! ## Quick Start
//!
//! ```bash
//! # Serve against an engine on localhost:8080
//! RUST_LOG=info cargo run
//!
//! # Build and calculate the sandwich model without an engine
//! cargo run --bin sandwich-demo -- --fake
//! ```

pub mod assessment;
pub mod clients;
pub mod config;
pub mod framework;
pub mod ipc;
pub mod lifecycle;
pub mod mapping;
pub mod model;
pub mod server;
