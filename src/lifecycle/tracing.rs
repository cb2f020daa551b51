//! # Observability & Tracing
//!
//! [`setup_tracing`] initializes structured logging once per process. Log levels
//! come from `RUST_LOG`; the compact format hides module paths
//! (`with_target(false)`) and shows spans inline.
//!
//! ## What Gets Traced
//!
//! - **Engine Actor**: Startup, shutdown, every failed call (`warn`)
//! - **Client Operations**: One span per method with its arguments
//! - **Assessment**: Process updates, calculation readiness, decomposition
//! - **HTTP**: One span per request from `tower-http`'s `TraceLayer`
//!
//! ## Usage Examples
//!
//! ```bash
//! # Compact logs
//! RUST_LOG=info cargo run
//!
//! # Every engine request and RPC id
//! RUST_LOG=debug cargo run
//!
//! # HTTP request spans only
//! RUST_LOG=tower_http=debug cargo run
//! ```
//!
//! ## Workflow Trace Example
//!
//! **With `RUST_LOG=info`**, one `POST /ventum-acv`:
//!
//! ```text
//! INFO assess: Subsystem processes updated processes=4
//! INFO assess:decompose:calculate_product_system_impact: Calculation ready result="6f1c..."
//! INFO assess:decompose: Impacts decomposed categories=18
//! ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
