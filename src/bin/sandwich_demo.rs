//! # Sandwich Package Demo
//!
//! Builds a four-process model from scratch through the client and calculates it:
//! electricity, aluminium, aluminium foil and a sandwich package, linked by their
//! product flows.
//!
//! ```bash
//! # Against the engine configured by LCA_IPC_HOST / LCA_IPC_PORT
//! cargo run --bin sandwich-demo
//!
//! # Against the in-memory engine
//! cargo run --bin sandwich-demo -- --fake
//! ```

use anyhow::Context;
use tomato_lca::clients::{OlcaClient, ProcessCreate};
use tomato_lca::config::LcaConfig;
use tomato_lca::framework::mock::FakeEngine;
use tomato_lca::lifecycle::{setup_tracing, LcaSystem};
use tomato_lca::model::{ImpactEntry, ImpactMethod, Ref, RefType};
use tracing::{info, Instrument};

/// Product flows with their flow property.
const PRODUCTS: [(&str, &str); 4] = [
    ("electricity", "Energy"),
    ("aluminium", "Mass"),
    ("aluminium foil", "Mass"),
    ("sandwich package", "Number of items"),
];

/// Elementary flows with their flow property.
const INTERVENTIONS: [(&str, &str); 4] = [
    ("bauxite", "Mass"),
    ("crude oil", "Mass"),
    ("CO2", "Mass"),
    ("solid waste", "Mass"),
];

const PROCESSES: [&str; 4] = [
    "electricity production",
    "aluminium production",
    "aluminium foil production",
    "sandwich package production",
];

/// Rows are product flows, columns are processes. Negative is an input.
const TECHNOSPHERE: [[f64; 4]; 4] = [
    [1.0, -50.0, -1.0, 0.0],
    [-0.01, 1.0, -1.0, 0.0],
    [0.0, 0.0, 1.0, -1.0],
    [0.0, 0.0, 0.0, 100.0],
];

/// Rows are elementary flows, columns are processes.
const INTERVENTION_MATRIX: [[f64; 4]; 4] = [
    [0.0, -5.0, 0.0, 0.0],
    [-0.5, 0.0, 0.0, 0.0],
    [3.0, 0.0, 0.0, 0.0],
    [2.0, 10.0, 0.0, 1.0],
];

async fn seed(client: &OlcaClient) -> anyhow::Result<String> {
    for (group, unit) in [
        ("Mass units", "kg"),
        ("Energy units", "MJ"),
        ("Counting units", "Item(s)"),
    ] {
        client.add_unit_group(group, unit).await?;
    }
    for (property, group) in [
        ("Mass", "Mass units"),
        ("Energy", "Energy units"),
        ("Number of items", "Counting units"),
    ] {
        client.add_flow_property(property, group).await?;
    }
    for (flow, property) in PRODUCTS {
        client.add_product_flow(flow, property).await?;
    }
    for (flow, property) in INTERVENTIONS {
        client.add_elementary_flow(flow, property).await?;
    }

    let mut last = None;
    for (column, name) in PROCESSES.iter().enumerate() {
        let mut params = ProcessCreate::new(*name).reference(PRODUCTS[column].0);
        for (row, (flow, _)) in PRODUCTS.iter().enumerate() {
            params = params.product(*flow, TECHNOSPHERE[row][column]);
        }
        for (row, (flow, _)) in INTERVENTIONS.iter().enumerate() {
            params = params.elementary(*flow, INTERVENTION_MATRIX[row][column]);
        }
        let process = client.add_process(params).await?;
        last = Some(process.id);
    }
    last.context("no process created")
}

/// A small method so the in-memory engine has categories to report.
fn demo_method(id: &str) -> ImpactMethod {
    ImpactMethod {
        id: id.to_string(),
        name: "Demo method".to_string(),
        description: None,
        impact_categories: vec![
            Ref::new(RefType::ImpactCategory, "gwp")
                .with_name("Climate change")
                .with_ref_unit("kg CO2 eq"),
            Ref::new(RefType::ImpactCategory, "waste")
                .with_name("Solid waste")
                .with_ref_unit("kg"),
        ],
        extra: Default::default(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_tracing();

    let config = LcaConfig::from_env()?;
    let fake = std::env::args().any(|arg| arg == "--fake");
    let system = if fake {
        let engine = FakeEngine::new();
        engine.insert(&demo_method(&config.impact_method_id));
        LcaSystem::start(engine, &config)
    } else {
        LcaSystem::connect(&config)?
    };
    info!(fake, "Starting sandwich demo");

    let package = seed(&system.client)
        .instrument(tracing::info_span!("seeding"))
        .await?;
    info!(process = %package, "Model seeded");

    let result = system
        .client
        .calculate_process_impact(&package, &config.impact_method_id, 10.0)
        .instrument(tracing::info_span!("calculation"))
        .await?;
    let impacts = result.total_impacts().await;
    result.dispose().await?;

    for entry in impacts?.into_iter().map(ImpactEntry::from) {
        info!(category = %entry.category, amount = entry.amount, unit = %entry.unit, "Impact");
    }

    system.shutdown().await.map_err(anyhow::Error::msg)?;
    Ok(())
}
