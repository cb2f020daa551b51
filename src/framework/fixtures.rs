//! A seeded tomato model for the [`FakeEngine`].
//!
//! Mirrors the layout of the production database: four subsystem processes, each
//! with the exchanges the flow-mapping tables address, feeding a root `Tomate`
//! process, plus the `TOMATE` product system and the default impact method.

use std::collections::BTreeMap;

use super::mock::FakeEngine;
use crate::config::{DEFAULT_IMPACT_METHOD_ID, DEFAULT_PRODUCT_SYSTEM};
use crate::model::refs::new_id;
use crate::model::{
    EngineEntity, Flow, FlowProperty, FlowType, ImpactMethod, Process, ProductSystem, Ref,
    RefType, UnitGroup,
};

const FERTILIZERS: ProcessSpec = ProcessSpec {
    name: "Fertilizantes T",
    inputs: &[
        "Ammonium nitrate phosphate, as N, at regional storehouse {RER}",
        "Ammonium nitrate phosphate, as P2O5, at regional storehouse {RER}",
        "Diesel, burned in agricultural machine {CH}",
        "Potassium nitrate, as K2O, at regional storehouse {RER}",
    ],
    outputs: &[
        "Fertilizantes T",
        "Ammonia",
        "Dinitrogen monoxide",
        "Nitrate",
        "Nitrogen oxides, ES",
    ],
};

const CROP_MANAGEMENT: ProcessSpec = ProcessSpec {
    name: "Manejo de cultivo T",
    inputs: &[
        "Agricultural machinery, general, production {CH}",
        "Agricultural machinery, tillage, production {CH}",
        "Application of plant protection products, by field sprayer {CH}",
        "Combine harvesting {CH}",
        "Diesel, burned in agricultural machine {CH}",
        "Diesel, burned in agricultural machine {CH}",
        "Harvester, production {CH}",
        "Planting {CH}",
        "Tillage, cultivating, chiselling {CH}",
        "Tillage, harrowing, by rotary harrow {CH}",
        "Tractor, production {CH}",
        "xx Tillage, rotary cultivator {CH}",
        "Occupation, annual crop, irrigated",
        "Transformation, to annual crop, irrigated",
        "Water, unspecified natural origin, ES",
    ],
    outputs: &["Manejo de cultivo T"],
};

const PESTICIDES: ProcessSpec = ProcessSpec {
    name: "Pesticidas T",
    inputs: &[
        "Acetamide-anillide-compounds, at regional storehouse {RER}",
        "Cyclic N-compounds, at regional storehouse {RER}",
        "Dinitroaniline-compounds, at regional storehouse {RER}",
        "Glyphosate, at regional storehouse {RER}",
        "Metolachlor, at regional storehouse {RER}",
        "Nitrile-compounds, at regional storehouse {RER}",
        "Organophosphorus-compounds, at regional storehouse {RER}",
        "Pendimethalin, at regional storage {RER}",
        "Pesticide unspecified, at regional storehouse {RER}",
        "Phenoxy-compounds, at regional storehouse {RER}",
        "Pyretroid-compounds, at regional storehouse {RER}",
        "Triazine-compounds, at regional storehouse {RER}",
        "xx Captan, at regional storage {RER}",
        "xx Diazole-compounds, at regional storehouse {RER}",
        "xx Folpet, at regional storage {RER}",
        "xx Pyridine-compounds, at regional storehouse {RER}",
    ],
    outputs: &[
        "Pesticidas T",
        "Pendimethalin, at regional storage {RER}",
        "Chlorpyrifos",
        "Metalaxyl-M",
        "Imidacloprid",
        "Alpha-cypermethrin",
        "Abamectin",
        "Folpet",
        "PYRIDINE",
        "Pesticides, unspecified",
        "Tebuconazole",
        "Metribuzin",
        "Lambda-cyhalothrin",
        "Pendimethalin",
    ],
};

const IRRIGATION: ProcessSpec = ProcessSpec {
    name: "Sistema de riego T",
    inputs: &[
        "Water, well, RER",
        "Steel, low alloyed, secondary production (100% Rec.) {CH}",
        "Steel product manufacturing, average metal working {RER}",
        "Polypropylene, granulate, at plant {RER}",
        "Stretch blow moulding {RER}",
        "Extrusion, plastic pipes {RER}",
        "Polystyrene, expandable, at plant {RER}",
        "Polyvinylchloride, emulsion polymerised, at plant {RER}",
        "Tractor, production {CH}",
        "Diesel, burned in agricultural machine {CH}",
        "Transport, freight, lorry, 7.5t-16t gross weight, fleet average {RER}",
        "Polyethylene, HDPE, granulate, at plant {RER}",
        "Electricity, low voltage, production from oil, at grid {CH}",
    ],
    outputs: &[
        "Sistema de riego T",
        "xx Recycling PVC {RER}",
        "xx Recycling PP {RER}",
        "xx Recycling PE {RER}",
        "Recycling steel and iron {RER}",
    ],
};

struct ProcessSpec {
    name: &'static str,
    inputs: &'static [&'static str],
    outputs: &'static [&'static str],
}

/// Ids of everything [`seed_tomato_system`] stored.
#[derive(Debug, Clone)]
pub struct TomatoFixture {
    pub fertilizers: Ref,
    pub crop_management: Ref,
    pub pesticides: Ref,
    pub irrigation: Ref,
    pub root: Ref,
    pub system: Ref,
    pub method: Ref,
}

struct Seeder<'a> {
    engine: &'a FakeEngine,
    mass: FlowProperty,
    flows: BTreeMap<&'static str, Flow>,
}

impl Seeder<'_> {
    fn flow(&mut self, name: &'static str) -> Flow {
        let flow_type = if name.contains("Recycling") {
            FlowType::WasteFlow
        } else if name.contains('{') || name.ends_with(" T") || name == "Tomate" {
            FlowType::ProductFlow
        } else {
            FlowType::ElementaryFlow
        };
        let engine = self.engine;
        let mass = &self.mass;
        self.flows
            .entry(name)
            .or_insert_with(|| {
                let flow = Flow::new(name, flow_type, mass);
                engine.insert(&flow);
                flow
            })
            .clone()
    }

    /// Every exchange starts at 1.0 so an unmapped one shows up in the totals.
    fn process(&mut self, spec: &ProcessSpec) -> Process {
        let mut process = Process::new(spec.name);
        process.category = Some("Tomate".to_string());
        for name in spec.inputs {
            let flow = self.flow(name);
            process.add_input(&flow, 1.0);
        }
        for name in spec.outputs {
            let flow = self.flow(name);
            let exchange = process.add_output(&flow, 1.0);
            exchange.is_quantitative_reference = *name == spec.name;
        }
        self.engine.insert(&process);
        process
    }
}

/// Stores the tomato model in `engine` and returns references to its parts.
pub fn seed_tomato_system(engine: &FakeEngine) -> TomatoFixture {
    let group = UnitGroup::new("Units of mass", "kg");
    let mass = FlowProperty::new("Mass", &group);
    engine.insert(&group);
    engine.insert(&mass);

    let mut seeder = Seeder {
        engine,
        mass,
        flows: BTreeMap::new(),
    };
    let specs = [FERTILIZERS, CROP_MANAGEMENT, PESTICIDES, IRRIGATION];
    let subsystems: Vec<Process> = specs.iter().map(|spec| seeder.process(spec)).collect();

    let mut root = Process::new("Tomate");
    root.description = Some("Tomato, open field, drip irrigation".to_string());
    for spec in &specs {
        let flow = seeder.flow(spec.name);
        root.add_input(&flow, 1.0);
    }
    let tomato = seeder.flow("Tomate");
    root.add_output(&tomato, 1.0).is_quantitative_reference = true;
    engine.insert(&root);

    let mut members = vec![root.to_ref()];
    members.extend(subsystems.iter().map(|p| p.to_ref()));
    let system = ProductSystem {
        id: new_id(),
        name: DEFAULT_PRODUCT_SYSTEM.to_string(),
        ref_process: Some(root.to_ref()),
        processes: members,
        extra: Default::default(),
    };
    engine.insert(&system);

    let method = ImpactMethod {
        id: DEFAULT_IMPACT_METHOD_ID.to_string(),
        name: "ReCiPe 2016 Midpoint (H)".to_string(),
        description: None,
        impact_categories: vec![
            Ref::new(RefType::ImpactCategory, "climate-change")
                .with_name("Climate change")
                .with_ref_unit("kg CO2 eq"),
            Ref::new(RefType::ImpactCategory, "water-use")
                .with_name("Water use")
                .with_ref_unit("m3"),
        ],
        extra: Default::default(),
    };
    engine.insert(&method);

    TomatoFixture {
        fertilizers: subsystems[0].to_ref(),
        crop_management: subsystems[1].to_ref(),
        pesticides: subsystems[2].to_ref(),
        irrigation: subsystems[3].to_ref(),
        root: root.to_ref(),
        system: system.to_ref(),
        method: method.to_ref(),
    }
}
