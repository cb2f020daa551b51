//! The literal flow tables, one function per subsystem.

use super::{FlowDict, MappingError, Subsystem};
use crate::model::AcvInput;

pub(crate) const ACETAMIDE_ANILLIDE: &str = "Acetamide-anillide-compound, unspecified {RER}| production";
pub(crate) const PESTICIDE_UNSPECIFIED: &str =
    "Pesticice, unspecified {RER}| pesticice, unspecified production";
pub(crate) const PYRIDINE_COMPOUND: &str = " Pyridine-compound {RER}|  pyridine-compound production";

pub(super) fn fertilizers(input: &AcvInput) -> Result<FlowDict, MappingError> {
    let f = &input.fertilizantes;
    FlowDict::from_entries(
        Subsystem::Fertilizers.process_name(),
        &[
            ("Ammonium nitrate phosphate, as N, at regional storehouse {RER}", f.kg_n),
            ("Ammonium nitrate phosphate, as P2O5, at regional storehouse {RER}", f.kg_p2o5),
            ("Diesel, burned in agricultural machine {CH}", f.transporte_fert_uf_1),
            ("Potassium nitrate, as K2O, at regional storehouse {RER}", f.kg_k2o),
        ],
        &[
            ("Fertilizantes T", 1.0),
            ("Ammonia", f.kg_nh3),
            ("Dinitrogen monoxide", f.kg_n2o),
            ("Nitrate", f.kg_no3),
            ("Nitrogen oxides, ES", f.kg_nox),
        ],
    )
}

pub(super) fn crop_management(input: &AcvInput) -> Result<FlowDict, MappingError> {
    let sprayer = &input.manejo_cultivo.plant_protection;
    let harvester = &input.maquinaria.cosechadora;
    FlowDict::from_entries(
        Subsystem::CropManagement.process_name(),
        &[
            ("Agricultural machinery, general, production {CH}", sprayer.uf_1_kg_produccion),
            ("Agricultural machinery, tillage, production {CH}", 0.0),
            ("Application of plant protection products, by field sprayer {CH}", sprayer.rendimiento_h_ha),
            ("Combine harvesting {CH}", 0.0),
            // Every exchange of this flow gets the same amount.
            ("Diesel, burned in agricultural machine {CH}", harvester.uf_kg),
            ("Harvester, production {CH}", harvester.uf_kg_fabricacion),
            ("Planting {CH}", 0.0),
            ("Tillage, cultivating, chiselling {CH}", 0.0),
            ("Tillage, harrowing, by rotary harrow {CH}", 0.0),
            ("Tractor, production {CH}", harvester.uf_kg_fabricacion_produccion),
            ("xx Tillage, rotary cultivator {CH}", 0.0),
            ("Occupation, annual crop, irrigated", input.manejo_cultivo.ocupacion_suelo),
            ("Transformation, to annual crop, irrigated", 0.0),
            ("Water, unspecified natural origin, ES", input.manejo_cultivo.uso_de_agua),
        ],
        &[("Manejo de cultivo T", 1.0)],
    )
}

pub(super) fn pesticides(input: &AcvInput) -> Result<FlowDict, MappingError> {
    let acetamide = input.pesticide(ACETAMIDE_ANILLIDE)?;
    let unspecified = input.pesticide(PESTICIDE_UNSPECIFIED)?;
    let pyridine = input.pesticide(PYRIDINE_COMPOUND)?;
    FlowDict::from_entries(
        Subsystem::Pesticides.process_name(),
        &[
            ("Acetamide-anillide-compounds, at regional storehouse {RER}", acetamide),
            ("Cyclic N-compounds, at regional storehouse {RER}", 0.0),
            ("Dinitroaniline-compounds, at regional storehouse {RER}", 0.0),
            ("Glyphosate, at regional storehouse {RER}", 0.0),
            ("Metolachlor, at regional storehouse {RER}", 0.0),
            ("Nitrile-compounds, at regional storehouse {RER}", 0.0),
            ("Organophosphorus-compounds, at regional storehouse {RER}", 0.0),
            ("Pendimethalin, at regional storage {RER}", 0.0),
            ("Pesticide unspecified, at regional storehouse {RER}", unspecified),
            ("Phenoxy-compounds, at regional storehouse {RER}", 0.0),
            ("Pyretroid-compounds, at regional storehouse {RER}", 0.0),
            ("Triazine-compounds, at regional storehouse {RER}", 0.0),
            ("xx Captan, at regional storage {RER}", 0.0),
            ("xx Diazole-compounds, at regional storehouse {RER}", 0.0),
            ("xx Folpet, at regional storage {RER}", 0.0),
            ("xx Pyridine-compounds, at regional storehouse {RER}", pyridine),
        ],
        &[
            ("Pesticidas T", 1.0),
            ("Pendimethalin, at regional storage {RER}", 0.0),
            ("Chlorpyrifos", 0.0),
            ("Metalaxyl-M", 0.0),
            ("Imidacloprid", 0.0),
            ("Alpha-cypermethrin", 0.0),
            ("Abamectin", 0.0),
            ("Folpet", 0.0),
            ("PYRIDINE", 0.0),
            ("Pesticides, unspecified", 0.0),
            ("Tebuconazole", 0.0),
            ("Metribuzin", 0.0),
            ("Lambda-cyhalothrin", 0.0),
            ("Pendimethalin", 0.0),
        ],
    )
}

pub(super) fn irrigation(input: &AcvInput) -> Result<FlowDict, MappingError> {
    let riegos = &input.riegos;
    FlowDict::from_entries(
        Subsystem::Irrigation.process_name(),
        &[
            ("Water, well, RER", input.manejo_cultivo.uso_de_agua),
            ("Steel, low alloyed, secondary production (100% Rec.) {CH}", 0.0),
            ("Steel product manufacturing, average metal working {RER}", input.bombeo.kg_acero_ha_produccion),
            ("Polypropylene, granulate, at plant {RER}", riegos.kg_pp_produccion),
            ("Stretch blow moulding {RER}", 0.0),
            ("Extrusion, plastic pipes {RER}", 0.0),
            ("Polystyrene, expandable, at plant {RER}", riegos.kg_pe_produccion),
            ("Polyvinylchloride, emulsion polymerised, at plant {RER}", riegos.kg_pvc_produccion),
            ("Tractor, production {CH}", 0.0),
            ("Diesel, burned in agricultural machine {CH}", 0.0),
            ("Transport, freight, lorry, 7.5t-16t gross weight, fleet average {RER}", 0.0),
            ("Polyethylene, HDPE, granulate, at plant {RER}", 0.0),
            ("Electricity, low voltage, production from oil, at grid {CH}", 0.0),
        ],
        &[
            ("Sistema de riego T", 1.0),
            ("xx Recycling PVC {RER}", riegos.kg_pvc_ha_anio),
            ("xx Recycling PP {RER}", riegos.kg_pp_ha_anio),
            ("xx Recycling PE {RER}", riegos.kg_pe_ha_anio),
            ("Recycling steel and iron {RER}", 0.0),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::input::sample_input;

    #[test]
    fn test_kg_n_lands_on_the_nitrogen_input() {
        let mut input = sample_input();
        input.fertilizantes.kg_n = 12.5;

        let dict = fertilizers(&input).unwrap();
        assert_eq!(
            dict.amount("Ammonium nitrate phosphate, as N, at regional storehouse {RER}", true),
            Ok(12.5)
        );
        let others: f64 = dict
            .inputs()
            .iter()
            .filter(|(k, _)| !k.contains("as N,"))
            .map(|(_, v)| *v)
            .sum();
        assert_eq!(others, 0.0);
        assert_eq!(dict.amount("Fertilizantes T", false), Ok(1.0));
    }

    #[test]
    fn test_pesticide_table_reads_registered_substances() {
        let dict = pesticides(&sample_input()).unwrap();
        assert_eq!(
            dict.amount("Pesticide unspecified, at regional storehouse {RER}", true),
            Ok(0.0005)
        );
        assert_eq!(
            dict.amount("xx Pyridine-compounds, at regional storehouse {RER}", true),
            Ok(0.0001)
        );
        assert_eq!(dict.outputs().len(), 14);
    }

    #[test]
    fn test_irrigation_reuses_water_use_for_well_water() {
        let input = sample_input();
        let dict = irrigation(&input).unwrap();
        assert_eq!(dict.amount("Water, well, RER", true), Ok(input.manejo_cultivo.uso_de_agua));
        assert_eq!(dict.amount("xx Recycling PE {RER}", false), Ok(3.85));
    }
}
