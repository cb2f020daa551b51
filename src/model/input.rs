//! The agronomic form record posted by the tomato-growing questionnaire.
//!
//! Wire keys follow the form (Spanish, mixed case); Rust field names are snake case.
//! Only typing is enforced here. Range and consistency checks belong to the form.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::mapping::MappingError;

/// Irrigation network (`riegos`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Irrigation {
    pub tipo: String,
    pub entre_arboles: String,
    pub entre_calles: String,
    pub n_goteros_arbol: Option<i64>,
    pub n_arboles: f64,
    pub n_calles: i64,
    pub m_portagotero: i64,
    pub peso_portagoteros_16mm: i64,
    pub n_enganches: i64,
    pub peso_enganches: f64,
    pub metros_principal: f64,
    pub peso_principal_32mm: f64,
    pub peso_llaves: f64,
    #[serde(rename = "kg_PP")]
    pub kg_pp: f64,
    pub peso_tira_pollo: f64,
    pub peso_principal_17mm: f64,
    pub deposito_abono: f64,
    #[serde(rename = "kg_PP_ha_anio")]
    pub kg_pp_ha_anio: f64,
    #[serde(rename = "kg_PE_1_ha_anio")]
    pub kg_pe_1_ha_anio: f64,
    #[serde(rename = "kg_PE_2_ha_anio")]
    pub kg_pe_2_ha_anio: f64,
    #[serde(rename = "kg_PE_deposito_ha_anio")]
    pub kg_pe_deposito_ha_anio: f64,
    #[serde(rename = "kg_PE_ha_anio")]
    pub kg_pe_ha_anio: f64,
    #[serde(rename = "kg_PVC_ha_anio")]
    pub kg_pvc_ha_anio: f64,
    #[serde(rename = "kg_PVC_produccion")]
    pub kg_pvc_produccion: f64,
    #[serde(rename = "kg_PP_produccion")]
    pub kg_pp_produccion: f64,
    #[serde(rename = "kg_PE_produccion")]
    pub kg_pe_produccion: f64,
}

/// Pump house structure (`caseta`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PumpHouse {
    pub alto: String,
    pub largo: String,
    pub ancho: String,
    pub largo_tejado: String,
    pub ancho_tejado: String,
    pub superficie_tejado: f64,
    pub kg_hormigon_m2: f64,
    pub kg_hormigon: f64,
    pub peso_m2_chapas_acero: f64,
    pub kg_poliuretano: f64,
    pub kg_acero: f64,
    pub kg_hor: f64,
    #[serde(rename = "kg_PU")]
    pub kg_pu: f64,
    pub kg_acero_ha_anio: f64,
}

/// Pumping equipment (`bombeo`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pumping {
    pub cabeas: f64,
    pub potencia: String,
    pub consumo_l_h: String,
    pub kg_acero_ha_produccion: f64,
}

/// Fertilizer application and field emissions (`fertilizantes`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fertilizers {
    #[serde(rename = "kg_N")]
    pub kg_n: f64,
    #[serde(rename = "kg_K2O")]
    pub kg_k2o: f64,
    #[serde(rename = "kg_P2O5")]
    pub kg_p2o5: f64,
    #[serde(rename = "kg_NH3")]
    pub kg_nh3: f64,
    #[serde(rename = "kg_N2O")]
    pub kg_n2o: f64,
    #[serde(rename = "kg_NOX")]
    pub kg_nox: f64,
    #[serde(rename = "kg_NO3")]
    pub kg_no3: f64,
    #[serde(rename = "transporte_fert_UF_1")]
    pub transporte_fert_uf_1: f64,
}

/// Machinery work figures for one field operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOperation {
    /// The form spells this key `rendimeinto_h_ha`; the corrected spelling is accepted too.
    #[serde(rename = "rendimeinto_h_ha", alias = "rendimiento_h_ha")]
    pub rendimiento_h_ha: f64,
    #[serde(rename = "UF_1_ha")]
    pub uf_1_ha: f64,
    #[serde(rename = "UF_1_ha_produccion")]
    pub uf_1_ha_produccion: f64,
    pub fabricacion: f64,
    pub reparacion: f64,
    #[serde(rename = "UF_1_kg")]
    pub uf_1_kg: f64,
    #[serde(rename = "UF_1_kg_produccion")]
    pub uf_1_kg_produccion: f64,
}

/// Crop management (`manejo_cultivo`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropManagement {
    #[serde(rename = "Application of plant protection product, by field sprayer [CH]")]
    pub plant_protection: FieldOperation,
    pub ocupacion_suelo: f64,
    pub uso_de_agua: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Harvester {
    #[serde(rename = "UF_kg")]
    pub uf_kg: f64,
    #[serde(rename = "UF_kg_produccion")]
    pub uf_kg_produccion: f64,
    #[serde(rename = "UF_kg_fabricacion")]
    pub uf_kg_fabricacion: f64,
    #[serde(rename = "UF_kg_fabricacion_produccion")]
    pub uf_kg_fabricacion_produccion: f64,
}

/// Machinery (`maquinaria`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machinery {
    pub cosechadora: Harvester,
}

/// The full questionnaire output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcvInput {
    pub riegos: Irrigation,
    pub caseta: PumpHouse,
    pub bombeo: Pumping,
    /// Registered pesticide substance name → applied amount.
    pub fitosanitarios: BTreeMap<String, f64>,
    pub fertilizantes: Fertilizers,
    pub manejo_cultivo: CropManagement,
    pub maquinaria: Machinery,
}

impl AcvInput {
    /// Amount applied for a registered pesticide substance.
    ///
    /// The pesticide map is free-form, so a missing substance is reported by name
    /// instead of silently counting as zero.
    pub fn pesticide(&self, substance: &str) -> Result<f64, MappingError> {
        self.fitosanitarios
            .get(substance)
            .copied()
            .ok_or_else(|| MappingError::MissingMappingKey {
                map: "fitosanitarios".to_string(),
                key: substance.to_string(),
            })
    }
}

#[cfg(test)]
pub(crate) fn sample_input() -> AcvInput {
    serde_json::from_str(include_str!("../../tests/fixtures/ventum_input.json"))
        .expect("fixture must parse")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_parses_with_form_spelling() {
        let input = sample_input();
        assert_eq!(input.manejo_cultivo.plant_protection.rendimiento_h_ha, 0.35);
        assert_eq!(input.fertilizantes.kg_n, 0.0);
        assert_eq!(input.riegos.n_goteros_arbol, None);
    }

    #[test]
    fn test_missing_pesticide_is_named() {
        let input = sample_input();
        let err = input.pesticide("Glyphosate").unwrap_err();
        assert_eq!(
            err,
            MappingError::MissingMappingKey {
                map: "fitosanitarios".to_string(),
                key: "Glyphosate".to_string(),
            }
        );
    }
}
