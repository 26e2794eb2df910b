//! ORU^R01 result composition.
//!
//! Which observations a result carries is fixed per test code by a static
//! panel table; the reviewer only supplies values and interpretations. An
//! order whose test code has no panel cannot be resulted at all.

use std::collections::HashMap;

use chrono::Utc;
use thiserror::Error;

use crate::store::OrderFields;

/// One observation slot in a test panel. `default_value` and
/// `default_interpretation` pre-fill the review form; they are not used when
/// composing (absent reviewer input falls back to `0.0` / `"Normal"`).
pub struct ObservationField {
    pub id: &'static str,
    pub name: &'static str,
    pub unit: &'static str,
    pub reference: &'static str,
    pub default_value: &'static str,
    pub default_interpretation: &'static str,
}

macro_rules! obs {
    ($id:literal, $name:literal, $unit:literal, $reference:literal, $value:literal, $interp:literal) => {
        ObservationField {
            id: $id,
            name: $name,
            unit: $unit,
            reference: $reference,
            default_value: $value,
            default_interpretation: $interp,
        }
    };
}

static CBC_PANEL: &[ObservationField] = &[
    obs!("717-9", "Hemoglobin [Presence] in Blood", "g/dL", "12.0-16.0 (F) / 13.0-17.0 (M)", "13.2", "Normal"),
    obs!("LP15101-6", "Hematocrit", "%", "36-46 (F) / 40-52 (M)", "39.5", "Normal"),
    obs!("LP393833-1", "Leukocyte phosphatase | White blood cells | Hematology and Cell counts", "10*9/L", "4.0-10.0", "11.8", "Abnormal"),
    obs!("LP7536-8", "RBC", "10*12/L", "4.2-5.4", "4.8", "Normal"),
];

static BMP_PANEL: &[ObservationField] = &[
    obs!("2345-7", "Glucose", "mg/dL", "70-100", "92", "Normal"),
    obs!("3094-0", "Blood Urea Nitrogen", "mg/dL", "7-20", "15", "Normal"),
    obs!("2160-0", "Creatinine", "mg/dL", "0.6-1.2", "0.9", "Normal"),
    obs!("2951-2", "Sodium", "mmol/L", "136-145", "140", "Normal"),
    obs!("2823-3", "Potassium", "mmol/L", "3.5-5.0", "4.2", "Normal"),
];

static GLUCOSE_PANEL: &[ObservationField] =
    &[obs!("1554-5", "Glucose", "mg/dL", "70-105", "88", "Normal")];

static CBC_SNOMED_PANEL: &[ObservationField] = &[
    obs!("LP32067-8", "Hemoglobin", "g/dL", "12.0-17.0", "13.2", "Normal"),
    obs!("LP15101-6", "Hematocrit", "%", "36.0-50.0", "39.5", "Normal"),
    obs!("LA12896-9", "Erythrocytes", "10*6/uL", "4.0-10.0", "11.8", "Abnormal"),
    obs!("LP7631-7", "Platelets", "10*3/uL", "150-400", "250", "Normal"),
];

/// The observation panel for `test_code`, or `None` when the code is not one
/// this analyzer knows how to result. Whitespace around the code is ignored.
pub fn lookup_observation_fields(test_code: &str) -> Option<&'static [ObservationField]> {
    match test_code.trim() {
        "LP99237-7" => Some(CBC_PANEL),
        "BMP" => Some(BMP_PANEL),
        "GLUCOSE" | "1554-5" => Some(GLUCOSE_PANEL),
        "26604007" => Some(CBC_SNOMED_PANEL),
        _ => None,
    }
}

/// Maps a reviewer-supplied interpretation to an HL7 abnormal-flag code.
/// Matching is case-insensitive; anything unrecognized reads as normal.
pub fn abnormal_flag(interpretation: &str) -> &'static str {
    match interpretation.to_lowercase().as_str() {
        "abnormal" | "a" => "A",
        "high" | "h" => "H",
        "low" | "l" => "L",
        "critical" | "critical high" | "hh" => "HH",
        "critical low" | "ll" => "LL",
        _ => "N", // includes "normal"/"n"
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ComposeError {
    #[error("no observation panel configured for test code '{0}'")]
    UnknownTestCode(String),
}

/// Composes the full ORU^R01 result text for `order`.
///
/// `values` and `interpretations` are keyed by observation field id; a
/// missing value reads as `0.0` and a missing interpretation as `"Normal"`.
pub fn compose_result(
    order: &OrderFields,
    values: &HashMap<String, f64>,
    interpretations: &HashMap<String, String>,
) -> Result<String, ComposeError> {
    let panel = lookup_observation_fields(&order.test_code)
        .ok_or_else(|| ComposeError::UnknownTestCode(order.test_code.clone()))?;

    let timestamp = Utc::now().format("%Y%m%d%H%M%S").to_string();
    let mut segments = Vec::with_capacity(5 + panel.len());

    segments.push(format!(
        "MSH|^~\\&|LAB_ANALYZER|DUMMY_LAB|{}|{}|{}||ORU^R01|{}_RESULT|P|2.5",
        order.sending_application, order.sending_facility, timestamp, order.message_control_id
    ));

    segments.push(format!(
        "PID|1||{}||{}||{}|{}|||{}||{}|||||||",
        order.patient_id,
        order.patient_name,
        order.patient_dob,
        order.patient_sex,
        order.patient_address,
        order.patient_phone
    ));

    if !order.encounter_id.is_empty() {
        segments.push(format!(
            "PV1|1|||||||||||||||||{}|||||||||||||||||||||||||||||||||",
            order.encounter_id
        ));
    }

    segments.push(format!(
        "ORC|RE|{}|{}||CM||||{}|||{}",
        order.placer_order_number, order.filler_order_number, timestamp, order.ordering_provider
    ));

    // OBR-4 is recomposed from the order; the coding-system component is only
    // emitted when the order carried one.
    let universal_service_id = if order.test_coding_system.is_empty() {
        format!("{}^{}", order.test_code, order.test_name)
    } else {
        format!(
            "{}^{}^{}",
            order.test_code, order.test_name, order.test_coding_system
        )
    };
    segments.push(format!(
        "OBR|1|{}|{}|{}|||{}|||||||{}|||{}||||||||F",
        order.placer_order_number,
        order.filler_order_number,
        universal_service_id,
        timestamp,
        timestamp,
        order.ordering_provider
    ));

    for (index, field) in panel.iter().enumerate() {
        let value = values.get(field.id).copied().unwrap_or(0.0);
        let flag = interpretations
            .get(field.id)
            .map(|i| abnormal_flag(i))
            .unwrap_or("N");

        segments.push(format!(
            "OBX|{}|NM|{}^{}^http://loinc.org||{:.2}|{}|{}|{}|||F|||{}||||||",
            index + 1,
            field.id,
            field.name,
            value,
            field.unit,
            field.reference,
            flag,
            timestamp
        ));
    }

    Ok(segments.join("\r"))
}
