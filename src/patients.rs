//! Patient views: the picker list and the patient record page.

use rusqlite::Connection;
use serde::Serialize;
use uuid::Uuid;

use crate::db::{self, DatabaseError};
use crate::models::{CaseOption, ClinicalCase, Patient, PatientOption, Prescription};

/// Where the not-found view sends the practitioner.
pub const PATIENTS_PATH: &str = "/patients";

pub const LOAD_FAILED: &str = "Failed to load patient data";

/// A patient record page. A missing patient is an empty state, not an error.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum PatientDetail {
    Found {
        patient: Patient,
        cases: Vec<ClinicalCase>,
        prescriptions: Vec<Prescription>,
    },
    NotFound {
        message: String,
        back_to: String,
    },
}

impl PatientDetail {
    pub fn not_found() -> Self {
        PatientDetail::NotFound {
            message: "Patient not found".into(),
            back_to: PATIENTS_PATH.into(),
        }
    }
}

/// Patients for the case and prescription form selectors, by first name.
pub fn list_patients(
    conn: &Connection,
    practitioner_id: &Uuid,
) -> Result<Vec<PatientOption>, DatabaseError> {
    db::list_patient_options(conn, practitioner_id)
}

/// Case picker for the prescription form, latest consultation first.
pub fn list_cases_for_patient(
    conn: &Connection,
    practitioner_id: &Uuid,
    patient_id: &Uuid,
) -> Result<Vec<CaseOption>, DatabaseError> {
    db::list_case_options(conn, practitioner_id, patient_id)
}

pub fn patient_detail(
    conn: &Connection,
    practitioner_id: &Uuid,
    patient_id: &Uuid,
) -> Result<PatientDetail, DatabaseError> {
    let Some(patient) = db::get_patient(conn, practitioner_id, patient_id)? else {
        tracing::debug!(%patient_id, "Patient not found for practitioner");
        return Ok(PatientDetail::not_found());
    };

    let cases = db::list_cases_for_patient(conn, practitioner_id, patient_id)?;
    let prescriptions = db::list_prescriptions_for_patient(conn, practitioner_id, patient_id)?;
    Ok(PatientDetail::Found {
        patient,
        cases,
        prescriptions,
    })
}
