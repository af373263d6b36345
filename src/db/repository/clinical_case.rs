use std::str::FromStr;

use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{format_timestamp, parse_timestamp, parse_uuid};
use crate::db::query::{Direction, Select};
use crate::db::DatabaseError;
use crate::models::enums::{CaseStatus, CaseType};
use crate::models::{CaseOption, ClinicalCase};

const CASE_COLUMNS: &[&str] = &[
    "id",
    "practitioner_id",
    "patient_id",
    "case_number",
    "case_type",
    "case_status",
    "chief_complaint",
    "history_of_complaint",
    "medical_history",
    "family_history",
    "physical_examination",
    "mental_emotional_state",
    "consultation_date",
    "created_at",
    "updated_at",
];

const CASE_OPTION_COLUMNS: &[&str] = &["id", "case_number", "chief_complaint", "consultation_date"];

struct CaseRow {
    id: String,
    practitioner_id: String,
    patient_id: String,
    case_number: String,
    case_type: String,
    case_status: String,
    chief_complaint: String,
    history_of_complaint: Option<String>,
    medical_history: Option<String>,
    family_history: Option<String>,
    physical_examination: Option<String>,
    mental_emotional_state: Option<String>,
    consultation_date: String,
    created_at: String,
    updated_at: String,
}

pub fn insert_case(conn: &Connection, case: &ClinicalCase) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO cases (id, practitioner_id, patient_id, case_number, case_type, case_status,
         chief_complaint, history_of_complaint, medical_history, family_history,
         physical_examination, mental_emotional_state, consultation_date, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
        params![
            case.id.to_string(),
            case.practitioner_id.to_string(),
            case.patient_id.to_string(),
            case.case_number,
            case.case_type.as_str(),
            case.case_status.as_str(),
            case.chief_complaint,
            case.history_of_complaint,
            case.medical_history,
            case.family_history,
            case.physical_examination,
            case.mental_emotional_state,
            format_timestamp(&case.consultation_date),
            format_timestamp(&case.created_at),
            format_timestamp(&case.updated_at),
        ],
    )?;
    Ok(())
}

pub fn get_case(
    conn: &Connection,
    practitioner_id: &Uuid,
    case_id: &Uuid,
) -> Result<Option<ClinicalCase>, DatabaseError> {
    let row = Select::from("cases", CASE_COLUMNS)
        .eq("id", case_id.to_string())
        .eq("practitioner_id", practitioner_id.to_string())
        .fetch_optional(conn, case_row_from_rusqlite)?;
    row.map(case_from_row).transpose()
}

/// All of a patient's cases, most recent consultation first.
pub fn list_cases_for_patient(
    conn: &Connection,
    practitioner_id: &Uuid,
    patient_id: &Uuid,
) -> Result<Vec<ClinicalCase>, DatabaseError> {
    let rows = Select::from("cases", CASE_COLUMNS)
        .eq("patient_id", patient_id.to_string())
        .eq("practitioner_id", practitioner_id.to_string())
        .order_by("consultation_date", Direction::Desc)
        .fetch(conn, case_row_from_rusqlite)?;
    rows.into_iter().map(case_from_row).collect()
}

/// Case picker rows for the prescription form, most recent first.
pub fn list_case_options(
    conn: &Connection,
    practitioner_id: &Uuid,
    patient_id: &Uuid,
) -> Result<Vec<CaseOption>, DatabaseError> {
    let rows = Select::from("cases", CASE_OPTION_COLUMNS)
        .eq("patient_id", patient_id.to_string())
        .eq("practitioner_id", practitioner_id.to_string())
        .order_by("consultation_date", Direction::Desc)
        .fetch(conn, |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

    rows.into_iter()
        .map(|(id, case_number, chief_complaint, consultation_date)| {
            Ok(CaseOption {
                id: parse_uuid("cases.id", &id)?,
                case_number,
                chief_complaint,
                consultation_date: parse_timestamp("cases.consultation_date", &consultation_date)?,
            })
        })
        .collect()
}

fn case_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<CaseRow, rusqlite::Error> {
    Ok(CaseRow {
        id: row.get(0)?,
        practitioner_id: row.get(1)?,
        patient_id: row.get(2)?,
        case_number: row.get(3)?,
        case_type: row.get(4)?,
        case_status: row.get(5)?,
        chief_complaint: row.get(6)?,
        history_of_complaint: row.get(7)?,
        medical_history: row.get(8)?,
        family_history: row.get(9)?,
        physical_examination: row.get(10)?,
        mental_emotional_state: row.get(11)?,
        consultation_date: row.get(12)?,
        created_at: row.get(13)?,
        updated_at: row.get(14)?,
    })
}

fn case_from_row(row: CaseRow) -> Result<ClinicalCase, DatabaseError> {
    Ok(ClinicalCase {
        id: parse_uuid("cases.id", &row.id)?,
        practitioner_id: parse_uuid("cases.practitioner_id", &row.practitioner_id)?,
        patient_id: parse_uuid("cases.patient_id", &row.patient_id)?,
        case_number: row.case_number,
        case_type: CaseType::from_str(&row.case_type)?,
        case_status: CaseStatus::from_str(&row.case_status)?,
        chief_complaint: row.chief_complaint,
        history_of_complaint: row.history_of_complaint,
        medical_history: row.medical_history,
        family_history: row.family_history,
        physical_examination: row.physical_examination,
        mental_emotional_state: row.mental_emotional_state,
        consultation_date: parse_timestamp("cases.consultation_date", &row.consultation_date)?,
        created_at: parse_timestamp("cases.created_at", &row.created_at)?,
        updated_at: parse_timestamp("cases.updated_at", &row.updated_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::fixtures;
    use crate::db::sqlite::open_memory_database;

    #[test]
    fn cases_listed_newest_first() {
        let conn = open_memory_database().unwrap();
        let doc = fixtures::practitioner(&conn, "Dr. Kent");
        let patient = fixtures::patient(&conn, doc, "Ada", "Lovelace");
        fixtures::case(&conn, &patient, "Migraine", "2024-01-10 09:00:00");
        fixtures::case(&conn, &patient, "Insomnia", "2024-06-02 15:30:00");
        fixtures::case(&conn, &patient, "Eczema", "2023-11-20 11:00:00");

        let complaints: Vec<String> = list_cases_for_patient(&conn, &doc, &patient.id)
            .unwrap()
            .into_iter()
            .map(|c| c.chief_complaint)
            .collect();
        assert_eq!(complaints, vec!["Insomnia", "Migraine", "Eczema"]);

        let options = list_case_options(&conn, &doc, &patient.id).unwrap();
        assert_eq!(options.len(), 3);
        assert_eq!(options[0].chief_complaint, "Insomnia");
    }

    #[test]
    fn case_round_trips_enums() {
        let conn = open_memory_database().unwrap();
        let doc = fixtures::practitioner(&conn, "Dr. Kent");
        let patient = fixtures::patient(&conn, doc, "Ada", "Lovelace");
        let case = fixtures::case(&conn, &patient, "Fever", "2024-02-01 08:00:00");

        let loaded = get_case(&conn, &doc, &case.id).unwrap().unwrap();
        assert_eq!(loaded.case_type, CaseType::Chronic);
        assert_eq!(loaded.case_status, CaseStatus::Draft);
        assert_eq!(loaded.case_number, "CASE-000001");
    }

    #[test]
    fn cases_scoped_to_practitioner() {
        let conn = open_memory_database().unwrap();
        let owner = fixtures::practitioner(&conn, "Dr. Owner");
        let other = fixtures::practitioner(&conn, "Dr. Other");
        let patient = fixtures::patient(&conn, owner, "Ada", "Lovelace");
        let case = fixtures::case(&conn, &patient, "Fever", "2024-02-01 08:00:00");

        assert!(get_case(&conn, &other, &case.id).unwrap().is_none());
        assert!(list_cases_for_patient(&conn, &other, &patient.id).unwrap().is_empty());
    }

    #[test]
    fn case_requires_existing_patient() {
        let conn = open_memory_database().unwrap();
        let doc = fixtures::practitioner(&conn, "Dr. Kent");
        let patient = fixtures::patient(&conn, doc, "Ada", "Lovelace");
        let mut case = fixtures::case(&conn, &patient, "Fever", "2024-02-01 08:00:00");
        case.id = Uuid::new_v4();
        case.case_number = "CASE-999999".into();
        case.patient_id = Uuid::new_v4();
        assert!(insert_case(&conn, &case).is_err());
    }
}
