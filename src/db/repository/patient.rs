use std::str::FromStr;

use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{decode_list, encode_list, format_timestamp, parse_timestamp, parse_uuid};
use crate::db::query::{Direction, Select};
use crate::db::DatabaseError;
use crate::models::enums::PatientStatus;
use crate::models::{Patient, PatientOption};

const PATIENT_COLUMNS: &[&str] = &[
    "id",
    "practitioner_id",
    "patient_number",
    "first_name",
    "last_name",
    "date_of_birth",
    "gender",
    "phone",
    "email",
    "address",
    "blood_group",
    "emergency_contact",
    "emergency_phone",
    "allergies",
    "tags",
    "notes",
    "status",
    "created_at",
    "updated_at",
];

const PATIENT_OPTION_COLUMNS: &[&str] = &["id", "first_name", "last_name", "patient_number"];

struct PatientRow {
    id: String,
    practitioner_id: String,
    patient_number: String,
    first_name: String,
    last_name: String,
    date_of_birth: chrono::NaiveDate,
    gender: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    address: Option<String>,
    blood_group: Option<String>,
    emergency_contact: Option<String>,
    emergency_phone: Option<String>,
    allergies: String,
    tags: String,
    notes: Option<String>,
    status: String,
    created_at: String,
    updated_at: String,
}

pub fn insert_patient(conn: &Connection, patient: &Patient) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO patients (id, practitioner_id, patient_number, first_name, last_name,
         date_of_birth, gender, phone, email, address, blood_group, emergency_contact,
         emergency_phone, allergies, tags, notes, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
        params![
            patient.id.to_string(),
            patient.practitioner_id.to_string(),
            patient.patient_number,
            patient.first_name,
            patient.last_name,
            patient.date_of_birth.to_string(),
            patient.gender,
            patient.phone,
            patient.email,
            patient.address,
            patient.blood_group,
            patient.emergency_contact,
            patient.emergency_phone,
            encode_list(&patient.allergies),
            encode_list(&patient.tags),
            patient.notes,
            patient.status.as_str(),
            format_timestamp(&patient.created_at),
            format_timestamp(&patient.updated_at),
        ],
    )?;
    Ok(())
}

/// Fetch one of the practitioner's patients. Another practitioner's
/// patient reads as `None`.
pub fn get_patient(
    conn: &Connection,
    practitioner_id: &Uuid,
    patient_id: &Uuid,
) -> Result<Option<Patient>, DatabaseError> {
    let row = Select::from("patients", PATIENT_COLUMNS)
        .eq("id", patient_id.to_string())
        .eq("practitioner_id", practitioner_id.to_string())
        .fetch_optional(conn, patient_row_from_rusqlite)?;
    row.map(patient_from_row).transpose()
}

/// Patient picker rows, ordered by first name.
pub fn list_patient_options(
    conn: &Connection,
    practitioner_id: &Uuid,
) -> Result<Vec<PatientOption>, DatabaseError> {
    let rows = Select::from("patients", PATIENT_OPTION_COLUMNS)
        .eq("practitioner_id", practitioner_id.to_string())
        .order_by("first_name", Direction::Asc)
        .order_by("last_name", Direction::Asc)
        .fetch(conn, |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

    rows.into_iter()
        .map(|(id, first_name, last_name, patient_number)| {
            Ok(PatientOption {
                id: parse_uuid("patients.id", &id)?,
                first_name,
                last_name,
                patient_number,
            })
        })
        .collect()
}

fn patient_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<PatientRow, rusqlite::Error> {
    Ok(PatientRow {
        id: row.get(0)?,
        practitioner_id: row.get(1)?,
        patient_number: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        date_of_birth: row.get(5)?,
        gender: row.get(6)?,
        phone: row.get(7)?,
        email: row.get(8)?,
        address: row.get(9)?,
        blood_group: row.get(10)?,
        emergency_contact: row.get(11)?,
        emergency_phone: row.get(12)?,
        allergies: row.get(13)?,
        tags: row.get(14)?,
        notes: row.get(15)?,
        status: row.get(16)?,
        created_at: row.get(17)?,
        updated_at: row.get(18)?,
    })
}

fn patient_from_row(row: PatientRow) -> Result<Patient, DatabaseError> {
    Ok(Patient {
        id: parse_uuid("patients.id", &row.id)?,
        practitioner_id: parse_uuid("patients.practitioner_id", &row.practitioner_id)?,
        patient_number: row.patient_number,
        first_name: row.first_name,
        last_name: row.last_name,
        date_of_birth: row.date_of_birth,
        gender: row.gender,
        phone: row.phone,
        email: row.email,
        address: row.address,
        blood_group: row.blood_group,
        emergency_contact: row.emergency_contact,
        emergency_phone: row.emergency_phone,
        allergies: decode_list(&row.allergies),
        tags: decode_list(&row.tags),
        notes: row.notes,
        status: PatientStatus::from_str(&row.status)?,
        created_at: parse_timestamp("patients.created_at", &row.created_at)?,
        updated_at: parse_timestamp("patients.updated_at", &row.updated_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::fixtures;
    use crate::db::sqlite::open_memory_database;

    #[test]
    fn patient_insert_and_retrieve() {
        let conn = open_memory_database().unwrap();
        let doc = fixtures::practitioner(&conn, "Dr. Kent");
        let patient = fixtures::patient(&conn, doc, "Ada", "Lovelace");

        let loaded = get_patient(&conn, &doc, &patient.id).unwrap().unwrap();
        assert_eq!(loaded.first_name, "Ada");
        assert_eq!(loaded.patient_number, "PT-000001");
        assert_eq!(loaded.status, PatientStatus::Active);
        assert!(loaded.allergies.is_empty());
    }

    #[test]
    fn other_practitioner_cannot_read_patient() {
        let conn = open_memory_database().unwrap();
        let owner = fixtures::practitioner(&conn, "Dr. Owner");
        let other = fixtures::practitioner(&conn, "Dr. Other");
        let patient = fixtures::patient(&conn, owner, "Grace", "Hopper");

        assert!(get_patient(&conn, &other, &patient.id).unwrap().is_none());
        assert!(list_patient_options(&conn, &other).unwrap().is_empty());
    }

    #[test]
    fn options_are_ordered_by_first_name() {
        let conn = open_memory_database().unwrap();
        let doc = fixtures::practitioner(&conn, "Dr. Kent");
        fixtures::patient(&conn, doc, "Zoe", "Adams");
        fixtures::patient(&conn, doc, "Amir", "Zed");
        fixtures::patient(&conn, doc, "Mia", "Ross");

        let names: Vec<String> = list_patient_options(&conn, &doc)
            .unwrap()
            .into_iter()
            .map(|p| p.first_name)
            .collect();
        assert_eq!(names, vec!["Amir", "Mia", "Zoe"]);
    }

    #[test]
    fn duplicate_patient_number_rejected() {
        let conn = open_memory_database().unwrap();
        let doc = fixtures::practitioner(&conn, "Dr. Kent");
        let first = fixtures::patient(&conn, doc, "Ada", "Lovelace");
        let mut copy = first.clone();
        copy.id = Uuid::new_v4();
        assert!(insert_patient(&conn, &copy).is_err());
    }
}
