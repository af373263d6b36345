use std::str::FromStr;

use rusqlite::{params, Connection};
use uuid::Uuid;

use super::{format_timestamp, parse_timestamp, parse_uuid};
use crate::db::query::{Direction, Select};
use crate::db::DatabaseError;
use crate::models::enums::PrescriptionStatus;
use crate::models::Prescription;

const PRESCRIPTION_COLUMNS: &[&str] = &[
    "id",
    "practitioner_id",
    "patient_id",
    "case_id",
    "remedy_id",
    "remedy_name",
    "potency",
    "dosage_instructions",
    "frequency",
    "duration",
    "method",
    "patient_instructions",
    "follow_up_date",
    "prescription_number",
    "prescription_date",
    "status",
];

struct PrescriptionRow {
    id: String,
    practitioner_id: String,
    patient_id: String,
    case_id: String,
    remedy_id: String,
    remedy_name: String,
    potency: String,
    dosage_instructions: String,
    frequency: String,
    duration: String,
    method: Option<String>,
    patient_instructions: Option<String>,
    follow_up_date: Option<chrono::NaiveDate>,
    prescription_number: String,
    prescription_date: String,
    status: String,
}

pub fn insert_prescription(conn: &Connection, rx: &Prescription) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO prescriptions (id, practitioner_id, patient_id, case_id, remedy_id,
         remedy_name, potency, dosage_instructions, frequency, duration, method,
         patient_instructions, follow_up_date, prescription_number, prescription_date, status)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        params![
            rx.id.to_string(),
            rx.practitioner_id.to_string(),
            rx.patient_id.to_string(),
            rx.case_id.to_string(),
            rx.remedy_id.to_string(),
            rx.remedy_name,
            rx.potency,
            rx.dosage_instructions,
            rx.frequency,
            rx.duration,
            rx.method,
            rx.patient_instructions,
            rx.follow_up_date.map(|d| d.to_string()),
            rx.prescription_number,
            format_timestamp(&rx.prescription_date),
            rx.status.as_str(),
        ],
    )?;
    Ok(())
}

/// A patient's prescriptions, newest first.
pub fn list_prescriptions_for_patient(
    conn: &Connection,
    practitioner_id: &Uuid,
    patient_id: &Uuid,
) -> Result<Vec<Prescription>, DatabaseError> {
    let rows = Select::from("prescriptions", PRESCRIPTION_COLUMNS)
        .eq("patient_id", patient_id.to_string())
        .eq("practitioner_id", practitioner_id.to_string())
        .order_by("prescription_date", Direction::Desc)
        .order_by("prescription_number", Direction::Desc)
        .fetch(conn, prescription_row_from_rusqlite)?;
    rows.into_iter().map(prescription_from_row).collect()
}

fn prescription_row_from_rusqlite(
    row: &rusqlite::Row<'_>,
) -> Result<PrescriptionRow, rusqlite::Error> {
    Ok(PrescriptionRow {
        id: row.get(0)?,
        practitioner_id: row.get(1)?,
        patient_id: row.get(2)?,
        case_id: row.get(3)?,
        remedy_id: row.get(4)?,
        remedy_name: row.get(5)?,
        potency: row.get(6)?,
        dosage_instructions: row.get(7)?,
        frequency: row.get(8)?,
        duration: row.get(9)?,
        method: row.get(10)?,
        patient_instructions: row.get(11)?,
        follow_up_date: row.get(12)?,
        prescription_number: row.get(13)?,
        prescription_date: row.get(14)?,
        status: row.get(15)?,
    })
}

fn prescription_from_row(row: PrescriptionRow) -> Result<Prescription, DatabaseError> {
    Ok(Prescription {
        id: parse_uuid("prescriptions.id", &row.id)?,
        practitioner_id: parse_uuid("prescriptions.practitioner_id", &row.practitioner_id)?,
        patient_id: parse_uuid("prescriptions.patient_id", &row.patient_id)?,
        case_id: parse_uuid("prescriptions.case_id", &row.case_id)?,
        remedy_id: parse_uuid("prescriptions.remedy_id", &row.remedy_id)?,
        remedy_name: row.remedy_name,
        potency: row.potency,
        dosage_instructions: row.dosage_instructions,
        frequency: row.frequency,
        duration: row.duration,
        method: row.method,
        patient_instructions: row.patient_instructions,
        follow_up_date: row.follow_up_date,
        prescription_number: row.prescription_number,
        prescription_date: parse_timestamp("prescriptions.prescription_date", &row.prescription_date)?,
        status: PrescriptionStatus::from_str(&row.status)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{fixtures, next_business_number, now_timestamp};
    use crate::db::sqlite::open_memory_database;

    #[test]
    fn prescriptions_listed_newest_first() {
        let conn = open_memory_database().unwrap();
        let doc = fixtures::practitioner(&conn, "Dr. Kent");
        let patient = fixtures::patient(&conn, doc, "Ada", "Lovelace");
        let case = fixtures::case(&conn, &patient, "Migraine", "2024-01-10 09:00:00");
        let bell = fixtures::remedy(&conn, "Belladonna", "Bell.");

        for (date, potency) in [("2024-01-10 10:00:00", "30C"), ("2024-02-10 10:00:00", "200C")] {
            insert_prescription(&conn, &Prescription {
                id: Uuid::new_v4(),
                practitioner_id: doc,
                patient_id: patient.id,
                case_id: case.id,
                remedy_id: bell.id,
                remedy_name: bell.name.clone(),
                potency: potency.into(),
                dosage_instructions: "4 globules under tongue".into(),
                frequency: "TDS".into(),
                duration: "7 days".into(),
                method: None,
                patient_instructions: None,
                follow_up_date: None,
                prescription_number: next_business_number(&conn, "RX").unwrap(),
                prescription_date: parse_timestamp("d", date).unwrap(),
                status: PrescriptionStatus::Active,
            })
            .unwrap();
        }

        let listed = list_prescriptions_for_patient(&conn, &doc, &patient.id).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].potency, "200C");
        assert_eq!(listed[1].prescription_number, "RX-000001");
    }

    #[test]
    fn prescription_requires_known_remedy() {
        let conn = open_memory_database().unwrap();
        let doc = fixtures::practitioner(&conn, "Dr. Kent");
        let patient = fixtures::patient(&conn, doc, "Ada", "Lovelace");
        let case = fixtures::case(&conn, &patient, "Migraine", "2024-01-10 09:00:00");

        let result = insert_prescription(&conn, &Prescription {
            id: Uuid::new_v4(),
            practitioner_id: doc,
            patient_id: patient.id,
            case_id: case.id,
            remedy_id: Uuid::new_v4(),
            remedy_name: "Nonexistium".into(),
            potency: "6C".into(),
            dosage_instructions: "2 pills".into(),
            frequency: "OD".into(),
            duration: "3 days".into(),
            method: None,
            patient_instructions: None,
            follow_up_date: None,
            prescription_number: "RX-000100".into(),
            prescription_date: now_timestamp(),
            status: PrescriptionStatus::Active,
        });
        assert!(result.is_err());
    }
}
