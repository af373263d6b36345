use rusqlite::{params, Connection};

use super::parse_uuid;
use crate::db::query::{Direction, Select};
use crate::db::DatabaseError;
use crate::models::Rubric;

const RUBRIC_COLUMNS: &[&str] = &[
    "id",
    "chapter",
    "section",
    "subsection",
    "rubric_text",
    "complete_path",
    "level",
    "parent_id",
    "remedy_grades",
];

struct RubricRow {
    id: String,
    chapter: String,
    section: Option<String>,
    subsection: Option<String>,
    rubric_text: String,
    complete_path: String,
    level: i32,
    parent_id: Option<String>,
    remedy_grades: Option<String>,
}

pub fn insert_rubric(conn: &Connection, rubric: &Rubric) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO rubrics (id, chapter, section, subsection, rubric_text, complete_path,
         level, parent_id, remedy_grades)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            rubric.id.to_string(),
            rubric.chapter,
            rubric.section,
            rubric.subsection,
            rubric.rubric_text,
            rubric.complete_path,
            rubric.level,
            rubric.parent_id.map(|id| id.to_string()),
            rubric.remedy_grades.as_ref().map(|v| v.to_string()),
        ],
    )?;
    Ok(())
}

/// `rubric_text ILIKE '%term%' ORDER BY complete_path LIMIT limit`, with
/// Unicode case folding.
pub fn search_rubrics(
    conn: &Connection,
    term: &str,
    limit: u32,
) -> Result<Vec<Rubric>, DatabaseError> {
    let rows = Select::from("rubrics", RUBRIC_COLUMNS)
        .ilike("rubric_text", term)
        .order_by("complete_path", Direction::Asc)
        .limit(limit)
        .fetch(conn, rubric_row_from_rusqlite)?;
    rows.into_iter().map(rubric_from_row).collect()
}

fn rubric_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<RubricRow, rusqlite::Error> {
    Ok(RubricRow {
        id: row.get(0)?,
        chapter: row.get(1)?,
        section: row.get(2)?,
        subsection: row.get(3)?,
        rubric_text: row.get(4)?,
        complete_path: row.get(5)?,
        level: row.get(6)?,
        parent_id: row.get(7)?,
        remedy_grades: row.get(8)?,
    })
}

fn rubric_from_row(row: RubricRow) -> Result<Rubric, DatabaseError> {
    // Grades the loader stored as non-JSON text stay visible as a raw string
    // so the detail view can fall back instead of the whole search failing.
    let remedy_grades = row.remedy_grades.map(|raw| {
        serde_json::from_str::<serde_json::Value>(&raw)
            .unwrap_or(serde_json::Value::String(raw))
    });
    Ok(Rubric {
        id: parse_uuid("rubrics.id", &row.id)?,
        chapter: row.chapter,
        section: row.section,
        subsection: row.subsection,
        rubric_text: row.rubric_text,
        complete_path: row.complete_path,
        level: row.level,
        parent_id: row.parent_id.and_then(|s| uuid::Uuid::parse_str(&s).ok()),
        remedy_grades,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::fixtures;
    use crate::db::sqlite::open_memory_database;
    use serde_json::json;

    #[test]
    fn search_is_case_insensitive_substring() {
        let conn = open_memory_database().unwrap();
        fixtures::rubric(&conn, "Head, pain, pressing", "Headache, pressing pain", None);
        fixtures::rubric(&conn, "Stomach, nausea", "Nausea", None);
        fixtures::rubric(&conn, "Head, pain, morning", "Morning HEADACHE on waking", None);

        let found = search_rubrics(&conn, "headache", 50).unwrap();
        let texts: Vec<&str> = found.iter().map(|r| r.rubric_text.as_str()).collect();
        assert_eq!(texts, vec!["Morning HEADACHE on waking", "Headache, pressing pain"]);
    }

    #[test]
    fn search_folds_accented_letters() {
        let conn = open_memory_database().unwrap();
        fixtures::rubric(&conn, "Skin, eruptions", "ÉRUPTIONS, itching", None);
        fixtures::rubric(&conn, "Mind, fear, dark", "Angst vor DUNKELHEIT ÄNGSTLICH", None);
        fixtures::rubric(&conn, "Skin, dry", "Dry skin", None);

        let eruptions = search_rubrics(&conn, "éruptions", 50).unwrap();
        assert_eq!(eruptions.len(), 1);
        assert_eq!(eruptions[0].rubric_text, "ÉRUPTIONS, itching");

        let fear = search_rubrics(&conn, "ängstlich", 50).unwrap();
        assert_eq!(fear.len(), 1);
        assert_eq!(fear[0].complete_path, "Mind, fear, dark");
    }

    #[test]
    fn search_orders_by_path_and_caps() {
        let conn = open_memory_database().unwrap();
        for i in (0..60).rev() {
            fixtures::rubric(&conn, &format!("Mind, anxiety, {i:02}"), "Anxiety", None);
        }
        let found = search_rubrics(&conn, "anx", 50).unwrap();
        assert_eq!(found.len(), 50);
        assert!(found.windows(2).all(|w| w[0].complete_path <= w[1].complete_path));
        assert_eq!(found[0].complete_path, "Mind, anxiety, 00");
    }

    #[test]
    fn grades_survive_round_trip() {
        let conn = open_memory_database().unwrap();
        let grades = json!({"Belladonna": 3, "Bryonia": 2});
        fixtures::rubric(&conn, "Head, pain", "Headache", Some(grades.clone()));
        let found = search_rubrics(&conn, "head", 50).unwrap();
        assert_eq!(found[0].remedy_grades, Some(grades));
    }

    #[test]
    fn malformed_grades_read_as_string() {
        let conn = open_memory_database().unwrap();
        conn.execute(
            "INSERT INTO rubrics (id, chapter, rubric_text, complete_path, remedy_grades)
             VALUES (?1, 'Head', 'Headache', 'Head, pain', 'Bell:3')",
            params![uuid::Uuid::new_v4().to_string()],
        )
        .unwrap();
        let found = search_rubrics(&conn, "head", 50).unwrap();
        assert_eq!(found[0].remedy_grades, Some(json!("Bell:3")));
    }
}
