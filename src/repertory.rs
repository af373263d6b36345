//! Repertory lookup: rubric search and graded remedy listings.
//!
//! A practitioner types a keyword, gets up to 50 rubrics whose text
//! contains it (ordered by their full repertory path), and opens one rubric
//! to see its remedies with their grades.
//!
//! `RepertoryWorkspace` holds one practitioner's search state. Searches are
//! issued as numbered tickets; a response is applied only if its ticket is
//! still the latest one, so a slow answer to an older keyword can never
//! replace the results of a newer one.

use std::fmt::Display;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{self, DatabaseError};
use crate::models::{Remedy, Rubric};
use crate::notice::Notice;

/// Rubrics returned per search.
pub const RUBRIC_RESULT_LIMIT: u32 = 50;

/// Remedies loaded for cross-referencing grade keys.
pub const REMEDY_LIST_LIMIT: u32 = 100;

pub const NO_REMEDY_INFORMATION: &str = "No remedy information available";

const SEARCH_FAILED: &str = "Failed to search rubrics";

/// A search runs only when the trimmed input is longer than two characters.
pub fn is_searchable(term: &str) -> bool {
    term.trim().chars().count() > 2
}

// ═══════════════════════════════════════════
// Grades
// ═══════════════════════════════════════════

/// Presentation bucket for a remedy grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradeMarker {
    Strong,
    Medium,
    Low,
    Unmarked,
}

impl GradeMarker {
    pub fn from_grade(grade: i64) -> Self {
        match grade {
            3 => GradeMarker::Strong,
            2 => GradeMarker::Medium,
            1 => GradeMarker::Low,
            _ => GradeMarker::Unmarked,
        }
    }

    /// Any JSON value: only the integers 1, 2 and 3 earn a marker.
    pub fn from_value(value: &serde_json::Value) -> Self {
        value
            .as_i64()
            .map(Self::from_grade)
            .unwrap_or(GradeMarker::Unmarked)
    }

    pub fn label(self) -> &'static str {
        match self {
            GradeMarker::Strong => "***",
            GradeMarker::Medium => "**",
            GradeMarker::Low => "*",
            GradeMarker::Unmarked => "",
        }
    }
}

/// One entry of a rubric's remedy list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemedyBadge {
    pub remedy: String,
    pub marker: GradeMarker,
    pub label: String,
    /// Whether the key matches a remedy the workspace has loaded.
    pub known: bool,
    pub abbreviation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RemedyListing {
    Badges { badges: Vec<RemedyBadge> },
    Unavailable { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RubricDetail {
    pub rubric: Rubric,
    pub remedies: RemedyListing,
}

/// Build the detail view for a rubric. Keys are matched against `known`
/// by exact remedy name; unmatched keys still get a badge.
pub fn rubric_detail(rubric: &Rubric, known: &[Remedy]) -> RubricDetail {
    let remedies = match rubric.remedy_grades.as_ref().and_then(|v| v.as_object()) {
        Some(grades) => RemedyListing::Badges {
            badges: grades
                .iter()
                .map(|(name, grade)| {
                    let marker = GradeMarker::from_value(grade);
                    let remedy = known.iter().find(|r| &r.name == name);
                    RemedyBadge {
                        remedy: name.clone(),
                        marker,
                        label: marker.label().to_string(),
                        known: remedy.is_some(),
                        abbreviation: remedy.map(|r| r.abbreviation.clone()),
                    }
                })
                .collect(),
        },
        None => RemedyListing::Unavailable {
            message: NO_REMEDY_INFORMATION.to_string(),
        },
    };

    RubricDetail {
        rubric: rubric.clone(),
        remedies,
    }
}

// ═══════════════════════════════════════════
// Workspace state
// ═══════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchPhase {
    Idle,
    Loading,
    Results,
}

/// Permission to apply one search response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    seq: u64,
    term: String,
}

impl SearchTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn term(&self) -> &str {
        &self.term
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// A newer search was issued (or the workspace was invalidated).
    Stale,
}

/// Snapshot returned to the client.
#[derive(Debug, Clone, Serialize)]
pub struct WorkspaceView {
    pub term: String,
    pub phase: SearchPhase,
    pub result_count: usize,
    pub results: Vec<Rubric>,
    pub selected: Option<RubricDetail>,
    pub remedies: Vec<Remedy>,
    pub notice: Option<Notice>,
}

#[derive(Debug, Default)]
pub struct RepertoryWorkspace {
    term: String,
    phase: Option<SearchPhase>,
    results: Vec<Rubric>,
    selected: Option<Rubric>,
    remedies: Option<Vec<Remedy>>,
    latest_seq: u64,
    notice: Option<Notice>,
}

impl RepertoryWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase.unwrap_or(SearchPhase::Idle)
    }

    pub fn results(&self) -> &[Rubric] {
        &self.results
    }

    pub fn selected(&self) -> Option<&Rubric> {
        self.selected.as_ref()
    }

    /// Record new input. Returns a ticket when a query should be issued;
    /// short input leaves results and phase exactly as they were.
    pub fn begin_search(&mut self, input: &str) -> Option<SearchTicket> {
        self.term = input.to_string();
        if !is_searchable(input) {
            return None;
        }
        self.latest_seq += 1;
        self.phase = Some(SearchPhase::Loading);
        Some(SearchTicket {
            seq: self.latest_seq,
            term: input.trim().to_string(),
        })
    }

    /// Apply a search response if its ticket is still current.
    ///
    /// A failed search empties the list and raises an error notice; either
    /// way the workspace lands in `Results`.
    pub fn complete_search<E: Display>(
        &mut self,
        ticket: &SearchTicket,
        outcome: Result<Vec<Rubric>, E>,
    ) -> Completion {
        if ticket.seq != self.latest_seq {
            tracing::debug!(
                ticket = ticket.seq,
                latest = self.latest_seq,
                "Discarding stale rubric search response"
            );
            return Completion::Stale;
        }

        match outcome {
            Ok(rubrics) => {
                self.results = rubrics;
            }
            Err(e) => {
                tracing::warn!(term = %ticket.term, "Rubric search failed: {e}");
                self.results.clear();
                self.notice = Some(Notice::error(SEARCH_FAILED));
            }
        }
        self.phase = Some(SearchPhase::Results);
        Completion::Applied
    }

    /// Make every outstanding ticket stale (used on sign-out).
    pub fn invalidate(&mut self) {
        self.latest_seq += 1;
    }

    /// Open a rubric from the current result list. Returns `false` when the
    /// id is not among the displayed results.
    pub fn select_rubric(&mut self, rubric_id: &Uuid) -> bool {
        match self.results.iter().find(|r| &r.id == rubric_id) {
            Some(rubric) => {
                self.selected = Some(rubric.clone());
                true
            }
            None => false,
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn needs_remedies(&self) -> bool {
        self.remedies.is_none()
    }

    /// Store the remedy list. Called once; a failed load stores an empty
    /// list so it is not retried for this workspace.
    pub fn set_remedies(&mut self, remedies: Vec<Remedy>) {
        self.remedies = Some(remedies);
    }

    pub fn selected_detail(&self) -> Option<RubricDetail> {
        self.selected
            .as_ref()
            .map(|r| rubric_detail(r, self.remedies.as_deref().unwrap_or(&[])))
    }

    /// Snapshot for the client. The pending notice is handed out once.
    pub fn render(&mut self) -> WorkspaceView {
        WorkspaceView {
            term: self.term.clone(),
            phase: self.phase(),
            result_count: self.results.len(),
            results: self.results.clone(),
            selected: self.selected_detail(),
            remedies: self.remedies.clone().unwrap_or_default(),
            notice: self.notice.take(),
        }
    }
}

// ═══════════════════════════════════════════
// Store access
// ═══════════════════════════════════════════

/// Run the query a ticket stands for.
pub fn fetch_rubrics(conn: &Connection, ticket: &SearchTicket) -> Result<Vec<Rubric>, DatabaseError> {
    db::search_rubrics(conn, ticket.term(), RUBRIC_RESULT_LIMIT)
}

pub fn fetch_remedies(conn: &Connection) -> Result<Vec<Remedy>, DatabaseError> {
    db::list_remedies(conn, REMEDY_LIST_LIMIT)
}
