//! Column encode/decode helpers and raw row types.
//!
//! Everything is stored as TEXT: UUIDs in hyphenated form, timestamps as
//! RFC 3339 UTC, enums through their strum string forms.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use gatehouse_core::visit::{Decision, Visit, VisitStatus};

use crate::{Error, Result};

pub fn encode_uuid(id: Uuid) -> String { id.to_string() }

pub fn parse_uuid(s: &str) -> Result<Uuid> {
  Uuid::parse_str(s).map_err(Error::Uuid)
}

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn parse_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

pub fn encode_status(status: VisitStatus) -> String { status.to_string() }

pub fn parse_status(s: &str) -> Result<VisitStatus> {
  Ok(s.parse::<VisitStatus>()?)
}

// ─── Raw rows ────────────────────────────────────────────────────────────────

/// A `visits` row as it comes off the wire, before decoding.
pub struct RawVisit {
  pub visit_id:       String,
  pub visitor_id:     String,
  pub host_id:        String,
  pub department_id:  Option<String>,
  pub purpose:        String,
  pub status:         String,
  pub submitted_at:   String,
  pub decided_by:     Option<String>,
  pub decided_at:     Option<String>,
  pub checked_in_at:  Option<String>,
  pub checked_out_at: Option<String>,
}

impl RawVisit {
  /// Column list matching [`Self::from_row`]; keep the two in sync.
  pub const COLUMNS: &'static str = "visit_id, visitor_id, host_id, \
     department_id, purpose, status, submitted_at, decided_by, decided_at, \
     checked_in_at, checked_out_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      visit_id:       row.get(0)?,
      visitor_id:     row.get(1)?,
      host_id:        row.get(2)?,
      department_id:  row.get(3)?,
      purpose:        row.get(4)?,
      status:         row.get(5)?,
      submitted_at:   row.get(6)?,
      decided_by:     row.get(7)?,
      decided_at:     row.get(8)?,
      checked_in_at:  row.get(9)?,
      checked_out_at: row.get(10)?,
    })
  }

  pub fn into_visit(self) -> Result<Visit> {
    // decided_by and decided_at are written together; treat a half-set pair
    // as absent rather than inventing a timestamp.
    let decision = match (self.decided_by, self.decided_at) {
      (Some(by), Some(at)) => Some(Decision {
        decided_by: parse_uuid(&by)?,
        decided_at: parse_dt(&at)?,
      }),
      _ => None,
    };

    Ok(Visit {
      visit_id: parse_uuid(&self.visit_id)?,
      visitor_id: parse_uuid(&self.visitor_id)?,
      host_id: parse_uuid(&self.host_id)?,
      department_id: self
        .department_id
        .as_deref()
        .map(parse_uuid)
        .transpose()?,
      purpose: self.purpose,
      status: parse_status(&self.status)?,
      submitted_at: parse_dt(&self.submitted_at)?,
      decision,
      checked_in_at: self
        .checked_in_at
        .as_deref()
        .map(parse_dt)
        .transpose()?,
      checked_out_at: self
        .checked_out_at
        .as_deref()
        .map(parse_dt)
        .transpose()?,
    })
  }
}

/// A `visitors` row; `has_reference_image` is computed in SQL so the BLOB
/// never crosses the thread-pool boundary on plain reads.
pub struct RawVisitor {
  pub visitor_id:          String,
  pub full_name:           String,
  pub has_reference_image: bool,
  pub last_visit_at:       Option<String>,
}

impl RawVisitor {
  pub fn into_visitor(self) -> Result<gatehouse_core::visitor::Visitor> {
    Ok(gatehouse_core::visitor::Visitor {
      visitor_id: parse_uuid(&self.visitor_id)?,
      full_name: self.full_name,
      has_reference_image: self.has_reference_image,
      last_visit_at: self
        .last_visit_at
        .as_deref()
        .map(parse_dt)
        .transpose()?,
    })
  }
}
