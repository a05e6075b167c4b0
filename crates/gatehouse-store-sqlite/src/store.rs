//! [`SqliteStore`] — the SQLite implementation of [`VisitStore`] and
//! [`VisitorDirectory`].

use std::path::Path;

use bytes::Bytes;
use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use gatehouse_core::{
  store::{TransitionOutcome, VisitStore, VisitorDirectory},
  transition::VisitPatch,
  visit::{NewVisit, Visit, VisitStatus},
  visitor::Visitor,
};

use crate::{
  Error, Result,
  encode::{RawVisit, RawVisitor, encode_dt, encode_status, encode_uuid},
  schema::SCHEMA,
};

/// What the conditioned UPDATE observed, before decoding.
enum CasRow {
  Applied(RawVisit),
  Mismatch(String),
  Missing,
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Gatehouse visit store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All calls on
/// one connection are serialised onto its worker thread, so the check-and-
/// update inside [`VisitStore::transition`] is atomic with respect to every
/// other write.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Visitor enrolment ─────────────────────────────────────────────────────

  /// Create a visitor record, optionally with an enrolment photo.
  ///
  /// Visitor profile CRUD belongs to an external collaborator; this minimal
  /// surface exists so the biometric path has something to resolve against.
  pub async fn add_visitor(
    &self,
    full_name: impl Into<String>,
    reference_image: Option<Bytes>,
  ) -> Result<Visitor> {
    let visitor = Visitor {
      visitor_id:          Uuid::new_v4(),
      full_name:           full_name.into(),
      has_reference_image: reference_image.is_some(),
      last_visit_at:       None,
    };

    let id_str   = encode_uuid(visitor.visitor_id);
    let name     = visitor.full_name.clone();
    let image    = reference_image.map(|b| b.to_vec());
    let at_str   = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO visitors (visitor_id, full_name, reference_image, created_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, name, image, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(visitor)
  }

  /// Attach or replace a visitor's enrolment photo.
  pub async fn set_reference_image(
    &self,
    visitor_id: Uuid,
    image: Bytes,
  ) -> Result<()> {
    let id_str = encode_uuid(visitor_id);
    let image = image.to_vec();

    let rows = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE visitors SET reference_image = ?2 WHERE visitor_id = ?1",
          rusqlite::params![id_str, image],
        )?)
      })
      .await?;

    if rows == 0 {
      return Err(Error::VisitorNotFound(visitor_id));
    }
    Ok(())
  }
}

// ─── VisitStore impl ─────────────────────────────────────────────────────────

impl VisitStore for SqliteStore {
  type Error = Error;

  async fn add_visit(&self, input: NewVisit) -> Result<Visit> {
    let visit = Visit {
      visit_id: Uuid::new_v4(),
      visitor_id: input.visitor_id,
      host_id: input.host_id,
      department_id: input.department_id,
      purpose: input.purpose,
      status: VisitStatus::Pending,
      submitted_at: Utc::now(),
      decision: None,
      checked_in_at: None,
      checked_out_at: None,
    };

    let visit_id_str   = encode_uuid(visit.visit_id);
    let visitor_id_str = encode_uuid(visit.visitor_id);
    let host_id_str    = encode_uuid(visit.host_id);
    let dept_str       = visit.department_id.map(encode_uuid);
    let purpose        = visit.purpose.clone();
    let status_str     = encode_status(visit.status);
    let submitted_str  = encode_dt(visit.submitted_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO visits (
             visit_id, visitor_id, host_id, department_id, purpose,
             status, submitted_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            visit_id_str,
            visitor_id_str,
            host_id_str,
            dept_str,
            purpose,
            status_str,
            submitted_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(visit)
  }

  async fn get_visit(&self, id: Uuid) -> Result<Option<Visit>> {
    let id_str = encode_uuid(id);
    let sql = format!(
      "SELECT {} FROM visits WHERE visit_id = ?1",
      RawVisit::COLUMNS
    );

    let raw: Option<RawVisit> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawVisit::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawVisit::into_visit).transpose()
  }

  async fn list_visits(&self, status: Option<VisitStatus>) -> Result<Vec<Visit>> {
    let status_str = status.map(encode_status);

    let raws: Vec<RawVisit> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(s) = status_str {
          let sql = format!(
            "SELECT {} FROM visits WHERE status = ?1 ORDER BY submitted_at DESC",
            RawVisit::COLUMNS
          );
          let mut stmt = conn.prepare(&sql)?;
          stmt
            .query_map(rusqlite::params![s], RawVisit::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let sql = format!(
            "SELECT {} FROM visits ORDER BY submitted_at DESC",
            RawVisit::COLUMNS
          );
          let mut stmt = conn.prepare(&sql)?;
          stmt
            .query_map([], RawVisit::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawVisit::into_visit).collect()
  }

  async fn latest_visit_in_status(
    &self,
    visitor_id: Uuid,
    status: VisitStatus,
  ) -> Result<Option<Visit>> {
    let visitor_str = encode_uuid(visitor_id);
    let status_str = encode_status(status);
    let sql = format!(
      "SELECT {} FROM visits
       WHERE visitor_id = ?1 AND status = ?2
       ORDER BY submitted_at DESC
       LIMIT 1",
      RawVisit::COLUMNS
    );

    let raw: Option<RawVisit> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &sql,
              rusqlite::params![visitor_str, status_str],
              RawVisit::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawVisit::into_visit).transpose()
  }

  async fn transition(
    &self,
    visit_id: Uuid,
    expected: VisitStatus,
    patch: VisitPatch,
  ) -> Result<TransitionOutcome> {
    let id_str       = encode_uuid(visit_id);
    let new_status   = encode_status(patch.status);
    let expected_str = encode_status(expected);
    let decided_by   = patch.decision.map(|d| encode_uuid(d.decided_by));
    let decided_at   = patch.decision.map(|d| encode_dt(d.decided_at));
    let check_in     = patch.checked_in_at.map(encode_dt);
    let check_out    = patch.checked_out_at.map(encode_dt);
    let select_sql = format!(
      "SELECT {} FROM visits WHERE visit_id = ?1",
      RawVisit::COLUMNS
    );

    // The whole compare-and-set runs inside one `call`, on the connection's
    // single worker thread, so no other write can interleave.
    let cas: CasRow = self
      .conn
      .call(move |conn| {
        let updated = conn.execute(
          "UPDATE visits SET
             status         = ?2,
             decided_by     = COALESCE(?3, decided_by),
             decided_at     = COALESCE(?4, decided_at),
             checked_in_at  = COALESCE(?5, checked_in_at),
             checked_out_at = COALESCE(?6, checked_out_at)
           WHERE visit_id = ?1 AND status = ?7",
          rusqlite::params![
            id_str,
            new_status,
            decided_by,
            decided_at,
            check_in,
            check_out,
            expected_str,
          ],
        )?;

        if updated == 1 {
          let raw = conn.query_row(
            &select_sql,
            rusqlite::params![id_str],
            RawVisit::from_row,
          )?;
          return Ok(CasRow::Applied(raw));
        }

        // Nothing written: either the status moved under us or the visit is
        // gone. Re-read to report which.
        let actual: Option<String> = conn
          .query_row(
            "SELECT status FROM visits WHERE visit_id = ?1",
            rusqlite::params![id_str],
            |row| row.get(0),
          )
          .optional()?;

        Ok(match actual {
          Some(status) => CasRow::Mismatch(status),
          None => CasRow::Missing,
        })
      })
      .await?;

    match cas {
      CasRow::Applied(raw) => Ok(TransitionOutcome::Applied(raw.into_visit()?)),
      CasRow::Mismatch(status) => Ok(TransitionOutcome::StatusMismatch {
        actual: crate::encode::parse_status(&status)?,
      }),
      CasRow::Missing => Err(Error::VisitNotFound(visit_id)),
    }
  }
}

// ─── VisitorDirectory impl ───────────────────────────────────────────────────

impl VisitorDirectory for SqliteStore {
  type Error = Error;

  async fn get_visitor(&self, id: Uuid) -> Result<Option<Visitor>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawVisitor> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT visitor_id, full_name,
                      reference_image IS NOT NULL,
                      last_visit_at
               FROM visitors WHERE visitor_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawVisitor {
                  visitor_id:          row.get(0)?,
                  full_name:           row.get(1)?,
                  has_reference_image: row.get(2)?,
                  last_visit_at:       row.get(3)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawVisitor::into_visitor).transpose()
  }

  async fn refresh_last_visit(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    let at_str = encode_dt(Utc::now());

    let rows = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE visitors SET last_visit_at = ?2 WHERE visitor_id = ?1",
          rusqlite::params![id_str, at_str],
        )?)
      })
      .await?;

    if rows == 0 {
      return Err(Error::VisitorNotFound(id));
    }
    Ok(())
  }

  async fn reference_image(&self, id: Uuid) -> Result<Option<Bytes>> {
    let id_str = encode_uuid(id);

    let image: Option<Option<Vec<u8>>> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT reference_image FROM visitors WHERE visitor_id = ?1",
              rusqlite::params![id_str],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    Ok(image.flatten().map(Bytes::from))
  }
}
