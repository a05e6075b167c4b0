//! SQL schema for the Gatehouse SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Visitor profiles are owned by an external collaborator; this table holds
-- only what the visit core needs: the enrolment photo and the last-visit
-- marker.
CREATE TABLE IF NOT EXISTS visitors (
    visitor_id      TEXT PRIMARY KEY,
    full_name       TEXT NOT NULL,
    reference_image BLOB,
    last_visit_at   TEXT,            -- ISO 8601 UTC
    created_at      TEXT NOT NULL
);

-- visitor_id / host_id / department_id are references to externally owned
-- entities; no foreign keys on purpose. Status is only ever changed through
-- the conditioned UPDATE in store.rs and only ever moves forward.
CREATE TABLE IF NOT EXISTS visits (
    visit_id       TEXT PRIMARY KEY,
    visitor_id     TEXT NOT NULL,
    host_id        TEXT NOT NULL,
    department_id  TEXT,
    purpose        TEXT NOT NULL,
    status         TEXT NOT NULL,   -- 'pending'|'approved'|'rejected'|'checked_in'|'checked_out'
    submitted_at   TEXT NOT NULL,   -- ISO 8601 UTC; server-assigned
    decided_by     TEXT,
    decided_at     TEXT,
    checked_in_at  TEXT,
    checked_out_at TEXT
);

CREATE INDEX IF NOT EXISTS visits_visitor_status_idx
    ON visits(visitor_id, status, submitted_at);
CREATE INDEX IF NOT EXISTS visits_status_idx ON visits(status);

PRAGMA user_version = 1;
";
