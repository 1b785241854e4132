//! SQL schema for the curricula SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One row per student that has ever had a plan saved.
CREATE TABLE IF NOT EXISTS plans (
    student_id  TEXT PRIMARY KEY,
    updated_at  TEXT NOT NULL      -- ISO 8601 UTC
);

CREATE TABLE IF NOT EXISTS semesters (
    student_id  TEXT    NOT NULL REFERENCES plans(student_id) ON DELETE CASCADE,
    number      INTEGER NOT NULL CHECK (number >= 1),
    period      TEXT,
    start_date  TEXT,              -- YYYY-MM-DD or NULL
    end_date    TEXT,              -- YYYY-MM-DD or NULL
    PRIMARY KEY (student_id, number)
);

-- Codes are unique per student across all semesters, not per semester.
CREATE TABLE IF NOT EXISTS subjects (
    record_id       TEXT    PRIMARY KEY,
    student_id      TEXT    NOT NULL,
    semester_number INTEGER NOT NULL,
    position        INTEGER NOT NULL,  -- display order within the semester
    code            TEXT    NOT NULL,  -- normalized
    name            TEXT    NOT NULL,
    credits         INTEGER NOT NULL CHECK (credits >= 0),
    state           TEXT    NOT NULL,  -- 'pending' | 'in_progress' | 'approved' | 'failed'
    grade           REAL,
    prerequisites   TEXT    NOT NULL DEFAULT '[]',  -- JSON array of codes
    UNIQUE (student_id, code),
    FOREIGN KEY (student_id, semester_number)
        REFERENCES semesters(student_id, number) ON DELETE CASCADE
);

-- Audit log; strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS plan_events (
    event_id      TEXT    PRIMARY KEY,
    student_id    TEXT    NOT NULL,
    kind          TEXT    NOT NULL,  -- Mutation discriminant
    mutation_json TEXT    NOT NULL,
    summary       TEXT    NOT NULL,
    synced        INTEGER NOT NULL,
    recorded_at   TEXT    NOT NULL   -- ISO 8601 UTC; server-assigned
);

CREATE INDEX IF NOT EXISTS subjects_student_idx ON subjects(student_id, semester_number, position);
CREATE INDEX IF NOT EXISTS events_student_idx   ON plan_events(student_id);

PRAGMA user_version = 1;
";
