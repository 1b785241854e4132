//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, calendar dates as `YYYY-MM-DD`.
//! Prerequisite lists and audit mutations are stored as compact JSON. UUIDs
//! are stored as hyphenated lowercase strings.

use chrono::{DateTime, NaiveDate, Utc};
use curricula_core::{
  events::PlanEvent,
  mutation::Mutation,
  semester::Semester,
  subject::{RecordId, Subject, SubjectCode, SubjectState},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("timestamp {s:?}: {e}")))
}

// ─── NaiveDate ────────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::Decode(format!("date {s:?}: {e}")))
}

// ─── SubjectState ─────────────────────────────────────────────────────────────

pub fn encode_state(state: SubjectState) -> &'static str { state.into() }

pub fn decode_state(s: &str) -> Result<SubjectState> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown subject state: {s:?}")))
}

// ─── Prerequisites ────────────────────────────────────────────────────────────

pub fn encode_prerequisites(codes: &[SubjectCode]) -> Result<String> {
  Ok(serde_json::to_string(codes)?)
}

pub fn decode_prerequisites(s: &str) -> Result<Vec<SubjectCode>> {
  Ok(serde_json::from_str(s)?)
}

// ─── Numbers ──────────────────────────────────────────────────────────────────

fn decode_u32(column: &str, value: i64) -> Result<u32> {
  u32::try_from(value).map_err(|_| Error::Decode(format!("{column} out of range: {value}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `semesters` row.
pub struct RawSemester {
  pub number:     i64,
  pub period:     Option<String>,
  pub start_date: Option<String>,
  pub end_date:   Option<String>,
}

impl RawSemester {
  pub fn into_semester(self) -> Result<Semester> {
    Ok(Semester {
      number:     decode_u32("semester number", self.number)?,
      period:     self.period,
      start_date: self.start_date.as_deref().map(decode_date).transpose()?,
      end_date:   self.end_date.as_deref().map(decode_date).transpose()?,
      subjects:   Vec::new(),
    })
  }
}

/// Raw values read directly from a `subjects` row.
pub struct RawSubject {
  pub record_id:       String,
  pub semester_number: i64,
  pub code:            String,
  pub name:            String,
  pub credits:         i64,
  pub state:           String,
  pub grade:           Option<f64>,
  pub prerequisites:   String,
}

impl RawSubject {
  /// Decode into the owning semester number and the subject.
  pub fn into_subject(self) -> Result<(u32, Subject)> {
    let semester = decode_u32("semester number", self.semester_number)?;
    let subject = Subject {
      record_id:     Some(RecordId::Synced(decode_uuid(&self.record_id)?)),
      code:          SubjectCode::normalize(&self.code)?,
      name:          self.name,
      credits:       decode_u32("credits", self.credits)?,
      state:         decode_state(&self.state)?,
      grade:         self.grade,
      prerequisites: decode_prerequisites(&self.prerequisites)?,
    };
    Ok((semester, subject))
  }
}

/// Owned column values for inserting a `subjects` row.
pub struct SubjectRow {
  pub record_id:       String,
  pub semester_number: i64,
  pub position:        i64,
  pub code:            String,
  pub name:            String,
  pub credits:         i64,
  pub state:           &'static str,
  pub grade:           Option<f64>,
  pub prerequisites:   String,
}

impl SubjectRow {
  pub fn encode(record_id: Uuid, semester: u32, position: usize, subject: &Subject) -> Result<Self> {
    Ok(Self {
      record_id:       encode_uuid(record_id),
      semester_number: i64::from(semester),
      position:        i64::try_from(position)
        .map_err(|_| Error::Decode(format!("position out of range: {position}")))?,
      code:            subject.code.to_string(),
      name:            subject.name.clone(),
      credits:         i64::from(subject.credits),
      state:           encode_state(subject.state),
      grade:           subject.grade,
      prerequisites:   encode_prerequisites(&subject.prerequisites)?,
    })
  }
}

/// Raw values read directly from a `plan_events` row.
pub struct RawEvent {
  pub event_id:      String,
  pub student_id:    String,
  pub mutation_json: String,
  pub summary:       String,
  pub synced:        bool,
  pub recorded_at:   String,
}

impl RawEvent {
  pub fn into_event(self) -> Result<PlanEvent> {
    let mutation: Mutation = serde_json::from_str(&self.mutation_json)?;
    Ok(PlanEvent {
      event_id: decode_uuid(&self.event_id)?,
      student_id: decode_uuid(&self.student_id)?,
      mutation,
      summary: self.summary,
      synced: self.synced,
      recorded_at: decode_dt(&self.recorded_at)?,
    })
  }
}
