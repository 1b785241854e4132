//! [`SqliteStore`]: the SQLite implementation of [`PlanStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use curricula_core::{
  events::{NewPlanEvent, PlanEvent},
  plan::CurricularPlan,
  store::{PersistedSubject, PlanStore},
  subject::{RecordId, Subject, SubjectDraft},
};

use crate::{
  Error, Result,
  encode::{
    RawEvent, RawSemester, RawSubject, SubjectRow, encode_date, encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A plan store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
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

  /// Open an in-memory store: useful for testing.
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
}

/// Give every subject without a store id a fresh one. Returns the
/// reconciled plan.
fn reconcile_ids(plan: &CurricularPlan) -> CurricularPlan {
  let mut reconciled = plan.clone();
  for subject in reconciled.subjects_mut() {
    if !matches!(subject.record_id, Some(RecordId::Synced(_))) {
      subject.record_id = Some(RecordId::Synced(Uuid::new_v4()));
    }
  }
  reconciled
}

fn synced_id(subject: &Subject) -> Result<Uuid> {
  match subject.record_id {
    Some(RecordId::Synced(id)) => Ok(id),
    _ => Err(Error::Decode(format!("subject {} has no store id", subject.code))),
  }
}

// ─── PlanStore impl ──────────────────────────────────────────────────────────

impl PlanStore for SqliteStore {
  type Error = Error;

  // ── Plans ─────────────────────────────────────────────────────────────────

  async fn load_plan(&self, student_id: Uuid) -> Result<Option<CurricularPlan>> {
    let id_str = encode_uuid(student_id);

    let rows: Option<(Vec<RawSemester>, Vec<RawSubject>)> = self
      .conn
      .call(move |conn| {
        let exists: bool = conn
          .query_row(
            "SELECT 1 FROM plans WHERE student_id = ?1",
            rusqlite::params![id_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        if !exists {
          return Ok(None);
        }

        let mut stmt = conn.prepare(
          "SELECT number, period, start_date, end_date
           FROM semesters WHERE student_id = ?1
           ORDER BY number",
        )?;
        let semesters = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawSemester {
              number:     row.get(0)?,
              period:     row.get(1)?,
              start_date: row.get(2)?,
              end_date:   row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = conn.prepare(
          "SELECT record_id, semester_number, code, name, credits,
                  state, grade, prerequisites
           FROM subjects WHERE student_id = ?1
           ORDER BY semester_number, position",
        )?;
        let subjects = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawSubject {
              record_id:       row.get(0)?,
              semester_number: row.get(1)?,
              code:            row.get(2)?,
              name:            row.get(3)?,
              credits:         row.get(4)?,
              state:           row.get(5)?,
              grade:           row.get(6)?,
              prerequisites:   row.get(7)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Some((semesters, subjects)))
      })
      .await?;

    let Some((raw_semesters, raw_subjects)) = rows else {
      return Ok(None);
    };

    let mut semesters = raw_semesters
      .into_iter()
      .map(RawSemester::into_semester)
      .collect::<Result<Vec<_>>>()?;

    for raw in raw_subjects {
      let (number, subject) = raw.into_subject()?;
      let semester = semesters
        .iter_mut()
        .find(|s| s.number == number)
        .ok_or_else(|| Error::Decode(format!("subject {} in unknown semester {number}", subject.code)))?;
      semester.subjects.push(subject);
    }

    Ok(Some(CurricularPlan::from_semesters(student_id, semesters)?))
  }

  async fn save_plan(&self, student_id: Uuid, plan: &CurricularPlan) -> Result<CurricularPlan> {
    plan.check_invariants()?;
    let mut saved = reconcile_ids(plan);
    saved.student_id = student_id;

    let id_str = encode_uuid(student_id);
    let at_str = encode_dt(Utc::now());

    let semester_rows: Vec<(i64, Option<String>, Option<String>, Option<String>)> = saved
      .semesters
      .iter()
      .map(|s| {
        (
          i64::from(s.number),
          s.period.clone(),
          s.start_date.map(encode_date),
          s.end_date.map(encode_date),
        )
      })
      .collect();

    let mut subject_rows = Vec::with_capacity(saved.subject_count());
    for sem in &saved.semesters {
      for (position, subject) in sem.subjects.iter().enumerate() {
        subject_rows.push(SubjectRow::encode(synced_id(subject)?, sem.number, position, subject)?);
      }
    }

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        tx.execute(
          "INSERT INTO plans (student_id, updated_at) VALUES (?1, ?2)
           ON CONFLICT (student_id) DO UPDATE SET updated_at = excluded.updated_at",
          rusqlite::params![id_str, at_str],
        )?;
        tx.execute("DELETE FROM subjects WHERE student_id = ?1", rusqlite::params![id_str])?;
        tx.execute("DELETE FROM semesters WHERE student_id = ?1", rusqlite::params![id_str])?;

        for (number, period, start, end) in semester_rows {
          tx.execute(
            "INSERT INTO semesters (student_id, number, period, start_date, end_date)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![id_str, number, period, start, end],
          )?;
        }

        for row in subject_rows {
          tx.execute(
            "INSERT INTO subjects (
               record_id, student_id, semester_number, position, code,
               name, credits, state, grade, prerequisites
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            rusqlite::params![
              row.record_id,
              id_str,
              row.semester_number,
              row.position,
              row.code,
              row.name,
              row.credits,
              row.state,
              row.grade,
              row.prerequisites,
            ],
          )?;
        }

        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(saved)
  }

  async fn create_subject_record(
    &self,
    student_id: Uuid,
    semester:   u32,
    draft:      &SubjectDraft,
  ) -> Result<PersistedSubject> {
    let mut subject = Subject::new(draft)?;
    let record_id = Uuid::new_v4();
    subject.record_id = Some(RecordId::Synced(record_id));

    let id_str = encode_uuid(student_id);
    let row = SubjectRow::encode(record_id, semester, 0, &subject)?;

    let inserted: bool = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let semester_exists: bool = tx
          .query_row(
            "SELECT 1 FROM semesters WHERE student_id = ?1 AND number = ?2",
            rusqlite::params![id_str, row.semester_number],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        if !semester_exists {
          return Ok(false);
        }

        let position: i64 = tx.query_row(
          "SELECT COALESCE(MAX(position) + 1, 0) FROM subjects
           WHERE student_id = ?1 AND semester_number = ?2",
          rusqlite::params![id_str, row.semester_number],
          |r| r.get(0),
        )?;

        tx.execute(
          "INSERT INTO subjects (
             record_id, student_id, semester_number, position, code,
             name, credits, state, grade, prerequisites
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
          rusqlite::params![
            row.record_id,
            id_str,
            row.semester_number,
            position,
            row.code,
            row.name,
            row.credits,
            row.state,
            row.grade,
            row.prerequisites,
          ],
        )?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !inserted {
      return Err(Error::SemesterNotFound { student_id, semester });
    }

    Ok(PersistedSubject { record_id, student_id, semester, subject })
  }

  // ── Audit log ─────────────────────────────────────────────────────────────

  async fn append_event(&self, event: NewPlanEvent) -> Result<PlanEvent> {
    let stored = PlanEvent {
      event_id:    Uuid::new_v4(),
      student_id:  event.student_id,
      mutation:    event.mutation,
      summary:     event.summary,
      synced:      event.synced,
      recorded_at: Utc::now(),
    };

    let event_id_str   = encode_uuid(stored.event_id);
    let student_id_str = encode_uuid(stored.student_id);
    let kind           = stored.mutation.kind().to_owned();
    let mutation_json  = serde_json::to_string(&stored.mutation)?;
    let summary        = stored.summary.clone();
    let synced         = stored.synced;
    let at_str         = encode_dt(stored.recorded_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO plan_events (
             event_id, student_id, kind, mutation_json, summary, synced, recorded_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            event_id_str,
            student_id_str,
            kind,
            mutation_json,
            summary,
            synced,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(stored)
  }

  async fn list_events(&self, student_id: Uuid) -> Result<Vec<PlanEvent>> {
    let id_str = encode_uuid(student_id);

    let raws: Vec<RawEvent> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT event_id, student_id, mutation_json, summary, synced, recorded_at
           FROM plan_events WHERE student_id = ?1
           ORDER BY rowid",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| {
            Ok(RawEvent {
              event_id:      row.get(0)?,
              student_id:    row.get(1)?,
              mutation_json: row.get(2)?,
              summary:       row.get(3)?,
              synced:        row.get(4)?,
              recorded_at:   row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEvent::into_event).collect()
  }
}
