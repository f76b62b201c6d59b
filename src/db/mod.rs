//! Database module - SQLite storage for routines and training sessions

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::exercises::find_exercise;
use crate::routine::{Routine, RoutineDraft, RoutineExercise, RoutineExerciseId};
use crate::session::{CompletedSession, FinalizedSet};

/// Saved training session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingSessionRecord {
    pub id: i64,
    pub routine_id: i64,
    pub routine_name: String,
    pub date: DateTime<Utc>,
    pub duration_secs: u64,
    pub recorded_sets: usize, // Sets saved with non-zero values
    pub total_sets: usize,
}

/// Stored set row; `order` is the 1-based set index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSetRecord {
    pub training_session_id: i64,
    pub routine_exercise_id: RoutineExerciseId,
    pub order: u32,
    pub weight: f64,
    pub reps: f64,
}

impl TrainingSetRecord {
    /// Map a finalized set onto its row, refusing values that are not finite numbers
    pub fn from_finalized(training_session_id: i64, set: &FinalizedSet) -> Result<Self, SaveError> {
        for (field, value) in [("weight", set.weight), ("reps", set.reps)] {
            if !value.is_finite() {
                return Err(SaveError::NonFiniteValue {
                    routine_exercise_id: set.routine_exercise_id,
                    order: set.serie_index,
                    field,
                });
            }
        }
        Ok(Self {
            training_session_id,
            routine_exercise_id: set.routine_exercise_id,
            order: set.serie_index,
            weight: set.weight,
            reps: set.reps,
        })
    }
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("set {order} of routine exercise {routine_exercise_id}: {field} is not a number")]
    NonFiniteValue {
        routine_exercise_id: RoutineExerciseId,
        order: u32,
        field: &'static str,
    },
    #[error("routine {0} not found")]
    RoutineNotFound(i64),
}

/// Database wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS routines (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS routine_exercises (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                routine_id INTEGER NOT NULL REFERENCES routines(id) ON DELETE CASCADE,
                exercise_id TEXT NOT NULL,
                position INTEGER NOT NULL,
                sets INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS training_sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                routine_id INTEGER NOT NULL REFERENCES routines(id) ON DELETE CASCADE,
                date TEXT NOT NULL,
                duration_secs INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS training_sets (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                training_session_id INTEGER NOT NULL REFERENCES training_sessions(id) ON DELETE CASCADE,
                routine_exercise_id INTEGER NOT NULL REFERENCES routine_exercises(id) ON DELETE CASCADE,
                \"order\" INTEGER NOT NULL,
                weight REAL NOT NULL,
                reps REAL NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Store a new routine, returns its id
    pub fn create_routine(&self, draft: &RoutineDraft) -> Result<i64> {
        draft.validate()?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO routines (name, created_at) VALUES (?1, ?2)",
            params![draft.name().trim(), Utc::now().to_rfc3339()],
        )?;
        let routine_id = tx.last_insert_rowid();

        for (position, exercise) in draft.exercises().iter().enumerate() {
            tx.execute(
                "INSERT INTO routine_exercises (routine_id, exercise_id, position, sets) VALUES (?1, ?2, ?3, ?4)",
                params![routine_id, exercise.exercise_id, position as i64, exercise.sets],
            )?;
        }
        tx.commit()?;

        info!("Routine created: {} (id: {})", draft.name().trim(), routine_id);
        Ok(routine_id)
    }

    /// Apply an edited draft. Kept exercises keep their ids so history stays attached.
    pub fn update_routine(&self, routine_id: i64, draft: &RoutineDraft) -> Result<()> {
        draft.validate()?;
        let existing = self
            .get_routine(routine_id)?
            .ok_or(SaveError::RoutineNotFound(routine_id))?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "UPDATE routines SET name = ?1 WHERE id = ?2",
            params![draft.name().trim(), routine_id],
        )?;

        for old in &existing.routine_exercises {
            if !draft.contains(&old.exercise_id) {
                tx.execute(
                    "DELETE FROM routine_exercises WHERE id = ?1",
                    params![old.routine_exercise_id],
                )?;
            }
        }

        for (position, exercise) in draft.exercises().iter().enumerate() {
            let kept = existing
                .routine_exercises
                .iter()
                .find(|e| e.exercise_id == exercise.exercise_id);
            match kept {
                Some(kept) => {
                    tx.execute(
                        "UPDATE routine_exercises SET position = ?1, sets = ?2 WHERE id = ?3",
                        params![position as i64, exercise.sets, kept.routine_exercise_id],
                    )?;
                }
                None => {
                    tx.execute(
                        "INSERT INTO routine_exercises (routine_id, exercise_id, position, sets) VALUES (?1, ?2, ?3, ?4)",
                        params![routine_id, exercise.exercise_id, position as i64, exercise.sets],
                    )?;
                }
            }
        }
        tx.commit()?;

        info!("Routine updated: {} (id: {})", draft.name().trim(), routine_id);
        Ok(())
    }

    /// Delete a routine with its exercises and session history
    pub fn delete_routine(&self, routine_id: i64) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM routines WHERE id = ?1", params![routine_id])?;
        Ok(deleted > 0)
    }

    pub fn get_routine(&self, routine_id: i64) -> Result<Option<Routine>> {
        let header = self
            .conn
            .query_row(
                "SELECT id, name, created_at FROM routines WHERE id = ?1",
                params![routine_id],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?, row.get::<_, String>(2)?)),
            )
            .optional()?;

        let Some((id, name, created_at)) = header else {
            return Ok(None);
        };

        Ok(Some(Routine {
            id,
            name,
            created_at: parse_date(&created_at),
            routine_exercises: self.get_routine_exercises(id)?,
        }))
    }

    /// Get all routines, newest first
    pub fn get_routines(&self) -> Result<Vec<Routine>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id FROM routines ORDER BY created_at DESC, id DESC")?;
        let ids = stmt
            .query_map([], |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut routines = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(routine) = self.get_routine(id)? {
                routines.push(routine);
            }
        }
        Ok(routines)
    }

    fn get_routine_exercises(&self, routine_id: i64) -> Result<Vec<RoutineExercise>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, exercise_id, sets FROM routine_exercises WHERE routine_id = ?1 ORDER BY position, id",
        )?;

        let exercises = stmt
            .query_map(params![routine_id], |row| {
                let exercise_id: String = row.get(1)?;
                Ok(RoutineExercise {
                    routine_exercise_id: row.get(0)?,
                    exercise_name: find_exercise(&exercise_id)
                        .map(|e| e.name.to_string())
                        .unwrap_or_else(|| exercise_id.clone()),
                    exercise_id,
                    sets: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(exercises)
    }

    /// Save a finished session and one row per planned set, all or nothing
    pub fn save_session(&self, session: &CompletedSession) -> Result<i64> {
        // Validate before touching the database
        let rows = session
            .sets
            .iter()
            .map(|set| TrainingSetRecord::from_finalized(0, set))
            .collect::<Result<Vec<_>, _>>()
            .inspect_err(|e| warn!("Training session rejected: {}", e))?;

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO training_sessions (routine_id, date, duration_secs) VALUES (?1, ?2, ?3)",
            params![
                session.routine_id,
                session.started_at.to_rfc3339(),
                session.duration_secs as i64,
            ],
        )?;
        let session_id = tx.last_insert_rowid();

        {
            let mut stmt = tx.prepare(
                "INSERT INTO training_sets (training_session_id, routine_exercise_id, \"order\", weight, reps) VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for row in &rows {
                stmt.execute(params![session_id, row.routine_exercise_id, row.order, row.weight, row.reps])?;
            }
        }
        tx.commit()?;

        info!(
            "Training session saved: id {} ({} sets, {}s)",
            session_id,
            rows.len(),
            session.duration_secs
        );
        Ok(session_id)
    }

    /// Get all training sessions, newest first
    pub fn get_training_sessions(&self) -> Result<Vec<TrainingSessionRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT s.id, s.routine_id, r.name, s.date, s.duration_secs,
                    (SELECT COUNT(*) FROM training_sets t WHERE t.training_session_id = s.id AND (t.weight != 0 OR t.reps != 0)),
                    (SELECT COUNT(*) FROM training_sets t WHERE t.training_session_id = s.id)
             FROM training_sessions s
             JOIN routines r ON r.id = s.routine_id
             ORDER BY s.date DESC, s.id DESC",
        )?;

        let sessions = stmt
            .query_map([], |row| {
                let date_str: String = row.get(3)?;
                Ok(TrainingSessionRecord {
                    id: row.get(0)?,
                    routine_id: row.get(1)?,
                    routine_name: row.get(2)?,
                    date: parse_date(&date_str),
                    duration_secs: row.get::<_, i64>(4)?.max(0) as u64,
                    recorded_sets: row.get::<_, i64>(5)? as usize,
                    total_sets: row.get::<_, i64>(6)? as usize,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(sessions)
    }

    /// Set rows of one session in the order they were saved
    pub fn get_session_sets(&self, session_id: i64) -> Result<Vec<TrainingSetRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT training_session_id, routine_exercise_id, \"order\", weight, reps
             FROM training_sets WHERE training_session_id = ?1 ORDER BY id",
        )?;

        let sets = stmt
            .query_map(params![session_id], |row| {
                Ok(TrainingSetRecord {
                    training_session_id: row.get(0)?,
                    routine_exercise_id: row.get(1)?,
                    order: row.get(2)?,
                    weight: row.get(3)?,
                    reps: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(sets)
    }

    /// Most recent non-zero (weight, reps) per set index of a routine exercise
    pub fn last_recorded_values(&self, routine_exercise_id: RoutineExerciseId) -> Result<BTreeMap<u32, (f64, f64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT t.\"order\", t.weight, t.reps
             FROM training_sets t
             JOIN training_sessions s ON s.id = t.training_session_id
             WHERE t.routine_exercise_id = ?1 AND (t.weight != 0 OR t.reps != 0)
             ORDER BY s.date, s.id",
        )?;

        let rows = stmt
            .query_map(params![routine_exercise_id], |row| {
                Ok((row.get::<_, u32>(0)?, row.get::<_, f64>(1)?, row.get::<_, f64>(2)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        // Later sessions overwrite earlier ones
        let mut values = BTreeMap::new();
        for (order, weight, reps) in rows {
            values.insert(order, (weight, reps));
        }
        Ok(values)
    }
}

fn parse_date(text: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(text)
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
