//! Live training session - set tracking, elapsed time and the final payload
//!
//! A session is started from a routine, edited set by set while training,
//! and either finished (producing the records to save) or discarded.

pub mod finalize;
pub mod store;
pub mod timer;

pub use finalize::{FinalizedSet, build_finalized_sets, coerce_number};
pub use store::{SerieField, SerieState, SerieStore};
pub use timer::{ElapsedTimer, format_time};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::routine::{Routine, RoutineExerciseId};

/// Result of a finished session, ready to be saved
#[derive(Debug, Clone, Serialize)]
pub struct CompletedSession {
    pub routine_id: i64,
    pub started_at: DateTime<Utc>,
    pub duration_secs: u64,
    pub sets: Vec<FinalizedSet>,
}

impl CompletedSession {
    /// Sets the user actually completed
    pub fn done_sets(&self) -> usize {
        self.sets.iter().filter(|s| !s.previous).count()
    }
}

pub struct TrainingSession {
    routine: Routine,
    series: SerieStore,
    timer: ElapsedTimer,
    started_at: DateTime<Utc>,
}

impl TrainingSession {
    /// Start a session for a routine. Requires a tokio runtime for the timer.
    pub fn start(routine: Routine) -> Self {
        info!(
            "Training session started: {} ({} planned sets)",
            routine.name,
            routine.planned_sets()
        );
        Self {
            routine,
            series: SerieStore::new(),
            timer: ElapsedTimer::start(),
            started_at: Utc::now(),
        }
    }

    pub fn routine(&self) -> &Routine {
        &self.routine
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn series(&self) -> &SerieStore {
        &self.series
    }

    pub fn serie(&self, exercise_id: RoutineExerciseId, serie: u32) -> SerieState {
        self.series.get(exercise_id, serie)
    }

    pub fn update_field(
        &mut self,
        exercise_id: RoutineExerciseId,
        serie: u32,
        field: SerieField,
        value: impl Into<String>,
    ) {
        self.series.update_field(exercise_id, serie, field, value);
    }

    pub fn toggle_done(&mut self, exercise_id: RoutineExerciseId, serie: u32) {
        self.series.toggle_done(exercise_id, serie);
        debug!(exercise_id, serie, "Set toggled");
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.timer.elapsed_secs()
    }

    pub fn elapsed_label(&self) -> String {
        format_time(self.elapsed_secs())
    }

    /// Whether leaving now would lose entered data
    pub fn has_unsaved_changes(&self) -> bool {
        self.series.is_touched()
    }

    /// Stop the timer and build the records for every planned set
    pub fn finish(mut self) -> CompletedSession {
        let duration_secs = self.timer.stop();
        let sets = build_finalized_sets(&self.routine, &self.series);

        let completed = CompletedSession {
            routine_id: self.routine.id,
            started_at: self.started_at,
            duration_secs,
            sets,
        };
        info!(
            "Training session finished: {} in {} ({}/{} sets done)",
            self.routine.name,
            format_time(duration_secs),
            completed.done_sets(),
            completed.sets.len()
        );
        completed
    }

    /// Stop the timer and drop everything entered
    pub fn discard(mut self) {
        let secs = self.timer.stop();
        info!("Training session discarded after {}", format_time(secs));
    }
}
