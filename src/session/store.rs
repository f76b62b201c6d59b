//! Per-set state store - sparse edit state of a live training session

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::routine::RoutineExerciseId;

/// Raw state of one set as entered by the user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SerieState {
    pub weight: Option<String>, // Text as typed, not validated
    pub reps: Option<String>,
    pub done: bool,
}

/// Editable text fields of a set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerieField {
    Weight,
    Reps,
}

impl SerieField {
    pub fn label(&self) -> &'static str {
        match self {
            SerieField::Weight => "weight",
            SerieField::Reps => "reps",
        }
    }
}

/// Set states keyed by routine exercise, then by 1-based set index
#[derive(Debug, Clone, Default)]
pub struct SerieStore {
    entries: HashMap<RoutineExerciseId, BTreeMap<u32, SerieState>>,
}

impl SerieStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// State of a set; untouched sets read as not done
    pub fn get(&self, exercise_id: RoutineExerciseId, serie: u32) -> SerieState {
        self.lookup(exercise_id, serie).cloned().unwrap_or_default()
    }

    /// Borrowing variant of [`SerieStore::get`], `None` for untouched sets
    pub fn lookup(&self, exercise_id: RoutineExerciseId, serie: u32) -> Option<&SerieState> {
        self.entries.get(&exercise_id)?.get(&serie)
    }

    /// Replace one text field, keeping the rest of the record
    pub fn update_field(
        &mut self,
        exercise_id: RoutineExerciseId,
        serie: u32,
        field: SerieField,
        value: impl Into<String>,
    ) {
        let state = self.entry(exercise_id, serie);
        let value = Some(value.into());
        match field {
            SerieField::Weight => state.weight = value,
            SerieField::Reps => state.reps = value,
        }
    }

    /// Flip the done flag, keeping weight and reps
    pub fn toggle_done(&mut self, exercise_id: RoutineExerciseId, serie: u32) {
        let state = self.entry(exercise_id, serie);
        state.done = !state.done;
    }

    /// True once any set has been edited or toggled
    pub fn is_touched(&self) -> bool {
        self.entries.values().any(|series| !series.is_empty())
    }

    /// Number of sets currently marked done
    pub fn done_count(&self) -> usize {
        self.entries
            .values()
            .flat_map(|series| series.values())
            .filter(|s| s.done)
            .count()
    }

    fn entry(&mut self, exercise_id: RoutineExerciseId, serie: u32) -> &mut SerieState {
        self.entries
            .entry(exercise_id)
            .or_default()
            .entry(serie)
            .or_default()
    }
}
