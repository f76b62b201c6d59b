//! Routines - stored workout plans and the draft used to build them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::exercises::{Category, Exercise, filter_exercises, find_exercise};

/// Identifier of an exercise entry within a routine
pub type RoutineExerciseId = i64;

/// Sets given to an exercise when it is added to a draft
pub const DEFAULT_SETS: u32 = 3;

/// Stored routine, as read back from the database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Routine {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub routine_exercises: Vec<RoutineExercise>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineExercise {
    pub routine_exercise_id: RoutineExerciseId,
    pub exercise_id: String,
    pub exercise_name: String, // Display only
    pub sets: u32,             // Planned sets
}

impl Routine {
    /// Total number of planned sets across all exercises
    pub fn planned_sets(&self) -> usize {
        self.routine_exercises.iter().map(|e| e.sets as usize).sum()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoutineError {
    #[error("routine name is empty")]
    EmptyName,
    #[error("routine has no exercises")]
    NoExercises,
    #[error("unknown exercise: {0}")]
    UnknownExercise(String),
    #[error("exercise already in routine: {0}")]
    DuplicateExercise(String),
    #[error("exercise not in routine: {0}")]
    NotInRoutine(String),
    #[error("{exercise} needs at least one set")]
    NoSets { exercise: String },
    #[error("invalid exercise argument {0:?}, expected `id` or `id:sets`")]
    InvalidExerciseArg(String),
}

/// Split an `id` or `id:sets` argument into its parts
pub fn parse_exercise_arg(arg: &str) -> Result<(&str, Option<u32>), RoutineError> {
    match arg.split_once(':') {
        Some((id, sets)) => {
            let sets = sets
                .trim()
                .parse::<u32>()
                .map_err(|_| RoutineError::InvalidExerciseArg(arg.to_string()))?;
            Ok((id.trim(), Some(sets)))
        }
        None => Ok((arg.trim(), None)),
    }
}

/// Changes to apply to an existing routine, in the form given on the command line
#[derive(Debug, Clone, Default)]
pub struct RoutineEdit {
    pub name: Option<String>,
    pub add: Vec<String>,    // `id` or `id:sets`
    pub remove: Vec<String>, // exercise ids
    pub sets: Vec<String>,   // `id:sets`
}

impl RoutineEdit {
    /// Apply removals, then set counts, then additions
    pub fn apply(&self, draft: &mut RoutineDraft) -> Result<(), RoutineError> {
        if let Some(name) = &self.name {
            draft.set_name(name.as_str());
        }
        for id in &self.remove {
            draft.remove_exercise(id.trim())?;
        }
        for arg in &self.sets {
            match parse_exercise_arg(arg)? {
                (id, Some(sets)) => draft.set_sets(id, sets)?,
                (_, None) => return Err(RoutineError::InvalidExerciseArg(arg.clone())),
            }
        }
        for arg in &self.add {
            match parse_exercise_arg(arg)? {
                (id, Some(sets)) => draft.add_exercise_with_sets(id, sets)?,
                (id, None) => draft.add_exercise(id)?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftExercise {
    pub exercise_id: String,
    pub sets: u32,
}

/// Editable routine form state
#[derive(Debug, Clone, PartialEq)]
pub struct RoutineDraft {
    name: String,
    exercises: Vec<DraftExercise>,
    saved: (String, Vec<DraftExercise>), // Snapshot for the unsaved-changes check
}

impl Default for RoutineDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl RoutineDraft {
    /// Empty draft for a new routine
    pub fn new() -> Self {
        Self {
            name: String::new(),
            exercises: Vec::new(),
            saved: (String::new(), Vec::new()),
        }
    }

    /// Draft pre-filled from a stored routine, for editing
    pub fn from_routine(routine: &Routine) -> Self {
        let name = routine.name.clone();
        let exercises: Vec<_> = routine
            .routine_exercises
            .iter()
            .map(|e| DraftExercise {
                exercise_id: e.exercise_id.clone(),
                sets: e.sets,
            })
            .collect();
        Self {
            saved: (name.clone(), exercises.clone()),
            name,
            exercises,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn exercises(&self) -> &[DraftExercise] {
        &self.exercises
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn contains(&self, exercise_id: &str) -> bool {
        self.exercises.iter().any(|e| e.exercise_id == exercise_id)
    }

    pub fn add_exercise(&mut self, exercise_id: &str) -> Result<(), RoutineError> {
        self.add_exercise_with_sets(exercise_id, DEFAULT_SETS)
    }

    pub fn add_exercise_with_sets(&mut self, exercise_id: &str, sets: u32) -> Result<(), RoutineError> {
        if find_exercise(exercise_id).is_none() {
            return Err(RoutineError::UnknownExercise(exercise_id.to_string()));
        }
        if self.contains(exercise_id) {
            return Err(RoutineError::DuplicateExercise(exercise_id.to_string()));
        }
        self.exercises.push(DraftExercise {
            exercise_id: exercise_id.to_string(),
            sets,
        });
        Ok(())
    }

    pub fn remove_exercise(&mut self, exercise_id: &str) -> Result<(), RoutineError> {
        let before = self.exercises.len();
        self.exercises.retain(|e| e.exercise_id != exercise_id);
        if self.exercises.len() == before {
            return Err(RoutineError::NotInRoutine(exercise_id.to_string()));
        }
        Ok(())
    }

    pub fn set_sets(&mut self, exercise_id: &str, sets: u32) -> Result<(), RoutineError> {
        let entry = self
            .exercises
            .iter_mut()
            .find(|e| e.exercise_id == exercise_id)
            .ok_or_else(|| RoutineError::NotInRoutine(exercise_id.to_string()))?;
        entry.sets = sets;
        Ok(())
    }

    /// Catalog exercises that can still be added, filtered by category and search text
    pub fn available_exercises(&self, category: Option<Category>, query: &str) -> Vec<&'static Exercise> {
        filter_exercises(category, query)
            .into_iter()
            .filter(|e| !self.contains(e.id))
            .collect()
    }

    pub fn validate(&self) -> Result<(), RoutineError> {
        if self.name.trim().is_empty() {
            return Err(RoutineError::EmptyName);
        }
        if self.exercises.is_empty() {
            return Err(RoutineError::NoExercises);
        }
        if let Some(e) = self.exercises.iter().find(|e| e.sets == 0) {
            return Err(RoutineError::NoSets {
                exercise: e.exercise_id.clone(),
            });
        }
        Ok(())
    }

    /// Changed since created or last marked saved
    pub fn is_dirty(&self) -> bool {
        let (name, exercises) = &self.saved;
        name != &self.name || exercises != &self.exercises
    }

    pub fn mark_saved(&mut self) {
        self.saved = (self.name.clone(), self.exercises.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_draft() -> RoutineDraft {
        let mut draft = RoutineDraft::new();
        draft.set_name("upper body");
        draft.add_exercise("bench_press").unwrap();
        draft.add_exercise_with_sets("pull_up", 4).unwrap();
        draft
    }

    #[test]
    fn test_planned_sets() {
        let routine = Routine {
            id: 1,
            name: "r".to_string(),
            created_at: Utc::now(),
            routine_exercises: vec![
                RoutineExercise {
                    routine_exercise_id: 1,
                    exercise_id: "plank".to_string(),
                    exercise_name: "plank".to_string(),
                    sets: 3,
                },
                RoutineExercise {
                    routine_exercise_id: 2,
                    exercise_id: "dips".to_string(),
                    exercise_name: "dips".to_string(),
                    sets: 2,
                },
            ],
        };
        assert_eq!(routine.planned_sets(), 5);
    }

    #[test]
    fn test_add_exercise_defaults() {
        let draft = create_draft();
        assert_eq!(draft.exercises()[0].sets, DEFAULT_SETS);
        assert_eq!(draft.exercises()[1].sets, 4);
    }

    #[test]
    fn test_add_unknown_and_duplicate() {
        let mut draft = create_draft();
        assert_eq!(
            draft.add_exercise("flying_kick"),
            Err(RoutineError::UnknownExercise("flying_kick".to_string()))
        );
        assert_eq!(
            draft.add_exercise("pull_up"),
            Err(RoutineError::DuplicateExercise("pull_up".to_string()))
        );
        assert_eq!(draft.exercises().len(), 2);
    }

    #[test]
    fn test_remove_and_set_sets() {
        let mut draft = create_draft();
        draft.set_sets("bench_press", 5).unwrap();
        assert_eq!(draft.exercises()[0].sets, 5);

        draft.remove_exercise("bench_press").unwrap();
        assert!(!draft.contains("bench_press"));
        assert!(draft.remove_exercise("bench_press").is_err());
        assert!(draft.set_sets("bench_press", 1).is_err());
    }

    #[test]
    fn test_available_excludes_added() {
        let draft = create_draft();
        let available = draft.available_exercises(None, "");
        assert!(available.iter().all(|e| e.id != "bench_press" && e.id != "pull_up"));
        assert_eq!(available.len(), crate::exercises::all_exercises().len() - 2);

        let push: Vec<_> = draft
            .available_exercises(Some(Category::Push), "press")
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(push, vec!["overhead_press"]);
    }

    #[test]
    fn test_validate() {
        let mut draft = RoutineDraft::new();
        assert_eq!(draft.validate(), Err(RoutineError::EmptyName));

        draft.set_name("  ");
        assert_eq!(draft.validate(), Err(RoutineError::EmptyName));

        draft.set_name("legs");
        assert_eq!(draft.validate(), Err(RoutineError::NoExercises));

        draft.add_exercise_with_sets("back_squat", 0).unwrap();
        assert_eq!(
            draft.validate(),
            Err(RoutineError::NoSets {
                exercise: "back_squat".to_string()
            })
        );

        draft.set_sets("back_squat", 5).unwrap();
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_dirty_tracking() {
        let mut draft = RoutineDraft::new();
        assert!(!draft.is_dirty());

        draft.set_name("core");
        assert!(draft.is_dirty());

        draft.mark_saved();
        assert!(!draft.is_dirty());

        draft.add_exercise("plank").unwrap();
        assert!(draft.is_dirty());
        draft.remove_exercise("plank").unwrap();
        assert!(!draft.is_dirty());
    }

    #[test]
    fn test_from_routine_is_clean() {
        let routine = Routine {
            id: 3,
            name: "pull".to_string(),
            created_at: Utc::now(),
            routine_exercises: vec![RoutineExercise {
                routine_exercise_id: 10,
                exercise_id: "barbell_row".to_string(),
                exercise_name: "barbell row".to_string(),
                sets: 4,
            }],
        };
        let mut draft = RoutineDraft::from_routine(&routine);
        assert!(!draft.is_dirty());
        assert_eq!(draft.name(), "pull");
        assert_eq!(draft.exercises()[0].sets, 4);

        draft.set_sets("barbell_row", 5).unwrap();
        assert!(draft.is_dirty());
    }

    #[test]
    fn test_parse_exercise_arg() {
        assert_eq!(parse_exercise_arg("plank"), Ok(("plank", None)));
        assert_eq!(parse_exercise_arg(" dips : 4 "), Ok(("dips", Some(4))));
        assert_eq!(
            parse_exercise_arg("dips:many"),
            Err(RoutineError::InvalidExerciseArg("dips:many".to_string()))
        );
    }

    #[test]
    fn test_edit_apply() {
        let mut draft = create_draft();
        draft.mark_saved();

        let edit = RoutineEdit {
            name: Some("upper".to_string()),
            add: vec!["dips:2".to_string(), "push_up".to_string()],
            remove: vec!["pull_up".to_string()],
            sets: vec!["bench_press:5".to_string()],
        };
        edit.apply(&mut draft).unwrap();

        assert!(draft.is_dirty());
        assert_eq!(draft.name(), "upper");
        let plan: Vec<_> = draft
            .exercises()
            .iter()
            .map(|e| (e.exercise_id.as_str(), e.sets))
            .collect();
        assert_eq!(plan, vec![("bench_press", 5), ("dips", 2), ("push_up", DEFAULT_SETS)]);
    }

    #[test]
    fn test_edit_without_changes_is_clean() {
        let mut draft = create_draft();
        draft.mark_saved();

        RoutineEdit::default().apply(&mut draft).unwrap();
        assert!(!draft.is_dirty());

        let same_sets = RoutineEdit {
            sets: vec!["pull_up:4".to_string()],
            ..Default::default()
        };
        same_sets.apply(&mut draft).unwrap();
        assert!(!draft.is_dirty());
    }

    #[test]
    fn test_edit_errors() {
        let mut draft = create_draft();
        let missing_count = RoutineEdit {
            sets: vec!["pull_up".to_string()],
            ..Default::default()
        };
        assert_eq!(
            missing_count.apply(&mut draft),
            Err(RoutineError::InvalidExerciseArg("pull_up".to_string()))
        );

        let unknown = RoutineEdit {
            remove: vec!["deadlift".to_string()],
            ..Default::default()
        };
        assert_eq!(
            unknown.apply(&mut draft),
            Err(RoutineError::NotInRoutine("deadlift".to_string()))
        );
    }
}
