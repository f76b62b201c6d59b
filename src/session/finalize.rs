//! Finalized-set builder - turns sparse set state into a full persistence payload
//!
//! Every planned set of the routine produces exactly one record. Sets the user
//! did not mark done are zero-filled and flagged `previous`, telling the backend
//! to keep the last known values for them.

use serde::{Deserialize, Serialize};

use super::store::{SerieState, SerieStore};
use crate::routine::{Routine, RoutineExerciseId};

/// One persisted set record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizedSet {
    pub routine_exercise_id: RoutineExerciseId,
    pub serie_index: u32, // 1-based, stored as `order`
    pub reps: f64,
    pub weight: f64,
    pub previous: bool,
}

impl FinalizedSet {
    fn from_state(routine_exercise_id: RoutineExerciseId, serie_index: u32, state: &SerieState) -> Self {
        if state.done {
            Self {
                routine_exercise_id,
                serie_index,
                reps: coerce_number(state.reps.as_deref()),
                weight: coerce_number(state.weight.as_deref()),
                previous: false,
            }
        } else {
            Self {
                routine_exercise_id,
                serie_index,
                reps: 0.0,
                weight: 0.0,
                previous: true,
            }
        }
    }

    /// Both numeric fields are finite numbers
    pub fn is_finite(&self) -> bool {
        self.reps.is_finite() && self.weight.is_finite()
    }
}

/// Expand the routine plan into one record per planned set.
///
/// Output follows routine exercise order, then ascending set index from 1.
pub fn build_finalized_sets(routine: &Routine, series: &SerieStore) -> Vec<FinalizedSet> {
    let untouched = SerieState::default();
    let mut sets = Vec::with_capacity(routine.planned_sets());

    for exercise in &routine.routine_exercises {
        for serie in 1..=exercise.sets {
            let state = series
                .lookup(exercise.routine_exercise_id, serie)
                .unwrap_or(&untouched);
            sets.push(FinalizedSet::from_state(exercise.routine_exercise_id, serie, state));
        }
    }

    sets
}

/// Numeric value of a text entry, following loose number-literal rules.
///
/// Missing and blank input is `0`. Text that is not a number yields `NaN`,
/// which is passed through as is.
pub fn coerce_number(raw: Option<&str>) -> f64 {
    let Some(raw) = raw else {
        return 0.0;
    };
    let text = raw.trim_matches(is_number_whitespace);
    if text.is_empty() {
        return 0.0;
    }

    match text {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    let radix = match text.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return parse_radix_digits(&text[2..], radix);
    }

    // str::parse also takes "inf" and "nan" spellings, which are not numbers here
    let is_decimal_literal = text
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '+' | '-' | 'e' | 'E'));
    if !is_decimal_literal {
        return f64::NAN;
    }

    text.parse::<f64>().unwrap_or(f64::NAN)
}

/// Whitespace and line terminators allowed around a number literal
fn is_number_whitespace(c: char) -> bool {
    matches!(
        c,
        '\u{0009}' | '\u{000A}' | '\u{000B}' | '\u{000C}' | '\u{000D}' | '\u{0020}' | '\u{00A0}'
            | '\u{1680}' | '\u{2000}'..='\u{200A}' | '\u{2028}' | '\u{2029}' | '\u{202F}'
            | '\u{205F}' | '\u{3000}' | '\u{FEFF}'
    )
}

/// Unsigned digits in the given radix; values past u64 stay finite
fn parse_radix_digits(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return f64::NAN;
    }
    digits
        .chars()
        .filter_map(|c| c.to_digit(radix))
        .fold(0.0, |acc, d| acc * radix as f64 + d as f64)
}
