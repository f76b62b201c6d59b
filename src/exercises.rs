//! Exercise catalog - shared by all routines

use serde::{Deserialize, Serialize};

/// Muscle groups an exercise works
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MuscleGroup {
    Chest,
    Shoulders,
    Triceps,
    Back,
    Biceps,
    Core,
    Glutes,
    Quads,
    Hamstrings,
    Calves,
    FullBody,
}

impl MuscleGroup {
    pub fn name(&self) -> &'static str {
        match self {
            MuscleGroup::Chest => "chest",
            MuscleGroup::Shoulders => "shoulders",
            MuscleGroup::Triceps => "triceps",
            MuscleGroup::Back => "back",
            MuscleGroup::Biceps => "biceps",
            MuscleGroup::Core => "core",
            MuscleGroup::Glutes => "glutes",
            MuscleGroup::Quads => "quads",
            MuscleGroup::Hamstrings => "hamstrings",
            MuscleGroup::Calves => "calves",
            MuscleGroup::FullBody => "full body",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Category {
    Push,
    Pull,
    Legs,
    Core,
    Cardio,
}

impl Category {
    pub fn all() -> &'static [Category] {
        &[
            Category::Push,
            Category::Pull,
            Category::Legs,
            Category::Core,
            Category::Cardio,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Category::Push => "push",
            Category::Pull => "pull",
            Category::Legs => "legs",
            Category::Core => "core",
            Category::Cardio => "cardio",
        }
    }

    /// Parse a category from its name, case-insensitive
    pub fn parse(name: &str) -> Option<Category> {
        Category::all()
            .iter()
            .copied()
            .find(|c| c.name().eq_ignore_ascii_case(name.trim()))
    }
}

#[derive(Debug, Clone)]
pub struct Exercise {
    pub id: &'static str,
    pub name: &'static str,
    pub category: Category,
    pub muscle_groups: &'static [MuscleGroup],
    pub is_timed: bool, // true = held for time (plank), false = counted in reps
}

impl Exercise {
    /// How sets of this exercise are measured
    pub fn measure(&self) -> &'static str {
        if self.is_timed { "time" } else { "reps" }
    }
}

pub const CATALOG: &[Exercise] = &[
    // Push
    Exercise {
        id: "bench_press",
        name: "bench press",
        category: Category::Push,
        muscle_groups: &[MuscleGroup::Chest, MuscleGroup::Triceps, MuscleGroup::Shoulders],
        is_timed: false,
    },
    Exercise {
        id: "overhead_press",
        name: "overhead press",
        category: Category::Push,
        muscle_groups: &[MuscleGroup::Shoulders, MuscleGroup::Triceps, MuscleGroup::Core],
        is_timed: false,
    },
    Exercise {
        id: "push_up",
        name: "push-up",
        category: Category::Push,
        muscle_groups: &[MuscleGroup::Chest, MuscleGroup::Triceps, MuscleGroup::Core],
        is_timed: false,
    },
    Exercise {
        id: "dips",
        name: "dips",
        category: Category::Push,
        muscle_groups: &[MuscleGroup::Triceps, MuscleGroup::Chest],
        is_timed: false,
    },
    // Pull
    Exercise {
        id: "pull_up",
        name: "pull-up",
        category: Category::Pull,
        muscle_groups: &[MuscleGroup::Back, MuscleGroup::Biceps],
        is_timed: false,
    },
    Exercise {
        id: "barbell_row",
        name: "barbell row",
        category: Category::Pull,
        muscle_groups: &[MuscleGroup::Back, MuscleGroup::Biceps, MuscleGroup::Core],
        is_timed: false,
    },
    Exercise {
        id: "bicep_curl",
        name: "bicep curl",
        category: Category::Pull,
        muscle_groups: &[MuscleGroup::Biceps],
        is_timed: false,
    },
    // Legs
    Exercise {
        id: "back_squat",
        name: "back squat",
        category: Category::Legs,
        muscle_groups: &[MuscleGroup::Quads, MuscleGroup::Glutes, MuscleGroup::Core],
        is_timed: false,
    },
    Exercise {
        id: "deadlift",
        name: "deadlift",
        category: Category::Legs,
        muscle_groups: &[MuscleGroup::Hamstrings, MuscleGroup::Glutes, MuscleGroup::Back],
        is_timed: false,
    },
    Exercise {
        id: "romanian_deadlift",
        name: "romanian deadlift",
        category: Category::Legs,
        muscle_groups: &[MuscleGroup::Hamstrings, MuscleGroup::Glutes],
        is_timed: false,
    },
    Exercise {
        id: "lunge",
        name: "walking lunge",
        category: Category::Legs,
        muscle_groups: &[MuscleGroup::Quads, MuscleGroup::Glutes],
        is_timed: false,
    },
    Exercise {
        id: "calf_raise",
        name: "calf raise",
        category: Category::Legs,
        muscle_groups: &[MuscleGroup::Calves],
        is_timed: false,
    },
    // Core
    Exercise {
        id: "plank",
        name: "plank",
        category: Category::Core,
        muscle_groups: &[MuscleGroup::Core, MuscleGroup::Shoulders],
        is_timed: true,
    },
    Exercise {
        id: "hanging_leg_raise",
        name: "hanging leg raise",
        category: Category::Core,
        muscle_groups: &[MuscleGroup::Core],
        is_timed: false,
    },
    // Cardio
    Exercise {
        id: "rowing",
        name: "rowing machine",
        category: Category::Cardio,
        muscle_groups: &[MuscleGroup::FullBody],
        is_timed: true,
    },
    Exercise {
        id: "jump_rope",
        name: "jump rope",
        category: Category::Cardio,
        muscle_groups: &[MuscleGroup::Calves, MuscleGroup::FullBody],
        is_timed: true,
    },
];

pub fn all_exercises() -> &'static [Exercise] {
    CATALOG
}

pub fn find_exercise(id: &str) -> Option<&'static Exercise> {
    CATALOG.iter().find(|e| e.id == id)
}

/// Catalog entries matching a category and a case-insensitive name search
pub fn filter_exercises(category: Option<Category>, query: &str) -> Vec<&'static Exercise> {
    let query = query.trim().to_lowercase();
    CATALOG
        .iter()
        .filter(|e| category.is_none_or(|c| e.category == c))
        .filter(|e| query.is_empty() || e.name.contains(&query))
        .collect()
}
