//! fitlink - Workout routines and live training session tracker

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use fitlink::db::Database;
use fitlink::exercises::{Category, filter_exercises};
use fitlink::routine::{RoutineDraft, RoutineEdit, parse_exercise_arg};
use fitlink::session::{TrainingSession, format_time};
use fitlink::tui::{App, SessionApp, SessionOutcome};

#[derive(Parser)]
#[command(name = "fitlink")]
#[command(author, version, about = "FitLink - workout routines and training sessions")]
struct Cli {
    /// SQLite database path
    #[arg(long, global = true, env = "FITLINK_DB", default_value = "fitlink.db")]
    db: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open history dashboard
    Tui,

    /// Browse the exercise catalog
    Exercises {
        /// Filter by category (push, pull, legs, core, cardio)
        #[arg(short, long)]
        category: Option<String>,

        /// Search exercise names
        #[arg(short, long, default_value = "")]
        search: String,

        /// Only exercises that can still be added to this routine
        #[arg(short, long)]
        routine: Option<i64>,
    },

    /// List routines
    Routines,

    /// Create a routine
    RoutineNew {
        /// Routine name
        name: String,

        /// Exercise as `id` or `id:sets`, repeat in training order
        #[arg(short, long = "exercise", required = true)]
        exercises: Vec<String>,
    },

    /// Edit a routine; kept exercises keep their history
    RoutineEdit {
        id: i64,

        /// New routine name
        #[arg(short, long)]
        name: Option<String>,

        /// Exercise to add, as `id` or `id:sets`
        #[arg(short, long)]
        add: Vec<String>,

        /// Exercise id to remove
        #[arg(short, long)]
        remove: Vec<String>,

        /// New set count, as `id:sets`
        #[arg(short, long)]
        sets: Vec<String>,
    },

    /// Delete a routine and its history
    RoutineDelete {
        id: i64,
    },

    /// Start a live training session
    Train {
        routine_id: i64,
    },

    /// List saved training sessions
    History {
        /// Number of records to show
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Show the set rows of a saved session
    Sets {
        session_id: i64,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let cli = Cli::parse();
    let db = Database::open(&cli.db)?;

    match cli.command {
        Some(Commands::Exercises { category, search, routine }) => {
            let category = match category {
                Some(name) => match Category::parse(&name) {
                    Some(c) => Some(c),
                    None => bail!("unknown category: {}", name),
                },
                None => None,
            };

            let exercises = match routine {
                Some(id) => {
                    let routine = db
                        .get_routine(id)?
                        .with_context(|| format!("routine {} not found", id))?;
                    RoutineDraft::from_routine(&routine).available_exercises(category, &search)
                }
                None => filter_exercises(category, &search),
            };

            for e in exercises {
                let groups: Vec<_> = e.muscle_groups.iter().map(|g| g.name()).collect();
                println!(
                    "{:20} | {:20} | {:6} | {:5} | {}",
                    e.id,
                    e.name,
                    e.category.name(),
                    e.measure(),
                    groups.join(", ")
                );
            }
        }

        Some(Commands::Routines) => {
            let routines = db.get_routines()?;
            if routines.is_empty() {
                println!("No routines yet. Create one with `fitlink routine-new`.");
            }
            for r in routines {
                println!("#{} {} ({} sets)", r.id, r.name, r.planned_sets());
                for e in &r.routine_exercises {
                    println!("    {} x{}", e.exercise_name, e.sets);
                }
            }
        }

        Some(Commands::RoutineNew { name, exercises }) => {
            let mut draft = RoutineDraft::new();
            draft.set_name(name);
            for arg in &exercises {
                let (exercise_id, sets) = parse_exercise_arg(arg)?;
                match sets {
                    Some(sets) => draft.add_exercise_with_sets(exercise_id, sets)?,
                    None => draft.add_exercise(exercise_id)?,
                }
            }
            let id = db.create_routine(&draft)?;
            println!("Created routine: {} (id: {})", draft.name().trim(), id);
        }

        Some(Commands::RoutineEdit { id, name, add, remove, sets }) => {
            let routine = db
                .get_routine(id)?
                .with_context(|| format!("routine {} not found", id))?;

            let mut draft = RoutineDraft::from_routine(&routine);
            RoutineEdit { name, add, remove, sets }.apply(&mut draft)?;

            if !draft.is_dirty() {
                println!("No changes to routine {}", id);
            } else {
                db.update_routine(id, &draft)?;
                draft.mark_saved();
                println!("Updated routine: {} (id: {})", draft.name().trim(), id);
            }
        }

        Some(Commands::RoutineDelete { id }) => {
            if db.delete_routine(id)? {
                println!("Deleted routine {}", id);
            } else {
                println!("Routine {} not found", id);
            }
        }

        Some(Commands::Train { routine_id }) => {
            let routine = db
                .get_routine(routine_id)?
                .with_context(|| format!("routine {} not found", routine_id))?;

            let session = TrainingSession::start(routine);
            let app = SessionApp::new(&db, session)?;
            match app.run()? {
                SessionOutcome::Saved(id) => println!("Session saved (id: {})", id),
                SessionOutcome::Discarded => println!("Session discarded"),
            }
        }

        Some(Commands::History { limit }) => {
            let sessions = db.get_training_sessions()?;
            println!("Recent sessions:");
            println!("{:-<60}", "");
            for s in sessions.iter().take(limit) {
                println!(
                    "#{:<4} {} | {:20} | {:>6} | {}/{} sets",
                    s.id,
                    s.date.format("%Y-%m-%d %H:%M"),
                    s.routine_name,
                    format_time(s.duration_secs),
                    s.recorded_sets,
                    s.total_sets
                );
            }
        }

        Some(Commands::Sets { session_id, json }) => {
            let sets = db.get_session_sets(session_id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&sets)?);
            } else {
                for s in &sets {
                    println!(
                        "exercise {} | set {} | {} x {}",
                        s.routine_exercise_id, s.order, s.weight, s.reps
                    );
                }
            }
        }

        Some(Commands::Tui) | None => {
            let mut app = App::new(&db)?;
            app.run()?;
        }
    }

    Ok(())
}
