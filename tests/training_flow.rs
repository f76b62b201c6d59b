use std::time::Duration;

use fitlink::Database;
use fitlink::routine::RoutineDraft;
use fitlink::session::{SerieField, TrainingSession};

/// Build a routine, train it, save it and read the stored rows back
#[tokio::test(start_paused = true)]
async fn training_session_saved_with_every_planned_set() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fitlink.db");
    let db = Database::open(path.to_str().unwrap()).unwrap();

    let mut draft = RoutineDraft::new();
    draft.set_name("strength");
    draft.add_exercise_with_sets("back_squat", 3).unwrap();
    draft.add_exercise_with_sets("bench_press", 2).unwrap();
    let routine_id = db.create_routine(&draft).unwrap();
    let routine = db.get_routine(routine_id).unwrap().unwrap();
    let squat = routine.routine_exercises[0].routine_exercise_id;

    let mut session = TrainingSession::start(routine);
    session.update_field(squat, 2, SerieField::Weight, "100");
    session.update_field(squat, 2, SerieField::Reps, "8");
    session.toggle_done(squat, 2);
    tokio::time::sleep(Duration::from_millis(95_500)).await;

    let completed = session.finish();
    assert_eq!(completed.duration_secs, 95);
    assert_eq!(completed.sets.len(), 5);

    let session_id = db.save_session(&completed).unwrap();
    let rows = db.get_session_sets(session_id).unwrap();
    assert_eq!(rows.len(), 5);

    for (i, row) in rows.iter().enumerate() {
        if i == 1 {
            assert_eq!((row.routine_exercise_id, row.order), (squat, 2));
            assert_eq!((row.weight, row.reps), (100.0, 8.0));
        } else {
            assert_eq!((row.weight, row.reps), (0.0, 0.0), "row {}", i);
        }
    }

    let history = db.get_training_sessions().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].routine_name, "strength");
    assert_eq!(history[0].duration_secs, 95);
    assert_eq!(history[0].recorded_sets, 1);

    let last = db.last_recorded_values(squat).unwrap();
    assert_eq!(last.get(&2), Some(&(100.0, 8.0)));
}

#[tokio::test(start_paused = true)]
async fn invalid_entry_is_not_persisted() {
    let db = Database::open_in_memory().unwrap();

    let mut draft = RoutineDraft::new();
    draft.set_name("core");
    draft.add_exercise_with_sets("plank", 1).unwrap();
    let routine = db.get_routine(db.create_routine(&draft).unwrap()).unwrap().unwrap();
    let plank = routine.routine_exercises[0].routine_exercise_id;

    let mut session = TrainingSession::start(routine);
    session.update_field(plank, 1, SerieField::Reps, "ten");
    session.toggle_done(plank, 1);

    let completed = session.finish();
    assert!(completed.sets[0].reps.is_nan());
    assert!(db.save_session(&completed).is_err());
    assert!(db.get_training_sessions().unwrap().is_empty());
}
