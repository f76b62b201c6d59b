//! Live training session screen

use std::collections::BTreeMap;

use anyhow::Result;
use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};

use super::terminal::{Tui, init_terminal, restore_terminal};
use crate::db::Database;
use crate::routine::RoutineExerciseId;
use crate::session::{SerieField, TrainingSession, build_finalized_sets};

/// How the session screen was left
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    Saved(i64),
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    Tracking,
    ConfirmDiscard,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Exit {
    Finish,
    Discard,
}

/// One planned set, in display order
struct SetRow {
    routine_exercise_id: RoutineExerciseId,
    exercise_name: String,
    serie: u32,
    last: Option<(f64, f64)>, // Last recorded (weight, reps)
}

pub struct SessionApp<'a> {
    db: &'a Database,
    session: TrainingSession,
    rows: Vec<SetRow>,
    selected: usize,
    field: SerieField,
    mode: Mode,
    status: Option<String>,
    exit: Option<Exit>,
}

impl<'a> SessionApp<'a> {
    pub fn new(db: &'a Database, session: TrainingSession) -> Result<Self> {
        let mut rows = Vec::with_capacity(session.routine().planned_sets());
        for exercise in &session.routine().routine_exercises {
            let last: BTreeMap<u32, (f64, f64)> = db.last_recorded_values(exercise.routine_exercise_id)?;
            for serie in 1..=exercise.sets {
                rows.push(SetRow {
                    routine_exercise_id: exercise.routine_exercise_id,
                    exercise_name: exercise.exercise_name.clone(),
                    serie,
                    last: last.get(&serie).copied(),
                });
            }
        }

        Ok(Self {
            db,
            session,
            rows,
            selected: 0,
            field: SerieField::Weight,
            mode: Mode::Tracking,
            status: None,
            exit: None,
        })
    }

    /// Run the session screen until it is finished or discarded
    pub fn run(mut self) -> Result<SessionOutcome> {
        let mut terminal = init_terminal()?;

        let result = self.event_loop(&mut terminal);

        restore_terminal()?;
        result?;
        self.complete()
    }

    fn event_loop(&mut self, terminal: &mut Tui) -> Result<()> {
        while self.exit.is_none() {
            terminal.draw(|frame| self.render(frame))?;
            if event::poll(std::time::Duration::from_millis(100))?
                && let Event::Key(key) = event::read()?
                    && key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
        }
        Ok(())
    }

    fn complete(self) -> Result<SessionOutcome> {
        match self.exit {
            Some(Exit::Finish) => {
                let completed = self.session.finish();
                let id = self.db.save_session(&completed)?;
                Ok(SessionOutcome::Saved(id))
            }
            _ => {
                self.session.discard();
                Ok(SessionOutcome::Discarded)
            }
        }
    }

    fn handle_key(&mut self, code: KeyCode) {
        match self.mode {
            Mode::ConfirmDiscard => match code {
                KeyCode::Char('y') => self.exit = Some(Exit::Discard),
                KeyCode::Char('n') | KeyCode::Esc => self.mode = Mode::Tracking,
                _ => {}
            },
            Mode::Tracking => self.handle_tracking_key(code),
        }
    }

    fn handle_tracking_key(&mut self, code: KeyCode) {
        self.status = None;
        match code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.rows.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Left | KeyCode::Right | KeyCode::Tab => {
                self.field = match self.field {
                    SerieField::Weight => SerieField::Reps,
                    SerieField::Reps => SerieField::Weight,
                };
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => self.edit(|text| text.push(c)),
            KeyCode::Backspace => self.edit(|text| {
                text.pop();
            }),
            KeyCode::Char(' ') => {
                if let Some(row) = self.rows.get(self.selected) {
                    self.session.toggle_done(row.routine_exercise_id, row.serie);
                }
            }
            KeyCode::Char('f') => self.request_finish(),
            KeyCode::Char('q') | KeyCode::Esc => {
                if self.session.has_unsaved_changes() {
                    self.mode = Mode::ConfirmDiscard;
                } else {
                    self.exit = Some(Exit::Discard);
                }
            }
            _ => {}
        }
    }

    fn edit(&mut self, change: impl FnOnce(&mut String)) {
        let Some(row) = self.rows.get(self.selected) else {
            return;
        };
        let state = self.session.serie(row.routine_exercise_id, row.serie);
        let mut text = match self.field {
            SerieField::Weight => state.weight,
            SerieField::Reps => state.reps,
        }
        .unwrap_or_default();
        change(&mut text);
        self.session
            .update_field(row.routine_exercise_id, row.serie, self.field, text);
    }

    /// Finish only when every completed set holds numbers
    fn request_finish(&mut self) {
        let pending = build_finalized_sets(self.session.routine(), self.session.series());
        match pending.iter().find(|s| !s.is_finite()) {
            Some(bad) => {
                let name = self
                    .rows
                    .iter()
                    .find(|r| r.routine_exercise_id == bad.routine_exercise_id)
                    .map(|r| r.exercise_name.as_str())
                    .unwrap_or("?");
                self.status = Some(format!(
                    "Cannot save: {} set {} has an invalid number",
                    name, bad.serie_index
                ));
            }
            None => self.exit = Some(Exit::Finish),
        }
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(3),
            ])
            .split(area);

        // Header
        let header = Paragraph::new(format!(
            "{}  |  started {}  |  {}  |  {}/{} done",
            self.session.routine().name,
            self.session.started_at().with_timezone(&Local).format("%H:%M"),
            self.session.elapsed_label(),
            self.session.series().done_count(),
            self.rows.len()
        ))
        .style(Style::default().fg(Color::Cyan).bold())
        .block(Block::default().borders(Borders::ALL).title("Training"));
        frame.render_widget(header, chunks[0]);

        // Set table
        let rows: Vec<Row> = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let state = self.session.serie(row.routine_exercise_id, row.serie);
                let is_selected = i == self.selected;
                let cell_style = |field: SerieField| {
                    if is_selected && self.field == field {
                        Style::default().fg(Color::Black).bg(Color::Yellow)
                    } else {
                        Style::default()
                    }
                };
                let name = if row.serie == 1 { row.exercise_name.clone() } else { String::new() };
                let last = row
                    .last
                    .map(|(weight, reps)| format!("{}x{}", weight, reps))
                    .unwrap_or_else(|| "-".to_string());

                let line = Row::new(vec![
                    Cell::from(name),
                    Cell::from(row.serie.to_string()),
                    Cell::from(state.weight.unwrap_or_default()).style(cell_style(SerieField::Weight)),
                    Cell::from(state.reps.unwrap_or_default()).style(cell_style(SerieField::Reps)),
                    Cell::from(if state.done { "[x]" } else { "[ ]" }),
                    Cell::from(last),
                ]);
                if is_selected {
                    line.style(Style::default().bold())
                } else if state.done {
                    line.style(Style::default().fg(Color::Green))
                } else {
                    line
                }
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Min(20),
                Constraint::Length(5),
                Constraint::Length(10),
                Constraint::Length(8),
                Constraint::Length(6),
                Constraint::Length(12),
            ],
        )
        .header(
            Row::new(vec!["Exercise", "Set", "Weight", "Reps", "Done", "Last"])
                .style(Style::default().bold()),
        )
        .block(Block::default().borders(Borders::ALL).title("Sets"));

        frame.render_widget(table, chunks[1]);

        // Footer
        let (text, color) = match (self.mode, &self.status) {
            (Mode::ConfirmDiscard, _) => ("Discard this session? y: discard | n: keep training".to_string(), Color::Red),
            (Mode::Tracking, Some(status)) => (status.clone(), Color::Red),
            (Mode::Tracking, None) => (
                format!(
                    "editing {} | j/k: move | tab: weight/reps | 0-9: edit | space: done | f: finish | q: quit",
                    self.field.label()
                ),
                Color::DarkGray,
            ),
        };
        let footer = Paragraph::new(text)
            .style(Style::default().fg(color))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(footer, chunks[2]);
    }
}
