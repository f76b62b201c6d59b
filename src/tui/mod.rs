//! TUI module - session history dashboard and the live training screen

mod session;
mod terminal;

pub use session::{SessionApp, SessionOutcome};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};

use crate::db::{Database, TrainingSessionRecord};
use crate::session::format_time;
use terminal::{Tui, init_terminal, restore_terminal};

/// History dashboard state
pub struct App<'a> {
    db: &'a Database,
    sessions: Vec<TrainingSessionRecord>,
    should_quit: bool,
}

impl<'a> App<'a> {
    pub fn new(db: &'a Database) -> Result<Self> {
        let sessions = db.get_training_sessions()?;
        Ok(Self {
            db,
            sessions,
            should_quit: false,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        let mut terminal = init_terminal()?;
        let result = self.event_loop(&mut terminal);
        restore_terminal()?;
        result
    }

    fn event_loop(&mut self, terminal: &mut Tui) -> Result<()> {
        while !self.should_quit {
            terminal.draw(|frame| self.render(frame))?;
            if event::poll(std::time::Duration::from_millis(100))?
                && let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press
            {
                self.handle_key(key.code)?;
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) -> Result<()> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('r') => self.sessions = self.db.get_training_sessions()?,
            _ => {}
        }
        Ok(())
    }

    fn render(&self, frame: &mut Frame) {
        let [header_area, table_area, footer_area] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(3),
        ])
        .areas(frame.area());

        let total_secs: u64 = self.sessions.iter().map(|s| s.duration_secs).sum();
        let header = Paragraph::new(format!(
            "FitLink - {} sessions, {} trained",
            self.sessions.len(),
            format_time(total_secs)
        ))
        .style(Style::default().fg(Color::Cyan).bold())
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(header, header_area);

        let rows = self.sessions.iter().map(|s| {
            Row::new(vec![
                Cell::from(s.date.format("%Y-%m-%d %H:%M").to_string()),
                Cell::from(s.routine_name.clone()),
                Cell::from(format_time(s.duration_secs)),
                Cell::from(format!("{}/{}", s.recorded_sets, s.total_sets)),
            ])
        });
        let table = Table::new(
            rows,
            [
                Constraint::Length(18),
                Constraint::Min(20),
                Constraint::Length(10),
                Constraint::Length(8),
            ],
        )
        .header(Row::new(vec!["Date", "Routine", "Time", "Sets"]).style(Style::default().bold()))
        .block(Block::default().borders(Borders::ALL).title("Sessions"));
        frame.render_widget(table, table_area);

        let footer = Paragraph::new("q: quit | r: refresh")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(footer, footer_area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routine::RoutineDraft;
    use crate::session::CompletedSession;
    use ratatui::backend::TestBackend;

    fn save_session(db: &Database, duration_secs: u64) {
        let mut draft = RoutineDraft::new();
        draft.set_name(format!("routine {}", duration_secs));
        draft.add_exercise_with_sets("plank", 1).unwrap();
        let routine_id = db.create_routine(&draft).unwrap();
        db.save_session(&CompletedSession {
            routine_id,
            started_at: chrono::Utc::now(),
            duration_secs,
            sets: Vec::new(),
        })
        .unwrap();
    }

    fn screen_text(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 16)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();
        terminal.backend().buffer().content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_refresh_picks_up_new_sessions() {
        let db = Database::open_in_memory().unwrap();
        save_session(&db, 600);
        let mut app = App::new(&db).unwrap();
        assert_eq!(app.sessions.len(), 1);

        save_session(&db, 90);
        assert_eq!(app.sessions.len(), 1);
        app.handle_key(KeyCode::Char('r')).unwrap();
        assert_eq!(app.sessions.len(), 2);
        assert!(!app.should_quit);

        app.handle_key(KeyCode::Esc).unwrap();
        assert!(app.should_quit);
    }

    #[test]
    fn test_render_lists_sessions() {
        let db = Database::open_in_memory().unwrap();
        save_session(&db, 600);
        save_session(&db, 90);
        let app = App::new(&db).unwrap();

        let text = screen_text(&app);
        assert!(text.contains("2 sessions, 11:30 trained"));
        assert!(text.contains("routine 600"));
        assert!(text.contains("1:30"));
    }
}
