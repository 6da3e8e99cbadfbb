use anyhow::Result;
use chrono::{Datelike, Duration, Local};
use crossterm::event::{KeyCode, KeyEventKind};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use rusqlite::Connection;
use std::collections::HashMap;

use crate::config::AppConfig;
use crate::db::repository::{
    CacheRepo, DailyStats, HabitRepo, MealRepo, StatsRepo, WorkoutRepo, date_key,
};
use crate::models::{
    DayTimes, Exercise, Habit, MealSlot, PrayerName, Recipe, day_plan, is_workout_day,
    weekday_name,
};
use crate::prayer_times::schedule::{self, NextPrayer};
use crate::tui::events::{Event, EventHandler};
use crate::tui::theme;
use crate::tui::widgets::{
    habits, header, meals, next_prayer, prayers, statusbar, streak, workout,
};
use crate::utils::format::progress_bar;
use crate::utils::hijri::today_hijri_string;

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Dashboard,
    Stats,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FocusSection {
    Habits,
    Meals,
}

pub struct App {
    pub view: View,
    pub config: AppConfig,
    pub focus_section: FocusSection,
    pub focus_idx: usize,
    pub should_quit: bool,

    // Cached state (refreshed on load/tick)
    pub today_str: String,
    pub hijri_str: String,
    pub times: Option<DayTimes>,
    pub next: Option<NextPrayer>,
    pub current: Option<(PrayerName, u32)>,
    pub habits: Vec<Habit>,
    pub habit_done: HashMap<i64, bool>,
    pub meals: Vec<(MealSlot, Recipe, bool)>,
    pub workout_day: bool,
    pub workout_done: bool,
    pub exercises: Vec<Exercise>,
    pub weekly: Vec<DailyStats>,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let today = Local::now().date_naive();
        let hijri_str = today_hijri_string(config.hijri.offset_days);

        App {
            view: View::Dashboard,
            config,
            focus_section: FocusSection::Habits,
            focus_idx: 0,
            should_quit: false,
            today_str: date_key(today),
            hijri_str,
            times: None,
            next: None,
            current: None,
            habits: Vec::new(),
            habit_done: HashMap::new(),
            meals: Vec::new(),
            workout_day: false,
            workout_done: false,
            exercises: Vec::new(),
            weekly: Vec::new(),
        }
    }

    pub fn load(&mut self, conn: &Connection) -> Result<()> {
        let today = Local::now().date_naive();
        self.today_str = date_key(today);
        self.hijri_str = today_hijri_string(self.config.hijri.offset_days);

        // Times come from the cache only; main prefetches before launching.
        self.times = CacheRepo::get(conn, today, &self.config.location.city)?;
        self.refresh_countdown();

        self.habits = HabitRepo::active(conn)?;
        self.habit_done = HabitRepo::completion_map(conn, &self.today_str)?;

        let plan = day_plan(today);
        let eaten = MealRepo::completion_map(conn, &self.today_str)?;
        self.meals = MealSlot::all()
            .into_iter()
            .filter_map(|slot| {
                MealRepo::by_id(conn, plan.recipe_id(slot))
                    .ok()
                    .flatten()
                    .map(|recipe| {
                        let done = eaten.get(&slot).copied().unwrap_or(false);
                        (slot, recipe, done)
                    })
            })
            .collect();

        self.workout_day =
            is_workout_day(&self.config.workout.days, weekday_name(today.weekday()));
        self.workout_done = WorkoutRepo::is_done(conn, &self.today_str)?;
        self.exercises = WorkoutRepo::exercises(conn)?;

        // Trailing week, padded oldest to newest.
        let start = date_key(today - Duration::days(6));
        let stats = StatsRepo::daily_habit_stats(conn, &start, &self.today_str)?;
        let total = self.habits.len() as u32;
        self.weekly = (0..7)
            .map(|i| {
                let date = date_key(today - Duration::days(6 - i));
                stats
                    .iter()
                    .find(|s| s.date == date)
                    .cloned()
                    .unwrap_or(DailyStats {
                        date,
                        habits_done: 0,
                        habits_total: total,
                    })
            })
            .collect();

        Ok(())
    }

    /// Recompute the countdown; reload everything when the day rolls over so
    /// completion flags visibly reset at midnight.
    pub fn tick(&mut self, conn: &Connection) {
        let today = Local::now().date_naive();
        if date_key(today) != self.today_str {
            let _ = self.load(conn);
            return;
        }
        self.refresh_countdown();
    }

    fn refresh_countdown(&mut self) {
        let now = Local::now().time();
        match &self.times {
            Some(times) => {
                self.next = Some(schedule::next_prayer(times, now));
                self.current = schedule::current_prayer(times, now)
                    .map(|p| (p, schedule::minutes_until_end(times, p, now)));
            }
            None => {
                self.next = None;
                self.current = None;
            }
        }
    }

    pub fn handle_key(&mut self, key: crossterm::event::KeyEvent, conn: &Connection) {
        // Only handle actual key presses; some terminals also send releases.
        if key.kind != KeyEventKind::Press {
            return;
        }
        match self.view {
            View::Dashboard => self.handle_dashboard_key(key, conn),
            View::Stats => self.handle_stats_key(key),
            View::Help => self.handle_help_key(key),
        }
    }

    fn handle_dashboard_key(&mut self, key: crossterm::event::KeyEvent, conn: &Connection) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Char('?') => {
                self.view = View::Help;
            }
            KeyCode::Char('s') => {
                self.view = View::Stats;
            }
            KeyCode::Char('w') => {
                let _ = WorkoutRepo::toggle(conn, &self.today_str);
                let _ = self.load(conn);
            }
            KeyCode::Up => {
                if self.focus_idx > 0 {
                    self.focus_idx -= 1;
                }
            }
            KeyCode::Down => {
                let max = match self.focus_section {
                    FocusSection::Habits => self.habits.len().saturating_sub(1),
                    FocusSection::Meals => self.meals.len().saturating_sub(1),
                };
                if self.focus_idx < max {
                    self.focus_idx += 1;
                }
            }
            KeyCode::Tab => {
                self.focus_section = match self.focus_section {
                    FocusSection::Habits => FocusSection::Meals,
                    FocusSection::Meals => FocusSection::Habits,
                };
                self.focus_idx = 0;
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                self.toggle_focused(conn);
            }
            _ => {}
        }
    }

    fn handle_stats_key(&mut self, key: crossterm::event::KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('s') => {
                self.view = View::Dashboard;
            }
            _ => {}
        }
    }

    fn handle_help_key(&mut self, key: crossterm::event::KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('?') => {
                self.view = View::Dashboard;
            }
            _ => {}
        }
    }

    fn toggle_focused(&mut self, conn: &Connection) {
        match self.focus_section {
            FocusSection::Habits => {
                if let Some(habit) = self.habits.get(self.focus_idx) {
                    let _ = HabitRepo::toggle(conn, habit.id, &self.today_str);
                }
            }
            FocusSection::Meals => {
                if let Some((slot, _, _)) = self.meals.get(self.focus_idx) {
                    let _ = MealRepo::toggle(conn, &self.today_str, *slot);
                }
            }
        }
        let _ = self.load(conn);
    }

    pub fn draw(&self, frame: &mut Frame) {
        match self.view {
            View::Dashboard => self.draw_dashboard(frame),
            View::Stats => self.draw_stats(frame),
            View::Help => {
                self.draw_dashboard(frame);
                self.draw_help_overlay(frame);
            }
        }
    }

    fn draw_dashboard(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(theme::base()), area);

        let outer_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // header
                Constraint::Min(0),    // body
                Constraint::Length(1), // status bar
            ])
            .split(area);

        header::render(
            frame,
            outer_chunks[0],
            &self.hijri_str,
            &self.config.location.city,
        );
        statusbar::render(frame, outer_chunks[2]);

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(outer_chunks[1]);

        let focused_habits = self.focus_section == FocusSection::Habits;
        let focused_meals = self.focus_section == FocusSection::Meals;

        // Left column: Prayers + Habits + Meals
        let left_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(8),
                Constraint::Length((self.habits.len() as u16 + 2).max(5)),
                Constraint::Length(6),
            ])
            .split(columns[0]);

        prayers::render(
            frame,
            left_chunks[0],
            self.times.as_ref(),
            self.current.map(|(p, _)| p),
            self.next.map(|n| n.prayer),
        );
        habits::render(
            frame,
            left_chunks[1],
            &self.habits,
            &self.habit_done,
            self.focus_idx,
            focused_habits,
        );
        meals::render(frame, left_chunks[2], &self.meals, self.focus_idx, focused_meals);

        // Right column: Next Prayer + Workout + Streak
        let right_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(9),
                Constraint::Length(8),
                Constraint::Min(0),
            ])
            .split(columns[1]);

        next_prayer::render(frame, right_chunks[0], self.next.as_ref(), self.current);
        workout::render(
            frame,
            right_chunks[1],
            self.workout_day,
            self.workout_done,
            &self.exercises,
        );
        streak::render(frame, right_chunks[2], &self.habits, &self.weekly);
    }

    fn draw_stats(&self, frame: &mut Frame) {
        let area = frame.area();
        frame.render_widget(Block::default().style(theme::base()), area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);

        let title = Paragraph::new(Line::from(vec![
            Span::styled("  Stats  ", theme::gold().add_modifier(Modifier::BOLD)),
            Span::styled("  [Esc] back", theme::dim()),
        ]));
        frame.render_widget(title, chunks[0]);

        let mut lines = vec![Line::from(""), Line::from(Span::styled("  Streaks", theme::gold()))];
        lines.push(Line::from(""));
        for habit in &self.habits {
            let bar = progress_bar(habit.streak.min(30), 30, 12);
            lines.push(Line::from(vec![
                Span::styled(format!("  {} {:<18}", habit.emoji, habit.name), theme::bold()),
                Span::styled(bar, theme::green()),
                Span::styled(format!("  {} days", habit.streak), theme::dim()),
            ]));
        }

        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("  Last 7 Days", theme::gold())));
        lines.push(Line::from(""));
        for stat in &self.weekly {
            let bar = progress_bar(stat.habits_done, stat.habits_total.max(1), 12);
            lines.push(Line::from(vec![
                Span::styled(format!("  {}  ", stat.date), theme::dim()),
                Span::styled(bar, theme::amber()),
                Span::styled(
                    format!("  {}/{}", stat.habits_done, stat.habits_total),
                    theme::dim(),
                ),
            ]));
        }

        frame.render_widget(Paragraph::new(lines), chunks[1]);
    }

    fn draw_help_overlay(&self, frame: &mut Frame) {
        let area = frame.area();
        let popup_area = Rect {
            x: area.width / 4,
            y: area.height / 4,
            width: area.width / 2,
            height: (area.height / 2).min(14),
        };

        frame.render_widget(Clear, popup_area);

        let entries = [
            ("[Space] / Enter", "Toggle focused habit or meal"),
            ("[Tab]", "Switch between habits and meals"),
            ("[↑ ↓]", "Navigate items"),
            ("[w]", "Toggle today's workout"),
            ("[s]", "Stats view"),
            ("[?]", "Toggle help"),
            ("[q] / Esc", "Quit"),
        ];

        let mut help_text = vec![
            Line::from(Span::styled(
                "  Keybindings",
                theme::gold().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        for (key, label) in &entries {
            help_text.push(Line::from(vec![
                Span::styled(format!("  {:<16}", key), theme::gold()),
                Span::styled(*label, theme::dim()),
            ]));
        }

        let block = Block::default()
            .title(Span::styled(" Help ", theme::gold()))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::gold())
            .style(theme::surface());

        frame.render_widget(Paragraph::new(help_text).block(block), popup_area);
    }
}

/// Run the TUI event loop.
pub fn run(conn: Connection, config: AppConfig) -> Result<()> {
    let mut app = App::new(config);
    app.load(&conn)?;

    let mut terminal = ratatui::init();
    let events = EventHandler::new(500);

    loop {
        terminal.draw(|frame| app.draw(frame))?;

        match events.next()? {
            Event::Key(key) => {
                app.handle_key(key, &conn);
                if app.should_quit {
                    break;
                }
            }
            Event::Tick => {
                app.tick(&conn);
            }
        }
    }

    ratatui::restore();
    Ok(())
}
