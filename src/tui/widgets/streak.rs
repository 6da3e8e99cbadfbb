use ratatui::{
    Frame,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::db::repository::DailyStats;
use crate::models::Habit;
use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, habits: &[Habit], weekly: &[DailyStats]) {
    let block = Block::default()
        .title(Span::styled(" Streak ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border(false))
        .style(theme::surface());

    let best = habits.iter().map(|h| h.streak).max().unwrap_or(0);

    // One dot per day of the trailing week, shaded by completion ratio.
    let mut dot_spans = vec![Span::styled("  ", theme::dim())];
    for i in 0..7 {
        let (dot, style) = if i < weekly.len() {
            let d = &weekly[i];
            let ratio = if d.habits_total == 0 {
                0.0
            } else {
                d.habits_done as f64 / d.habits_total as f64
            };
            if ratio >= 1.0 {
                ("●", theme::green().add_modifier(Modifier::BOLD))
            } else if ratio >= 0.5 {
                ("●", theme::amber())
            } else if ratio > 0.0 {
                ("◑", theme::amber())
            } else {
                ("○", theme::dim())
            }
        } else {
            ("·", theme::dim())
        };
        dot_spans.push(Span::styled(dot, style));
        dot_spans.push(Span::styled("  ", theme::dim()));
    }

    let full_days = weekly
        .iter()
        .filter(|d| d.habits_total > 0 && d.habits_done >= d.habits_total)
        .count();

    let best_line = Line::from(vec![
        Span::styled("  Best streak: ", theme::dim()),
        Span::styled(
            format!("{} days", best),
            theme::green().add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  ·  Week: {}/7", full_days), theme::dim()),
    ]);

    let text = vec![Line::from(""), Line::from(dot_spans), Line::from(""), best_line];
    let paragraph = Paragraph::new(text).block(block);
    frame.render_widget(paragraph, area);
}
