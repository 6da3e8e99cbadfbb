use ratatui::{
    Frame,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::models::Exercise;
use crate::tui::theme;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    workout_day: bool,
    done: bool,
    exercises: &[Exercise],
) {
    let block = Block::default()
        .title(Span::styled(" Workout ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border(false))
        .style(theme::surface());

    let mut lines = vec![Line::from("")];

    if !workout_day {
        lines.push(Line::from(Span::styled("  Rest day", theme::dim())));
    } else {
        let status = if done {
            Span::styled("● done", theme::green().add_modifier(Modifier::BOLD))
        } else {
            Span::styled("○ open · [w] to mark", theme::amber())
        };
        lines.push(Line::from(vec![Span::styled("  ", theme::dim()), status]));
        lines.push(Line::from(""));
        for exercise in exercises {
            lines.push(Line::from(Span::styled(
                format!("  {}", exercise.summary()),
                if done { theme::dim() } else { theme::bold() },
            )));
        }
    }

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}
