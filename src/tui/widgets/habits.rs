use ratatui::{
    Frame,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem},
};
use std::collections::HashMap;

use crate::models::Habit;
use crate::tui::theme;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    habits: &[Habit],
    done: &HashMap<i64, bool>,
    focus_idx: usize,
    focused: bool,
) {
    let completed = habits
        .iter()
        .filter(|h| done.get(&h.id).copied().unwrap_or(false))
        .count();

    let block = Block::default()
        .title(Span::styled(
            format!(" Habits {}/{} ", completed, habits.len()),
            theme::gold(),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border(focused))
        .style(theme::surface());

    let items: Vec<ListItem> = habits
        .iter()
        .enumerate()
        .map(|(i, habit)| {
            let is_done = done.get(&habit.id).copied().unwrap_or(false);
            let is_focused = focused && i == focus_idx;

            let icon_span = if is_done {
                Span::styled("●", theme::green())
            } else {
                Span::styled("○", theme::dim())
            };

            let name_style = if is_focused {
                theme::gold().add_modifier(Modifier::BOLD)
            } else if is_done {
                theme::dim()
            } else {
                theme::bold()
            };

            let line = Line::from(vec![
                Span::styled("  ", theme::dim()),
                icon_span,
                Span::styled(format!(" {} ", habit.emoji), theme::dim()),
                Span::styled(format!("{:<18}", habit.name), name_style),
                Span::styled(format!("streak {}", habit.streak), theme::dim()),
            ]);
            ListItem::new(line)
        })
        .collect();

    let list = List::new(items).block(block);
    frame.render_widget(list, area);
}
