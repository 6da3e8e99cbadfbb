use ratatui::{
    Frame,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem},
};

use crate::models::{MealSlot, Recipe};
use crate::tui::theme;

/// Today's four slots from the rotating plan, each with an eaten flag.
pub fn render(
    frame: &mut Frame,
    area: Rect,
    meals: &[(MealSlot, Recipe, bool)],
    focus_idx: usize,
    focused: bool,
) {
    let block = Block::default()
        .title(Span::styled(" Meals ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border(focused))
        .style(theme::surface());

    let items: Vec<ListItem> = meals
        .iter()
        .enumerate()
        .map(|(i, (slot, recipe, eaten))| {
            let is_focused = focused && i == focus_idx;

            let icon_span = if *eaten {
                Span::styled("●", theme::green())
            } else {
                Span::styled("○", theme::dim())
            };

            let name_style = if is_focused {
                theme::gold().add_modifier(Modifier::BOLD)
            } else if *eaten {
                theme::dim()
            } else {
                theme::bold()
            };

            let line = Line::from(vec![
                Span::styled("  ", theme::dim()),
                icon_span,
                Span::styled(format!(" {:<10}", slot.display_name()), theme::dim()),
                Span::styled(format!("{} {:<20}", recipe.emoji, recipe.name), name_style),
                Span::styled(
                    format!("{} kcal · {}g", recipe.kcal, recipe.protein),
                    theme::dim(),
                ),
            ]);
            ListItem::new(line)
        })
        .collect();

    let list = List::new(items).block(block);
    frame.render_widget(list, area);
}
