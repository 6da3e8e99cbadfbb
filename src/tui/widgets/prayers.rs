use chrono::Local;
use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem},
};

use crate::models::{DayTimes, PrayerName};
use crate::tui::theme;
use crate::utils::format::format_time;

/// The six daily entries with current/next markers. Informational only;
/// there is nothing to toggle here.
pub fn render(
    frame: &mut Frame,
    area: Rect,
    times: Option<&DayTimes>,
    current: Option<PrayerName>,
    next: Option<PrayerName>,
) {
    let block = Block::default()
        .title(Span::styled(" Prayers ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border(false))
        .style(theme::surface());

    let Some(times) = times else {
        let list = List::new(vec![ListItem::new(Line::from(Span::styled(
            "  No times yet. Check the network and run `mizan times --refresh`.",
            theme::dim(),
        )))])
        .block(block);
        frame.render_widget(list, area);
        return;
    };

    let now = Local::now().time();
    let items: Vec<ListItem> = times
        .entries()
        .into_iter()
        .map(|(prayer, start)| {
            let (marker, marker_style) = if current == Some(prayer) {
                ("● now", theme::green())
            } else if next == Some(prayer) {
                ("▸ next", theme::amber())
            } else {
                ("", theme::dim())
            };

            let name_style = if start < now && current != Some(prayer) {
                theme::dim()
            } else {
                theme::bold()
            };

            let line = Line::from(vec![
                Span::styled(format!("  {:<9}", prayer.display_name()), name_style),
                Span::styled(format!("{:<9}", prayer.arabic_name()), theme::dim()),
                Span::styled(format!("{:<7}", format_time(start)), theme::dim()),
                Span::styled(marker, marker_style),
            ]);
            ListItem::new(line)
        })
        .collect();

    let list = List::new(items).block(block);
    frame.render_widget(list, area);
}
