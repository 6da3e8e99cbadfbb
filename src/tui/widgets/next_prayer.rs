use chrono::Local;
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::models::PrayerName;
use crate::prayer_times::schedule::{NextPrayer, format_countdown, minutes_of, minutes_to_time};
use crate::tui::theme;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    next: Option<&NextPrayer>,
    current: Option<(PrayerName, u32)>,
) {
    let block = Block::default()
        .title(Span::styled(" Next Prayer ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border(false))
        .style(theme::surface());

    let content: Vec<Line> = match next {
        None => vec![
            Line::from(""),
            Line::from(Span::styled("  No data", theme::dim())),
        ],
        Some(next) => {
            // Wraps past midnight for the after-Isha case.
            let at = minutes_to_time(minutes_of(Local::now().time()) + next.minutes_until);
            let mut lines = vec![
                Line::from(""),
                Line::from(Span::styled(
                    format!("  {}", next.prayer.display_name().to_uppercase()),
                    theme::gold().add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(vec![
                    Span::styled("  in  ", theme::dim()),
                    Span::styled(
                        format_countdown(next.minutes_until),
                        theme::amber().add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(format!("  at {}", at), theme::dim()),
                ]),
            ];
            if let Some((prayer, minutes_left)) = current {
                lines.push(Line::from(""));
                lines.push(Line::from(vec![
                    Span::styled(
                        format!("  {} now", prayer.display_name()),
                        theme::green(),
                    ),
                    Span::styled(
                        format!(" · {} left", format_countdown(minutes_left)),
                        theme::dim(),
                    ),
                ]));
            }
            lines
        }
    };

    let paragraph = Paragraph::new(content)
        .block(block)
        .alignment(Alignment::Left);

    frame.render_widget(paragraph, area);
}
