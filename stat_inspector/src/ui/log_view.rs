//! Action log and the owner's publish notifications

use crate::app::App;
use crate::ui::format_value;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    // Newest first
    let actions: Vec<Line> = app
        .messages
        .iter()
        .rev()
        .map(|message| Line::from(message.clone()))
        .collect();
    let paragraph = Paragraph::new(actions)
        .block(Block::default().borders(Borders::ALL).title(" Actions "))
        .scroll((app.scroll as u16, 0));
    f.render_widget(paragraph, chunks[0]);

    let entries = app.publish_log.entries();
    let notifications: Vec<Line> = entries
        .iter()
        .rev()
        .map(|(field, value)| {
            Line::from(vec![
                Span::styled(format!("{:32}", field.to_string()), Style::default().fg(Color::Gray)),
                Span::styled(format_value(*value), Style::default().fg(Color::Green)),
            ])
        })
        .collect();
    let title = format!(" Owner notifications ({}) ", entries.len());
    let paragraph = Paragraph::new(notifications)
        .block(Block::default().borders(Borders::ALL).title(title))
        .scroll((app.scroll as u16, 0));
    f.render_widget(paragraph, chunks[1]);
}
