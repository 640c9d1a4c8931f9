//! Published fields of the entity behind the current tab

use crate::app::App;
use crate::ui::{field_line, section};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use stat_engine::prelude::*;

pub fn draw(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    draw_summary(f, app, chunks[0]);
    draw_fields(f, app, chunks[1]);
}

fn draw_summary(f: &mut Frame, app: &App, area: Rect) {
    let mut lines = vec![section("Controls")];
    lines.push(value_line("Selected stat", format!("{:?}", app.selected_stat())));
    lines.push(value_line("Selected rating", format!("{:?}", app.selected_rating())));
    lines.push(value_line("Owner form", app.current_form().unwrap_or("none").to_string()));
    lines.push(value_line(
        "Crit aura",
        if app.aura_active[app.target() as usize] { "on" } else { "off" }.to_string(),
    ));
    lines.push(Line::from(""));

    match app.target_host() {
        Some(host) => {
            let core = host.core();
            let fields = core.published();
            lines.push(section("Entity"));
            lines.push(value_line("Id", core.id.clone()));
            lines.push(value_line("Kind", format!("{:?}", host.kind())));
            lines.push(value_line("Level", core.level.to_string()));
            lines.push(value_line("Auras", core.auras.len().to_string()));
            lines.push(Line::from(""));
            lines.push(section("Summary"));
            lines.push(field_line("Total armor".to_string(), fields.total_armor()));
            lines.push(field_line(
                "Total attack power".to_string(),
                fields.total_attack_power(false),
            ));
            lines.push(field_line(
                "Total ranged attack power".to_string(),
                fields.total_attack_power(true),
            ));
            let main = fields.damage_range(WeaponAttackType::MainHand);
            lines.push(field_line("Main hand average".to_string(), main.average()));
        }
        None => lines.push(Line::from(Span::styled(
            "No pet summoned. Press [p] on the Owner tab.",
            Style::default().fg(Color::DarkGray),
        ))),
    }

    let paragraph =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Overview "));
    f.render_widget(paragraph, area);
}

fn draw_fields(f: &mut Frame, app: &App, area: Rect) {
    let lines: Vec<Line> = match app.target_host() {
        Some(host) => host
            .core()
            .published()
            .iter()
            .map(|(field, value)| field_line(field.to_string(), value))
            .collect(),
        None => Vec::new(),
    };

    let title = format!(" Published fields ({}) ", lines.len());
    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .scroll((app.scroll as u16, 0));
    f.render_widget(paragraph, area);
}

fn value_line(name: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:20}", name), Style::default().fg(Color::Gray)),
        Span::styled(value, Style::default().fg(Color::White)),
    ])
}
