//! Help tab view

use crate::ui::section;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn draw(f: &mut Frame, area: Rect) {
    let lines = vec![
        section("Navigation"),
        key_line("1-5", "Jump to tab (Owner/Pet/Creature/Log/Help)"),
        key_line("Tab / Shift+Tab", "Next/previous tab"),
        key_line("↑/k  ↓/j", "Scroll"),
        key_line("q / Ctrl+C", "Quit"),
        Line::from(""),
        section("Mutations (act on the current tab's entity)"),
        key_line("s", "Select next primary stat"),
        key_line("+ / -", "Add/remove 10 of the selected stat"),
        key_line("a", "Toggle a +5% crit aura"),
        key_line("u", "Re-run the full pass"),
        key_line("Space", "Roll a main-hand swing"),
        Line::from(""),
        section("Owner only"),
        key_line("r", "Select next combat rating"),
        key_line("] / [", "Add/remove 50 rating"),
        key_line("f", "Cycle shapeshift form"),
        key_line("p", "Summon/dismiss the pet"),
        key_line("c", "Clear the log"),
        Line::from(""),
        section("Formulas"),
        Line::from(Span::styled("Attribute value:", Style::default().fg(Color::Yellow))),
        Line::from("  (BaseFlat × BasePercent + TotalFlat) × TotalPercent"),
        Line::from(""),
        Line::from(Span::styled("Diminishing returns:", Style::default().fg(Color::Yellow))),
        Line::from("  nondim + dim × cap / (dim + cap × k)"),
        Line::from(""),
        Line::from(Span::styled("Melee damage:", Style::default().fg(Color::Yellow))),
        Line::from("  weapon + attack power / 3.5 × swing seconds"),
        Line::from(""),
        Line::from(Span::styled("Pets:", Style::default().fg(Color::Yellow))),
        Line::from("  Mirror a share of the owner's published fields"),
        Line::from("  Updated before the owner's change returns"),
    ];

    let paragraph =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Help "));

    f.render_widget(paragraph, area);
}

fn key_line(key: &str, desc: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:20}", key), Style::default().fg(Color::Yellow)),
        Span::styled(desc.to_string(), Style::default().fg(Color::White)),
    ])
}
