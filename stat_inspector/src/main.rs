//! stat_inspector - Interactive TUI for watching attribute recalculation

mod app;
mod ui;

use app::App;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use tracing_subscriber::EnvFilter;

fn main() -> io::Result<()> {
    // Silent unless RUST_LOG is set; redirect stderr to keep the screen clean
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(false)
        .init();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new();
    tracing::info!("inspector started");

    loop {
        terminal.draw(|f| ui::draw(f, &app))?;

        if event::poll(std::time::Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match (key.code, key.modifiers) {
                    (KeyCode::Char('q'), _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => break,
                    (KeyCode::Tab, _) => app.next_tab(),
                    (KeyCode::BackTab, _) => app.prev_tab(),
                    (KeyCode::Char(c @ '1'..='5'), _) => app.set_tab(c as usize - '1' as usize),
                    (KeyCode::Up, _) | (KeyCode::Char('k'), _) => app.on_up(),
                    (KeyCode::Down, _) | (KeyCode::Char('j'), _) => app.on_down(),
                    (KeyCode::Char('s'), _) => app.cycle_stat(),
                    (KeyCode::Char('+'), _) | (KeyCode::Char('='), _) => app.change_stat(true),
                    (KeyCode::Char('-'), _) => app.change_stat(false),
                    (KeyCode::Char('r'), _) => app.cycle_rating(),
                    (KeyCode::Char(']'), _) => app.change_rating(true),
                    (KeyCode::Char('['), _) => app.change_rating(false),
                    (KeyCode::Char('a'), _) => app.toggle_aura(),
                    (KeyCode::Char('f'), _) => app.cycle_form(),
                    (KeyCode::Char('p'), _) => app.toggle_pet(),
                    (KeyCode::Char('u'), _) => app.full_pass(),
                    (KeyCode::Char(' '), _) => app.roll_swing(),
                    (KeyCode::Char('c'), _) => app.clear_log(),
                    _ => {}
                }
            }
        }
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    Ok(())
}
