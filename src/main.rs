use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use env_logger::{Env, Target};
use glam::DVec2;
use globe_pins::data::{self, Country, LineString};
use globe_pins::interaction::PointerButton;
use globe_pins::ui::TerminalRenderer;
use globe_pins::{App, GlobeConfig};
use ratatui::DefaultTerminal;
use std::fs::File;
use std::time::{Duration, Instant};

fn main() -> Result<()> {
    let config = GlobeConfig::discover().context("failed to load configuration")?;
    init_logging(&config)?;

    // Load data before touching the terminal so errors print normally
    let countries = match &config.countries_path {
        Some(path) => data::load_countries(path)
            .with_context(|| format!("failed to load countries from {}", path.display()))?,
        None => data::default_countries(),
    };
    let surface = match &config.surface_path {
        Some(path) => data::load_surface(path)
            .with_context(|| format!("failed to load globe surface from {}", path.display()))?,
        None => data::simple_world(),
    };

    // Initialize terminal
    let mut terminal = ratatui::init();

    // Enable mouse capture
    let result = execute!(std::io::stdout(), EnableMouseCapture)
        .context("failed to enable mouse capture")
        .and_then(|()| run(&mut terminal, config, &countries, &surface));

    // Disable mouse capture and restore terminal
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

/// Log to a file; the terminal belongs to the UI.
fn init_logging(config: &GlobeConfig) -> Result<()> {
    let Some(path) = &config.log_file else {
        return Ok(());
    };
    let file = File::create(path).with_context(|| format!("failed to create log file {}", path.display()))?;
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .init();
    log::info!("logging to {}", path.display());
    Ok(())
}

/// Centre of a terminal cell in map pixels. Accounts for the 1-cell border.
fn cell_to_pixel(col: u16, row: u16) -> DVec2 {
    DVec2::new(
        col.saturating_sub(1) as f64 * 2.0 + 1.0,
        row.saturating_sub(1) as f64 * 4.0 + 2.0,
    )
}

fn pointer_button(button: MouseButton) -> PointerButton {
    match button {
        MouseButton::Left => PointerButton::Primary,
        MouseButton::Right => PointerButton::Secondary,
        MouseButton::Middle => PointerButton::Middle,
    }
}

/// Handle mouse events for rotating, zooming and picking
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let pos = cell_to_pixel(mouse.column, mouse.row);

    match mouse.kind {
        // Wheel up brings the camera closer
        MouseEventKind::ScrollUp => app.wheel(-1.0),
        MouseEventKind::ScrollDown => app.wheel(1.0),
        MouseEventKind::Down(button) => app.pointer_down(pointer_button(button), pos),
        MouseEventKind::Drag(_) | MouseEventKind::Moved => app.pointer_move(pos),
        MouseEventKind::Up(_) => app.pointer_up(pos),
        _ => {}
    }
}

fn run(terminal: &mut DefaultTerminal, config: GlobeConfig, countries: &[Country], surface: &[LineString]) -> Result<()> {
    terminal.clear()?;
    let size = terminal.size()?;
    let mut app = App::new(config, countries, surface, size.width as usize, size.height as usize);
    log::info!("starting with {} pins", app.markers.len());

    let mut last_frame = Instant::now();

    loop {
        // Handle events with ~60fps target
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) => {
                    // Only handle key press events (not release)
                    if key.kind == KeyEventKind::Press {
                        match key.code {
                            KeyCode::Char('q') | KeyCode::Esc => app.quit(),

                            // Zoom
                            KeyCode::Char('+') | KeyCode::Char('=') => app.wheel(-1.0),
                            KeyCode::Char('-') | KeyCode::Char('_') => app.wheel(1.0),

                            // Reset view
                            KeyCode::Char('r') | KeyCode::Char('0') => app.reset_view(),

                            _ => {}
                        }
                    }
                }
                Event::Mouse(mouse) => {
                    handle_mouse(&mut app, mouse);
                }
                Event::Resize(width, height) => {
                    app.resize(width as usize, height as usize);
                }
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }

        let now = Instant::now();
        let dt = now.duration_since(last_frame).as_secs_f64();
        last_frame = now;

        let mut renderer = TerminalRenderer::new(terminal);
        app.frame(dt, &mut renderer)?;
    }

    log::info!("quit after {} frames", app.frame);
    Ok(())
}
