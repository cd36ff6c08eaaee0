use crate::app::{App, FrameRenderer};
use crate::braille::BrailleCanvas;
use crate::map::{CursorStyle, GlobeLayers};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
    DefaultTerminal, Frame,
};

/// Draws frames into a ratatui terminal.
pub struct TerminalRenderer<'t> {
    terminal: &'t mut DefaultTerminal,
}

impl<'t> TerminalRenderer<'t> {
    pub fn new(terminal: &'t mut DefaultTerminal) -> Self {
        Self { terminal }
    }
}

impl FrameRenderer for TerminalRenderer<'_> {
    type Error = std::io::Error;

    fn render_frame(&mut self, app: &App) -> Result<(), Self::Error> {
        self.terminal.draw(|frame| render(frame, app))?;
        Ok(())
    }
}

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Split into globe area and status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Globe
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_globe(frame, app, chunks[0]);
    render_status_bar(frame, app, chunks[1]);
}

fn render_globe(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Globe ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let layers = app.globe.render(
        inner.width as usize,
        inner.height as usize,
        &app.camera,
        &app.markers,
        app.atmosphere_scale,
    );

    // Pointer position in character cells
    let cursor_pos = app.pointer.and_then(|p| {
        let cx = (p.x / 2.0) as u16;
        let cy = (p.y / 4.0) as u16;
        (p.x >= 0.0 && p.y >= 0.0 && cx < inner.width && cy < inner.height).then_some((cx, cy))
    });

    frame.render_widget(
        GlobeWidget {
            layers,
            cursor_pos,
            cursor: app.cursor,
        },
        inner,
    );

    if let (Some(label), Some(rect)) = (app.label(), app.drawn_label_rect()) {
        let target = Rect::new(inner.x + rect.col, inner.y + rect.row, rect.width, rect.height);
        let [title, flag] = label.lines();
        let body = Paragraph::new(vec![
            Line::from(Span::styled(title, Style::default().fg(Color::White).add_modifier(Modifier::BOLD))),
            Line::from(Span::styled(flag, Style::default().fg(Color::DarkGray))),
        ])
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        );
        frame.render_widget(Clear, target);
        frame.render_widget(body, target);
    }
}

/// Renders braille globe layers with pins and the pointer overlaid
struct GlobeWidget {
    layers: GlobeLayers,
    cursor_pos: Option<(u16, u16)>,
    cursor: CursorStyle,
}

impl GlobeWidget {
    /// Render a braille canvas layer with a specific color
    fn render_layer(&self, canvas: &BrailleCanvas, color: Color, area: Rect, buf: &mut Buffer) {
        for (row_idx, row_str) in canvas.rows().enumerate() {
            if row_idx >= area.height as usize {
                break;
            }
            let y = area.y + row_idx as u16;

            for (col_idx, ch) in row_str.chars().enumerate() {
                if col_idx >= area.width as usize {
                    break;
                }
                // Skip empty braille characters (U+2800)
                if ch == '\u{2800}' {
                    continue;
                }
                let x = area.x + col_idx as u16;
                buf[(x, y)].set_char(ch).set_fg(color);
            }
        }
    }
}

impl Widget for GlobeWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Back to front: stars, glow, surface
        self.render_layer(&self.layers.stars, Color::DarkGray, area, buf);
        self.render_layer(&self.layers.atmosphere, Color::Blue, area, buf);
        self.render_layer(&self.layers.surface, Color::Cyan, area, buf);

        for pin in &self.layers.pins {
            if pin.col >= area.width || pin.row >= area.height {
                continue;
            }
            let color = if pin.highlighted { Color::Green } else { Color::Red };
            buf[(area.x + pin.col, area.y + pin.row)]
                .set_char('●')
                .set_style(Style::default().fg(color).add_modifier(Modifier::BOLD));
        }

        if let Some((cx, cy)) = self.cursor_pos {
            let (glyph, color) = match self.cursor {
                CursorStyle::Pointer => ('◉', Color::Yellow),
                CursorStyle::Default => ('╋', Color::Red),
            };
            buf[(area.x + cx, area.y + cy)].set_char(glyph).set_fg(color);
        }
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let hovered = app.hovered_name().unwrap_or("-").to_string();

    let status = Line::from(vec![
        Span::styled(" Dist: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.distance_text(), Style::default().fg(Color::Yellow)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.facing_coords(), Style::default().fg(Color::Cyan)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.selection().name(), Style::default().fg(Color::Magenta)),
        Span::styled(" | pin: ", Style::default().fg(Color::DarkGray)),
        Span::styled(hovered, Style::default().fg(Color::Green)),
        Span::styled(
            " | drag:rotate wheel,+/-:zoom click:label r:reset q:quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let paragraph = Paragraph::new(status);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GlobeConfig;
    use crate::data::{default_countries, simple_world};
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn draws_globe_and_status_bar() {
        let app = App::new(GlobeConfig::default(), &default_countries(), &simple_world(), 100, 40);
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        terminal.draw(|frame| render(frame, &app)).unwrap();

        let buffer = terminal.backend().buffer();
        let status: String = (0..100u16).map(|x| buffer[(x, 39u16)].symbol().to_string()).collect();
        assert!(status.contains("Dist: 10.0"));
        assert!(status.contains("idle"));

        let pins = (0..100u16)
            .flat_map(|x| (0..39u16).map(move |y| (x, y)))
            .filter(|&(x, y)| buffer[(x, y)].symbol() == "●")
            .count();
        assert!(pins > 0);
    }
}
