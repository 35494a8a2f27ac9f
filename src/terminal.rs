//! Terminal surface for the camera widget.
//!
//! Renders the live preview using Unicode half-block characters for
//! improved vertical resolution, plus a status bar naming the available
//! controls. The snapshot control is only offered while the camera is
//! on.

use crate::capture::Frame;
use crate::export::DownloadSink;
use crate::session::SessionState;
use crate::widget::CameraWidget;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend, buffer::Buffer, layout::Rect, style::Color, widgets::Widget,
    Terminal,
};
use std::io::{self, stdout};
use std::time::Duration;
use tracing::error;

/// Runs the widget's terminal surface until the user quits.
pub fn run(
    widget: CameraWidget,
    sink: impl DownloadSink,
) -> Result<(), Box<dyn std::error::Error>> {
    // Set up terminal
    enable_raw_mode()?;
    let mut out = stdout();
    execute!(out, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(out);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let result = run_app(&mut terminal, widget, sink);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut widget: CameraWidget,
    mut sink: impl DownloadSink,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut status_message = build_status_message(&widget);

    loop {
        // Resolve pending acquisition and refresh the preview binding
        let state_before = widget.session_state();
        widget.tick();
        if widget.session_state() != state_before {
            status_message = build_status_message(&widget);
        }

        // Draw
        terminal.draw(|f| {
            let area = f.area();

            // Reserve bottom line for status
            let preview_area = Rect {
                x: area.x,
                y: area.y,
                width: area.width,
                height: area.height.saturating_sub(1),
            };

            let preview = PreviewWidget {
                frame: widget.preview_frame(),
                placeholder: placeholder_for(&widget),
            };
            f.render_widget(preview, preview_area);

            let status_area = Rect {
                x: area.x,
                y: area.height.saturating_sub(1),
                width: area.width,
                height: 1,
            };
            let status = StatusBar {
                message: &status_message,
            };
            f.render_widget(status, status_area);
        })?;

        // Handle input with timeout for frame updates
        if event::poll(Duration::from_millis(16))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    // Ctrl+C or 'q' to quit
                    if key.code == KeyCode::Char('c')
                        && key.modifiers.contains(KeyModifiers::CONTROL)
                    {
                        break;
                    }
                    if key.code == KeyCode::Char('q') {
                        break;
                    }

                    // 't' toggles camera power
                    if key.code == KeyCode::Char('t') {
                        widget.toggle_camera();
                        status_message = build_status_message(&widget);
                    }

                    // 'p' takes a snapshot, only offered while on
                    if key.code == KeyCode::Char('p') && widget.snapshot_available() {
                        match widget.capture_snapshot(&mut sink) {
                            Ok(path) => {
                                status_message = format!("Saved: {}", path.display());
                            }
                            Err(e) => {
                                error!("Failed to save snapshot: {}", e);
                                status_message = format!("Error: {}", e);
                            }
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

fn placeholder_for(widget: &CameraWidget) -> &'static str {
    match widget.session_state() {
        SessionState::Pending => "Waiting for camera...",
        _ => "Camera is off",
    }
}

/// Builds the status line naming the available controls.
///
/// The snapshot control appears only while the camera is on.
pub fn build_status_message(widget: &CameraWidget) -> String {
    let mut msg = format!("'t' {}", widget.toggle_label());
    if widget.snapshot_available() {
        msg.push_str(" | 'p' Take Snapshot");
    }
    msg.push_str(" | 'q' quit");
    msg
}

/// Widget that renders a camera frame using half-block characters.
struct PreviewWidget<'a> {
    frame: Option<&'a Frame>,
    placeholder: &'a str,
}

impl Widget for PreviewWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(frame) = self.frame else {
            // No frame bound - show placeholder
            let msg = self.placeholder;
            let x = area.x + (area.width.saturating_sub(msg.len() as u16)) / 2;
            let y = area.y + area.height / 2;
            if y < area.y + area.height && x < area.x + area.width {
                buf.set_string(x, y, msg, ratatui::style::Style::default());
            }
            return;
        };

        if frame.is_empty() || area.width == 0 || area.height == 0 {
            return;
        }

        // Calculate display dimensions maintaining aspect ratio.
        // Each terminal cell displays 2 vertical pixels via half-blocks.
        let frame_aspect = frame.width() as f64 / frame.height() as f64;
        let term_width = area.width as f64;
        let term_height = (area.height * 2) as f64;

        let (display_width, display_height) = if term_width / term_height > frame_aspect {
            // Terminal is wider - fit to height
            let h = term_height;
            let w = h * frame_aspect;
            (w as u16, (h / 2.0) as u16)
        } else {
            // Terminal is taller - fit to width
            let w = term_width;
            let h = w / frame_aspect;
            (w as u16, (h / 2.0) as u16)
        };

        // Center the image
        let x_offset = area.x + (area.width.saturating_sub(display_width)) / 2;
        let y_offset = area.y + (area.height.saturating_sub(display_height)) / 2;

        // Scale factors
        let x_scale = frame.width() as f64 / display_width.max(1) as f64;
        let y_scale = frame.height() as f64 / (display_height.max(1) * 2) as f64;

        // Each cell shows two pixels: upper half (▀) as fg, lower as bg
        for ty in 0..display_height {
            for tx in 0..display_width {
                let term_x = x_offset + tx;
                let term_y = y_offset + ty;

                if term_x >= area.x + area.width || term_y >= area.y + area.height {
                    continue;
                }

                let src_x = (tx as f64 * x_scale) as u32;
                let src_y_top = (ty as f64 * 2.0 * y_scale) as u32;
                let src_y_bottom = ((ty as f64 * 2.0 + 1.0) * y_scale) as u32;

                let (tr, tg, tb) = frame.pixel_rgb(src_x, src_y_top);
                let (br, bg_, bb) = frame.pixel_rgb(src_x, src_y_bottom);

                if let Some(cell) = buf.cell_mut((term_x, term_y)) {
                    cell.set_char('▀');
                    cell.set_fg(Color::Rgb(tr, tg, tb));
                    cell.set_bg(Color::Rgb(br, bg_, bb));
                }
            }
        }
    }
}

/// Status bar widget.
struct StatusBar<'a> {
    message: &'a str,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Fill background
        for x in area.x..area.x + area.width {
            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(' ');
                cell.set_bg(Color::DarkGray);
            }
        }

        // Render text, truncating on a char boundary (paths in save
        // feedback may be non-ASCII)
        let text = match self.message.char_indices().nth(area.width as usize) {
            Some((idx, _)) => &self.message[..idx],
            None => self.message,
        };

        buf.set_string(
            area.x,
            area.y,
            text,
            ratatui::style::Style::default()
                .fg(Color::White)
                .bg(Color::DarkGray),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::CaptureConfig;
    use crate::session::MockSourceFactory;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_snapshot_control_absent_while_off() {
        let widget = CameraWidget::new(Arc::new(MockSourceFactory), CaptureConfig::default());
        let msg = build_status_message(&widget);
        assert!(msg.contains("Turn On Camera"));
        assert!(!msg.contains("Take Snapshot"));
    }

    #[test]
    fn test_status_bar_truncates_non_ascii_on_char_boundary() {
        // "Saved: " is 7 bytes; a width of 8 lands inside the two-byte 'ü'
        let area = Rect::new(0, 0, 8, 1);
        let mut buf = Buffer::empty(area);
        let status = StatusBar {
            message: "Saved: üüü.png",
        };
        status.render(area, &mut buf);

        assert_eq!(buf.cell((0, 0)).unwrap().symbol(), "S");
        assert_eq!(buf.cell((7, 0)).unwrap().symbol(), "ü");
    }

    #[test]
    fn test_snapshot_control_present_while_on() {
        let mut widget = CameraWidget::new(Arc::new(MockSourceFactory), CaptureConfig::default());
        widget.toggle_camera();
        for _ in 0..100 {
            widget.tick();
            if widget.snapshot_available() {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }

        let msg = build_status_message(&widget);
        assert!(msg.contains("Turn Off Camera"));
        assert!(msg.contains("Take Snapshot"));
    }
}
