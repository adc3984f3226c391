//! Terminal progress view for `trippy plan`
//!
//! The relay hands over a full re-render on every write; this view prints
//! only what is new since the previous one, with step headings coloured from
//! the palette. The unfinished last line is held back until it completes or
//! the producer flushes.

use crossterm::{
    queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
};
use std::io::Write;
use trippy_core::{ProgressView, RenderedView};

pub struct TerminalView<W: Write + Send> {
    out: W,
    segments: usize,
    heading: Option<String>,
    body: String,
    tasks: usize,
}

impl<W: Write + Send> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            segments: 0,
            heading: None,
            body: String::new(),
            tasks: 0,
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn print_heading(&mut self, heading: &str, accent: Option<&str>) -> std::io::Result<()> {
        let color = accent.map(palette_color).unwrap_or(Color::Reset);
        queue!(
            self.out,
            Print("\n"),
            SetForegroundColor(color),
            SetAttribute(Attribute::Bold),
            Print(format!("▶ {}\n", heading)),
            SetAttribute(Attribute::Reset),
            ResetColor
        )
    }

    fn print_task(&mut self, task: &str) -> std::io::Result<()> {
        queue!(
            self.out,
            SetForegroundColor(Color::Yellow),
            Print(format!("🤖 {}\n", task)),
            ResetColor
        )
    }

    fn render(&mut self, view: &RenderedView, settled: bool) -> std::io::Result<()> {
        for task in view.tasks.iter().skip(self.tasks) {
            self.print_task(task)?;
        }
        self.tasks = self.tasks.max(view.tasks.len());

        if view.segments.len() < self.segments {
            // The renderer merged segments back (an escape sequence completed);
            // pick up from the last one.
            self.segments = view.segments.len();
        }

        let start = self.segments.saturating_sub(1);
        let last = view.segments.len().saturating_sub(1);
        for (i, segment) in view.segments.iter().enumerate().skip(start) {
            if i >= self.segments || segment.heading != self.heading {
                if let Some(heading) = &segment.heading {
                    self.print_heading(heading, segment.accent.as_deref())?;
                }
                self.heading = segment.heading.clone();
                self.body.clear();
                self.segments = i + 1;
            }

            let body = if settled || i < last {
                segment.body.as_str()
            } else {
                finished_lines(&segment.body)
            };
            if let Some(fresh) = body.strip_prefix(self.body.as_str()) {
                queue!(self.out, Print(fresh))?;
                self.body = body.to_string();
            } else if !self.body.starts_with(body) {
                // Earlier text changed (a stripped escape completed); reprint
                queue!(self.out, Print("\n"), Print(body))?;
                self.body = body.to_string();
            }
        }

        self.out.flush()
    }
}

/// `body` up to and including its last newline
fn finished_lines(body: &str) -> &str {
    body.rfind('\n').map_or("", |idx| &body[..=idx])
}

impl<W: Write + Send> ProgressView for TerminalView<W> {
    fn show(&mut self, view: &RenderedView) {
        if let Err(e) = self.render(view, false) {
            tracing::debug!("Terminal view write failed: {}", e);
        }
    }

    fn settle(&mut self, view: &RenderedView) {
        if let Err(e) = self.render(view, true) {
            tracing::debug!("Terminal view write failed: {}", e);
        }
    }
}

/// Map a palette entry (`red`, `orange`, `#rrggbb`) to a terminal colour
pub fn palette_color(name: &str) -> Color {
    match name.trim().to_ascii_lowercase().as_str() {
        "red" => Color::Red,
        "green" => Color::Green,
        "blue" => Color::Blue,
        "yellow" => Color::Yellow,
        "magenta" | "purple" => Color::Magenta,
        "cyan" => Color::Cyan,
        "orange" => Color::Rgb {
            r: 255,
            g: 165,
            b: 0,
        },
        hex => parse_hex(hex).unwrap_or(Color::Reset),
    }
}

fn parse_hex(value: &str) -> Option<Color> {
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some(Color::Rgb {
        r: channel(0)?,
        g: channel(2)?,
        b: channel(4)?,
    })
}
