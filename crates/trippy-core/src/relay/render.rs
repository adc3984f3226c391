//! Chunk renderer
//!
//! Turns the full relay buffer into display segments. Every update is a full
//! re-render of the latest snapshot. Markers and task lines are only
//! recognised once their newline has arrived; until then the trailing line
//! is plain body text, so a marker split across writes never yields a
//! truncated heading.

use crate::config::{ConfigError, RelayConfig};
use crate::markdown;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// One logical block of producer output
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplaySegment {
    /// Heading derived from a step marker; `None` for text before the first step
    pub heading: Option<String>,

    /// Accent colour for the heading
    pub accent: Option<String>,

    /// Plain flowing text of the step
    pub body: String,
}

impl DisplaySegment {
    fn is_blank(&self) -> bool {
        self.heading.is_none() && self.body.trim().is_empty()
    }
}

/// What the visible region should currently show
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedView {
    pub segments: Vec<DisplaySegment>,

    /// Task names seen so far, in order of first appearance
    pub tasks: Vec<String>,
}

impl RenderedView {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Markdown form of the view, headings as `####`
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            if let Some(heading) = &segment.heading {
                out.push_str("#### ");
                out.push_str(heading);
                out.push_str("\n\n");
            }
            if !segment.body.trim().is_empty() {
                out.push_str(segment.body.trim_end());
                out.push_str("\n\n");
            }
        }
        out
    }

    /// HTML form of the view with accented step headings
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            out.push_str("<section class=\"step\">");
            if let Some(heading) = &segment.heading {
                match &segment.accent {
                    Some(accent) => out.push_str(&format!(
                        "<h4 style=\"color: {}\">{}</h4>",
                        markdown::escape_html(accent),
                        markdown::escape_html(heading)
                    )),
                    None => out.push_str(&format!("<h4>{}</h4>", markdown::escape_html(heading))),
                }
            }
            out.push_str(&markdown::to_html(&segment.body));
            out.push_str("</section>");
        }
        out
    }
}

/// Presentation transform from buffer text to a [`RenderedView`]
#[derive(Debug, Clone)]
pub struct ChunkRenderer {
    strip: Vec<Regex>,
    step_markers: Vec<Regex>,
    task_patterns: Vec<Regex>,
    palette: Vec<String>,
}

impl Default for ChunkRenderer {
    fn default() -> Self {
        Self::from_config(&RelayConfig::default()).expect("default relay patterns compile")
    }
}

impl ChunkRenderer {
    /// Build a renderer from the `[relay]` configuration
    pub fn from_config(config: &RelayConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            strip: compile(&config.strip_patterns)?,
            step_markers: compile(&config.step_markers)?,
            task_patterns: compile(&config.task_patterns)?,
            palette: config.palette.clone(),
        })
    }

    /// A renderer that shows text verbatim as a single segment
    pub fn plain() -> Self {
        Self {
            strip: Vec::new(),
            step_markers: Vec::new(),
            task_patterns: Vec::new(),
            palette: Vec::new(),
        }
    }

    /// Remove configured noise (escape codes etc.) from the text
    pub fn clean(&self, text: &str) -> String {
        let mut cleaned = text.to_string();
        for pattern in &self.strip {
            if pattern.is_match(&cleaned) {
                cleaned = pattern.replace_all(&cleaned, "").into_owned();
            }
        }
        cleaned
    }

    /// Render the full buffer snapshot
    pub fn render(&self, text: &str) -> RenderedView {
        let cleaned = self.clean(text);

        let mut view = RenderedView::default();
        let mut current = DisplaySegment::default();
        let mut lines: Vec<&str> = Vec::new();
        let mut steps = 0usize;

        let mut pieces = cleaned.split('\n').peekable();
        while let Some(line) = pieces.next() {
            // The last piece has no newline yet
            if pieces.peek().is_none() {
                lines.push(line);
                break;
            }

            if let Some(task) = self.match_task(line) {
                if !view.tasks.contains(&task) {
                    view.tasks.push(task);
                }
            }

            if let Some(heading) = self.match_step(line) {
                current.body = lines.join("\n");
                lines.clear();
                let finished = std::mem::take(&mut current);
                if !finished.is_blank() {
                    view.segments.push(finished);
                }

                current.heading = Some(heading);
                current.accent = if self.palette.is_empty() {
                    None
                } else {
                    Some(self.palette[steps % self.palette.len()].clone())
                };
                steps += 1;
                continue;
            }

            lines.push(line);
        }

        current.body = lines.join("\n");
        if !current.is_blank() {
            view.segments.push(current);
        }

        view
    }

    fn match_step(&self, line: &str) -> Option<String> {
        self.step_markers.iter().find_map(|marker| {
            let caps = marker.captures(line)?;
            let heading = caps
                .get(1)
                .map(|m| m.as_str().trim())
                .filter(|h| !h.is_empty())
                .unwrap_or_else(|| line.trim());
            Some(heading.to_string())
        })
    }

    fn match_task(&self, line: &str) -> Option<String> {
        self.task_patterns.iter().find_map(|pattern| {
            let task = pattern.captures(line)?.get(1)?.as_str().trim();
            (!task.is_empty()).then(|| task.to_string())
        })
    }
}

fn compile(patterns: &[String]) -> Result<Vec<Regex>, ConfigError> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p).map_err(|e| ConfigError::InvalidPattern {
                pattern: p.clone(),
                message: e.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const CREW_OUTPUT: &str = "\x1b[1m\x1b[95m# Agent:\x1b[00m \x1b[1m\x1b[92mCity Selection Expert\x1b[00m
## Task: Analyze and select the best city for the trip
Bali looks great in June.
# Agent: Local Expert at this city
## Task: Compile an in-depth guide
Ubud has rice terraces.
";

    #[test]
    fn test_strips_ansi_and_splits_steps() {
        let view = ChunkRenderer::default().render(CREW_OUTPUT);

        assert_eq!(view.segments.len(), 2);
        assert_eq!(
            view.segments[0].heading.as_deref(),
            Some("City Selection Expert")
        );
        assert_eq!(view.segments[0].accent.as_deref(), Some("red"));
        assert_eq!(
            view.segments[0].body,
            "## Task: Analyze and select the best city for the trip\nBali looks great in June."
        );
        assert_eq!(view.segments[1].accent.as_deref(), Some("green"));
        assert!(!view.to_markdown().contains('\x1b'));
    }

    #[test]
    fn test_collects_tasks_once() {
        let text = "## Task: Plan\n## Task: Plan\n{\"task\": \"Gather\"}\n";
        let view = ChunkRenderer::default().render(text);
        assert_eq!(view.tasks, vec!["Plan".to_string(), "Gather".to_string()]);
    }

    #[test]
    fn test_marker_without_capture_uses_line() {
        let view = ChunkRenderer::default().render("> Entering new CrewAgentExecutor chain...\nthinking");
        assert_eq!(
            view.segments[0].heading.as_deref(),
            Some("> Entering new CrewAgentExecutor chain...")
        );
        assert_eq!(view.segments[0].body, "thinking");
    }

    #[test]
    fn test_text_before_first_step_is_kept() {
        let view = ChunkRenderer::default().render("warming up\n# Agent: Concierge\nready");
        assert_eq!(view.segments[0].heading, None);
        assert_eq!(view.segments[0].body, "warming up");
        assert_eq!(view.segments[1].heading.as_deref(), Some("Concierge"));
    }

    #[test]
    fn test_palette_cycles() {
        let text = (0..5)
            .map(|i| format!("# Agent: A{}\n", i))
            .collect::<String>();
        let view = ChunkRenderer::default().render(&text);
        let accents: Vec<_> = view
            .segments
            .iter()
            .map(|s| s.accent.clone().unwrap())
            .collect();
        assert_eq!(accents, vec!["red", "green", "blue", "orange", "red"]);
    }

    #[test]
    fn test_marker_only_and_empty_input() {
        let renderer = ChunkRenderer::default();
        assert!(renderer.render("").is_empty());

        let view = renderer.render("# Agent: Solo\n");
        assert_eq!(view.segments.len(), 1);
        assert_eq!(view.segments[0].heading.as_deref(), Some("Solo"));
        assert_eq!(view.segments[0].body, "");
    }

    #[test]
    fn test_unterminated_marker_stays_body() {
        let renderer = ChunkRenderer::default();

        let partial = renderer.render("Bali\n# Agent: City Sel");
        assert_eq!(partial.segments.len(), 1);
        assert_eq!(partial.segments[0].heading, None);
        assert_eq!(partial.segments[0].body, "Bali\n# Agent: City Sel");

        let done = renderer.render("Bali\n# Agent: City Selection Expert\n");
        assert_eq!(
            done.segments[1].heading.as_deref(),
            Some("City Selection Expert")
        );
    }

    #[test]
    fn test_unterminated_task_not_collected() {
        let renderer = ChunkRenderer::default();
        assert!(renderer.render("## Task: Ident").tasks.is_empty());
        assert_eq!(
            renderer.render("## Task: Identify the city\n").tasks,
            vec!["Identify the city".to_string()]
        );
    }

    #[test]
    fn test_plain_renderer_is_verbatim() {
        let text = "# Agent: X\n\x1b[1mbold\x1b[0m";
        let view = ChunkRenderer::plain().render(text);
        assert_eq!(view.segments.len(), 1);
        assert_eq!(view.segments[0].body, text);
    }

    #[test]
    fn test_html_escapes_headings() {
        let view = ChunkRenderer::default().render("# Agent: <b>Bold</b>\nok");
        let html = view.to_html();
        assert!(html.contains("&lt;b&gt;Bold&lt;/b&gt;"));
        assert!(html.contains("color: red"));
    }
}
