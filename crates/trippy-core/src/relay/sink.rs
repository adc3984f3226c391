//! Text sinks
//!
//! [`TextSink`] is the "output destination" capability handed to a producer.
//! Implementations must be total: a sink stands in for a console, and a
//! failing console would take unrelated producer logic down with it.

use super::render::{ChunkRenderer, RenderedView};
use crate::notifications::Notification;

/// A destination for producer text
pub trait TextSink: Send {
    /// Accept `text`, returning the number of characters taken.
    fn write(&mut self, text: &str) -> usize;

    /// Push out anything held back. Never fails.
    fn flush(&mut self) {}

    /// Short name for diagnostics
    fn label(&self) -> &str {
        "sink"
    }

    /// Write `text` followed by a newline
    fn write_line(&mut self, text: &str) -> usize {
        self.write(text) + self.write("\n")
    }
}

impl<T: TextSink + ?Sized> TextSink for Box<T> {
    fn write(&mut self, text: &str) -> usize {
        (**self).write(text)
    }

    fn flush(&mut self) {
        (**self).flush()
    }

    fn label(&self) -> &str {
        (**self).label()
    }
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl TextSink for NullSink {
    fn write(&mut self, text: &str) -> usize {
        text.chars().count()
    }

    fn label(&self) -> &str {
        "null"
    }
}

/// Forwards complete lines to `tracing`
///
/// The invoker copies every run's producer text here, so the transcript is
/// available at `RUST_LOG=trippy_core::producer=debug`.
#[derive(Debug, Default)]
pub struct TracingSink {
    pending: String,
}

impl TracingSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn emit(line: &str) {
        let line = line.trim_end_matches('\r');
        if !line.trim().is_empty() {
            tracing::debug!(target: "trippy_core::producer", "{}", line);
        }
    }
}

impl TextSink for TracingSink {
    fn write(&mut self, text: &str) -> usize {
        self.pending.push_str(text);
        while let Some(idx) = self.pending.find('\n') {
            let line: String = self.pending.drain(..=idx).collect();
            Self::emit(&line[..line.len() - 1]);
        }
        text.chars().count()
    }

    fn flush(&mut self) {
        let rest = std::mem::take(&mut self.pending);
        Self::emit(&rest);
    }

    fn label(&self) -> &str {
        "tracing"
    }
}

/// The visible, append-friendly display region
pub trait ProgressView: Send {
    /// Replace what is shown with `view`
    fn show(&mut self, view: &RenderedView);

    /// The producer flushed; `view` stays current until the next write.
    /// Views that hold updates back must catch up here.
    fn settle(&mut self, _view: &RenderedView) {}
}

impl<F> ProgressView for F
where
    F: FnMut(&RenderedView) + Send,
{
    fn show(&mut self, view: &RenderedView) {
        self(view)
    }
}

/// Turns rendered views into [`Notification`]s
///
/// Emits a `Toast` the first time each task name shows up. `Progress` goes
/// out when a line or segment completes, not per write, so a token-streaming
/// producer costs one update per line; whatever is held back is sent on
/// [`ProgressView::settle`].
pub struct NotificationView<F> {
    notify: F,
    toasted: usize,
    lines: usize,
    pending: bool,
}

impl<F> NotificationView<F>
where
    F: FnMut(Notification) + Send,
{
    pub fn new(notify: F) -> Self {
        Self {
            notify,
            toasted: 0,
            lines: 0,
            pending: false,
        }
    }

    fn send_progress(&mut self, view: &RenderedView) {
        (self.notify)(Notification::Progress {
            html: view.to_html(),
            segments: view.segments.clone(),
        });
        self.pending = false;
    }
}

/// Segments plus finished body lines
fn completed_lines(view: &RenderedView) -> usize {
    view.segments
        .iter()
        .map(|s| 1 + s.body.matches('\n').count())
        .sum()
}

impl<F> ProgressView for NotificationView<F>
where
    F: FnMut(Notification) + Send,
{
    fn show(&mut self, view: &RenderedView) {
        let toasts = view.tasks.len().saturating_sub(self.toasted);
        for task in view.tasks.iter().skip(self.toasted) {
            (self.notify)(Notification::Toast {
                message: format!("🤖 {}", task),
            });
        }
        self.toasted = self.toasted.max(view.tasks.len());

        let lines = completed_lines(view);
        if lines != self.lines || toasts > 0 {
            self.lines = lines;
            self.send_progress(view);
        } else {
            self.pending = true;
        }
    }

    fn settle(&mut self, view: &RenderedView) {
        if self.pending {
            self.send_progress(view);
        }
    }
}

/// Relay sink: buffers producer text and re-renders it on every write
pub struct RelaySink<V> {
    buffer: String,
    renderer: ChunkRenderer,
    view: V,
    last: RenderedView,
}

impl<V: ProgressView> RelaySink<V> {
    pub fn new(renderer: ChunkRenderer, view: V) -> Self {
        Self {
            buffer: String::new(),
            renderer,
            view,
            last: RenderedView::default(),
        }
    }

    /// Clear the buffer for a new invocation
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.last = RenderedView::default();
    }

    /// Everything written since the last reset, verbatim
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// The view most recently pushed to the display
    pub fn rendered(&self) -> &RenderedView {
        &self.last
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn into_view(self) -> V {
        self.view
    }
}

impl<V: ProgressView> TextSink for RelaySink<V> {
    fn write(&mut self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }

        self.buffer.push_str(text);
        self.last = self.renderer.render(&self.buffer);
        self.view.show(&self.last);

        tracing::trace!(chars = self.buffer.len(), "Relay updated");
        text.chars().count()
    }

    fn flush(&mut self) {
        self.view.settle(&self.last);
    }

    fn label(&self) -> &str {
        "relay"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn recording_relay() -> (RelaySink<impl ProgressView>, Arc<Mutex<Vec<RenderedView>>>) {
        let shown = Arc::new(Mutex::new(Vec::new()));
        let sink_shown = Arc::clone(&shown);
        let relay = RelaySink::new(ChunkRenderer::default(), move |view: &RenderedView| {
            sink_shown.lock().push(view.clone())
        });
        (relay, shown)
    }

    #[test]
    fn test_write_returns_char_count() {
        let (mut relay, _) = recording_relay();
        assert_eq!(relay.write("hello"), 5);
        assert_eq!(relay.write("✈️ Bali"), "✈️ Bali".chars().count());
        assert_eq!(relay.write(""), 0);
        assert_eq!(relay.buffer(), "hello✈️ Bali");
    }

    #[test]
    fn test_view_matches_render_of_concatenation() {
        let chunks = [
            "\x1b[1m# Age",
            "nt: City Selection Expert\x1b[0",
            "0m\n## Task: pick\nBali",
            " it is\n# Agent: Local Expert\n",
            "Ubud",
        ];
        let (mut relay, shown) = recording_relay();
        for chunk in chunks {
            relay.write(chunk);
        }

        let expected = ChunkRenderer::default().render(&chunks.concat());
        assert_eq!(shown.lock().last().cloned().unwrap(), expected);
        assert_eq!(relay.rendered(), &expected);
        assert_eq!(expected.segments[0].heading.as_deref(), Some("City Selection Expert"));
    }

    #[test]
    fn test_flush_is_noop() {
        let (mut relay, shown) = recording_relay();
        relay.write("abc");
        relay.flush();
        assert_eq!(relay.buffer(), "abc");
        assert_eq!(shown.lock().len(), 1);
    }

    #[test]
    fn test_total_over_odd_input() {
        let (mut relay, _) = recording_relay();
        relay.write("# Agent:\n# Agent:\n");
        relay.write("\x1b[");
        relay.write("\n\n\r\n");
        let big = "x".repeat(1 << 20);
        assert_eq!(relay.write(&big), 1 << 20);
    }

    #[test]
    fn test_reset_clears_buffer() {
        let (mut relay, _) = recording_relay();
        relay.write("first run");
        relay.reset();
        assert_eq!(relay.buffer(), "");
        assert!(relay.rendered().is_empty());
        relay.write("second");
        assert_eq!(relay.buffer(), "second");
    }

    fn notifying_relay() -> (RelaySink<impl ProgressView>, Arc<Mutex<Vec<Notification>>>) {
        let notes = Arc::new(Mutex::new(Vec::new()));
        let sink_notes = Arc::clone(&notes);
        let view = NotificationView::new(move |n| sink_notes.lock().push(n));
        (RelaySink::new(ChunkRenderer::default(), view), notes)
    }

    fn toasts(notes: &[Notification]) -> Vec<String> {
        notes
            .iter()
            .filter_map(|n| match n {
                Notification::Toast { message } => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    fn progress_count(notes: &[Notification]) -> usize {
        notes
            .iter()
            .filter(|n| matches!(n, Notification::Progress { .. }))
            .count()
    }

    #[test]
    fn test_notification_view_toasts_once() {
        let (mut relay, notes) = notifying_relay();

        relay.write("## Task: Identify the city\n");
        relay.write("still working\n");

        let notes = notes.lock();
        assert_eq!(toasts(&notes), vec!["🤖 Identify the city".to_string()]);
        assert_eq!(notes.len(), 3);
    }

    #[test]
    fn test_split_task_toasts_full_name() {
        let (mut relay, notes) = notifying_relay();

        relay.write("## Task: Ident");
        relay.write("ify the city\n");

        assert_eq!(toasts(&notes.lock()), vec!["🤖 Identify the city".to_string()]);
    }

    #[test]
    fn test_progress_sent_per_line() {
        let (mut relay, notes) = notifying_relay();

        relay.write("# Agent: City Selection Expert\n");
        for token in ["Bali ", "looks ", "great ", "in ", "June"] {
            relay.write(token);
        }
        assert_eq!(progress_count(&notes.lock()), 1);

        relay.write(".\n");
        assert_eq!(progress_count(&notes.lock()), 2);

        relay.write("Ubud");
        relay.flush();
        relay.flush();
        let notes = notes.lock();
        assert_eq!(progress_count(&notes), 3);
        match notes.last() {
            Some(Notification::Progress { segments, .. }) => {
                assert_eq!(segments[0].body, "Bali looks great in June.\nUbud")
            }
            other => panic!("expected Progress, got {:?}", other),
        }
    }

    #[test]
    fn test_tracing_sink_accepts_partial_lines() {
        let mut sink = TracingSink::new();
        assert_eq!(sink.write("partial"), 7);
        assert_eq!(sink.write(" line\nnext"), 10);
        sink.flush();
        assert_eq!(sink.label(), "tracing");
    }
}
