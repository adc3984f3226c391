//! Streaming progress relay
//!
//! A producer writes text into a [`TextSink`]. The [`RelaySink`] keeps the
//! whole text of the current invocation, re-renders it with a
//! [`ChunkRenderer`] after every write and pushes the result to a
//! [`ProgressView`].
//!
//! ```text
//! producer ──write──→ RelaySink ──buffer──→ ChunkRenderer ──RenderedView──→ ProgressView
//! ```

mod render;
mod sink;

pub use render::{ChunkRenderer, DisplaySegment, RenderedView};
pub use sink::{NotificationView, NullSink, ProgressView, RelaySink, TextSink, TracingSink};
