//! Progress-callback trait for per-diagram conversion events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the pipeline renders each diagram. Rendering is strictly
//! sequential, so events arrive in discovery order: every Excalidraw
//! reference first, then every Mermaid block.
//!
//! # Example
//!
//! ```rust
//! use edgequake_md2docx::{ConversionConfig, ConversionProgressCallback, DiagramKind};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     rendered: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_diagram_complete(&self, kind: DiagramKind, index: usize, image: &str) {
//!         self.rendered.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{kind} #{index} → {image}");
//!     }
//! }
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(Arc::new(CountingCallback { rendered: AtomicUsize::new(0) }))
//!     .build()
//!     .unwrap();
//! ```

use crate::output::DiagramKind;
use std::sync::Arc;

/// Called by the conversion pipeline as it renders each diagram.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. `Send + Sync` lets the callback live inside a
/// shared [`crate::ConversionConfig`].
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once after discovery, before the first renderer runs.
    ///
    /// # Arguments
    /// * `total_diagrams` — Excalidraw references plus Mermaid blocks found
    fn on_conversion_start(&self, total_diagrams: usize) {
        let _ = total_diagrams;
    }

    /// Called just before the renderer is invoked for a diagram.
    ///
    /// `index` is zero-based and counts within `kind`.
    fn on_diagram_start(&self, kind: DiagramKind, index: usize) {
        let _ = (kind, index);
    }

    /// Called when a diagram was rendered and its reference rewritten.
    ///
    /// `image` is the workspace-relative SVG file name now referenced.
    fn on_diagram_complete(&self, kind: DiagramKind, index: usize, image: &str) {
        let _ = (kind, index, image);
    }

    /// Called when a renderer fails. The run stops right after this event.
    fn on_diagram_error(&self, kind: DiagramKind, index: usize, error: &str) {
        let _ = (kind, index, error);
    }

    /// Called once the converter has been started on the intermediate document.
    fn on_convert_start(&self) {}

    /// Called once after the output document has been written.
    ///
    /// # Arguments
    /// * `rendered` — number of diagrams rendered during the run
    fn on_conversion_complete(&self, rendered: usize) {
        let _ = rendered;
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct TrackingCallback {
        total: AtomicUsize,
        starts: AtomicUsize,
        completes: AtomicUsize,
        errors: AtomicUsize,
        rendered: AtomicUsize,
    }

    impl ConversionProgressCallback for TrackingCallback {
        fn on_conversion_start(&self, total_diagrams: usize) {
            self.total.store(total_diagrams, Ordering::SeqCst);
        }

        fn on_diagram_start(&self, _kind: DiagramKind, _index: usize) {
            self.starts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_diagram_complete(&self, _kind: DiagramKind, _index: usize, _image: &str) {
            self.completes.fetch_add(1, Ordering::SeqCst);
        }

        fn on_diagram_error(&self, _kind: DiagramKind, _index: usize, _error: &str) {
            self.errors.fetch_add(1, Ordering::SeqCst);
        }

        fn on_conversion_complete(&self, rendered: usize) {
            self.rendered.store(rendered, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_conversion_start(2);
        cb.on_diagram_start(DiagramKind::Excalidraw, 0);
        cb.on_diagram_complete(DiagramKind::Excalidraw, 0, "excalidraw-0.svg");
        cb.on_diagram_error(DiagramKind::Mermaid, 0, "exit 1");
        cb.on_convert_start();
        cb.on_conversion_complete(1);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();

        tracker.on_conversion_start(3);
        tracker.on_diagram_start(DiagramKind::Excalidraw, 0);
        tracker.on_diagram_complete(DiagramKind::Excalidraw, 0, "excalidraw-0.svg");
        tracker.on_diagram_start(DiagramKind::Mermaid, 0);
        tracker.on_diagram_complete(DiagramKind::Mermaid, 0, "mermaid-0.svg");
        tracker.on_diagram_start(DiagramKind::Mermaid, 1);
        tracker.on_diagram_error(DiagramKind::Mermaid, 1, "mmdc exited 1");

        assert_eq!(tracker.total.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.starts.load(Ordering::SeqCst), 3);
        assert_eq!(tracker.completes.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.errors.load(Ordering::SeqCst), 1);

        tracker.on_conversion_complete(2);
        assert_eq!(tracker.rendered.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_conversion_start(1);
        cb.on_diagram_start(DiagramKind::Mermaid, 0);
    }
}
