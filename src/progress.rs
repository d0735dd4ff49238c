//! Observer trait for per-run pipeline events.
//!
//! Inject an [`Arc<dyn RunObserver>`] via
//! [`crate::config::AnalyzerConfigBuilder::observer`] to follow a run as it
//! moves through its states. The CLI uses this to drive its spinner; a UI
//! layer can forward the same events to whatever it renders with.
//!
//! # Example
//!
//! ```rust
//! use resume_analyzer::{AnalyzerConfig, RunObserver, RunState};
//! use std::sync::{Arc, Mutex};
//!
//! #[derive(Default)]
//! struct Recorder(Mutex<Vec<String>>);
//!
//! impl RunObserver for Recorder {
//!     fn on_state(&self, state: &RunState) {
//!         self.0.lock().unwrap().push(state.to_string());
//!     }
//! }
//!
//! let config = AnalyzerConfig::builder()
//!     .observer(Arc::new(Recorder::default()) as Arc<dyn RunObserver>)
//!     .build()
//!     .unwrap();
//! ```

use crate::analyze::RunState;
use std::sync::Arc;

/// Called by the orchestrator as a run progresses.
///
/// All methods default to no-ops. Runs are independent, so one observer
/// shared by concurrent runs sees their events interleaved.
pub trait RunObserver: Send + Sync {
    /// Called on every state transition, including the initial `Idle`.
    fn on_state(&self, state: &RunState) {
        let _ = state;
    }

    /// Called once text extraction finished.
    ///
    /// # Arguments
    /// * `page_count` — pages in the document
    /// * `chars`      — characters in the extracted text
    fn on_text_extracted(&self, page_count: usize, chars: usize) {
        let _ = (page_count, chars);
    }

    /// Called once the generation service answered, before validation.
    fn on_reply_received(&self, reply_len: usize) {
        let _ = reply_len;
    }
}

/// A no-op observer, used when none is configured.
pub struct NoopObserver;

impl RunObserver for NoopObserver {}

/// Convenience alias matching the type stored in [`crate::config::AnalyzerConfig`].
pub type ObserverHandle = Arc<dyn RunObserver>;
