use std::sync::{Mutex, PoisonError};

use lacuna_core::{ProgressContext, ProgressSink};

/// One notification received by [`RecordingProgress`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// `start_operation` was called.
    Started {
        /// Operation identifier.
        operation_id: String,
        /// Announced step count.
        total_steps: usize,
        /// Context map.
        context: ProgressContext,
    },
    /// `update_progress` was called.
    Updated {
        /// Step reached.
        step: usize,
        /// Status message.
        message: String,
    },
    /// `complete_operation` was called.
    Completed,
}

/// Progress sink that records every call.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingProgress {
    /// Empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events.
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Steps passed to `update_progress`, in call order.
    pub fn steps(&self) -> Vec<usize> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ProgressEvent::Updated { step, .. } => Some(step),
                _ => None,
            })
            .collect()
    }

    /// Whether `complete_operation` was called.
    pub fn completed(&self) -> bool {
        self.events().contains(&ProgressEvent::Completed)
    }

    fn push(&self, event: ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl ProgressSink for RecordingProgress {
    fn start_operation(&self, operation_id: &str, total_steps: usize, context: &ProgressContext) {
        self.push(ProgressEvent::Started {
            operation_id: operation_id.to_string(),
            total_steps,
            context: context.clone(),
        });
    }

    fn update_progress(&self, step: usize, message: &str) {
        self.push(ProgressEvent::Updated {
            step,
            message: message.to_string(),
        });
    }

    fn complete_operation(&self) {
        self.push(ProgressEvent::Completed);
    }
}
