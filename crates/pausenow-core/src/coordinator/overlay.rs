//! Overlay presentation protocol.
//!
//! The coordinator hands the presenter an [`OverlayHandle`] together with
//! each request. The handle is the continuation: calling `skip` or
//! `complete` consumes it, so a presentation resolves at most once, and
//! dropping it unresolved counts as a skip. Handles may be resolved from any
//! thread; the resolution travels over a channel and is applied on the
//! coordinator's own context.

use tokio::sync::mpsc::UnboundedSender;

use crate::reminder::{ReminderOutcome, ReminderType};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayRequest {
    pub presentation_id: u64,
    pub reminder_type: ReminderType,
    pub duration_secs: u32,
    pub prompt: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayResolution {
    pub presentation_id: u64,
    pub outcome: ReminderOutcome,
}

#[derive(Debug)]
pub struct OverlayHandle {
    presentation_id: u64,
    tx: Option<UnboundedSender<OverlayResolution>>,
}

impl OverlayHandle {
    pub(crate) fn new(presentation_id: u64, tx: UnboundedSender<OverlayResolution>) -> Self {
        Self {
            presentation_id,
            tx: Some(tx),
        }
    }

    pub fn presentation_id(&self) -> u64 {
        self.presentation_id
    }

    pub fn skip(mut self) {
        self.resolve(ReminderOutcome::Skipped);
    }

    pub fn complete(mut self) {
        self.resolve(ReminderOutcome::Completed);
    }

    fn resolve(&mut self, outcome: ReminderOutcome) {
        if let Some(tx) = self.tx.take() {
            // The coordinator may already be gone during shutdown.
            let _ = tx.send(OverlayResolution {
                presentation_id: self.presentation_id,
                outcome,
            });
        }
    }
}

impl Drop for OverlayHandle {
    fn drop(&mut self) {
        self.resolve(ReminderOutcome::Skipped);
    }
}

pub trait OverlayPresenter: Send {
    /// Show the break UI. Exactly one resolution must eventually follow,
    /// through `handle`.
    fn present(&mut self, request: OverlayRequest, handle: OverlayHandle);
}
