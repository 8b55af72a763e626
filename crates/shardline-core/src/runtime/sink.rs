// crates/shardline-core/src/runtime/sink.rs
// ============================================================================
// Module: Kernel Event Sinks
// Description: Built-in destinations for structured kernel events.
// Purpose: Emit JSON lines to stderr, drop events, or capture them in memory.
// Dependencies: crate::{core, interfaces}, serde_json
// ============================================================================

//! ## Overview
//! Sinks never fail the pipeline: serialization or lock failures drop the
//! event.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::sync::Mutex;

use crate::core::KernelEvent;
use crate::interfaces::KernelEventSink;

/// Writes each event as one JSON line to stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrEventSink;

impl KernelEventSink for StderrEventSink {
    #[allow(clippy::print_stderr, reason = "Event sink writes JSON lines to stderr by design.")]
    fn record(&self, event: &KernelEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            eprintln!("{payload}");
        }
    }
}

/// Discards events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventSink;

impl KernelEventSink for NoopEventSink {
    fn record(&self, _event: &KernelEvent) {}
}

/// Captures events in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventSink {
    /// Recorded events in order.
    events: Arc<Mutex<Vec<KernelEvent>>>,
}

impl InMemoryEventSink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded events in order.
    #[must_use]
    pub fn events(&self) -> Vec<KernelEvent> {
        self.events.lock().map(|events| events.clone()).unwrap_or_default()
    }

    /// Names of recorded events in order.
    #[must_use]
    pub fn event_names(&self) -> Vec<&'static str> {
        self.events().iter().map(KernelEvent::name).collect()
    }
}

impl KernelEventSink for InMemoryEventSink {
    fn record(&self, event: &KernelEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
