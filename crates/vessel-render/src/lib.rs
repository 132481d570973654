//! Rate-limited triggering of consumer render work (spec §4.5).
//!
//! Two strategies sit between an event source (typically a screen reacting
//! to `vessel.*` bus events) and its render function, both enforcing a
//! minimum interval between renders: [`PeriodicRenderStrategy`] coalesces
//! bursts of requests into a single render, [`QueuedRenderStrategy`]
//! serializes each request into its own render call.

mod periodic;
mod queued;

pub use periodic::{PeriodicRenderStrategy, RenderFn};
pub use queued::{QueuedRenderStrategy, RenderPayload, RenderWithDataFn};
