//! Wayline computes how far along a fixed time window (a "journey") is and
//! renders that as a shareable 750×225 progress card.
//!
//! # Pipeline overview
//!
//! 1. **Compute**: `now + Interval -> ProgressRecord` (percent, elapsed and
//!    remaining labels, interval bounds)
//! 2. **Render**: `ProgressRecord -> PNG bytes` via a CPU raster backend
//! 3. **Deliver** (out of crate): a transport layer hands the bytes to the
//!    messaging network
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic-by-default**: [`compute`] is pure, and
//!   [`CardRenderer::render`] is byte-stable for a given record and font.
//! - **No IO in the hot path**: the only environment dependency (font bytes)
//!   is front-loaded at [`CardRenderer::new`], and the crate never reads the
//!   clock; callers pass `now` in.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;
mod journey;
mod render;

pub use foundation::error::{WaylineError, WaylineResult};
pub use journey::interval::{Interval, parse_local_timestamp};
pub use journey::progress::{ProgressRecord, compute, format_hm};
pub use render::card::{CARD_HEIGHT, CARD_WIDTH, CardRenderer};
pub use render::font::load_font_bytes;
