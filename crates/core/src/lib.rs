//! Framenote review core.
//!
//! Pure, synchronous domain logic for frame-accurate media review:
//!
//! - [`timecode`]: ms, frame index and SMPTE conversions.
//! - [`media`], [`comment`], [`annotation`], [`marker`]: the annotation
//!   model and its invariants.
//! - [`query`]: filtering, sorting and playhead matching of comments.
//! - [`review`]: the multi-approver review session state machine.
//! - [`revision`]: append-only version history and comparisons.
//!
//! Nothing here performs I/O or locking; shared state lives in
//! `framenote-store`.

pub mod annotation;
pub mod comment;
pub mod config;
pub mod error;
pub mod marker;
pub mod media;
pub mod query;
pub mod review;
pub mod revision;
pub mod timecode;
pub mod types;

pub use config::ReviewConfig;
pub use error::{CoreError, ErrorCategory};
