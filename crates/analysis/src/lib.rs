//! # Analysis
//!
//! Cheap per-frame interest heuristics and the machinery that turns them
//! into a highlight: [`ContentScorer`] grades frames, [`SegmentSelector`]
//! groups accepted frames into committed segments, [`HighlightComposer`]
//! splices the matching chunk records into a highlight file.
//!
//! The object and action detectors are deliberate no-signal stubs; the
//! weighted-sum slots stay so real detectors can be substituted without
//! touching the selector.

mod composer;
mod scorer;
mod selector;

pub use composer::{HighlightComposer, ProgressCallback};
pub use scorer::ContentScorer;
pub use selector::{SegmentSelector, SelectorConfig};
