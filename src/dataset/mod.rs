//! Core types shared across the conversion pipeline.
//!
//! Manifests parse into these types, the enumerator and split filter
//! produce them, and the shard writer consumes them.

mod bbox;
mod model;
mod split;

pub use bbox::BBox;
pub use model::{basename, ImageEntry, ImageRecord, SplitFiles};
pub use split::Split;
