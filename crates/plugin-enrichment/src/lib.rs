//! # Plugin Enrichment
//!
//! First-party content enrichment plugins:
//!
//! - [`TagNormalizerPlugin`] (`tag-normalizer`) cleans up post tags so that
//!   plugins running after it can match on them reliably
//! - [`ReadingTimePlugin`] (`reading-time`) estimates reading time from the
//!   post body

pub mod reading_time;
pub mod tags;

pub use reading_time::{ReadingTimeConfig, ReadingTimePlugin};
pub use tags::{TagNormalizerConfig, TagNormalizerPlugin};
