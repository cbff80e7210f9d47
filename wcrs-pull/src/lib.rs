//! wcrs-pull library - Unattended episode puller
//!
//! One pass per invocation: fetch the catalog, stage missing episode
//! audio from object storage, promote each show's next-up episode to its
//! playout path, and reclaim disk from files past the retention window.

pub mod catalog;
pub mod config;
pub mod pipeline;
