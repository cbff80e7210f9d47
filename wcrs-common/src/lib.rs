//! Shared library for the WCRS scheduling system
//!
//! Common types and logic used by the scheduler service (wcrs-sched) and
//! the unattended episode puller (wcrs-pull): error taxonomy, station
//! configuration, weekly recurrence math, SQLite schema and queries, and
//! the object-storage client.

pub mod config;
pub mod ctx;
pub mod db;
pub mod error;
pub mod schedule;
pub mod storage;

pub use ctx::Ctx;
pub use error::{Error, Result};
