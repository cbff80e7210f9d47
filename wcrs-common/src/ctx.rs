//! Explicit request context for mutating calls
//!
//! The acting user and the reference instant travel with every mutating
//! call instead of living in ambient per-request state. Handlers build
//! one at the boundary; tests construct them directly to pin "now".

use chrono::{DateTime, Utc};

/// Who is acting, and when
#[derive(Debug, Clone, Copy)]
pub struct Ctx {
    pub user_id: i64,
    pub now: DateTime<Utc>,
}

impl Ctx {
    pub fn new(user_id: i64, now: DateTime<Utc>) -> Self {
        Self { user_id, now }
    }
}
