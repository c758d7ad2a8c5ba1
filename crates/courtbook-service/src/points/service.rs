//! Points read service.
//!
//! All mutation goes through the booking and voucher flows; this
//! service only exposes the cached balance and the append-only history.

use std::sync::Arc;

use courtbook_core::result::AppResult;
use courtbook_entity::points::LedgerEntry;
use courtbook_store::traits::PointsStore;

use crate::context::RequestContext;

/// Read access to a requester's points.
pub struct PointsService {
    /// Points ledger store.
    points: Arc<dyn PointsStore>,
}

impl PointsService {
    /// Creates a new points service.
    pub fn new(points: Arc<dyn PointsStore>) -> Self {
        Self { points }
    }

    /// The caller's current balance (O(1) cached counter).
    pub async fn balance(&self, ctx: &RequestContext) -> AppResult<i64> {
        self.points.balance(&ctx.requester_id).await
    }

    /// The caller's full ledger history, oldest first.
    pub async fn history(&self, ctx: &RequestContext) -> AppResult<Vec<LedgerEntry>> {
        self.points.history(&ctx.requester_id).await
    }
}
