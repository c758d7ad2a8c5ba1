//! Vouchers owned by requesters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use courtbook_core::types::{Money, OwnedVoucherId, RequesterId, VoucherId};

/// A voucher a requester bought with points.
///
/// The redemption code is generated only after the points debit has
/// committed. `used` goes false to true exactly once, at redemption,
/// and never back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnedVoucher {
    /// Unique identifier.
    pub id: OwnedVoucherId,
    /// The catalog offer this was purchased from.
    pub offer_id: VoucherId,
    /// Owner.
    pub requester_id: RequesterId,
    /// Unique 9-character redemption code.
    pub code: String,
    /// Face-value discount at purchase time.
    pub amount_off: Money,
    /// When the voucher was purchased.
    pub acquired_at: DateTime<Utc>,
    /// Whether the voucher has been redeemed.
    pub used: bool,
    /// When the voucher was redeemed.
    pub used_at: Option<DateTime<Utc>>,
}
