//! Voucher & points ledger service.

use std::sync::Arc;

use tracing::info;

use courtbook_core::error::AppError;
use courtbook_core::result::AppResult;
use courtbook_core::types::{Money, OwnedVoucherId, VoucherId};
use courtbook_entity::catalog::VoucherOffer;
use courtbook_entity::points::LedgerEntry;
use courtbook_entity::voucher::OwnedVoucher;
use courtbook_store::traits::{PointsStore, VoucherStore};

use super::code;
use crate::catalog::CatalogService;
use crate::clock::Clock;
use crate::context::RequestContext;

/// Sells catalog voucher offers for points and redeems owned vouchers.
pub struct VoucherService {
    /// Catalog cache for offer lookups.
    catalog: Arc<CatalogService>,
    /// Owned voucher records.
    vouchers: Arc<dyn VoucherStore>,
    /// Points ledger for the purchase debit.
    points: Arc<dyn PointsStore>,
    /// Time source.
    clock: Arc<dyn Clock>,
}

impl VoucherService {
    /// Creates a new voucher service.
    pub fn new(
        catalog: Arc<CatalogService>,
        vouchers: Arc<dyn VoucherStore>,
        points: Arc<dyn PointsStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            catalog,
            vouchers,
            points,
            clock,
        }
    }

    /// Purchasable offers (active only).
    pub async fn offers(&self) -> AppResult<Vec<VoucherOffer>> {
        Ok(self
            .catalog
            .snapshot()
            .await?
            .voucher_offers
            .values()
            .filter(|o| o.active)
            .cloned()
            .collect())
    }

    /// Spend points on a voucher offer.
    ///
    /// The balance check and debit are one conditional operation in the
    /// points store, so concurrent purchases cannot double-spend. The
    /// redemption code is generated only after the debit has committed.
    pub async fn purchase(
        &self,
        ctx: &RequestContext,
        offer_id: &VoucherId,
    ) -> AppResult<OwnedVoucher> {
        let offer = self.catalog.offer(offer_id).await?;
        if !offer.active {
            return Err(AppError::not_found(format!(
                "Voucher offer {offer_id} is not available"
            )));
        }

        let owned_id = OwnedVoucherId::new();
        let debit = LedgerEntry::voucher_debit(
            ctx.requester_id.clone(),
            owned_id,
            offer.cost_points,
            format!("Bought voucher {}", offer.amount_off),
        );
        let balance = self.points.append(&debit).await?;

        let voucher = OwnedVoucher {
            id: owned_id,
            offer_id: offer.id.clone(),
            requester_id: ctx.requester_id.clone(),
            code: code::redemption_code(),
            amount_off: offer.amount_off,
            acquired_at: self.clock.now(),
            used: false,
            used_at: None,
        };
        self.vouchers.insert_owned(&voucher).await?;

        info!(
            requester_id = %ctx.requester_id,
            offer_id = %offer_id,
            cost = offer.cost_points,
            balance,
            "Voucher purchased"
        );
        Ok(voucher)
    }

    /// Redeem an owned voucher: `used` flips false to true exactly once.
    pub async fn redeem(&self, owned_voucher_id: OwnedVoucherId) -> AppResult<OwnedVoucher> {
        let voucher = self.vouchers.mark_used(owned_voucher_id).await?;
        info!(voucher_id = %owned_voucher_id, "Voucher redeemed");
        Ok(voucher)
    }

    /// Resolve a redemption code against the caller's unused vouchers
    /// and compute the discount it yields on a subtotal (capped so the
    /// total never goes negative). Does not consume the voucher.
    pub async fn apply_code(
        &self,
        ctx: &RequestContext,
        code: &str,
        subtotal: Money,
    ) -> AppResult<(OwnedVoucher, Money)> {
        let voucher = self
            .vouchers
            .find_unused_by_code(&ctx.requester_id, code)
            .await?
            .ok_or_else(|| AppError::not_found(format!("No unused voucher with code {code}")))?;
        let discount = voucher.amount_off.min(subtotal);
        Ok((voucher, discount))
    }

    /// All vouchers the caller owns, newest first.
    pub async fn owned(&self, ctx: &RequestContext) -> AppResult<Vec<OwnedVoucher>> {
        self.vouchers.list_owned(&ctx.requester_id).await
    }
}
