//! Booking price computation.
//!
//! Subtotal = slot count x hourly rate + equipment line items. A voucher
//! discount is capped at the subtotal so the total never goes negative.
//! Points earned are the floor of the final paid amount in whole
//! currency units (1 point per whole unit).

use courtbook_core::types::Money;
use courtbook_entity::booking::EquipmentLine;

/// The priced breakdown of a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    /// Slot count x hourly rate.
    pub court_subtotal: Money,
    /// Sum of equipment lines.
    pub equipment_subtotal: Money,
    /// Discount actually applied (capped at the subtotal).
    pub discount: Money,
    /// Final paid amount.
    pub total: Money,
    /// Points credited for this booking.
    pub points_earned: i64,
}

/// Price a booking.
pub fn quote(
    hourly_rate: Money,
    hours: usize,
    equipment: &[EquipmentLine],
    voucher_amount: Option<Money>,
) -> Quote {
    let court_subtotal = hourly_rate * hours as i64;
    let equipment_subtotal: Money = equipment.iter().map(EquipmentLine::subtotal).sum();
    let subtotal = court_subtotal + equipment_subtotal;

    let discount = voucher_amount.unwrap_or(Money::ZERO).min(subtotal);
    let total = subtotal.saturating_sub(discount);

    Quote {
        court_subtotal,
        equipment_subtotal,
        discount,
        total,
        points_earned: total.whole_units(),
    }
}
