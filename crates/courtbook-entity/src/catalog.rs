//! Catalog entities: facilities, equipment, sports, and voucher offers.
//!
//! The catalog is administered outside the core. The core only reads
//! these records (for pricing and validity checks) and never mutates
//! them; bookings reference facilities by id, never by embedding.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use courtbook_core::types::{EquipmentId, FacilityId, Money, SportTag, VoucherId};

/// A bookable facility (court).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Facility {
    /// Catalog identifier.
    pub id: FacilityId,
    /// Display name, e.g. `"Badminton Court A"`.
    pub name: String,
    /// Sport this facility serves.
    pub sport: SportTag,
    /// Price of one hourly slot.
    pub hourly_rate: Money,
}

/// A rentable equipment item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Equipment {
    /// Catalog identifier.
    pub id: EquipmentId,
    /// Sport the item belongs to.
    pub sport: SportTag,
    /// Display label, e.g. `"Racquet"`.
    pub label: String,
    /// Units available.
    pub stock: u32,
    /// Rental price per unit per booking.
    pub rental_rate: Money,
}

/// A voucher offer in the catalog: a fixed discount purchasable with points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoucherOffer {
    /// Catalog identifier.
    pub id: VoucherId,
    /// Face-value discount applied at checkout.
    pub amount_off: Money,
    /// Points debited on purchase.
    pub cost_points: i64,
    /// Whether the offer is currently purchasable.
    pub active: bool,
}

/// A read-only snapshot of the catalog, keyed by opaque ids.
///
/// Refreshed on demand by the catalog cache; consumed by the booking
/// logic for pricing and validity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    /// All facilities by id.
    pub facilities: BTreeMap<FacilityId, Facility>,
    /// All equipment by id.
    pub equipment: BTreeMap<EquipmentId, Equipment>,
    /// Known sport tags.
    pub sports: Vec<SportTag>,
    /// All voucher offers by id.
    pub voucher_offers: BTreeMap<VoucherId, VoucherOffer>,
}

impl CatalogSnapshot {
    /// Facilities serving the given sport.
    pub fn facilities_by_sport(&self, sport: &SportTag) -> Vec<&Facility> {
        self.facilities
            .values()
            .filter(|f| f.sport.matches(sport))
            .collect()
    }
}
