//! Catalog cache service.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use courtbook_core::error::AppError;
use courtbook_core::result::AppResult;
use courtbook_core::types::{EquipmentId, FacilityId, SportTag, VoucherId};
use courtbook_entity::catalog::{CatalogSnapshot, Equipment, Facility, VoucherOffer};
use courtbook_store::traits::CatalogSource;

/// Read-through cache over the external catalog.
///
/// The first access fetches a snapshot from the source; subsequent reads
/// serve the cached copy until [`CatalogService::refresh`] is called.
/// The core never mutates catalog data.
pub struct CatalogService {
    /// The external catalog reader.
    source: Arc<dyn CatalogSource>,
    /// The cached snapshot, absent until first access.
    snapshot: RwLock<Option<Arc<CatalogSnapshot>>>,
}

impl CatalogService {
    /// Creates a new catalog cache over a source.
    pub fn new(source: Arc<dyn CatalogSource>) -> Self {
        Self {
            source,
            snapshot: RwLock::new(None),
        }
    }

    /// The current snapshot, fetching it on first access.
    pub async fn snapshot(&self) -> AppResult<Arc<CatalogSnapshot>> {
        if let Some(snapshot) = self.snapshot.read().await.as_ref() {
            return Ok(Arc::clone(snapshot));
        }
        self.refresh().await
    }

    /// Drop the cached copy and fetch a fresh snapshot.
    pub async fn refresh(&self) -> AppResult<Arc<CatalogSnapshot>> {
        let fresh = Arc::new(self.source.fetch().await?);
        debug!(
            facilities = fresh.facilities.len(),
            equipment = fresh.equipment.len(),
            offers = fresh.voucher_offers.len(),
            "Catalog snapshot refreshed"
        );
        *self.snapshot.write().await = Some(Arc::clone(&fresh));
        Ok(fresh)
    }

    /// Look up a facility.
    pub async fn facility(&self, id: &FacilityId) -> AppResult<Facility> {
        self.snapshot()
            .await?
            .facilities
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Facility {id} not found")))
    }

    /// Look up an equipment item.
    pub async fn equipment(&self, id: &EquipmentId) -> AppResult<Equipment> {
        self.snapshot()
            .await?
            .equipment
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Equipment {id} not found")))
    }

    /// Look up a voucher offer.
    pub async fn offer(&self, id: &VoucherId) -> AppResult<VoucherOffer> {
        self.snapshot()
            .await?
            .voucher_offers
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Voucher offer {id} not found")))
    }

    /// Known sport tags, sorted.
    pub async fn sports(&self) -> AppResult<Vec<SportTag>> {
        let mut sports = self.snapshot().await?.sports.clone();
        sports.sort();
        Ok(sports)
    }

    /// Facilities serving a sport.
    pub async fn facilities_by_sport(&self, sport: &SportTag) -> AppResult<Vec<Facility>> {
        Ok(self
            .snapshot()
            .await?
            .facilities_by_sport(sport)
            .into_iter()
            .cloned()
            .collect())
    }
}
