//! Typed identifiers for all domain entities.
//!
//! Identifiers the core generates itself (bookings, waitlist entries,
//! owned vouchers, ledger entries) are newtypes around [`uuid::Uuid`].
//! Identifiers owned by external collaborators (the catalog and the
//! identity provider) are opaque strings the core never interprets, so
//! those get string newtypes instead. Distinct types prevent passing a
//! `FacilityId` where a `BookingId` is expected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to define a newtype ID wrapper around `Uuid`.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Create an identifier from an existing UUID.
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Return the inner UUID value.
            pub fn into_uuid(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }
    };
}

/// Macro to define a newtype around an opaque string identifier.
macro_rules! define_opaque_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Wrap an opaque identifier string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Return the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

define_id!(
    /// Unique identifier for a booking.
    BookingId
);

define_id!(
    /// Unique identifier for a waitlist entry.
    WaitlistEntryId
);

define_id!(
    /// Unique identifier for a voucher owned by a requester.
    OwnedVoucherId
);

define_id!(
    /// Unique identifier for a points ledger entry.
    LedgerEntryId
);

define_opaque_id!(
    /// Catalog identifier for a facility (court). Owned by the catalog.
    FacilityId
);

define_opaque_id!(
    /// Catalog identifier for a rentable equipment item.
    EquipmentId
);

define_opaque_id!(
    /// Catalog identifier for a purchasable voucher offer.
    VoucherId
);

define_opaque_id!(
    /// Opaque caller identity supplied by the identity provider.
    /// The core trusts it and never authenticates it.
    RequesterId
);

define_opaque_id!(
    /// Sport category tag, e.g. `"BADMINTON"`.
    SportTag
);

impl SportTag {
    /// Case-insensitive comparison, matching how the catalog tags sports.
    pub fn matches(&self, other: &SportTag) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}
