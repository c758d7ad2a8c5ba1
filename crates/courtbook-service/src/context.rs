//! Request context carrying the caller identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use courtbook_core::types::RequesterId;

/// Context for the current request.
///
/// The identity provider hands the core an opaque requester id per call;
/// the core trusts it and only compares it against record ownership.
/// The admin flag gates the cancellation-approval operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The opaque caller identity.
    pub requester_id: RequesterId,
    /// Whether the caller holds the admin role.
    pub admin: bool,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Context for a regular requester.
    pub fn new(requester_id: impl Into<RequesterId>) -> Self {
        Self {
            requester_id: requester_id.into(),
            admin: false,
            request_time: Utc::now(),
        }
    }

    /// Context for an admin caller.
    pub fn admin(requester_id: impl Into<RequesterId>) -> Self {
        Self {
            requester_id: requester_id.into(),
            admin: true,
            request_time: Utc::now(),
        }
    }

    /// Returns whether the caller is an admin.
    pub fn is_admin(&self) -> bool {
        self.admin
    }
}
