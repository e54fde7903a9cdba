use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::variables::Variables;

/// Lifecycle of a generated document, persisted as a lowercase string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Draft,
    Generated,
    Sent,
    Signed,
    Cancelled,
}

/// Allowed forward moves. Cancelling is handled separately: any
/// non-cancelled state may be cancelled.
const TRANSITIONS: &[(DocumentStatus, DocumentStatus)] = &[
    (DocumentStatus::Draft, DocumentStatus::Generated),
    (DocumentStatus::Draft, DocumentStatus::Sent),
    (DocumentStatus::Generated, DocumentStatus::Sent),
    (DocumentStatus::Sent, DocumentStatus::Signed),
];

impl DocumentStatus {
    pub const ALL: [DocumentStatus; 5] = [
        Self::Draft,
        Self::Generated,
        Self::Sent,
        Self::Signed,
        Self::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Generated => "generated",
            Self::Sent => "sent",
            Self::Signed => "signed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Re-writing the current status is allowed so late external references
    /// can still be attached.
    pub fn can_transition_to(&self, next: DocumentStatus) -> bool {
        if *self == next {
            return true;
        }
        if next == Self::Cancelled {
            return true;
        }
        TRANSITIONS.contains(&(*self, next))
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown document status '{s}'"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GeneratedDocument {
    pub id: Uuid,
    pub template_id: Uuid,
    pub rental_id: Option<String>,
    #[schema(example = "TERMO-2025-1718000000000")]
    pub document_number: String,
    /// Snapshot of the variable bag at generation time.
    #[schema(value_type = Object)]
    pub resolved_data: Variables,
    pub rendered_url: Option<String>,
    pub status: DocumentStatus,
    pub external_signature_ref: Option<String>,
    pub signed_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    pub scope_id: String,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewGeneratedDocument {
    pub template_id: Uuid,
    pub rental_id: Option<String>,
    pub document_number: String,
    pub resolved_data: Variables,
    pub status: DocumentStatus,
    pub expires_at: DateTime<Utc>,
    pub scope_id: String,
    pub created_by: Option<String>,
}

/// Extra fields merged in by a status update; `None` leaves a field as is.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct StatusPatch {
    pub external_signature_ref: Option<String>,
    pub rendered_url: Option<String>,
    pub signed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct GenerateDocumentRequest {
    pub template_id: Uuid,
    #[schema(value_type = Object)]
    pub variables: Variables,
    #[schema(example = "franchise-salvador-01")]
    pub scope_id: String,
    #[schema(example = "42")]
    pub rental_id: Option<String>,
    pub created_by: Option<String>,
    /// Overrides the template's number prefix.
    pub number_prefix: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: DocumentStatus,
    #[serde(flatten)]
    pub patch: StatusPatch,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct DocumentListQuery {
    /// Tenant/franchise the documents belong to.
    pub scope_id: String,
}
