//! Wire records for the drop-off backend.
//!
//! The backend wraps list/detail payloads in a `data` envelope; auth
//! responses are flat. Document ids come back as Mongo-style `_id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Auth ─────────────────────────────────────────────────────────

/// The authenticated shop owner, as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    pub email: String,
    pub shop_id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// `POST /auth/login` and `POST /auth/register` response.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub user: UserIdentity,
    pub token: String,
}

/// `GET /auth/me` response.
#[derive(Debug, Clone, Deserialize)]
pub struct MeResponse {
    pub user: UserIdentity,
}

/// Registration form for a new shop owner account.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub shop_name: String,
}

// ── Documents ────────────────────────────────────────────────────

/// The two statuses a document can hold. The client only ever toggles
/// between them; it never invents a third state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    Pending,
    Completed,
}

impl DocumentStatus {
    pub fn toggled(self) -> Self {
        match self {
            Self::Pending => Self::Completed,
            Self::Completed => Self::Pending,
        }
    }

    /// Label shown in the dashboard list ("Printed" matches the shop's
    /// wording for a completed job).
    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Completed => "Printed",
        }
    }

    /// Wire value, as used in query strings and request bodies.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

/// A customer drop-off, read-only from the client's perspective apart from
/// explicit status updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub file_name: String,
    #[serde(default)]
    pub original_file_name: Option<String>,
    pub customer_name: String,
    /// Pre-formatted by the backend ("2.4 MB").
    pub file_size: String,
    pub upload_date: DateTime<Utc>,
    pub status: DocumentStatus,
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentListResponse {
    pub data: Vec<DocumentRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentResponse {
    pub data: DocumentRecord,
}

/// Body for `PUT /documents/{id}/status`.
#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdate {
    pub status: DocumentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// `POST /documents/upload` acknowledgement. Callers mostly ignore it.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct UploadReceipt {
    pub message: Option<String>,
    pub data: Option<DocumentRecord>,
}

/// `GET /documents/{id}/download` hands back a short-lived URL.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadTicket {
    pub download_url: String,
}

// ── Stats ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_documents: u64,
    pub completed_documents: u64,
    pub pending_documents: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatsResponse {
    pub data: StatsPayload,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatsPayload {
    pub stats: DashboardStats,
}

// ── Shops ────────────────────────────────────────────────────────

/// A shop, resolved by internal id or by its human-shareable code.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopRecord {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    pub shop_code: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShopResponse {
    pub data: ShopRecord,
}
