//! HTTP gateway to the drop-off backend.
//!
//! Every backend call in the client goes through this one adapter. Each
//! request runs a fixed pipeline: attach the current persisted credential,
//! send, normalize the outcome. Callers get typed payloads on success and an
//! [`ApiError`] with a displayable message on failure, never a raw
//! transport error.

use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Body, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio_util::io::ReaderStream;

use crate::api::error::ApiError;
use crate::api::progress::{ProgressFn, ProgressStream};
use crate::api::types::{
    AuthResponse, DashboardStats, DocumentListResponse, DocumentRecord, DocumentResponse,
    DocumentStatus, DownloadTicket, MeResponse, Registration, ShopRecord, ShopResponse,
    StatsResponse, StatusUpdate, UploadReceipt,
};
use crate::session::SessionStore;
use crate::util::DocumentKind;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Fields of the customer upload form, minus the file bytes themselves.
#[derive(Debug, Clone)]
pub struct UploadRequest<'a> {
    pub file: &'a Path,
    pub customer_name: &'a str,
    pub purpose: &'a str,
    pub shop_id: &'a str,
}

/// Shape of backend failure bodies. Anything else falls back to the fixed
/// per-operation message.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    store: SessionStore,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, store: SessionStore) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
            store,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    // ── Request pipeline ─────────────────────────────────────────

    /// Attach-credential step: the persisted token is read live on every
    /// request, so a freshly cleared or replaced session takes effect
    /// immediately.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.store.credential() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send + normalize-error step.
    async fn dispatch(
        &self,
        request: RequestBuilder,
        fallback: &'static str,
    ) -> Result<Response, ApiError> {
        let response = self.authorize(request).send().await.map_err(|e| {
            tracing::warn!("transport failure: {e}");
            ApiError::Transport {
                message: fallback.to_string(),
            }
        })?;
        normalize(response, fallback).await
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        fallback: &'static str,
    ) -> Result<T, ApiError> {
        let response = self.dispatch(request, fallback).await?;
        response.json().await.map_err(|e| {
            tracing::warn!("malformed response body: {e}");
            ApiError::Transport {
                message: fallback.to_string(),
            }
        })
    }

    // ── Authentication ───────────────────────────────────────────

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let body = serde_json::json!({ "email": email, "password": password });
        let request = self.http.post(self.url("/auth/login")).json(&body);
        self.fetch(request, "Login failed").await
    }

    pub async fn register(&self, registration: &Registration) -> Result<AuthResponse, ApiError> {
        let request = self.http.post(self.url("/auth/register")).json(registration);
        self.fetch(request, "Registration failed").await
    }

    pub async fn me(&self) -> Result<MeResponse, ApiError> {
        let request = self.http.get(self.url("/auth/me"));
        self.fetch(request, "Failed to get user info").await
    }

    // ── Documents ────────────────────────────────────────────────

    /// Upload a customer document. `progress` receives whole percentages,
    /// non-decreasing, ending at 100 on success.
    pub async fn upload_document(
        &self,
        upload: UploadRequest<'_>,
        progress: Option<ProgressFn>,
    ) -> Result<UploadReceipt, ApiError> {
        let part = file_part(upload.file, progress).await?;
        let form = Form::new()
            .text("customerName", upload.customer_name.to_string())
            .text("purpose", upload.purpose.to_string())
            .text("shopId", upload.shop_id.to_string())
            .part("file", part);

        let request = self.http.post(self.url("/documents/upload")).multipart(form);
        self.fetch(request, "Upload failed").await
    }

    pub async fn documents(&self, shop_id: &str) -> Result<Vec<DocumentRecord>, ApiError> {
        let request = self.http.get(self.url(&format!("/documents/{shop_id}")));
        let list: DocumentListResponse =
            self.fetch(request, "Failed to fetch documents").await?;
        Ok(list.data)
    }

    pub async fn document(&self, document_id: &str) -> Result<DocumentRecord, ApiError> {
        let request = self
            .http
            .get(self.url(&format!("/documents/single/{document_id}")));
        let doc: DocumentResponse = self.fetch(request, "Failed to fetch document").await?;
        Ok(doc.data)
    }

    pub async fn update_document_status(
        &self,
        document_id: &str,
        status: DocumentStatus,
        notes: Option<String>,
    ) -> Result<(), ApiError> {
        let body = StatusUpdate { status, notes };
        let request = self
            .http
            .put(self.url(&format!("/documents/{document_id}/status")))
            .json(&body);
        self.dispatch(request, "Failed to update status").await?;
        Ok(())
    }

    pub async fn delete_document(&self, document_id: &str) -> Result<(), ApiError> {
        let request = self
            .http
            .delete(self.url(&format!("/documents/{document_id}")));
        self.dispatch(request, "Failed to delete document").await?;
        Ok(())
    }

    pub async fn download_document(&self, document_id: &str) -> Result<DownloadTicket, ApiError> {
        let request = self
            .http
            .get(self.url(&format!("/documents/{document_id}/download")));
        self.fetch(request, "Download failed").await
    }

    pub async fn dashboard_stats(&self, shop_id: &str) -> Result<DashboardStats, ApiError> {
        let request = self
            .http
            .get(self.url(&format!("/documents/{shop_id}/stats")));
        let stats: StatsResponse = self.fetch(request, "Failed to fetch stats").await?;
        Ok(stats.data.stats)
    }

    /// Keyword/status search. A `None` status means "all" and is omitted
    /// from the query string entirely.
    pub async fn search_documents(
        &self,
        shop_id: &str,
        query: Option<&str>,
        status: Option<DocumentStatus>,
    ) -> Result<Vec<DocumentRecord>, ApiError> {
        let mut params: Vec<(&str, &str)> = Vec::new();
        if let Some(q) = query.filter(|q| !q.is_empty()) {
            params.push(("query", q));
        }
        if let Some(s) = status {
            params.push(("status", s.as_str()));
        }
        let request = self
            .http
            .get(self.url(&format!("/documents/search/{shop_id}")))
            .query(&params);
        let list: DocumentListResponse = self.fetch(request, "Search failed").await?;
        Ok(list.data)
    }

    // ── Shops ────────────────────────────────────────────────────

    pub async fn shop_by_code(&self, shop_code: &str) -> Result<ShopRecord, ApiError> {
        let request = self.http.get(self.url(&format!("/shops/code/{shop_code}")));
        let shop: ShopResponse = self.fetch(request, "Shop not found").await?;
        Ok(shop.data)
    }

    pub async fn shop(&self, shop_id: &str) -> Result<ShopRecord, ApiError> {
        let request = self.http.get(self.url(&format!("/shops/{shop_id}")));
        let shop: ShopResponse = self.fetch(request, "Failed to fetch shop").await?;
        Ok(shop.data)
    }
}

/// Turn an HTTP response into either itself (success) or a normalized error.
async fn normalize(response: Response, fallback: &'static str) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .text()
        .await
        .ok()
        .and_then(|body| serde_json::from_str::<ErrorBody>(&body).ok())
        .and_then(|body| body.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| fallback.to_string());
    tracing::debug!(%status, "backend rejected request: {message}");
    Err(ApiError::Rejected { status, message })
}

/// Build the multipart file part, wrapping the byte stream in a progress
/// counter when a callback was supplied.
async fn file_part(path: &Path, progress: Option<ProgressFn>) -> Result<Part, ApiError> {
    let upload_failed = || ApiError::Transport {
        message: "Upload failed".to_string(),
    };

    let file = tokio::fs::File::open(path).await.map_err(|e| {
        tracing::warn!("cannot open upload file {}: {e}", path.display());
        upload_failed()
    })?;
    let total = file
        .metadata()
        .await
        .map_err(|e| {
            tracing::warn!("cannot stat upload file: {e}");
            upload_failed()
        })?
        .len();

    let reader = ReaderStream::new(file);
    let body = match progress {
        Some(report) => Body::wrap_stream(ProgressStream::new(reader, total, report)),
        None => Body::wrap_stream(reader),
    };

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let mut part = Part::stream_with_length(body, total).file_name(file_name);
    if let Some(kind) = DocumentKind::from_path(path) {
        part = part.mime_str(kind.mime()).map_err(|e| {
            tracing::warn!("invalid mime: {e}");
            upload_failed()
        })?;
    }
    Ok(part)
}
