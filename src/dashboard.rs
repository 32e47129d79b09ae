//! Owner dashboard state: the document queue and its summary stats.
//!
//! Documents and stats load concurrently. A status toggle is an explicit
//! two-phase update: apply locally, issue the write, roll back to the prior
//! snapshot if the write fails. Toggles are independent per document; the
//! board never serializes writes across different documents.

use chrono::NaiveDate;

use crate::api::client::ApiClient;
use crate::api::error::ApiError;
use crate::api::types::{DashboardStats, DocumentRecord, DocumentStatus};

pub struct DashboardData {
    pub board: DocumentBoard,
    pub stats: DashboardStats,
}

/// Fetch documents and stats for a shop concurrently.
pub async fn load(api: &ApiClient, shop_id: &str) -> Result<DashboardData, ApiError> {
    let (documents, stats) =
        tokio::try_join!(api.documents(shop_id), api.dashboard_stats(shop_id))?;
    Ok(DashboardData {
        board: DocumentBoard::new(documents),
        stats,
    })
}

/// The local view of the document queue.
pub struct DocumentBoard {
    documents: Vec<DocumentRecord>,
}

impl DocumentBoard {
    pub fn new(documents: Vec<DocumentRecord>) -> Self {
        Self { documents }
    }

    pub fn get(&self, document_id: &str) -> Option<&DocumentRecord> {
        self.documents.iter().find(|d| d.id == document_id)
    }

    /// Swap in a filtered result set (keyword/status search).
    pub fn replace(&mut self, documents: Vec<DocumentRecord>) {
        self.documents = documents;
    }

    /// Documents bucketed by upload day, newest day first. Within a day the
    /// backend's ordering is preserved.
    pub fn grouped_by_day(&self) -> Vec<(NaiveDate, Vec<&DocumentRecord>)> {
        let mut groups: Vec<(NaiveDate, Vec<&DocumentRecord>)> = Vec::new();
        for doc in &self.documents {
            let day = doc.upload_date.date_naive();
            match groups.iter_mut().find(|(d, _)| *d == day) {
                Some((_, bucket)) => bucket.push(doc),
                None => groups.push((day, vec![doc])),
            }
        }
        groups.sort_by(|a, b| b.0.cmp(&a.0));
        groups
    }

    fn set_status(&mut self, document_id: &str, status: DocumentStatus) {
        if let Some(doc) = self.documents.iter_mut().find(|d| d.id == document_id) {
            doc.status = status;
        }
    }

    /// Two-phase optimistic toggle. Returns the status the document ended
    /// up with. On a failed write the local state is exactly what it was
    /// before the call.
    pub async fn toggle_status(
        &mut self,
        api: &ApiClient,
        document_id: &str,
        notes: Option<String>,
    ) -> Result<DocumentStatus, ApiError> {
        let prior = self
            .get(document_id)
            .ok_or_else(|| ApiError::Transport {
                message: "Failed to update status".to_string(),
            })?
            .status;
        let next = prior.toggled();

        self.set_status(document_id, next);
        match api
            .update_document_status(document_id, next, notes)
            .await
        {
            Ok(()) => Ok(next),
            Err(e) => {
                self.set_status(document_id, prior);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionStore;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn doc(id: &str, day: u32, status: DocumentStatus) -> DocumentRecord {
        DocumentRecord {
            id: id.to_string(),
            file_name: format!("{id}.pdf"),
            original_file_name: None,
            customer_name: "Maya".to_string(),
            file_size: "2.0 MB".to_string(),
            upload_date: Utc.with_ymd_and_hms(2026, 3, day, 9, 30, 0).unwrap(),
            status,
            purpose: None,
            notes: None,
        }
    }

    fn api(base: &str) -> (TempDir, ApiClient) {
        let tmp = TempDir::new().unwrap();
        let store = SessionStore::new(tmp.path());
        (tmp, ApiClient::new(base, store).unwrap())
    }

    #[test]
    fn groups_by_day_newest_first() {
        let board = DocumentBoard::new(vec![
            doc("a", 12, DocumentStatus::Pending),
            doc("b", 14, DocumentStatus::Pending),
            doc("c", 12, DocumentStatus::Completed),
        ]);
        let groups = board.grouped_by_day();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, NaiveDate::from_ymd_opt(2026, 3, 14).unwrap());
        assert_eq!(groups[0].1.len(), 1);
        assert_eq!(groups[1].1.len(), 2);
        assert_eq!(groups[1].1[0].id, "a");
    }

    #[tokio::test]
    async fn successful_toggle_applies_locally() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/documents/a/status"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"message": "ok"})),
            )
            .mount(&server)
            .await;

        let (_tmp, api) = api(&server.uri());
        let mut board = DocumentBoard::new(vec![doc("a", 12, DocumentStatus::Pending)]);
        let ended = board.toggle_status(&api, "a", None).await.unwrap();

        assert_eq!(ended, DocumentStatus::Completed);
        assert_eq!(board.get("a").unwrap().status, DocumentStatus::Completed);
    }

    #[tokio::test]
    async fn failed_toggle_rolls_back_the_snapshot() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/documents/a/status"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let (_tmp, api) = api(&server.uri());
        let mut board = DocumentBoard::new(vec![
            doc("a", 12, DocumentStatus::Pending),
            doc("b", 12, DocumentStatus::Completed),
        ]);
        let err = board.toggle_status(&api, "a", None).await.unwrap_err();

        assert_eq!(err.message(), "Failed to update status");
        // Rolled back, and the neighbor was never touched.
        assert_eq!(board.get("a").unwrap().status, DocumentStatus::Pending);
        assert_eq!(board.get("b").unwrap().status, DocumentStatus::Completed);
    }

    #[tokio::test]
    async fn toggles_on_different_documents_are_independent() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"message": "ok"})),
            )
            .mount(&server)
            .await;

        let (_tmp, api) = api(&server.uri());
        let mut board = DocumentBoard::new(vec![
            doc("a", 12, DocumentStatus::Pending),
            doc("b", 12, DocumentStatus::Pending),
        ]);
        board.toggle_status(&api, "a", None).await.unwrap();
        board.toggle_status(&api, "b", None).await.unwrap();

        assert_eq!(board.get("a").unwrap().status, DocumentStatus::Completed);
        assert_eq!(board.get("b").unwrap().status, DocumentStatus::Completed);
    }

    #[tokio::test]
    async fn unknown_document_is_an_error_without_side_effects() {
        let (_tmp, api) = api("http://127.0.0.1:1");
        let mut board = DocumentBoard::new(vec![doc("a", 12, DocumentStatus::Pending)]);
        assert!(board.toggle_status(&api, "ghost", None).await.is_err());
        assert_eq!(board.get("a").unwrap().status, DocumentStatus::Pending);
    }
}
