use reqwest::Method;
use serde::Serialize;

use super::{ApiClient, ApiError};
use crate::domain::types::{ApprovalResult, ExportPayload, QueueEntry};

#[derive(Serialize)]
struct NoteRequest<'a> {
    note: Option<&'a str>,
}

impl ApiClient {
    pub async fn list_queue(&self) -> Result<Vec<QueueEntry>, ApiError> {
        self.get_json("/api/queue").await
    }

    pub async fn approve_queue(&self, id: i64, note: Option<&str>) -> Result<ApprovalResult, ApiError> {
        self.send_json(
            self.request(Method::POST, &format!("/api/queue/{id}/approve"))
                .json(&NoteRequest { note }),
        )
        .await
    }

    pub async fn reject_queue(&self, id: i64, note: Option<&str>) -> Result<ApprovalResult, ApiError> {
        self.send_json(
            self.request(Method::POST, &format!("/api/queue/{id}/reject"))
                .json(&NoteRequest { note }),
        )
        .await
    }

    pub async fn export_queue(&self, id: i64) -> Result<ExportPayload, ApiError> {
        self.get_json(&format!("/api/queue/export/{id}")).await
    }
}
