//! HTTP record source
//!
//! Talks to the platform backend over its admin REST surface. Every
//! request carries the bearer credential read from the session context
//! at call time; a 401 marks the session expired so watchers can send
//! the operator back through sign-in. No retries, and no client-side
//! timeout: timeout policy is the transport's business.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, info};

use super::error::ApiError;
use super::traits::{ActivityQuery, RecordSource};
use crate::records::{
    ActivityLog, ActivityStats, LeaderboardEntry, ProgressSummary, Snapshot, Student,
};
use crate::session::SessionContext;

/// Shape of a backend error body, `{"message": "..."}`
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Envelope the leaderboard endpoint wraps its rows in
#[derive(Debug, Deserialize)]
struct LeaderboardEnvelope {
    success: bool,
    #[serde(default)]
    data: Vec<LeaderboardEntry>,
    #[serde(default)]
    message: Option<String>,
}

pub struct HttpRecordSource {
    client: reqwest::Client,
    base_url: String,
    session: Arc<SessionContext>,
}

impl HttpRecordSource {
    pub fn new(base_url: impl Into<String>, session: Arc<SessionContext>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
            session,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Credential for the next request; fails locally when the session
    /// has none, before any network I/O
    async fn bearer(&self) -> Result<String, ApiError> {
        self.session
            .bearer_token()
            .await
            .ok_or(ApiError::Unauthorized { message: None })
    }

    /// Map a non-success response to the error taxonomy, pulling the
    /// server's `message` out of the body when it sent one
    async fn check(&self, resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let message = resp
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message);

        if status == StatusCode::UNAUTHORIZED {
            self.session.mark_expired().await;
            return Err(ApiError::Unauthorized { message });
        }
        Err(ApiError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let token = self.bearer().await?;
        let resp = self
            .client
            .get(self.endpoint(path))
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;
        let resp = self.check(resp).await?;
        Ok(resp.json::<T>().await?)
    }

    async fn post_json(
        &self,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<(), ApiError> {
        let token = self.bearer().await?;
        let mut req = self.client.post(self.endpoint(path)).bearer_auth(token);
        if let Some(body) = body {
            req = req.json(&body);
        }
        let resp = req.send().await?;
        self.check(resp).await?;
        Ok(())
    }
}

#[async_trait]
impl RecordSource for HttpRecordSource {
    async fn list_students(&self) -> Result<Snapshot<Vec<Student>>, ApiError> {
        let students: Vec<Student> = self.get_json("/api/auth/admin/all-students", &[]).await?;
        debug!(count = students.len(), "Fetched student records");
        Ok(Snapshot::new(students))
    }

    async fn approve_student(&self, student_id: &str) -> Result<(), ApiError> {
        self.post_json(&format!("/api/auth/admin/approve/{}", student_id), None)
            .await?;
        info!(student_id, "Student approved");
        Ok(())
    }

    async fn reject_student(&self, student_id: &str, reason: Option<&str>) -> Result<(), ApiError> {
        // The backend tolerates an empty body here; send {} when there
        // is no reason rather than omitting the payload entirely.
        let body = match reason {
            Some(reason) => serde_json::json!({ "reason": reason }),
            None => serde_json::json!({}),
        };
        self.post_json(&format!("/api/auth/admin/reject/{}", student_id), Some(body))
            .await?;
        info!(student_id, "Student rejected");
        Ok(())
    }

    async fn bulk_approve(&self, student_ids: &[String]) -> Result<(), ApiError> {
        self.post_json(
            "/api/auth/admin/bulk-approve",
            Some(serde_json::json!({ "userIds": student_ids })),
        )
        .await?;
        info!(count = student_ids.len(), "Bulk approval applied");
        Ok(())
    }

    async fn list_activity(
        &self,
        query: &ActivityQuery,
    ) -> Result<Snapshot<Vec<ActivityLog>>, ApiError> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(kind) = &query.kind {
            params.push(("type", kind.as_str().to_string()));
        }
        if let Some(user_id) = &query.user_id {
            params.push(("userId", user_id.clone()));
        }
        if let Some(limit) = query.limit {
            params.push(("limit", limit.to_string()));
        }

        let logs: Vec<ActivityLog> = self.get_json("/api/admin/activities", &params).await?;
        debug!(count = logs.len(), "Fetched activity logs");
        Ok(Snapshot::new(logs))
    }

    async fn activity_stats(&self) -> Result<Snapshot<ActivityStats>, ApiError> {
        let stats: ActivityStats = self.get_json("/api/admin/activity-stats", &[]).await?;
        debug!(total = stats.total, "Fetched activity stats");
        Ok(Snapshot::new(stats))
    }

    async fn leaderboard(&self, limit: u32) -> Result<Snapshot<Vec<LeaderboardEntry>>, ApiError> {
        let envelope: LeaderboardEnvelope = self
            .get_json("/api/admin/leaderboard", &[("limit", limit.to_string())])
            .await?;

        // The endpoint can answer 200 with success=false; that is still
        // a rejected request carrying the envelope's message.
        if !envelope.success {
            return Err(ApiError::Rejected {
                status: 200,
                message: envelope.message,
            });
        }
        debug!(count = envelope.data.len(), "Fetched leaderboard");
        Ok(Snapshot::new(envelope.data))
    }

    async fn progress_summaries(&self) -> Result<Snapshot<Vec<ProgressSummary>>, ApiError> {
        let summaries: Vec<ProgressSummary> =
            self.get_json("/api/admin/progress/students", &[]).await?;
        debug!(count = summaries.len(), "Fetched progress summaries");
        Ok(Snapshot::new(summaries))
    }
}
