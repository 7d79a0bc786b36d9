pub mod dto;

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::error::FetchError;
use crate::models::{AssignmentDraft, DashboardFilters, SemesterItem, Subject, User};
use crate::utils::config::ClientConfig;
use dto::{CalendarPayload, DashboardPayload};

const USER_HEADER: &str = "X-USER-ID";

/// HTTP surface of the collaborator (allows mocking in tests).
///
/// Mutation calls return `()` even where the server echoes the changed row;
/// the synchronizer reloads the whole dashboard after every mutation, so the
/// reload is the single source of truth and echo bodies are discarded.
#[async_trait]
pub trait ApiGateway: Send + Sync {
    /// Resolve or create the user for a name.
    async fn resolve_user(&self, user_name: &str) -> Result<User, FetchError>;

    async fn create_semester(&self, user_id: i64, sem_name: &str)
        -> Result<SemesterItem, FetchError>;

    async fn delete_semester(&self, sem_id: i64) -> Result<(), FetchError>;

    /// Dashboard for one semester, narrowed by the filter state.
    async fn fetch_dashboard(
        &self,
        user_id: i64,
        sem_id: i64,
        filters: &DashboardFilters,
    ) -> Result<DashboardPayload, FetchError>;

    async fn create_subject(&self, sem_id: i64, sub_name: &str) -> Result<Subject, FetchError>;

    async fn delete_subject(&self, sub_id: i64) -> Result<(), FetchError>;

    async fn create_assignment(&self, sub_id: i64, draft: &AssignmentDraft)
        -> Result<(), FetchError>;

    async fn update_assignment(
        &self,
        assign_id: i64,
        draft: &AssignmentDraft,
    ) -> Result<(), FetchError>;

    async fn delete_assignment(&self, assign_id: i64) -> Result<(), FetchError>;

    async fn set_complete(&self, assign_id: i64, complete: bool) -> Result<(), FetchError>;

    async fn fetch_calendar(&self, sem_id: i64) -> Result<CalendarPayload, FetchError>;
}

/// Production gateway talking to the collaborator over HTTP.
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            base_url: config.api_base.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, FetchError> {
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(FetchError::from_status(status.as_u16(), &text));
        }
        serde_json::from_str(&text).map_err(|e| FetchError::Decode(e.to_string()))
    }

    async fn expect_ok(response: reqwest::Response) -> Result<(), FetchError> {
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(FetchError::from_status(status.as_u16(), &text));
        }
        Ok(())
    }
}

#[async_trait]
impl ApiGateway for ApiClient {
    async fn resolve_user(&self, user_name: &str) -> Result<User, FetchError> {
        let response = self
            .client
            .post(self.url("/user"))
            .json(&dto::UserReq { user_name })
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn create_semester(
        &self,
        user_id: i64,
        sem_name: &str,
    ) -> Result<SemesterItem, FetchError> {
        let response = self
            .client
            .post(self.url("/semester"))
            .header(USER_HEADER, user_id)
            .json(&dto::SemesterReq { sem_name })
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn delete_semester(&self, sem_id: i64) -> Result<(), FetchError> {
        let response = self
            .client
            .delete(self.url(&format!("/semester/{sem_id}")))
            .send()
            .await?;
        Self::expect_ok(response).await
    }

    async fn fetch_dashboard(
        &self,
        user_id: i64,
        sem_id: i64,
        filters: &DashboardFilters,
    ) -> Result<DashboardPayload, FetchError> {
        let mut url = self.url(&format!("/semester/{sem_id}/dashboard"));
        let query = filters.to_query();
        if !query.is_empty() {
            url = format!("{url}?{query}");
        }
        let response = self
            .client
            .get(url)
            .header(USER_HEADER, user_id)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn create_subject(&self, sem_id: i64, sub_name: &str) -> Result<Subject, FetchError> {
        let response = self
            .client
            .post(self.url(&format!("/subject/{sem_id}")))
            .json(&dto::SubjectReq { sub_name })
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn delete_subject(&self, sub_id: i64) -> Result<(), FetchError> {
        let response = self
            .client
            .delete(self.url(&format!("/subject/{sub_id}")))
            .send()
            .await?;
        Self::expect_ok(response).await
    }

    async fn create_assignment(
        &self,
        sub_id: i64,
        draft: &AssignmentDraft,
    ) -> Result<(), FetchError> {
        let response = self
            .client
            .post(self.url(&format!("/assignment/subject/{sub_id}")))
            .json(&dto::AssignmentReq {
                assign_name: &draft.assign_name,
                due_date: &draft.due_date,
                category: draft.category,
                sub_id: Some(sub_id),
            })
            .send()
            .await?;
        Self::expect_ok(response).await
    }

    async fn update_assignment(
        &self,
        assign_id: i64,
        draft: &AssignmentDraft,
    ) -> Result<(), FetchError> {
        let response = self
            .client
            .patch(self.url(&format!("/assignment/{assign_id}")))
            .json(&dto::AssignmentReq {
                assign_name: &draft.assign_name,
                due_date: &draft.due_date,
                category: draft.category,
                sub_id: draft.sub_id,
            })
            .send()
            .await?;
        Self::expect_ok(response).await
    }

    async fn delete_assignment(&self, assign_id: i64) -> Result<(), FetchError> {
        let response = self
            .client
            .delete(self.url(&format!("/assignment/{assign_id}")))
            .send()
            .await?;
        Self::expect_ok(response).await
    }

    async fn set_complete(&self, assign_id: i64, complete: bool) -> Result<(), FetchError> {
        let body = dto::CompleteReq {
            is_complete: if complete { 1 } else { 0 },
        };
        let response = self
            .client
            .patch(self.url(&format!("/assignment/{assign_id}/complete")))
            .json(&body)
            .send()
            .await?;
        Self::expect_ok(response).await
    }

    async fn fetch_calendar(&self, sem_id: i64) -> Result<CalendarPayload, FetchError> {
        let response = self
            .client
            .get(self.url(&format!("/semester/{sem_id}/calendar")))
            .send()
            .await?;
        Self::decode(response).await
    }
}
