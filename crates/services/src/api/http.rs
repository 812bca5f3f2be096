use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use exam_core::SubmissionTicket;
use exam_core::model::{ResultRecord, Test, TestId, TestListing, TestResult};

use super::dto::{
    Envelope, ErrorBody, ResultDto, ResultRecordDto, StartDto, TestDto, TestListingDto,
};
use super::{ApiConfig, AttemptStart, TestApi};
use crate::error::ApiError;

/// `TestApi` over HTTP + JSON.
#[derive(Clone)]
pub struct HttpTestApi {
    client: Client,
    config: ApiConfig,
}

impl HttpTestApi {
    /// # Errors
    ///
    /// Returns `ApiError::Network` if the HTTP client cannot be built.
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    /// # Errors
    ///
    /// Returns `ApiError::Network` if the HTTP client cannot be built.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::new(ApiConfig::from_env())
    }

    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.config.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn get(&self, segments: &[&str]) -> Result<RequestBuilder, ApiError> {
        Ok(self.authorized(self.client.get(self.config.endpoint(segments)?)))
    }

    fn post(&self, segments: &[&str]) -> Result<RequestBuilder, ApiError> {
        Ok(self.authorized(self.client.post(self.config.endpoint(segments)?)))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status, response).await);
        }
        let envelope: Envelope<T> = response.json().await?;
        envelope.into_data()
    }
}

async fn status_error(status: StatusCode, response: Response) -> ApiError {
    if status == StatusCode::NOT_FOUND {
        return ApiError::NotFound;
    }
    // Error bodies are best effort; an unreadable one still yields the status.
    let body: ErrorBody = response.json().await.unwrap_or_default();
    ApiError::Status {
        code: status.as_u16(),
        message: body
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string()),
    }
}

#[async_trait]
impl TestApi for HttpTestApi {
    async fn fetch_test(&self, id: &TestId) -> Result<Test, ApiError> {
        let dto: TestDto = self.send(self.get(&["tests", id.as_str()])?).await?;
        dto.into_test(id)
    }

    async fn start_attempt(&self, id: &TestId) -> Result<AttemptStart, ApiError> {
        let dto: StartDto = self
            .send(self.post(&["tests", id.as_str(), "start"])?)
            .await?;
        Ok(AttemptStart {
            started_at: dto.started_at,
        })
    }

    async fn submit_attempt(&self, ticket: &SubmissionTicket) -> Result<TestResult, ApiError> {
        let request = self
            .post(&["tests", ticket.test_id.as_str(), "submit"])?
            .json(ticket);
        let dto: ResultDto = self.send(request).await?;
        dto.into_result()
    }

    async fn list_tests(&self) -> Result<Vec<TestListing>, ApiError> {
        let dtos: Vec<TestListingDto> = self.send(self.get(&["tests"])?).await?;
        dtos.into_iter().map(TestListingDto::into_listing).collect()
    }

    async fn list_results(&self) -> Result<Vec<ResultRecord>, ApiError> {
        let dtos: Vec<ResultRecordDto> = self.send(self.get(&["results"])?).await?;
        dtos.into_iter().map(ResultRecordDto::into_record).collect()
    }
}
