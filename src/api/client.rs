use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT},
    RequestBuilder, StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

use super::{ClientError, Endpoint};
use crate::config::TargetConfig;
use crate::domain::{DiagnosticTest, PatientSearch};

pub const SUBSCRIPTION_KEY_HEADER: &str = "ocp-apim-subscription-key";

/// Raw response of one operation. Classification happens in the task.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub endpoint: Endpoint,
    pub status: StatusCode,
    pub body: String,
    pub elapsed: Duration,
}

impl ApiResponse {
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// Client for the patient tests API. One operation per endpoint.
///
/// Cloning is cheap and shares the underlying connection pool.
#[derive(Clone)]
pub struct PatientApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl PatientApiClient {
    pub fn new(
        base_url: impl Into<String>,
        subscription_key: &str,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static("patient-tests-loadtest/0.2"),
        );
        let mut key = HeaderValue::from_str(subscription_key)?;
        key.set_sensitive(true);
        headers.insert(HeaderName::from_static(SUBSCRIPTION_KEY_HEADER), key);

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(ClientError::Build)?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    pub fn from_config(cfg: &TargetConfig) -> Result<Self, ClientError> {
        Self::new(
            cfg.base_url.clone(),
            &cfg.subscription_key,
            Duration::from_secs(cfg.timeout_seconds.max(1)),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn send(
        &self,
        endpoint: Endpoint,
        request: RequestBuilder,
    ) -> Result<ApiResponse, ClientError> {
        let started = Instant::now();
        let result = async {
            let resp = request.send().await?;
            let status = resp.status();
            let body = resp.text().await?;
            Ok::<_, reqwest::Error>((status, body))
        }
        .await;
        let elapsed = started.elapsed();

        match result {
            Ok((status, body)) => {
                debug!(
                    %endpoint,
                    status = status.as_u16(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "request completed"
                );
                Ok(ApiResponse {
                    endpoint,
                    status,
                    body,
                    elapsed,
                })
            }
            Err(source) => Err(ClientError::Transport {
                endpoint,
                elapsed,
                source,
            }),
        }
    }

    pub async fn echo(&self) -> Result<ApiResponse, ClientError> {
        let request = self.client.get(self.url("echo/resource?param1=sample"));
        self.send(Endpoint::Echo, request).await
    }

    /// `body` is generic so deliberately malformed payloads can be sent too.
    pub async fn create_patient<B: Serialize + ?Sized>(
        &self,
        body: &B,
    ) -> Result<ApiResponse, ClientError> {
        let request = self.client.post(self.url("patient/")).json(body);
        self.send(Endpoint::CreatePatient, request).await
    }

    pub async fn load_patient(&self, id: &str) -> Result<ApiResponse, ClientError> {
        let request = self.client.get(self.url(&format!("patient/{id}")));
        self.send(Endpoint::LoadPatient, request).await
    }

    pub async fn update_patient<B: Serialize + ?Sized>(
        &self,
        id: &str,
        body: &B,
    ) -> Result<ApiResponse, ClientError> {
        let request = self.client.put(self.url(&format!("patient/{id}"))).json(body);
        self.send(Endpoint::UpdatePatient, request).await
    }

    pub async fn search_patients(
        &self,
        filter: &PatientSearch,
    ) -> Result<ApiResponse, ClientError> {
        let request = self.client.post(self.url("patient/search")).json(filter);
        self.send(Endpoint::SearchPatient, request).await
    }

    /// Posts to the tests collection of `test.patient_id`.
    pub async fn create_test(&self, test: &DiagnosticTest) -> Result<ApiResponse, ClientError> {
        let path = format!("patient/{}/tests", test.patient_id);
        let request = self.client.post(self.url(&path)).json(test);
        self.send(Endpoint::CreateTest, request).await
    }

    pub async fn load_tests(&self, patient_id: &str) -> Result<ApiResponse, ClientError> {
        let request = self
            .client
            .get(self.url(&format!("patient/{patient_id}/tests/")));
        self.send(Endpoint::LoadTests, request).await
    }

    pub async fn load_test(
        &self,
        patient_id: &str,
        test_id: &str,
    ) -> Result<ApiResponse, ClientError> {
        let request = self
            .client
            .get(self.url(&format!("patient/{patient_id}/tests/{test_id}")));
        self.send(Endpoint::LoadTest, request).await
    }
}
