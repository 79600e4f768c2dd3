use std::path::Path;
use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::endpoint::Endpoint;
use super::types::{
    BatchRequest, BatchResponse, CsvUploadResponse, ErrorBody, ExportPayload, FeatureVector,
    HealthStatus, MerchantTransaction, ModelEvaluation, ModelInfo, RealTimeStats,
    TransactionHistory, TransactionRecord,
};
use crate::error::ApiError;
use crate::session::{AuthResponse, LoginRequest, RegisterRequest, SessionManager, User};

/// Typed client for the fraud analysis service.
///
/// Each operation is a single request: attach credentials, send, and either
/// decode the typed body or fail with an `ApiError`. Nothing is retried and
/// the transport's default timeout applies.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    session: Arc<SessionManager>,
}

impl ApiClient {
    pub fn new(base_url: &str, session: Arc<SessionManager>) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("fraudfinder/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::ClientSetup(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionManager> {
        &self.session
    }

    fn url(&self, endpoint: Endpoint) -> String {
        format!("{}/{}", self.base_url, endpoint.path())
    }

    /// Start a request with credentials attached. Bearer endpoints fail here,
    /// before any I/O, when there is no token.
    fn request(&self, endpoint: Endpoint) -> Result<RequestBuilder, ApiError> {
        let builder = self.client.request(endpoint.method(), self.url(endpoint));
        if !endpoint.requires_auth() {
            return Ok(builder);
        }

        let headers = self.session.auth_headers();
        if !headers.contains_key(AUTHORIZATION) {
            warn!("{} called without a session", endpoint.operation());
            return Err(ApiError::Unauthenticated {
                operation: endpoint.operation(),
            });
        }
        Ok(builder.headers(headers))
    }

    /// Send and turn any non-2xx status into a rejection.
    async fn dispatch(
        &self,
        endpoint: Endpoint,
        builder: RequestBuilder,
    ) -> Result<Response, ApiError> {
        info!("{} /{}", endpoint.method(), endpoint.path());
        let response = builder.send().await.map_err(|e| {
            warn!("Request to /{} failed: {}", endpoint.path(), e);
            ApiError::Transport {
                operation: endpoint.operation(),
                cause: e.to_string(),
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.error)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| endpoint.failure_message().to_string());
        warn!(
            "{} rejected ({}): {}",
            endpoint.operation(),
            status.as_u16(),
            message
        );
        Err(ApiError::Rejected {
            operation: endpoint.operation(),
            status: status.as_u16(),
            message,
        })
    }

    async fn decode<T: DeserializeOwned>(
        endpoint: Endpoint,
        response: Response,
    ) -> Result<T, ApiError> {
        let bytes = response.bytes().await.map_err(|e| ApiError::Transport {
            operation: endpoint.operation(),
            cause: e.to_string(),
        })?;
        serde_json::from_slice(&bytes).map_err(|e| {
            debug!(
                "Undecodable body from /{}: {}",
                endpoint.path(),
                String::from_utf8_lossy(&bytes)
            );
            ApiError::InvalidResponse {
                operation: endpoint.operation(),
                cause: e.to_string(),
            }
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T, ApiError> {
        let builder = self.request(endpoint)?;
        let response = self.dispatch(endpoint, builder).await?;
        Self::decode(endpoint, response).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        body: &B,
    ) -> Result<T, ApiError> {
        let builder = self.request(endpoint)?.json(body);
        let response = self.dispatch(endpoint, builder).await?;
        Self::decode(endpoint, response).await
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, ApiError> {
        self.post_json(Endpoint::Register, request).await
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse, ApiError> {
        self.post_json(Endpoint::Login, request).await
    }

    pub async fn get_profile(&self) -> Result<User, ApiError> {
        self.get_json(Endpoint::Profile).await
    }

    pub async fn analyze_transaction(
        &self,
        transaction: &MerchantTransaction,
    ) -> Result<TransactionRecord, ApiError> {
        self.post_json(Endpoint::AnalyzeTransaction, transaction)
            .await
    }

    /// Score raw model features, skipping server-side feature derivation.
    pub async fn predict_with_features(
        &self,
        features: &FeatureVector,
    ) -> Result<TransactionRecord, ApiError> {
        self.post_json(Endpoint::Predict, features).await
    }

    /// Results come back in input order. A response of a different length
    /// breaks that contract and is reported as an invalid response.
    pub async fn analyze_batch(
        &self,
        transactions: &[MerchantTransaction],
    ) -> Result<Vec<TransactionRecord>, ApiError> {
        let response: BatchResponse = self
            .post_json(Endpoint::AnalyzeBatch, &BatchRequest { transactions })
            .await?;
        let records = response.into_records();
        if records.len() != transactions.len() {
            return Err(ApiError::InvalidResponse {
                operation: Endpoint::AnalyzeBatch.operation(),
                cause: format!(
                    "sent {} transactions, got {} results",
                    transactions.len(),
                    records.len()
                ),
            });
        }
        info!("Batch of {} transactions analyzed", records.len());
        Ok(records)
    }

    /// Upload a `Time,V1..V28,Amount` CSV as the multipart field `file`.
    /// The response is returned as-is; skipped rows are not reconciled.
    pub async fn upload_csv(
        &self,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<CsvUploadResponse, ApiError> {
        let endpoint = Endpoint::UploadCsv;
        let part = Part::bytes(contents)
            .file_name(file_name.to_string())
            .mime_str("text/csv")
            .map_err(|e| ApiError::InvalidUpload(e.to_string()))?;
        let builder = self.request(endpoint)?.multipart(Form::new().part("file", part));
        let response = self.dispatch(endpoint, builder).await?;
        let upload: CsvUploadResponse = Self::decode(endpoint, response).await?;
        info!(
            "CSV upload processed {}/{} rows",
            upload.processed_rows, upload.total_rows
        );
        Ok(upload)
    }

    /// Read a local `.csv` file and upload it.
    pub async fn upload_csv_file(&self, path: &Path) -> Result<CsvUploadResponse, ApiError> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ApiError::InvalidUpload(format!("No file name in {:?}", path)))?;
        if !file_name.to_lowercase().ends_with(".csv") {
            return Err(ApiError::InvalidUpload(
                "Please upload a CSV file".to_string(),
            ));
        }
        let contents = tokio::fs::read(path)
            .await
            .map_err(|e| ApiError::InvalidUpload(format!("Failed to read {:?}: {}", path, e)))?;
        self.upload_csv(file_name, contents).await
    }

    pub async fn get_model_info(&self) -> Result<ModelInfo, ApiError> {
        self.get_json(Endpoint::ModelInfo).await
    }

    pub async fn get_model_evaluation(&self) -> Result<ModelEvaluation, ApiError> {
        self.get_json(Endpoint::ModelEvaluation).await
    }

    pub async fn get_transaction_history(&self) -> Result<TransactionHistory, ApiError> {
        self.get_json(Endpoint::TransactionHistory).await
    }

    /// Opaque passthrough: the body is not parsed.
    pub async fn export_transaction_history(&self) -> Result<ExportPayload, ApiError> {
        let endpoint = Endpoint::ExportHistory;
        let builder = self.request(endpoint)?;
        let response = self.dispatch(endpoint, builder).await?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let bytes = response.bytes().await.map_err(|e| ApiError::Transport {
            operation: endpoint.operation(),
            cause: e.to_string(),
        })?;
        Ok(ExportPayload {
            content_type,
            bytes: bytes.to_vec(),
        })
    }

    pub async fn get_real_time_stats(&self) -> Result<RealTimeStats, ApiError> {
        self.get_json(Endpoint::RealTimeStats).await
    }

    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.get_json(Endpoint::Health).await
    }
}
