use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Number of anonymised PCA components the model takes besides time and amount.
pub const V_FEATURE_COUNT: usize = 28;

/// One fraud-analysis result as returned by the service.
///
/// Ranges (`fraud_probability` in [0,1], `risk_score` nominally in [0,100])
/// are the model's contract and are not re-checked here. The hybrid scorer
/// does not clamp, so `risk_score` is wide enough to take an overshoot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub id: String,
    pub amount: f64,
    pub merchant: String,
    pub location: String,
    /// ISO-8601 instant, passed through as the server formats it.
    pub timestamp: String,
    /// Masked for display, never a real PAN.
    pub card_number: String,
    pub fraud_probability: f64,
    pub risk_score: u32,
    pub is_genuine: bool,
    pub factors: Vec<String>,
}

/// Merchant-style transaction the server derives model features from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MerchantTransaction {
    pub amount: f64,
    pub merchant: String,
    pub location: String,
    pub card_number: String,
    pub timestamp: String,
}

/// Raw model input: `Time, V1..V28, Amount`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    pub time: f64,
    pub amount: f64,
    pub v_values: [f64; V_FEATURE_COUNT],
}

impl FeatureVector {
    /// Build from a slice that must hold exactly 28 V components.
    pub fn from_slice(time: f64, amount: f64, v: &[f64]) -> Result<Self, ApiError> {
        let v_values =
            <[f64; V_FEATURE_COUNT]>::try_from(v).map_err(|_| ApiError::InvalidFeatures {
                expected: V_FEATURE_COUNT,
                got: v.len(),
            })?;
        Ok(Self {
            time,
            amount,
            v_values,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct BatchRequest<'a> {
    pub transactions: &'a [MerchantTransaction],
}

/// `/analyze-batch` has been served both as a bare array and wrapped in
/// `results`; both are accepted and nothing else.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum BatchResponse {
    List(Vec<TransactionRecord>),
    Wrapped { results: Vec<TransactionRecord> },
}

impl BatchResponse {
    pub fn into_records(self) -> Vec<TransactionRecord> {
        match self {
            BatchResponse::List(records) => records,
            BatchResponse::Wrapped { results } => results,
        }
    }
}

/// Result of a CSV upload. `processed_rows` may be lower than `total_rows`
/// when the server skipped rows; which rows is not reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvUploadResponse {
    pub message: String,
    pub results: Vec<TransactionRecord>,
    pub total_rows: u64,
    pub processed_rows: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub name: String,
    pub model_type: String,
    pub feature_count: u32,
    pub status: String,
    pub version: String,
    pub last_updated: String,
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfusionMatrix {
    pub true_negatives: u64,
    pub false_positives: u64,
    pub false_negatives: u64,
    pub true_positives: u64,
}

impl ConfusionMatrix {
    pub fn total(&self) -> u64 {
        self.true_negatives + self.false_positives + self.false_negatives + self.true_positives
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelEvaluation {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub confusion_matrix: ConfusionMatrix,
    pub feature_importance: Vec<FeatureImportance>,
    pub roc_auc: f64,
    pub pr_auc: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionHistory {
    pub transactions: Vec<TransactionRecord>,
    pub total_count: u64,
    pub fraudulent_count: u64,
    pub genuine_count: u64,
    pub average_amount: f64,
    pub total_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivity {
    pub timestamp: String,
    pub amount: f64,
    pub is_genuine: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealTimeStats {
    pub total_transactions: u64,
    pub fraudulent_transactions: u64,
    pub genuine_transactions: u64,
    pub average_risk_score: f64,
    pub total_amount: f64,
    pub average_amount: f64,
    pub recent_activity: Vec<RecentActivity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub message: String,
}

/// Exported history exactly as the server sent it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportPayload {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Error body shape used by the service on non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub error: Option<String>,
}
