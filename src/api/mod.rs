pub mod client;
pub mod endpoint;
pub mod types;

pub use self::client::ApiClient;
pub use self::endpoint::Endpoint;
pub use self::types::{
    ConfusionMatrix, CsvUploadResponse, ExportPayload, FeatureImportance, FeatureVector,
    HealthStatus, MerchantTransaction, ModelEvaluation, ModelInfo, RealTimeStats,
    RecentActivity, TransactionHistory, TransactionRecord, V_FEATURE_COUNT,
};
