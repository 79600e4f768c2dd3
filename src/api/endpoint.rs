use reqwest::Method;

/// Every remote capability of the fraud analysis service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Register,
    Login,
    Profile,
    AnalyzeTransaction,
    Predict,
    AnalyzeBatch,
    UploadCsv,
    ModelInfo,
    ModelEvaluation,
    TransactionHistory,
    ExportHistory,
    RealTimeStats,
    Health,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Register => "register",
            Endpoint::Login => "login",
            Endpoint::Profile => "profile",
            Endpoint::AnalyzeTransaction => "analyze-transaction",
            Endpoint::Predict => "predict",
            Endpoint::AnalyzeBatch => "analyze-batch",
            Endpoint::UploadCsv => "upload-csv",
            Endpoint::ModelInfo => "model-info",
            Endpoint::ModelEvaluation => "model-evaluation",
            Endpoint::TransactionHistory => "transaction-history",
            Endpoint::ExportHistory => "export-history",
            Endpoint::RealTimeStats => "real-time-stats",
            Endpoint::Health => "health",
        }
    }

    pub fn method(self) -> Method {
        match self {
            Endpoint::Register
            | Endpoint::Login
            | Endpoint::AnalyzeTransaction
            | Endpoint::Predict
            | Endpoint::AnalyzeBatch
            | Endpoint::UploadCsv => Method::POST,
            _ => Method::GET,
        }
    }

    /// Only the sign-in calls and the health probe go out without a token.
    pub fn requires_auth(self) -> bool {
        !matches!(self, Endpoint::Register | Endpoint::Login | Endpoint::Health)
    }

    /// Operation name used in errors and logs.
    pub fn operation(self) -> &'static str {
        match self {
            Endpoint::Register => "register",
            Endpoint::Login => "login",
            Endpoint::Profile => "get_profile",
            Endpoint::AnalyzeTransaction => "analyze_transaction",
            Endpoint::Predict => "predict_with_features",
            Endpoint::AnalyzeBatch => "analyze_batch",
            Endpoint::UploadCsv => "upload_csv",
            Endpoint::ModelInfo => "get_model_info",
            Endpoint::ModelEvaluation => "get_model_evaluation",
            Endpoint::TransactionHistory => "get_transaction_history",
            Endpoint::ExportHistory => "export_transaction_history",
            Endpoint::RealTimeStats => "get_real_time_stats",
            Endpoint::Health => "health",
        }
    }

    /// Shown when a rejection carries no server-supplied reason.
    pub fn failure_message(self) -> &'static str {
        match self {
            Endpoint::Register => "Registration failed",
            Endpoint::Login => "Login failed",
            Endpoint::Profile => "Failed to get profile",
            Endpoint::AnalyzeTransaction => "Failed to analyze transaction",
            Endpoint::Predict => "Failed to predict with V values",
            Endpoint::AnalyzeBatch => "Failed to analyze batch",
            Endpoint::UploadCsv => "Failed to upload CSV",
            Endpoint::ModelInfo => "Failed to get model info",
            Endpoint::ModelEvaluation => "Failed to get model evaluation",
            Endpoint::TransactionHistory => "Failed to get transaction history",
            Endpoint::ExportHistory => "Failed to export transaction history",
            Endpoint::RealTimeStats => "Failed to get real-time stats",
            Endpoint::Health => "Health check failed",
        }
    }
}
