//! CSV reports built from analysis results, plus the upload template.

use chrono::NaiveDate;
use serde::Serialize;

use crate::api::{TransactionRecord, V_FEATURE_COUNT};

const RESULTS_HEADER: [&str; 10] = [
    "ID",
    "Amount",
    "Merchant",
    "Location",
    "Timestamp",
    "Card Number",
    "Fraud Probability",
    "Risk Score",
    "Is Genuine",
    "Factors",
];

const SAMPLE_ROWS: [&str; 2] = [
    "0.0,-1.3598071336738,-0.0727811733098497,2.53634673796914,1.37815522427443,-0.338320769942518,0.462387777762292,0.239598554061257,0.0986979012610507,0.363786969611213,0.0907941719789316,-0.551599533260813,-0.617800855762348,-0.991389847235408,-0.311169353699879,1.46817697209427,-0.470400525259478,0.207971241929242,0.0257905801985591,0.403992960255733,0.251412098239705,-0.018306777944153,0.277837575558899,-0.110473910188767,0.0669280749146731,0.128539358273528,-0.189114843888824,0.133558376740387,-0.0210530534538215,149.62",
    "0.0,1.19185711131486,0.26615071205963,0.16648011335321,0.448154078460911,0.0600176492822243,-0.0823608088155687,-0.0788029833323113,0.0851016549148104,-0.255425128319186,-0.166974414004614,1.61272666105479,1.06523531137287,0.48909501589608,-0.143772296441519,0.635558093258208,0.463917041022171,-0.114804663102346,-0.183361270123994,-0.145783041325259,-0.0690831352230203,-0.225775248033138,-0.638671952771851,0.101288021253234,-0.339846475529127,0.167170404418143,0.125894532368176,-0.00898309914322813,0.0147241691934927,2.69",
];

/// `Time,V1,...,V28,Amount`
pub fn feature_csv_header() -> String {
    let mut columns = Vec::with_capacity(V_FEATURE_COUNT + 2);
    columns.push("Time".to_string());
    columns.extend((1..=V_FEATURE_COUNT).map(|i| format!("V{}", i)));
    columns.push("Amount".to_string());
    columns.join(",")
}

/// Template users can fill in before uploading.
pub fn sample_feature_csv() -> String {
    let mut lines = vec![feature_csv_header()];
    lines.extend(SAMPLE_ROWS.iter().map(|row| row.to_string()));
    lines.join("\n") + "\n"
}

/// Quote a field if it contains a delimiter, quote or line break.
fn escape_field(field: &str) -> String {
    if field.contains(|c: char| matches!(c, ',' | '"' | '\n' | '\r')) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

pub fn results_to_csv(records: &[TransactionRecord]) -> String {
    let mut out = RESULTS_HEADER.join(",");
    out.push('\n');
    for r in records {
        let row = [
            escape_field(&r.id),
            r.amount.to_string(),
            escape_field(&r.merchant),
            escape_field(&r.location),
            escape_field(&r.timestamp),
            escape_field(&r.card_number),
            r.fraud_probability.to_string(),
            r.risk_score.to_string(),
            if r.is_genuine { "Yes" } else { "No" }.to_string(),
            escape_field(&r.factors.join("; ")),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

/// e.g. `fraud_results_2024-05-01.csv`
pub fn report_file_name(prefix: &str, date: NaiveDate) -> String {
    format!("{}_{}.csv", prefix, date.format("%Y-%m-%d"))
}

/// Headline numbers for a set of results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub fraudulent: usize,
    pub genuine: usize,
    /// `None` when there are no results.
    pub average_risk_score: Option<f64>,
    pub total_amount: f64,
}

impl BatchSummary {
    pub fn from_records(records: &[TransactionRecord]) -> Self {
        let total = records.len();
        let genuine = records.iter().filter(|r| r.is_genuine).count();
        let risk_sum: u64 = records.iter().map(|r| u64::from(r.risk_score)).sum();
        Self {
            total,
            fraudulent: total - genuine,
            genuine,
            average_risk_score: (total > 0).then(|| risk_sum as f64 / total as f64),
            total_amount: records.iter().map(|r| r.amount).sum(),
        }
    }
}
