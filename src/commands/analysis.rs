use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;

use super::{print_json, print_records, write_report, AppContext};
use crate::api::{FeatureVector, MerchantTransaction};

pub async fn analyze(
    ctx: &AppContext,
    amount: f64,
    merchant: String,
    location: String,
    card: String,
    timestamp: Option<String>,
) -> Result<()> {
    let transaction = MerchantTransaction {
        amount,
        merchant,
        location,
        card_number: card,
        timestamp: timestamp.unwrap_or_else(|| Utc::now().to_rfc3339()),
    };
    let record = ctx.api.analyze_transaction(&transaction).await?;
    print_json(&record)
}

pub async fn predict(ctx: &AppContext, time: f64, amount: f64, v: &[f64]) -> Result<()> {
    let features = FeatureVector::from_slice(time, amount, v)?;
    let record = ctx.api.predict_with_features(&features).await?;
    print_json(&record)
}

pub async fn batch(ctx: &AppContext, file: &Path, report: Option<&Path>) -> Result<()> {
    let content = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {:?}", file))?;
    let transactions: Vec<MerchantTransaction> = serde_json::from_str(&content)
        .with_context(|| format!("{:?} is not a JSON array of transactions", file))?;

    let records = ctx.api.analyze_batch(&transactions).await?;
    print_records(&records);
    if let Some(path) = report {
        write_report(path, &records)?;
    }
    Ok(())
}

pub async fn upload(ctx: &AppContext, file: &Path, report: Option<&Path>) -> Result<()> {
    let upload = ctx.api.upload_csv_file(file).await?;
    println!("{}", upload.message);
    println!(
        "Processed {} of {} rows",
        upload.processed_rows, upload.total_rows
    );
    print_records(&upload.results);
    if let Some(path) = report {
        write_report(path, &upload.results)?;
    }
    Ok(())
}
