use std::path::Path;

use anyhow::Result;
use chrono::Local;

use super::{print_records, write_or_print, write_report, AppContext};
use crate::report::report_file_name;

pub async fn model_evaluation(ctx: &AppContext) -> Result<()> {
    let eval = ctx.api.get_model_evaluation().await?;
    println!(
        "accuracy {:.3}  precision {:.3}  recall {:.3}  f1 {:.3}",
        eval.accuracy, eval.precision, eval.recall, eval.f1_score
    );
    println!("roc auc {:.3}  pr auc {:.3}", eval.roc_auc, eval.pr_auc);

    let cm = &eval.confusion_matrix;
    println!("confusion matrix ({} samples):", cm.total());
    println!("  TN {:>8}  FP {:>8}", cm.true_negatives, cm.false_positives);
    println!("  FN {:>8}  TP {:>8}", cm.false_negatives, cm.true_positives);

    if !eval.feature_importance.is_empty() {
        println!("feature importance:");
        for f in &eval.feature_importance {
            println!("  {:<8} {:.3}", f.feature, f.importance);
        }
    }
    Ok(())
}

pub async fn history(ctx: &AppContext, report: Option<&Path>) -> Result<()> {
    let history = ctx.api.get_transaction_history().await?;
    print_records(&history.transactions);
    println!(
        "server totals: {} transactions ({} fraudulent, {} genuine), amount {:.2}, average {:.2}",
        history.total_count,
        history.fraudulent_count,
        history.genuine_count,
        history.total_amount,
        history.average_amount
    );
    if let Some(path) = report {
        write_report(path, &history.transactions)?;
    }
    Ok(())
}

pub async fn export(ctx: &AppContext, output: Option<&Path>) -> Result<()> {
    let payload = ctx.api.export_transaction_history().await?;
    let default_name = report_file_name("transaction_history", Local::now().date_naive());
    let path = output.unwrap_or_else(|| Path::new(&default_name));
    write_or_print(Some(path), &payload.bytes)
}
