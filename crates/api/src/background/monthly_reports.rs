//! Monthly business snapshots.
//!
//! On every tick the job checks whether the previous calendar month has a
//! stored report and generates one if not. Admins can also regenerate any
//! month on demand through [`generate`].

use std::time::Duration;

use agency_core::report::monthly_snapshot;
use agency_core::stats::YearMonth;
use agency_db::models::monthly_report::MonthlyReport;
use agency_db::repositories::{MonthlyReportRepo, PaymentRepo, QuoteRepo, SubscriptionRepo};
use chrono::Utc;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

/// Compute the snapshot for `month` from current data and store it,
/// replacing any earlier report for the same month.
pub async fn generate(pool: &PgPool, month: YearMonth) -> Result<MonthlyReport, sqlx::Error> {
    let payments: Vec<_> = PaymentRepo::list(pool)
        .await?
        .iter()
        .map(|p| p.fact())
        .collect();
    let quotes: Vec<_> = QuoteRepo::list(pool)
        .await?
        .iter()
        .map(|q| q.fact())
        .collect();
    let statuses: Vec<String> = SubscriptionRepo::list(pool)
        .await?
        .into_iter()
        .map(|s| s.status)
        .collect();

    let snapshot = monthly_snapshot(month, &payments, &quotes, &statuses);
    MonthlyReportRepo::upsert(pool, &snapshot).await
}

/// Generate last month's report if it does not exist yet.
async fn ensure_previous_month(pool: &PgPool) -> Result<Option<MonthlyReport>, sqlx::Error> {
    let month = YearMonth::of(Utc::now()).previous();
    if MonthlyReportRepo::find(pool, month.year, month.month)
        .await?
        .is_some()
    {
        return Ok(None);
    }
    generate(pool, month).await.map(Some)
}

/// Run the report loop until `cancel` is triggered.
pub async fn run(pool: PgPool, every: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = every.as_secs(), "Monthly report job started");

    let mut interval = tokio::time::interval(every);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Monthly report job stopping");
                break;
            }
            _ = interval.tick() => {
                match ensure_previous_month(&pool).await {
                    Ok(Some(report)) => {
                        tracing::info!(
                            year = report.year,
                            month = report.month,
                            revenue_cents = report.total_revenue_cents,
                            "Monthly report generated"
                        );
                    }
                    Ok(None) => tracing::debug!("Monthly report already up to date"),
                    Err(e) => {
                        tracing::error!(error = %e, "Monthly report generation failed");
                    }
                }
            }
        }
    }
}
