//! Repository for the `monthly_reports` table.

use agency_core::report::MonthlySnapshot;
use sqlx::PgPool;

use crate::models::monthly_report::MonthlyReport;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, year, month, total_revenue_cents, total_clients, \
                        active_subscriptions, past_due_subscriptions, new_quotes, \
                        completed_projects, created_at, updated_at";

pub struct MonthlyReportRepo;

impl MonthlyReportRepo {
    /// Store a snapshot, replacing any existing report for the same month.
    pub async fn upsert(
        pool: &PgPool,
        snapshot: &MonthlySnapshot,
    ) -> Result<MonthlyReport, sqlx::Error> {
        let query = format!(
            "INSERT INTO monthly_reports (year, month, total_revenue_cents, total_clients,
                                          active_subscriptions, past_due_subscriptions,
                                          new_quotes, completed_projects)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             ON CONFLICT ON CONSTRAINT uq_monthly_reports_year_month DO UPDATE SET
                total_revenue_cents = EXCLUDED.total_revenue_cents,
                total_clients = EXCLUDED.total_clients,
                active_subscriptions = EXCLUDED.active_subscriptions,
                past_due_subscriptions = EXCLUDED.past_due_subscriptions,
                new_quotes = EXCLUDED.new_quotes,
                completed_projects = EXCLUDED.completed_projects
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MonthlyReport>(&query)
            .bind(snapshot.year)
            .bind(snapshot.month as i32)
            .bind(snapshot.total_revenue_cents)
            .bind(snapshot.total_clients)
            .bind(snapshot.active_subscriptions)
            .bind(snapshot.past_due_subscriptions)
            .bind(snapshot.new_quotes)
            .bind(snapshot.completed_projects)
            .fetch_one(pool)
            .await
    }

    pub async fn find(
        pool: &PgPool,
        year: i32,
        month: u32,
    ) -> Result<Option<MonthlyReport>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM monthly_reports WHERE year = $1 AND month = $2");
        sqlx::query_as::<_, MonthlyReport>(&query)
            .bind(year)
            .bind(month as i32)
            .fetch_optional(pool)
            .await
    }

    /// All reports, most recent month first.
    pub async fn list(pool: &PgPool) -> Result<Vec<MonthlyReport>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM monthly_reports ORDER BY year DESC, month DESC");
        sqlx::query_as::<_, MonthlyReport>(&query).fetch_all(pool).await
    }
}
