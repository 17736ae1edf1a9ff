// Persistence layer. Records the lifecycle of every request/response cycle,
// keyed by referentienummer, for audit across process restarts.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::cycle::RequestResponseCycle;
use crate::errors::Result;

/// Idempotent upsert of the current cycle snapshot. Concurrent saves for
/// different referentienummers do not interfere; the pre/post saves for one
/// referentienummer are issued in program order by the owning task.
#[async_trait]
pub trait CycleStore: Send + Sync {
    async fn save(&self, cycle: &RequestResponseCycle) -> Result<()>;
}

pub struct PgCycleStore {
    pool: PgPool,
}

impl PgCycleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CycleStore for PgCycleStore {
    async fn save(&self, cycle: &RequestResponseCycle) -> Result<()> {
        debug!(
            referentienummer = %cycle.referentienummer,
            status = cycle.status.as_str(),
            "saving cycle snapshot"
        );

        sqlx::query(
            r#"
            INSERT INTO request_cycles (
                referentienummer,
                modus,
                version,
                protocol,
                endpoint,
                soap_action,
                request_body,
                status,
                kenmerk,
                response_status,
                response_body,
                started_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, NOW())
            ON CONFLICT (referentienummer) DO UPDATE SET
                status = EXCLUDED.status,
                kenmerk = EXCLUDED.kenmerk,
                response_status = EXCLUDED.response_status,
                response_body = EXCLUDED.response_body,
                updated_at = NOW()
            "#,
        )
        .bind(&cycle.referentienummer)
        .bind(&cycle.modus)
        .bind(&cycle.version)
        .bind(&cycle.protocol)
        .bind(&cycle.endpoint)
        .bind(&cycle.soap_action)
        .bind(&cycle.body)
        .bind(cycle.status.as_str())
        .bind(cycle.kenmerk.as_deref())
        .bind(cycle.response().map(|r| i32::from(r.status_code)))
        .bind(cycle.response().map(|r| r.body.as_str()))
        .bind(cycle.started_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
