use fleet_pricing::{PricingConfig, WeightBand};
use sqlx::PgPool;

use crate::StoreError;

pub struct PricingRepository {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct PricingRow {
    base_cost_per_km: f64,
    weight_bands: serde_json::Value,
}

impl TryFrom<PricingRow> for PricingConfig {
    type Error = StoreError;

    fn try_from(row: PricingRow) -> Result<Self, Self::Error> {
        let weight_bands: Vec<WeightBand> = serde_json::from_value(row.weight_bands)
            .map_err(|e| StoreError::Corrupt(format!("weight_bands: {e}")))?;
        Ok(PricingConfig {
            base_cost_per_km: row.base_cost_per_km,
            weight_bands,
        })
    }
}

impl PricingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Seeds the singleton configuration at startup. The constant-true
    /// primary key turns concurrent seeding into a no-op instead of a
    /// duplicate row.
    pub async fn ensure_default(&self) -> Result<(), StoreError> {
        let seed = PricingConfig::default_seed();
        let bands = serde_json::to_value(&seed.weight_bands)
            .map_err(|e| StoreError::Corrupt(format!("seed bands: {e}")))?;
        sqlx::query(
            r#"
            INSERT INTO pricing_config (singleton, base_cost_per_km, weight_bands)
            VALUES (TRUE, $1, $2)
            ON CONFLICT (singleton) DO NOTHING
            "#,
        )
        .bind(seed.base_cost_per_km)
        .bind(bands)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Reads the singleton, seeding it first if a deployment skipped the
    /// startup step. Two sequential calls always observe the same row.
    pub async fn get_or_create(&self) -> Result<PricingConfig, StoreError> {
        if let Some(config) = self.get().await? {
            return Ok(config);
        }
        self.ensure_default().await?;
        self.get()
            .await?
            .ok_or_else(|| StoreError::Corrupt("pricing_config singleton missing after seed".into()))
    }

    pub async fn get(&self) -> Result<Option<PricingConfig>, StoreError> {
        let row: Option<PricingRow> = sqlx::query_as(
            "SELECT base_cost_per_km, weight_bands FROM pricing_config WHERE singleton = TRUE",
        )
        .fetch_optional(&self.pool)
        .await?;
        row.map(PricingConfig::try_from).transpose()
    }

    pub async fn update(&self, config: &PricingConfig) -> Result<(), StoreError> {
        let bands = serde_json::to_value(&config.weight_bands)
            .map_err(|e| StoreError::Corrupt(format!("weight_bands: {e}")))?;
        sqlx::query(
            r#"
            UPDATE pricing_config
            SET base_cost_per_km = $1, weight_bands = $2, updated_at = NOW()
            WHERE singleton = TRUE
            "#,
        )
        .bind(config.base_cost_per_km)
        .bind(bands)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Needs a live Postgres with migrations applied:
    //   DATABASE_URL=... cargo test -p fleet-store -- --ignored
    #[tokio::test]
    #[ignore]
    async fn ensure_default_is_idempotent() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let db = crate::DbClient::new(&url).await.unwrap();
        db.migrate().await.unwrap();
        let repo = PricingRepository::new(db.pool.clone());

        repo.ensure_default().await.unwrap();
        let first = repo.get().await.unwrap().unwrap();
        repo.ensure_default().await.unwrap();
        let second = repo.get().await.unwrap().unwrap();
        assert_eq!(first, second);

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM pricing_config")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
