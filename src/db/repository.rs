//! Repository for diagnosis result and master data operations

use sqlx::PgPool;

use super::models::{test_input_json, SubstationRow, TransformerRow};
use super::DbError;
use crate::model::{FinalReport, OilParameter};

/// Repository over the diagnosis result and master tables
#[derive(Clone)]
pub struct DiagnosisRepository {
    pool: PgPool,
}

impl DiagnosisRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a completed diagnosis result.
    ///
    /// Stores the raw test inputs and reference list as JSONB alongside the
    /// narrative and the rendered report text.
    pub async fn insert_result(
        &self,
        report: &FinalReport,
        parameters: &[OilParameter],
    ) -> Result<(), DbError> {
        let test_input = test_input_json(report, parameters);
        let references = serde_json::to_value(&report.references)
            .map_err(|e| DbError::Serialization(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO dga_results (
                substation_id, transformer_id, testing_date,
                test_input_json, ai_response, ai_reference_json, report_text
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&report.meta.substation_short_id)
        .bind(&report.meta.transformer_id)
        .bind(report.meta.testing_date)
        .bind(&test_input)
        .bind(report.narrative.as_text())
        .bind(&references)
        .bind(report.render())
        .execute(&self.pool)
        .await?;

        tracing::debug!(
            transformer = %report.meta.transformer_id,
            "Inserted diagnosis result"
        );
        Ok(())
    }

    /// List all substations from the master table
    pub async fn list_substations(&self) -> Result<Vec<SubstationRow>, DbError> {
        let rows: Vec<SubstationRow> = sqlx::query_as(
            "SELECT substation_short_id, substation_name FROM substation_master ORDER BY substation_short_id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// List all transformers from the master table
    pub async fn list_transformers(&self) -> Result<Vec<TransformerRow>, DbError> {
        let rows: Vec<TransformerRow> = sqlx::query_as(
            r#"
            SELECT substation_short_id, transformer_id, transformer_name, transformer_capacity
            FROM transformer_master
            ORDER BY substation_short_id, transformer_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
