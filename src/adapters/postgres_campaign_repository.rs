//! Postgres implementation of CampaignRepository.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Campaign, CampaignChanges};
use crate::ports::{CampaignCounts, CampaignRepository, RepositoryError, RepositoryResult};

#[derive(Clone)]
pub struct PostgresCampaignRepository {
    pool: PgPool,
}

impl PostgresCampaignRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CampaignRepository for PostgresCampaignRepository {
    async fn insert(&self, campaign: &Campaign) -> RepositoryResult<Campaign> {
        let row = sqlx::query_as::<_, CampaignRow>(
            r#"
            INSERT INTO campaigns (
                id, full_name, academic_level, school_name, fee_amount,
                amount_raised, story, profile_image, is_verified, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(campaign.id)
        .bind(&campaign.full_name)
        .bind(&campaign.academic_level)
        .bind(&campaign.school_name)
        .bind(&campaign.fee_amount)
        .bind(&campaign.amount_raised)
        .bind(&campaign.story)
        .bind(&campaign.profile_image)
        .bind(campaign.is_verified)
        .bind(campaign.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => RepositoryError::Conflict(
                format!("Campaign {} already exists", campaign.id),
            ),
            other => other.into(),
        })?;

        Ok(row.into_domain())
    }

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Campaign> {
        let row = sqlx::query_as::<_, CampaignRow>("SELECT * FROM campaigns WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(CampaignRow::into_domain)
            .ok_or_else(|| RepositoryError::NotFound("Campaign".to_string()))
    }

    async fn list(&self, verified_only: bool) -> RepositoryResult<Vec<Campaign>> {
        let rows = sqlx::query_as::<_, CampaignRow>(
            "SELECT * FROM campaigns WHERE is_verified OR NOT $1 ORDER BY created_at, id",
        )
        .bind(verified_only)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CampaignRow::into_domain).collect())
    }

    async fn update(&self, id: Uuid, changes: &CampaignChanges) -> RepositoryResult<Campaign> {
        let row = sqlx::query_as::<_, CampaignRow>(
            r#"
            UPDATE campaigns SET
                full_name = COALESCE($2, full_name),
                academic_level = COALESCE($3, academic_level),
                school_name = COALESCE($4, school_name),
                fee_amount = COALESCE($5, fee_amount),
                story = COALESCE($6, story),
                profile_image = COALESCE($7, profile_image)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&changes.full_name)
        .bind(&changes.academic_level)
        .bind(&changes.school_name)
        .bind(&changes.fee_amount)
        .bind(&changes.story)
        .bind(&changes.profile_image)
        .fetch_optional(&self.pool)
        .await?;

        row.map(CampaignRow::into_domain)
            .ok_or_else(|| RepositoryError::NotFound("Campaign".to_string()))
    }

    async fn set_verified(&self, id: Uuid, verified: bool) -> RepositoryResult<Campaign> {
        let row = sqlx::query_as::<_, CampaignRow>(
            "UPDATE campaigns SET is_verified = $2 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(verified)
        .fetch_optional(&self.pool)
        .await?;

        row.map(CampaignRow::into_domain)
            .ok_or_else(|| RepositoryError::NotFound("Campaign".to_string()))
    }

    async fn list_fundable(&self, exclude_id: Uuid) -> RepositoryResult<Vec<Campaign>> {
        let rows = sqlx::query_as::<_, CampaignRow>(
            r#"
            SELECT * FROM campaigns
            WHERE is_verified AND amount_raised < fee_amount AND id <> $1
            ORDER BY created_at, id
            "#,
        )
        .bind(exclude_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CampaignRow::into_domain).collect())
    }

    async fn counts(&self) -> RepositoryResult<CampaignCounts> {
        let (total, verified): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE is_verified) FROM campaigns",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(CampaignCounts {
            total,
            verified,
            pending: total - verified,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct CampaignRow {
    id: Uuid,
    full_name: String,
    academic_level: String,
    school_name: String,
    fee_amount: BigDecimal,
    amount_raised: BigDecimal,
    story: String,
    profile_image: String,
    is_verified: bool,
    created_at: DateTime<Utc>,
}

impl CampaignRow {
    pub(super) fn into_domain(self) -> Campaign {
        Campaign {
            id: self.id,
            full_name: self.full_name,
            academic_level: self.academic_level,
            school_name: self.school_name,
            fee_amount: self.fee_amount,
            amount_raised: self.amount_raised,
            story: self.story,
            profile_image: self.profile_image,
            is_verified: self.is_verified,
            created_at: self.created_at,
        }
    }
}
