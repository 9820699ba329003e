use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::postgres_campaign_repository::CampaignRow;
use crate::domain::{Campaign, Supporter};
use crate::ports::{FollowRepository, RepositoryError, RepositoryResult};

/// Postgres-backed donor follows.
#[derive(Clone)]
pub struct PostgresFollowRepository {
    pool: PgPool,
}

impl PostgresFollowRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FollowRepository for PostgresFollowRepository {
    async fn follow(&self, donor_id: Uuid, campaign_id: Uuid) -> RepositoryResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO campaign_followers (donor_id, campaign_id)
            VALUES ($1, $2)
            ON CONFLICT (donor_id, campaign_id) DO NOTHING
            "#,
        )
        .bind(donor_id)
        .bind(campaign_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::Conflict(
                "Already following this campaign".to_string(),
            ));
        }
        Ok(())
    }

    async fn unfollow(&self, donor_id: Uuid, campaign_id: Uuid) -> RepositoryResult<()> {
        let result =
            sqlx::query("DELETE FROM campaign_followers WHERE donor_id = $1 AND campaign_id = $2")
                .bind(donor_id)
                .bind(campaign_id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::Rejected(
                "Not following this campaign".to_string(),
            ));
        }
        Ok(())
    }

    async fn followed_by(&self, donor_id: Uuid) -> RepositoryResult<Vec<Campaign>> {
        let rows = sqlx::query_as::<_, CampaignRow>(
            r#"
            SELECT c.* FROM campaigns c
            JOIN campaign_followers f ON f.campaign_id = c.id
            WHERE f.donor_id = $1
            ORDER BY f.followed_at
            "#,
        )
        .bind(donor_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CampaignRow::into_domain).collect())
    }

    async fn is_following(&self, donor_id: Uuid, campaign_id: Uuid) -> RepositoryResult<bool> {
        let following = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM campaign_followers WHERE donor_id = $1 AND campaign_id = $2)",
        )
        .bind(donor_id)
        .bind(campaign_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(following)
    }

    async fn follower_count(&self, campaign_id: Uuid) -> RepositoryResult<i64> {
        let count =
            sqlx::query_scalar("SELECT COUNT(*) FROM campaign_followers WHERE campaign_id = $1")
                .bind(campaign_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn followers_of(&self, campaign_id: Uuid) -> RepositoryResult<Vec<Supporter>> {
        let rows = sqlx::query_as::<_, (Uuid, DateTime<Utc>)>(
            r#"
            SELECT donor_id, followed_at FROM campaign_followers
            WHERE campaign_id = $1
            ORDER BY followed_at, donor_id
            "#,
        )
        .bind(campaign_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(donor_id, followed_at)| Supporter {
                donor_id,
                followed_at,
            })
            .collect())
    }
}
