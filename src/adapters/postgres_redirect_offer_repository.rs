//! Postgres implementation of RedirectOfferRepository.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::postgres_donation_repository::record_on;
use crate::domain::{NewDonation, RecordedDonation, RedirectOffer, RedirectStatus};
use crate::ports::{RedirectOfferRepository, RepositoryError, RepositoryResult};

#[derive(Clone)]
pub struct PostgresRedirectOfferRepository {
    pool: PgPool,
}

impl PostgresRedirectOfferRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Explains why a conditional update on `id` matched nothing.
    async fn not_awaiting(&self, id: Uuid) -> RepositoryError {
        let status: Result<Option<String>, sqlx::Error> =
            sqlx::query_scalar("SELECT status FROM redirect_offers WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await;
        match status {
            Ok(Some(status)) => {
                RepositoryError::Conflict(format!("Redirect offer is already {}", status))
            }
            Ok(None) => RepositoryError::NotFound("Redirect offer".to_string()),
            Err(e) => e.into(),
        }
    }
}

#[async_trait]
impl RedirectOfferRepository for PostgresRedirectOfferRepository {
    async fn insert(&self, offer: &RedirectOffer) -> RepositoryResult<RedirectOffer> {
        let row = sqlx::query_as::<_, RedirectOfferRow>(
            r#"
            INSERT INTO redirect_offers (
                id, source_donation_id, source_campaign_id, donor_id, excess,
                status, redirect_donation_id, created_at, resolved_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(offer.id)
        .bind(offer.source_donation_id)
        .bind(offer.source_campaign_id)
        .bind(offer.donor_id)
        .bind(&offer.excess)
        .bind(offer.status.as_str())
        .bind(offer.redirect_donation_id)
        .bind(offer.created_at)
        .bind(offer.resolved_at)
        .fetch_one(&self.pool)
        .await?;

        row.into_domain()
    }

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<RedirectOffer> {
        let row =
            sqlx::query_as::<_, RedirectOfferRow>("SELECT * FROM redirect_offers WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.ok_or_else(|| RepositoryError::NotFound("Redirect offer".to_string()))?
            .into_domain()
    }

    async fn mark_skipped(&self, id: Uuid) -> RepositoryResult<RedirectOffer> {
        let row = sqlx::query_as::<_, RedirectOfferRow>(
            r#"
            UPDATE redirect_offers
            SET status = 'skipped', resolved_at = NOW()
            WHERE id = $1 AND status = 'awaiting'
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => row.into_domain(),
            None => Err(self.not_awaiting(id).await),
        }
    }

    async fn complete_with_transfer(
        &self,
        id: Uuid,
        transfer: &NewDonation,
    ) -> RepositoryResult<(RedirectOffer, RecordedDonation)> {
        let mut tx = self.pool.begin().await?;

        let status: Option<String> =
            sqlx::query_scalar("SELECT status FROM redirect_offers WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        match status.as_deref() {
            None => return Err(RepositoryError::NotFound("Redirect offer".to_string())),
            Some(status) if status != RedirectStatus::Awaiting.as_str() => {
                return Err(RepositoryError::Conflict(format!(
                    "Redirect offer is already {}",
                    status
                )))
            }
            Some(_) => {}
        }

        let recorded = record_on(&mut *tx, transfer).await?;

        let row = sqlx::query_as::<_, RedirectOfferRow>(
            r#"
            UPDATE redirect_offers
            SET status = 'redirected', redirect_donation_id = $2, resolved_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(recorded.donation.id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((row.into_domain()?, recorded))
    }
}

#[derive(Debug, sqlx::FromRow)]
struct RedirectOfferRow {
    id: Uuid,
    source_donation_id: Uuid,
    source_campaign_id: Uuid,
    donor_id: Uuid,
    excess: BigDecimal,
    status: String,
    redirect_donation_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    resolved_at: Option<DateTime<Utc>>,
}

impl RedirectOfferRow {
    fn into_domain(self) -> RepositoryResult<RedirectOffer> {
        let status = self
            .status
            .parse::<RedirectStatus>()
            .map_err(RepositoryError::Backend)?;
        Ok(RedirectOffer {
            id: self.id,
            source_donation_id: self.source_donation_id,
            source_campaign_id: self.source_campaign_id,
            donor_id: self.donor_id,
            excess: self.excess,
            status,
            redirect_donation_id: self.redirect_donation_id,
            created_at: self.created_at,
            resolved_at: self.resolved_at,
        })
    }
}
