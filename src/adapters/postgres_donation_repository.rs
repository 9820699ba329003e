//! Postgres implementation of DonationRepository.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::domain::{Donation, NewDonation, PaymentMethod, RecordedDonation, RedirectStatus};
use crate::ports::{DonationRepository, DonationTotals, RepositoryError, RepositoryResult};

#[derive(Clone)]
pub struct PostgresDonationRepository {
    pool: PgPool,
}

impl PostgresDonationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CreditRow {
    amount_raised_before: BigDecimal,
    fee_amount: BigDecimal,
}

/// Credits the campaign and inserts the donation on `conn`. The caller owns
/// the transaction.
///
/// The conditional increment takes the campaign row lock, so concurrent
/// donors observe distinct `amount_raised_before` values.
pub(super) async fn record_on(
    conn: &mut PgConnection,
    new_donation: &NewDonation,
) -> RepositoryResult<RecordedDonation> {
    let credit = sqlx::query_as::<_, CreditRow>(
        r#"
        UPDATE campaigns
        SET amount_raised = amount_raised + $2
        WHERE id = $1 AND is_verified
        RETURNING amount_raised - $2 AS amount_raised_before, fee_amount
        "#,
    )
    .bind(new_donation.campaign_id)
    .bind(&new_donation.amount)
    .fetch_optional(&mut *conn)
    .await?;

    let credit = match credit {
        Some(credit) => credit,
        None => {
            let exists: bool =
                sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM campaigns WHERE id = $1)")
                    .bind(new_donation.campaign_id)
                    .fetch_one(&mut *conn)
                    .await?;
            return Err(if exists {
                RepositoryError::Rejected("Campaign is not verified".to_string())
            } else {
                RepositoryError::NotFound("Campaign".to_string())
            });
        }
    };

    let donation = Donation::new(new_donation.clone());
    let row = sqlx::query_as::<_, DonationRow>(
        r#"
        INSERT INTO donations (
            id, donor_id, campaign_id, amount, anonymous, message, payment_method, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(donation.id)
    .bind(donation.donor_id)
    .bind(donation.campaign_id)
    .bind(&donation.amount)
    .bind(donation.anonymous)
    .bind(&donation.message)
    .bind(donation.payment_method.as_str())
    .bind(donation.created_at)
    .fetch_one(&mut *conn)
    .await?;

    Ok(RecordedDonation {
        donation: row.into_domain()?,
        amount_raised_before: credit.amount_raised_before,
        fee_amount: credit.fee_amount,
    })
}

fn into_domain_all(rows: Vec<DonationRow>) -> RepositoryResult<Vec<Donation>> {
    rows.into_iter().map(DonationRow::into_domain).collect()
}

#[async_trait]
impl DonationRepository for PostgresDonationRepository {
    async fn record(&self, donation: &NewDonation) -> RepositoryResult<RecordedDonation> {
        let mut tx = self.pool.begin().await?;
        let recorded = record_on(&mut *tx, donation).await?;
        tx.commit().await?;
        Ok(recorded)
    }

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Donation> {
        let row = sqlx::query_as::<_, DonationRow>("SELECT * FROM donations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.ok_or_else(|| RepositoryError::NotFound("Donation".to_string()))?
            .into_domain()
    }

    async fn list_by_donor(&self, donor_id: Uuid) -> RepositoryResult<Vec<Donation>> {
        let rows = sqlx::query_as::<_, DonationRow>(
            "SELECT * FROM donations WHERE donor_id = $1 ORDER BY created_at DESC, id",
        )
        .bind(donor_id)
        .fetch_all(&self.pool)
        .await?;

        into_domain_all(rows)
    }

    async fn list_recent_for_campaign(
        &self,
        campaign_id: Uuid,
        limit: i64,
    ) -> RepositoryResult<Vec<Donation>> {
        let rows = sqlx::query_as::<_, DonationRow>(
            "SELECT * FROM donations WHERE campaign_id = $1 ORDER BY created_at DESC, id LIMIT $2",
        )
        .bind(campaign_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        into_domain_all(rows)
    }

    async fn count_for_campaign(&self, campaign_id: Uuid) -> RepositoryResult<i64> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM donations WHERE campaign_id = $1")
            .bind(campaign_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn list_all(&self, limit: i64, offset: i64) -> RepositoryResult<Vec<Donation>> {
        let rows = sqlx::query_as::<_, DonationRow>(
            "SELECT * FROM donations ORDER BY created_at DESC, id LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        into_domain_all(rows)
    }

    async fn cancel(&self, id: Uuid) -> RepositoryResult<Donation> {
        let mut tx = self.pool.begin().await?;

        let offer_statuses: Vec<String> = sqlx::query_scalar(
            "SELECT status FROM redirect_offers WHERE source_donation_id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;
        if offer_statuses
            .iter()
            .any(|status| status == RedirectStatus::Redirected.as_str())
        {
            return Err(RepositoryError::Rejected(
                "Donation surplus was already redirected".to_string(),
            ));
        }

        let row = sqlx::query_as::<_, DonationRow>("DELETE FROM donations WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| RepositoryError::NotFound("Donation".to_string()))?;

        sqlx::query("UPDATE campaigns SET amount_raised = amount_raised - $2 WHERE id = $1")
            .bind(row.campaign_id)
            .bind(&row.amount)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            UPDATE redirect_offers
            SET status = 'skipped', resolved_at = NOW()
            WHERE source_donation_id = $1 AND status = 'awaiting'
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        row.into_domain()
    }

    async fn totals(&self) -> RepositoryResult<DonationTotals> {
        let (count, amount, distinct_donors): (i64, BigDecimal, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(amount), 0), COUNT(DISTINCT donor_id) FROM donations",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(DonationTotals {
            count,
            amount,
            distinct_donors,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DonationRow {
    id: Uuid,
    donor_id: Uuid,
    campaign_id: Uuid,
    amount: BigDecimal,
    anonymous: bool,
    message: Option<String>,
    payment_method: String,
    created_at: DateTime<Utc>,
}

impl DonationRow {
    fn into_domain(self) -> RepositoryResult<Donation> {
        let payment_method = self
            .payment_method
            .parse::<PaymentMethod>()
            .map_err(RepositoryError::Backend)?;
        Ok(Donation {
            id: self.id,
            donor_id: self.donor_id,
            campaign_id: self.campaign_id,
            amount: self.amount,
            anonymous: self.anonymous,
            message: self.message,
            payment_method,
            created_at: self.created_at,
        })
    }
}
