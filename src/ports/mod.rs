//! Repository ports.
//! Use cases depend on these traits; adapters provide Postgres and in-memory
//! implementations.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{
    Campaign, CampaignChanges, Donation, NewDonation, RecordedDonation, RedirectOffer, Supporter,
};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// The operation is well-formed but the stored state does not allow it.
    #[error("{0}")]
    Rejected(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound("row".to_string()),
            other => RepositoryError::Backend(other.to_string()),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CampaignCounts {
    pub total: i64,
    pub verified: i64,
    pub pending: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DonationTotals {
    pub count: i64,
    pub amount: BigDecimal,
    pub distinct_donors: i64,
}

impl Default for DonationTotals {
    fn default() -> Self {
        Self {
            count: 0,
            amount: BigDecimal::from(0),
            distinct_donors: 0,
        }
    }
}

#[async_trait]
pub trait CampaignRepository: Send + Sync {
    async fn insert(&self, campaign: &Campaign) -> RepositoryResult<Campaign>;
    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Campaign>;
    /// Campaigns in creation order.
    async fn list(&self, verified_only: bool) -> RepositoryResult<Vec<Campaign>>;
    async fn update(&self, id: Uuid, changes: &CampaignChanges) -> RepositoryResult<Campaign>;
    async fn set_verified(&self, id: Uuid, verified: bool) -> RepositoryResult<Campaign>;
    /// Verified campaigns under goal, excluding `exclude_id`, in creation order.
    async fn list_fundable(&self, exclude_id: Uuid) -> RepositoryResult<Vec<Campaign>>;
    async fn counts(&self) -> RepositoryResult<CampaignCounts>;
}

#[async_trait]
pub trait DonationRepository: Send + Sync {
    /// Records the donation and credits the campaign in one atomic step.
    /// Fails with `NotFound` for an unknown campaign and `Rejected` for an
    /// unverified one.
    async fn record(&self, donation: &NewDonation) -> RepositoryResult<RecordedDonation>;
    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Donation>;
    /// Newest first.
    async fn list_by_donor(&self, donor_id: Uuid) -> RepositoryResult<Vec<Donation>>;
    /// Newest first.
    async fn list_recent_for_campaign(
        &self,
        campaign_id: Uuid,
        limit: i64,
    ) -> RepositoryResult<Vec<Donation>>;
    async fn count_for_campaign(&self, campaign_id: Uuid) -> RepositoryResult<i64>;
    /// Newest first.
    async fn list_all(&self, limit: i64, offset: i64) -> RepositoryResult<Vec<Donation>>;
    /// Deletes the donation and debits the campaign in one atomic step. An
    /// open redirect offer for it is closed as skipped. Fails with `Rejected`
    /// once its surplus has been redirected.
    async fn cancel(&self, id: Uuid) -> RepositoryResult<Donation>;
    async fn totals(&self) -> RepositoryResult<DonationTotals>;
}

#[async_trait]
pub trait RedirectOfferRepository: Send + Sync {
    async fn insert(&self, offer: &RedirectOffer) -> RepositoryResult<RedirectOffer>;
    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<RedirectOffer>;
    /// Fails with `Conflict` unless the offer is still awaiting.
    async fn mark_skipped(&self, id: Uuid) -> RepositoryResult<RedirectOffer>;
    /// Records the transfer donation, credits its campaign and marks the offer
    /// redirected, all or nothing. Fails with `Conflict` unless the offer is
    /// still awaiting.
    async fn complete_with_transfer(
        &self,
        id: Uuid,
        transfer: &NewDonation,
    ) -> RepositoryResult<(RedirectOffer, RecordedDonation)>;
}

#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Fails with `Conflict` when already following.
    async fn follow(&self, donor_id: Uuid, campaign_id: Uuid) -> RepositoryResult<()>;
    /// Fails with `Rejected` when not following.
    async fn unfollow(&self, donor_id: Uuid, campaign_id: Uuid) -> RepositoryResult<()>;
    async fn followed_by(&self, donor_id: Uuid) -> RepositoryResult<Vec<Campaign>>;
    async fn is_following(&self, donor_id: Uuid, campaign_id: Uuid) -> RepositoryResult<bool>;
    async fn follower_count(&self, campaign_id: Uuid) -> RepositoryResult<i64>;
    /// Followers of a campaign, earliest first.
    async fn followers_of(&self, campaign_id: Uuid) -> RepositoryResult<Vec<Supporter>>;
}
