//! In-memory adapter.
//! Backs every repository port with one lock-guarded state, so each
//! operation is serialized just like the row-locking Postgres queries.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{
    Campaign, CampaignChanges, Donation, NewDonation, RecordedDonation, RedirectOffer,
    RedirectStatus, Supporter,
};
use crate::ports::{
    CampaignCounts, CampaignRepository, DonationRepository, DonationTotals, FollowRepository,
    RedirectOfferRepository, RepositoryError, RepositoryResult,
};

#[derive(Default)]
struct State {
    campaigns: Vec<Campaign>,
    donations: Vec<Donation>,
    offers: HashMap<Uuid, RedirectOffer>,
    follows: Vec<(Uuid, Uuid, DateTime<Utc>)>,
}

impl State {
    fn campaign_mut(&mut self, id: Uuid) -> RepositoryResult<&mut Campaign> {
        self.campaigns
            .iter_mut()
            .find(|campaign| campaign.id == id)
            .ok_or_else(|| RepositoryError::NotFound("Campaign".to_string()))
    }

    fn campaign(&self, id: Uuid) -> RepositoryResult<&Campaign> {
        self.campaigns
            .iter()
            .find(|campaign| campaign.id == id)
            .ok_or_else(|| RepositoryError::NotFound("Campaign".to_string()))
    }

    fn record(&mut self, new_donation: &NewDonation) -> RepositoryResult<RecordedDonation> {
        let campaign = self.campaign_mut(new_donation.campaign_id)?;
        if !campaign.is_verified {
            return Err(RepositoryError::Rejected(
                "Campaign is not verified".to_string(),
            ));
        }
        let amount_raised_before = campaign.amount_raised.clone();
        campaign.amount_raised = &campaign.amount_raised + &new_donation.amount;
        let fee_amount = campaign.fee_amount.clone();

        let donation = Donation::new(new_donation.clone());
        self.donations.push(donation.clone());

        Ok(RecordedDonation {
            donation,
            amount_raised_before,
            fee_amount,
        })
    }

    fn awaiting_offer(&self, id: Uuid) -> RepositoryResult<&RedirectOffer> {
        let offer = self
            .offers
            .get(&id)
            .ok_or_else(|| RepositoryError::NotFound("Redirect offer".to_string()))?;
        if offer.status != RedirectStatus::Awaiting {
            return Err(RepositoryError::Conflict(format!(
                "Redirect offer is already {}",
                offer.status
            )));
        }
        Ok(offer)
    }
}

/// Shared in-memory store. Clones share the same state.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CampaignRepository for InMemoryStore {
    async fn insert(&self, campaign: &Campaign) -> RepositoryResult<Campaign> {
        let mut state = self.state.write().await;
        if state.campaigns.iter().any(|c| c.id == campaign.id) {
            return Err(RepositoryError::Conflict(format!(
                "Campaign {} already exists",
                campaign.id
            )));
        }
        state.campaigns.push(campaign.clone());
        Ok(campaign.clone())
    }

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Campaign> {
        self.state.read().await.campaign(id).cloned()
    }

    async fn list(&self, verified_only: bool) -> RepositoryResult<Vec<Campaign>> {
        let state = self.state.read().await;
        Ok(state
            .campaigns
            .iter()
            .filter(|campaign| !verified_only || campaign.is_verified)
            .cloned()
            .collect())
    }

    async fn update(&self, id: Uuid, changes: &CampaignChanges) -> RepositoryResult<Campaign> {
        let mut state = self.state.write().await;
        let campaign = state.campaign_mut(id)?;
        campaign.apply(changes.clone());
        Ok(campaign.clone())
    }

    async fn set_verified(&self, id: Uuid, verified: bool) -> RepositoryResult<Campaign> {
        let mut state = self.state.write().await;
        let campaign = state.campaign_mut(id)?;
        campaign.is_verified = verified;
        Ok(campaign.clone())
    }

    async fn list_fundable(&self, exclude_id: Uuid) -> RepositoryResult<Vec<Campaign>> {
        let state = self.state.read().await;
        Ok(state
            .campaigns
            .iter()
            .filter(|campaign| campaign.id != exclude_id && campaign.is_fundable())
            .cloned()
            .collect())
    }

    async fn counts(&self) -> RepositoryResult<CampaignCounts> {
        let state = self.state.read().await;
        let total = state.campaigns.len() as i64;
        let verified = state.campaigns.iter().filter(|c| c.is_verified).count() as i64;
        Ok(CampaignCounts {
            total,
            verified,
            pending: total - verified,
        })
    }
}

#[async_trait]
impl DonationRepository for InMemoryStore {
    async fn record(&self, donation: &NewDonation) -> RepositoryResult<RecordedDonation> {
        self.state.write().await.record(donation)
    }

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<Donation> {
        let state = self.state.read().await;
        state
            .donations
            .iter()
            .find(|donation| donation.id == id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound("Donation".to_string()))
    }

    async fn list_by_donor(&self, donor_id: Uuid) -> RepositoryResult<Vec<Donation>> {
        let state = self.state.read().await;
        Ok(state
            .donations
            .iter()
            .rev()
            .filter(|donation| donation.donor_id == donor_id)
            .cloned()
            .collect())
    }

    async fn list_recent_for_campaign(
        &self,
        campaign_id: Uuid,
        limit: i64,
    ) -> RepositoryResult<Vec<Donation>> {
        let state = self.state.read().await;
        Ok(state
            .donations
            .iter()
            .rev()
            .filter(|donation| donation.campaign_id == campaign_id)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn count_for_campaign(&self, campaign_id: Uuid) -> RepositoryResult<i64> {
        let state = self.state.read().await;
        Ok(state
            .donations
            .iter()
            .filter(|donation| donation.campaign_id == campaign_id)
            .count() as i64)
    }

    async fn list_all(&self, limit: i64, offset: i64) -> RepositoryResult<Vec<Donation>> {
        let state = self.state.read().await;
        Ok(state
            .donations
            .iter()
            .rev()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn cancel(&self, id: Uuid) -> RepositoryResult<Donation> {
        let mut state = self.state.write().await;
        let index = state
            .donations
            .iter()
            .position(|donation| donation.id == id)
            .ok_or_else(|| RepositoryError::NotFound("Donation".to_string()))?;
        if state.offers.values().any(|offer| {
            offer.source_donation_id == id && offer.status == RedirectStatus::Redirected
        }) {
            return Err(RepositoryError::Rejected(
                "Donation surplus was already redirected".to_string(),
            ));
        }

        let donation = state.donations.remove(index);
        if let Ok(campaign) = state.campaign_mut(donation.campaign_id) {
            campaign.amount_raised = &campaign.amount_raised - &donation.amount;
        }
        for offer in state.offers.values_mut() {
            if offer.source_donation_id == id && offer.status == RedirectStatus::Awaiting {
                offer.mark_skipped();
            }
        }
        Ok(donation)
    }

    async fn totals(&self) -> RepositoryResult<DonationTotals> {
        let state = self.state.read().await;
        let amount = state
            .donations
            .iter()
            .fold(BigDecimal::from(0), |sum, donation| sum + &donation.amount);
        let distinct_donors = state
            .donations
            .iter()
            .map(|donation| donation.donor_id)
            .collect::<HashSet<_>>()
            .len() as i64;
        Ok(DonationTotals {
            count: state.donations.len() as i64,
            amount,
            distinct_donors,
        })
    }
}

#[async_trait]
impl RedirectOfferRepository for InMemoryStore {
    async fn insert(&self, offer: &RedirectOffer) -> RepositoryResult<RedirectOffer> {
        let mut state = self.state.write().await;
        if state.offers.contains_key(&offer.id) {
            return Err(RepositoryError::Conflict(format!(
                "Redirect offer {} already exists",
                offer.id
            )));
        }
        state.offers.insert(offer.id, offer.clone());
        Ok(offer.clone())
    }

    async fn get_by_id(&self, id: Uuid) -> RepositoryResult<RedirectOffer> {
        let state = self.state.read().await;
        state
            .offers
            .get(&id)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound("Redirect offer".to_string()))
    }

    async fn mark_skipped(&self, id: Uuid) -> RepositoryResult<RedirectOffer> {
        let mut state = self.state.write().await;
        let mut offer = state.awaiting_offer(id)?.clone();
        offer.mark_skipped();
        state.offers.insert(id, offer.clone());
        Ok(offer)
    }

    async fn complete_with_transfer(
        &self,
        id: Uuid,
        transfer: &NewDonation,
    ) -> RepositoryResult<(RedirectOffer, RecordedDonation)> {
        let mut state = self.state.write().await;
        let mut offer = state.awaiting_offer(id)?.clone();
        let recorded = state.record(transfer)?;
        offer.mark_redirected(recorded.donation.id);
        state.offers.insert(id, offer.clone());
        Ok((offer, recorded))
    }
}

#[async_trait]
impl FollowRepository for InMemoryStore {
    async fn follow(&self, donor_id: Uuid, campaign_id: Uuid) -> RepositoryResult<()> {
        let mut state = self.state.write().await;
        if state
            .follows
            .iter()
            .any(|(donor, campaign, _)| *donor == donor_id && *campaign == campaign_id)
        {
            return Err(RepositoryError::Conflict(
                "Already following this campaign".to_string(),
            ));
        }
        state.follows.push((donor_id, campaign_id, Utc::now()));
        Ok(())
    }

    async fn unfollow(&self, donor_id: Uuid, campaign_id: Uuid) -> RepositoryResult<()> {
        let mut state = self.state.write().await;
        let before = state.follows.len();
        state
            .follows
            .retain(|(donor, campaign, _)| !(*donor == donor_id && *campaign == campaign_id));
        if state.follows.len() == before {
            return Err(RepositoryError::Rejected(
                "Not following this campaign".to_string(),
            ));
        }
        Ok(())
    }

    async fn followed_by(&self, donor_id: Uuid) -> RepositoryResult<Vec<Campaign>> {
        let state = self.state.read().await;
        Ok(state
            .follows
            .iter()
            .filter(|(donor, _, _)| *donor == donor_id)
            .filter_map(|(_, campaign_id, _)| state.campaign(*campaign_id).ok().cloned())
            .collect())
    }

    async fn is_following(&self, donor_id: Uuid, campaign_id: Uuid) -> RepositoryResult<bool> {
        let state = self.state.read().await;
        Ok(state
            .follows
            .iter()
            .any(|(donor, campaign, _)| *donor == donor_id && *campaign == campaign_id))
    }

    async fn follower_count(&self, campaign_id: Uuid) -> RepositoryResult<i64> {
        let state = self.state.read().await;
        Ok(state
            .follows
            .iter()
            .filter(|(_, campaign, _)| *campaign == campaign_id)
            .count() as i64)
    }

    async fn followers_of(&self, campaign_id: Uuid) -> RepositoryResult<Vec<Supporter>> {
        let state = self.state.read().await;
        Ok(state
            .follows
            .iter()
            .filter(|(_, campaign, _)| *campaign == campaign_id)
            .map(|(donor_id, _, followed_at)| Supporter {
                donor_id: *donor_id,
                followed_at: *followed_at,
            })
            .collect())
    }
}
