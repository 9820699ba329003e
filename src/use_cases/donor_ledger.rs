//! Donor-facing history and cancellation.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::Donation;
use crate::error::AppError;
use crate::ports::{CampaignRepository, DonationRepository, RepositoryError};
use crate::use_cases::CampaignSummary;

#[derive(Debug, Clone, Serialize)]
pub struct DonorHistory {
    pub donations: Vec<Donation>,
    pub total_donated: BigDecimal,
    pub campaigns_supported: usize,
}

impl DonorHistory {
    pub fn from_donations(donations: Vec<Donation>) -> Self {
        let total_donated = donations
            .iter()
            .fold(BigDecimal::from(0), |sum, d| sum + &d.amount);
        let campaigns_supported = donations
            .iter()
            .map(|d| d.campaign_id)
            .collect::<HashSet<_>>()
            .len();
        Self {
            donations,
            total_donated,
            campaigns_supported,
        }
    }
}

/// A campaign the donor has given to, with the donor's own contribution.
#[derive(Debug, Clone, Serialize)]
pub struct SupportedCampaign {
    #[serde(flatten)]
    pub summary: CampaignSummary,
    pub my_total_donation: BigDecimal,
    pub my_donation_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SupportedCampaigns {
    pub campaigns: Vec<SupportedCampaign>,
    pub count: usize,
}

/// Per-campaign totals of `donations`, ordered by first appearance.
pub fn contributions_by_campaign(donations: &[Donation]) -> Vec<(Uuid, BigDecimal, usize)> {
    let mut totals: Vec<(Uuid, BigDecimal, usize)> = Vec::new();
    for donation in donations {
        match totals.iter_mut().find(|(id, _, _)| *id == donation.campaign_id) {
            Some((_, total, count)) => {
                *total = &*total + &donation.amount;
                *count += 1;
            }
            None => totals.push((donation.campaign_id, donation.amount.clone(), 1)),
        }
    }
    totals
}

/// Checks whether `donor_id` may cancel `donation` at `now`.
pub fn check_cancellable(
    donation: &Donation,
    donor_id: Uuid,
    window: Duration,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    if donation.donor_id != donor_id {
        return Err(AppError::Forbidden(
            "You can only cancel your own donations".to_string(),
        ));
    }
    if donation.is_transfer() {
        return Err(AppError::BadRequest(
            "Redirected surplus cannot be cancelled".to_string(),
        ));
    }
    if now - donation.created_at > window {
        return Err(AppError::BadRequest(format!(
            "Donations can only be cancelled within {} hours",
            window.num_hours()
        )));
    }
    Ok(())
}

#[derive(Clone)]
pub struct DonorLedger {
    donations: Arc<dyn DonationRepository>,
    campaigns: Arc<dyn CampaignRepository>,
    cancel_window: Duration,
}

impl DonorLedger {
    pub fn new(
        donations: Arc<dyn DonationRepository>,
        campaigns: Arc<dyn CampaignRepository>,
        cancel_window: Duration,
    ) -> Self {
        Self {
            donations,
            campaigns,
            cancel_window,
        }
    }

    pub async fn donations_for(&self, donor_id: Uuid) -> Result<DonorHistory, AppError> {
        let donations = self.donations.list_by_donor(donor_id).await?;
        Ok(DonorHistory::from_donations(donations))
    }

    /// Campaigns the donor has given to, most recently supported first.
    pub async fn supported_campaigns(&self, donor_id: Uuid) -> Result<SupportedCampaigns, AppError> {
        let donations = self.donations.list_by_donor(donor_id).await?;

        let mut campaigns = Vec::new();
        for (campaign_id, my_total_donation, my_donation_count) in
            contributions_by_campaign(&donations)
        {
            let campaign = self.campaigns.get_by_id(campaign_id).await?;
            campaigns.push(SupportedCampaign {
                summary: CampaignSummary::from(campaign),
                my_total_donation,
                my_donation_count,
            });
        }

        Ok(SupportedCampaigns {
            count: campaigns.len(),
            campaigns,
        })
    }

    pub async fn get(&self, id: Uuid) -> Result<Donation, AppError> {
        self.donations
            .get_by_id(id)
            .await
            .map_err(|e| not_found_as_donation(id, e))
    }

    pub async fn cancel(&self, id: Uuid, donor_id: Uuid) -> Result<Donation, AppError> {
        let donation = self.get(id).await?;
        if let Err(e) = check_cancellable(&donation, donor_id, self.cancel_window, Utc::now()) {
            tracing::warn!(donation_id = %id, donor_id = %donor_id, error = %e, "Cancellation refused");
            return Err(e);
        }

        let cancelled = self
            .donations
            .cancel(id)
            .await
            .map_err(|e| not_found_as_donation(id, e))?;
        tracing::info!(
            donation_id = %id,
            campaign_id = %cancelled.campaign_id,
            amount = %cancelled.amount,
            "Donation cancelled"
        );
        Ok(cancelled)
    }
}

fn not_found_as_donation(id: Uuid, err: RepositoryError) -> AppError {
    match err {
        RepositoryError::NotFound(_) => AppError::NotFound(format!("Donation {} not found", id)),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::domain::{Campaign, NewCampaign, NewDonation, PaymentMethod};
    use crate::ports::CampaignRepository;

    fn donation(donor_id: Uuid, campaign_id: Uuid, amount: i64, method: PaymentMethod) -> Donation {
        Donation::new(NewDonation {
            donor_id,
            campaign_id,
            amount: BigDecimal::from(amount),
            anonymous: false,
            message: None,
            payment_method: method,
        })
    }

    #[test]
    fn history_sums_amounts_and_counts_distinct_campaigns() {
        let donor = Uuid::new_v4();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let history = DonorHistory::from_donations(vec![
            donation(donor, first, 1000, PaymentMethod::Mpesa),
            donation(donor, first, 500, PaymentMethod::Card),
            donation(donor, second, 250, PaymentMethod::Transfer),
        ]);

        assert_eq!(history.total_donated, BigDecimal::from(1750));
        assert_eq!(history.campaigns_supported, 2);
    }

    #[test]
    fn contributions_group_by_campaign_in_first_seen_order() {
        let donor = Uuid::new_v4();
        let recent = Uuid::new_v4();
        let older = Uuid::new_v4();
        let totals = contributions_by_campaign(&[
            donation(donor, recent, 700, PaymentMethod::Mpesa),
            donation(donor, older, 1000, PaymentMethod::Card),
            donation(donor, recent, 300, PaymentMethod::Bank),
        ]);

        assert_eq!(
            totals,
            vec![
                (recent, BigDecimal::from(1000), 2),
                (older, BigDecimal::from(1000), 1),
            ]
        );
    }

    #[test]
    fn only_the_owner_may_cancel() {
        let d = donation(Uuid::new_v4(), Uuid::new_v4(), 100, PaymentMethod::Card);
        let result = check_cancellable(&d, Uuid::new_v4(), Duration::hours(24), Utc::now());
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[test]
    fn transfers_cannot_be_cancelled() {
        let donor = Uuid::new_v4();
        let d = donation(donor, Uuid::new_v4(), 100, PaymentMethod::Transfer);
        let result = check_cancellable(&d, donor, Duration::hours(24), Utc::now());
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn cancellation_window_is_enforced() {
        let donor = Uuid::new_v4();
        let d = donation(donor, Uuid::new_v4(), 100, PaymentMethod::Bank);
        let window = Duration::hours(24);

        assert!(check_cancellable(&d, donor, window, d.created_at + Duration::hours(23)).is_ok());
        assert!(matches!(
            check_cancellable(&d, donor, window, d.created_at + Duration::hours(25)),
            Err(AppError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn cancel_restores_campaign_total() {
        let store = InMemoryStore::new();
        let mut campaign = Campaign::new(NewCampaign {
            full_name: "Faith Njeri".to_string(),
            academic_level: "Form 2".to_string(),
            school_name: "Kenya High School".to_string(),
            fee_amount: BigDecimal::from(40000),
            story: "f".repeat(60),
            profile_image: None,
        });
        campaign.is_verified = true;
        CampaignRepository::insert(&store, &campaign).await.unwrap();
        let donor = Uuid::new_v4();
        let recorded = store
            .record(&NewDonation {
                donor_id: donor,
                campaign_id: campaign.id,
                amount: BigDecimal::from(5000),
                anonymous: false,
                message: None,
                payment_method: PaymentMethod::Card,
            })
            .await
            .unwrap();
        let ledger = DonorLedger::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Duration::hours(24),
        );

        ledger.cancel(recorded.donation.id, donor).await.unwrap();

        let campaign = CampaignRepository::get_by_id(&store, campaign.id).await.unwrap();
        assert_eq!(campaign.amount_raised, BigDecimal::from(0));
        assert!(matches!(
            ledger.get(recorded.donation.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn supported_campaigns_report_own_contribution() {
        let store = InMemoryStore::new();
        let mut campaign = Campaign::new(NewCampaign {
            full_name: "Kevin Mutua".to_string(),
            academic_level: "Form 1".to_string(),
            school_name: "Machakos School".to_string(),
            fee_amount: BigDecimal::from(20000),
            story: "k".repeat(60),
            profile_image: None,
        });
        campaign.is_verified = true;
        CampaignRepository::insert(&store, &campaign).await.unwrap();
        let donor = Uuid::new_v4();
        for (who, amount) in [(donor, 1500), (Uuid::new_v4(), 4000), (donor, 500)] {
            store
                .record(&NewDonation {
                    donor_id: who,
                    campaign_id: campaign.id,
                    amount: BigDecimal::from(amount),
                    anonymous: false,
                    message: None,
                    payment_method: PaymentMethod::Mpesa,
                })
                .await
                .unwrap();
        }
        let ledger = DonorLedger::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Duration::hours(24),
        );

        let supported = ledger.supported_campaigns(donor).await.unwrap();

        assert_eq!(supported.count, 1);
        let entry = &supported.campaigns[0];
        assert_eq!(entry.summary.campaign.id, campaign.id);
        assert_eq!(entry.my_total_donation, BigDecimal::from(2000));
        assert_eq!(entry.my_donation_count, 2);
        assert_eq!(entry.summary.campaign.amount_raised, BigDecimal::from(6000));

        let nobody = ledger.supported_campaigns(Uuid::new_v4()).await.unwrap();
        assert_eq!(nobody.count, 0);
    }
}
