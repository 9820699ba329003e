//! Campaign directory use case.
//! Supplies the campaigns that may receive redirected surplus.

use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Campaign, RedirectCandidate};
use crate::ports::{CampaignRepository, RepositoryResult};

/// Keeps only verified, under-goal campaigns other than `exclude_id`, in the
/// order given.
pub fn fundable_candidates(campaigns: &[Campaign], exclude_id: Uuid) -> Vec<RedirectCandidate> {
    campaigns
        .iter()
        .filter(|campaign| campaign.id != exclude_id && campaign.is_fundable())
        .map(RedirectCandidate::from)
        .collect()
}

#[derive(Clone)]
pub struct CampaignDirectory {
    campaigns: Arc<dyn CampaignRepository>,
}

impl CampaignDirectory {
    pub fn new(campaigns: Arc<dyn CampaignRepository>) -> Self {
        Self { campaigns }
    }

    /// An empty list means no redirect targets are available.
    pub async fn list_fundable_campaigns(
        &self,
        exclude_id: Uuid,
    ) -> RepositoryResult<Vec<RedirectCandidate>> {
        let campaigns = self.campaigns.list_fundable(exclude_id).await?;
        Ok(fundable_candidates(&campaigns, exclude_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NewCampaign;
    use bigdecimal::BigDecimal;

    fn campaign(name: &str, fee: i64, raised: i64, verified: bool) -> Campaign {
        let mut campaign = Campaign::new(NewCampaign {
            full_name: name.to_string(),
            academic_level: "Form 3".to_string(),
            school_name: "Alliance High School".to_string(),
            fee_amount: BigDecimal::from(fee),
            story: "s".repeat(60),
            profile_image: None,
        });
        campaign.amount_raised = BigDecimal::from(raised);
        campaign.is_verified = verified;
        campaign
    }

    #[test]
    fn excludes_source_funded_and_unverified_campaigns() {
        let source = campaign("Source", 10000, 11000, true);
        let open = campaign("Open", 20000, 5000, true);
        let funded = campaign("Funded", 20000, 20000, true);
        let unverified = campaign("Unverified", 20000, 0, false);
        let all = vec![source.clone(), open.clone(), funded, unverified];

        let candidates = fundable_candidates(&all, source.id);

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].campaign_id, open.id);
        assert_eq!(candidates[0].remaining_need, BigDecimal::from(15000));
    }

    #[test]
    fn preserves_input_order() {
        let first = campaign("First", 1000, 0, true);
        let second = campaign("Second", 1000, 0, true);
        let third = campaign("Third", 1000, 0, true);
        let all = vec![first.clone(), second.clone(), third.clone()];

        let ids: Vec<Uuid> = fundable_candidates(&all, Uuid::new_v4())
            .into_iter()
            .map(|c| c.campaign_id)
            .collect();

        assert_eq!(ids, vec![first.id, second.id, third.id]);
    }

    #[test]
    fn empty_input_yields_no_candidates() {
        assert!(fundable_candidates(&[], Uuid::new_v4()).is_empty());
    }
}
