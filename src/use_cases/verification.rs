//! Admin verification of campaigns and dashboard figures.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Campaign, Donation};
use crate::error::AppError;
use crate::ports::{CampaignRepository, DonationRepository};
use crate::use_cases::campaign_registry::not_found_as_campaign;

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationAction {
    Approve,
    Reject,
}

impl VerificationAction {
    fn verified(self) -> bool {
        matches!(self, VerificationAction::Approve)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_campaigns: i64,
    pub verified_campaigns: i64,
    pub pending_verification: i64,
    pub total_donors: i64,
    pub total_donations: i64,
    pub total_amount_raised: BigDecimal,
}

/// Clamps a requested page to sane bounds.
pub fn page_bounds(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let offset = offset.unwrap_or(0).max(0);
    (limit, offset)
}

#[derive(Clone)]
pub struct Verification {
    campaigns: Arc<dyn CampaignRepository>,
    donations: Arc<dyn DonationRepository>,
}

impl Verification {
    pub fn new(
        campaigns: Arc<dyn CampaignRepository>,
        donations: Arc<dyn DonationRepository>,
    ) -> Self {
        Self {
            campaigns,
            donations,
        }
    }

    pub async fn pending(&self) -> Result<Vec<Campaign>, AppError> {
        let campaigns = self.campaigns.list(false).await?;
        Ok(campaigns
            .into_iter()
            .filter(|campaign| !campaign.is_verified)
            .collect())
    }

    pub async fn verify(&self, id: Uuid, action: VerificationAction) -> Result<Campaign, AppError> {
        let campaign = self
            .campaigns
            .set_verified(id, action.verified())
            .await
            .map_err(|e| not_found_as_campaign(id, e))?;
        tracing::info!(campaign_id = %id, verified = campaign.is_verified, "Campaign verification changed");
        Ok(campaign)
    }

    pub async fn stats(&self) -> Result<DashboardStats, AppError> {
        let counts = self.campaigns.counts().await?;
        let totals = self.donations.totals().await?;
        Ok(DashboardStats {
            total_campaigns: counts.total,
            verified_campaigns: counts.verified,
            pending_verification: counts.pending,
            total_donors: totals.distinct_donors,
            total_donations: totals.count,
            total_amount_raised: totals.amount,
        })
    }

    pub async fn all_donations(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<Donation>, AppError> {
        let (limit, offset) = page_bounds(limit, offset);
        Ok(self.donations.list_all(limit, offset).await?)
    }
}
