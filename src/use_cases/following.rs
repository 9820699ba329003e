use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Campaign, Supporter};
use crate::error::AppError;
use crate::ports::{CampaignRepository, FollowRepository, RepositoryError};
use crate::use_cases::campaign_registry::not_found_as_campaign;

#[derive(Debug, Clone, Serialize)]
pub struct CampaignSupporters {
    pub supporters: Vec<Supporter>,
    pub count: usize,
}

/// Donors following campaigns for updates.
#[derive(Clone)]
pub struct Following {
    campaigns: Arc<dyn CampaignRepository>,
    follows: Arc<dyn FollowRepository>,
}

impl Following {
    pub fn new(campaigns: Arc<dyn CampaignRepository>, follows: Arc<dyn FollowRepository>) -> Self {
        Self { campaigns, follows }
    }

    async fn ensure_campaign(&self, campaign_id: Uuid) -> Result<(), AppError> {
        self.campaigns
            .get_by_id(campaign_id)
            .await
            .map(|_| ())
            .map_err(|e| not_found_as_campaign(campaign_id, e))
    }

    pub async fn follow(&self, donor_id: Uuid, campaign_id: Uuid) -> Result<(), AppError> {
        self.ensure_campaign(campaign_id).await?;
        self.follows
            .follow(donor_id, campaign_id)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => {
                    AppError::Conflict("Already following this campaign".to_string())
                }
                other => other.into(),
            })?;
        tracing::info!(donor_id = %donor_id, campaign_id = %campaign_id, "Campaign followed");
        Ok(())
    }

    pub async fn unfollow(&self, donor_id: Uuid, campaign_id: Uuid) -> Result<(), AppError> {
        self.ensure_campaign(campaign_id).await?;
        self.follows
            .unfollow(donor_id, campaign_id)
            .await
            .map_err(|e| match e {
                RepositoryError::Rejected(_) => {
                    AppError::BadRequest("Not following this campaign".to_string())
                }
                other => other.into(),
            })?;
        tracing::info!(donor_id = %donor_id, campaign_id = %campaign_id, "Campaign unfollowed");
        Ok(())
    }

    pub async fn followed(&self, donor_id: Uuid) -> Result<Vec<Campaign>, AppError> {
        Ok(self.follows.followed_by(donor_id).await?)
    }

    pub async fn is_following(&self, donor_id: Uuid, campaign_id: Uuid) -> Result<bool, AppError> {
        self.ensure_campaign(campaign_id).await?;
        Ok(self.follows.is_following(donor_id, campaign_id).await?)
    }

    pub async fn supporters(&self, campaign_id: Uuid) -> Result<CampaignSupporters, AppError> {
        self.ensure_campaign(campaign_id).await?;
        let supporters = self.follows.followers_of(campaign_id).await?;
        Ok(CampaignSupporters {
            count: supporters.len(),
            supporters,
        })
    }
}
