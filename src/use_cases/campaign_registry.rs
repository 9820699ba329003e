//! Campaign registry use case.
//! Creates, updates and presents campaigns.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Campaign, CampaignChanges, Donation, NewCampaign};
use crate::error::AppError;
use crate::ports::{CampaignRepository, DonationRepository, FollowRepository, RepositoryError};
use crate::validation::{
    sanitize_string, validate_max_len, validate_min_len, validate_money_amount,
    validate_required, ValidationError, ValidationErrors, ACADEMIC_LEVEL_MAX_LEN,
    FULL_NAME_MAX_LEN, PROFILE_IMAGE_MAX_LEN, SCHOOL_NAME_MAX_LEN, STORY_MIN_LEN,
};

pub const RECENT_DONATIONS_LIMIT: i64 = 5;

/// Campaign fields as submitted. Required on create, optional on update.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CampaignInput {
    pub full_name: Option<String>,
    pub academic_level: Option<String>,
    pub school_name: Option<String>,
    pub fee_amount: Option<BigDecimal>,
    pub story: Option<String>,
    pub profile_image: Option<String>,
}

fn check_text(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: &str,
    max_len: usize,
) -> String {
    let value = sanitize_string(value);
    errors.check(validate_required(field, &value));
    errors.check(validate_max_len(field, &value, max_len));
    value
}

fn check_story(errors: &mut ValidationErrors, story: &str) -> String {
    let story = story.trim().to_string();
    errors.check(validate_min_len("story", &story, STORY_MIN_LEN));
    story
}

fn check_profile_image(errors: &mut ValidationErrors, image: &str) -> String {
    let image = image.trim().to_string();
    errors.check(validate_required("profile_image", &image));
    errors.check(validate_max_len("profile_image", &image, PROFILE_IMAGE_MAX_LEN));
    image
}

fn missing(errors: &mut ValidationErrors, field: &'static str) {
    errors.push(ValidationError::new(field, "is required"));
}

pub fn validate_new_campaign(input: &CampaignInput) -> Result<NewCampaign, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let full_name = match &input.full_name {
        Some(value) => check_text(&mut errors, "full_name", value, FULL_NAME_MAX_LEN),
        None => {
            missing(&mut errors, "full_name");
            String::new()
        }
    };
    let academic_level = match &input.academic_level {
        Some(value) => check_text(&mut errors, "academic_level", value, ACADEMIC_LEVEL_MAX_LEN),
        None => {
            missing(&mut errors, "academic_level");
            String::new()
        }
    };
    let school_name = match &input.school_name {
        Some(value) => check_text(&mut errors, "school_name", value, SCHOOL_NAME_MAX_LEN),
        None => {
            missing(&mut errors, "school_name");
            String::new()
        }
    };
    let story = match &input.story {
        Some(value) => check_story(&mut errors, value),
        None => {
            missing(&mut errors, "story");
            String::new()
        }
    };
    let fee_amount = match &input.fee_amount {
        Some(amount) => {
            errors.check(validate_money_amount("fee_amount", amount));
            amount.clone()
        }
        None => {
            missing(&mut errors, "fee_amount");
            BigDecimal::from(0)
        }
    };
    let profile_image = input
        .profile_image
        .as_deref()
        .map(|image| check_profile_image(&mut errors, image));

    errors.into_result(NewCampaign {
        full_name,
        academic_level,
        school_name,
        fee_amount,
        story,
        profile_image,
    })
}

pub fn validate_campaign_changes(input: &CampaignInput) -> Result<CampaignChanges, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let changes = CampaignChanges {
        full_name: input
            .full_name
            .as_deref()
            .map(|value| check_text(&mut errors, "full_name", value, FULL_NAME_MAX_LEN)),
        academic_level: input
            .academic_level
            .as_deref()
            .map(|value| check_text(&mut errors, "academic_level", value, ACADEMIC_LEVEL_MAX_LEN)),
        school_name: input
            .school_name
            .as_deref()
            .map(|value| check_text(&mut errors, "school_name", value, SCHOOL_NAME_MAX_LEN)),
        fee_amount: input.fee_amount.as_ref().map(|amount| {
            errors.check(validate_money_amount("fee_amount", amount));
            amount.clone()
        }),
        story: input.story.as_deref().map(|value| check_story(&mut errors, value)),
        profile_image: input
            .profile_image
            .as_deref()
            .map(|image| check_profile_image(&mut errors, image)),
    };

    errors.into_result(changes)
}

/// A campaign with its derived progress figures.
#[derive(Debug, Clone, Serialize)]
pub struct CampaignSummary {
    #[serde(flatten)]
    pub campaign: Campaign,
    pub percentage_raised: BigDecimal,
    pub remaining_amount: BigDecimal,
    pub goal_reached: bool,
}

impl From<Campaign> for CampaignSummary {
    fn from(campaign: Campaign) -> Self {
        Self {
            percentage_raised: campaign.percentage_raised(),
            remaining_amount: campaign.remaining_need(),
            goal_reached: campaign.goal_reached(),
            campaign,
        }
    }
}

/// Donation as shown on a public campaign page.
#[derive(Debug, Clone, Serialize)]
pub struct PublicDonation {
    pub amount: BigDecimal,
    pub anonymous: bool,
    pub donor_id: Option<Uuid>,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Donation> for PublicDonation {
    fn from(donation: Donation) -> Self {
        Self {
            donor_id: (!donation.anonymous).then_some(donation.donor_id),
            amount: donation.amount,
            anonymous: donation.anonymous,
            message: donation.message,
            created_at: donation.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CampaignDetail {
    #[serde(flatten)]
    pub summary: CampaignSummary,
    pub recent_donations: Vec<PublicDonation>,
    pub total_donations: i64,
    pub followers_count: i64,
}

#[derive(Clone)]
pub struct CampaignRegistry {
    campaigns: Arc<dyn CampaignRepository>,
    donations: Arc<dyn DonationRepository>,
    follows: Arc<dyn FollowRepository>,
}

impl CampaignRegistry {
    pub fn new(
        campaigns: Arc<dyn CampaignRepository>,
        donations: Arc<dyn DonationRepository>,
        follows: Arc<dyn FollowRepository>,
    ) -> Self {
        Self {
            campaigns,
            donations,
            follows,
        }
    }

    pub async fn create(&self, input: &CampaignInput) -> Result<CampaignSummary, AppError> {
        let new_campaign = validate_new_campaign(input)?;
        let campaign = self.campaigns.insert(&Campaign::new(new_campaign)).await?;
        tracing::info!(campaign_id = %campaign.id, "Campaign created");
        Ok(campaign.into())
    }

    pub async fn update(&self, id: Uuid, input: &CampaignInput) -> Result<CampaignSummary, AppError> {
        let changes = validate_campaign_changes(input)?;
        if changes.is_empty() {
            return Err(AppError::BadRequest("No fields to update".to_string()));
        }
        let campaign = self
            .campaigns
            .update(id, &changes)
            .await
            .map_err(|e| not_found_as_campaign(id, e))?;
        tracing::info!(campaign_id = %id, "Campaign updated");
        Ok(campaign.into())
    }

    pub async fn get(&self, id: Uuid) -> Result<Campaign, AppError> {
        self.campaigns
            .get_by_id(id)
            .await
            .map_err(|e| not_found_as_campaign(id, e))
    }

    pub async fn detail(&self, id: Uuid) -> Result<CampaignDetail, AppError> {
        let campaign = self.get(id).await?;
        let recent = self
            .donations
            .list_recent_for_campaign(id, RECENT_DONATIONS_LIMIT)
            .await?;
        let total_donations = self.donations.count_for_campaign(id).await?;
        let followers_count = self.follows.follower_count(id).await?;

        Ok(CampaignDetail {
            summary: campaign.into(),
            recent_donations: recent.into_iter().map(PublicDonation::from).collect(),
            total_donations,
            followers_count,
        })
    }

    pub async fn list(&self, verified_only: bool) -> Result<Vec<CampaignSummary>, AppError> {
        let campaigns = self.campaigns.list(verified_only).await?;
        Ok(campaigns.into_iter().map(CampaignSummary::from).collect())
    }
}

pub(crate) fn not_found_as_campaign(id: Uuid, err: RepositoryError) -> AppError {
    match err {
        RepositoryError::NotFound(_) => AppError::NotFound(format!("Campaign {} not found", id)),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;
    use crate::domain::{NewDonation, PaymentMethod};

    fn valid_input() -> CampaignInput {
        CampaignInput {
            full_name: Some("Grace Akinyi".to_string()),
            academic_level: Some("University Year 1".to_string()),
            school_name: Some("University of Nairobi".to_string()),
            fee_amount: Some(BigDecimal::from(65000)),
            story: Some(
                "Grace scored an A in KCSE and was admitted to study medicine this year.".to_string(),
            ),
            profile_image: None,
        }
    }

    fn registry(store: &InMemoryStore) -> CampaignRegistry {
        CampaignRegistry::new(
            Arc::new(store.clone()),
            Arc::new(store.clone()),
            Arc::new(store.clone()),
        )
    }

    #[test]
    fn new_campaign_requires_every_field() {
        let errors = validate_new_campaign(&CampaignInput::default()).unwrap_err();
        for field in ["full_name", "academic_level", "school_name", "fee_amount", "story"] {
            assert_eq!(errors.get(field), Some("is required"), "{}", field);
        }
    }

    #[test]
    fn story_must_be_at_least_fifty_characters() {
        let input = CampaignInput {
            story: Some("Too short".to_string()),
            ..valid_input()
        };
        let errors = validate_new_campaign(&input).unwrap_err();
        assert_eq!(errors.get("story"), Some("must be at least 50 characters"));
    }

    #[test]
    fn fee_amount_must_be_positive() {
        let input = CampaignInput {
            fee_amount: Some(BigDecimal::from(0)),
            ..valid_input()
        };
        assert!(validate_new_campaign(&input).is_err());

        let input = CampaignInput {
            fee_amount: Some("65000.125".parse().expect("valid decimal")),
            ..valid_input()
        };
        let errors = validate_new_campaign(&input).unwrap_err();
        assert_eq!(
            errors.get("fee_amount"),
            Some("Amount must have at most 2 decimal places")
        );
    }

    #[test]
    fn multi_line_names_keep_word_breaks() {
        let input = CampaignInput {
            school_name: Some("Alliance\nHigh\tSchool".to_string()),
            ..valid_input()
        };
        let campaign = validate_new_campaign(&input).expect("valid");
        assert_eq!(campaign.school_name, "Alliance High School");
    }

    #[test]
    fn changes_only_validate_supplied_fields() {
        let input = CampaignInput {
            school_name: Some("  Kenyatta   University ".to_string()),
            ..Default::default()
        };
        let changes = validate_campaign_changes(&input).expect("valid");
        assert_eq!(changes.school_name.as_deref(), Some("Kenyatta University"));
        assert!(changes.full_name.is_none());

        let input = CampaignInput {
            full_name: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(validate_campaign_changes(&input).is_err());
    }

    #[test]
    fn anonymous_donations_hide_donor() {
        let donation = Donation::new(NewDonation {
            donor_id: Uuid::new_v4(),
            campaign_id: Uuid::new_v4(),
            amount: BigDecimal::from(100),
            anonymous: true,
            message: None,
            payment_method: PaymentMethod::Card,
        });
        assert!(PublicDonation::from(donation).donor_id.is_none());
    }

    #[tokio::test]
    async fn created_campaign_is_unverified_and_hidden_from_verified_list() {
        let store = InMemoryStore::new();
        let registry = registry(&store);

        let created = registry.create(&valid_input()).await.expect("created");

        assert!(!created.campaign.is_verified);
        assert_eq!(created.remaining_amount, BigDecimal::from(65000));
        assert!(registry.list(true).await.unwrap().is_empty());
        assert_eq!(registry.list(false).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn empty_update_is_rejected() {
        let store = InMemoryStore::new();
        let registry = registry(&store);
        let created = registry.create(&valid_input()).await.unwrap();

        let result = registry.update(created.campaign.id, &CampaignInput::default()).await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn detail_of_unknown_campaign_is_not_found() {
        let store = InMemoryStore::new();
        let result = registry(&store).detail(Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
