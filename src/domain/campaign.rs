//! Campaign domain entity.
//! A student's fundraising profile with a fixed fee goal.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_PROFILE_IMAGE: &str = "/api/placeholder/300/300";

/// Domain entity representing a campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: Uuid,
    pub full_name: String,
    pub academic_level: String,
    pub school_name: String,
    pub fee_amount: BigDecimal,
    pub amount_raised: BigDecimal,
    pub story: String,
    pub profile_image: String,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl Campaign {
    /// Builds an unverified campaign with nothing raised yet.
    pub fn new(input: NewCampaign) -> Self {
        Self {
            id: Uuid::new_v4(),
            full_name: input.full_name,
            academic_level: input.academic_level,
            school_name: input.school_name,
            fee_amount: input.fee_amount,
            amount_raised: BigDecimal::from(0),
            story: input.story,
            profile_image: input
                .profile_image
                .unwrap_or_else(|| DEFAULT_PROFILE_IMAGE.to_string()),
            is_verified: false,
            created_at: Utc::now(),
        }
    }

    pub fn goal_reached(&self) -> bool {
        self.amount_raised >= self.fee_amount
    }

    /// Amount still needed to reach the goal, never negative.
    pub fn remaining_need(&self) -> BigDecimal {
        let remaining = &self.fee_amount - &self.amount_raised;
        if remaining < BigDecimal::from(0) {
            BigDecimal::from(0)
        } else {
            remaining
        }
    }

    pub fn percentage_raised(&self) -> BigDecimal {
        if self.fee_amount <= BigDecimal::from(0) {
            return BigDecimal::from(0);
        }
        (&self.amount_raised * BigDecimal::from(100) / &self.fee_amount).with_scale(2)
    }

    /// A campaign can receive redirected surplus when donors can see it and
    /// its goal is still open.
    pub fn is_fundable(&self) -> bool {
        self.is_verified && !self.goal_reached()
    }

    pub fn apply(&mut self, changes: CampaignChanges) {
        if let Some(full_name) = changes.full_name {
            self.full_name = full_name;
        }
        if let Some(academic_level) = changes.academic_level {
            self.academic_level = academic_level;
        }
        if let Some(school_name) = changes.school_name {
            self.school_name = school_name;
        }
        if let Some(fee_amount) = changes.fee_amount {
            self.fee_amount = fee_amount;
        }
        if let Some(story) = changes.story {
            self.story = story;
        }
        if let Some(profile_image) = changes.profile_image {
            self.profile_image = profile_image;
        }
    }
}

/// Validated input for a new campaign.
#[derive(Debug, Clone)]
pub struct NewCampaign {
    pub full_name: String,
    pub academic_level: String,
    pub school_name: String,
    pub fee_amount: BigDecimal,
    pub story: String,
    pub profile_image: Option<String>,
}

/// Partial update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct CampaignChanges {
    pub full_name: Option<String>,
    pub academic_level: Option<String>,
    pub school_name: Option<String>,
    pub fee_amount: Option<BigDecimal>,
    pub story: Option<String>,
    pub profile_image: Option<String>,
}

impl CampaignChanges {
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.academic_level.is_none()
            && self.school_name.is_none()
            && self.fee_amount.is_none()
            && self.story.is_none()
            && self.profile_image.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn campaign(fee: i64, raised: i64) -> Campaign {
        let mut campaign = Campaign::new(NewCampaign {
            full_name: "Alice Wanjiku".to_string(),
            academic_level: "Form 2".to_string(),
            school_name: "Starehe Girls Centre".to_string(),
            fee_amount: BigDecimal::from(fee),
            story: "x".repeat(60),
            profile_image: None,
        });
        campaign.amount_raised = BigDecimal::from(raised);
        campaign
    }

    #[test]
    fn new_campaign_starts_unverified_and_empty() {
        let c = campaign(45000, 0);
        assert!(!c.is_verified);
        assert_eq!(c.amount_raised, BigDecimal::from(0));
        assert_eq!(c.profile_image, DEFAULT_PROFILE_IMAGE);
    }

    #[test]
    fn remaining_need_is_clamped_at_zero() {
        assert_eq!(campaign(10000, 9000).remaining_need(), BigDecimal::from(1000));
        assert_eq!(campaign(10000, 12000).remaining_need(), BigDecimal::from(0));
    }

    #[test]
    fn goal_reached_includes_exact_total() {
        assert!(!campaign(10000, 9999).goal_reached());
        assert!(campaign(10000, 10000).goal_reached());
    }

    #[test]
    fn percentage_raised_has_two_decimals() {
        let pct = campaign(45000, 32000).percentage_raised();
        assert_eq!(pct.to_string(), "71.11");
    }

    #[test]
    fn fundable_requires_verification_and_open_goal() {
        let mut c = campaign(10000, 5000);
        assert!(!c.is_fundable());
        c.is_verified = true;
        assert!(c.is_fundable());
        c.amount_raised = BigDecimal::from(10000);
        assert!(!c.is_fundable());
    }

    #[test]
    fn apply_only_touches_supplied_fields() {
        let mut c = campaign(10000, 0);
        c.apply(CampaignChanges {
            school_name: Some("Mang'u High School".to_string()),
            ..Default::default()
        });
        assert_eq!(c.school_name, "Mang'u High School");
        assert_eq!(c.full_name, "Alice Wanjiku");
    }
}
