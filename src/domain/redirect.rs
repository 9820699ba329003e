//! Surplus redirect offer.
//! The persisted form of a donor's pending choice after a goal was exceeded.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::Campaign;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedirectStatus {
    Awaiting,
    Redirected,
    Skipped,
}

impl RedirectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RedirectStatus::Awaiting => "awaiting",
            RedirectStatus::Redirected => "redirected",
            RedirectStatus::Skipped => "skipped",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, RedirectStatus::Awaiting)
    }
}

impl fmt::Display for RedirectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RedirectStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "awaiting" => Ok(RedirectStatus::Awaiting),
            "redirected" => Ok(RedirectStatus::Redirected),
            "skipped" => Ok(RedirectStatus::Skipped),
            other => Err(format!("unknown redirect status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedirectOffer {
    pub id: Uuid,
    pub source_donation_id: Uuid,
    pub source_campaign_id: Uuid,
    pub donor_id: Uuid,
    pub excess: BigDecimal,
    pub status: RedirectStatus,
    pub redirect_donation_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl RedirectOffer {
    pub fn new(
        source_donation_id: Uuid,
        source_campaign_id: Uuid,
        donor_id: Uuid,
        excess: BigDecimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_donation_id,
            source_campaign_id,
            donor_id,
            excess,
            status: RedirectStatus::Awaiting,
            redirect_donation_id: None,
            created_at: Utc::now(),
            resolved_at: None,
        }
    }

    pub fn mark_skipped(&mut self) {
        self.status = RedirectStatus::Skipped;
        self.resolved_at = Some(Utc::now());
    }

    pub fn mark_redirected(&mut self, redirect_donation_id: Uuid) {
        self.status = RedirectStatus::Redirected;
        self.redirect_donation_id = Some(redirect_donation_id);
        self.resolved_at = Some(Utc::now());
    }
}

/// A campaign that may receive redirected surplus, annotated with its own
/// remaining need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedirectCandidate {
    pub campaign_id: Uuid,
    pub full_name: String,
    pub school_name: String,
    pub fee_amount: BigDecimal,
    pub amount_raised: BigDecimal,
    pub remaining_need: BigDecimal,
}

impl From<&Campaign> for RedirectCandidate {
    fn from(campaign: &Campaign) -> Self {
        Self {
            campaign_id: campaign.id,
            full_name: campaign.full_name.clone(),
            school_name: campaign.school_name.clone(),
            fee_amount: campaign.fee_amount.clone(),
            amount_raised: campaign.amount_raised.clone(),
            remaining_need: campaign.remaining_need(),
        }
    }
}
