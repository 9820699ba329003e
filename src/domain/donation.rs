//! Donation domain entity.

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Mpesa,
    Card,
    Bank,
    /// System-generated surplus redirection.
    Transfer,
}

impl PaymentMethod {
    /// Methods a donor may pick at intake.
    pub const DONOR_SELECTABLE: &'static [&'static str] = &["mpesa", "card", "bank"];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Mpesa => "mpesa",
            PaymentMethod::Card => "card",
            PaymentMethod::Bank => "bank",
            PaymentMethod::Transfer => "transfer",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "mpesa" => Ok(PaymentMethod::Mpesa),
            "card" => Ok(PaymentMethod::Card),
            "bank" => Ok(PaymentMethod::Bank),
            "transfer" => Ok(PaymentMethod::Transfer),
            other => Err(format!("unknown payment method '{}'", other)),
        }
    }
}

/// A single recorded contribution. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Donation {
    pub id: Uuid,
    pub donor_id: Uuid,
    pub campaign_id: Uuid,
    pub amount: BigDecimal,
    pub anonymous: bool,
    pub message: Option<String>,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
}

impl Donation {
    pub fn new(input: NewDonation) -> Self {
        Self {
            id: Uuid::new_v4(),
            donor_id: input.donor_id,
            campaign_id: input.campaign_id,
            amount: input.amount,
            anonymous: input.anonymous,
            message: input.message,
            payment_method: input.payment_method,
            created_at: Utc::now(),
        }
    }

    pub fn is_transfer(&self) -> bool {
        self.payment_method == PaymentMethod::Transfer
    }
}

/// Validated request to record a donation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewDonation {
    pub donor_id: Uuid,
    pub campaign_id: Uuid,
    pub amount: BigDecimal,
    pub anonymous: bool,
    pub message: Option<String>,
    pub payment_method: PaymentMethod,
}

/// A donation together with the campaign totals observed by the write that
/// recorded it.
#[derive(Debug, Clone)]
pub struct RecordedDonation {
    pub donation: Donation,
    pub amount_raised_before: BigDecimal,
    pub fee_amount: BigDecimal,
}
