//! Donation intake use case.
//! Validates a donor-initiated contribution, records it and hands the result
//! to the goal reconciler.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Donation, NewDonation, PaymentMethod};
use crate::error::AppError;
use crate::ports::{DonationRepository, RepositoryError};
use crate::use_cases::{GoalReconciler, Reconciliation};
use crate::validation::{
    sanitize_string, validate_enum, validate_kenyan_msisdn, validate_max_len,
    validate_money_amount, ValidationError, ValidationErrors, DONATION_MESSAGE_MAX_LEN,
};

/// Raw donation input as submitted by the donor.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DonationRequest {
    pub donor_id: Option<Uuid>,
    pub amount: Option<BigDecimal>,
    #[serde(alias = "paymentMethod")]
    pub payment_method: Option<String>,
    #[serde(alias = "phoneNumber")]
    pub phone_number: Option<String>,
    #[serde(alias = "selectedBank")]
    pub selected_bank: Option<String>,
    #[serde(default)]
    pub anonymous: bool,
    pub message: Option<String>,
}

/// Checks the whole request and returns every failing field. Has no side
/// effects.
pub fn validate_donation(
    campaign_id: Uuid,
    request: &DonationRequest,
) -> Result<NewDonation, ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if request.donor_id.is_none() {
        errors.push(ValidationError::new("donor_id", "Donor id is required"));
    }

    match &request.amount {
        None => errors.push(ValidationError::new("amount", "Donation amount is required")),
        Some(amount) => errors.check(validate_money_amount("amount", amount)),
    }

    let payment_method = match request.payment_method.as_deref().map(str::trim) {
        None | Some("") => {
            errors.push(ValidationError::new(
                "payment_method",
                "Please select a payment method",
            ));
            None
        }
        Some(raw) => match validate_enum("payment_method", raw, PaymentMethod::DONOR_SELECTABLE) {
            Ok(()) => raw.parse::<PaymentMethod>().ok(),
            Err(error) => {
                errors.push(error);
                None
            }
        },
    };

    match payment_method {
        Some(PaymentMethod::Mpesa) => match request.phone_number.as_deref().map(str::trim) {
            None | Some("") => errors.push(ValidationError::new(
                "phone_number",
                "Phone number is required for M-Pesa",
            )),
            Some(phone_number) => {
                errors.check(validate_kenyan_msisdn("phone_number", phone_number))
            }
        },
        Some(PaymentMethod::Bank) => {
            let bank_selected = request
                .selected_bank
                .as_deref()
                .is_some_and(|bank| !bank.trim().is_empty());
            if !bank_selected {
                errors.push(ValidationError::new("selected_bank", "Please select a bank"));
            }
        }
        _ => {}
    }

    let message = request
        .message
        .as_deref()
        .map(sanitize_string)
        .filter(|message| !message.is_empty());
    if let Some(message) = &message {
        errors.check(validate_max_len("message", message, DONATION_MESSAGE_MAX_LEN));
    }

    match (request.donor_id, &request.amount, payment_method) {
        (Some(donor_id), Some(amount), Some(payment_method)) if errors.is_empty() => {
            Ok(NewDonation {
                donor_id,
                campaign_id,
                amount: amount.clone(),
                anonymous: request.anonymous,
                message,
                payment_method,
            })
        }
        _ => Err(errors),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DonationReceipt {
    pub donation: Donation,
    pub goal: Reconciliation,
}

#[derive(Clone)]
pub struct DonationIntake {
    donations: Arc<dyn DonationRepository>,
    reconciler: GoalReconciler,
}

impl DonationIntake {
    pub fn new(donations: Arc<dyn DonationRepository>, reconciler: GoalReconciler) -> Self {
        Self {
            donations,
            reconciler,
        }
    }

    /// Single attempt: invalid input never reaches storage and a storage
    /// failure is not retried.
    pub async fn submit(
        &self,
        campaign_id: Uuid,
        request: &DonationRequest,
    ) -> Result<DonationReceipt, AppError> {
        let new_donation = validate_donation(campaign_id, request).map_err(|errors| {
            tracing::warn!(campaign_id = %campaign_id, fields = %errors, "Donation rejected by validation");
            AppError::Validation(errors)
        })?;

        let recorded = self
            .donations
            .record(&new_donation)
            .await
            .map_err(|err| match err {
                RepositoryError::NotFound(_) => {
                    AppError::NotFound(format!("Campaign {} not found", campaign_id))
                }
                RepositoryError::Rejected(message) => AppError::BadRequest(message),
                RepositoryError::Conflict(message) => AppError::Conflict(message),
                RepositoryError::Backend(cause) => {
                    tracing::error!(campaign_id = %campaign_id, error = %cause, "Failed to record donation");
                    AppError::Persistence("Donation could not be submitted".to_string())
                }
            })?;

        tracing::info!(
            donation_id = %recorded.donation.id,
            campaign_id = %campaign_id,
            amount = %recorded.donation.amount,
            payment_method = %recorded.donation.payment_method,
            "Donation recorded"
        );

        let goal = self.reconciler.reconcile(&recorded).await?;

        Ok(DonationReceipt {
            donation: recorded.donation,
            goal,
        })
    }
}
