//! Goal reconciliation use case.
//! Decides the post-donation state of a campaign and drives surplus
//! redirection through a persisted `RedirectOffer`.

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{
    Donation, NewDonation, PaymentMethod, RecordedDonation, RedirectCandidate, RedirectOffer,
};
use crate::error::AppError;
use crate::ports::{DonationRepository, RedirectOfferRepository, RepositoryError};
use crate::use_cases::CampaignDirectory;
use crate::validation::{validate_money_amount, ValidationError, ValidationErrors};

#[derive(Debug, Clone, PartialEq)]
pub enum GoalAssessment {
    UnderGoal {
        new_total: BigDecimal,
        goal_reached: bool,
    },
    /// `excess` is always greater than zero.
    GoalExceeded {
        new_total: BigDecimal,
        excess: BigDecimal,
    },
}

/// Evaluates a donation of `amount` against the totals observed when it was
/// recorded. When the goal was already met beforehand the whole donation is
/// surplus.
pub fn assess(
    amount_raised_before: &BigDecimal,
    fee_amount: &BigDecimal,
    amount: &BigDecimal,
) -> GoalAssessment {
    let new_total = amount_raised_before + amount;

    if &new_total <= fee_amount {
        let goal_reached = &new_total == fee_amount;
        return GoalAssessment::UnderGoal {
            new_total,
            goal_reached,
        };
    }

    let excess = if amount_raised_before >= fee_amount {
        amount.clone()
    } else {
        &new_total - fee_amount
    };

    GoalAssessment::GoalExceeded { new_total, excess }
}

/// Outcome reported to the donor right after a donation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Reconciliation {
    UnderGoal {
        new_total: BigDecimal,
        fee_amount: BigDecimal,
        goal_reached: bool,
    },
    AwaitingRedirectChoice {
        new_total: BigDecimal,
        fee_amount: BigDecimal,
        excess: BigDecimal,
        offer: RedirectOffer,
        candidates: Vec<RedirectCandidate>,
    },
    /// Goal exceeded but nothing can receive the surplus; it stays with the
    /// source campaign.
    NoRedirectTargets {
        new_total: BigDecimal,
        fee_amount: BigDecimal,
        excess: BigDecimal,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RedirectDecision {
    Redirect {
        target_campaign_id: Uuid,
        amount: BigDecimal,
    },
    Skip,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RedirectOutcome {
    RedirectChosen {
        offer: RedirectOffer,
        transfer: Donation,
    },
    Skipped {
        offer: RedirectOffer,
    },
}

/// The transfer must be positive and no larger than the surplus.
pub fn validate_transfer_amount(amount: &BigDecimal, excess: &BigDecimal) -> Result<(), ValidationErrors> {
    validate_money_amount("amount", amount)?;
    if amount > excess {
        return Err(ValidationError::new(
            "amount",
            format!("must not exceed the surplus of {}", excess),
        )
        .into());
    }
    Ok(())
}

#[derive(Clone)]
pub struct GoalReconciler {
    directory: CampaignDirectory,
    offers: Arc<dyn RedirectOfferRepository>,
    donations: Arc<dyn DonationRepository>,
}

impl GoalReconciler {
    pub fn new(
        directory: CampaignDirectory,
        offers: Arc<dyn RedirectOfferRepository>,
        donations: Arc<dyn DonationRepository>,
    ) -> Self {
        Self {
            directory,
            offers,
            donations,
        }
    }

    /// Runs after the donation is committed, so every failure here is partial.
    pub async fn reconcile(&self, recorded: &RecordedDonation) -> Result<Reconciliation, AppError> {
        let donation = &recorded.donation;
        let fee_amount = recorded.fee_amount.clone();

        let (new_total, excess) =
            match assess(&recorded.amount_raised_before, &fee_amount, &donation.amount) {
                GoalAssessment::UnderGoal {
                    new_total,
                    goal_reached,
                } => {
                    if goal_reached {
                        tracing::info!(campaign_id = %donation.campaign_id, "Campaign goal reached");
                    }
                    return Ok(Reconciliation::UnderGoal {
                        new_total,
                        fee_amount,
                        goal_reached,
                    });
                }
                GoalAssessment::GoalExceeded { new_total, excess } => (new_total, excess),
            };

        tracing::info!(
            campaign_id = %donation.campaign_id,
            donation_id = %donation.id,
            excess = %excess,
            "Campaign goal exceeded"
        );

        let candidates = self
            .directory
            .list_fundable_campaigns(donation.campaign_id)
            .await
            .map_err(|e| partial_failure(donation.id, "redirect candidates could not be loaded", e))?;

        if candidates.is_empty() {
            tracing::info!(campaign_id = %donation.campaign_id, "No campaigns available for surplus redirect");
            return Ok(Reconciliation::NoRedirectTargets {
                new_total,
                fee_amount,
                excess,
            });
        }

        let offer = RedirectOffer::new(
            donation.id,
            donation.campaign_id,
            donation.donor_id,
            excess.clone(),
        );
        let offer = self
            .offers
            .insert(&offer)
            .await
            .map_err(|e| partial_failure(donation.id, "the redirect offer could not be saved", e))?;

        Ok(Reconciliation::AwaitingRedirectChoice {
            new_total,
            fee_amount,
            excess,
            offer,
            candidates,
        })
    }

    pub async fn get_offer(&self, offer_id: Uuid) -> Result<RedirectOffer, AppError> {
        self.offers.get_by_id(offer_id).await.map_err(|e| match e {
            RepositoryError::NotFound(_) => {
                AppError::NotFound(format!("Redirect offer {} not found", offer_id))
            }
            other => other.into(),
        })
    }

    pub async fn resolve(
        &self,
        offer_id: Uuid,
        donor_id: Uuid,
        decision: RedirectDecision,
    ) -> Result<RedirectOutcome, AppError> {
        let offer = self.get_offer(offer_id).await?;

        if offer.donor_id != donor_id {
            return Err(AppError::Forbidden(
                "Redirect offer belongs to another donor".to_string(),
            ));
        }
        if offer.status.is_terminal() {
            return Err(AppError::Conflict(format!(
                "Redirect offer is already {}",
                offer.status
            )));
        }

        match decision {
            RedirectDecision::Skip => {
                let offer = self.offers.mark_skipped(offer_id).await?;
                tracing::info!(offer_id = %offer_id, "Surplus redirect skipped");
                Ok(RedirectOutcome::Skipped { offer })
            }
            RedirectDecision::Redirect {
                target_campaign_id,
                amount,
            } => self.redirect(offer, target_campaign_id, amount).await,
        }
    }

    async fn redirect(
        &self,
        offer: RedirectOffer,
        target_campaign_id: Uuid,
        amount: BigDecimal,
    ) -> Result<RedirectOutcome, AppError> {
        validate_transfer_amount(&amount, &offer.excess)?;
        if target_campaign_id == offer.source_campaign_id {
            return Err(ValidationErrors::from(ValidationError::new(
                "target_campaign_id",
                "must be a different campaign",
            ))
            .into());
        }

        let source_donation_id = offer.source_donation_id;
        let candidates = self
            .directory
            .list_fundable_campaigns(offer.source_campaign_id)
            .await
            .map_err(|e| partial_failure(source_donation_id, "redirect candidates could not be loaded", e))?;
        if !candidates
            .iter()
            .any(|candidate| candidate.campaign_id == target_campaign_id)
        {
            return Err(ValidationErrors::from(ValidationError::new(
                "target_campaign_id",
                "is not eligible to receive redirected funds",
            ))
            .into());
        }

        let source = match self.donations.get_by_id(source_donation_id).await {
            Ok(source) => source,
            Err(RepositoryError::NotFound(_)) => {
                return Err(AppError::Conflict(
                    "Source donation was cancelled".to_string(),
                ))
            }
            Err(e) => {
                return Err(partial_failure(
                    source_donation_id,
                    "the source donation could not be loaded",
                    e,
                ))
            }
        };

        let transfer = NewDonation {
            donor_id: offer.donor_id,
            campaign_id: target_campaign_id,
            amount,
            anonymous: source.anonymous,
            message: Some(format!(
                "Surplus redirected from campaign {}",
                offer.source_campaign_id
            )),
            payment_method: PaymentMethod::Transfer,
        };

        match self.offers.complete_with_transfer(offer.id, &transfer).await {
            Ok((offer, recorded)) => {
                tracing::info!(
                    offer_id = %offer.id,
                    transfer_id = %recorded.donation.id,
                    target_campaign_id = %target_campaign_id,
                    amount = %recorded.donation.amount,
                    "Surplus redirected"
                );
                Ok(RedirectOutcome::RedirectChosen {
                    offer,
                    transfer: recorded.donation,
                })
            }
            Err(RepositoryError::Conflict(message)) => Err(AppError::Conflict(message)),
            Err(e) => Err(partial_failure(
                source_donation_id,
                "the surplus transfer could not be recorded",
                e,
            )),
        }
    }
}

fn partial_failure(donation_id: Uuid, what: &str, cause: RepositoryError) -> AppError {
    tracing::error!(donation_id = %donation_id, error = %cause, "{}", what);
    AppError::PartialFailure {
        donation_id,
        message: what.to_string(),
    }
}
