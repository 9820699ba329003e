//! Application use cases.
//! Each use case depends only on the repository ports.

pub mod campaign_directory;
pub mod campaign_registry;
pub mod donation_intake;
pub mod donor_ledger;
pub mod following;
pub mod goal_reconciler;
pub mod verification;

pub use campaign_directory::{fundable_candidates, CampaignDirectory};
pub use campaign_registry::{
    validate_campaign_changes, validate_new_campaign, CampaignDetail, CampaignInput,
    CampaignRegistry, CampaignSummary, PublicDonation,
};
pub use donation_intake::{validate_donation, DonationIntake, DonationReceipt, DonationRequest};
pub use donor_ledger::{
    check_cancellable, contributions_by_campaign, DonorHistory, DonorLedger, SupportedCampaign,
    SupportedCampaigns,
};
pub use following::{CampaignSupporters, Following};
pub use goal_reconciler::{
    assess, validate_transfer_amount, GoalAssessment, GoalReconciler, Reconciliation,
    RedirectDecision, RedirectOutcome,
};
pub use verification::{page_bounds, DashboardStats, Verification, VerificationAction};
