//! Property-based tests for donation intake validation, goal assessment and
//! redirect candidate selection.

use bigdecimal::BigDecimal;
use proptest::prelude::*;
use uuid::Uuid;

use elimufund_core::domain::{Campaign, NewCampaign};
use elimufund_core::use_cases::{
    assess, fundable_candidates, validate_donation, DonationRequest, GoalAssessment,
};

// =============================================================================
// Generators
// =============================================================================

/// Amounts in cents, turned into two-decimal shillings.
fn arb_amount(range: std::ops::Range<i64>) -> impl Strategy<Value = BigDecimal> {
    range.prop_map(|cents| BigDecimal::new(cents.into(), 2))
}

fn arb_payment_method() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("mpesa"), Just("card"), Just("bank")]
}

/// Phone numbers that are not `254` followed by exactly nine digits.
fn arb_bad_phone() -> impl Strategy<Value = String> {
    prop_oneof![
        "0[0-9]{9}",
        "254[0-9]{0,8}",
        "254[0-9]{10,12}",
        "\\+254[0-9]{9}",
        "254[0-9]{4}[a-z][0-9]{4}",
        "[a-z ]{0,12}",
    ]
}

fn arb_campaign() -> impl Strategy<Value = Campaign> {
    (1i64..100_000, 0i64..150_000, any::<bool>()).prop_map(|(fee, raised, verified)| {
        let mut campaign = Campaign::new(NewCampaign {
            full_name: "Generated Student".to_string(),
            academic_level: "Form 1".to_string(),
            school_name: "Generated School".to_string(),
            fee_amount: BigDecimal::from(fee),
            story: "g".repeat(60),
            profile_image: None,
        });
        campaign.amount_raised = BigDecimal::from(raised);
        campaign.is_verified = verified;
        campaign
    })
}

fn request(amount: BigDecimal, method: &str) -> DonationRequest {
    DonationRequest {
        donor_id: Some(Uuid::new_v4()),
        amount: Some(amount),
        payment_method: Some(method.to_string()),
        phone_number: Some("254712345678".to_string()),
        selected_bank: Some("Equity Bank".to_string()),
        ..Default::default()
    }
}

// =============================================================================
// Intake validation
// =============================================================================

proptest! {
    #[test]
    fn non_positive_amounts_are_rejected(
        amount in arb_amount(-1_000_000..1),
        method in arb_payment_method(),
    ) {
        let errors = validate_donation(Uuid::new_v4(), &request(amount, method)).unwrap_err();
        prop_assert_eq!(errors.get("amount"), Some("Amount must be positive"));
    }

    #[test]
    fn malformed_mpesa_numbers_are_rejected(phone in arb_bad_phone()) {
        let mut req = request(BigDecimal::from(100), "mpesa");
        req.phone_number = Some(phone);

        let errors = validate_donation(Uuid::new_v4(), &req).unwrap_err();
        prop_assert!(errors.get("phone_number").is_some());
    }

    #[test]
    fn blank_bank_is_rejected(blank in "[ \t]{0,5}") {
        let mut req = request(BigDecimal::from(100), "bank");
        req.selected_bank = Some(blank);

        let errors = validate_donation(Uuid::new_v4(), &req).unwrap_err();
        prop_assert_eq!(errors.get("selected_bank"), Some("Please select a bank"));
    }

    #[test]
    fn validation_is_deterministic(
        amount in arb_amount(-10_000..10_000),
        method in prop_oneof![arb_payment_method(), Just("cash"), Just("")],
        phone in proptest::option::of("[0-9]{10,12}"),
    ) {
        let campaign_id = Uuid::new_v4();
        let mut req = request(amount, method);
        req.phone_number = phone;

        prop_assert_eq!(
            validate_donation(campaign_id, &req),
            validate_donation(campaign_id, &req)
        );
    }
}

// =============================================================================
// Goal assessment
// =============================================================================

proptest! {
    #[test]
    fn funded_campaign_surplus_is_whole_donation(
        fee in arb_amount(1..10_000_000),
        over in arb_amount(0..1_000_000),
        amount in arb_amount(1..1_000_000),
    ) {
        let before = &fee + &over;
        match assess(&before, &fee, &amount) {
            GoalAssessment::GoalExceeded { excess, .. } => prop_assert_eq!(excess, amount),
            other => prop_assert!(false, "expected surplus, got {:?}", other),
        }
    }

    #[test]
    fn surplus_is_positive_and_bounded_by_donation(
        fee in arb_amount(1..10_000_000),
        before in arb_amount(0..10_000_000),
        amount in arb_amount(1..10_000_000),
    ) {
        let new_total = &before + &amount;
        match assess(&before, &fee, &amount) {
            GoalAssessment::UnderGoal { goal_reached, .. } => {
                prop_assert!(new_total <= fee);
                prop_assert_eq!(goal_reached, new_total == fee);
            }
            GoalAssessment::GoalExceeded { excess, .. } => {
                prop_assert!(new_total > fee);
                prop_assert!(excess > BigDecimal::from(0));
                prop_assert!(excess <= amount);
            }
        }
    }
}

// =============================================================================
// Redirect candidates
// =============================================================================

proptest! {
    #[test]
    fn candidates_exclude_source_funded_and_unverified(
        campaigns in proptest::collection::vec(arb_campaign(), 0..20),
        source_index in any::<prop::sample::Index>(),
    ) {
        let source_id = if campaigns.is_empty() {
            Uuid::new_v4()
        } else {
            campaigns[source_index.index(campaigns.len())].id
        };

        for candidate in fundable_candidates(&campaigns, source_id) {
            prop_assert_ne!(candidate.campaign_id, source_id);
            prop_assert!(candidate.amount_raised < candidate.fee_amount);
            prop_assert!(candidate.remaining_need > BigDecimal::from(0));
            let campaign = campaigns.iter().find(|c| c.id == candidate.campaign_id).unwrap();
            prop_assert!(campaign.is_verified);
        }
    }
}
