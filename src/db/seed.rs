//! Sample data for local development.

use bigdecimal::BigDecimal;
use uuid::Uuid;

use crate::domain::{Campaign, NewCampaign, NewDonation, PaymentMethod};
use crate::ports::{CampaignRepository, DonationRepository, RepositoryResult};

struct SampleCampaign {
    full_name: &'static str,
    academic_level: &'static str,
    school_name: &'static str,
    fee_amount: i64,
    story: &'static str,
    is_verified: bool,
    donations: &'static [i64],
}

const SAMPLE_CAMPAIGNS: &[SampleCampaign] = &[
    SampleCampaign {
        full_name: "Alice Wanjiku",
        academic_level: "Form 2",
        school_name: "Starehe Girls Centre",
        fee_amount: 45000,
        story: "Alice is a bright student from Mathare who dreams of becoming a doctor. \
                She consistently ranks in the top three of her class while her mother \
                works as a house help to support the family.",
        is_verified: true,
        donations: &[20000, 12000],
    },
    SampleCampaign {
        full_name: "John Kimani",
        academic_level: "Form 4",
        school_name: "Mang'u High School",
        fee_amount: 38000,
        story: "John is passionate about engineering and comes from a single-parent \
                household in Kibera. His grades earned him a place at one of Kenya's \
                top schools.",
        is_verified: true,
        donations: &[10000, 5000],
    },
    SampleCampaign {
        full_name: "Grace Achieng",
        academic_level: "Form 1",
        school_name: "Alliance Girls High School",
        fee_amount: 42000,
        story: "Grace scored 410 marks in KCPE studying under a kerosene lamp. She wants \
                to become a lawyer and help her community.",
        is_verified: true,
        donations: &[5000, 3000],
    },
    SampleCampaign {
        full_name: "Peter Oduor",
        academic_level: "Form 3",
        school_name: "Kagumo High School",
        fee_amount: 35000,
        story: "Peter is an orphan raised by his grandmother. He keeps excellent grades \
                and dreams of becoming a teacher in his home village.",
        is_verified: false,
        donations: &[],
    },
];

/// Inserts the sample campaigns and their donations. Does nothing when any
/// campaign already exists. Returns the number of campaigns created.
pub async fn seed(
    campaigns: &dyn CampaignRepository,
    donations: &dyn DonationRepository,
) -> RepositoryResult<usize> {
    if campaigns.counts().await?.total > 0 {
        tracing::info!("Campaigns already present, skipping seed");
        return Ok(0);
    }

    let donor_id = Uuid::new_v4();
    for sample in SAMPLE_CAMPAIGNS {
        let mut campaign = Campaign::new(NewCampaign {
            full_name: sample.full_name.to_string(),
            academic_level: sample.academic_level.to_string(),
            school_name: sample.school_name.to_string(),
            fee_amount: BigDecimal::from(sample.fee_amount),
            story: sample.story.to_string(),
            profile_image: None,
        });
        campaign.is_verified = sample.is_verified;
        let campaign = campaigns.insert(&campaign).await?;

        for (i, amount) in sample.donations.iter().enumerate() {
            donations
                .record(&NewDonation {
                    donor_id,
                    campaign_id: campaign.id,
                    amount: BigDecimal::from(*amount),
                    anonymous: i % 2 == 1,
                    message: Some("Keep working hard!".to_string()),
                    payment_method: PaymentMethod::Mpesa,
                })
                .await?;
        }
    }

    tracing::info!(campaigns = SAMPLE_CAMPAIGNS.len(), "Seeded sample data");
    Ok(SAMPLE_CAMPAIGNS.len())
}
