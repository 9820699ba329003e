//! Domain entities.
//! Framework-agnostic representations of campaigns, donations and redirect offers.

mod campaign;
mod donation;
mod redirect;
mod supporter;

pub use campaign::{Campaign, CampaignChanges, NewCampaign, DEFAULT_PROFILE_IMAGE};
pub use donation::{Donation, NewDonation, PaymentMethod, RecordedDonation};
pub use redirect::{RedirectCandidate, RedirectOffer, RedirectStatus};
pub use supporter::Supporter;
