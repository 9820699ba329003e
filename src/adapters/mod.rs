//! Repository adapters.

pub mod memory;
pub mod postgres_campaign_repository;
pub mod postgres_donation_repository;
pub mod postgres_follow_repository;
pub mod postgres_redirect_offer_repository;

pub use memory::InMemoryStore;
pub use postgres_campaign_repository::PostgresCampaignRepository;
pub use postgres_donation_repository::PostgresDonationRepository;
pub use postgres_follow_repository::PostgresFollowRepository;
pub use postgres_redirect_offer_repository::PostgresRedirectOfferRepository;
