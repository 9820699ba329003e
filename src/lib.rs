pub mod adapters;
pub mod cli;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod handlers;
pub mod health;
pub mod middleware;
pub mod ports;
pub mod use_cases;
pub mod utils;
pub mod validation;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, patch, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::adapters::{
    InMemoryStore, PostgresCampaignRepository, PostgresDonationRepository,
    PostgresFollowRepository, PostgresRedirectOfferRepository,
};
use crate::config::Config;
use crate::health::{DependencyChecker, InMemoryChecker, PostgresChecker};
use crate::middleware::auth::{admin_auth, AdminKey};
use crate::middleware::request_logger::{request_logger_middleware, RequestLogSettings};
use crate::ports::{
    CampaignRepository, DonationRepository, FollowRepository, RedirectOfferRepository,
};
use crate::use_cases::{
    CampaignDirectory, CampaignRegistry, DonationIntake, DonorLedger, Following, GoalReconciler,
    Verification,
};

/// The repository ports the application is wired from.
#[derive(Clone)]
pub struct Repositories {
    pub campaigns: Arc<dyn CampaignRepository>,
    pub donations: Arc<dyn DonationRepository>,
    pub offers: Arc<dyn RedirectOfferRepository>,
    pub follows: Arc<dyn FollowRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            campaigns: Arc::new(PostgresCampaignRepository::new(pool.clone())),
            donations: Arc::new(PostgresDonationRepository::new(pool.clone())),
            offers: Arc::new(PostgresRedirectOfferRepository::new(pool.clone())),
            follows: Arc::new(PostgresFollowRepository::new(pool)),
        }
    }

    pub fn in_memory(store: InMemoryStore) -> Self {
        Self {
            campaigns: Arc::new(store.clone()),
            donations: Arc::new(store.clone()),
            offers: Arc::new(store.clone()),
            follows: Arc::new(store),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub intake: DonationIntake,
    pub reconciler: GoalReconciler,
    pub directory: CampaignDirectory,
    pub registry: CampaignRegistry,
    pub verification: Verification,
    pub ledger: DonorLedger,
    pub following: Following,
    pub health_checkers: Arc<Vec<Arc<dyn DependencyChecker>>>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        repos: Repositories,
        health_checkers: Vec<Arc<dyn DependencyChecker>>,
        config: Config,
    ) -> Self {
        let directory = CampaignDirectory::new(repos.campaigns.clone());
        let reconciler = GoalReconciler::new(
            directory.clone(),
            repos.offers.clone(),
            repos.donations.clone(),
        );

        Self {
            intake: DonationIntake::new(repos.donations.clone(), reconciler.clone()),
            registry: CampaignRegistry::new(
                repos.campaigns.clone(),
                repos.donations.clone(),
                repos.follows.clone(),
            ),
            verification: Verification::new(repos.campaigns.clone(), repos.donations.clone()),
            ledger: DonorLedger::new(
                repos.donations.clone(),
                repos.campaigns.clone(),
                config.cancel_window(),
            ),
            following: Following::new(repos.campaigns, repos.follows),
            reconciler,
            directory,
            health_checkers: Arc::new(health_checkers),
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    pub fn postgres(pool: PgPool, config: Config) -> Self {
        let checkers: Vec<Arc<dyn DependencyChecker>> =
            vec![Arc::new(PostgresChecker::new(pool.clone()))];
        Self::new(Repositories::postgres(pool), checkers, config)
    }

    pub fn in_memory(store: InMemoryStore, config: Config) -> Self {
        let checkers: Vec<Arc<dyn DependencyChecker>> = vec![Arc::new(InMemoryChecker)];
        Self::new(Repositories::in_memory(store), checkers, config)
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

pub fn create_app(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route(
            "/campaigns/pending",
            get(handlers::admin::pending_campaigns),
        )
        .route(
            "/campaigns/:id/verify",
            patch(handlers::admin::verify_campaign),
        )
        .route("/stats", get(handlers::admin::dashboard_stats))
        .route("/donations", get(handlers::admin::all_donations))
        .layer(axum::middleware::from_fn_with_state(
            AdminKey(Arc::from(state.config.admin_api_key.as_str())),
            admin_auth,
        ));

    let request_log = RequestLogSettings {
        log_body: state.config.log_request_body,
    };
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/campaigns",
            get(handlers::campaigns::list_campaigns).post(handlers::campaigns::create_campaign),
        )
        .route(
            "/campaigns/:id",
            get(handlers::campaigns::get_campaign).patch(handlers::campaigns::update_campaign),
        )
        .route(
            "/campaigns/:id/redirect-candidates",
            get(handlers::campaigns::redirect_candidates),
        )
        .route("/campaigns/:id/donations", post(handlers::campaigns::donate))
        .route(
            "/campaigns/:id/supporters",
            get(handlers::campaigns::supporters),
        )
        .route(
            "/donations/:id",
            get(handlers::donations::get_donation).delete(handlers::donations::cancel_donation),
        )
        .route(
            "/redirect-offers/:id",
            get(handlers::redirect_offers::get_offer).post(handlers::redirect_offers::resolve_offer),
        )
        .route(
            "/donors/:donor_id/donations",
            get(handlers::donors::donor_donations),
        )
        .route(
            "/donors/:donor_id/campaigns",
            get(handlers::donors::supported_campaigns),
        )
        .route(
            "/donors/:donor_id/follows",
            get(handlers::donors::followed_campaigns),
        )
        .route(
            "/donors/:donor_id/follows/:campaign_id",
            get(handlers::donors::follow_status)
                .post(handlers::donors::follow)
                .delete(handlers::donors::unfollow),
        )
        .nest("/admin", admin_routes)
        .layer(axum::middleware::from_fn_with_state(
            request_log,
            request_logger_middleware,
        ))
        .layer(cors)
        .with_state(state)
}
