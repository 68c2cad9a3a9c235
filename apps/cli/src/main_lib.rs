use std::sync::Arc;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use clubfolio_core::assets::{AssetService, AssetServiceTrait};
use clubfolio_core::clubs::{ClubService, ClubServiceTrait};
use clubfolio_core::members::{MemberService, MemberServiceTrait};
use clubfolio_core::nav::{NavService, NavServiceTrait};
use clubfolio_core::positions::{PositionService, PositionServiceTrait};
use clubfolio_core::transactions::{TransactionService, TransactionServiceTrait};
use clubfolio_storage_sqlite::db::{self, write_actor::spawn_writer};
use clubfolio_storage_sqlite::{
    AssetRepository, ClubRepository, LedgerRepository, MembershipRepository, PositionRepository,
    PriceRepository, TransactionRepository, UnitValueRepository,
};

use crate::config::Config;

pub struct AppState {
    pub club_service: Arc<dyn ClubServiceTrait>,
    pub asset_service: Arc<dyn AssetServiceTrait>,
    pub position_service: Arc<dyn PositionServiceTrait>,
    pub transaction_service: Arc<dyn TransactionServiceTrait>,
    pub member_service: Arc<dyn MemberServiceTrait>,
    pub nav_service: Arc<dyn NavServiceTrait>,
    pub price_repository: Arc<PriceRepository>,
}

/// Installs the global subscriber. `log` records from the library crates are
/// forwarded into it.
pub fn init_tracing(log_format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    // Ensure DATABASE_URL aligns with CLUBFOLIO_DB_PATH so storage picks the right file
    std::env::set_var("DATABASE_URL", &config.db_path);
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = spawn_writer((*pool).clone());

    let club_repository = Arc::new(ClubRepository::new(pool.clone(), writer.clone()));
    let asset_repository = Arc::new(AssetRepository::new(pool.clone(), writer.clone()));
    let position_repository = Arc::new(PositionRepository::new(pool.clone()));
    let transaction_repository = Arc::new(TransactionRepository::new(pool.clone()));
    let membership_repository = Arc::new(MembershipRepository::new(pool.clone(), writer.clone()));
    let unit_value_repository = Arc::new(UnitValueRepository::new(pool.clone(), writer.clone()));
    let ledger_repository = Arc::new(LedgerRepository::new(writer.clone()));
    let price_repository = Arc::new(PriceRepository::new(pool.clone(), writer));

    let ledger_config = config.ledger_config();

    let club_service = Arc::new(ClubService::new(club_repository.clone()));
    let asset_service = Arc::new(AssetService::new(asset_repository.clone()));
    let position_service = Arc::new(PositionService::new(
        club_repository.clone(),
        asset_repository.clone(),
        position_repository.clone(),
        ledger_repository.clone(),
    ));
    let transaction_service = Arc::new(TransactionService::new(
        club_repository.clone(),
        asset_repository,
        position_repository,
        transaction_repository,
        ledger_repository.clone(),
    ));
    let member_service = Arc::new(MemberService::new(
        club_repository.clone(),
        membership_repository,
        unit_value_repository.clone(),
        ledger_repository,
        ledger_config.clone(),
    ));
    let nav_service = Arc::new(NavService::new(
        club_repository,
        unit_value_repository,
        price_repository.clone(),
        ledger_config,
    ));

    Ok(Arc::new(AppState {
        club_service,
        asset_service,
        position_service,
        transaction_service,
        member_service,
        nav_service,
        price_repository,
    }))
}
