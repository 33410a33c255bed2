use crate::config::Config;
use crate::stores::{
    RateRuleStore, TenantStore,
    pg::{PgRateRuleStore, PgTenantStore},
};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    pub tenants: Arc<dyn TenantStore>,
    pub rates: Arc<dyn RateRuleStore>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            tenants: Arc::new(PgTenantStore::new(db.clone())),
            rates: Arc::new(PgRateRuleStore::new(db.clone())),
            db,
            config: Arc::new(config),
        }
    }
}
