use std::sync::Arc;

use crate::config::Config;
use crate::domain::services::admission::AdmissionCoordinator;
use crate::domain::services::membership_service::MembershipService;
use crate::domain::services::token_issuer::{RandomTokenSource, TokenSource};
use crate::infra::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub store: Store,
    pub admission: Arc<AdmissionCoordinator>,
    pub members: Arc<MembershipService>,
}

impl AppState {
    pub fn new(config: Config, store: Store) -> Self {
        Self::with_token_source(config, store, Arc::new(RandomTokenSource))
    }

    pub fn with_token_source(config: Config, store: Store, tokens: Arc<dyn TokenSource>) -> Self {
        let admission = Arc::new(AdmissionCoordinator::new(store.clone(), tokens, config.invitation_ttl()));
        let members = Arc::new(MembershipService::new(store.clone()));
        Self { config, store, admission, members }
    }
}
