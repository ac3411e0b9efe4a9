use std::sync::Arc;
use crate::domain::ports::{BookingRepository, SessionRepository, UserRepository};
use crate::domain::services::{
    booking_query::BookingQueryService, ledger::BookingLedger,
    profile_service::ProfileService, session_service::SessionService,
};
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub session_repo: Arc<dyn SessionRepository>,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub ledger: Arc<BookingLedger>,
    pub booking_queries: Arc<BookingQueryService>,
    pub session_service: Arc<SessionService>,
    pub profile_service: Arc<ProfileService>,
}

impl AppState {
    pub fn new(
        config: Config,
        session_repo: Arc<dyn SessionRepository>,
        booking_repo: Arc<dyn BookingRepository>,
        user_repo: Arc<dyn UserRepository>,
    ) -> Self {
        let ledger = Arc::new(BookingLedger::new(session_repo.clone(), booking_repo.clone(), config.ledger_options()));
        let booking_queries = Arc::new(BookingQueryService::new(booking_repo.clone()));
        let session_service = Arc::new(SessionService::new(session_repo.clone(), booking_repo.clone()));
        let profile_service = Arc::new(ProfileService::new(user_repo.clone()));

        Self {
            config,
            session_repo,
            booking_repo,
            user_repo,
            ledger,
            booking_queries,
            session_service,
            profile_service,
        }
    }
}
