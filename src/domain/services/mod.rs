pub mod booking_query;
pub mod ledger;
pub mod profile_service;
pub mod session_service;
pub mod validation;
