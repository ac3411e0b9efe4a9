pub mod memory_store;
pub mod sqlite_booking_repo;
pub mod sqlite_session_repo;
pub mod sqlite_user_repo;
