//! Database repositories for the data access layer
//!
//! Each repository owns a `PgPool` clone and provides the queries for one
//! domain entity. Queries are dynamic (no offline prepare) so the crate
//! builds without a live DATABASE_URL. Multi-step writes that must be
//! atomic (file creation + usage increment, file removal + usage
//! decrement) run inside a single transaction in the repository.

pub mod db;

pub use db::files::FileRepository;
pub use db::folders::FolderRepository;
pub use db::notifications::NotificationRepository;
pub use db::pool::connect_pool;
pub use db::users::UserRepository;
