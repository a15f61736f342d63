/*
 * Responsibility
 * - Postgres implementations of the store contracts
 * - Schema migrations (migrations/) embedded at build time, applied at startup
 */
use sqlx::migrate::Migrator;

pub mod category_repo;
pub mod error;
pub mod product_repo;
pub mod user_repo;

pub use category_repo::PgCategoryRepo;
pub use product_repo::PgProductRepo;
pub use user_repo::PgUserRepo;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");
