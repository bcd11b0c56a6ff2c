pub mod auth;
pub mod evaluator;
pub mod export;
pub mod migration;
pub mod store;

pub use auth::{Authenticator, ensure_bootstrap_account};
pub use evaluator::{Attention, CourseDay, DayPhase, DayStatus};
pub use migration::{MigrationReport, MigrationSkipped, migrate_schema};
pub use store::CourseStore;
