pub mod db;
pub mod models;
pub mod store;

pub use db::InsightDb;
pub use models::StoredInsight;
pub use store::InsightStore;
