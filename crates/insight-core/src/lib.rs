pub mod coerce;
pub mod config;
pub mod delimited;
pub mod error;
pub mod types;

pub use config::ServiceConfig;
pub use delimited::{join_insights, split_insights, INSIGHT_DELIMITER};
pub use error::*;
pub use types::*;
