pub mod config;
pub mod contract;
pub mod db;
pub mod error;
pub mod models;
pub mod observations;

pub use config::TracelensConfig;
pub use contract::{validate_observation, validate_observation_list, ContractError, ObservationList, PageMeta};
pub use error::TracelensError;
pub use models::{Observation, ObservationLevel, ObservationType, Trace, TraceWithObservations};
pub use observations::{ObservationFilter, Page};
