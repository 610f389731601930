pub mod cache;
pub mod conversion;
pub mod extractor;
pub mod normalizer;
pub mod rate_service;
pub mod reconciler;

pub use crate::domain::model::{Observation, ObservationSequence, RateRecord};
pub use crate::domain::ports::{ConfigProvider, RateSource, Storage};
pub use crate::utils::error::Result;
