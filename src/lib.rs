pub mod adapters;
#[cfg(feature = "cli")]
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{LocalStorage, MemoryStorage};
pub use crate::core::service::{HospitalService, PHARMACY_UNIT_PRICE, STORAGE_KEY};
pub use domain::ports::{ConfigProvider, FrontDesk, Storage};
pub use utils::error::{HospitalError, Result};
