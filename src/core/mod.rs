pub mod service;

pub use crate::domain::model::HospitalData;
pub use crate::domain::ports::{ConfigProvider, FrontDesk, Storage};
pub use crate::utils::error::Result;
pub use service::{HospitalService, PHARMACY_UNIT_PRICE, STORAGE_KEY};
