use crate::domain::model::{
    Dispense, HistoryEntry, Invoice, LabOrder, LabTestType, Medication, Patient,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Key-value blob store. Values are opaque serialized documents; the
/// service decides what goes in them.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> impl std::future::Future<Output = Result<Option<Vec<u8>>>> + Send;
    fn set(
        &self,
        key: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn data_dir(&self) -> &str;
    fn verbose(&self) -> bool;
}

/// The full front-desk operation surface consumed by the presentation
/// layer. Reads return freshly sorted copies; mutations persist the whole
/// aggregate before returning.
#[async_trait]
pub trait FrontDesk: Send {
    async fn ensure_seed(&mut self) -> Result<()>;
    async fn save(&self) -> Result<()>;

    // Patients
    fn patients(&self) -> Vec<Patient>;
    async fn add_patient(
        &mut self,
        document: String,
        full_name: String,
        birth_date: Option<NaiveDate>,
    ) -> Result<Patient>;

    // Pharmacy
    fn medications(&self) -> Vec<Medication>;
    async fn add_medication(&mut self, name: String, stock: u32) -> Result<Medication>;
    fn dispenses(&self) -> Vec<Dispense>;
    async fn dispense(
        &mut self,
        patient_id: Uuid,
        medication_id: Uuid,
        qty: u32,
    ) -> Result<Dispense>;

    // Laboratory
    fn test_types(&self) -> Vec<LabTestType>;
    async fn add_test_type(&mut self, code: String, name: String, price: Decimal)
        -> Result<LabTestType>;
    fn lab_orders(&self) -> Vec<LabOrder>;
    async fn create_lab_order(&mut self, patient_id: Uuid, test_type_id: Uuid) -> Result<LabOrder>;
    async fn result_lab_order(&mut self, order_id: Uuid, result_text: String) -> Result<()>;

    // Billing
    fn invoices(&self) -> Vec<Invoice>;
    async fn create_invoice(
        &mut self,
        patient_id: Uuid,
        lab_order_ids: &[Uuid],
        dispense_ids: &[Uuid],
    ) -> Result<Invoice>;

    // History
    fn history(&self, patient_id: Uuid) -> Result<Vec<HistoryEntry>>;
}
