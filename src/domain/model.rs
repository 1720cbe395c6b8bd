use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: Uuid,
    pub document: String,
    pub full_name: String,
    pub birth_date: Option<NaiveDate>,
}

impl Patient {
    pub fn new(document: String, full_name: String, birth_date: Option<NaiveDate>) -> Self {
        Self {
            id: Uuid::new_v4(),
            document,
            full_name,
            birth_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medication {
    pub id: Uuid,
    pub name: String,
    pub stock: u32,
}

impl Medication {
    pub fn new(name: String, stock: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            stock,
        }
    }
}

/// A quantity of medication issued to a patient. Immutable once created;
/// the stock debit happens in the same step that creates the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dispense {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub medication_id: Uuid,
    pub quantity: u32,
    pub date: DateTime<Utc>,
}

impl Dispense {
    pub fn new(patient_id: Uuid, medication_id: Uuid, quantity: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            patient_id,
            medication_id,
            quantity,
            date: Utc::now(),
        }
    }
}

/// Catalog entry for an orderable diagnostic test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabTestType {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub price: Decimal,
}

impl LabTestType {
    pub fn new(code: String, name: String, price: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            code,
            name,
            price,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LabOrderStatus {
    Pending,
    Resulted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabOrder {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub test_type_id: Uuid,
    pub date: DateTime<Utc>,
    pub status: LabOrderStatus,
    pub result_text: Option<String>,
}

impl LabOrder {
    pub fn new(patient_id: Uuid, test_type_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            patient_id,
            test_type_id,
            date: Utc::now(),
            status: LabOrderStatus::Pending,
            result_text: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceKind {
    Lab,
    Pharmacy,
}

/// One billable line. `ref_id` points at the lab order or dispense the
/// line was generated from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub id: Uuid,
    pub kind: InvoiceKind,
    pub ref_id: Uuid,
    pub description: String,
    pub amount: Decimal,
}

impl InvoiceItem {
    pub fn new(kind: InvoiceKind, ref_id: Uuid, description: String, amount: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            ref_id,
            description,
            amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub date: DateTime<Utc>,
    pub items: Vec<InvoiceItem>,
}

impl Invoice {
    pub fn new(patient_id: Uuid, items: Vec<InvoiceItem>) -> Self {
        Self {
            id: Uuid::new_v4(),
            patient_id,
            date: Utc::now(),
            items,
        }
    }

    /// Recomputed on every read; never stored alongside the items.
    pub fn total(&self) -> Decimal {
        self.items.iter().map(|i| i.amount).sum()
    }
}

/// Aggregate root: the single unit that gets serialized to storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HospitalData {
    pub patients: Vec<Patient>,
    pub medications: Vec<Medication>,
    pub dispenses: Vec<Dispense>,
    pub lab_test_types: Vec<LabTestType>,
    pub lab_orders: Vec<LabOrder>,
    pub invoices: Vec<Invoice>,
}

/// One human-readable row of a patient's merged history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub date: DateTime<Utc>,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn invoice_total_sums_item_amounts() {
        let patient = Uuid::new_v4();
        let items = vec![
            InvoiceItem::new(InvoiceKind::Lab, Uuid::new_v4(), "Lab: HB Hemoglobina".into(), dec!(12)),
            InvoiceItem::new(
                InvoiceKind::Pharmacy,
                Uuid::new_v4(),
                "Pharmacy: Paracetamol 500 mg x2".into(),
                dec!(5.00),
            ),
        ];
        let invoice = Invoice::new(patient, items);
        assert_eq!(invoice.total(), dec!(17.00));
    }

    #[test]
    fn invoice_total_is_not_serialized() {
        let invoice = Invoice::new(Uuid::new_v4(), vec![]);
        let value = serde_json::to_value(&invoice).unwrap();
        assert!(value.get("total").is_none());
        assert_eq!(invoice.total(), dec!(0));
    }

    #[test]
    fn new_lab_order_starts_pending() {
        let order = LabOrder::new(Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(order.status, LabOrderStatus::Pending);
        assert!(order.result_text.is_none());
    }
}
