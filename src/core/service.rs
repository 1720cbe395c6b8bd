use crate::domain::model::{
    Dispense, HistoryEntry, HospitalData, Invoice, InvoiceItem, InvoiceKind, LabOrder,
    LabOrderStatus, LabTestType, Medication, Patient,
};
use crate::domain::ports::{FrontDesk, Storage};
use crate::utils::error::{HospitalError, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

/// Fixed key of the single storage record holding the aggregate root.
pub const STORAGE_KEY: &str = "hospital-data-v1";

/// Demo billing rate per dispensed unit. There is no per-medication price
/// on file; every pharmacy line bills at this flat rate.
pub const PHARMACY_UNIT_PRICE: Decimal = dec!(2.50);

/// Sole owner of the in-memory aggregate root. Every mutating operation
/// ends by serializing the whole aggregate back to storage; a save failure
/// leaves memory ahead of storage (last write wins, single writer).
pub struct HospitalService<S: Storage> {
    storage: S,
    db: HospitalData,
}

impl<S: Storage> HospitalService<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            db: HospitalData::default(),
        }
    }

    fn find_medication(&self, id: Uuid) -> Result<&Medication> {
        self.db
            .medications
            .iter()
            .find(|m| m.id == id)
            .ok_or(HospitalError::NotFound {
                entity: "medication",
                id,
            })
    }

    fn find_test_type(&self, id: Uuid) -> Result<&LabTestType> {
        self.db
            .lab_test_types
            .iter()
            .find(|t| t.id == id)
            .ok_or(HospitalError::NotFound {
                entity: "lab test type",
                id,
            })
    }
}

#[async_trait::async_trait]
impl<S: Storage> FrontDesk for HospitalService<S> {
    async fn ensure_seed(&mut self) -> Result<()> {
        self.db = match self.storage.get(STORAGE_KEY).await? {
            Some(bytes) => {
                tracing::debug!("Loaded aggregate ({} bytes) from storage", bytes.len());
                serde_json::from_slice(&bytes)?
            }
            None => {
                tracing::debug!("No stored aggregate under '{}', starting empty", STORAGE_KEY);
                HospitalData::default()
            }
        };

        if self.db.patients.is_empty() {
            tracing::info!("Seeding demo patients");
            self.db.patients.extend([
                Patient::new(
                    "12345678".to_string(),
                    "Ana Ruiz".to_string(),
                    NaiveDate::from_ymd_opt(1990, 5, 2),
                ),
                Patient::new(
                    "87654321".to_string(),
                    "Carlos Pérez".to_string(),
                    NaiveDate::from_ymd_opt(1987, 11, 21),
                ),
            ]);
        }
        if self.db.medications.is_empty() {
            tracing::info!("Seeding demo medications");
            self.db.medications.extend([
                Medication::new("Paracetamol 500 mg".to_string(), 40),
                Medication::new("Amoxicilina 500 mg".to_string(), 25),
            ]);
        }
        if self.db.lab_test_types.is_empty() {
            tracing::info!("Seeding demo lab test types");
            self.db.lab_test_types.extend([
                LabTestType::new("HB".to_string(), "Hemoglobina".to_string(), dec!(12)),
                LabTestType::new("GLU".to_string(), "Glucosa".to_string(), dec!(10)),
                LabTestType::new("PCR".to_string(), "Proteína C Reactiva".to_string(), dec!(30)),
            ]);
        }

        // One write even when nothing was seeded; the store converges with
        // memory on every startup.
        self.save().await
    }

    async fn save(&self) -> Result<()> {
        let bytes = serde_json::to_vec(&self.db)?;
        tracing::debug!("Persisting aggregate ({} bytes) to storage", bytes.len());
        self.storage.set(STORAGE_KEY, &bytes).await
    }

    // Patients
    fn patients(&self) -> Vec<Patient> {
        let mut out = self.db.patients.clone();
        out.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        out
    }

    async fn add_patient(
        &mut self,
        document: String,
        full_name: String,
        birth_date: Option<NaiveDate>,
    ) -> Result<Patient> {
        let patient = Patient::new(document, full_name, birth_date);
        self.db.patients.push(patient.clone());
        self.save().await?;
        Ok(patient)
    }

    // Pharmacy
    fn medications(&self) -> Vec<Medication> {
        let mut out = self.db.medications.clone();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    async fn add_medication(&mut self, name: String, stock: u32) -> Result<Medication> {
        let medication = Medication::new(name, stock);
        self.db.medications.push(medication.clone());
        self.save().await?;
        Ok(medication)
    }

    fn dispenses(&self) -> Vec<Dispense> {
        let mut out = self.db.dispenses.clone();
        out.sort_by(|a, b| b.date.cmp(&a.date));
        out
    }

    async fn dispense(
        &mut self,
        patient_id: Uuid,
        medication_id: Uuid,
        qty: u32,
    ) -> Result<Dispense> {
        let medication = self
            .db
            .medications
            .iter_mut()
            .find(|m| m.id == medication_id)
            .ok_or(HospitalError::NotFound {
                entity: "medication",
                id: medication_id,
            })?;
        if qty == 0 || qty > medication.stock {
            return Err(HospitalError::InvalidOperation {
                message: "invalid quantity or insufficient stock".to_string(),
            });
        }

        // Stock debit and dispense record are one in-memory step; the
        // aggregate never persists with only half of it applied.
        medication.stock -= qty;
        tracing::debug!(
            "Dispensed {} x {} (stock now {})",
            qty,
            medication.name,
            medication.stock
        );

        let dispense = Dispense::new(patient_id, medication_id, qty);
        self.db.dispenses.push(dispense.clone());
        self.save().await?;
        Ok(dispense)
    }

    // Laboratory
    fn test_types(&self) -> Vec<LabTestType> {
        let mut out = self.db.lab_test_types.clone();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    async fn add_test_type(
        &mut self,
        code: String,
        name: String,
        price: Decimal,
    ) -> Result<LabTestType> {
        let test_type = LabTestType::new(code, name, price);
        self.db.lab_test_types.push(test_type.clone());
        self.save().await?;
        Ok(test_type)
    }

    fn lab_orders(&self) -> Vec<LabOrder> {
        let mut out = self.db.lab_orders.clone();
        out.sort_by(|a, b| b.date.cmp(&a.date));
        out
    }

    async fn create_lab_order(&mut self, patient_id: Uuid, test_type_id: Uuid) -> Result<LabOrder> {
        // Ids are not checked here; dangling references surface when the
        // order is read or invoiced.
        let order = LabOrder::new(patient_id, test_type_id);
        self.db.lab_orders.push(order.clone());
        self.save().await?;
        Ok(order)
    }

    async fn result_lab_order(&mut self, order_id: Uuid, result_text: String) -> Result<()> {
        let order = self
            .db
            .lab_orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or(HospitalError::NotFound {
                entity: "lab order",
                id: order_id,
            })?;
        // Re-resulting overwrites any prior text.
        order.status = LabOrderStatus::Resulted;
        order.result_text = Some(result_text);
        self.save().await
    }

    // Billing
    fn invoices(&self) -> Vec<Invoice> {
        let mut out = self.db.invoices.clone();
        out.sort_by(|a, b| b.date.cmp(&a.date));
        out
    }

    async fn create_invoice(
        &mut self,
        patient_id: Uuid,
        lab_order_ids: &[Uuid],
        dispense_ids: &[Uuid],
    ) -> Result<Invoice> {
        // Resolve every id before touching the aggregate, so a NotFound
        // aborts with nothing appended and nothing persisted.
        let mut items = Vec::with_capacity(lab_order_ids.len() + dispense_ids.len());

        for id in lab_order_ids {
            let order = self
                .db
                .lab_orders
                .iter()
                .find(|o| o.id == *id)
                .ok_or(HospitalError::NotFound {
                    entity: "lab order",
                    id: *id,
                })?;
            let test_type = self.find_test_type(order.test_type_id)?;
            items.push(InvoiceItem::new(
                InvoiceKind::Lab,
                order.id,
                format!("Lab: {} {}", test_type.code, test_type.name),
                test_type.price,
            ));
        }

        for id in dispense_ids {
            let dispense = self
                .db
                .dispenses
                .iter()
                .find(|d| d.id == *id)
                .ok_or(HospitalError::NotFound {
                    entity: "dispense",
                    id: *id,
                })?;
            let medication = self.find_medication(dispense.medication_id)?;
            items.push(InvoiceItem::new(
                InvoiceKind::Pharmacy,
                dispense.id,
                format!("Pharmacy: {} x{}", medication.name, dispense.quantity),
                PHARMACY_UNIT_PRICE * Decimal::from(dispense.quantity),
            ));
        }

        let invoice = Invoice::new(patient_id, items);
        self.db.invoices.push(invoice.clone());
        self.save().await?;
        tracing::debug!(
            "Created invoice {} with {} items, total {}",
            invoice.id,
            invoice.items.len(),
            invoice.total()
        );
        Ok(invoice)
    }

    // History
    fn history(&self, patient_id: Uuid) -> Result<Vec<HistoryEntry>> {
        let mut entries = Vec::new();

        for order in self.db.lab_orders.iter().filter(|o| o.patient_id == patient_id) {
            let test_type = self.find_test_type(order.test_type_id)?;
            let status = match order.status {
                LabOrderStatus::Pending => "pending".to_string(),
                LabOrderStatus::Resulted => {
                    format!("result: {}", order.result_text.as_deref().unwrap_or_default())
                }
            };
            entries.push(HistoryEntry {
                date: order.date,
                text: format!("Lab: {} {} ({})", test_type.code, test_type.name, status),
            });
        }

        for dispense in self.db.dispenses.iter().filter(|d| d.patient_id == patient_id) {
            let medication = self.find_medication(dispense.medication_id)?;
            entries.push(HistoryEntry {
                date: dispense.date,
                text: format!("Pharmacy: {} x{}", medication.name, dispense.quantity),
            });
        }

        for invoice in self.db.invoices.iter().filter(|i| i.patient_id == patient_id) {
            let full_id = invoice.id.to_string();
            entries.push(HistoryEntry {
                date: invoice.date,
                text: format!("Invoice: {} Total {:.2}", &full_id[..8], invoice.total()),
            });
        }

        // Newest first; ties keep concatenation order (stable sort).
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(entries)
    }
}
