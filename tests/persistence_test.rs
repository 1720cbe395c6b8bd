use hospital_desk::{
    FrontDesk, HospitalService, LocalStorage, MemoryStorage, Result, Storage, STORAGE_KEY,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

#[tokio::test]
async fn local_storage_reports_missing_key_as_none() {
    let temp_dir = TempDir::new().unwrap();
    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());

    assert!(storage.get("no-such-key").await.unwrap().is_none());
}

#[tokio::test]
async fn local_storage_round_trips_bytes() {
    let temp_dir = TempDir::new().unwrap();
    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());

    storage.set("blob", b"front desk").await.unwrap();
    let read = storage.get("blob").await.unwrap();
    assert_eq!(read.as_deref(), Some(&b"front desk"[..]));
}

#[tokio::test]
async fn local_storage_creates_missing_base_dir() {
    let temp_dir = TempDir::new().unwrap();
    let nested = temp_dir.path().join("deep").join("store");
    let storage = LocalStorage::new(nested.to_str().unwrap().to_string());

    storage.set("blob", &[1, 2, 3]).await.unwrap();
    assert_eq!(storage.get("blob").await.unwrap(), Some(vec![1, 2, 3]));
}

#[tokio::test]
async fn memory_storage_clones_share_the_same_map() {
    let storage = MemoryStorage::new();
    let clone = storage.clone();

    storage.set("k", b"v").await.unwrap();
    assert_eq!(clone.get("k").await.unwrap(), Some(b"v".to_vec()));
}

#[tokio::test]
async fn service_persists_one_record_under_the_fixed_key() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().to_str().unwrap().to_string();

    let mut service = HospitalService::new(LocalStorage::new(data_dir.clone()));
    service.ensure_seed().await.unwrap();

    let record = temp_dir.path().join(STORAGE_KEY);
    assert!(record.exists());

    // The blob is one JSON document holding the whole aggregate.
    let value: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&record).unwrap()).unwrap();
    assert_eq!(value["patients"].as_array().unwrap().len(), 2);
    assert_eq!(value["medications"].as_array().unwrap().len(), 2);
    assert_eq!(value["lab_test_types"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn aggregate_round_trips_by_value() {
    let storage = MemoryStorage::new();
    let mut service = HospitalService::new(storage.clone());
    service.ensure_seed().await.unwrap();

    let patient = service.patients()[0].id;
    let medication = service.medications()[0].id;
    let test_type = service.test_types()[0].id;
    let order = service.create_lab_order(patient, test_type).await.unwrap();
    let dispense = service.dispense(patient, medication, 1).await.unwrap();
    service
        .create_invoice(patient, &[order.id], &[dispense.id])
        .await
        .unwrap();

    let mut reloaded = HospitalService::new(storage);
    reloaded.ensure_seed().await.unwrap();

    assert_eq!(reloaded.patients(), service.patients());
    assert_eq!(reloaded.medications(), service.medications());
    assert_eq!(reloaded.dispenses(), service.dispenses());
    assert_eq!(reloaded.test_types(), service.test_types());
    assert_eq!(reloaded.lab_orders(), service.lab_orders());
    assert_eq!(reloaded.invoices(), service.invoices());
}

#[derive(Clone)]
struct CountingStorage {
    inner: MemoryStorage,
    writes: Arc<AtomicUsize>,
}

impl CountingStorage {
    fn new() -> Self {
        Self {
            inner: MemoryStorage::new(),
            writes: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl Storage for CountingStorage {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, data: &[u8]) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, data).await
    }
}

#[tokio::test]
async fn ensure_seed_writes_even_when_nothing_was_seeded() {
    let storage = CountingStorage::new();
    let writes = storage.writes.clone();

    let mut first = HospitalService::new(storage.clone());
    first.ensure_seed().await.unwrap();
    let after_first = writes.load(Ordering::SeqCst);
    assert!(after_first >= 1);

    let mut second = HospitalService::new(storage);
    second.ensure_seed().await.unwrap();
    assert_eq!(writes.load(Ordering::SeqCst), after_first + 1);
    assert_eq!(second.patients().len(), 2);
}

#[tokio::test]
async fn failed_operations_do_not_write() {
    let storage = CountingStorage::new();
    let writes = storage.writes.clone();

    let mut service = HospitalService::new(storage);
    service.ensure_seed().await.unwrap();
    let baseline = writes.load(Ordering::SeqCst);

    let patient = service.patients()[0].id;
    let medication = service.medications()[0].id;
    assert!(service.dispense(patient, medication, 0).await.is_err());
    assert!(service.dispense(patient, Uuid::new_v4(), 1).await.is_err());
    assert!(service
        .create_invoice(patient, &[Uuid::new_v4()], &[])
        .await
        .is_err());

    assert_eq!(writes.load(Ordering::SeqCst), baseline);
}
