use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use hospital_desk::utils::{logger, validation::Validate};
use hospital_desk::{CliConfig, ConfigProvider, FrontDesk, HospitalService, LocalStorage};
use rust_decimal::Decimal;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "hospital-desk")]
#[command(about = "Front-desk shell for the hospital portal prototype")]
struct Cli {
    #[command(flatten)]
    config: CliConfig,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Seed demo data if the store is empty and show a summary
    Seed,
    /// List registered patients
    Patients,
    /// Register a new patient
    AddPatient {
        #[arg(long)]
        document: String,
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        birth_date: Option<NaiveDate>,
    },
    /// List medications and current stock
    Meds,
    /// Add a medication to the pharmacy
    AddMed {
        #[arg(long)]
        name: String,
        #[arg(long)]
        stock: u32,
    },
    /// Dispense a medication to a patient, debiting stock
    Dispense {
        #[arg(long)]
        patient: Uuid,
        #[arg(long)]
        medication: Uuid,
        #[arg(long)]
        qty: u32,
    },
    /// List dispenses, most recent first
    Dispenses,
    /// List the lab test catalog
    TestTypes,
    /// Add a lab test type to the catalog
    AddTestType {
        #[arg(long)]
        code: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        price: Decimal,
    },
    /// Order a lab test for a patient
    LabOrder {
        #[arg(long)]
        patient: Uuid,
        #[arg(long)]
        test_type: Uuid,
    },
    /// Record the result of a lab order
    LabResult {
        #[arg(long)]
        order: Uuid,
        #[arg(long)]
        result: String,
    },
    /// List lab orders, most recent first
    LabOrders,
    /// Create an invoice from lab orders and dispenses
    Invoice {
        #[arg(long)]
        patient: Uuid,
        #[arg(long = "lab-order")]
        lab_orders: Vec<Uuid>,
        #[arg(long = "dispense")]
        dispenses: Vec<Uuid>,
    },
    /// List invoices, most recent first
    Invoices,
    /// Show a patient's merged history, newest first
    History {
        #[arg(long)]
        patient: Uuid,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.config.verbose());

    tracing::info!("Starting hospital-desk CLI");
    if cli.config.verbose() {
        tracing::debug!("CLI config: {:?}", cli.config);
    }

    // 驗證配置
    if let Err(e) = cli.config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    // 創建存儲和服務
    let storage = LocalStorage::new(cli.config.data_dir().to_string());
    let mut service = HospitalService::new(storage);

    match run(&mut service, cli.command).await {
        Ok(()) => {}
        Err(e) => {
            tracing::error!("❌ Operation failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}

async fn run(
    service: &mut HospitalService<LocalStorage>,
    command: Command,
) -> hospital_desk::Result<()> {
    // 啟動時載入聚合根（必要時播種示範資料）
    service.ensure_seed().await?;

    match command {
        Command::Seed => {
            println!("✅ Store ready");
            println!(
                "   {} patients, {} medications, {} lab test types",
                service.patients().len(),
                service.medications().len(),
                service.test_types().len()
            );
        }
        Command::Patients => {
            for p in service.patients() {
                let birth = p
                    .birth_date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!("{}  {:>10}  {}  ({})", p.id, p.document, p.full_name, birth);
            }
        }
        Command::AddPatient {
            document,
            full_name,
            birth_date,
        } => {
            let p = service.add_patient(document, full_name, birth_date).await?;
            println!("✅ Registered patient {} ({})", p.full_name, p.id);
        }
        Command::Meds => {
            for m in service.medications() {
                println!("{}  {:>5}  {}", m.id, m.stock, m.name);
            }
        }
        Command::AddMed { name, stock } => {
            let m = service.add_medication(name, stock).await?;
            println!("✅ Added medication {} ({})", m.name, m.id);
        }
        Command::Dispense {
            patient,
            medication,
            qty,
        } => {
            let d = service.dispense(patient, medication, qty).await?;
            println!("✅ Dispensed x{} ({})", d.quantity, d.id);
        }
        Command::Dispenses => {
            for d in service.dispenses() {
                println!(
                    "{}  {}  x{:<4} patient {}",
                    d.id,
                    d.date.format("%Y-%m-%d %H:%M"),
                    d.quantity,
                    d.patient_id
                );
            }
        }
        Command::TestTypes => {
            for t in service.test_types() {
                println!("{}  {:<4} {:<24} {:>8.2}", t.id, t.code, t.name, t.price);
            }
        }
        Command::AddTestType { code, name, price } => {
            let t = service.add_test_type(code, name, price).await?;
            println!("✅ Added lab test type {} {} ({})", t.code, t.name, t.id);
        }
        Command::LabOrder { patient, test_type } => {
            let o = service.create_lab_order(patient, test_type).await?;
            println!("✅ Created lab order {}", o.id);
        }
        Command::LabResult { order, result } => {
            service.result_lab_order(order, result).await?;
            println!("✅ Result recorded for lab order {}", order);
        }
        Command::LabOrders => {
            for o in service.lab_orders() {
                println!(
                    "{}  {}  {:?}  patient {}",
                    o.id,
                    o.date.format("%Y-%m-%d %H:%M"),
                    o.status,
                    o.patient_id
                );
            }
        }
        Command::Invoice {
            patient,
            lab_orders,
            dispenses,
        } => {
            let inv = service
                .create_invoice(patient, &lab_orders, &dispenses)
                .await?;
            println!("✅ Invoice {} Total {:.2}", inv.id, inv.total());
            for item in &inv.items {
                println!("   {:>8.2}  {}", item.amount, item.description);
            }
        }
        Command::Invoices => {
            for inv in service.invoices() {
                println!(
                    "{}  {}  {:>8.2}  patient {}",
                    inv.id,
                    inv.date.format("%Y-%m-%d %H:%M"),
                    inv.total(),
                    inv.patient_id
                );
            }
        }
        Command::History { patient } => {
            for entry in service.history(patient)? {
                println!("{}  {}", entry.date.format("%Y-%m-%d %H:%M"), entry.text);
            }
        }
    }

    Ok(())
}
