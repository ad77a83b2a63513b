//! File-based database implementing every repository trait
//!
//! All four tables live in one JSON document. Every operation takes an OS
//! lock on a sidecar lock file (shared for reads, exclusive for writes) and
//! re-reads the document under it, so separate processes sharing a data
//! directory serialize like threads do. Writes persist with
//! write-then-rename; an operation commits whole or not at all.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use fd_lock::RwLock;
use tracing::{debug, info};

use shukka_domain::model::{
    ContractCode, NewShipment, Order, PlanCell, PlanKey, ShipmentEvent, UnitPriceEntry,
};
use shukka_domain::repository::{
    LedgerView, OrderRepository, PlanRepository, ShipmentRepository, UnitPriceRepository,
};
use shukka_types::{Error, Result, ShiftCategory};

use super::tables::Tables;

const STORE_FILE: &str = "shukka.json";
const LOCK_FILE: &str = "shukka.lock";

pub struct FileDatabase {
    store_path: PathBuf,
    lock_path: PathBuf,
    /// Serializes threads of this process; the lock file serializes processes
    local: Mutex<()>,
}

impl FileDatabase {
    /// Create or load the database in `store_dir`
    pub fn open(store_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&store_dir)?;
        let db = Self {
            store_path: store_dir.join(STORE_FILE),
            lock_path: store_dir.join(LOCK_FILE),
            local: Mutex::new(()),
        };

        // Fail early on a corrupt document
        db.read(|_| ())?;

        info!(path = %db.store_path.display(), "opened database");
        Ok(db)
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    fn lock_local(&self) -> Result<MutexGuard<'_, ()>> {
        self.local.lock().map_err(|_| {
            Error::storage(
                "database",
                self.store_path.display().to_string(),
                "lock poisoned",
            )
        })
    }

    fn lock_file(&self) -> Result<RwLock<File>> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&self.lock_path)?;
        Ok(RwLock::new(file))
    }

    /// Current tables on disk; empty when nothing was written yet
    fn load(&self) -> Result<Tables> {
        if !self.store_path.exists() {
            return Ok(Tables::default());
        }
        let file = File::open(&self.store_path)?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            Error::storage("database", self.store_path.display().to_string(), e.to_string())
        })
    }

    fn read<T>(&self, f: impl FnOnce(&Tables) -> T) -> Result<T> {
        let _local = self.lock_local()?;
        let lock = self.lock_file()?;
        let _shared = lock.read()?;
        let tables = self.load()?;
        Ok(f(&tables))
    }

    /// Run `f` as one serializable unit against the latest tables on disk
    fn write<T>(
        &self,
        entity: &'static str,
        key: &str,
        f: impl FnOnce(&mut Tables) -> Result<T>,
    ) -> Result<T> {
        let _local = self.lock_local()?;
        let mut lock = self.lock_file()?;
        let _exclusive = lock.write()?;
        let mut tables = self.load()?;
        let out = f(&mut tables)?;
        self.persist(&tables)
            .map_err(|e| Error::storage(entity, key, e.to_string()))?;
        Ok(out)
    }

    /// Save tables to disk
    fn persist(&self, tables: &Tables) -> Result<()> {
        let tmp_path = self.store_path.with_extension("json.tmp");
        {
            let file = File::create(&tmp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, tables)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
        }
        fs::rename(&tmp_path, &self.store_path)?;
        Ok(())
    }
}

impl OrderRepository for FileDatabase {
    fn find_by_code(&self, code: &ContractCode) -> Result<Option<Order>> {
        self.read(|t| t.orders.get(code).cloned())
    }

    fn find_all(&self) -> Result<Vec<Order>> {
        self.read(|t| t.orders.values().cloned().collect())
    }

    fn insert_with(
        &self,
        build: &mut dyn FnMut(&[ContractCode]) -> Result<Order>,
    ) -> Result<Order> {
        self.write("order", "(new)", |t| {
            let codes: Vec<ContractCode> = t.orders.keys().cloned().collect();
            let order = build(&codes)?;
            if t.orders.contains_key(&order.code) {
                return Err(Error::Conflict {
                    entity: "order",
                    key: order.code.to_string(),
                });
            }
            t.orders.insert(order.code.clone(), order.clone());
            debug!(code = %order.code, "inserted order");
            Ok(order)
        })
    }

    fn update(&self, order: &Order) -> Result<()> {
        let key = order.code.to_string();
        self.write("order", &key, |t| match t.orders.get_mut(&order.code) {
            Some(existing) => {
                *existing = order.clone();
                debug!(code = %order.code, "updated order");
                Ok(())
            }
            None => Err(Error::not_found("order", order.code.to_string())),
        })
    }
}

impl PlanRepository for FileDatabase {
    fn upsert_cell(&self, cell: PlanCell) -> Result<PlanCell> {
        let key = cell.key.to_string();
        self.write("plan_cell", &key, |t| {
            let replaced = t.plans.insert(cell.key, cell.clone()).is_some();
            debug!(key = %cell.key, replaced, "upserted plan cell");
            Ok(cell)
        })
    }

    fn remove_cell(&self, key: &PlanKey) -> Result<bool> {
        self.write("plan_cell", &key.to_string(), |t| {
            Ok(t.plans.remove(key).is_some())
        })
    }

    fn find_all_cells(&self) -> Result<Vec<PlanCell>> {
        self.read(|t| t.plans.values().cloned().collect())
    }

    fn find_cells_by_date(&self, date: NaiveDate) -> Result<Vec<PlanCell>> {
        self.read(|t| {
            t.plans
                .values()
                .filter(|c| c.key.date == date)
                .cloned()
                .collect()
        })
    }

    fn find_cells_by_contract(&self, code: &ContractCode) -> Result<Vec<PlanCell>> {
        self.read(|t| {
            t.plans
                .values()
                .filter(|c| c.contract_code.as_ref() == Some(code))
                .cloned()
                .collect()
        })
    }
}

impl ShipmentRepository for FileDatabase {
    fn append_with(
        &self,
        shipment: &NewShipment,
        build: &mut dyn FnMut(LedgerView<'_>) -> Result<ShipmentEvent>,
    ) -> Result<ShipmentEvent> {
        let key = format!("{} {}", shipment.contract_code, shipment.date);
        self.write("shipment", &key, |t| {
            let history: Vec<ShipmentEvent> = t
                .shipments
                .iter()
                .filter(|e| e.contract_code == shipment.contract_code)
                .cloned()
                .collect();
            let same_day: Vec<ShipmentEvent> = history
                .iter()
                .filter(|e| e.date == shipment.date)
                .cloned()
                .collect();

            let mut event = build(LedgerView {
                order: t.orders.get(&shipment.contract_code),
                same_day: &same_day,
                history: &history,
            })?;
            if event.contract_code != shipment.contract_code || event.date != shipment.date {
                return Err(Error::storage(
                    "shipment",
                    key.clone(),
                    "built event does not match the requested contract and date",
                ));
            }

            event.id = t.next_shipment_id;
            t.next_shipment_id += 1;
            t.shipments.push(event.clone());
            debug!(
                id = event.id,
                code = %event.contract_code,
                vehicle_index = event.vehicle_index,
                "appended shipment"
            );
            Ok(event)
        })
    }

    fn find_by_contract(&self, code: &ContractCode) -> Result<Vec<ShipmentEvent>> {
        self.read(|t| {
            t.shipments
                .iter()
                .filter(|e| &e.contract_code == code)
                .cloned()
                .collect()
        })
    }

    fn find_by_contract_and_date(
        &self,
        code: &ContractCode,
        date: NaiveDate,
    ) -> Result<Vec<ShipmentEvent>> {
        self.read(|t| {
            t.shipments
                .iter()
                .filter(|e| &e.contract_code == code && e.date == date)
                .cloned()
                .collect()
        })
    }

    fn find_by_date(&self, date: NaiveDate) -> Result<Vec<ShipmentEvent>> {
        self.read(|t| {
            t.shipments
                .iter()
                .filter(|e| e.date == date)
                .cloned()
                .collect()
        })
    }
}

impl UnitPriceRepository for FileDatabase {
    fn find_price(
        &self,
        category: ShiftCategory,
        item_name: &str,
    ) -> Result<Option<UnitPriceEntry>> {
        self.read(|t| {
            t.unit_prices
                .get(&(category, item_name.to_string()))
                .cloned()
        })
    }

    fn find_all_prices(&self) -> Result<Vec<UnitPriceEntry>> {
        self.read(|t| t.unit_prices.values().cloned().collect())
    }

    fn upsert_price(&self, entry: &UnitPriceEntry) -> Result<()> {
        let key = format!("{} {}", entry.category, entry.item_name);
        self.write("unit_price", &key, |t| {
            t.unit_prices
                .insert((entry.category, entry.item_name.clone()), entry.clone());
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveTime, Utc};
    use shukka_domain::model::{OrderFields, OrderSnapshot};
    use shukka_domain::service::next_contract_code;
    use shukka_types::BoardSection;
    use std::sync::Arc;
    use std::thread;
    use tempfile::tempdir;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn fields(site: &str) -> OrderFields {
        OrderFields {
            site: site.to_string(),
            customer: "松尾建設".to_string(),
            product: "流動化処理土".to_string(),
            quantity: 50.0,
            ..Default::default()
        }
    }

    fn insert_fresh(db: &FileDatabase, site: &str) -> Result<Order> {
        let f = fields(site);
        db.insert_with(&mut |codes| {
            Ok(Order::new(next_contract_code(today(), codes)?, today(), f.clone()))
        })
    }

    fn cell(row: u32, note: &str) -> PlanCell {
        PlanCell {
            key: PlanKey::new(today(), BoardSection::El, row),
            contract_code: None,
            site_name: String::new(),
            start_time: String::new(),
            plan_quantity: None,
            truck_count: None,
            note: note.to_string(),
        }
    }

    fn shipment_event<'a>(
        code: &'a ContractCode,
        vehicle: &str,
    ) -> impl FnMut(LedgerView<'_>) -> Result<ShipmentEvent> + 'a {
        let vehicle = vehicle.to_string();
        move |view| {
            Ok(ShipmentEvent {
                id: 0,
                contract_code: code.clone(),
                date: today(),
                time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
                quantity: 6.0,
                vehicle_no: vehicle.clone(),
                vehicle_index: view.same_day.len() as u32 + 1,
                cumulative_quantity: 0.0,
                previous_vehicle_no: view.same_day.last().map(|e| e.vehicle_no.clone()),
                remaining_quantity: 0.0,
                snapshot: OrderSnapshot::default(),
                recorded_at: Utc::now(),
            })
        }
    }

    fn new_shipment(code: &ContractCode) -> NewShipment {
        NewShipment {
            contract_code: code.clone(),
            date: today(),
            time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            quantity: None,
            vehicle_no: "101".to_string(),
        }
    }

    #[test]
    fn test_insert_and_reopen() {
        let dir = tempdir().unwrap();
        let db = FileDatabase::open(dir.path().to_path_buf()).unwrap();
        let first = insert_fresh(&db, "現場A").unwrap();
        let second = insert_fresh(&db, "現場B").unwrap();
        assert_eq!(first.code.as_str(), "2500010");
        assert_eq!(second.code.as_str(), "2500020");
        drop(db);

        let db = FileDatabase::open(dir.path().to_path_buf()).unwrap();
        let all = db.find_all().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].fields.site, "現場B");
    }

    #[test]
    fn test_insert_duplicate_code_conflicts() {
        let dir = tempdir().unwrap();
        let db = FileDatabase::open(dir.path().to_path_buf()).unwrap();
        let code: ContractCode = "2500010".parse().unwrap();
        let f = fields("現場A");
        let mut build =
            |_: &[ContractCode]| -> Result<Order> { Ok(Order::new(code.clone(), today(), f.clone())) };
        db.insert_with(&mut build).unwrap();
        let err = db.insert_with(&mut build).unwrap_err();
        assert!(matches!(err, Error::Conflict { entity: "order", .. }));
        assert_eq!(db.find_all().unwrap().len(), 1);
    }

    #[test]
    fn test_failed_build_writes_nothing() {
        let dir = tempdir().unwrap();
        let db = FileDatabase::open(dir.path().to_path_buf()).unwrap();
        let err = db
            .insert_with(&mut |_| Err(Error::validation("site", "required")))
            .unwrap_err();
        assert!(matches!(err, Error::Validation { .. }));
        assert!(!db.store_path().exists());
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let dir = tempdir().unwrap();
        let db = FileDatabase::open(dir.path().to_path_buf()).unwrap();
        let order = Order::new("2500010".parse().unwrap(), today(), fields("現場A"));
        assert!(db.update(&order).unwrap_err().is_not_found());
    }

    #[test]
    fn test_plan_upsert_keeps_one_row() {
        let dir = tempdir().unwrap();
        let db = FileDatabase::open(dir.path().to_path_buf()).unwrap();
        db.upsert_cell(cell(0, "first")).unwrap();
        db.upsert_cell(cell(0, "second")).unwrap();
        db.upsert_cell(cell(0, "second")).unwrap();
        db.upsert_cell(cell(1, "other row")).unwrap();

        let cells = db.find_all_cells().unwrap();
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].note, "second");

        assert!(db.remove_cell(&cell(1, "").key).unwrap());
        assert!(!db.remove_cell(&cell(1, "").key).unwrap());
        assert_eq!(db.find_cells_by_date(today()).unwrap().len(), 1);
    }

    #[test]
    fn test_append_assigns_increasing_ids() {
        let dir = tempdir().unwrap();
        let db = FileDatabase::open(dir.path().to_path_buf()).unwrap();
        let code: ContractCode = "2500010".parse().unwrap();

        let a = db.append_with(&new_shipment(&code), &mut shipment_event(&code, "101")).unwrap();
        let b = db.append_with(&new_shipment(&code), &mut shipment_event(&code, "102")).unwrap();
        assert_eq!((a.id, b.id), (1, 2));
        assert_eq!(b.vehicle_index, 2);
        assert_eq!(b.previous_vehicle_no.as_deref(), Some("101"));
        drop(db);

        let db = FileDatabase::open(dir.path().to_path_buf()).unwrap();
        let c = db.append_with(&new_shipment(&code), &mut shipment_event(&code, "103")).unwrap();
        assert_eq!(c.id, 3);
        let day = db.find_by_contract_and_date(&code, today()).unwrap();
        let vehicles: Vec<_> = day.iter().map(|e| e.vehicle_no.as_str()).collect();
        assert_eq!(vehicles, vec!["101", "102", "103"]);
    }

    #[test]
    fn test_append_rejects_mismatched_event() {
        let dir = tempdir().unwrap();
        let db = FileDatabase::open(dir.path().to_path_buf()).unwrap();
        let code: ContractCode = "2500010".parse().unwrap();
        let other: ContractCode = "2500020".parse().unwrap();
        let err = db
            .append_with(&new_shipment(&code), &mut shipment_event(&other, "101"))
            .unwrap_err();
        assert!(matches!(err, Error::Storage { entity: "shipment", .. }));
        assert!(db.find_by_date(today()).unwrap().is_empty());
    }

    #[test]
    fn test_unit_price_unique_on_category_and_item() {
        let dir = tempdir().unwrap();
        let db = FileDatabase::open(dir.path().to_path_buf()).unwrap();
        let mut entry = UnitPriceEntry {
            category: ShiftCategory::Day,
            item_name: "昼間 1回転".to_string(),
            partition_price: 3000,
            standard_price: 3500,
        };
        db.upsert_price(&entry).unwrap();
        entry.partition_price = 3100;
        db.upsert_price(&entry).unwrap();
        entry.category = ShiftCategory::Night;
        db.upsert_price(&entry).unwrap();

        assert_eq!(db.find_all_prices().unwrap().len(), 2);
        let day = db.find_price(ShiftCategory::Day, "昼間 1回転").unwrap().unwrap();
        assert_eq!(day.partition_price, 3100);
        assert!(db.find_price(ShiftCategory::Day, "昼間 9回転").unwrap().is_none());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(STORE_FILE), "{ not json").unwrap();
        let err = FileDatabase::open(dir.path().to_path_buf()).err().unwrap();
        assert!(matches!(err, Error::Storage { entity: "database", .. }));
    }

    #[test]
    fn test_concurrent_allocation_is_unique() {
        let dir = tempdir().unwrap();
        let db = Arc::new(FileDatabase::open(dir.path().to_path_buf()).unwrap());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let db = Arc::clone(&db);
                thread::spawn(move || {
                    (0..5)
                        .map(|j| insert_fresh(&db, &format!("現場{}-{}", i, j)).unwrap().code)
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut codes: Vec<ContractCode> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), 40);
        assert_eq!(codes.last().unwrap().sequence(), 40);
    }

    #[test]
    fn test_two_handles_share_one_store() {
        let dir = tempdir().unwrap();
        let a = FileDatabase::open(dir.path().to_path_buf()).unwrap();
        let b = FileDatabase::open(dir.path().to_path_buf()).unwrap();

        let first = insert_fresh(&a, "現場A").unwrap();
        let second = insert_fresh(&b, "現場B").unwrap();
        assert_eq!(first.code.as_str(), "2500010");
        assert_eq!(second.code.as_str(), "2500020");
        assert_eq!(a.find_all().unwrap().len(), 2);

        b.upsert_cell(cell(0, "from b")).unwrap();
        a.upsert_cell(cell(1, "from a")).unwrap();
        assert_eq!(b.find_all_cells().unwrap().len(), 2);
        drop((a, b));

        let db = FileDatabase::open(dir.path().to_path_buf()).unwrap();
        let sites: Vec<_> = db
            .find_all()
            .unwrap()
            .into_iter()
            .map(|o| o.fields.site)
            .collect();
        assert_eq!(sites, vec!["現場A", "現場B"]);
    }

    #[test]
    fn test_separate_handles_per_thread_never_lose_writes() {
        let dir = tempdir().unwrap();
        let handles: Vec<_> = (0..6)
            .map(|i| {
                let path = dir.path().to_path_buf();
                thread::spawn(move || {
                    // Own handle per thread, as separate processes would have
                    let db = FileDatabase::open(path).unwrap();
                    (0..5)
                        .map(|j| insert_fresh(&db, &format!("現場{}-{}", i, j)).unwrap().code)
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut codes: Vec<ContractCode> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), 30);

        let db = FileDatabase::open(dir.path().to_path_buf()).unwrap();
        assert_eq!(db.find_all().unwrap().len(), 30);
    }

    #[test]
    fn test_append_sees_current_order() {
        let dir = tempdir().unwrap();
        let writer = FileDatabase::open(dir.path().to_path_buf()).unwrap();
        let recorder = FileDatabase::open(dir.path().to_path_buf()).unwrap();
        let mut order = insert_fresh(&writer, "現場A").unwrap();
        order.fields.site = "現場A改".to_string();
        writer.update(&order).unwrap();

        let mut seen = None;
        recorder
            .append_with(&new_shipment(&order.code), &mut |view| {
                seen = view.order.map(|o| o.fields.site.clone());
                shipment_event(&order.code, "101")(view)
            })
            .unwrap();
        assert_eq!(seen.as_deref(), Some("現場A改"));

        let unknown: ContractCode = "2599990".parse().unwrap();
        recorder
            .append_with(&new_shipment(&unknown), &mut |view| {
                assert!(view.order.is_none());
                shipment_event(&unknown, "102")(view)
            })
            .unwrap();
    }
}
