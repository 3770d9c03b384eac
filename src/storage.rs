use crate::errors::StoreError;
use crate::models::{NewRecord, Periodicity, PlanType, Record};
use crate::week::week_bucket;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::StringRecord;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::{fs, sync::Mutex};
use tracing::{error, info, warn};

pub const COLUMNS: [&str; 8] = [
    "Fecha",
    "Semana",
    "Periodicidad",
    "Tipo de Plano",
    "Planos Hechos",
    "Precio por Plano",
    "Costo Total",
    "Ganancia Neta",
];

/// Layout of a data file, detected from its header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVersion {
    /// Written before weekly records carried a `Semana` column.
    Legacy,
    Current,
}

/// Sole owner of the persisted records. Every read goes back to disk.
#[derive(Clone)]
pub struct RecordStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl RecordStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Vec<Record> {
        load_records(&self.path).await
    }

    /// Validates the entry, then appends it and rewrites the file.
    pub async fn append(&self, entry: &NewRecord) -> Result<Record, StoreError> {
        let record = Record::from_entry(entry)?;

        let _guard = self.write_lock.lock().await;
        let mut records = load_for_write(&self.path).await?;
        records.push(record.clone());
        persist_records(&self.path, &records).await?;

        info!(
            plan_type = %record.plan_type,
            units_made = record.units_made,
            total = records.len(),
            "record appended"
        );
        Ok(record)
    }

    /// Removes the rows at `indices`. Indices past the end are ignored.
    pub async fn delete(&self, indices: &BTreeSet<usize>) -> Result<usize, StoreError> {
        if indices.is_empty() {
            return Err(StoreError::NothingSelected);
        }

        let _guard = self.write_lock.lock().await;
        let records = load_for_write(&self.path).await?;
        let before = records.len();
        let kept: Vec<Record> = records
            .into_iter()
            .enumerate()
            .filter(|(index, _)| !indices.contains(index))
            .map(|(_, record)| record)
            .collect();
        let removed = before - kept.len();

        if removed > 0 {
            persist_records(&self.path, &kept).await?;
        }
        info!(removed, remaining = kept.len(), "records deleted");
        Ok(removed)
    }
}

/// Reads the data file. Missing, empty or unreadable files yield no records.
pub async fn load_records(path: &Path) -> Vec<Record> {
    match fs::read(path).await {
        Ok(bytes) => {
            let (mut records, version) = decode_records(&bytes);
            apply_migration(&mut records, version);
            records
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(err) => {
            error!("failed to read data file: {err}");
            Vec::new()
        }
    }
}

/// Reads the data file ahead of a rewrite. Unlike [`load_records`] this
/// fails instead of dropping anything it cannot read, so the rewrite never
/// loses rows.
pub async fn load_for_write(path: &Path) -> Result<Vec<Record>, StoreError> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(StoreError::Io(err)),
    };

    let decoded = try_decode(&bytes)?;
    if decoded.skipped > 0 {
        return Err(StoreError::Unreadable(format!(
            "{} row(s) could not be read",
            decoded.skipped
        )));
    }
    let mut records = decoded.records;
    apply_migration(&mut records, decoded.version);
    Ok(records)
}

fn apply_migration(records: &mut [Record], version: SchemaVersion) {
    let migrated = migrate(records, version);
    if migrated > 0 {
        info!(migrated, ?version, "recomputed week buckets on load");
    }
}

pub async fn persist_records(path: &Path, records: &[Record]) -> Result<(), StoreError> {
    let payload = encode_records(records)?;
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, payload).await?;
    fs::rename(&temp_path, path).await?;
    Ok(())
}

pub fn encode_records(records: &[Record]) -> Result<Vec<u8>, StoreError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(COLUMNS)?;
    for record in records {
        writer.write_record([
            record.date.to_string(),
            record.week_bucket.map(|week| week.to_string()).unwrap_or_default(),
            record.periodicity.label().to_string(),
            record.plan_type.label().to_string(),
            record.units_made.to_string(),
            record.unit_price.to_string(),
            record.total_cost.to_string(),
            record.net_profit.to_string(),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|err| StoreError::Io(err.into_error()))
}

pub fn decode_records(bytes: &[u8]) -> (Vec<Record>, SchemaVersion) {
    match try_decode(bytes) {
        Ok(decoded) => (decoded.records, decoded.version),
        Err(err) => {
            error!("ignoring data file contents: {err}");
            (Vec::new(), SchemaVersion::Current)
        }
    }
}

struct Decoded {
    records: Vec<Record>,
    version: SchemaVersion,
    skipped: usize,
}

fn try_decode(bytes: &[u8]) -> Result<Decoded, StoreError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Decoded {
            records: Vec::new(),
            version: SchemaVersion::Current,
            skipped: 0,
        });
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);
    let headers = reader.headers()?.clone();
    let columns = ColumnMap::from_headers(&headers).ok_or_else(|| {
        StoreError::Unreadable("header is missing required columns".to_string())
    })?;

    let mut records = Vec::new();
    let mut skipped = 0;
    for (row, result) in reader.records().enumerate() {
        let parsed = result
            .map_err(|err| err.to_string())
            .and_then(|fields| columns.parse(&fields));
        match parsed {
            Ok(record) => records.push(record),
            Err(reason) => {
                warn!(row, "skipping unreadable row: {reason}");
                skipped += 1;
            }
        }
    }
    Ok(Decoded {
        records,
        version: columns.version(),
        skipped,
    })
}

/// Brings week buckets in line with each row's periodicity.
/// Returns how many rows changed.
fn migrate(records: &mut [Record], version: SchemaVersion) -> usize {
    if version == SchemaVersion::Legacy {
        info!("data file uses the legacy layout without week buckets");
    }

    let mut changed = 0;
    for record in records.iter_mut() {
        let expected = week_bucket(record.date, record.periodicity);
        if record.week_bucket != expected {
            record.week_bucket = expected;
            changed += 1;
        }
    }
    changed
}

struct ColumnMap {
    date: usize,
    week: Option<usize>,
    periodicity: Option<usize>,
    plan_type: usize,
    units_made: usize,
    unit_price: usize,
    total_cost: usize,
    net_profit: usize,
}

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Option<Self> {
        let position = |name: &str| {
            headers
                .iter()
                .position(|header| header.trim_start_matches('\u{feff}') == name)
        };
        Some(Self {
            date: position(COLUMNS[0])?,
            week: position(COLUMNS[1]),
            periodicity: position(COLUMNS[2]),
            plan_type: position(COLUMNS[3])?,
            units_made: position(COLUMNS[4])?,
            unit_price: position(COLUMNS[5])?,
            total_cost: position(COLUMNS[6])?,
            net_profit: position(COLUMNS[7])?,
        })
    }

    fn version(&self) -> SchemaVersion {
        if self.week.is_some() {
            SchemaVersion::Current
        } else {
            SchemaVersion::Legacy
        }
    }

    fn parse(&self, fields: &StringRecord) -> Result<Record, String> {
        let field = |index: usize| fields.get(index).unwrap_or("");

        let date = parse_date(field(self.date)).ok_or("invalid Fecha")?;
        let week_bucket = self.week.map(field).and_then(parse_date);
        let periodicity = match self.periodicity {
            Some(index) => Periodicity::from_label(field(index)).ok_or("invalid Periodicidad")?,
            None => Periodicity::Daily,
        };
        let plan_label = field(self.plan_type);
        if plan_label.is_empty() {
            return Err("missing Tipo de Plano".to_string());
        }
        let units_made = parse_units(field(self.units_made)).ok_or("invalid Planos Hechos")?;

        Ok(Record {
            date,
            week_bucket,
            periodicity,
            plan_type: PlanType::from_label(plan_label),
            units_made,
            unit_price: parse_amount(field(self.unit_price)).ok_or("invalid Precio por Plano")?,
            total_cost: parse_amount(field(self.total_cost)).ok_or("invalid Costo Total")?,
            net_profit: parse_amount(field(self.net_profit)).ok_or("invalid Ganancia Neta")?,
        })
    }
}

/// Accepts plain dates as well as the timestamp forms older exports used.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|timestamp| timestamp.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|timestamp| timestamp.date_naive())
        })
}

fn parse_units(value: &str) -> Option<u32> {
    let units = match value.parse::<u32>() {
        Ok(units) => units,
        Err(_) => {
            let float = value.parse::<f64>().ok()?;
            if float.fract() != 0.0 || float < 0.0 || float > f64::from(u32::MAX) {
                return None;
            }
            float as u32
        }
    };
    (units >= 1).then_some(units)
}

fn parse_amount(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|amount| amount.is_finite())
}
