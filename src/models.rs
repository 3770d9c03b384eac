use crate::errors::StoreError;
use crate::week::{week_bucket, week_start};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Periodicity {
    #[serde(rename = "Diaria", alias = "daily")]
    Daily,
    #[serde(rename = "Semanal", alias = "weekly")]
    Weekly,
}

impl Periodicity {
    pub fn label(self) -> &'static str {
        match self {
            Periodicity::Daily => "Diaria",
            Periodicity::Weekly => "Semanal",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "Diaria" | "daily" => Some(Periodicity::Daily),
            "Semanal" | "weekly" => Some(Periodicity::Weekly),
            _ => None,
        }
    }
}

/// Kind of plano produced. Labels outside the known set are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PlanType {
    Architectural,
    Theft,
    Other,
    Custom(String),
}

impl PlanType {
    pub fn label(&self) -> &str {
        match self {
            PlanType::Architectural => "Arquitectonico",
            PlanType::Theft => "Robo",
            PlanType::Other => "Otro",
            PlanType::Custom(label) => label,
        }
    }

    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "Arquitectonico" | "Arquitectónico" => PlanType::Architectural,
            "Robo" => PlanType::Theft,
            "Otro" => PlanType::Other,
            other => PlanType::Custom(other.to_string()),
        }
    }
}

impl From<String> for PlanType {
    fn from(label: String) -> Self {
        PlanType::from_label(&label)
    }
}

impl From<PlanType> for String {
    fn from(plan_type: PlanType) -> Self {
        plan_type.label().to_string()
    }
}

impl fmt::Display for PlanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One stored production entry. Immutable once persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub date: NaiveDate,
    pub week_bucket: Option<NaiveDate>,
    pub periodicity: Periodicity,
    pub plan_type: PlanType,
    pub units_made: u32,
    pub unit_price: f64,
    pub total_cost: f64,
    pub net_profit: f64,
}

/// Values entered by an admin for a new record, before derivation.
#[derive(Debug, Clone)]
pub struct NewRecord {
    pub date: NaiveDate,
    pub periodicity: Periodicity,
    pub plan_type: PlanType,
    pub units_made: i64,
    pub unit_price: f64,
    pub unit_cost: f64,
}

impl NewRecord {
    pub fn cost_exceeds_price(&self) -> bool {
        self.unit_cost > self.unit_price
    }
}

impl Record {
    /// Validates an entry and derives the stored fields from it.
    pub fn from_entry(entry: &NewRecord) -> Result<Self, StoreError> {
        if entry.units_made < 1 {
            return Err(StoreError::InvalidUnits);
        }
        let units_made = u32::try_from(entry.units_made).map_err(|_| StoreError::InvalidUnits)?;
        if !valid_amount(entry.unit_price) || !valid_amount(entry.unit_cost) {
            return Err(StoreError::InvalidAmount);
        }
        if entry.plan_type.label().is_empty() {
            return Err(StoreError::MissingPlanType);
        }

        let date = match entry.periodicity {
            Periodicity::Weekly => week_start(entry.date),
            Periodicity::Daily => entry.date,
        };
        let units = f64::from(units_made);
        let total_cost = units * entry.unit_cost;
        let revenue = units * entry.unit_price;
        let net_profit = revenue - total_cost;
        if !(total_cost.is_finite() && revenue.is_finite() && net_profit.is_finite()) {
            return Err(StoreError::InvalidAmount);
        }

        Ok(Self {
            date,
            week_bucket: week_bucket(date, entry.periodicity),
            periodicity: entry.periodicity,
            plan_type: entry.plan_type.clone(),
            units_made,
            unit_price: entry.unit_price,
            total_cost,
            net_profit,
        })
    }

    pub fn revenue(&self) -> f64 {
        f64::from(self.units_made) * self.unit_price
    }
}

fn valid_amount(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub authenticated: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateRecordRequest {
    pub date: Option<NaiveDate>,
    pub periodicity: Periodicity,
    pub plan_type: PlanType,
    pub units_made: i64,
    pub unit_price: f64,
    pub unit_cost: f64,
}

#[derive(Debug, Serialize)]
pub struct CreateRecordResponse {
    pub record: Record,
    pub warnings: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    #[serde(default)]
    pub indices: Vec<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub removed: usize,
    pub remaining: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Record fields that are safe to show without logging in.
#[derive(Debug, Serialize)]
pub struct PublicRow {
    pub date: NaiveDate,
    pub week_bucket: Option<NaiveDate>,
    pub periodicity: Periodicity,
    pub plan_type: PlanType,
    pub units_made: u32,
}

impl From<&Record> for PublicRow {
    fn from(record: &Record) -> Self {
        Self {
            date: record.date,
            week_bucket: record.week_bucket,
            periodicity: record.periodicity,
            plan_type: record.plan_type.clone(),
            units_made: record.units_made,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IndexedRecord {
    pub index: usize,
    #[serde(flatten)]
    pub record: Record,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketPoint {
    pub bucket: Option<NaiveDate>,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeSeries {
    pub plan_type: PlanType,
    pub points: Vec<BucketPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeTotal {
    pub plan_type: PlanType,
    pub units_made: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Metrics {
    pub record_count: usize,
    pub total_units: u64,
    pub total_revenue: f64,
    pub total_cost: f64,
    pub net_profit: f64,
}

#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub metrics: Metrics,
    pub totals: Vec<TypeTotal>,
    pub profit_series: Vec<TypeSeries>,
}
