use crate::models::{BucketPoint, Metrics, PlanType, Record, TypeSeries, TypeTotal};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Numeric column summed by [`aggregate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SumField {
    UnitsMade,
    NetProfit,
}

impl SumField {
    fn value(self, record: &Record) -> f64 {
        match self {
            SumField::UnitsMade => f64::from(record.units_made),
            SumField::NetProfit => record.net_profit,
        }
    }
}

/// One series per plan type, in order of first appearance.
///
/// A type whose records carry any week bucket is grouped by week bucket,
/// otherwise by date. Rows of that type without a bucket land under an
/// absent bucket, which sorts first. An empty `selection` keeps every type.
pub fn aggregate<'a, I>(records: I, field: SumField, selection: &[PlanType]) -> Vec<TypeSeries>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut groups: Vec<(PlanType, Vec<&Record>)> = Vec::new();
    for record in records {
        if !selection.is_empty() && !selection.contains(&record.plan_type) {
            continue;
        }
        match groups.iter_mut().find(|(plan_type, _)| *plan_type == record.plan_type) {
            Some((_, rows)) => rows.push(record),
            None => groups.push((record.plan_type.clone(), vec![record])),
        }
    }

    groups
        .into_iter()
        .map(|(plan_type, rows)| TypeSeries {
            plan_type,
            points: aggregate_subset(&rows, field),
        })
        .collect()
}

fn aggregate_subset(rows: &[&Record], field: SumField) -> Vec<BucketPoint> {
    let by_week = rows.iter().any(|record| record.week_bucket.is_some());

    let mut sums: BTreeMap<Option<NaiveDate>, f64> = BTreeMap::new();
    for record in rows {
        let bucket = if by_week {
            record.week_bucket
        } else {
            Some(record.date)
        };
        *sums.entry(bucket).or_default() += field.value(record);
    }

    sums.into_iter()
        .map(|(bucket, value)| BucketPoint { bucket, value })
        .collect()
}

/// Units made per plan type, ordered by type label.
pub fn totals_by_type<'a, I>(records: I) -> Vec<TypeTotal>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut totals: BTreeMap<String, (PlanType, u64)> = BTreeMap::new();
    for record in records {
        let entry = totals
            .entry(record.plan_type.label().to_string())
            .or_insert_with(|| (record.plan_type.clone(), 0));
        entry.1 = entry.1.saturating_add(u64::from(record.units_made));
    }

    totals
        .into_values()
        .map(|(plan_type, units_made)| TypeTotal {
            plan_type,
            units_made,
        })
        .collect()
}

/// Records dated within `from..=to`, paired with their store index.
pub fn filter_by_range(
    records: &[Record],
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Vec<(usize, &Record)> {
    records
        .iter()
        .enumerate()
        .filter(|(_, record)| from.is_none_or(|from| record.date >= from))
        .filter(|(_, record)| to.is_none_or(|to| record.date <= to))
        .collect()
}

pub fn metrics<'a, I>(records: I) -> Metrics
where
    I: IntoIterator<Item = &'a Record>,
{
    records
        .into_iter()
        .fold(Metrics::default(), |mut acc, record| {
            acc.record_count += 1;
            acc.total_units = acc.total_units.saturating_add(u64::from(record.units_made));
            acc.total_revenue += record.revenue();
            acc.total_cost += record.total_cost;
            acc.net_profit += record.net_profit;
            acc
        })
}
