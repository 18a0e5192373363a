use std::collections::{BTreeMap, BTreeSet};

use super::error::{DataError, DataResult};
use super::model::{CellValue, Dataset, Field};

// ---------------------------------------------------------------------------
// Aggregation spec
// ---------------------------------------------------------------------------

/// What is computed for each group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    /// Number of records in the group.
    RowCount,
    /// Number of distinct non-null values of the identity field in the group.
    DistinctCount(Field),
}

impl Measure {
    /// Axis / column label for the measure.
    pub fn label(&self) -> String {
        match self {
            Measure::RowCount => "Count".to_string(),
            Measure::DistinctCount(field) => format!("Distinct {}", field.label()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationSpec {
    pub group_by: Vec<Field>,
    pub measure: Measure,
}

impl AggregationSpec {
    pub fn new(group_by: impl Into<Vec<Field>>, measure: Measure) -> Self {
        Self {
            group_by: group_by.into(),
            measure,
        }
    }
}

// ---------------------------------------------------------------------------
// Summary table
// ---------------------------------------------------------------------------

/// One group: the values of the grouping fields and the measure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub key: Vec<CellValue>,
    pub value: u64,
}

/// Grouped result, sorted ascending by key tuple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryTable {
    pub group_by: Vec<Field>,
    pub measure: Measure,
    pub rows: Vec<SummaryRow>,
}

impl SummaryTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Position of `field` inside every row key.
    pub fn key_position(&self, field: Field) -> DataResult<usize> {
        self.group_by
            .iter()
            .position(|f| *f == field)
            .ok_or(DataError::NotGrouped(field))
    }

    /// Sum of the measure over all groups.
    pub fn total(&self) -> u64 {
        self.rows.iter().map(|r| r.value).sum()
    }
}

// ---------------------------------------------------------------------------
// Aggregation engine
// ---------------------------------------------------------------------------

enum Accumulator<'a> {
    Rows(u64),
    Distinct(BTreeSet<&'a CellValue>),
}

impl Accumulator<'_> {
    fn finish(self) -> u64 {
        match self {
            Accumulator::Rows(n) => n,
            Accumulator::Distinct(set) => set.len() as u64,
        }
    }
}

/// Group `dataset` by `spec.group_by` and compute `spec.measure` per group.
///
/// Only combinations present in the data are emitted. A null grouping value
/// forms its own group, so row counts always add up to `dataset.len()`.
pub fn aggregate(dataset: &Dataset, spec: &AggregationSpec) -> DataResult<SummaryTable> {
    if spec.group_by.is_empty() {
        return Err(DataError::EmptyGrouping);
    }

    let mut groups: BTreeMap<Vec<&CellValue>, Accumulator<'_>> = BTreeMap::new();
    for record in dataset.records() {
        let key: Vec<&CellValue> = spec.group_by.iter().map(|f| record.get(*f)).collect();
        let acc = groups.entry(key).or_insert_with(|| match spec.measure {
            Measure::RowCount => Accumulator::Rows(0),
            Measure::DistinctCount(_) => Accumulator::Distinct(BTreeSet::new()),
        });
        match (acc, spec.measure) {
            (Accumulator::Rows(n), _) => *n += 1,
            (Accumulator::Distinct(set), Measure::DistinctCount(identity)) => {
                let id = record.get(identity);
                if !id.is_null() {
                    set.insert(id);
                }
            }
            (Accumulator::Distinct(_), Measure::RowCount) => {}
        }
    }

    let rows: Vec<SummaryRow> = groups
        .into_iter()
        .map(|(key, acc)| SummaryRow {
            key: key.into_iter().cloned().collect(),
            value: acc.finish(),
        })
        .collect();
    log::debug!(
        "aggregated {} records into {} groups by {:?}",
        dataset.len(),
        rows.len(),
        spec.group_by
    );

    Ok(SummaryTable {
        group_by: spec.group_by.clone(),
        measure: spec.measure,
        rows,
    })
}
