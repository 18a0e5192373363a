use std::collections::BTreeMap;

use super::aggregate::SummaryTable;
use super::error::DataResult;
use super::model::{CellValue, Field};

/// How a summary is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// Vertical bars, one bar per series side by side for each category.
    GroupedBar,
    /// One line per series across the categories.
    Line,
    /// Horizontal bars, one per category.
    HorizontalBar,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSpec {
    pub title: &'static str,
    pub kind: ChartKind,
    /// Field laid out along the category axis.
    pub category: Field,
    /// Field splitting the data into coloured series.
    pub series: Option<Field>,
}

/// One coloured series: its key and `(category index, value)` points.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub key: CellValue,
    pub points: Vec<(usize, u64)>,
}

/// Plot-ready data: ordered category labels plus series.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChartData {
    pub categories: Vec<CellValue>,
    pub series: Vec<Series>,
}

impl ChartData {
    /// Lay out `summary` for `spec`.
    ///
    /// Both the category and series fields must be grouping fields of the
    /// summary. Without a series field everything lands in a single series
    /// keyed `Null`.
    pub fn from_summary(summary: &SummaryTable, spec: &ChartSpec) -> DataResult<Self> {
        let cat_pos = summary.key_position(spec.category)?;
        let series_pos = spec
            .series
            .map(|field| summary.key_position(field))
            .transpose()?;

        let mut categories: Vec<CellValue> = summary
            .rows
            .iter()
            .map(|row| row.key[cat_pos].clone())
            .collect();
        categories.sort();
        categories.dedup();

        let mut by_series: BTreeMap<CellValue, Vec<(usize, u64)>> = BTreeMap::new();
        for row in &summary.rows {
            let key = series_pos.map_or(CellValue::Null, |pos| row.key[pos].clone());
            // `categories` is sorted and contains every key, so the search hits.
            if let Ok(idx) = categories.binary_search(&row.key[cat_pos]) {
                by_series.entry(key).or_default().push((idx, row.value));
            }
        }

        let series = by_series
            .into_iter()
            .map(|(key, mut points)| {
                points.sort_by_key(|(idx, _)| *idx);
                Series { key, points }
            })
            .collect();

        Ok(Self { categories, series })
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Category label for an axis position, if it falls on a category.
    pub fn category_label(&self, position: f64) -> Option<String> {
        let rounded = position.round();
        if (position - rounded).abs() > 1e-6 || rounded < 0.0 {
            return None;
        }
        self.categories.get(rounded as usize).map(CellValue::label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::aggregate::{Measure, SummaryRow};
    use crate::data::error::DataError;

    fn summary() -> SummaryTable {
        let row = |year: i64, parent: &str, value: u64| SummaryRow {
            key: vec![CellValue::Integer(year), parent.into()],
            value,
        };
        SummaryTable {
            group_by: vec![Field::YearPurchased, Field::ParentCategory],
            measure: Measure::RowCount,
            rows: vec![row(2020, "A", 2), row(2020, "B", 1), row(2021, "A", 4)],
        }
    }

    #[test]
    fn series_follow_the_colour_field() {
        let spec = ChartSpec {
            title: "trend",
            kind: ChartKind::Line,
            category: Field::YearPurchased,
            series: Some(Field::ParentCategory),
        };
        let chart = ChartData::from_summary(&summary(), &spec).unwrap();
        assert_eq!(chart.categories, vec![CellValue::Integer(2020), CellValue::Integer(2021)]);
        assert_eq!(chart.series.len(), 2);
        assert_eq!(chart.series[0].key, CellValue::from("A"));
        assert_eq!(chart.series[0].points, vec![(0, 2), (1, 4)]);
        assert_eq!(chart.series[1].points, vec![(0, 1)]);
        assert_eq!(chart.category_label(1.0).as_deref(), Some("2021"));
        assert_eq!(chart.category_label(0.5), None);
    }

    #[test]
    fn ungrouped_axis_is_an_error() {
        let spec = ChartSpec {
            title: "vendors",
            kind: ChartKind::HorizontalBar,
            category: Field::VendorCoded,
            series: None,
        };
        assert!(matches!(
            ChartData::from_summary(&summary(), &spec),
            Err(DataError::NotGrouped(Field::VendorCoded))
        ));
    }
}
