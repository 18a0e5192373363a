use crate::data::aggregate::{aggregate, AggregationSpec, Measure, SummaryTable};
use crate::data::cascade::CascadeGraph;
use crate::data::chart::{ChartData, ChartKind, ChartSpec};
use crate::data::filter::{apply_filters, FilterSpec};
use crate::data::model::{CellValue, Dataset, Field};
use crate::data::DataResult;

// ---------------------------------------------------------------------------
// Pages of the dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Home,
    ProductCategoryDistribution,
    PurchaseTrend,
    TopVendors,
}

impl Page {
    pub const ALL: [Page; 4] = [
        Page::Home,
        Page::ProductCategoryDistribution,
        Page::PurchaseTrend,
        Page::TopVendors,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::ProductCategoryDistribution => "Product Category Distribution",
            Page::PurchaseTrend => "Trend of Product Purchases (Yearwise)",
            Page::TopVendors => "Top Vendors Purchased by Institutions",
        }
    }

    /// Fixed composition of a report page; `None` for the home page.
    pub fn layout(self) -> Option<&'static PageLayout> {
        match self {
            Page::Home => None,
            Page::ProductCategoryDistribution => Some(&PRODUCT_CATEGORY_DISTRIBUTION),
            Page::PurchaseTrend => Some(&PURCHASE_TREND),
            Page::TopVendors => Some(&TOP_VENDORS),
        }
    }
}

/// Filters, table, summary, chart and export of one report page.
#[derive(Debug)]
pub struct PageLayout {
    /// Sidebar controls, top to bottom.
    pub controls: &'static [Field],
    /// `(parent, child)`: the child's options follow the parent's selection.
    pub cascades: &'static [(Field, Field)],
    pub table_columns: &'static [Field],
    pub group_by: &'static [Field],
    pub measure: Measure,
    pub chart: ChartSpec,
    pub export_columns: &'static [Field],
}

static PRODUCT_CATEGORY_DISTRIBUTION: PageLayout = PageLayout {
    controls: &[
        Field::ParentCategory,
        Field::ProductCategory,
        Field::EnrollmentRange,
        Field::InstitutionType,
        Field::CarnegieClassification,
    ],
    cascades: &[(Field::ParentCategory, Field::ProductCategory)],
    table_columns: &[
        Field::ParentCategory,
        Field::ProductCategory,
        Field::VendorProduct,
        Field::EnrollmentRange,
        Field::InstitutionType,
        Field::CarnegieClassification,
    ],
    group_by: &[Field::ParentCategory, Field::ProductCategory],
    measure: Measure::RowCount,
    chart: ChartSpec {
        title: "Product Category Distribution",
        kind: ChartKind::GroupedBar,
        category: Field::ParentCategory,
        series: Some(Field::ProductCategory),
    },
    export_columns: &Field::ALL,
};

static PURCHASE_TREND: PageLayout = PageLayout {
    controls: &[Field::YearPurchased, Field::ParentCategory],
    cascades: &[],
    table_columns: &[
        Field::YearPurchased,
        Field::ParentCategory,
        Field::ProductCategory,
        Field::VendorProduct,
    ],
    group_by: &[Field::YearPurchased, Field::ParentCategory],
    measure: Measure::RowCount,
    chart: ChartSpec {
        title: "Trend of Product Purchases (Yearwise)",
        kind: ChartKind::Line,
        category: Field::YearPurchased,
        series: Some(Field::ParentCategory),
    },
    export_columns: &[Field::YearPurchased, Field::ParentCategory, Field::VendorProduct],
};

static TOP_VENDORS: PageLayout = PageLayout {
    controls: &[Field::VendorCoded, Field::YearPurchased, Field::ParentCategory],
    cascades: &[(Field::ParentCategory, Field::VendorCoded)],
    table_columns: &[Field::VendorCoded, Field::YearPurchased, Field::ParentCategory],
    group_by: &[Field::VendorCoded],
    measure: Measure::DistinctCount(Field::Fice),
    chart: ChartSpec {
        title: "Top Vendors Purchased by Institutions",
        kind: ChartKind::HorizontalBar,
        category: Field::VendorCoded,
        series: None,
    },
    export_columns: &[
        Field::VendorCoded,
        Field::YearPurchased,
        Field::ParentCategory,
        Field::Fice,
    ],
};

/// Everything a page shows after "Show" was pressed.
#[derive(Debug, Clone)]
pub struct PageOutcome {
    pub filtered: Dataset,
    pub summary: SummaryTable,
    pub chart: ChartData,
}

impl PageLayout {
    pub fn aggregation(&self) -> AggregationSpec {
        AggregationSpec::new(self.group_by, self.measure)
    }

    pub fn cascade(&self) -> DataResult<CascadeGraph> {
        CascadeGraph::new(self.controls, self.cascades)
    }

    /// Filter, aggregate and lay out the chart.
    pub fn run(&self, dataset: &Dataset, spec: &FilterSpec) -> DataResult<PageOutcome> {
        let filtered = apply_filters(dataset, spec);
        let summary = aggregate(&filtered, &self.aggregation())?;
        let chart = ChartData::from_summary(&summary, &self.chart)?;
        log::info!(
            "'{}': {} of {} records, {} groups",
            self.chart.title,
            filtered.len(),
            dataset.len(),
            summary.len()
        );
        Ok(PageOutcome {
            filtered,
            summary,
            chart,
        })
    }
}

// ---------------------------------------------------------------------------
// Home page overview
// ---------------------------------------------------------------------------

/// Headline numbers about the loaded dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetOverview {
    pub records: usize,
    pub institutions: usize,
    pub vendors: usize,
    pub years: Option<(i64, i64)>,
}

impl DatasetOverview {
    pub fn of(dataset: &Dataset) -> Self {
        let count = |field| dataset.distinct_values(field).filter(|v| !v.is_null()).count();
        let mut years = dataset.distinct_values(Field::YearPurchased).filter_map(|v| match v {
            CellValue::Integer(y) => Some(*y),
            _ => None,
        });
        // Distinct values are sorted, so the first and last integers bound the span.
        let years = years.next().map(|first| (first, years.last().unwrap_or(first)));

        Self {
            records: dataset.len(),
            institutions: count(Field::Fice),
            vendors: count(Field::VendorCoded),
            years,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;

    #[test]
    fn every_layout_is_consistent() {
        for page in Page::ALL {
            let Some(layout) = page.layout() else {
                continue;
            };
            layout.cascade().unwrap();
            assert!(layout.group_by.contains(&layout.chart.category));
            if let Some(series) = layout.chart.series {
                assert!(layout.group_by.contains(&series));
            }
        }
    }

    #[test]
    fn overview_counts_institutions_and_years() {
        let ds = Dataset::from_records(vec![
            Record::default()
                .with(Field::Fice, CellValue::Integer(1))
                .with(Field::YearPurchased, CellValue::Integer(2019)),
            Record::default()
                .with(Field::Fice, "junk")
                .with(Field::YearPurchased, CellValue::Integer(2022)),
            Record::default()
                .with(Field::Fice, CellValue::Integer(1))
                .with(Field::YearPurchased, CellValue::Integer(2020)),
        ]);
        let overview = DatasetOverview::of(&ds);
        assert_eq!(overview.records, 3);
        assert_eq!(overview.institutions, 1);
        assert_eq!(overview.years, Some((2019, 2022)));
    }
}
