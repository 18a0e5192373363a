//! Filter, option and aggregation behaviour over in-memory datasets.

mod common;

use std::collections::BTreeSet;

use common::{four_purchases, mixed_purchases, text};
use purchase_dashboard::data::aggregate::{aggregate, AggregationSpec, Measure};
use purchase_dashboard::data::cascade::resolve_options;
use purchase_dashboard::data::filter::{apply_filters, filtered_indices, FilterSpec, Selection, WILDCARD};
use purchase_dashboard::data::model::{CellValue, Field};
use purchase_dashboard::pages::Page;

fn by_vendor_distinct_fice() -> AggregationSpec {
    AggregationSpec::new([Field::VendorCoded], Measure::DistinctCount(Field::Fice))
}

fn sample_specs() -> Vec<FilterSpec> {
    vec![
        FilterSpec::new(),
        FilterSpec::new().with(Field::ParentCategory, Selection::from_tokens(Field::ParentCategory, ["A"])),
        FilterSpec::new()
            .with(Field::ParentCategory, Selection::from_tokens(Field::ParentCategory, ["B", "C"]))
            .with(Field::VendorCoded, Selection::from_tokens(Field::VendorCoded, ["V1", "V3"])),
        FilterSpec::new()
            .with(Field::YearPurchased, Selection::from_tokens(Field::YearPurchased, ["2019", "2021"]))
            .with(Field::VendorCoded, Selection::from_tokens(Field::VendorCoded, [WILDCARD])),
        FilterSpec::new().with(Field::VendorCoded, Selection::Values(BTreeSet::new())),
    ]
}

// ============================================================================
// SCENARIOS
// ============================================================================

#[test]
fn parent_filter_then_distinct_institutions_per_vendor() {
    let ds = four_purchases();
    let spec = FilterSpec::new().with(Field::ParentCategory, Selection::from_tokens(Field::ParentCategory, ["A"]));

    let filtered = apply_filters(&ds, &spec);
    assert_eq!(filtered.len(), 3);
    assert!(filtered
        .records()
        .iter()
        .all(|r| r.get(Field::ParentCategory) == &CellValue::from("A")));

    let summary = aggregate(&filtered, &by_vendor_distinct_fice()).unwrap();
    let rows: Vec<(CellValue, u64)> = summary
        .rows
        .iter()
        .map(|r| (r.key[0].clone(), r.value))
        .collect();
    assert_eq!(rows, vec![("V1".into(), 2), ("V2".into(), 1)]);
}

#[test]
fn unconstrained_row_count_by_parent() {
    let ds = four_purchases();
    let spec = FilterSpec::new()
        .with(Field::ParentCategory, Selection::Unconstrained)
        .with(Field::VendorCoded, Selection::from_tokens(Field::VendorCoded, [WILDCARD]));
    let filtered = apply_filters(&ds, &spec);
    let summary = aggregate(
        &filtered,
        &AggregationSpec::new([Field::ParentCategory], Measure::RowCount),
    )
    .unwrap();
    let rows: Vec<(CellValue, u64)> = summary
        .rows
        .iter()
        .map(|r| (r.key[0].clone(), r.value))
        .collect();
    assert_eq!(rows, vec![("A".into(), 3), ("B".into(), 1)]);
}

#[test]
fn no_match_gives_empty_result_not_error() {
    let ds = four_purchases();
    let spec = FilterSpec::new().with(Field::VendorCoded, Selection::from_tokens(Field::VendorCoded, ["V3"]));
    let filtered = apply_filters(&ds, &spec);
    assert!(filtered.is_empty());
    let summary = aggregate(&filtered, &by_vendor_distinct_fice()).unwrap();
    assert!(summary.is_empty());
}

#[test]
fn top_vendors_page_end_to_end() {
    let ds = four_purchases();
    let layout = Page::TopVendors.layout().unwrap();
    let spec = FilterSpec::new().with(Field::YearPurchased, Selection::from_tokens(Field::YearPurchased, ["2021"]));
    let outcome = layout.run(&ds, &spec).unwrap();
    assert_eq!(outcome.filtered.len(), 2);
    assert_eq!(outcome.summary.rows.len(), 1);
    assert_eq!(outcome.summary.rows[0].value, 1);
    assert_eq!(outcome.chart.categories, text(&["V1"]));
}

// ============================================================================
// PROPERTIES
// ============================================================================

#[test]
fn filter_is_sound_and_complete() {
    let ds = mixed_purchases();
    for spec in sample_specs() {
        let filtered = apply_filters(&ds, &spec);
        let expected: Vec<_> = ds
            .records()
            .iter()
            .filter(|r| {
                spec.iter().all(|(field, sel)| match sel {
                    Selection::Unconstrained => true,
                    Selection::Values(set) => set.contains(r.get(field)),
                })
            })
            .cloned()
            .collect();
        assert_eq!(filtered.records(), expected.as_slice());
    }
}

#[test]
fn filter_keeps_expected_rows() {
    let ds = four_purchases();
    let expected: [&[usize]; 5] = [&[0, 1, 2, 3], &[0, 1, 3], &[2], &[2, 3], &[]];
    let specs = [
        FilterSpec::new(),
        FilterSpec::new().with(Field::ParentCategory, Selection::from_tokens(Field::ParentCategory, ["A"])),
        FilterSpec::new()
            .with(Field::ParentCategory, Selection::from_tokens(Field::ParentCategory, ["B", "C"]))
            .with(Field::VendorCoded, Selection::from_tokens(Field::VendorCoded, ["V1", "V3"])),
        FilterSpec::new().with(Field::YearPurchased, Selection::from_tokens(Field::YearPurchased, ["2021"])),
        FilterSpec::new().with(Field::VendorCoded, Selection::Values(BTreeSet::new())),
    ];
    for (spec, rows) in specs.iter().zip(expected) {
        assert_eq!(filtered_indices(&ds, spec), rows);
    }
}

#[test]
fn empty_spec_is_identity() {
    let ds = mixed_purchases();
    assert_eq!(apply_filters(&ds, &FilterSpec::new()), ds);
}

#[test]
fn filtering_is_idempotent() {
    let ds = mixed_purchases();
    for spec in sample_specs() {
        let once = apply_filters(&ds, &spec);
        assert_eq!(apply_filters(&once, &spec), once);
    }
}

#[test]
fn row_counts_sum_to_filtered_length() {
    let ds = mixed_purchases();
    let groupings: [&[Field]; 3] = [
        &[Field::ParentCategory],
        &[Field::VendorCoded, Field::YearPurchased],
        &[Field::Fice],
    ];
    for spec in sample_specs() {
        let filtered = apply_filters(&ds, &spec);
        for group_by in groupings {
            let summary = aggregate(&filtered, &AggregationSpec::new(group_by, Measure::RowCount)).unwrap();
            assert_eq!(summary.total(), filtered.len() as u64);
        }
    }
}

#[test]
fn distinct_count_never_exceeds_row_count() {
    let ds = mixed_purchases();
    let group_by = [Field::ParentCategory, Field::ProductCategory];
    let rows = aggregate(&ds, &AggregationSpec::new(group_by, Measure::RowCount)).unwrap();
    let distinct = aggregate(&ds, &AggregationSpec::new(group_by, Measure::DistinctCount(Field::Fice))).unwrap();
    assert_eq!(rows.len(), distinct.len());
    for (r, d) in rows.rows.iter().zip(&distinct.rows) {
        assert_eq!(r.key, d.key);
        assert!(d.value <= r.value);
    }
}

#[test]
fn resolved_options_are_subsets_of_all_values() {
    let ds = mixed_purchases();
    let all: Vec<CellValue> = ds.distinct_values(Field::VendorCoded).cloned().collect();
    assert_eq!(
        resolve_options(&ds, Field::ParentCategory, &Selection::Unconstrained, Field::VendorCoded),
        all
    );

    for parent in ["A", "B", "C", "missing"] {
        let sel = Selection::from_tokens(Field::ParentCategory, [parent]);
        let options = resolve_options(&ds, Field::ParentCategory, &sel, Field::VendorCoded);
        assert!(options.iter().all(|v| all.contains(v)));
        let unique: BTreeSet<_> = options.iter().collect();
        assert_eq!(unique.len(), options.len());
    }
}
