//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use purchase_dashboard::data::model::{CellValue, Dataset, Field, Record};

pub fn purchase(parent: &str, vendor: &str, year: i64, fice: CellValue) -> Record {
    Record::default()
        .with(Field::ParentCategory, parent)
        .with(Field::VendorCoded, vendor)
        .with(Field::YearPurchased, CellValue::Integer(year))
        .with(Field::Fice, fice)
}

/// The four purchases used throughout: (parent, vendor, year, FICE).
pub fn four_purchases() -> Dataset {
    Dataset::from_records(vec![
        purchase("A", "V1", 2020, CellValue::Integer(1)),
        purchase("A", "V2", 2020, CellValue::Integer(1)),
        purchase("B", "V1", 2021, CellValue::Integer(2)),
        purchase("A", "V1", 2021, CellValue::Integer(2)),
    ])
}

/// A larger, irregular dataset for property-style checks.
pub fn mixed_purchases() -> Dataset {
    let parents = ["A", "B", "C"];
    let vendors = ["V1", "V2", "V3", "V4"];
    let records = (0..48i64)
        .map(|i| {
            let fice = if i % 7 == 3 {
                CellValue::Null
            } else {
                CellValue::Integer(i % 5)
            };
            purchase(
                parents[(i % 3) as usize],
                vendors[((i * 7) % 4) as usize],
                2018 + i % 4,
                fice,
            )
            .with(Field::ProductCategory, if i % 2 == 0 { "LMS" } else { "ERP" })
        })
        .collect();
    Dataset::from_records(records)
}

pub fn text(values: &[&str]) -> Vec<CellValue> {
    values.iter().map(|v| CellValue::from(*v)).collect()
}
