use std::sync::Arc;

use anyhow::Result;
use arrow::array::{ArrayRef, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use rust_xlsxwriter::Workbook;

const HEADERS: [&str; 10] = [
    "Parent Category",
    "Product Category",
    "Vendor Coded",
    "Vendor & Product Name",
    "Year Purchased",
    "FICE - Enrollment Range Rolled Up Current Year",
    "FICE - Institution Type Rolled Up Current Year",
    "FICE - Carnegie Classification 2021:Basic (HD 2021)",
    "Institution Name",
    "FICE",
];

/// (parent category, product category, vendors offering it)
const CATALOG: [(&str, &str, &[&str]); 6] = [
    ("Teaching & Learning", "Learning Management", &["Vendor 01", "Vendor 02", "Vendor 03"]),
    ("Teaching & Learning", "Proctoring", &["Vendor 04", "Vendor 05"]),
    ("Administrative", "Student Information System", &["Vendor 06", "Vendor 07"]),
    ("Administrative", "ERP / Finance", &["Vendor 07", "Vendor 08"]),
    ("Infrastructure", "Identity Management", &["Vendor 09", "Vendor 10"]),
    ("Infrastructure", "Cloud Storage", &["Vendor 02", "Vendor 11"]),
];

const ENROLLMENT: [&str; 4] = ["Under 1,000", "1,000 - 4,999", "5,000 - 9,999", "10,000+"];
const INSTITUTION_TYPES: [&str; 3] = ["Public", "Private nonprofit", "Private for-profit"];
const CARNEGIE: [&str; 4] = [
    "Associate's Colleges",
    "Baccalaureate Colleges",
    "Master's Colleges & Universities",
    "Doctoral Universities",
];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.below(items.len())]
    }
}

struct Institution {
    name: String,
    fice: Option<i64>,
    enrollment: &'static str,
    kind: &'static str,
    carnegie: &'static str,
}

struct Purchase {
    parent: &'static str,
    product: &'static str,
    vendor: &'static str,
    year: i64,
    institution: usize,
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let institutions: Vec<Institution> = (0..60)
        .map(|i| Institution {
            name: format!("Institution {i:02}"),
            // A few institutions lack an identifier, like the real export.
            fice: (i % 17 != 5).then_some(1000 + i as i64 * 7),
            enrollment: *rng.pick(&ENROLLMENT),
            kind: *rng.pick(&INSTITUTION_TYPES),
            carnegie: *rng.pick(&CARNEGIE),
        })
        .collect();

    let mut purchases = Vec::new();
    for (idx, _) in institutions.iter().enumerate() {
        for _ in 0..(3 + rng.below(6)) {
            let (parent, product, vendors) = *rng.pick(&CATALOG);
            purchases.push(Purchase {
                parent,
                product,
                vendor: *rng.pick(vendors),
                year: 2016 + rng.below(8) as i64,
                institution: idx,
            });
        }
    }

    write_workbook("sample_purchases.xlsx", &purchases, &institutions)?;
    write_parquet("sample_purchases.parquet", &purchases, &institutions)?;

    println!(
        "Wrote {} purchases by {} institutions to sample_purchases.xlsx and sample_purchases.parquet",
        purchases.len(),
        institutions.len()
    );
    Ok(())
}

fn write_workbook(path: &str, purchases: &[Purchase], institutions: &[Institution]) -> Result<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Sheet1")?;

    for (col, header) in HEADERS.iter().enumerate() {
        sheet.write_string(0, col as u16, *header)?;
    }
    for (i, p) in purchases.iter().enumerate() {
        let row = i as u32 + 1;
        let inst = &institutions[p.institution];
        sheet.write_string(row, 0, p.parent)?;
        sheet.write_string(row, 1, p.product)?;
        sheet.write_string(row, 2, p.vendor)?;
        sheet.write_string(row, 3, format!("{} {}", p.vendor, p.product))?;
        sheet.write_number(row, 4, p.year as f64)?;
        sheet.write_string(row, 5, inst.enrollment)?;
        sheet.write_string(row, 6, inst.kind)?;
        sheet.write_string(row, 7, inst.carnegie)?;
        sheet.write_string(row, 8, inst.name.as_str())?;
        match inst.fice {
            Some(fice) => sheet.write_number(row, 9, fice as f64)?,
            None => sheet.write_string(row, 9, "N/A")?,
        };
    }

    workbook.save(path)?;
    Ok(())
}

fn write_parquet(path: &str, purchases: &[Purchase], institutions: &[Institution]) -> Result<()> {
    let text = |f: &dyn Fn(&Purchase) -> String| -> ArrayRef {
        Arc::new(StringArray::from(purchases.iter().map(f).collect::<Vec<_>>()))
    };

    let mut fields: Vec<Field> = HEADERS
        .iter()
        .map(|h| Field::new(*h, DataType::Utf8, false))
        .collect();
    fields[4] = Field::new(HEADERS[4], DataType::Int64, false);
    fields[9] = Field::new(HEADERS[9], DataType::Int64, true);
    let schema = Arc::new(Schema::new(fields));

    let columns: Vec<ArrayRef> = vec![
        text(&|p: &Purchase| p.parent.to_string()),
        text(&|p: &Purchase| p.product.to_string()),
        text(&|p: &Purchase| p.vendor.to_string()),
        text(&|p: &Purchase| format!("{} {}", p.vendor, p.product)),
        Arc::new(Int64Array::from(purchases.iter().map(|p| p.year).collect::<Vec<_>>())),
        text(&|p: &Purchase| institutions[p.institution].enrollment.to_string()),
        text(&|p: &Purchase| institutions[p.institution].kind.to_string()),
        text(&|p: &Purchase| institutions[p.institution].carnegie.to_string()),
        text(&|p: &Purchase| institutions[p.institution].name.clone()),
        Arc::new(Int64Array::from(
            purchases
                .iter()
                .map(|p| institutions[p.institution].fice)
                .collect::<Vec<_>>(),
        )),
    ];

    let batch = RecordBatch::try_new(schema.clone(), columns)?;
    let file = std::fs::File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}
