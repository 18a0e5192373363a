use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use super::error::DataError;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the purchases table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring what a spreadsheet cell can hold.
/// Selections and option lists live in `BTreeSet`s, so `CellValue` must be `Ord`.
#[derive(Debug, Clone, Default)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    #[default]
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                Text(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Text(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

/// Renders the value the way it is written back out to CSV: nulls are empty.
impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Try to interpret the value as an `f64` (used for numeric chart axes).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Label for UI widgets; unlike `Display`, nulls are visible.
    pub fn label(&self) -> String {
        match self {
            CellValue::Null => "<blank>".to_string(),
            other => other.to_string(),
        }
    }

    /// Numeric coercion: whole numbers become integers, numeric text is
    /// parsed, everything else becomes `Null`.
    pub fn to_numeric(&self) -> CellValue {
        match self {
            CellValue::Integer(i) => CellValue::Integer(*i),
            CellValue::Float(f) => float_to_numeric(*f),
            CellValue::Text(s) => {
                let s = s.trim();
                if let Ok(i) = s.parse::<i64>() {
                    CellValue::Integer(i)
                } else if let Ok(f) = s.parse::<f64>() {
                    float_to_numeric(f)
                } else {
                    CellValue::Null
                }
            }
            CellValue::Bool(_) | CellValue::Null => CellValue::Null,
        }
    }

    /// Turn integer-like floats and text into `Integer`, leave the rest alone.
    fn to_integer_like(&self) -> CellValue {
        match self {
            CellValue::Float(f) if f.is_finite() && f.fract() == 0.0 => {
                CellValue::Integer(*f as i64)
            }
            CellValue::Text(s) => match s.trim().parse::<i64>() {
                Ok(i) => CellValue::Integer(i),
                Err(_) => self.clone(),
            },
            other => other.clone(),
        }
    }

    /// Categorical view of the value: numbers and booleans become their
    /// text, whole floats without a trailing `.0`.
    fn to_text(&self) -> CellValue {
        match self {
            CellValue::Text(_) | CellValue::Null => self.clone(),
            CellValue::Float(f) if f.is_finite() && f.fract() == 0.0 => {
                CellValue::Text(format!("{f:.0}"))
            }
            other => CellValue::Text(other.to_string()),
        }
    }
}

fn float_to_numeric(f: f64) -> CellValue {
    if !f.is_finite() {
        CellValue::Null
    } else if f.fract() == 0.0 {
        CellValue::Integer(f as i64)
    } else {
        CellValue::Float(f)
    }
}

// ---------------------------------------------------------------------------
// Field – the fixed schema of the purchases table
// ---------------------------------------------------------------------------

/// A column of the purchases table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    ParentCategory,
    ProductCategory,
    VendorCoded,
    VendorProduct,
    YearPurchased,
    EnrollmentRange,
    InstitutionType,
    CarnegieClassification,
    InstitutionName,
    Fice,
}

impl Field {
    pub const COUNT: usize = 10;

    /// All fields in source column order.
    pub const ALL: [Field; Field::COUNT] = [
        Field::ParentCategory,
        Field::ProductCategory,
        Field::VendorCoded,
        Field::VendorProduct,
        Field::YearPurchased,
        Field::EnrollmentRange,
        Field::InstitutionType,
        Field::CarnegieClassification,
        Field::InstitutionName,
        Field::Fice,
    ];

    /// Exact column header in the source file.
    pub fn column_name(self) -> &'static str {
        match self {
            Field::ParentCategory => "Parent Category",
            Field::ProductCategory => "Product Category",
            Field::VendorCoded => "Vendor Coded",
            Field::VendorProduct => "Vendor & Product Name",
            Field::YearPurchased => "Year Purchased",
            Field::EnrollmentRange => "FICE - Enrollment Range Rolled Up Current Year",
            Field::InstitutionType => "FICE - Institution Type Rolled Up Current Year",
            Field::CarnegieClassification => "FICE - Carnegie Classification 2021:Basic (HD 2021)",
            Field::InstitutionName => "Institution Name",
            Field::Fice => "FICE",
        }
    }

    /// Short label used for sidebar controls.
    pub fn label(self) -> &'static str {
        match self {
            Field::ParentCategory => "Parent Category",
            Field::ProductCategory => "Product Category",
            Field::VendorCoded => "Vendor",
            Field::VendorProduct => "Vendor & Product",
            Field::YearPurchased => "Year",
            Field::EnrollmentRange => "Enrollment Range",
            Field::InstitutionType => "Institution Type",
            Field::CarnegieClassification => "Carnegie Classification",
            Field::InstitutionName => "Institution",
            Field::Fice => "FICE",
        }
    }

    /// Whether a source file must carry this column.
    pub fn is_required(self) -> bool {
        !matches!(self, Field::InstitutionName)
    }

    fn index(self) -> usize {
        self as usize
    }

    /// Apply the per-column normalization done at load time.
    pub fn normalize(self, raw: CellValue) -> CellValue {
        if let CellValue::Text(s) = &raw {
            if s.trim().is_empty() {
                return CellValue::Null;
            }
        }
        match self {
            Field::Fice => raw.to_numeric(),
            Field::YearPurchased => raw.to_integer_like(),
            _ => raw.to_text(),
        }
    }

    /// Parse a selection token coming from a string-based caller.
    pub fn parse_value(self, token: &str) -> CellValue {
        match self {
            Field::Fice | Field::YearPurchased => match token.trim().parse::<i64>() {
                Ok(i) => CellValue::Integer(i),
                Err(_) => CellValue::Text(token.to_string()),
            },
            _ => CellValue::Text(token.to_string()),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

impl FromStr for Field {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|f| f.column_name() == s)
            .ok_or_else(|| DataError::UnknownField(s.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the table
// ---------------------------------------------------------------------------

/// A single purchase record (one row of the source sheet).
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    values: [CellValue; Field::COUNT],
}

impl Default for Record {
    fn default() -> Self {
        Self {
            values: std::array::from_fn(|_| CellValue::default()),
        }
    }
}

impl Record {
    /// Builder-style setter; the value is normalized for its field.
    pub fn with(mut self, field: Field, value: impl Into<CellValue>) -> Self {
        self.set(field, value.into());
        self
    }

    pub fn set(&mut self, field: Field, value: CellValue) {
        self.values[field.index()] = field.normalize(value);
    }

    pub fn get(&self, field: Field) -> &CellValue {
        &self.values[field.index()]
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// An ordered, immutable set of records with pre-computed distinct values.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    records: Vec<Record>,
    /// For each field the sorted set of values present in `records`.
    unique_values: BTreeMap<Field, BTreeSet<CellValue>>,
}

impl Dataset {
    /// Build the column indices from the records.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut unique_values: BTreeMap<Field, BTreeSet<CellValue>> = BTreeMap::new();
        for field in Field::ALL {
            let values = records.iter().map(|r| r.get(field).clone()).collect();
            unique_values.insert(field, values);
        }
        Dataset {
            records,
            unique_values,
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Sorted distinct values of a field.
    pub fn distinct_values(&self, field: Field) -> impl Iterator<Item = &CellValue> {
        self.unique_values.get(&field).into_iter().flatten()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
