use std::collections::{BTreeMap, BTreeSet};

use super::model::{CellValue, Dataset, Field, Record};

/// Token a string-based caller uses to mean "any value".
pub const WILDCARD: &str = "All";

// ---------------------------------------------------------------------------
// Selection: the constraint on one field
// ---------------------------------------------------------------------------

/// What a single field is restricted to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    /// No constraint on the field.
    #[default]
    Unconstrained,
    /// The field's value must be one of these. An empty set matches nothing.
    Values(BTreeSet<CellValue>),
}

impl Selection {
    /// Build a selection from string tokens. Any [`WILDCARD`] token wins over
    /// the other tokens; the rest are parsed for `field`.
    pub fn from_tokens<I, S>(field: Field, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut values = BTreeSet::new();
        for token in tokens {
            let token = token.as_ref();
            if token == WILDCARD {
                return Selection::Unconstrained;
            }
            values.insert(field.parse_value(token));
        }
        Selection::Values(values)
    }

    pub fn values<I: IntoIterator<Item = CellValue>>(values: I) -> Self {
        Selection::Values(values.into_iter().collect())
    }

    pub fn matches(&self, value: &CellValue) -> bool {
        match self {
            Selection::Unconstrained => true,
            Selection::Values(set) => set.contains(value),
        }
    }

    pub fn is_unconstrained(&self) -> bool {
        matches!(self, Selection::Unconstrained)
    }
}

// ---------------------------------------------------------------------------
// FilterSpec: selections for several fields, combined with AND
// ---------------------------------------------------------------------------

/// Per-field selections. A field absent from the map is unconstrained.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterSpec {
    selections: BTreeMap<Field, Selection>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style variant of [`FilterSpec::set`].
    pub fn with(mut self, field: Field, selection: Selection) -> Self {
        self.set(field, selection);
        self
    }

    pub fn set(&mut self, field: Field, selection: Selection) {
        self.selections.insert(field, selection);
    }

    /// The selection for `field`, `None` meaning unconstrained.
    pub fn get(&self, field: Field) -> Option<&Selection> {
        self.selections.get(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &Selection)> {
        self.selections.iter().map(|(f, s)| (*f, s))
    }

    /// A record passes when every constrained field matches.
    pub fn matches(&self, record: &Record) -> bool {
        self.selections
            .iter()
            .all(|(field, selection)| selection.matches(record.get(*field)))
    }
}

// ---------------------------------------------------------------------------
// Filter engine
// ---------------------------------------------------------------------------

/// Return indices of records that pass all selections, in dataset order.
pub fn filtered_indices(dataset: &Dataset, spec: &FilterSpec) -> Vec<usize> {
    dataset
        .records()
        .iter()
        .enumerate()
        .filter(|(_, record)| spec.matches(record))
        .map(|(i, _)| i)
        .collect()
}

/// Return the stable sub-dataset of records that pass all selections.
pub fn apply_filters(dataset: &Dataset, spec: &FilterSpec) -> Dataset {
    let all = dataset.records();
    let records: Vec<Record> = filtered_indices(dataset, spec)
        .into_iter()
        .map(|i| all[i].clone())
        .collect();
    log::debug!("filter kept {} of {} records", records.len(), dataset.len());
    Dataset::from_records(records)
}

// ---------------------------------------------------------------------------
// Control selection: widget state of one sidebar multiselect
// ---------------------------------------------------------------------------

/// One entry of a sidebar multiselect.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Choice {
    All,
    Value(CellValue),
}

/// State of a multiselect. A control the user never touched is
/// unconstrained; one that was touched and emptied matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlSelection {
    chosen: Option<BTreeSet<Choice>>,
}

impl ControlSelection {
    pub fn is_touched(&self) -> bool {
        self.chosen.is_some()
    }

    pub fn is_checked(&self, choice: &Choice) -> bool {
        self.chosen.as_ref().is_some_and(|c| c.contains(choice))
    }

    pub fn set_checked(&mut self, choice: Choice, checked: bool) {
        let chosen = self.chosen.get_or_insert_with(BTreeSet::new);
        if checked {
            chosen.insert(choice);
        } else {
            chosen.remove(&choice);
        }
    }

    /// Forget all interaction, returning the control to unconstrained.
    pub fn reset(&mut self) {
        self.chosen = None;
    }

    /// Number of chosen entries (0 for an untouched control).
    pub fn len(&self) -> usize {
        self.chosen.as_ref().map_or(0, BTreeSet::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop chosen values that are no longer offered. A control emptied this
    /// way returns to untouched; only the user empties a control on purpose.
    pub fn retain_available(&mut self, options: &[CellValue]) {
        let Some(chosen) = &mut self.chosen else {
            return;
        };
        let before = chosen.len();
        chosen.retain(|choice| match choice {
            Choice::All => true,
            Choice::Value(v) => options.contains(v),
        });
        if before > 0 && chosen.is_empty() {
            self.chosen = None;
        }
    }

    pub fn to_selection(&self) -> Selection {
        match &self.chosen {
            None => Selection::Unconstrained,
            Some(chosen) if chosen.contains(&Choice::All) => Selection::Unconstrained,
            Some(chosen) => Selection::values(chosen.iter().filter_map(|c| match c {
                Choice::Value(v) => Some(v.clone()),
                Choice::All => None,
            })),
        }
    }
}
