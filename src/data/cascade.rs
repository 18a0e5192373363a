use std::collections::{BTreeMap, BTreeSet};

use super::error::{DataError, DataResult};
use super::filter::{FilterSpec, Selection};
use super::model::{CellValue, Dataset, Field};

/// Distinct values of `target` among records whose `upstream` value matches
/// `upstream_selection`, in natural sort order.
pub fn resolve_options(
    dataset: &Dataset,
    upstream: Field,
    upstream_selection: &Selection,
    target: Field,
) -> Vec<CellValue> {
    if upstream_selection.is_unconstrained() {
        return dataset.distinct_values(target).cloned().collect();
    }
    let values: BTreeSet<&CellValue> = dataset
        .records()
        .iter()
        .filter(|r| upstream_selection.matches(r.get(upstream)))
        .map(|r| r.get(target))
        .collect();
    values.into_iter().cloned().collect()
}

// ---------------------------------------------------------------------------
// Cascade graph: which controls take their options from which
// ---------------------------------------------------------------------------

/// Dependencies between a page's filter controls, kept in topological order.
#[derive(Debug, Clone)]
pub struct CascadeGraph {
    /// Controls ordered so that every parent precedes its children.
    order: Vec<Field>,
    parents: BTreeMap<Field, Vec<Field>>,
}

impl CascadeGraph {
    /// Build the graph from `(parent, child)` edges.
    ///
    /// Fails when an edge names a field outside `controls` or when the
    /// edges form a cycle.
    pub fn new(controls: &[Field], edges: &[(Field, Field)]) -> DataResult<Self> {
        let mut parents: BTreeMap<Field, Vec<Field>> =
            controls.iter().map(|f| (*f, Vec::new())).collect();
        for &(parent, child) in edges {
            if !parents.contains_key(&parent) {
                return Err(DataError::UnregisteredControl(parent));
            }
            let Some(list) = parents.get_mut(&child) else {
                return Err(DataError::UnregisteredControl(child));
            };
            if !list.contains(&parent) {
                list.push(parent);
            }
        }

        // Kahn's algorithm, visiting ready nodes in control order.
        let mut remaining: BTreeMap<Field, usize> =
            parents.iter().map(|(f, p)| (*f, p.len())).collect();
        let mut order = Vec::with_capacity(controls.len());
        while order.len() < parents.len() {
            let Some(next) = controls
                .iter()
                .copied()
                .find(|f| remaining.get(f) == Some(&0) && !order.contains(f))
            else {
                let stuck = controls
                    .iter()
                    .copied()
                    .filter(|f| !order.contains(f))
                    .collect();
                return Err(DataError::CascadeCycle(stuck));
            };
            order.push(next);
            for (child, ps) in &parents {
                if ps.contains(&next) {
                    if let Some(count) = remaining.get_mut(child) {
                        *count -= 1;
                    }
                }
            }
        }

        Ok(Self { order, parents })
    }

    /// Controls in evaluation order.
    pub fn order(&self) -> &[Field] {
        &self.order
    }

    pub fn parents(&self, field: Field) -> &[Field] {
        self.parents.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Candidate values for every control given the current selections.
    ///
    /// A root control offers every distinct value; a dependent control offers
    /// the values found in records that pass all of its parents' selections.
    pub fn resolve(&self, dataset: &Dataset, spec: &FilterSpec) -> BTreeMap<Field, Vec<CellValue>> {
        let mut options = BTreeMap::new();
        for &field in &self.order {
            let parents = self.parents(field);
            let values = match parents {
                [] => dataset.distinct_values(field).cloned().collect(),
                [parent] => resolve_options(
                    dataset,
                    *parent,
                    spec.get(*parent).unwrap_or(&Selection::Unconstrained),
                    field,
                ),
                _ => {
                    let mut upstream = FilterSpec::new();
                    for parent in parents {
                        if let Some(sel) = spec.get(*parent) {
                            upstream.set(*parent, sel.clone());
                        }
                    }
                    let values: BTreeSet<&CellValue> = dataset
                        .records()
                        .iter()
                        .filter(|r| upstream.matches(r))
                        .map(|r| r.get(field))
                        .collect();
                    values.into_iter().cloned().collect()
                }
            };
            options.insert(field, values);
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;

    fn dataset() -> Dataset {
        let row = |parent: &str, vendor: &str, product: &str| {
            Record::default()
                .with(Field::ParentCategory, parent)
                .with(Field::VendorCoded, vendor)
                .with(Field::VendorProduct, product)
        };
        Dataset::from_records(vec![
            row("A", "V1", "V1 Suite"),
            row("A", "V2", "V2 Cloud"),
            row("B", "V1", "V1 Portal"),
            row("B", "V3", "V3 Lab"),
        ])
    }

    fn text(values: &[&str]) -> Vec<CellValue> {
        values.iter().map(|v| CellValue::from(*v)).collect()
    }

    #[test]
    fn wildcard_upstream_returns_everything() {
        let ds = dataset();
        let options = resolve_options(&ds, Field::ParentCategory, &Selection::Unconstrained, Field::VendorCoded);
        assert_eq!(options, text(&["V1", "V2", "V3"]));
    }

    #[test]
    fn selected_upstream_narrows_options() {
        let ds = dataset();
        let sel = Selection::from_tokens(Field::ParentCategory, ["B"]);
        let options = resolve_options(&ds, Field::ParentCategory, &sel, Field::VendorCoded);
        assert_eq!(options, text(&["V1", "V3"]));
    }

    #[test]
    fn chain_resolves_top_down() {
        let ds = dataset();
        let graph = CascadeGraph::new(
            &[Field::ParentCategory, Field::VendorCoded, Field::VendorProduct],
            &[
                (Field::VendorCoded, Field::VendorProduct),
                (Field::ParentCategory, Field::VendorCoded),
            ],
        )
        .unwrap();
        assert_eq!(
            graph.order(),
            &[Field::ParentCategory, Field::VendorCoded, Field::VendorProduct]
        );

        let spec = FilterSpec::new()
            .with(Field::ParentCategory, Selection::from_tokens(Field::ParentCategory, ["A"]))
            .with(Field::VendorCoded, Selection::from_tokens(Field::VendorCoded, ["V1"]));
        let options = graph.resolve(&ds, &spec);
        assert_eq!(options[&Field::ParentCategory], text(&["A", "B"]));
        assert_eq!(options[&Field::VendorCoded], text(&["V1", "V2"]));
        // Only the immediate parent (vendor) matters for products.
        assert_eq!(options[&Field::VendorProduct], text(&["V1 Portal", "V1 Suite"]));
    }

    #[test]
    fn multiple_parents_combine_with_and() {
        let ds = dataset();
        let graph = CascadeGraph::new(
            &[Field::ParentCategory, Field::VendorCoded, Field::VendorProduct],
            &[
                (Field::ParentCategory, Field::VendorProduct),
                (Field::VendorCoded, Field::VendorProduct),
            ],
        )
        .unwrap();
        let spec = FilterSpec::new()
            .with(Field::ParentCategory, Selection::from_tokens(Field::ParentCategory, ["B"]))
            .with(Field::VendorCoded, Selection::from_tokens(Field::VendorCoded, ["V1"]));
        let options = graph.resolve(&ds, &spec);
        assert_eq!(options[&Field::VendorProduct], text(&["V1 Portal"]));
    }

    #[test]
    fn cycle_is_rejected() {
        let err = CascadeGraph::new(
            &[Field::ParentCategory, Field::VendorCoded],
            &[
                (Field::ParentCategory, Field::VendorCoded),
                (Field::VendorCoded, Field::ParentCategory),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, DataError::CascadeCycle(_)));
    }

    #[test]
    fn edge_to_unknown_control_is_rejected() {
        let err = CascadeGraph::new(&[Field::VendorCoded], &[(Field::ParentCategory, Field::VendorCoded)])
            .unwrap_err();
        assert!(matches!(err, DataError::UnregisteredControl(Field::ParentCategory)));
    }
}
