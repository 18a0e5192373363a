use std::collections::BTreeMap;
use std::path::Path;

use purchase_dashboard::data::export::{save_csv, to_csv_string};
use purchase_dashboard::data::filter::{Choice, ControlSelection, FilterSpec};
use purchase_dashboard::data::model::{CellValue, Dataset, Field};
use purchase_dashboard::data::DataResult;
use purchase_dashboard::pages::{DatasetOverview, Page, PageLayout, PageOutcome};

use crate::color::ColorMap;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<Dataset>,

    /// Headline numbers for the home page.
    pub overview: Option<DatasetOverview>,

    /// Sheet read from spreadsheet files.
    pub sheet: String,

    /// Page selected in the sidebar.
    pub page: Page,

    /// Multiselect state of the current page's controls.
    pub controls: BTreeMap<Field, ControlSelection>,

    /// Values offered by each control, after cascading.
    pub options: BTreeMap<Field, Vec<CellValue>>,

    /// Result of the last "Show" on the current page.
    pub outcome: Option<PageOutcome>,

    /// Colours of the current chart's series.
    pub color_map: Option<ColorMap>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(sheet: String) -> Self {
        Self {
            dataset: None,
            overview: None,
            sheet,
            page: Page::default(),
            controls: BTreeMap::new(),
            options: BTreeMap::new(),
            outcome: None,
            color_map: None,
            status_message: None,
        }
    }

    pub fn layout(&self) -> Option<&'static PageLayout> {
        self.page.layout()
    }

    /// Ingest a newly loaded dataset and reset the page state.
    pub fn set_dataset(&mut self, dataset: Dataset) {
        self.overview = Some(DatasetOverview::of(&dataset));
        self.dataset = Some(dataset);
        self.status_message = None;
        self.reset_page();
    }

    /// Switch page; selections and results do not carry over.
    pub fn set_page(&mut self, page: Page) {
        if self.page != page {
            self.page = page;
            self.reset_page();
        }
    }

    fn reset_page(&mut self) {
        self.controls.clear();
        self.outcome = None;
        self.color_map = None;
        self.refresh_options();
    }

    /// Current selections of the page's controls.
    pub fn filter_spec(&self) -> FilterSpec {
        let mut spec = FilterSpec::new();
        if let Some(layout) = self.layout() {
            for field in layout.controls {
                let selection = self
                    .controls
                    .get(field)
                    .map(ControlSelection::to_selection)
                    .unwrap_or_default();
                spec.set(*field, selection);
            }
        }
        spec
    }

    /// Recompute the option lists and drop selections that are no longer offered.
    pub fn refresh_options(&mut self) {
        self.options.clear();
        let (Some(dataset), Some(layout)) = (&self.dataset, self.page.layout()) else {
            return;
        };
        let graph = match layout.cascade() {
            Ok(graph) => graph,
            Err(e) => {
                log::error!("Invalid page layout: {e}");
                self.status_message = Some(format!("Error: {e}"));
                return;
            }
        };

        // Pruning a parent can shrink a child's options, so repeat until stable.
        loop {
            let options = graph.resolve(dataset, &self.filter_spec());
            let mut changed = false;
            for (field, values) in &options {
                if let Some(control) = self.controls.get_mut(field) {
                    let before = control.len();
                    control.retain_available(values);
                    changed |= control.len() != before;
                }
            }
            self.options = options;
            if !changed {
                break;
            }
        }
    }

    /// Check or uncheck one entry of a control.
    pub fn set_choice(&mut self, field: Field, choice: Choice, checked: bool) {
        self.controls
            .entry(field)
            .or_default()
            .set_checked(choice, checked);
        self.refresh_options();
    }

    /// Deselect everything in a control (matches no records).
    pub fn select_none(&mut self, field: Field) {
        let control = self.controls.entry(field).or_default();
        control.reset();
        control.set_checked(Choice::All, false);
        self.refresh_options();
    }

    /// Forget the user's interaction with a control.
    pub fn clear_control(&mut self, field: Field) {
        self.controls.remove(&field);
        self.refresh_options();
    }

    /// Run the current page with the current selections ("Show").
    pub fn show(&mut self) {
        let (Some(dataset), Some(layout)) = (&self.dataset, self.layout()) else {
            return;
        };
        match layout.run(dataset, &self.filter_spec()) {
            Ok(outcome) => {
                self.color_map = Some(ColorMap::new(outcome.chart.series.iter().map(|s| &s.key)));
                self.outcome = Some(outcome);
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to build '{}': {e}", self.page.title());
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Write the filtered rows of the last result as CSV; `None` when there is
    /// no result to export.
    pub fn export_to(&self, path: &Path) -> Option<DataResult<()>> {
        let outcome = self.outcome.as_ref()?;
        let layout = self.layout()?;
        Some(save_csv(path, &outcome.filtered, layout.export_columns))
    }

    /// The CSV export as text, for the clipboard.
    pub fn export_text(&self) -> Option<DataResult<String>> {
        let outcome = self.outcome.as_ref()?;
        let layout = self.layout()?;
        Some(to_csv_string(&outcome.filtered, layout.export_columns))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use purchase_dashboard::data::model::Record;

    fn dataset() -> Dataset {
        let row = |parent: &str, product: &str, vendor: &str, fice: i64| {
            Record::default()
                .with(Field::ParentCategory, parent)
                .with(Field::ProductCategory, product)
                .with(Field::VendorCoded, vendor)
                .with(Field::YearPurchased, CellValue::Integer(2020))
                .with(Field::Fice, CellValue::Integer(fice))
        };
        Dataset::from_records(vec![
            row("A", "LMS", "V1", 1),
            row("A", "ERP", "V2", 1),
            row("B", "CRM", "V1", 2),
        ])
    }

    fn state_on(page: Page) -> AppState {
        let mut state = AppState::new("Sheet1".to_string());
        state.set_dataset(dataset());
        state.set_page(page);
        state
    }

    #[test]
    fn untouched_page_shows_everything() {
        let mut state = state_on(Page::ProductCategoryDistribution);
        state.show();
        let outcome = state.outcome.as_ref().unwrap();
        assert_eq!(outcome.filtered.len(), 3);
        assert_eq!(outcome.summary.total(), 3);
    }

    #[test]
    fn parent_choice_narrows_dependent_options() {
        let mut state = state_on(Page::ProductCategoryDistribution);
        state.set_choice(Field::ProductCategory, Choice::Value("CRM".into()), true);
        state.set_choice(Field::ParentCategory, Choice::Value("A".into()), true);

        assert_eq!(
            state.options[&Field::ProductCategory],
            vec![CellValue::from("ERP"), CellValue::from("LMS")]
        );
        // CRM is no longer offered; dropping it leaves the control untouched.
        assert!(!state.controls[&Field::ProductCategory].is_touched());
        state.show();
        let outcome = state.outcome.as_ref().unwrap();
        assert_eq!(outcome.filtered.len(), 2);
        assert!(outcome
            .filtered
            .records()
            .iter()
            .all(|r| r.get(Field::ParentCategory) == &CellValue::from("A")));
    }

    #[test]
    fn select_none_matches_nothing() {
        let mut state = state_on(Page::TopVendors);
        state.select_none(Field::VendorCoded);
        state.show();
        let outcome = state.outcome.as_ref().unwrap();
        assert!(outcome.filtered.is_empty());
        assert!(outcome.summary.is_empty());
        assert_eq!(state.export_text().unwrap().unwrap(), "Vendor Coded,Year Purchased,Parent Category,FICE\n");
    }

    #[test]
    fn export_needs_a_result() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filtered_data.csv");
        let mut state = state_on(Page::PurchaseTrend);
        assert!(state.export_to(&path).is_none());
        assert!(!path.exists());

        state.show();
        state.export_to(&path).unwrap().unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Year Purchased,Parent Category,Vendor & Product Name\n"));
        assert_eq!(text.lines().count(), 4);
    }

    #[test]
    fn changing_page_clears_results() {
        let mut state = state_on(Page::TopVendors);
        state.show();
        assert!(state.outcome.is_some());
        state.set_page(Page::PurchaseTrend);
        assert!(state.outcome.is_none());
        assert!(state.controls.is_empty());
        state.set_page(Page::Home);
        state.show();
        assert!(state.outcome.is_none());
    }
}
