use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use purchase_dashboard::data::export::EXPORT_FILE_NAME;
use purchase_dashboard::data::filter::Choice;
use purchase_dashboard::data::loader::load_file;
use purchase_dashboard::data::model::Field;
use purchase_dashboard::pages::Page;

use crate::state::AppState;
use crate::ui::{plot, table};

// ---------------------------------------------------------------------------
// Left side panel – page menu and filter widgets
// ---------------------------------------------------------------------------

/// Render the left panel: page selection, filters and the Show button.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Menu");
    ui.separator();

    let mut page = state.page;
    for candidate in Page::ALL {
        ui.radio_value(&mut page, candidate, candidate.title());
    }
    state.set_page(page);

    let Some(layout) = state.layout() else {
        return;
    };
    ui.separator();
    ui.heading("Filters");

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .max_height(ui.available_height() - 40.0)
        .show(ui, |ui: &mut Ui| {
            for field in layout.controls {
                filter_control(ui, state, *field);
            }
        });

    ui.separator();
    if ui.button("Show").clicked() {
        state.show();
    }
}

/// One collapsible multiselect: "All" plus every offered value.
fn filter_control(ui: &mut Ui, state: &mut AppState, field: Field) {
    // Clone what we need so we can mutate state inside the closure.
    let values = state.options.get(&field).cloned().unwrap_or_default();
    let control = state.controls.get(&field).cloned().unwrap_or_default();

    let summary = if !control.is_touched() {
        "any".to_string()
    } else if control.is_checked(&Choice::All) {
        "All".to_string()
    } else {
        format!("{}/{}", control.len(), values.len())
    };
    let header_text = format!("Select {}  ({summary})", field.label());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(field.column_name())
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("None").clicked() {
                    state.select_none(field);
                }
                if ui.small_button("Reset").clicked() {
                    state.clear_control(field);
                }
            });

            let mut all = control.is_checked(&Choice::All);
            if ui.checkbox(&mut all, "All").changed() {
                state.set_choice(field, Choice::All, all);
            }
            for value in values {
                let label = value.label();
                let choice = Choice::Value(value);
                let mut checked = control.is_checked(&choice);
                if ui.checkbox(&mut checked, label).changed() {
                    state.set_choice(field, choice, checked);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Central panel – page content
// ---------------------------------------------------------------------------

/// Render the selected page.
pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading(state.page.title());
    ui.separator();

    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a purchases file to begin  (File → Open…)");
        });
        return;
    }

    let Some(layout) = state.layout() else {
        home(ui, state);
        return;
    };

    let Some(outcome) = &state.outcome else {
        ui.label("Choose filters in the sidebar and press Show.");
        return;
    };

    let mut download = false;
    ScrollArea::vertical().show(ui, |ui: &mut Ui| {
        ui.label(format!(
            "Showing data for selected categories: {} records",
            outcome.filtered.len()
        ));
        ui.push_id("records_table", |ui: &mut Ui| {
            table::records_table(ui, &outcome.filtered, layout.table_columns);
        });
        ui.add_space(12.0);

        plot::summary_chart(ui, &layout.chart, outcome, state.color_map.as_ref());
        ui.add_space(8.0);

        ui.horizontal(|ui: &mut Ui| {
            download = ui.button("Download Filtered Data").clicked();
            if ui.button("Copy as CSV").clicked() {
                match state.export_text() {
                    Some(Ok(text)) => ui.ctx().copy_text(text),
                    Some(Err(e)) => log::error!("Failed to encode CSV: {e}"),
                    None => {}
                }
            }
        });
    });

    if download {
        save_file_dialog(state);
    }
}

fn home(ui: &mut Ui, state: &AppState) {
    ui.label("Welcome to the purchases dashboard. Pick a report in the sidebar.");
    let Some(overview) = &state.overview else {
        return;
    };
    ui.add_space(8.0);
    egui::Grid::new("overview").num_columns(2).show(ui, |ui: &mut Ui| {
        ui.label("Purchase records");
        ui.strong(overview.records.to_string());
        ui.end_row();
        ui.label("Institutions");
        ui.strong(overview.institutions.to_string());
        ui.end_row();
        ui.label("Vendors");
        ui.strong(overview.vendors.to_string());
        ui.end_row();
        if let Some((first, last)) = overview.years {
            ui.label("Years");
            ui.strong(format!("{first} – {last}"));
            ui.end_row();
        }
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            let shown = state
                .outcome
                .as_ref()
                .map_or(String::new(), |o| format!(", {} shown", o.filtered.len()));
            ui.label(format!("{} records loaded{shown}", ds.len()));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open purchases data")
        .add_filter("Supported files", &["xlsx", "xlsm", "xls", "ods", "csv", "json", "parquet", "pq"])
        .add_filter("Excel", &["xlsx", "xlsm", "xls"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match load_file(&path, &state.sheet) {
            Ok(dataset) => state.set_dataset(dataset),
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

fn save_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Download filtered data")
        .set_file_name(EXPORT_FILE_NAME)
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        match state.export_to(&path) {
            Some(Ok(())) => state.status_message = None,
            Some(Err(e)) => {
                log::error!("Failed to export {}: {e}", path.display());
                state.status_message = Some(format!("Error: {e}"));
            }
            None => log::warn!("Nothing to export; press Show first"),
        }
    }
}
