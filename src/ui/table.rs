use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use purchase_dashboard::data::model::{Dataset, Field};

const ROW_HEIGHT: f32 = 18.0;

// ---------------------------------------------------------------------------
// Filtered records table
// ---------------------------------------------------------------------------

/// Render `columns` of every record, virtualised so large results stay fast.
pub fn records_table(ui: &mut Ui, dataset: &Dataset, columns: &[Field]) {
    if dataset.is_empty() {
        ui.label("No records match the selected filters.");
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .max_scroll_height(280.0)
        .columns(Column::auto().at_least(90.0).clip(true), columns.len())
        .header(ROW_HEIGHT + 4.0, |mut header| {
            for field in columns {
                header.col(|ui| {
                    ui.strong(field.label());
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, dataset.len(), |mut row| {
                let record = &dataset.records()[row.index()];
                for field in columns {
                    row.col(|ui| {
                        ui.label(record.get(*field).label());
                    });
                }
            });
        });
}
