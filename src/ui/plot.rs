use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints};

use purchase_dashboard::data::chart::{ChartData, ChartKind, ChartSpec};
use purchase_dashboard::data::model::CellValue;
use purchase_dashboard::pages::PageOutcome;

use crate::color::ColorMap;

/// Share of a category slot covered by its bars.
const GROUP_WIDTH: f64 = 0.8;

// ---------------------------------------------------------------------------
// Summary chart (central panel)
// ---------------------------------------------------------------------------

/// Render the summary chart of a page result.
pub fn summary_chart(ui: &mut Ui, spec: &ChartSpec, outcome: &PageOutcome, colors: Option<&ColorMap>) {
    let chart = &outcome.chart;
    ui.strong(spec.title);
    if chart.is_empty() {
        ui.label("Nothing to chart.");
        return;
    }

    let measure = outcome.summary.measure.label();
    let category = spec.category.label();
    let labels = chart.clone();
    let formatter = move |mark: egui_plot::GridMark, _range: &std::ops::RangeInclusive<f64>| {
        labels.category_label(mark.value).unwrap_or_default()
    };

    let plot = Plot::new("summary_chart")
        .legend(Legend::default())
        .height(360.0)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(false)
        .allow_zoom(true);
    let plot = match spec.kind {
        ChartKind::HorizontalBar => plot
            .x_axis_label(measure.clone())
            .y_axis_label(category)
            .y_axis_formatter(formatter),
        ChartKind::GroupedBar | ChartKind::Line => plot
            .x_axis_label(category)
            .y_axis_label(measure.clone())
            .x_axis_formatter(formatter),
    };

    let color_of =
        |key: &CellValue| colors.map_or(Color32::LIGHT_BLUE, |c| c.color_for(key));

    plot.show(ui, |plot_ui| match spec.kind {
        ChartKind::GroupedBar => {
            let width = GROUP_WIDTH / chart.series.len() as f64;
            for (si, series) in chart.series.iter().enumerate() {
                let offset = -GROUP_WIDTH / 2.0 + width * (si as f64 + 0.5);
                let bars = series
                    .points
                    .iter()
                    .map(|&(idx, value)| {
                        Bar::new(idx as f64 + offset, value as f64)
                            .width(width * 0.95)
                            .name(chart_label(chart, idx))
                    })
                    .collect();
                plot_ui.bar_chart(
                    BarChart::new(bars)
                        .name(series.key.label())
                        .color(color_of(&series.key)),
                );
            }
        }
        ChartKind::Line => {
            for series in &chart.series {
                let points: PlotPoints = series
                    .points
                    .iter()
                    .map(|&(idx, value)| [idx as f64, value as f64])
                    .collect();
                plot_ui.line(
                    Line::new(points)
                        .name(series.key.label())
                        .color(color_of(&series.key))
                        .width(2.0),
                );
            }
        }
        ChartKind::HorizontalBar => {
            for series in &chart.series {
                let bars = series
                    .points
                    .iter()
                    .map(|&(idx, value)| {
                        Bar::new(idx as f64, value as f64)
                            .width(GROUP_WIDTH)
                            .name(chart_label(chart, idx))
                    })
                    .collect();
                plot_ui.bar_chart(
                    BarChart::new(bars)
                        .horizontal()
                        .name(&measure)
                        .color(color_of(&series.key)),
                );
            }
        }
    });
}

fn chart_label(chart: &ChartData, idx: usize) -> String {
    chart.category_label(idx as f64).unwrap_or_default()
}
