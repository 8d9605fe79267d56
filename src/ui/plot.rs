use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints};

use taxi_explorer::data::Aggregation;

use crate::color::ColorMap;

// ---------------------------------------------------------------------------
// Grouped means (bar chart)
// ---------------------------------------------------------------------------

/// One bar per group, coloured by group key. Groups without a mean are
/// left out of the chart.
pub fn aggregate_chart(ui: &mut Ui, aggregation: &Aggregation, colors: Option<&ColorMap>) {
    let value_column = aggregation
        .value_columns
        .first()
        .cloned()
        .unwrap_or_default();

    let bars: Vec<Bar> = aggregation
        .groups
        .iter()
        .enumerate()
        .filter_map(|(i, group)| {
            let mean = group.means.first().copied().flatten()?;
            let color = colors.map_or(Color32::LIGHT_BLUE, |c| c.color_for(&group.key));
            Some(
                Bar::new(i as f64, mean)
                    .name(group.key.to_string())
                    .fill(color),
            )
        })
        .collect();

    Plot::new("aggregate_plot")
        .legend(Legend::default())
        .x_axis_label(aggregation.group_column.clone())
        .y_axis_label(format!("mean {value_column}"))
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name(&value_column));
        });
}

// ---------------------------------------------------------------------------
// Numeric column over row index (line chart)
// ---------------------------------------------------------------------------

pub fn series_chart(ui: &mut Ui, column: &str, points: &[(usize, f64)]) {
    let points: PlotPoints = points.iter().map(|&(i, v)| [i as f64, v]).collect();

    Plot::new("series_plot")
        .legend(Legend::default())
        .x_axis_label("Row")
        .y_axis_label(column)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(points).name(column).width(1.5));
        });
}
