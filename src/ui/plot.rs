use std::ops::RangeInclusive;

use eframe::egui::{Align2, RichText, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, Corner, GridMark, Legend, Line, Plot, PlotPoint, PlotPoints, Points, Polygon,
    Text,
};

use crate::chart::cost::CostSpec;
use crate::chart::efficiency::EfficiencySpec;
use crate::chart::format::{format_currency, format_kwh, month_at, CURRENCY_SYMBOL};
use crate::color::{self, band_fill, hex, shade, with_alpha};
use crate::config::ViewConfig;
use crate::data::loader::SAVINGS_DRIFT_TOLERANCE;

// ---------------------------------------------------------------------------
// Shared plot setup
// ---------------------------------------------------------------------------

/// Label only whole positions that fall on a month.
fn month_axis(months: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark, _range| {
        let x = mark.value;
        if x.fract() != 0.0 || x < 0.0 {
            return String::new();
        }
        months.get(x as usize).cloned().unwrap_or_default()
    }
}

/// Hover readout: the month under the cursor, then the hovered series and
/// its value.
fn hover_label(
    months: Vec<String>,
    value: fn(f64) -> String,
) -> impl Fn(&str, &PlotPoint) -> String {
    move |name, point| {
        let month = month_at(&months, point.x).unwrap_or_default();
        if name.is_empty() {
            month.to_owned()
        } else {
            format!("{month}\n{name}: {}", value(point.y))
        }
    }
}

fn base_plot(id: &str, months: Vec<String>, width: f32, height: f32) -> Plot {
    let n = months.len() as f64;
    Plot::new(id)
        .width(width)
        .height(height)
        .legend(Legend::default().position(Corner::LeftTop))
        .x_axis_formatter(month_axis(months))
        .include_x(-0.5)
        .include_x(n - 0.5)
        .include_y(0.0)
        .allow_zoom(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
}

// ---------------------------------------------------------------------------
// Efficiency: consumption bars + generation line
// ---------------------------------------------------------------------------

pub fn efficiency_plot(ui: &mut Ui, spec: &EfficiencySpec, view: &ViewConfig, width: f32) {
    let bar_color = hex(color::CONSUMPTION);
    let line_color = hex(color::GENERATION);
    let label_color = shade(bar_color, -0.15);

    let bars: Vec<Bar> = spec
        .bars()
        .into_iter()
        .zip(&spec.entries)
        .map(|([x, h], e)| {
            Bar::new(x, h)
                .width(view.bar_width)
                .name(&e.month)
                .fill(with_alpha(bar_color, 0.4))
        })
        .collect();
    let chart = BarChart::new(bars)
        .name(spec.bar_series)
        .color(with_alpha(bar_color, 0.4));

    let line_points = spec.line();
    let line = Line::new(PlotPoints::from(line_points.clone()))
        .name(spec.line_series)
        .color(line_color)
        .width(4.0);
    let markers = Points::new(PlotPoints::from(line_points))
        .name(spec.line_series)
        .color(line_color)
        .radius(5.0);

    ui.heading(spec.title);
    ui.scope(|ui: &mut Ui| {
        ui.visuals_mut().extreme_bg_color = hex(color::PLOT_BACKGROUND);
        base_plot("efficiency_plot", spec.months(), width, view.efficiency_height)
            .y_axis_label("kWh")
            .label_formatter(hover_label(spec.months(), format_kwh))
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(chart);
                plot_ui.line(line);
                plot_ui.points(markers);

                for ([x, h], e) in spec.bars().into_iter().zip(&spec.entries) {
                    let text = RichText::new(&e.bar_label)
                        .size(view.bar_label_size)
                        .strong()
                        .color(label_color);
                    plot_ui.text(
                        Text::new(PlotPoint::new(x, h + view.bar_label_offset), text)
                            .anchor(Align2::CENTER_BOTTOM),
                    );
                }
            });
    });
}

// ---------------------------------------------------------------------------
// Cost comparison: two cost lines, shaded gap, savings labels
// ---------------------------------------------------------------------------

pub fn cost_plot(ui: &mut Ui, spec: &CostSpec, view: &ViewConfig, width: f32) {
    let current_color = hex(color::CURRENT_COST);
    let previous_color = hex(color::PREVIOUS_COST);
    let label_color = hex(color::SAVINGS_LABEL);

    let current_points = spec.current_line();
    let current = Line::new(PlotPoints::from(current_points.clone()))
        .name(spec.current_series)
        .color(current_color)
        .width(3.0);
    let current_markers = Points::new(PlotPoints::from(current_points))
        .name(spec.current_series)
        .color(current_color)
        .radius(4.0);
    let previous = Line::new(PlotPoints::from(spec.previous_line()))
        .name(spec.previous_series)
        .color(previous_color)
        .width(2.0);

    ui.heading(spec.title);
    ui.scope(|ui: &mut Ui| {
        ui.visuals_mut().extreme_bg_color = hex(color::PLOT_BACKGROUND);
        base_plot("cost_plot", spec.months(), width, view.cost_height)
            .y_axis_formatter(|mark, _range| format!("{CURRENCY_SYMBOL} {:.0}", mark.value))
            .label_formatter(hover_label(spec.months(), format_currency))
            .show(ui, |plot_ui| {
                for region in spec.fill_regions() {
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(region.polygon))
                            .fill_color(band_fill(region.upper))
                            .stroke(Stroke::NONE),
                    );
                }
                plot_ui.line(previous);
                plot_ui.line(current);
                plot_ui.points(current_markers);

                for ([x, y], label) in spec.labels() {
                    let text = RichText::new(label)
                        .size(view.savings_label_size)
                        .strong()
                        .color(label_color);
                    plot_ui.text(
                        Text::new(PlotPoint::new(x, y), text).anchor(Align2::CENTER_CENTER),
                    );
                }
            });
    });

    let drifting = spec
        .entries
        .iter()
        .filter(|e| e.savings_drift().abs() > SAVINGS_DRIFT_TOLERANCE)
        .count();
    if drifting > 0 {
        ui.small(format!(
            "Savings labels follow the spreadsheet and differ from the shaded gap \
             in {drifting} month(s)."
        ));
    }
}
