//! Four-panel SVG summary of a run.
//!
//! Panels: current stock, predicted demand, current vs safety stock, and the
//! status distribution. Purely for inspection; nothing reads it back.

use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;

use stockwise_ai::{status_counts, Recommendation, StockStatus};

use crate::ReportError;

const SIZE: (u32, u32) = (1800, 1200);
const BAR_WIDTH: f64 = 0.35;

type Panel<'a> = DrawingArea<SVGBackend<'a>, Shift>;

fn chart_err<E: std::fmt::Display>(e: E) -> ReportError {
    ReportError::Chart(e.to_string())
}

/// Render the summary to `path`.
pub fn render_summary(path: &Path, recommendations: &[Recommendation]) -> Result<(), ReportError> {
    if recommendations.is_empty() {
        return Err(ReportError::Chart("no recommendations to plot".to_string()));
    }

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;
    let root = root
        .titled("Inventory Analysis Results", ("sans-serif", 32))
        .map_err(chart_err)?;

    let panels = root.split_evenly((2, 2));
    let ids: Vec<String> = recommendations
        .iter()
        .map(|r| r.inventory_id.to_string())
        .collect();

    let stock: Vec<f64> = recommendations.iter().map(|r| r.current_stock).collect();
    let demand: Vec<f64> = recommendations
        .iter()
        .map(|r| r.predicted_demand as f64)
        .collect();
    let safety: Vec<f64> = recommendations
        .iter()
        .map(|r| r.safety_stock as f64)
        .collect();

    let actions: Vec<&str> = recommendations.iter().map(action_label).collect();

    bar_panel(
        &panels[0],
        "Current Stock Levels",
        &ids,
        &[("Current Stock", stock.as_slice(), BLUE)],
        &actions,
    )?;
    bar_panel(
        &panels[1],
        "Predicted Demand",
        &ids,
        &[("Predicted Demand", demand.as_slice(), GREEN)],
        &[],
    )?;
    bar_panel(
        &panels[2],
        "Current Stock vs Safety Stock",
        &ids,
        &[
            ("Current Stock", stock.as_slice(), BLUE),
            ("Safety Stock", safety.as_slice(), RED),
        ],
        &[],
    )?;

    let counts = status_counts(recommendations);
    let labels: Vec<String> = counts.iter().map(|(s, _)| s.to_string()).collect();
    let values: Vec<f64> = counts.iter().map(|(_, n)| *n as f64).collect();
    status_panel(&panels[3], &labels, &values, counts.map(|(s, _)| status_color(s)))?;

    root.present().map_err(chart_err)?;
    Ok(())
}

/// Short bar annotation: the action's verb, or "No Action" for OK items.
fn action_label(rec: &Recommendation) -> &str {
    match rec.status {
        StockStatus::Ok => "No Action",
        _ => rec.action.split(' ').next().unwrap_or_default(),
    }
}

fn status_color(status: StockStatus) -> RGBColor {
    match status {
        StockStatus::UrgentRestock => RGBColor(214, 39, 40),
        StockStatus::Reorder => RGBColor(255, 127, 14),
        StockStatus::Ok => RGBColor(44, 160, 44),
    }
}

fn y_range<'a>(series: impl Iterator<Item = &'a f64>) -> std::ops::Range<f64> {
    let (lo, hi) = series.fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(*v), hi.max(*v)));
    let hi = if hi <= 0.0 { 1.0 } else { hi * 1.1 };
    let lo = if lo < 0.0 { lo * 1.1 } else { 0.0 };
    lo..hi
}

/// Bars per item; several series are drawn side by side. `annotations`, when
/// not empty, are written above the bars of the first series.
fn bar_panel(
    area: &Panel<'_>,
    title: &str,
    labels: &[String],
    series: &[(&str, &[f64], RGBColor)],
    annotations: &[&str],
) -> Result<(), ReportError> {
    let n = labels.len() as f64;
    let y = y_range(series.iter().flat_map(|(_, values, _)| values.iter()));

    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5f64..(n - 0.5), y)
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len())
        .x_label_formatter(&|x| index_label(labels, *x))
        .draw()
        .map_err(chart_err)?;

    let width = if series.len() > 1 { BAR_WIDTH } else { 0.8 };
    let offset0 = -(width * (series.len() as f64 - 1.0)) / 2.0;

    for (s, (name, values, color)) in series.iter().enumerate() {
        let offset = offset0 + width * s as f64;
        let color = *color;
        chart
            .draw_series(values.iter().enumerate().map(move |(i, v)| {
                let center = i as f64 + offset;
                Rectangle::new(
                    [(center - width / 2.0, 0.0), (center + width / 2.0, *v)],
                    color.filled(),
                )
            }))
            .map_err(chart_err)?
            .label(*name)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    if let Some((_, values, _)) = series.first() {
        let style = ("sans-serif", 14).into_font().color(&RED);
        chart
            .draw_series(annotations.iter().zip(values.iter()).enumerate().map(|(i, (text, v))| {
                Text::new(text.to_string(), (i as f64, *v), style.clone())
            }))
            .map_err(chart_err)?;
    }

    if series.len() > 1 {
        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(chart_err)?;
    }
    Ok(())
}

fn status_panel(
    area: &Panel<'_>,
    labels: &[String],
    counts: &[f64],
    colors: [RGBColor; 3],
) -> Result<(), ReportError> {
    let total: f64 = counts.iter().sum();
    let y = y_range(counts.iter());

    let mut chart = ChartBuilder::on(area)
        .caption("Inventory Status Distribution", ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(-0.5f64..(labels.len() as f64 - 0.5), y)
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len())
        .x_label_formatter(&|x| {
            let i = x.round() as usize;
            match (labels.get(i), counts.get(i)) {
                (Some(l), Some(c)) if total > 0.0 => format!("{l} ({:.1}%)", c / total * 100.0),
                (Some(l), _) => l.clone(),
                _ => String::new(),
            }
        })
        .draw()
        .map_err(chart_err)?;

    chart
        .draw_series(counts.iter().zip(colors).enumerate().map(|(i, (c, color))| {
            let x = i as f64;
            Rectangle::new([(x - 0.4, 0.0), (x + 0.4, *c)], color.filled())
        }))
        .map_err(chart_err)?;
    Ok(())
}

fn index_label(labels: &[String], x: f64) -> String {
    let i = x.round();
    if i < 0.0 || (x - i).abs() > 1e-6 {
        return String::new();
    }
    labels.get(i as usize).cloned().unwrap_or_default()
}
