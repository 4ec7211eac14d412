use std::collections::BTreeMap;

use eframe::egui::{self, Align2, FontId, Rect, Sense, Stroke, Ui, Vec2};
use egui_plot::{Bar, BarChart, Legend, Plot, PlotPoints, Points};

use crate::color::{coolwarm, text_color_on, ColorMap};
use crate::config::ExplorerConfig;
use crate::data::derive::{CorrelationMatrix, JointDistribution, ValueCounts};
use crate::data::model::Value;

// ---------------------------------------------------------------------------
// Outcome distribution (bar chart)
// ---------------------------------------------------------------------------

/// One bar per outcome value, coloured like the scatter legend.
pub fn count_chart(ui: &mut Ui, counts: &ValueCounts, colors: &ColorMap, config: &ExplorerConfig) {
    ui.label(format!(
        "{} rows across {} values of {}",
        counts.total(),
        counts.counts.len(),
        counts.column
    ));

    Plot::new("outcome_counts")
        .legend(Legend::default())
        .height(config.plot_height)
        .x_axis_label(counts.column.clone())
        .y_axis_label("count")
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            for (i, (value, n)) in counts.counts.iter().enumerate() {
                let bar = Bar::new(i as f64, *n as f64).width(0.7);
                let chart = BarChart::new(vec![bar])
                    .color(colors.color_for(value))
                    .name(value.to_string());
                plot_ui.bar_chart(chart);
            }
        });
}

// ---------------------------------------------------------------------------
// Feature comparison (scatter)
// ---------------------------------------------------------------------------

/// X vs Y, one point series per outcome value. Rows missing either
/// coordinate are not drawn.
pub fn scatter(ui: &mut Ui, joint: &JointDistribution, colors: &ColorMap, config: &ExplorerConfig) {
    let mut groups: BTreeMap<&Value, Vec<[f64; 2]>> = BTreeMap::new();
    for point in &joint.points {
        if let (Some(x), Some(y)) = (point.x, point.y) {
            groups.entry(&point.outcome).or_default().push([x, y]);
        }
    }

    ui.label(format!(
        "{} vs {} by {}",
        joint.x_column, joint.y_column, joint.outcome_column
    ));

    Plot::new("feature_comparison")
        .legend(Legend::default())
        .height(config.plot_height)
        .x_axis_label(joint.x_column.clone())
        .y_axis_label(joint.y_column.clone())
        .allow_boxed_zoom(true)
        .show(ui, |plot_ui| {
            for (value, coords) in groups {
                let points: PlotPoints = coords.into_iter().collect();
                plot_ui.points(
                    Points::new(points)
                        .radius(config.scatter_point_radius)
                        .color(colors.color_for(value))
                        .name(value.to_string()),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Correlation heatmap
// ---------------------------------------------------------------------------

const LABEL_WIDTH: f32 = 130.0;
const HEADER_HEIGHT: f32 = 24.0;
const SCALE_WIDTH: f32 = 18.0;

/// Annotated N×N grid of correlation coefficients with a colour scale.
pub fn heatmap(ui: &mut Ui, corr: &CorrelationMatrix, config: &ExplorerConfig) {
    if corr.is_empty() {
        ui.label("No numeric columns to correlate.");
        return;
    }

    let n = corr.len();
    let cell = config.heatmap_cell_size;
    let grid = cell * n as f32;
    let size = Vec2::new(LABEL_WIDTH + grid + 3.0 * SCALE_WIDTH + 30.0, HEADER_HEIGHT + grid);
    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    let origin = response.rect.min + Vec2::new(LABEL_WIDTH, HEADER_HEIGHT);
    let font = FontId::proportional(11.0);
    let label_color = ui.visuals().text_color();
    let decimals = config.heatmap_decimals;

    for (i, name) in corr.columns.iter().enumerate() {
        let offset = (i as f32 + 0.5) * cell;
        painter.text(
            origin + Vec2::new(-6.0, offset),
            Align2::RIGHT_CENTER,
            name,
            font.clone(),
            label_color,
        );
        painter.text(
            origin + Vec2::new(offset, -4.0),
            Align2::CENTER_BOTTOM,
            abbreviate(name, cell),
            font.clone(),
            label_color,
        );
    }

    for i in 0..n {
        for j in 0..n {
            let rect = Rect::from_min_size(
                origin + Vec2::new(j as f32 * cell, i as f32 * cell),
                Vec2::splat(cell),
            );
            let v = corr.get(i, j);
            let fill = coolwarm(v);
            painter.rect_filled(rect.shrink(1.0), 2.0, fill);
            let text = if v.is_nan() {
                "nan".to_string()
            } else {
                format!("{v:.decimals$}")
            };
            painter.text(rect.center(), Align2::CENTER_CENTER, text, font.clone(), text_color_on(fill));
        }
    }

    // Colour scale from +1 (top) to -1 (bottom).
    let scale_left = origin.x + grid + SCALE_WIDTH;
    let steps = 40;
    let step_h = grid / steps as f32;
    for k in 0..steps {
        let v = 1.0 - 2.0 * (k as f64 + 0.5) / steps as f64;
        let rect = Rect::from_min_size(
            egui::pos2(scale_left, origin.y + k as f32 * step_h),
            Vec2::new(SCALE_WIDTH, step_h + 0.5),
        );
        painter.rect_filled(rect, 0.0, coolwarm(v));
    }
    let scale_rect = Rect::from_min_size(egui::pos2(scale_left, origin.y), Vec2::new(SCALE_WIDTH, grid));
    painter.rect_stroke(scale_rect, 0.0, Stroke::new(1.0, label_color), egui::StrokeKind::Outside);
    for (label, y) in [("1", origin.y), ("0", origin.y + grid / 2.0), ("-1", origin.y + grid)] {
        painter.text(
            egui::pos2(scale_rect.right() + 4.0, y),
            Align2::LEFT_CENTER,
            label,
            font.clone(),
            label_color,
        );
    }

    if let Some(pos) = response.hover_pos() {
        let rel = pos - origin;
        if rel.x >= 0.0 && rel.y >= 0.0 && rel.x < grid && rel.y < grid {
            let (i, j) = ((rel.y / cell) as usize, (rel.x / cell) as usize);
            response.on_hover_text(format!(
                "{} × {}: {:.4}",
                corr.columns[i],
                corr.columns[j],
                corr.get(i, j)
            ));
        }
    }
}

/// Shorten a column name to roughly fit a cell of the given width.
fn abbreviate(name: &str, cell: f32) -> String {
    let max_chars = ((cell / 7.0) as usize).max(3);
    if name.chars().count() <= max_chars {
        name.to_string()
    } else {
        let mut short: String = name.chars().take(max_chars - 1).collect();
        short.push('…');
        short
    }
}
