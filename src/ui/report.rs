use eframe::egui::{Color32, RichText, ScrollArea, Ui};

use crate::color::ColorMap;
use crate::config::ExplorerConfig;
use crate::data::error::ExploreError;
use crate::session::Session;
use crate::ui::{plot, tables};

// ---------------------------------------------------------------------------
// Central panel – the exploration report
// ---------------------------------------------------------------------------

/// Render every view of the current table, top to bottom. A view that
/// cannot be derived shows a message in its place.
pub fn report(ui: &mut Ui, session: &mut Session, config: &ExplorerConfig) {
    if session.table().is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("📁 Open a CSV file to start exploring  (File → Open…, or drop it here)");
        });
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("🔍 Preview of your data");
            match session.preview(config.preview_rows) {
                Ok(preview) => tables::data_table(ui, "preview", &preview, config.plot_height),
                Err(e) => problem(ui, &e),
            }

            if let Some(table) = session.table() {
                ui.heading("📊 Column names");
                tables::column_list(ui, table);
                if table.is_empty() {
                    ui.separator();
                    ui.label("The table has no rows, so there is nothing to chart.");
                    return;
                }
            }

            ui.separator();
            let counts = session.value_counts();
            let colors = match &counts {
                Ok(c) => ColorMap::new(c.counts.iter().map(|(v, _)| v)),
                Err(_) => ColorMap::new(std::iter::empty()),
            };

            ui.heading("📈 Outcome distribution");
            match &counts {
                Ok(c) => plot::count_chart(ui, c, &colors, config),
                Err(e) => problem(ui, e),
            }

            ui.separator();
            ui.heading("📉 Feature comparison");
            match session.joint_distribution() {
                Ok(joint) => plot::scatter(ui, &joint, &colors, config),
                Err(e) => problem(ui, &e),
            }

            ui.separator();
            ui.heading("📋 Summary statistics");
            match session.summary() {
                Ok(rows) => tables::summary_table(ui, &rows),
                Err(e) => problem(ui, &e),
            }

            ui.separator();
            ui.heading("📌 Correlation heatmap");
            match session.correlation() {
                Ok(corr) => plot::heatmap(ui, &corr, config),
                Err(e) => problem(ui, &e),
            }

            ui.separator();
            ui.heading("📎 Filter by feature");
            match session.filtered() {
                Ok(filtered) => {
                    if let Some(sel) = session.selection() {
                        let value = sel
                            .filter_value
                            .as_ref()
                            .map(|v| v.to_string())
                            .unwrap_or_default();
                        ui.label(format!(
                            "Filtered data where `{}` = `{value}` ({} rows):",
                            sel.filter_column,
                            filtered.row_count()
                        ));
                    }
                    tables::data_table(ui, "filtered", &filtered, 2.0 * config.plot_height);
                }
                Err(e) => problem(ui, &e),
            }
        });
}

/// Plain-language notice in place of a view.
fn problem(ui: &mut Ui, err: &ExploreError) {
    let text = match err {
        ExploreError::InsufficientColumns { found } => format!(
            "This view compares two numeric columns, but the table has {found}."
        ),
        ExploreError::StaleSelection(_) => {
            "This view is not available for the current data.".to_string()
        }
        other => other.to_string(),
    };
    ui.label(RichText::new(text).color(Color32::YELLOW));
}
