use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::loader::FileFormat;
use crate::session::{Session, SelectionChange};

// ---------------------------------------------------------------------------
// Left side panel – selection widgets
// ---------------------------------------------------------------------------

/// Render the selection panel. Every combo box only offers legal options.
pub fn side_panel(ui: &mut Ui, session: &mut Session) {
    ui.heading("Selections");
    ui.separator();

    let (Some(schema), Some(selection)) = (session.schema(), session.selection()) else {
        ui.label("No dataset loaded.");
        return;
    };

    // Clone what we need so we can mutate the session afterwards.
    let columns = schema.columns().to_vec();
    let numeric: Vec<String> = schema
        .numeric_columns()
        .into_iter()
        .map(str::to_string)
        .collect();
    let selection = selection.clone();
    let filter_options = session.filter_options();

    let mut changes = Vec::new();
    let mut reset = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.strong("🎯 Outcome column");
            column_combo(ui, "outcome", &selection.outcome_column, &columns, |c| {
                changes.push(SelectionChange::Outcome(c))
            });
            ui.separator();

            ui.strong("📉 Feature comparison");
            if numeric.len() < 2 {
                ui.label(
                    RichText::new("Needs at least two numeric columns.").color(Color32::YELLOW),
                );
            } else {
                ui.label("X-axis feature");
                let x = selection.x_feature.clone().unwrap_or_default();
                column_combo(ui, "x_feature", &x, &numeric, |c| {
                    changes.push(SelectionChange::XFeature(c))
                });
                ui.label("Y-axis feature");
                let y = selection.y_feature.clone().unwrap_or_default();
                column_combo(ui, "y_feature", &y, &numeric, |c| {
                    changes.push(SelectionChange::YFeature(c))
                });
            }
            ui.separator();

            ui.strong("📎 Filter by feature");
            ui.label("Column");
            column_combo(ui, "filter_column", &selection.filter_column, &columns, |c| {
                changes.push(SelectionChange::FilterColumn(c))
            });

            ui.label(format!("Value of {}", selection.filter_column));
            let current = selection
                .filter_value
                .as_ref()
                .map(|v| v.to_string())
                .unwrap_or_default();
            egui::ComboBox::from_id_salt("filter_value")
                .selected_text(current)
                .show_ui(ui, |ui: &mut Ui| {
                    for value in &filter_options {
                        let is_selected = selection.filter_value.as_ref() == Some(value);
                        if ui.selectable_label(is_selected, value.to_string()).clicked() {
                            changes.push(SelectionChange::FilterValue(value.clone()));
                        }
                    }
                });
            ui.separator();
            if ui.button("↺ Reset selections").clicked() {
                reset = true;
            }
        });

    if reset {
        session.reset_selection();
        return;
    }

    // Apply the frame's picks together; a rejected pick rolls back the rest.
    for change in changes {
        if let Err(e) = session.set(change) {
            log::error!("Rejected selection: {e}");
            if let Err(e) = session.restore(selection) {
                log::warn!("Could not restore previous selection: {e}");
            }
            break;
        }
    }
}

fn column_combo(
    ui: &mut Ui,
    id: &str,
    current: &str,
    options: &[String],
    mut on_pick: impl FnMut(String),
) {
    egui::ComboBox::from_id_salt(id)
        .selected_text(current)
        .show_ui(ui, |ui: &mut Ui| {
            for col in options {
                let is_current = current == col.as_str();
                if ui.selectable_label(is_current, col.as_str()).clicked() && !is_current {
                    on_pick(col.clone());
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, session: &mut Session, status: &mut Option<String>) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(session, status);
                ui.close_menu();
            }
        });

        ui.separator();

        match (session.source_name(), session.table()) {
            (Some(name), Some(table)) => {
                ui.label(format!(
                    "✅ {name}: {} rows × {} columns",
                    table.row_count(),
                    table.columns().len()
                ));
            }
            _ => {
                ui.label("Upload a dataset to explore patterns, visualize trends, and understand risk factors.");
            }
        }

        if let Some(msg) = status {
            ui.separator();
            ui.label(RichText::new(msg.as_str()).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Uploads
// ---------------------------------------------------------------------------

pub fn open_file_dialog(session: &mut Session, status: &mut Option<String>) {
    let file = rfd::FileDialog::new()
        .set_title("Choose a data file")
        .add_filter("Supported files", &["csv", "tsv", "tab", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("TSV", &["tsv", "tab"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        *status = session.open(&path).err().map(|e| e.to_string());
    }
}

/// Load files dropped onto the window. Only the last one is kept.
pub fn handle_dropped_files(ctx: &egui::Context, session: &mut Session, status: &mut Option<String>) {
    let dropped = ctx.input(|i| i.raw.dropped_files.clone());
    for file in dropped {
        let result = if let Some(path) = &file.path {
            session.open(path)
        } else if let Some(bytes) = &file.bytes {
            FileFormat::from_path(std::path::Path::new(&file.name))
                .and_then(|format| session.upload(file.name.clone(), bytes, format))
        } else {
            continue;
        };
        *status = result.err().map(|e| e.to_string());
    }
}
