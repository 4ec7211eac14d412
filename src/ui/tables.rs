use eframe::egui::{self, Align, Layout, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::derive::SummaryRow;
use crate::data::model::Table;

const ROW_HEIGHT: f32 = 18.0;
const HEADER_HEIGHT: f32 = 20.0;

/// Scrollable grid of a whole table with a leading row-number column.
pub fn data_table(ui: &mut Ui, id: &str, table: &Table, max_height: f32) {
    let columns = table.columns();

    ui.push_id(id, |ui: &mut Ui| {
        ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .max_scroll_height(max_height)
                .cell_layout(Layout::left_to_right(Align::Center))
                .column(Column::auto())
                .columns(Column::auto().at_least(60.0), columns.len())
                .header(HEADER_HEIGHT, |mut header| {
                    header.col(|ui| {
                        ui.strong("#");
                    });
                    for col in columns {
                        header.col(|ui| {
                            ui.strong(col.name.as_str());
                        });
                    }
                })
                .body(|body| {
                    body.rows(ROW_HEIGHT, table.row_count(), |mut row| {
                        let r = row.index();
                        row.col(|ui| {
                            ui.label(r.to_string());
                        });
                        for col in columns {
                            row.col(|ui| {
                                ui.label(col.values[r].to_string());
                            });
                        }
                    });
                });
        });
    });
}

/// Statistics as rows, numeric columns as columns.
pub fn summary_table(ui: &mut Ui, rows: &[SummaryRow]) {
    if rows.is_empty() {
        ui.label("No numeric columns to summarise.");
        return;
    }

    ui.push_id("summary", |ui: &mut Ui| {
        ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .vscroll(false)
                .cell_layout(Layout::left_to_right(Align::Center))
                .column(Column::auto())
                .columns(Column::auto().at_least(70.0), rows.len())
                .header(HEADER_HEIGHT, |mut header| {
                    header.col(|_| {});
                    for summary in rows {
                        header.col(|ui| {
                            ui.strong(summary.column.as_str());
                        });
                    }
                })
                .body(|body| {
                    body.rows(ROW_HEIGHT, SummaryRow::LABELS.len(), |mut row| {
                        let stat = row.index();
                        row.col(|ui| {
                            ui.strong(SummaryRow::LABELS[stat]);
                        });
                        for summary in rows {
                            let value = summary.values()[stat];
                            row.col(|ui| {
                                ui.label(format_stat(stat, value));
                            });
                        }
                    });
                });
        });
    });
}

/// Counts print as integers, everything else with four decimals.
fn format_stat(stat: usize, value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if stat == 0 {
        format!("{value:.0}")
    } else {
        format!("{value:.4}")
    }
}

/// Column names as a wrapped list; numeric ones are marked.
pub fn column_list(ui: &mut Ui, table: &Table) {
    let schema = table.schema();
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for name in schema.columns() {
            if schema.is_numeric(name) {
                ui.label(egui::RichText::new(format!("{name} #")).strong());
            } else {
                ui.label(name.as_str());
            }
        }
    });
    ui.small("# numeric");
}
