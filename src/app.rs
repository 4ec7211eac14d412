use eframe::egui;

use crate::config::ExplorerConfig;
use crate::session::Session;
use crate::ui::{panels, report};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ExplorerApp {
    pub session: Session,
    pub config: ExplorerConfig,
    /// Error from the last upload, shown in the top bar.
    pub status_message: Option<String>,
}

impl ExplorerApp {
    pub fn new(config: ExplorerConfig) -> Self {
        Self {
            session: Session::new(),
            config,
            status_message: None,
        }
    }
}

impl eframe::App for ExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        panels::handle_dropped_files(ctx, &mut self.session, &mut self.status_message);

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.session, &mut self.status_message);
        });

        // ---- Left side panel: selections ----
        egui::SidePanel::left("selection_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.session);
            });

        // ---- Central panel: report ----
        egui::CentralPanel::default().show(ctx, |ui| {
            report::report(ui, &mut self.session, &self.config);
        });
    }
}
