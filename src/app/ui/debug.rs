impl crate::app::TrimApp {
    pub(in crate::app) fn ui_inspector_window(&mut self, ctx: &egui::Context) {
        if !self.debug.show_window {
            return;
        }
        let mut keep_open = self.debug.show_window;
        let mut grab_frame = false;
        let mut dump_summary = false;
        egui::Window::new("Inspector")
            .open(&mut keep_open)
            .default_width(400.0)
            .resizable(true)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    grab_frame = ui.button("Screenshot").clicked();
                    dump_summary = ui.button("Write summary").clicked();
                });
                ui.separator();
                for line in self.debug_summary() {
                    ui.monospace(line);
                }
                ui.separator();
                ui.label("Recent log");
                egui::ScrollArea::vertical()
                    .stick_to_bottom(true)
                    .max_height(200.0)
                    .show(ui, |ui| {
                        for line in &self.debug.logs {
                            ui.monospace(line);
                        }
                    });
            });
        self.debug.show_window = keep_open;
        if grab_frame {
            let path = self.next_screenshot_path();
            self.request_screenshot(ctx, path);
        }
        if dump_summary {
            self.save_debug_summary();
        }
    }
}
