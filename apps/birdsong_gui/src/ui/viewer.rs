//! 全图查看窗口

use egui::Sense;

use crate::state::AppState;

pub struct ImageViewer;

impl ImageViewer {
    pub fn show(ctx: &egui::Context, state: &mut AppState) {
        let Some((name, path)) = state.viewer_image.clone() else {
            return;
        };

        let mut open = true;
        egui::Window::new(name)
            .open(&mut open)
            .collapsible(false)
            .resizable(true)
            .default_size([480.0, 480.0])
            .show(ctx, |ui| {
                let uri = format!("file://{}", path.display());
                let response = ui.add(
                    egui::Image::new(uri)
                        .max_size(ui.available_size())
                        .sense(Sense::click()),
                );
                // 点图也可以关掉
                if response.clicked() {
                    state.viewer_image = None;
                }
            });

        if !open {
            state.viewer_image = None;
        }
    }
}
