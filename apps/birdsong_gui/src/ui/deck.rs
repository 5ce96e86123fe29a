//! 标题栏与底部进度条

use egui::{Align, Layout, RichText, Ui};

use crate::state::AppState;
use crate::ui::theme::BirdsongTheme;

pub struct PlayerDeck;

impl PlayerDeck {
    /// 顶部：标题 + 音量滑条
    pub fn header(ui: &mut Ui, state: &mut AppState) {
        ui.add_space(8.0);
        ui.vertical_centered(|ui| {
            ui.label(
                RichText::new("🐦 Birdsong 🐦")
                    .size(26.0)
                    .color(BirdsongTheme::ACCENT_PRIMARY)
                    .strong(),
            );
        });
        ui.add_space(4.0);

        ui.horizontal(|ui| {
            ui.label(RichText::new("🔈").color(BirdsongTheme::TEXT_MUTED));

            let mut volume = state.volume;
            let width = (ui.available_width() - 40.0).max(80.0);
            let slider = egui::Slider::new(&mut volume, 0.0..=1.0).show_value(false);
            if ui.add_sized([width, 16.0], slider).changed() {
                state.set_volume(volume);
            }

            ui.label(RichText::new("🔊").color(BirdsongTheme::TEXT_MUTED));
        });

        if let Some(err) = &state.last_error {
            ui.label(
                RichText::new(err)
                    .size(11.0)
                    .color(egui::Color32::from_rgb(200, 60, 60)),
            );
        }
        ui.add_space(6.0);
    }

    /// 底部：播放时的进度条和时间标签
    pub fn progress_strip(ui: &mut Ui, state: &AppState) {
        ui.add_space(6.0);

        let progress = if state.duration > 0.0 {
            (state.position / state.duration).clamp(0.0, 1.0)
        } else {
            0.0
        };
        ui.add(
            egui::ProgressBar::new(progress as f32)
                .desired_height(5.0)
                .fill(BirdsongTheme::ACCENT_PRIMARY),
        );

        ui.horizontal(|ui| {
            ui.label(
                RichText::new(format_time(state.position))
                    .size(11.0)
                    .color(BirdsongTheme::TEXT_MUTED)
                    .monospace(),
            );
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                ui.label(
                    RichText::new(format_time(state.duration))
                        .size(11.0)
                        .color(BirdsongTheme::TEXT_MUTED)
                        .monospace(),
                );
            });
        });
        ui.add_space(6.0);
    }
}

/// m:ss，异常输入一律显示 0:00
pub fn format_time(secs: f64) -> String {
    if !secs.is_finite() || secs < 0.0 {
        return "0:00".to_string();
    }
    let total = secs as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(7.9), "0:07");
        assert_eq!(format_time(59.0), "0:59");
        assert_eq!(format_time(65.0), "1:05");
        assert_eq!(format_time(600.0), "10:00");
    }

    #[test]
    fn test_format_time_rejects_garbage() {
        assert_eq!(format_time(-3.0), "0:00");
        assert_eq!(format_time(f64::NAN), "0:00");
        assert_eq!(format_time(f64::INFINITY), "0:00");
    }
}
