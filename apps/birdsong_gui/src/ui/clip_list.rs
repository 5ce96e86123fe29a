//! 鸟鸣列表

use std::path::{Path, PathBuf};

use egui::{Align, Layout, RichText, Rounding, ScrollArea, Stroke, Ui};

use crate::state::AppState;
use crate::ui::theme::BirdsongTheme;

pub struct ClipList;

enum RowAction {
    Play(String),
    Stop,
    ShowImage(String, PathBuf),
}

impl ClipList {
    pub fn show(ui: &mut Ui, state: &mut AppState) {
        // 先收集行数据，点击统一在遍历后处理
        let rows: Vec<_> = state
            .catalog
            .clips()
            .iter()
            .map(|clip| {
                (
                    clip.display_name.clone(),
                    clip.audio_resource.clone(),
                    state.image_path(&clip.image_resource),
                    state.is_playing_clip(&clip.audio_resource),
                )
            })
            .collect();

        let mut action: Option<RowAction> = None;

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.add_space(4.0);
                for (name, resource, image, is_current) in &rows {
                    if let Some(a) =
                        Self::card(ui, name, resource, image.as_deref(), *is_current)
                    {
                        action = Some(a);
                    }
                    ui.add_space(6.0);
                }
            });

        match action {
            Some(RowAction::Play(resource)) => state.play_clip(&resource),
            Some(RowAction::Stop) => state.stop(),
            Some(RowAction::ShowImage(name, path)) => state.viewer_image = Some((name, path)),
            None => {}
        }
    }

    fn card(
        ui: &mut Ui,
        name: &str,
        resource: &str,
        image: Option<&Path>,
        is_current: bool,
    ) -> Option<RowAction> {
        let mut action = None;

        let bg = if is_current {
            BirdsongTheme::ACCENT_PRIMARY.gamma_multiply(0.12)
        } else {
            BirdsongTheme::BG_SURFACE
        };
        let stroke = if is_current {
            Stroke::new(1.5, BirdsongTheme::ACCENT_PRIMARY)
        } else {
            Stroke::new(1.0, BirdsongTheme::BORDER)
        };

        egui::Frame::none()
            .fill(bg)
            .stroke(stroke)
            .rounding(Rounding::same(12.0))
            .inner_margin(egui::Margin::symmetric(12.0, 10.0))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.horizontal(|ui| {
                    // 缩略图，点开全图；没有图片时用占位符
                    let thumb = if let Some(path) = image {
                        let uri = format!("file://{}", path.display());
                        ui.add(
                            egui::Image::new(uri)
                                .fit_to_exact_size(egui::vec2(56.0, 56.0))
                                .rounding(Rounding::same(28.0))
                                .sense(egui::Sense::click()),
                        )
                    } else {
                        ui.label(RichText::new("🐦").size(32.0))
                    };
                    if thumb.clicked() {
                        if let Some(path) = image {
                            action =
                                Some(RowAction::ShowImage(name.to_string(), path.to_path_buf()));
                        }
                    }

                    ui.add_space(8.0);
                    ui.label(
                        RichText::new(name)
                            .size(16.0)
                            .color(if is_current {
                                BirdsongTheme::ACCENT_PRIMARY
                            } else {
                                BirdsongTheme::TEXT_PRIMARY
                            }),
                    );

                    // 行尾：播放/停止
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        let icon = if is_current { "⏹" } else { "▶" };
                        if ui
                            .add(egui::Button::new(RichText::new(icon).size(20.0)))
                            .clicked()
                        {
                            action = Some(if is_current {
                                RowAction::Stop
                            } else {
                                RowAction::Play(resource.to_string())
                            });
                        }
                    });
                });
            });

        action
    }
}
