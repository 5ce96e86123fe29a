//! Birdsong Player GUI

mod state;
mod ui;

use std::path::PathBuf;

use birdsong_player::{spawn_player, BundledStore, Catalog};
use eframe::egui;

use state::AppState;
use ui::{BirdsongTheme, ClipList, ImageViewer, PlayerDeck};

fn main() -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([480.0, 760.0])
            .with_min_inner_size([360.0, 520.0])
            .with_title("Birdsong Player"),
        ..Default::default()
    };

    eframe::run_native(
        "Birdsong Player",
        options,
        Box::new(|cc| {
            // 应用主题，注册图片加载器
            BirdsongTheme::apply(&cc.egui_ctx);
            egui_extras::install_image_loaders(&cc.egui_ctx);

            // 启动播放引擎
            let assets = asset_root();
            let handle = spawn_player(Box::new(BundledStore::new(assets.join("sounds"))));

            let state = AppState::new(
                Catalog::builtin(),
                assets.join("images"),
                handle.cmd_tx,
                handle.evt_rx,
            );
            Ok(Box::new(BirdsongApp { state }))
        }),
    )
}

/// 优先用工作目录下的 assets，开发时回落到 crate 目录
fn asset_root() -> PathBuf {
    let local = PathBuf::from("assets");
    if local.is_dir() {
        local
    } else {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets")
    }
}

struct BirdsongApp {
    state: AppState,
}

impl eframe::App for BirdsongApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // 处理播放引擎事件
        self.state.poll_events();

        // 顶部：标题 + 音量
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            PlayerDeck::header(ui, &mut self.state);
        });

        // 底部：播放时才出现的进度条
        if self.state.is_playing {
            egui::TopBottomPanel::bottom("progress_strip").show(ctx, |ui| {
                PlayerDeck::progress_strip(ui, &self.state);
            });
        }

        // 中间：鸟鸣列表
        egui::CentralPanel::default().show(ctx, |ui| {
            ClipList::show(ui, &mut self.state);
        });

        // 全图查看
        if self.state.viewer_image.is_some() {
            ImageViewer::show(ctx, &mut self.state);
        }

        // 播放中定期重绘以刷新进度
        if self.state.is_playing {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}

impl Drop for BirdsongApp {
    fn drop(&mut self) {
        self.state.shutdown();
    }
}
