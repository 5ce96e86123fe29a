//! 应用状态
//!
//! 引擎状态的只读镜像，全部通过事件通道刷新。

use std::path::{Path, PathBuf};

use birdsong_player::{Catalog, PlaybackState, PlayerCommand, PlayerEvent};
use crossbeam_channel::{Receiver, Sender};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

pub struct AppState {
    pub catalog: Catalog,
    pub image_root: PathBuf,

    // 播放状态镜像
    pub is_playing: bool,
    pub active_clip: Option<String>,
    pub position: f64,
    pub duration: f64,
    pub volume: f32,
    pub last_error: Option<String>,

    // 全图查看：显示名 + 图片路径
    pub viewer_image: Option<(String, PathBuf)>,

    // 播放引擎通信
    cmd_tx: Sender<PlayerCommand>,
    evt_rx: Receiver<PlayerEvent>,
}

impl AppState {
    pub fn new(
        catalog: Catalog,
        image_root: PathBuf,
        cmd_tx: Sender<PlayerCommand>,
        evt_rx: Receiver<PlayerEvent>,
    ) -> Self {
        Self {
            catalog,
            image_root,
            is_playing: false,
            active_clip: None,
            position: 0.0,
            duration: 0.0,
            volume: 1.0,
            last_error: None,
            viewer_image: None,
            cmd_tx,
            evt_rx,
        }
    }

    /// 处理播放引擎事件
    pub fn poll_events(&mut self) {
        let events: Vec<_> = self.evt_rx.try_iter().collect();

        for event in events {
            match event {
                PlayerEvent::StateChanged(state) => {
                    self.is_playing = state == PlaybackState::Playing;
                    if state == PlaybackState::Idle {
                        self.active_clip = None;
                        self.position = 0.0;
                        self.duration = 0.0;
                    }
                }
                PlayerEvent::ClipLoaded { resource, total } => {
                    self.active_clip = Some(resource);
                    self.position = 0.0;
                    self.duration = total.as_secs_f64();
                }
                PlayerEvent::Progress { elapsed, total, .. } => {
                    self.position = elapsed.as_secs_f64();
                    self.duration = total.as_secs_f64();
                }
                PlayerEvent::VolumeChanged(volume) => {
                    self.volume = volume;
                }
                PlayerEvent::ClipEnded => {}
                PlayerEvent::Error(e) => {
                    eprintln!("Player error: {}", e);
                    self.last_error = Some(e);
                }
            }
        }
    }

    /// 发送命令到播放引擎
    fn send_command(&self, cmd: PlayerCommand) {
        let _ = self.cmd_tx.send(cmd);
    }

    /// 点一行的播放键：加载并播放，自动顶替正在播的那首
    pub fn play_clip(&mut self, resource: &str) {
        self.last_error = None;
        self.send_command(PlayerCommand::Load(resource.to_string()));
        self.send_command(PlayerCommand::Play);
    }

    pub fn stop(&mut self) {
        self.send_command(PlayerCommand::Stop);
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        self.send_command(PlayerCommand::SetVolume(self.volume));
    }

    /// 退出时关停引擎线程
    pub fn shutdown(&self) {
        self.send_command(PlayerCommand::Shutdown);
    }

    pub fn is_playing_clip(&self, resource: &str) -> bool {
        self.is_playing && self.active_clip.as_deref() == Some(resource)
    }

    /// 缩略图路径，按扩展名逐个尝试
    pub fn image_path(&self, image_resource: &str) -> Option<PathBuf> {
        find_image(&self.image_root, image_resource)
    }
}

fn find_image(root: &Path, resource: &str) -> Option<PathBuf> {
    IMAGE_EXTENSIONS.iter().find_map(|ext| {
        let path = root.join(format!("{}.{}", resource, ext));
        path.is_file().then_some(path)
    })
}
