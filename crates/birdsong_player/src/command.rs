//! 播放命令和事件定义

use std::time::Duration;

/// 播放器命令（UI -> 引擎）
#[derive(Debug, Clone)]
pub enum PlayerCommand {
    /// 按资源名加载一段鸟鸣
    Load(String),
    /// 播放当前已加载的片段
    Play,
    /// 停止并回到空闲
    Stop,
    /// 设置音量 (0.0 - 1.0)
    SetVolume(f32),
    /// 关闭引擎
    Shutdown,
}

/// 播放器事件（引擎 -> UI）
#[derive(Debug, Clone)]
pub enum PlayerEvent {
    /// 状态变更
    StateChanged(PlaybackState),
    /// 片段加载完成
    ClipLoaded { resource: String, total: Duration },
    /// 播放进度更新
    Progress {
        elapsed: Duration,
        total: Duration,
        progress: f64,
    },
    /// 音量变更（已钳制）
    VolumeChanged(f32),
    /// 片段自然播放结束
    ClipEnded,
    /// 错误
    Error(String),
}

/// 播放状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Loaded,
    Playing,
}

/// 引擎可观测状态的快照
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSnapshot {
    pub is_playing: bool,
    pub active_clip: Option<String>,
    pub volume: f32,
    pub elapsed: Duration,
    pub total: Duration,
    pub progress: f64,
}

impl PlayerSnapshot {
    /// 指定资源当前是否正在播放
    pub fn is_playing_clip(&self, resource: &str) -> bool {
        self.is_playing && self.active_clip.as_deref() == Some(resource)
    }
}

impl Default for PlayerSnapshot {
    fn default() -> Self {
        Self {
            is_playing: false,
            active_clip: None,
            volume: 1.0,
            elapsed: Duration::ZERO,
            total: Duration::ZERO,
            progress: 0.0,
        }
    }
}
