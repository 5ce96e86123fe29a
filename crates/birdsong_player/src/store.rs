//! 音频资源仓库
//!
//! 按资源名解析为可播放的会话句柄。引擎只依赖这里的 trait，
//! 真实后端（symphonia 解码 + cpal 输出）和测试替身都从同一扇门进来。

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::decoder::{ClipDecoder, DecoderError};
use crate::output::{AudioOutput, OutputError};

/// 资源解析/打开错误
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("Clip not found: {0}")]
    ClipNotFound(String),
    #[error("Decoder error: {0}")]
    Decoder(#[from] DecoderError),
    #[error("Output error: {0}")]
    Output(#[from] OutputError),
}

/// 一次已加载的播放会话
///
/// `pump` 供引擎循环在播放期间调用，把解码推进到输出设备；
/// 其余方法对应平台播放原语。会话只在引擎线程内创建和使用
/// （cpal 的流不可跨线程转移），因此不要求 `Send`。
pub trait AudioSession {
    fn play(&mut self);
    fn stop(&mut self);
    fn set_volume(&mut self, volume: f32);
    /// 推进解码/输出一小步
    fn pump(&mut self);
    fn position(&self) -> Duration;
    fn duration(&self) -> Duration;
    /// 底层会话是否仍在出声
    fn is_active(&self) -> bool;
}

/// 音频资源仓库：资源名 -> 会话
pub trait AudioStore: Send {
    fn open(&self, resource: &str) -> Result<Box<dyn AudioSession>, StoreError>;
}

const AUDIO_EXTENSIONS: &[&str] = &["mp3", "ogg", "flac", "wav"];

/// 从本地资源目录打开预置片段的仓库
pub struct BundledStore {
    root: PathBuf,
}

impl BundledStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// 资源名解析为现存文件，按扩展名逐个尝试
    fn resolve(&self, resource: &str) -> Option<PathBuf> {
        AUDIO_EXTENSIONS.iter().find_map(|ext| {
            let path = self.root.join(format!("{}.{}", resource, ext));
            path.is_file().then_some(path)
        })
    }
}

impl AudioStore for BundledStore {
    fn open(&self, resource: &str) -> Result<Box<dyn AudioSession>, StoreError> {
        let path = self
            .resolve(resource)
            .ok_or_else(|| StoreError::ClipNotFound(resource.to_string()))?;
        Ok(Box::new(CpalSession::open(&path)?))
    }
}

/// 真实后端：symphonia 解码 + cpal 输出
pub struct CpalSession {
    decoder: ClipDecoder,
    output: AudioOutput,
    volume: f32,
    playing: bool,
    /// 已解码但尚未写入输出的采样
    pending: Vec<f32>,
    /// 解码器已读到文件尾
    drained: bool,
    duration: Duration,
}

impl CpalSession {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let decoder = ClipDecoder::open(path)?;
        let output = AudioOutput::open(decoder.sample_rate(), decoder.channels())?;
        let duration = decoder.duration();

        Ok(Self {
            decoder,
            output,
            volume: 1.0,
            playing: false,
            pending: Vec::new(),
            drained: false,
            duration,
        })
    }
}

impl AudioSession for CpalSession {
    fn play(&mut self) {
        self.playing = true;
        self.output.set_playing(true);
    }

    fn stop(&mut self) {
        self.playing = false;
        self.output.set_playing(false);
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    fn pump(&mut self) {
        if !self.playing {
            return;
        }

        if self.pending.is_empty() && !self.drained {
            match self.decoder.decode_next() {
                Ok(Some(mut samples)) => {
                    for sample in &mut samples {
                        *sample *= self.volume;
                    }
                    self.pending = samples;
                }
                Ok(None) => {
                    self.drained = true;
                }
                Err(e) => {
                    eprintln!("Decode error: {}", e);
                    self.drained = true;
                }
            }
        }

        if !self.pending.is_empty() {
            let written = self.output.write(&self.pending);
            self.pending.drain(..written);
        }
    }

    fn position(&self) -> Duration {
        let position = self.output.position();
        if self.duration > Duration::ZERO {
            position.min(self.duration)
        } else {
            position
        }
    }

    fn duration(&self) -> Duration {
        self.duration
    }

    fn is_active(&self) -> bool {
        if !self.playing {
            return false;
        }
        // 解码结束且缓冲耗尽才算自然播完
        !(self.drained && self.pending.is_empty() && self.output.buffered() == 0)
    }
}
