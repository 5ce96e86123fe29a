//! 音频输出
//!
//! 使用 cpal 播放解码后的采样

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, Stream, StreamConfig};

/// 音频输出错误
#[derive(thiserror::Error, Debug)]
pub enum OutputError {
    #[error("No output device available")]
    NoDevice,
    #[error("No supported config")]
    NoConfig,
    #[error("Stream error: {0}")]
    Stream(String),
}

/// 音频输出流
///
/// 引擎线程写入采样，cpal 回调线程读取。未播放时输出静音，
/// 播放位置按已消费的帧数累计。
pub struct AudioOutput {
    _stream: Stream,
    buffer: Arc<SampleQueue>,
    is_playing: Arc<AtomicBool>,
    frames_played: Arc<AtomicU64>,
    sample_rate: u32,
    channels: u16,
}

impl AudioOutput {
    /// 针对给定的采样率/声道数打开默认输出设备
    pub fn open(sample_rate: u32, channels: u16) -> Result<Self, OutputError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(OutputError::NoDevice)?;

        let supported = device
            .supported_output_configs()
            .map_err(|e| OutputError::Stream(e.to_string()))?
            .find(|c| {
                c.channels() == channels
                    && c.min_sample_rate().0 <= sample_rate
                    && c.max_sample_rate().0 >= sample_rate
                    && c.sample_format() == SampleFormat::F32
            })
            .ok_or(OutputError::NoConfig)?;

        let config: StreamConfig = supported.with_sample_rate(cpal::SampleRate(sample_rate)).into();

        // 半秒的缓冲余量
        let capacity = sample_rate as usize * channels as usize / 2;
        let buffer = Arc::new(SampleQueue::new(capacity));
        let is_playing = Arc::new(AtomicBool::new(false));
        let frames_played = Arc::new(AtomicU64::new(0));

        let buffer_cb = buffer.clone();
        let is_playing_cb = is_playing.clone();
        let frames_cb = frames_played.clone();
        let channels_cb = channels as usize;

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    if is_playing_cb.load(Ordering::Relaxed) {
                        let read = buffer_cb.pop(data);
                        for sample in &mut data[read..] {
                            *sample = 0.0;
                        }
                        frames_cb.fetch_add((read / channels_cb) as u64, Ordering::Relaxed);
                    } else {
                        for sample in data.iter_mut() {
                            *sample = 0.0;
                        }
                    }
                },
                |err| {
                    eprintln!("Audio output error: {}", err);
                },
                None,
            )
            .map_err(|e| OutputError::Stream(e.to_string()))?;

        stream
            .play()
            .map_err(|e| OutputError::Stream(e.to_string()))?;

        Ok(Self {
            _stream: stream,
            buffer,
            is_playing,
            frames_played,
            sample_rate,
            channels,
        })
    }

    /// 写入采样，返回实际接受的数量（缓冲区满时小于 `samples.len()`）
    pub fn write(&self, samples: &[f32]) -> usize {
        self.buffer.push(samples)
    }

    /// 尚未被回调消费的采样数
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// 打开/静音输出
    pub fn set_playing(&self, playing: bool) {
        self.is_playing.store(playing, Ordering::Relaxed);
    }

    /// 当前播放位置
    pub fn position(&self) -> Duration {
        let frames = self.frames_played.load(Ordering::Relaxed);
        Duration::from_secs_f64(frames as f64 / self.sample_rate as f64)
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }
}

/// 有界采样队列，写端不覆盖未读数据
struct SampleQueue {
    queue: Mutex<VecDeque<f32>>,
    capacity: usize,
}

impl SampleQueue {
    fn new(capacity: usize) -> Self {
        Self {
            queue: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    fn push(&self, data: &[f32]) -> usize {
        let mut queue = self.queue.lock().unwrap();
        let room = self.capacity.saturating_sub(queue.len());
        let to_write = room.min(data.len());
        queue.extend(data[..to_write].iter().copied());
        to_write
    }

    fn pop(&self, output: &mut [f32]) -> usize {
        let mut queue = self.queue.lock().unwrap();
        let to_read = output.len().min(queue.len());

        let (a, b) = queue.as_slices();
        let a_len = a.len().min(to_read);
        output[..a_len].copy_from_slice(&a[..a_len]);
        let b_len = to_read - a_len;
        if b_len > 0 {
            output[a_len..to_read].copy_from_slice(&b[..b_len]);
        }

        queue.drain(..to_read);
        to_read
    }

    fn len(&self) -> usize {
        self.queue.lock().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_respects_capacity() {
        let queue = SampleQueue::new(4);

        assert_eq!(queue.push(&[1.0, 2.0, 3.0]), 3);
        assert_eq!(queue.push(&[4.0, 5.0]), 1);
        assert_eq!(queue.len(), 4);

        let mut out = [0.0; 4];
        assert_eq!(queue.pop(&mut out), 4);
        assert_eq!(out, [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn test_queue_partial_read() {
        let queue = SampleQueue::new(8);
        queue.push(&[1.0, 2.0]);

        let mut out = [0.0; 4];
        assert_eq!(queue.pop(&mut out), 2);
        assert_eq!(&out[..2], &[1.0, 2.0]);
    }
}
