//! 播放引擎
//!
//! 单线程状态机：空闲 / 已加载 / 播放中。所有可变状态都在引擎
//! 线程里，UI 通过命令/事件通道交互。

use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::store::{AudioSession, AudioStore};
use crate::{PlaybackState, PlayerCommand, PlayerEvent, PlayerSnapshot};

/// 进度采样周期，同时用于检测自然播完
const SAMPLE_INTERVAL: Duration = Duration::from_millis(100);

/// 播放引擎句柄
pub struct PlayerHandle {
    pub cmd_tx: Sender<PlayerCommand>,
    pub evt_rx: Receiver<PlayerEvent>,
}

/// 启动播放引擎
pub fn spawn_player(store: Box<dyn AudioStore>) -> PlayerHandle {
    let (cmd_tx, cmd_rx) = bounded(32);
    let (evt_tx, evt_rx) = bounded(64);

    thread::spawn(move || {
        run_engine(cmd_rx, evt_tx, store);
    });

    PlayerHandle { cmd_tx, evt_rx }
}

fn run_engine(
    cmd_rx: Receiver<PlayerCommand>,
    evt_tx: Sender<PlayerEvent>,
    store: Box<dyn AudioStore>,
) {
    let mut engine = Engine::new(store, evt_tx);

    let _ = engine
        .evt_tx
        .send(PlayerEvent::StateChanged(PlaybackState::Idle));

    loop {
        // 非阻塞检查命令
        match cmd_rx.try_recv() {
            Ok(cmd) => {
                if !engine.handle_command(cmd) {
                    break;
                }
            }
            Err(crossbeam_channel::TryRecvError::Empty) => {}
            Err(crossbeam_channel::TryRecvError::Disconnected) => break,
        }

        // 播放期间推进解码并定期采样进度
        if engine.state == PlaybackState::Playing {
            engine.pump();
            engine.maybe_sample();
        }

        // 避免 CPU 空转
        thread::sleep(Duration::from_millis(5));
    }

    // 线程退出时释放会话，采样也随循环一起停止
    engine.stop();
}

struct Engine {
    store: Box<dyn AudioStore>,
    evt_tx: Sender<PlayerEvent>,
    state: PlaybackState,
    session: Option<Box<dyn AudioSession>>,
    active_clip: Option<String>,
    volume: f32,
    elapsed: Duration,
    total: Duration,
    last_sample: Instant,
}

impl Engine {
    fn new(store: Box<dyn AudioStore>, evt_tx: Sender<PlayerEvent>) -> Self {
        Self {
            store,
            evt_tx,
            state: PlaybackState::Idle,
            session: None,
            active_clip: None,
            volume: 1.0,
            elapsed: Duration::ZERO,
            total: Duration::ZERO,
            last_sample: Instant::now(),
        }
    }

    fn handle_command(&mut self, cmd: PlayerCommand) -> bool {
        match cmd {
            PlayerCommand::Load(resource) => {
                self.load(resource);
            }
            PlayerCommand::Play => {
                self.play();
            }
            PlayerCommand::Stop => {
                self.stop();
            }
            PlayerCommand::SetVolume(volume) => {
                self.set_volume(volume);
            }
            PlayerCommand::Shutdown => {
                return false;
            }
        }
        true
    }

    fn load(&mut self, resource: String) {
        let mut session = match self.store.open(&resource) {
            Ok(s) => s,
            Err(e) => {
                // 加载失败不碰现有会话，一切保持原样
                let _ = self
                    .evt_tx
                    .send(PlayerEvent::Error(format!("Failed to load {}: {}", resource, e)));
                return;
            }
        };

        // 新会话就绪后才替换旧的
        if let Some(mut old) = self.session.take() {
            old.stop();
        }

        session.set_volume(self.volume);
        self.total = session.duration();
        self.elapsed = Duration::ZERO;
        self.session = Some(session);
        self.active_clip = Some(resource.clone());

        let _ = self.evt_tx.send(PlayerEvent::ClipLoaded {
            resource,
            total: self.total,
        });
        self.set_state(PlaybackState::Loaded);
    }

    fn play(&mut self) {
        // 没有加载任何资源时静默忽略
        if let Some(session) = &mut self.session {
            if self.state != PlaybackState::Playing {
                session.play();
                self.last_sample = Instant::now();
                self.set_state(PlaybackState::Playing);
            }
        }
    }

    fn stop(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.stop();
        }
        self.active_clip = None;
        self.elapsed = Duration::ZERO;
        self.total = Duration::ZERO;
        self.set_state(PlaybackState::Idle);
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        if let Some(session) = &mut self.session {
            session.set_volume(self.volume);
        }
        let _ = self.evt_tx.send(PlayerEvent::VolumeChanged(self.volume));
    }

    fn pump(&mut self) {
        if let Some(session) = &mut self.session {
            session.pump();
        }
    }

    fn maybe_sample(&mut self) {
        if self.last_sample.elapsed() >= SAMPLE_INTERVAL {
            self.sample_tick();
            self.last_sample = Instant::now();
        }
    }

    /// 采样一次：刷新进度，检测自然播完
    fn sample_tick(&mut self) {
        let (elapsed, total, active) = match &self.session {
            Some(session) => (session.position(), session.duration(), session.is_active()),
            None => return,
        };

        self.elapsed = elapsed;
        self.total = total;
        let _ = self.evt_tx.send(PlayerEvent::Progress {
            elapsed,
            total,
            progress: progress_of(elapsed, total),
        });

        // 底层不再出声而我们还认为在播：按显式 Stop 收尾
        if self.state == PlaybackState::Playing && !active {
            let _ = self.evt_tx.send(PlayerEvent::ClipEnded);
            self.stop();
        }
    }

    fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            is_playing: self.state == PlaybackState::Playing,
            active_clip: self.active_clip.clone(),
            volume: self.volume,
            elapsed: self.elapsed,
            total: self.total,
            progress: progress_of(self.elapsed, self.total),
        }
    }

    fn set_state(&mut self, state: PlaybackState) {
        if self.state != state {
            self.state = state;
            let _ = self.evt_tx.send(PlayerEvent::StateChanged(state));
        }
    }
}

/// 进度始终由 elapsed/total 推导，total 为零时取零
fn progress_of(elapsed: Duration, total: Duration) -> f64 {
    if total.is_zero() {
        return 0.0;
    }
    (elapsed.as_secs_f64() / total.as_secs_f64()).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreError;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[derive(Debug)]
    struct FakeSessionState {
        playing: bool,
        stop_calls: u32,
        volume: f32,
        position: Duration,
        duration: Duration,
        force_inactive: bool,
    }

    impl FakeSessionState {
        fn new(duration: Duration) -> Self {
            Self {
                playing: false,
                stop_calls: 0,
                volume: 1.0,
                position: Duration::ZERO,
                duration,
                force_inactive: false,
            }
        }
    }

    struct FakeSession(Arc<Mutex<FakeSessionState>>);

    impl AudioSession for FakeSession {
        fn play(&mut self) {
            self.0.lock().unwrap().playing = true;
        }

        fn stop(&mut self) {
            let mut state = self.0.lock().unwrap();
            state.playing = false;
            state.stop_calls += 1;
        }

        fn set_volume(&mut self, volume: f32) {
            self.0.lock().unwrap().volume = volume;
        }

        fn pump(&mut self) {}

        fn position(&self) -> Duration {
            self.0.lock().unwrap().position
        }

        fn duration(&self) -> Duration {
            self.0.lock().unwrap().duration
        }

        fn is_active(&self) -> bool {
            let state = self.0.lock().unwrap();
            state.playing && !state.force_inactive
        }
    }

    type Sessions = Arc<Mutex<Vec<Arc<Mutex<FakeSessionState>>>>>;

    struct FakeStore {
        durations: HashMap<String, Duration>,
        opened: Sessions,
    }

    impl AudioStore for FakeStore {
        fn open(&self, resource: &str) -> Result<Box<dyn AudioSession>, StoreError> {
            let duration = self
                .durations
                .get(resource)
                .copied()
                .ok_or_else(|| StoreError::ClipNotFound(resource.to_string()))?;
            let state = Arc::new(Mutex::new(FakeSessionState::new(duration)));
            self.opened.lock().unwrap().push(state.clone());
            Ok(Box::new(FakeSession(state)))
        }
    }

    fn engine_with(clips: &[(&str, f64)]) -> (Engine, Receiver<PlayerEvent>, Sessions) {
        let store = FakeStore {
            durations: clips
                .iter()
                .map(|(name, secs)| (name.to_string(), Duration::from_secs_f64(*secs)))
                .collect(),
            opened: Sessions::default(),
        };
        let sessions = store.opened.clone();
        let (evt_tx, evt_rx) = bounded(64);
        (Engine::new(Box::new(store), evt_tx), evt_rx, sessions)
    }

    fn assert_stopped(snapshot: &PlayerSnapshot) {
        assert!(!snapshot.is_playing);
        assert_eq!(snapshot.active_clip, None);
        assert_eq!(snapshot.elapsed, Duration::ZERO);
        assert_eq!(snapshot.progress, 0.0);
    }

    #[test]
    fn test_playing_implies_active_clip() {
        let (mut engine, _rx, _sessions) = engine_with(&[("A", 10.0), ("B", 4.0)]);

        let sequence = [
            PlayerCommand::Play,
            PlayerCommand::Load("A".into()),
            PlayerCommand::Play,
            PlayerCommand::Load("missing".into()),
            PlayerCommand::Load("B".into()),
            PlayerCommand::Play,
            PlayerCommand::Stop,
            PlayerCommand::Play,
            PlayerCommand::Stop,
        ];

        for cmd in sequence {
            engine.handle_command(cmd);
            let snapshot = engine.snapshot();
            if snapshot.is_playing {
                assert!(snapshot.active_clip.is_some());
            }
        }
    }

    #[test]
    fn test_stop_resets_from_every_state() {
        // 空闲
        let (mut engine, _rx, sessions) = engine_with(&[("A", 10.0)]);
        engine.handle_command(PlayerCommand::Stop);
        assert_stopped(&engine.snapshot());

        // 已加载
        engine.handle_command(PlayerCommand::Load("A".into()));
        engine.handle_command(PlayerCommand::Stop);
        assert_stopped(&engine.snapshot());

        // 播放中，且已有进度
        engine.handle_command(PlayerCommand::Load("A".into()));
        engine.handle_command(PlayerCommand::Play);
        sessions.lock().unwrap().last().unwrap().lock().unwrap().position =
            Duration::from_secs(3);
        engine.sample_tick();
        assert!(engine.snapshot().elapsed > Duration::ZERO);

        engine.handle_command(PlayerCommand::Stop);
        assert_stopped(&engine.snapshot());
    }

    #[test]
    fn test_volume_is_clamped_and_applied() {
        let (mut engine, _rx, sessions) = engine_with(&[("A", 10.0)]);

        engine.handle_command(PlayerCommand::SetVolume(-0.5));
        assert_eq!(engine.snapshot().volume, 0.0);

        engine.handle_command(PlayerCommand::SetVolume(1.7));
        assert_eq!(engine.snapshot().volume, 1.0);

        // 活动会话立即拿到新音量
        engine.handle_command(PlayerCommand::Load("A".into()));
        engine.handle_command(PlayerCommand::Play);
        engine.handle_command(PlayerCommand::SetVolume(0.25));
        let session = sessions.lock().unwrap()[0].clone();
        assert_eq!(session.lock().unwrap().volume, 0.25);

        // 加载时沿用已存储的音量
        engine.handle_command(PlayerCommand::Load("A".into()));
        let session = sessions.lock().unwrap()[1].clone();
        assert_eq!(session.lock().unwrap().volume, 0.25);
    }

    #[test]
    fn test_is_playing_clip_query() {
        let (mut engine, _rx, _sessions) = engine_with(&[("A", 10.0)]);

        assert!(!engine.snapshot().is_playing_clip("A"));

        engine.handle_command(PlayerCommand::Load("A".into()));
        assert!(!engine.snapshot().is_playing_clip("A"));

        engine.handle_command(PlayerCommand::Play);
        assert!(engine.snapshot().is_playing_clip("A"));
        assert!(!engine.snapshot().is_playing_clip("B"));

        engine.handle_command(PlayerCommand::Stop);
        assert!(!engine.snapshot().is_playing_clip("A"));
    }

    #[test]
    fn test_failed_load_leaves_state_untouched() {
        let (mut engine, rx, sessions) = engine_with(&[("A", 10.0)]);

        engine.handle_command(PlayerCommand::Load("A".into()));
        engine.handle_command(PlayerCommand::Play);
        sessions.lock().unwrap()[0].lock().unwrap().position = Duration::from_secs(3);
        engine.sample_tick();

        let before = engine.snapshot();
        engine.handle_command(PlayerCommand::Load("missing".into()));
        assert_eq!(engine.snapshot(), before);

        // 旧会话仍在播放，没有被停掉
        let session = sessions.lock().unwrap()[0].clone();
        assert!(session.lock().unwrap().playing);
        assert_eq!(session.lock().unwrap().stop_calls, 0);

        // 失败只以事件形式上报
        let errored = rx
            .try_iter()
            .any(|evt| matches!(evt, PlayerEvent::Error(_)));
        assert!(errored);
    }

    #[test]
    fn test_natural_completion_matches_stop() {
        let (mut engine, rx, sessions) = engine_with(&[("A", 10.0)]);

        engine.handle_command(PlayerCommand::Load("A".into()));
        engine.handle_command(PlayerCommand::Play);

        {
            let sessions = sessions.lock().unwrap();
            let mut state = sessions[0].lock().unwrap();
            state.position = state.duration;
            state.force_inactive = true;
        }
        engine.sample_tick();

        assert_stopped(&engine.snapshot());
        assert_eq!(sessions.lock().unwrap()[0].lock().unwrap().stop_calls, 1);
        assert!(rx.try_iter().any(|evt| matches!(evt, PlayerEvent::ClipEnded)));
    }

    #[test]
    fn test_progress_then_new_clip_supersedes() {
        let (mut engine, _rx, sessions) = engine_with(&[("A", 10.0), ("B", 4.0)]);

        engine.handle_command(PlayerCommand::Load("A".into()));
        engine.handle_command(PlayerCommand::Play);
        sessions.lock().unwrap()[0].lock().unwrap().position = Duration::from_secs_f64(2.5);
        engine.sample_tick();

        let snapshot = engine.snapshot();
        assert!((snapshot.progress - 0.25).abs() < 1e-9);
        assert_eq!(snapshot.elapsed, Duration::from_secs_f64(2.5));

        // 换一首：旧会话被停掉并释放
        engine.handle_command(PlayerCommand::Load("B".into()));
        engine.handle_command(PlayerCommand::Play);

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.active_clip.as_deref(), Some("B"));
        assert!(snapshot.is_playing_clip("B"));
        assert_eq!(snapshot.elapsed, Duration::ZERO);
        assert_eq!(snapshot.total, Duration::from_secs(4));

        let first = sessions.lock().unwrap()[0].clone();
        assert!(!first.lock().unwrap().playing);
        assert_eq!(first.lock().unwrap().stop_calls, 1);
        assert!(sessions.lock().unwrap()[1].lock().unwrap().playing);
    }

    #[test]
    fn test_play_without_load_is_silent_noop() {
        let (mut engine, rx, _sessions) = engine_with(&[]);

        engine.handle_command(PlayerCommand::Play);

        assert_eq!(engine.snapshot(), PlayerSnapshot::default());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_progress_is_derived_and_clamped() {
        assert_eq!(progress_of(Duration::ZERO, Duration::ZERO), 0.0);
        assert_eq!(progress_of(Duration::from_secs(5), Duration::ZERO), 0.0);
        assert_eq!(
            progress_of(Duration::from_secs(5), Duration::from_secs(10)),
            0.5
        );
        // 位置超过总长时钳制到 1
        assert_eq!(
            progress_of(Duration::from_secs(12), Duration::from_secs(10)),
            1.0
        );
    }
}
