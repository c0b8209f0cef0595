//! Exploration session lifecycle.
//!
//! One dedicated worker thread runs the exploration loop. The caller's
//! thread communicates through two atomic flags: `active` (cleared to
//! request a stop) and the walk controller's cancellation flag (set so a
//! walk in progress halts at its next poll). No queues, no locks beyond
//! the per-step robot lock - staleness of one poll interval is accepted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::config::NavConfig;
use crate::exploration::explorer::Explorer;
use crate::map::save_snapshot;
use crate::services::Robot;

pub struct ExplorationSession {
    config: NavConfig,
    robot: Arc<Mutex<Robot>>,
    active: Arc<AtomicBool>,
    /// Cancellation handle of the worker's walk controller
    walk_stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl ExplorationSession {
    pub fn new(config: NavConfig, robot: Arc<Mutex<Robot>>) -> Self {
        Self {
            config,
            robot,
            active: Arc::new(AtomicBool::new(false)),
            walk_stop: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    /// Whether the worker is currently exploring.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Spawn the exploration worker. No-op when already running.
    pub fn start(&mut self) {
        if self.active.load(Ordering::Acquire) {
            tracing::warn!("Exploration already active");
            return;
        }

        // Reap a worker that finished on its own
        if let Some(handle) = self.worker.take()
            && let Err(e) = handle.join()
        {
            tracing::error!("Previous exploration thread panicked: {:?}", e);
        }

        let explorer = Explorer::new(&self.config);
        self.walk_stop = explorer.walk_stop_handle();
        self.walk_stop.store(false, Ordering::Release);
        self.active.store(true, Ordering::Release);

        let active = Arc::clone(&self.active);
        let robot = Arc::clone(&self.robot);
        let snapshot_dir = self.config.output.snapshot_dir.clone();

        let handle = thread::Builder::new()
            .name("exploration".into())
            .spawn(move || {
                tracing::info!("Exploration thread started");

                let mut explorer = explorer;
                explorer.run(&robot, &active);
                active.store(false, Ordering::Release);

                // Best-effort persistence: a failed save never affects
                // the exploration outcome
                let snapshot = explorer.map().snapshot();
                match save_snapshot(&snapshot, snapshot_dir.as_ref()) {
                    Ok(path) => tracing::info!("Exploration snapshot saved to {:?}", path),
                    Err(e) => tracing::warn!("Failed to save exploration snapshot: {}", e),
                }

                tracing::info!("Exploration thread exited");
            })
            .expect("Failed to spawn exploration thread");

        self.worker = Some(handle);
    }

    /// Request a stop and join the worker with a timeout. A worker that
    /// does not finish in time is detached with a warning rather than
    /// blocking the caller forever.
    pub fn stop(&mut self) {
        self.active.store(false, Ordering::Release);
        self.walk_stop.store(true, Ordering::Release);

        let Some(handle) = self.worker.take() else {
            return;
        };

        let timeout = Duration::from_millis(self.config.exploration.join_timeout_ms);
        let deadline = Instant::now() + timeout;
        while !handle.is_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(20));
        }

        if handle.is_finished() {
            if let Err(e) = handle.join() {
                tracing::error!("Exploration thread panicked: {:?}", e);
            }
        } else {
            tracing::warn!("Exploration thread did not stop within {:?}", timeout);
        }
    }
}

impl Drop for ExplorationSession {
    fn drop(&mut self) {
        if self.is_active() {
            self.stop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Pose2D;
    use crate::error::Result;
    use crate::services::{MotionService, PostureService, SensorKey, SensorService};

    /// Motion stub that never advances: every walk polls until cancelled.
    struct StuckMotion;

    impl MotionService for StuckMotion {
        fn wake_up(&mut self) -> Result<()> {
            Ok(())
        }
        fn rest(&mut self) -> Result<()> {
            Ok(())
        }
        fn move_toward(&mut self, _vx: f32, _vy: f32, _omega: f32) -> Result<()> {
            Ok(())
        }
        fn stop_move(&mut self) -> Result<()> {
            Ok(())
        }
        fn get_position(&mut self) -> Result<Pose2D> {
            Ok(Pose2D::identity())
        }
        fn set_angles(&mut self, _names: &[&str], _angles: &[f32], _speed: f32) -> Result<()> {
            Ok(())
        }
    }

    struct NoPosture;

    impl PostureService for NoPosture {
        fn go_to_posture(&mut self, _posture: &str, _speed: f32) -> Result<bool> {
            Ok(true)
        }
        fn get_posture(&mut self) -> Result<String> {
            Ok("Stand".to_string())
        }
    }

    struct OpenSonar;

    impl SensorService for OpenSonar {
        fn subscribe_sonar(&mut self, _tag: &str) -> Result<()> {
            Ok(())
        }
        fn unsubscribe_sonar(&mut self, _tag: &str) -> Result<()> {
            Ok(())
        }
        fn read(&mut self, _key: SensorKey) -> Result<f32> {
            Ok(2.5)
        }
    }

    fn stuck_robot() -> Arc<Mutex<Robot>> {
        Arc::new(Mutex::new(Robot {
            motion: Box::new(StuckMotion),
            posture: Box::new(NoPosture),
            sensors: Box::new(OpenSonar),
        }))
    }

    fn test_config() -> NavConfig {
        let mut config = NavConfig::default();
        config.walk.poll_interval_ms = 5;
        config.exploration.step_pause_ms = 0;
        config.exploration.join_timeout_ms = 3000;
        config.output.snapshot_dir =
            format!("{}/nao_nav_session_{}", std::env::temp_dir().display(), std::process::id());
        config
    }

    #[test]
    fn test_stop_cancels_walk_in_progress() {
        let mut session = ExplorationSession::new(test_config(), stuck_robot());

        session.start();
        assert!(session.is_active());

        // Give the worker time to enter a walk poll loop
        thread::sleep(Duration::from_millis(100));

        let begin = Instant::now();
        session.stop();
        assert!(
            begin.elapsed() < Duration::from_millis(3000),
            "stop() must return within the join timeout"
        );
        assert!(!session.is_active());

        let _ = std::fs::remove_dir_all(
            std::env::temp_dir().join(format!("nao_nav_session_{}", std::process::id())),
        );
    }

    #[test]
    fn test_start_twice_is_noop() {
        let mut session = ExplorationSession::new(test_config(), stuck_robot());

        session.start();
        assert!(session.is_active());
        session.start();
        assert!(session.is_active());

        session.stop();
    }
}
