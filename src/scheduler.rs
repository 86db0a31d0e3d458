//! Frame loop driving [`Engine::tick`] at a fixed interval.
//!
//! `Armed` → `Running` → `Stopped`, enforced with statum. The running loop
//! ticks the engine on a tokio interval until its cancellation token fires;
//! frames that fall behind are skipped, never queued. A failed tick is logged
//! and the next frame starts fresh.

use chrono::{DateTime, Local};
use statum::{machine, state};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::config::{EngineConfig, DEFAULT_TICK_INTERVAL_MS};
use crate::engine::Engine;

#[derive(Clone, Debug)]
pub struct FrameSettings {
    pub tick_interval_ms: u64,
}

impl Default for FrameSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
        }
    }
}

impl From<&EngineConfig> for FrameSettings {
    fn from(config: &EngineConfig) -> Self {
        Self {
            tick_interval_ms: config.tick_interval_ms,
        }
    }
}

/// Frame counters, reset after each stats log
#[derive(Clone, Debug)]
pub struct FrameStats {
    pub frames: u64,
    pub failed: u64,
    pub since: DateTime<Local>,
}

impl Default for FrameStats {
    fn default() -> Self {
        Self {
            frames: 0,
            failed: 0,
            since: Local::now(),
        }
    }
}

#[state]
#[derive(Debug, Clone)]
pub enum FrameState {
    Armed,   // Built, no frame run yet
    Running, // Ticking on the interval
    Stopped, // Cancelled, engine can be taken back
}

#[machine]
#[derive(Debug)]
pub struct FrameLoop<S: FrameState> {
    engine: Engine,
    settings: FrameSettings,
    cancel: CancellationToken,
    stats: FrameStats,
    total_frames: u64,
}

impl<S: FrameState> FrameLoop<S> {
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    pub fn settings(&self) -> &FrameSettings {
        &self.settings
    }

    /// Frames run since creation
    pub fn total_frames(&self) -> u64 {
        self.total_frames
    }
}

impl FrameLoop<Armed> {
    pub fn create(
        engine: Engine,
        settings: Option<FrameSettings>,
        cancel: CancellationToken,
    ) -> Self {
        let settings = settings.unwrap_or_default();
        info!(
            "Creating frame loop with {}ms interval",
            settings.tick_interval_ms
        );

        Self::new(engine, settings, cancel, FrameStats::default(), 0)
    }

    pub fn start(self) -> FrameLoop<Running> {
        info!("Starting frame loop");
        self.transition()
    }
}

impl FrameLoop<Running> {
    // Stats are logged at most this often
    const STATS_INTERVAL_SECS: i64 = 30;

    /// Runs one frame, logging instead of returning a failed tick.
    pub fn frame(&mut self) {
        self.total_frames += 1;
        self.stats.frames += 1;

        if let Err(e) = self.engine.tick() {
            self.stats.failed += 1;
            error!("Frame {} failed: {}", self.total_frames, e);
        }
    }

    fn log_stats(&mut self) {
        let now = Local::now();
        let window = now - self.stats.since;
        if window < chrono::Duration::seconds(Self::STATS_INTERVAL_SECS) {
            return;
        }

        info!(
            "Frame loop stats: {} frames ({} failed) in last {} seconds, {} controllers",
            self.stats.frames,
            self.stats.failed,
            window.num_seconds(),
            self.engine.count()
        );
        self.stats = FrameStats {
            since: now,
            ..FrameStats::default()
        };
    }

    /// Ticks the engine on every interval until the token is cancelled.
    pub async fn run_until_cancelled(mut self) -> FrameLoop<Stopped> {
        let period = Duration::from_millis(self.settings.tick_interval_ms.max(1));
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let cancel = self.cancel.clone();

        info!("Entering frame loop");
        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    info!("Frame loop cancelled after {} frames", self.total_frames);
                    break;
                }

                _ = interval.tick() => {
                    self.frame();
                    self.log_stats();
                }
            }
        }

        self.transition()
    }

    pub fn stop(self) -> FrameLoop<Stopped> {
        debug!("Stopping frame loop");
        self.transition()
    }
}

impl FrameLoop<Stopped> {
    /// Hands the engine back
    pub fn into_engine(self) -> Engine {
        self.engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{handler, Channel, EngineError};
    use crate::mapping::Host;
    use crate::source::{PollingSource, SharedSnapshot, SourceFactory};
    use crate::RawDevice;
    use color_eyre::eyre::eyre;
    use std::cell::Cell;
    use std::rc::Rc;

    fn engine(feed: &SharedSnapshot) -> Result<Engine, EngineError> {
        let feed = feed.clone();
        let factory: SourceFactory =
            Box::new(move |mappings| Box::new(PollingSource::new(feed.clone(), mappings)));
        let mut engine = Engine::with_sources(&EngineConfig::default(), vec![factory])?;
        engine.init();
        Ok(engine)
    }

    fn pad() -> RawDevice {
        RawDevice::new(0, "Xbox 360 Controller", vec![0.0; 17], vec![0.0; 4])
    }

    #[test]
    fn settings_follow_config() {
        let config = EngineConfig {
            tick_interval_ms: 5,
            ..EngineConfig::default()
        };
        assert_eq!(FrameSettings::from(&config).tick_interval_ms, 5);
        assert_eq!(FrameSettings::default().tick_interval_ms, 16);
    }

    #[test]
    fn failed_frames_do_not_stop_the_loop() -> Result<(), EngineError> {
        let feed = SharedSnapshot::new(Host::Standard);
        feed.plug(pad());
        let mut engine = engine(&feed)?;
        engine.bind(Channel::Tick, handler(|_| Err(eyre!("listener failed"))));

        let mut frames = FrameLoop::create(engine, None, CancellationToken::new()).start();
        frames.frame();
        frames.frame();

        assert_eq!(frames.total_frames(), 2);
        assert_eq!(frames.engine().count(), 1);
        let engine = frames.stop().into_engine();
        assert_eq!(engine.count(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn cancelled_token_stops_the_loop() -> Result<(), EngineError> {
        let feed = SharedSnapshot::new(Host::Standard);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let stopped = FrameLoop::create(engine(&feed)?, None, cancel)
            .start()
            .run_until_cancelled()
            .await;

        assert_eq!(stopped.total_frames(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn runs_frames_until_cancelled() -> Result<(), EngineError> {
        let feed = SharedSnapshot::new(Host::Standard);
        feed.plug(pad());
        let mut engine = engine(&feed)?;

        let cancel = CancellationToken::new();
        let ticks = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&ticks);
        let stopper = cancel.clone();
        engine.bind(
            Channel::Tick,
            handler(move |_| {
                counter.set(counter.get() + 1);
                if counter.get() == 3 {
                    stopper.cancel();
                }
                Ok(())
            }),
        );

        let settings = FrameSettings {
            tick_interval_ms: 1,
        };
        let stopped = FrameLoop::create(engine, Some(settings), cancel)
            .start()
            .run_until_cancelled()
            .await;

        assert_eq!(ticks.get(), 3);
        assert_eq!(stopped.total_frames(), 3);
        assert_eq!(stopped.into_engine().count(), 1);
        Ok(())
    }
}
