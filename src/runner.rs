use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::time::{Duration, Instant};

use crate::{
    driver::{FrameDriver, Tick},
    error::DriftboxResult,
    surface::Surface,
};

/// Cooperative stop flag, checked at the top of every tick. Clones share
/// one flag; any holder may cancel.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Sleep-until-next-frame pacing.
///
/// Tick deadlines are multiples of the frame interval from a fixed origin,
/// standing in for a display's refresh callback. A loop that falls behind
/// skips the missed boundaries instead of bursting to catch up.
#[derive(Debug)]
pub struct FramePacer {
    interval: Duration,
    origin: Instant,
    next: Duration,
}

impl FramePacer {
    pub fn new(fps: u32) -> Self {
        let fps = fps.max(1);
        Self {
            interval: Duration::from_secs_f64(1.0 / fps as f64),
            origin: Instant::now(),
            next: Duration::ZERO,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Blocks until the next frame boundary and returns the tick timestamp
    /// in seconds since the pacer's origin. The first call returns
    /// immediately at zero.
    pub fn wait(&mut self) -> f64 {
        let target = self.next;
        let now = self.origin.elapsed();
        if now < target {
            std::thread::sleep(target - now);
            self.next = target + self.interval;
            return target.as_secs_f64();
        }
        // Behind schedule: run now and realign to the next boundary still
        // in the future.
        let k = (now.as_secs_f64() / self.interval.as_secs_f64()).floor() + 1.0;
        self.next = self.interval.mul_f64(k);
        if target.is_zero() { 0.0 } else { now.as_secs_f64() }
    }
}

/// Counters from one run of the frame loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    pub ticks: u64,
    pub rendered: u64,
    pub deferred: u64,
}

/// Drives the frame loop until the token is cancelled.
///
/// Each pass waits for the next frame boundary, checks the token, then runs
/// one driver tick. `on_tick` sees every outcome (and typically cancels
/// once it has what it needs); its errors stop the loop.
pub fn run_loop<S: Surface>(
    driver: &mut FrameDriver,
    surface: &mut S,
    pacer: &mut FramePacer,
    cancel: &CancelToken,
    mut on_tick: impl FnMut(&mut S, Tick) -> DriftboxResult<()>,
) -> DriftboxResult<RunStats> {
    let mut stats = RunStats::default();
    loop {
        let now = pacer.wait();
        if cancel.is_cancelled() {
            tracing::debug!(?stats, "frame loop cancelled");
            return Ok(stats);
        }

        let tick = driver.tick(surface, now)?;
        stats.ticks += 1;
        match tick {
            Tick::Rendered { .. } => stats.rendered += 1,
            Tick::Deferred => stats.deferred += 1,
        }
        on_tick(surface, tick)?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{Point, Rect, Rgba8},
        driver::FrameDriverOpts,
        pool::ShapePool,
        store::ScaleStore,
        surface::TextStyle,
    };

    struct StubSurface {
        size: (f64, f64),
    }

    impl Surface for StubSurface {
        fn logical_size(&self) -> (f64, f64) {
            self.size
        }

        fn clear(&mut self, _color: Rgba8) {}

        fn fill_rect(&mut self, _rect: Rect, _color: Rgba8) {}

        fn draw_text(
            &mut self,
            _text: &str,
            _origin: Point,
            _style: TextStyle,
        ) -> DriftboxResult<()> {
            Ok(())
        }

        fn supports_text(&self) -> bool {
            true
        }
    }

    fn quiet_driver() -> FrameDriver {
        FrameDriver::new(
            ShapePool::default(),
            ScaleStore::default(),
            FrameDriverOpts {
                overlay: None,
                ..FrameDriverOpts::default()
            },
        )
    }

    #[test]
    fn token_is_shared_between_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn pacer_timestamps_increase_by_the_interval() {
        let mut pacer = FramePacer::new(1000);
        let a = pacer.wait();
        let b = pacer.wait();
        let c = pacer.wait();
        assert_eq!(a, 0.0);
        assert!(b > a);
        assert!(c > b);
    }

    #[test]
    fn loop_stops_after_cancel_from_the_callback() {
        let mut driver = quiet_driver();
        let mut surface = StubSurface { size: (64.0, 64.0) };
        let mut pacer = FramePacer::new(1000);
        let cancel = CancelToken::new();

        let hook = cancel.clone();
        let mut seen = 0u64;
        let stats = run_loop(&mut driver, &mut surface, &mut pacer, &cancel, |_, tick| {
            assert!(matches!(tick, Tick::Rendered { .. }));
            seen += 1;
            if seen == 3 {
                hook.cancel();
            }
            Ok(())
        })
        .unwrap();

        assert_eq!(seen, 3);
        assert_eq!(stats.ticks, 3);
        assert_eq!(stats.rendered, 3);
        assert_eq!(stats.deferred, 0);
    }

    #[test]
    fn deferred_ticks_are_counted() {
        let mut driver = quiet_driver();
        let mut surface = StubSurface { size: (0.0, 0.0) };
        let mut pacer = FramePacer::new(1000);
        let cancel = CancelToken::new();

        let hook = cancel.clone();
        let mut seen = 0u64;
        let stats = run_loop(&mut driver, &mut surface, &mut pacer, &cancel, |_, tick| {
            assert_eq!(tick, Tick::Deferred);
            seen += 1;
            if seen == 2 {
                hook.cancel();
            }
            Ok(())
        })
        .unwrap();

        assert_eq!(stats.deferred, 2);
        assert_eq!(stats.rendered, 0);
    }
}
