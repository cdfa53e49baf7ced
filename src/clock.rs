/// Policy for turning the raw frames-per-second quotient into the reported
/// sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FpsRounding {
    /// Round half up to a whole number; labels show an integer.
    #[default]
    HalfUp,
    /// Keep the raw quotient; labels show two decimals.
    Exact,
}

impl FpsRounding {
    pub fn apply(self, raw: f64) -> f64 {
        match self {
            Self::HalfUp => (raw + 0.5).floor(),
            Self::Exact => raw,
        }
    }

    /// Overlay label for a sampled value.
    pub fn label(self, fps: f64) -> String {
        match self {
            Self::HalfUp => format!("fps: {}", fps as i64),
            Self::Exact => format!("fps: {fps:.2}"),
        }
    }
}

/// Per-driver timing state: the previous tick's timestamp plus a one-second
/// sampling window for a smoothed frames-per-second estimate.
///
/// Timestamps are seconds on any monotonically increasing clock; the driver
/// feeds wall time when live and synthetic `frame / fps` times offline.
#[derive(Clone, Debug)]
pub struct FrameClock {
    last_update: f64,
    window_start: f64,
    frames_in_window: u32,
    fps: f64,
    rounding: FpsRounding,
}

impl FrameClock {
    pub fn new(now: f64, rounding: FpsRounding) -> Self {
        Self {
            last_update: now,
            window_start: now,
            frames_in_window: 0,
            fps: 0.0,
            rounding,
        }
    }

    /// Returns the elapsed seconds since the previous tick (zero on the
    /// first) and records `now` as that tick's timestamp.
    pub fn begin_tick(&mut self, now: f64) -> f64 {
        let elapsed = now - self.last_update;
        self.last_update = now;
        elapsed
    }

    /// Counts the current tick into the sampling window and refreshes the
    /// FPS sample once the window exceeds one second.
    pub fn count_frame(&mut self, now: f64) {
        self.frames_in_window += 1;
        let window = now - self.window_start;
        if window > 1.0 {
            self.fps = self.rounding.apply(self.frames_in_window as f64 / window);
            self.frames_in_window = 0;
            self.window_start = now;
        }
    }

    /// Most recent sample; `0.0` until the first window closes.
    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn fps_label(&self) -> String {
        self.rounding.label(self.fps)
    }

    pub fn rounding(&self) -> FpsRounding {
        self.rounding
    }
}
