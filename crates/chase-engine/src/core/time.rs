/// Frame clock for a one-step-per-frame loop.
///
/// Wall-clock frame time is recorded for diagnostics, but the simulation always
/// advances by exactly one fixed step per rendered frame: no sub-stepping and
/// no interpolation.
#[derive(Debug, Clone)]
pub struct FrameClock {
    /// The fixed delta time per tick.
    dt: f32,
    /// Wall-clock time reported by the host since the clock started.
    elapsed: f64,
    /// Wall-clock duration of the most recent frame.
    last_frame: f32,
    /// Number of ticks run so far.
    ticks: u64,
}

impl FrameClock {
    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            elapsed: 0.0,
            last_frame: 0.0,
            ticks: 0,
        }
    }

    /// Record one rendered frame. Returns the fixed step to simulate.
    pub fn advance(&mut self, frame_dt: f32) -> f32 {
        // Hosts report negative or NaN deltas after tab switches.
        let frame_dt = if frame_dt.is_finite() && frame_dt >= 0.0 {
            frame_dt
        } else {
            log::warn!("ignoring invalid frame delta {}", frame_dt);
            0.0
        };
        self.elapsed += frame_dt as f64;
        self.last_frame = frame_dt;
        self.ticks += 1;
        self.dt
    }

    /// The fixed delta time.
    pub fn dt(&self) -> f32 {
        self.dt
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn last_frame(&self) -> f32 {
        self.last_frame
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
