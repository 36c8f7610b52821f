//! Frame statistics.
//!
//! Frame times are accumulated over a fixed reporting interval; once it has passed the
//! average rate, mean frame time and slowest frame are reported and the window restarts.

use instant::Duration;

pub const REPORT_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameReport {
    pub fps: f32,
    pub mean_ms: f32,
    pub worst_ms: f32,
    pub frames: u32,
}

impl FrameReport {
    pub fn title(&self, app: &str) -> String {
        format!("{app} | {:.0} fps ({:.1} ms, worst {:.1} ms)", self.fps, self.mean_ms, self.worst_ms)
    }
}

#[derive(Debug)]
pub struct FrameStats {
    interval: Duration,
    elapsed: Duration,
    worst: Duration,
    frames: u32,
}

impl FrameStats {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            elapsed: Duration::ZERO,
            worst: Duration::ZERO,
            frames: 0,
        }
    }

    /// Records one frame; returns a report whenever a full interval has been covered.
    pub fn record(&mut self, dt: Duration) -> Option<FrameReport> {
        self.elapsed += dt;
        self.worst = self.worst.max(dt);
        self.frames += 1;
        if self.elapsed < self.interval {
            return None;
        }
        let seconds = self.elapsed.as_secs_f32();
        let report = FrameReport {
            fps: if seconds > 0.0 { self.frames as f32 / seconds } else { 0.0 },
            mean_ms: seconds * 1000.0 / self.frames as f32,
            worst_ms: self.worst.as_secs_f32() * 1000.0,
            frames: self.frames,
        };
        *self = Self::new(self.interval);
        Some(report)
    }
}

impl Default for FrameStats {
    fn default() -> Self {
        Self::new(REPORT_INTERVAL)
    }
}
