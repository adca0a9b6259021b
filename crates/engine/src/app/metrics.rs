use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct LoopMetrics {
    pub(crate) fps: f32,
    pub(crate) frame_time_ms: f32,
    pub(crate) worst_frame_ms: f32,
}

/// Averages frame timings over a fixed wall-clock interval.
#[derive(Debug)]
pub(crate) struct MetricsAccumulator {
    interval_start: Instant,
    interval: Duration,
    frames: u32,
    frame_time_sum: Duration,
    worst_frame: Duration,
    latest: LoopMetrics,
}

impl MetricsAccumulator {
    pub(crate) fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval_start: now,
            interval,
            frames: 0,
            frame_time_sum: Duration::ZERO,
            worst_frame: Duration::ZERO,
            latest: LoopMetrics::default(),
        }
    }

    pub(crate) fn record_frame(&mut self, frame_dt: Duration) {
        self.frames = self.frames.saturating_add(1);
        self.frame_time_sum = self.frame_time_sum.saturating_add(frame_dt);
        self.worst_frame = self.worst_frame.max(frame_dt);
    }

    /// Most recently completed interval.
    pub(crate) fn latest(&self) -> LoopMetrics {
        self.latest
    }

    /// Closes the interval once it has elapsed and returns its averages.
    pub(crate) fn maybe_snapshot(&mut self, now: Instant) -> Option<LoopMetrics> {
        let elapsed = now.saturating_duration_since(self.interval_start);
        if elapsed < self.interval {
            return None;
        }

        let elapsed_seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let frame_time_ms = if self.frames == 0 {
            0.0
        } else {
            (self.frame_time_sum.as_secs_f32() / self.frames as f32) * 1000.0
        };
        self.latest = LoopMetrics {
            fps: self.frames as f32 / elapsed_seconds,
            frame_time_ms,
            worst_frame_ms: self.worst_frame.as_secs_f32() * 1000.0,
        };

        self.interval_start = now;
        self.frames = 0;
        self.frame_time_sum = Duration::ZERO;
        self.worst_frame = Duration::ZERO;

        Some(self.latest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_averages_the_interval() {
        let base = Instant::now();
        let mut accumulator = MetricsAccumulator::new(Duration::from_secs(1), base);

        accumulator.record_frame(Duration::from_millis(10));
        accumulator.record_frame(Duration::from_millis(30));

        let snapshot = accumulator
            .maybe_snapshot(base + Duration::from_secs(1))
            .expect("snapshot should be emitted");

        assert!((snapshot.fps - 2.0).abs() < 0.05);
        assert!((snapshot.frame_time_ms - 20.0).abs() < 0.001);
        assert!((snapshot.worst_frame_ms - 30.0).abs() < 0.001);
        assert_eq!(accumulator.latest(), snapshot);
    }

    #[test]
    fn snapshot_not_emitted_before_interval() {
        let base = Instant::now();
        let mut accumulator = MetricsAccumulator::new(Duration::from_secs(1), base);
        accumulator.record_frame(Duration::from_millis(16));

        assert!(accumulator
            .maybe_snapshot(base + Duration::from_millis(500))
            .is_none());
        assert_eq!(accumulator.latest(), LoopMetrics::default());
    }

    #[test]
    fn each_interval_starts_fresh() {
        let base = Instant::now();
        let mut accumulator = MetricsAccumulator::new(Duration::from_secs(1), base);
        accumulator.record_frame(Duration::from_millis(50));
        accumulator.maybe_snapshot(base + Duration::from_secs(1));

        accumulator.record_frame(Duration::from_millis(10));
        let second = accumulator
            .maybe_snapshot(base + Duration::from_secs(2))
            .expect("second snapshot");
        assert!((second.worst_frame_ms - 10.0).abs() < 0.001);
    }
}
