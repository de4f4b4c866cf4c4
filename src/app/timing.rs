use std::time::{Duration, Instant};

/// Timing for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTick {
    /// Seconds since the clock started; drives the model animator.
    pub elapsed: f32,
    pub dt: f32,
}

pub struct FrameClock {
    start: Instant,
    last_frame_time: Option<Instant>,
    last_fps_time: Instant,
    frame_count: u32,
    pub frame_dt: f32,
}

impl FrameClock {
    pub fn new(start: Instant) -> Self {
        Self {
            start,
            last_frame_time: None,
            last_fps_time: start,
            frame_count: 0,
            frame_dt: 1.0 / 60.0,
        }
    }

    pub fn update(&mut self, now: Instant) -> FrameTick {
        let dt_duration = if let Some(last) = self.last_frame_time {
            now.saturating_duration_since(last)
        } else {
            Duration::from_millis(16)
        };
        self.last_frame_time = Some(now);
        self.frame_dt = dt_duration.as_secs_f32().max(0.0);

        self.frame_count = self.frame_count.saturating_add(1);
        let since_report = now.saturating_duration_since(self.last_fps_time);
        if since_report.as_secs_f32() >= 0.5 {
            let fps = self.frame_count as f32 / since_report.as_secs_f32();
            log::debug!(
                "{:.1} fps (cadence {:.2} ms)",
                fps,
                (self.frame_dt * 1000.0).max(0.0)
            );
            self.frame_count = 0;
            self.last_fps_time = now;
        }

        FrameTick {
            elapsed: now.saturating_duration_since(self.start).as_secs_f32(),
            dt: self.frame_dt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_assumes_sixty_hz() {
        let start = Instant::now();
        let mut clock = FrameClock::new(start);
        let tick = clock.update(start);
        assert_eq!(tick.elapsed, 0.0);
        assert!((tick.dt - 0.016).abs() < 1e-6);
    }

    #[test]
    fn elapsed_and_dt_follow_the_supplied_instants() {
        let start = Instant::now();
        let mut clock = FrameClock::new(start);
        clock.update(start + Duration::from_millis(100));
        let tick = clock.update(start + Duration::from_millis(350));
        assert!((tick.elapsed - 0.35).abs() < 1e-4);
        assert!((tick.dt - 0.25).abs() < 1e-4);
    }

    #[test]
    fn time_going_backwards_clamps_to_zero() {
        let start = Instant::now();
        let mut clock = FrameClock::new(start + Duration::from_secs(1));
        clock.update(start + Duration::from_secs(2));
        let tick = clock.update(start);
        assert_eq!(tick.dt, 0.0);
        assert_eq!(tick.elapsed, 0.0);
    }
}
