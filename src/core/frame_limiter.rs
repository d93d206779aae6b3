use std::thread;
use std::time::{Duration, Instant};

/// Caps the display loop at a fixed frame rate.
/// Late frames move the schedule forward instead of bursting to catch up.
#[derive(Debug, Clone)]
pub struct FrameLimiter {
    interval: Option<Duration>,
    deadline: Instant,
}

impl FrameLimiter {
    /// `fps == 0` means uncapped
    pub fn new(fps: u32) -> Self {
        Self::starting_at(fps, Instant::now())
    }

    pub fn starting_at(fps: u32, start: Instant) -> Self {
        let interval = (fps > 0).then(|| Duration::from_secs_f64(1.0 / fps as f64));
        Self {
            interval,
            deadline: start,
        }
    }

    /// Minimum time between frames, if capped
    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    /// Advance to the next frame and return how long to wait from `now`
    pub fn next_delay(&mut self, now: Instant) -> Duration {
        let Some(interval) = self.interval else {
            return Duration::ZERO;
        };

        self.deadline += interval;
        if self.deadline <= now {
            self.deadline = now;
            Duration::ZERO
        } else {
            self.deadline - now
        }
    }

    /// Sleep until the next frame may start
    pub fn wait(&mut self) {
        let delay = self.next_delay(Instant::now());
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncapped_never_waits() {
        let start = Instant::now();
        let mut limiter = FrameLimiter::starting_at(0, start);

        assert_eq!(limiter.interval(), None);
        assert_eq!(limiter.next_delay(start), Duration::ZERO);
        assert_eq!(limiter.next_delay(start), Duration::ZERO);
    }

    #[test]
    fn interval_matches_rate() {
        let limiter = FrameLimiter::new(120);
        let interval = limiter.interval().unwrap();
        assert!((interval.as_secs_f64() - 1.0 / 120.0).abs() < 1e-9);
    }

    #[test]
    fn fast_frames_wait_out_the_interval() {
        let start = Instant::now();
        let mut limiter = FrameLimiter::starting_at(100, start); // 10ms

        // Frame finished after 2ms - should wait 8ms
        let delay = limiter.next_delay(start + Duration::from_millis(2));
        assert_eq!(delay, Duration::from_millis(8));

        // Next frame finished right on the deadline
        let delay = limiter.next_delay(start + Duration::from_millis(20));
        assert_eq!(delay, Duration::ZERO);
    }

    #[test]
    fn late_frame_does_not_burst() {
        let start = Instant::now();
        let mut limiter = FrameLimiter::starting_at(100, start);

        // 55ms late: schedule restarts from now
        let late = start + Duration::from_millis(55);
        assert_eq!(limiter.next_delay(late), Duration::ZERO);

        // Following frame waits a full interval again
        let delay = limiter.next_delay(late + Duration::from_millis(1));
        assert_eq!(delay, Duration::from_millis(9));
    }

    #[test]
    fn wait_sleeps_roughly_one_interval() {
        let mut limiter = FrameLimiter::new(200); // 5ms
        let before = Instant::now();
        limiter.wait();
        let elapsed = before.elapsed();

        assert!(elapsed >= Duration::from_millis(4));
        assert!(elapsed < Duration::from_millis(100));
    }
}
