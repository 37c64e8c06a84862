use std::time::Instant;

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Wall-clock seconds since the clock was created.
    ///
    /// Unclamped; animations that are functions of time read this.
    pub elapsed: f32,

    /// Monotonic tick counter, starting at 0.
    pub frame_index: u64,
}

/// Frame clock producing `FrameTime` snapshots.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    frame_index: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            frame_index: 0,
        }
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        let ft = FrameTime {
            elapsed: Instant::now()
                .saturating_duration_since(self.start)
                .as_secs_f32(),
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn frame_index_counts_ticks() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick().frame_index, 0);
        assert_eq!(clock.tick().frame_index, 1);
        assert_eq!(clock.tick().frame_index, 2);
    }

    #[test]
    fn elapsed_is_monotonic() {
        let mut clock = FrameClock::new();
        let a = clock.tick();
        std::thread::sleep(Duration::from_millis(2));
        let b = clock.tick();
        assert!(b.elapsed >= a.elapsed);
        assert!(b.elapsed > 0.0);
    }
}
