use crate::core::AppControl;

/// Render-loop state.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoopPhase {
    Running,
    Closed,
}

/// Why the loop left `Running`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum CloseReason {
    /// The window system asked the window to close.
    WindowClosed,
    /// The configured cancel key was pressed.
    CancelKey,
    /// The app returned `AppControl::Exit`.
    App,
}

/// What one loop iteration did.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Iteration {
    pub control: AppControl,
    /// False when the frame was skipped (zero-sized or unavailable surface).
    pub presented: bool,
}

/// Two-state render loop.
///
/// Each iteration either runs the frame callback (while `Running`) or does
/// nothing (once `Closed`). A cancel key seen at the start of an iteration
/// still lets that iteration's frame through, so a close requested during
/// iteration N yields at most one more presented frame.
#[derive(Debug)]
pub struct FrameLoop {
    phase: LoopPhase,
    close_reason: Option<CloseReason>,
    iterations: u64,
    frames_presented: u64,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self {
            phase: LoopPhase::Running,
            close_reason: None,
            iterations: 0,
            frames_presented: 0,
        }
    }

    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == LoopPhase::Running
    }

    pub fn close_reason(&self) -> Option<CloseReason> {
        self.close_reason
    }

    /// Iterations that ran the frame callback.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Iterations whose frame actually reached the screen.
    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }

    /// Moves to `Closed`. Returns `false` if the loop was already closed.
    pub fn request_close(&mut self, reason: CloseReason) -> bool {
        if self.phase == LoopPhase::Closed {
            return false;
        }
        log::info!("close requested: {reason:?}");
        self.phase = LoopPhase::Closed;
        self.close_reason = Some(reason);
        true
    }

    /// Runs one loop iteration.
    ///
    /// `cancel_pressed` is the input poll result for this iteration; `frame`
    /// draws and presents. Returns the phase after the iteration.
    pub fn iterate<F>(&mut self, cancel_pressed: bool, frame: F) -> LoopPhase
    where
        F: FnOnce() -> Iteration,
    {
        if self.phase == LoopPhase::Closed {
            return self.phase;
        }

        if cancel_pressed {
            self.request_close(CloseReason::CancelKey);
        }

        let Iteration { control, presented } = frame();
        self.iterations += 1;
        if presented {
            self.frames_presented += 1;
        }

        if control == AppControl::Exit {
            self.request_close(CloseReason::App);
        }

        self.phase
    }
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draw(count: &mut u32) -> impl FnOnce() -> Iteration + '_ {
        move || {
            *count += 1;
            Iteration {
                control: AppControl::Continue,
                presented: true,
            }
        }
    }

    fn skipped() -> Iteration {
        Iteration {
            control: AppControl::Continue,
            presented: false,
        }
    }

    #[test]
    fn runs_until_closed() {
        let mut lp = FrameLoop::new();
        let mut drawn = 0;
        for _ in 0..5 {
            assert_eq!(lp.iterate(false, draw(&mut drawn)), LoopPhase::Running);
        }
        assert_eq!(drawn, 5);
        assert_eq!(lp.iterations(), 5);
        assert_eq!(lp.frames_presented(), 5);
    }

    #[test]
    fn skipped_frames_are_not_counted_as_presented() {
        let mut lp = FrameLoop::new();
        let mut drawn = 0;
        lp.iterate(false, skipped);
        lp.iterate(false, draw(&mut drawn));
        lp.iterate(false, skipped);
        assert_eq!(lp.iterations(), 3);
        assert_eq!(lp.frames_presented(), 1);
    }

    #[test]
    fn close_before_first_iteration_draws_nothing() {
        let mut lp = FrameLoop::new();
        let mut drawn = 0;
        assert!(lp.request_close(CloseReason::WindowClosed));
        assert_eq!(lp.iterate(false, draw(&mut drawn)), LoopPhase::Closed);
        assert_eq!(drawn, 0);
        assert_eq!(lp.iterations(), 0);
    }

    #[test]
    fn cancel_on_first_iteration_presents_at_most_one_frame() {
        let mut lp = FrameLoop::new();
        let mut drawn = 0;
        assert_eq!(lp.iterate(true, draw(&mut drawn)), LoopPhase::Closed);
        for _ in 0..3 {
            assert_eq!(lp.iterate(false, draw(&mut drawn)), LoopPhase::Closed);
        }
        assert_eq!(drawn, 1);
        assert_eq!(lp.frames_presented(), 1);
        assert_eq!(lp.close_reason(), Some(CloseReason::CancelKey));
    }

    #[test]
    fn app_exit_closes_the_loop() {
        let mut lp = FrameLoop::new();
        let exit = || Iteration {
            control: AppControl::Exit,
            presented: false,
        };
        assert_eq!(lp.iterate(false, exit), LoopPhase::Closed);
        assert_eq!(lp.close_reason(), Some(CloseReason::App));
    }

    #[test]
    fn first_close_reason_wins() {
        let mut lp = FrameLoop::new();
        assert!(lp.request_close(CloseReason::CancelKey));
        assert!(!lp.request_close(CloseReason::WindowClosed));
        assert_eq!(lp.close_reason(), Some(CloseReason::CancelKey));
    }
}
