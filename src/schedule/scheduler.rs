use crate::foundation::core::lerp;

/// Handle to a window declared on the current frame's timeline.
///
/// Identity is positional: a step must declare its windows in identical source
/// order every frame, and the handle is only meaningful against the
/// [`Scheduler`] that issued it this frame. This scheme is load-bearing: it
/// is what lets the whole schedule be rebuilt from scratch per frame while
/// still addressing "the same" window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeWindow {
    idx: usize,
}

#[derive(Clone, Debug)]
struct WindowState {
    start: f64,
    duration: f64,
    overridden: bool,
}

/// Per-frame allocator of time windows on a single shared timeline.
///
/// The scheduler is rebuilt every frame via [`Scheduler::begin_frame`]; all
/// window progress is a pure function of the frame clock, so jumping the
/// clock to any value reproduces the state sequential playback would have
/// reached. Declaring the same windows at the same clock twice yields
/// identical progress values.
#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    clock: f64,
    cursor: f64,
    windows: Vec<WindowState>,
    breaks: Vec<f64>,
}

impl Scheduler {
    /// Create an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all per-frame state and set the frame clock.
    pub fn begin_frame(&mut self, clock: f64) {
        self.clock = clock;
        self.cursor = 0.0;
        self.windows.clear();
        self.breaks.clear();
    }

    /// Current frame clock.
    pub fn clock(&self) -> f64 {
        self.clock
    }

    /// Declare the next window on the timeline.
    ///
    /// With no `anchor` the window starts where the previous window ended
    /// (the running cursor); with an anchor it starts at the anchor's end.
    /// `delay` offsets the start further. Windows must be declared in the
    /// same order every frame.
    pub fn after_time(
        &mut self,
        anchor: Option<TimeWindow>,
        duration: f64,
        delay: f64,
    ) -> TimeWindow {
        let base = match anchor {
            Some(w) => self.end_time(w),
            None => self.cursor,
        };
        let start = base + delay;
        self.cursor = self.cursor.max(start + duration);
        self.windows.push(WindowState {
            start,
            duration,
            overridden: false,
        });
        TimeWindow {
            idx: self.windows.len() - 1,
        }
    }

    /// Progress of `w` in `[0, 1]` at the current clock.
    ///
    /// Zero-duration windows are step functions. An overridden window (via
    /// [`Scheduler::cleanup`] or [`Scheduler::reset`]) reports 0 regardless
    /// of the clock, and so does anything anchored to it: its end is
    /// unreachable, so downstream windows stall silently.
    pub fn t(&self, w: TimeWindow) -> f64 {
        let st = self.state(w);
        if st.overridden || st.start.is_infinite() {
            return 0.0;
        }
        if st.duration <= 0.0 {
            return if self.clock >= st.start { 1.0 } else { 0.0 };
        }
        ((self.clock - st.start) / st.duration).clamp(0.0, 1.0)
    }

    /// Whether `w` has begun (progress > 0).
    pub fn active(&self, w: TimeWindow) -> bool {
        self.t(w) > 0.0
    }

    /// Interpolate `a -> b` by the progress of `w`.
    pub fn lerp_over(&self, w: TimeWindow, a: f64, b: f64) -> f64 {
        lerp(a, b, self.t(w))
    }

    /// Retract `targets` once `trigger` becomes active.
    ///
    /// While the trigger's progress exceeds 0, every target reports progress
    /// 0 at this and all later clock values, even past its natural
    /// completion.
    pub fn cleanup(&mut self, trigger: TimeWindow, targets: &[TimeWindow]) {
        if !self.active(trigger) {
            return;
        }
        for &w in targets {
            self.state_mut(w).overridden = true;
        }
    }

    /// Force `w` to report progress 0 for the rest of the frame.
    ///
    /// Secondary reset path kept alongside [`Scheduler::cleanup`];
    /// TODO: fold callers into `cleanup` so every retraction is declared
    /// with its trigger.
    pub fn reset(&mut self, w: TimeWindow) {
        self.state_mut(w).overridden = true;
    }

    /// Record a narrative barrier at the current cursor.
    ///
    /// Paragraphs emitted after the barrier are paced against it by the
    /// external narrative driver; window arithmetic is unchanged.
    pub fn break_after(&mut self) {
        self.breaks.push(self.cursor);
    }

    /// Index of the narrative segment currently being declared.
    pub fn break_index(&self) -> usize {
        self.breaks.len()
    }

    /// Timeline positions of the recorded narrative barriers.
    pub fn breaks(&self) -> &[f64] {
        &self.breaks
    }

    fn end_time(&self, w: TimeWindow) -> f64 {
        let st = self.state(w);
        if st.overridden {
            return f64::INFINITY;
        }
        st.start + st.duration
    }

    fn state(&self, w: TimeWindow) -> &WindowState {
        debug_assert!(
            w.idx < self.windows.len(),
            "stale window handle: windows must be re-declared after begin_frame"
        );
        &self.windows[w.idx]
    }

    fn state_mut(&mut self, w: TimeWindow) -> &mut WindowState {
        debug_assert!(
            w.idx < self.windows.len(),
            "stale window handle: windows must be re-declared after begin_frame"
        );
        &mut self.windows[w.idx]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schedule/scheduler.rs"]
mod tests;
