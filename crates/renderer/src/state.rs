use std::time::Duration;

use crate::types::Viewport;

/// Normalized position where the smoothed pointer rests before any input.
pub const POINTER_REST: [f32; 2] = [0.5, 0.5];

/// Mutable per-renderer state: backing-store size, pointer tracking and
/// frame pacing. Holds no device resources, so it is fully testable.
#[derive(Clone, Debug)]
pub struct RenderState {
    pixel_width: u32,
    pixel_height: u32,
    max_device_pixel_ratio: f32,
    pointer_target: [f32; 2],
    pointer: [f32; 2],
    pointer_mix: f32,
    smoothing: f32,
    start: Duration,
    last_frame: Option<Duration>,
    frame_interval: Duration,
}

impl RenderState {
    pub fn new(
        start: Duration,
        frame_interval: Duration,
        smoothing: f32,
        max_device_pixel_ratio: f32,
    ) -> Self {
        Self {
            pixel_width: 0,
            pixel_height: 0,
            max_device_pixel_ratio,
            pointer_target: POINTER_REST,
            pointer: POINTER_REST,
            pointer_mix: 0.0,
            smoothing: smoothing.clamp(f32::EPSILON, 1.0),
            start,
            last_frame: None,
            frame_interval,
        }
    }

    /// Recomputes the capped backing-store size.
    ///
    /// Returns the new size only when it differs from the current one.
    pub fn apply_viewport(&mut self, viewport: Viewport) -> Option<(u32, u32)> {
        let (width, height) = viewport.backing_size(self.max_device_pixel_ratio);
        if (width, height) == (self.pixel_width, self.pixel_height) {
            return None;
        }
        self.pixel_width = width;
        self.pixel_height = height;
        Some((width, height))
    }

    pub fn pixel_size(&self) -> (u32, u32) {
        (self.pixel_width, self.pixel_height)
    }

    /// Records a new pointer target, clamped into the unit square.
    pub fn set_pointer_target(&mut self, x: f32, y: f32) {
        self.pointer_target = [clamp_unit(x), clamp_unit(y)];
        self.pointer_mix = 1.0;
    }

    pub fn clear_pointer(&mut self) {
        self.pointer_mix = 0.0;
    }

    pub fn pointer(&self) -> [f32; 2] {
        self.pointer
    }

    pub fn pointer_target(&self) -> [f32; 2] {
        self.pointer_target
    }

    pub fn pointer_mix(&self) -> f32 {
        self.pointer_mix
    }

    pub fn frame_interval(&self) -> Duration {
        self.frame_interval
    }

    /// Claims the frame at `now` if the minimum interval has passed since the
    /// last executed one. The first frame is always claimed.
    pub fn claim_frame(&mut self, now: Duration) -> bool {
        if let Some(last) = self.last_frame {
            if now.saturating_sub(last) < self.frame_interval {
                return false;
            }
        }
        self.last_frame = Some(now);
        true
    }

    /// Time left before a frame at `now` would be claimed.
    pub fn next_frame_in(&self, now: Duration) -> Duration {
        match self.last_frame {
            Some(last) => self.frame_interval.saturating_sub(now.saturating_sub(last)),
            None => Duration::ZERO,
        }
    }

    /// Moves the smoothed pointer one step toward its target.
    pub fn advance_pointer(&mut self) -> [f32; 2] {
        for axis in 0..2 {
            let delta = self.pointer_target[axis] - self.pointer[axis];
            self.pointer[axis] += delta * self.smoothing;
        }
        self.pointer
    }

    /// Seconds since the renderer started, for the animation phase.
    pub fn elapsed(&self, now: Duration) -> f32 {
        now.saturating_sub(self.start).as_secs_f32()
    }
}

fn clamp_unit(value: f32) -> f32 {
    if value.is_nan() {
        return 0.5;
    }
    value.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> RenderState {
        RenderState::new(Duration::ZERO, Duration::from_millis(16), 0.12, 1.2)
    }

    #[test]
    fn unchanged_viewport_skips_reconfiguration() {
        let mut state = state();
        let viewport = Viewport::new(800.0, 600.0, 2.0);
        assert_eq!(state.apply_viewport(viewport), Some((960, 720)));
        assert_eq!(state.apply_viewport(viewport), None);
        // A higher pixel ratio still lands on the same capped size.
        assert_eq!(state.apply_viewport(Viewport::new(800.0, 600.0, 3.0)), None);
        assert_eq!(
            state.apply_viewport(Viewport::new(1024.0, 600.0, 1.0)),
            Some((1024, 600))
        );
        assert_eq!(state.pixel_size(), (1024, 600));
    }

    #[test]
    fn first_frame_always_claimed() {
        let mut state = state();
        assert_eq!(state.next_frame_in(Duration::ZERO), Duration::ZERO);
        assert!(state.claim_frame(Duration::ZERO));
    }

    #[test]
    fn frames_closer_than_interval_are_skipped() {
        let mut state = state();
        assert!(state.claim_frame(Duration::from_millis(100)));
        assert!(!state.claim_frame(Duration::from_millis(105)));
        assert_eq!(
            state.next_frame_in(Duration::from_millis(105)),
            Duration::from_millis(11)
        );
        assert!(state.claim_frame(Duration::from_millis(116)));
    }

    #[test]
    fn clock_going_backwards_does_not_claim() {
        let mut state = state();
        assert!(state.claim_frame(Duration::from_millis(50)));
        assert!(!state.claim_frame(Duration::from_millis(10)));
    }

    #[test]
    fn pointer_target_is_clamped() {
        let mut state = state();
        state.set_pointer_target(-0.5, 1.7);
        assert_eq!(state.pointer_target(), [0.0, 1.0]);
        assert_eq!(state.pointer_mix(), 1.0);
        state.set_pointer_target(f32::NAN, 0.25);
        assert_eq!(state.pointer_target(), [0.5, 0.25]);
    }

    #[test]
    fn smoothing_is_monotone_without_overshoot() {
        let mut state = state();
        state.set_pointer_target(1.0, 0.0);
        let mut previous = state.pointer();
        for _ in 0..200 {
            let current = state.advance_pointer();
            assert!(current[0] >= previous[0] && current[0] <= 1.0);
            assert!(current[1] <= previous[1] && current[1] >= 0.0);
            previous = current;
        }
        assert!((previous[0] - 1.0).abs() < 1e-4);
        assert!(previous[1].abs() < 1e-4);
    }

    #[test]
    fn single_step_uses_smoothing_factor() {
        let mut state = state();
        state.set_pointer_target(1.0, 0.5);
        let pointer = state.advance_pointer();
        assert!((pointer[0] - 0.56).abs() < 1e-6);
        assert!((pointer[1] - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn clearing_pointer_keeps_position() {
        let mut state = state();
        state.set_pointer_target(0.9, 0.9);
        state.advance_pointer();
        let before = state.pointer();
        state.clear_pointer();
        assert_eq!(state.pointer_mix(), 0.0);
        assert_eq!(state.pointer(), before);
    }

    #[test]
    fn elapsed_counts_from_start() {
        let state = RenderState::new(
            Duration::from_secs(10),
            Duration::from_millis(16),
            0.12,
            1.2,
        );
        assert!((state.elapsed(Duration::from_millis(12_500)) - 2.5).abs() < 1e-6);
        assert_eq!(state.elapsed(Duration::from_secs(1)), 0.0);
    }
}
