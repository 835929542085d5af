use std::time::Duration;

use crate::backend::{RenderBackend, RenderError};
use crate::gpu::BackdropUniforms;
use crate::state::RenderState;
use crate::types::{MotionProfile, Viewport};

/// What a call to [`BackdropRenderer::frame`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    Rendered,
    /// Skipped because the minimum frame interval had not elapsed.
    Throttled,
    /// Skipped because the host is not visible.
    Hidden,
    /// The backend has been released.
    Idle,
}

/// Drives one backend: sizes it, tracks the pointer and fills the uniform
/// block for every executed frame.
pub struct BackdropRenderer<B: RenderBackend> {
    backend: B,
    state: RenderState,
    intensity: f32,
    uniforms: BackdropUniforms,
    released: bool,
}

impl<B: RenderBackend> BackdropRenderer<B> {
    pub fn new(
        backend: B,
        start: Duration,
        motion: MotionProfile,
        pointer_smoothing: f32,
        max_device_pixel_ratio: f32,
    ) -> Self {
        Self {
            backend,
            state: RenderState::new(
                start,
                motion.frame_interval,
                pointer_smoothing,
                max_device_pixel_ratio,
            ),
            intensity: motion.intensity,
            uniforms: BackdropUniforms::default(),
            released: false,
        }
    }

    /// Applies a new viewport. The backend is reconfigured only when the
    /// capped backing-store size changed; returns whether it was.
    pub fn resize(&mut self, viewport: Viewport) -> bool {
        if self.released {
            return false;
        }
        match self.state.apply_viewport(viewport) {
            Some((width, height)) => {
                self.backend.configure(width, height);
                true
            }
            None => false,
        }
    }

    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        self.state.set_pointer_target(x, y);
    }

    pub fn pointer_left(&mut self) {
        self.state.clear_pointer();
    }

    /// Runs the frame at `now` unless it is hidden, throttled or released.
    pub fn frame(&mut self, now: Duration, visible: bool) -> Result<FrameOutcome, RenderError> {
        if self.released {
            return Ok(FrameOutcome::Idle);
        }
        if !visible {
            return Ok(FrameOutcome::Hidden);
        }
        if !self.state.claim_frame(now) {
            return Ok(FrameOutcome::Throttled);
        }

        let pointer = self.state.advance_pointer();
        let (width, height) = self.state.pixel_size();
        self.uniforms = BackdropUniforms {
            resolution: [width as f32, height as f32],
            pointer,
            time: self.state.elapsed(now),
            intensity: self.intensity,
            pointer_mix: self.state.pointer_mix(),
            padding: 0.0,
        };
        self.backend.upload(&self.uniforms);
        self.backend.submit()?;
        Ok(FrameOutcome::Rendered)
    }

    /// Releases backend resources. Safe to call more than once.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.backend.release();
    }

    /// Uniform block written by the most recent rendered frame.
    pub fn uniforms(&self) -> &BackdropUniforms {
        &self.uniforms
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{BackendLog, RecordingBackend};

    fn renderer() -> (BackdropRenderer<RecordingBackend>, BackendLog) {
        let log = BackendLog::default();
        let motion = MotionProfile {
            frame_interval: Duration::from_millis(16),
            intensity: 1.0,
            reduced: false,
        };
        let renderer =
            BackdropRenderer::new(RecordingBackend::new(&log), Duration::ZERO, motion, 0.12, 1.2);
        (renderer, log)
    }

    #[test]
    fn resize_reconfigures_only_on_change() {
        let (mut renderer, log) = renderer();
        assert!(renderer.resize(Viewport::new(640.0, 480.0, 1.0)));
        assert!(!renderer.resize(Viewport::new(640.0, 480.0, 1.0)));
        assert!(renderer.resize(Viewport::new(640.0, 400.0, 1.0)));
        assert_eq!(log.configures(), vec![(640, 480), (640, 400)]);
    }

    #[test]
    fn frames_five_ms_apart_render_once() {
        let (mut renderer, log) = renderer();
        renderer.resize(Viewport::new(100.0, 100.0, 1.0));
        let first = renderer.frame(Duration::from_millis(1_000), true).unwrap();
        let second = renderer.frame(Duration::from_millis(1_005), true).unwrap();
        assert_eq!(first, FrameOutcome::Rendered);
        assert_eq!(second, FrameOutcome::Throttled);
        assert_eq!(log.submits(), 1);
        assert_eq!(log.uploads().len(), 1);
    }

    #[test]
    fn hidden_frames_write_nothing() {
        let (mut renderer, log) = renderer();
        renderer.resize(Viewport::new(100.0, 100.0, 1.0));
        for step in 0..10u64 {
            let outcome = renderer
                .frame(Duration::from_millis(step * 20), false)
                .unwrap();
            assert_eq!(outcome, FrameOutcome::Hidden);
        }
        assert!(log.uploads().is_empty());
        assert_eq!(log.submits(), 0);
    }

    #[test]
    fn uniforms_carry_frame_inputs() {
        let (mut renderer, log) = renderer();
        renderer.resize(Viewport::new(300.0, 200.0, 1.0));
        renderer.pointer_moved(1.0, 0.5);
        renderer.frame(Duration::from_millis(2_000), true).unwrap();

        let uniforms = log.uploads()[0];
        assert_eq!(uniforms.resolution, [300.0, 200.0]);
        assert!((uniforms.pointer[0] - 0.56).abs() < 1e-6);
        assert!((uniforms.time - 2.0).abs() < 1e-6);
        assert_eq!(uniforms.intensity, 1.0);
        assert_eq!(uniforms.pointer_mix, 1.0);
        assert_eq!(uniforms.padding, 0.0);
        assert_eq!(renderer.uniforms(), &uniforms);
    }

    #[test]
    fn upload_precedes_submit() {
        let (mut renderer, log) = renderer();
        renderer.resize(Viewport::new(10.0, 10.0, 1.0));
        renderer.frame(Duration::ZERO, true).unwrap();
        assert_eq!(log.calls(), vec!["configure", "upload", "submit"]);
    }

    #[test]
    fn release_happens_once_and_idles_frames() {
        let (mut renderer, log) = renderer();
        renderer.release();
        renderer.release();
        assert_eq!(log.releases(), 1);
        assert_eq!(
            renderer.frame(Duration::from_secs(1), true).unwrap(),
            FrameOutcome::Idle
        );
        assert!(!renderer.resize(Viewport::new(50.0, 50.0, 1.0)));
        assert!(log.uploads().is_empty());
    }

    #[test]
    fn submit_errors_propagate() {
        let (mut renderer, log) = renderer();
        log.fail_next_submit();
        assert!(renderer.frame(Duration::ZERO, true).is_err());
    }
}
