use std::time::Duration;

use backdrop_settings::BackdropSettings;
pub use backdrop_settings::{DEFAULT_CANVAS_ID, DEFAULT_FALLBACK_CLASS};

/// Tunables handed to [`crate::BackdropRuntime::start`].
///
/// Defaults come from [`BackdropSettings::default`]: a 1.2 pixel-ratio
/// ceiling, 0.12 pointer smoothing, ~60 fps normally and ~30 fps under
/// reduced motion.
#[derive(Clone, Debug, PartialEq)]
pub struct BackdropOptions {
    pub canvas_id: String,
    pub fallback_class: String,
    pub frame_interval: Duration,
    pub reduced_frame_interval: Duration,
    pub pointer_smoothing: f32,
    pub max_device_pixel_ratio: f32,
    pub intensity: f32,
    pub reduced_intensity: f32,
    /// Treat the host as if it requested reduced motion.
    pub force_reduced_motion: bool,
}

impl Default for BackdropOptions {
    fn default() -> Self {
        Self::from(&BackdropSettings::default())
    }
}

impl From<&BackdropSettings> for BackdropOptions {
    fn from(settings: &BackdropSettings) -> Self {
        Self {
            canvas_id: settings.page.canvas_id.clone(),
            fallback_class: settings.page.fallback_class.clone(),
            frame_interval: settings.motion.frame_interval,
            reduced_frame_interval: settings.motion.reduced_frame_interval,
            pointer_smoothing: settings.motion.pointer_smoothing,
            max_device_pixel_ratio: settings.display.max_device_pixel_ratio,
            intensity: settings.display.intensity,
            reduced_intensity: settings.display.reduced_intensity,
            force_reduced_motion: settings.motion.reduced_motion,
        }
    }
}

/// Frame pacing and motion intensity resolved against the host preference.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionProfile {
    pub frame_interval: Duration,
    pub intensity: f32,
    pub reduced: bool,
}

impl BackdropOptions {
    pub fn motion_profile(&self, host_prefers_reduced: bool) -> MotionProfile {
        let reduced = self.force_reduced_motion || host_prefers_reduced;
        if reduced {
            MotionProfile {
                frame_interval: self.reduced_frame_interval,
                intensity: self.reduced_intensity,
                reduced,
            }
        } else {
            MotionProfile {
                frame_interval: self.frame_interval,
                intensity: self.intensity,
                reduced,
            }
        }
    }
}

/// Layout size of the drawing area plus the host's device pixel ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub css_width: f64,
    pub css_height: f64,
    pub device_pixel_ratio: f64,
}

impl Viewport {
    pub fn new(css_width: f64, css_height: f64, device_pixel_ratio: f64) -> Self {
        Self {
            css_width,
            css_height,
            device_pixel_ratio,
        }
    }

    /// Backing-store size with the pixel ratio capped at `max_ratio`.
    ///
    /// Each axis is floored and never drops below one pixel.
    pub fn backing_size(&self, max_ratio: f32) -> (u32, u32) {
        let ratio = if self.device_pixel_ratio.is_finite() && self.device_pixel_ratio > 0.0 {
            self.device_pixel_ratio.min(f64::from(max_ratio))
        } else {
            1.0
        };
        (scale_axis(self.css_width, ratio), scale_axis(self.css_height, ratio))
    }
}

fn scale_axis(css: f64, ratio: f64) -> u32 {
    let scaled = (css * ratio).floor();
    if scaled.is_finite() && scaled >= 1.0 {
        scaled.min(f64::from(u32::MAX)) as u32
    } else {
        1
    }
}

/// Summary of the adapter the GPU backend ended up on.
#[derive(Clone, Debug)]
pub struct AdapterProfile {
    pub name: String,
    pub backend: wgpu::Backend,
    pub device_type: wgpu::DeviceType,
    pub driver: String,
    pub max_texture_dimension_2d: u32,
}

impl AdapterProfile {
    pub fn from_wgpu(info: &wgpu::AdapterInfo, limits: &wgpu::Limits) -> Self {
        Self {
            name: info.name.clone(),
            backend: info.backend,
            device_type: info.device_type,
            driver: format!("{} {}", info.driver, info.driver_info)
                .trim()
                .to_string(),
            max_texture_dimension_2d: limits.max_texture_dimension_2d,
        }
    }

    pub fn is_software(&self) -> bool {
        matches!(self.device_type, wgpu::DeviceType::Cpu)
    }
}
