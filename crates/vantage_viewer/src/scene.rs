//! Scene collaborator and drawing buffer sizing.

use std::sync::Arc;

use parking_lot::Mutex;

use vantage_core::SimTime;

use crate::error::SceneError;

/// Scene shared between the viewer and its host.
pub type SharedScene = Arc<Mutex<dyn Scene>>;

/// The renderer the viewer drives once per frame.
pub trait Scene: Send {
    /// Advances scene state to `time`. May fail or panic.
    fn update(&mut self, time: SimTime) -> Result<(), SceneError>;

    /// Draws the frame prepared by `update`.
    fn render(&mut self, _time: SimTime) -> Result<(), SceneError> {
        Ok(())
    }

    /// Called when the drawing buffer size changes.
    fn set_viewport(&mut self, _viewport: Viewport) {}
}

/// Host element the viewer draws into.
#[derive(Clone, Debug, PartialEq)]
pub struct Container {
    /// Host identifier
    pub id: String,
    /// Width in CSS pixels
    pub client_width: f64,
    /// Height in CSS pixels
    pub client_height: f64,
    /// Device pixels per CSS pixel
    pub device_pixel_ratio: f64,
}

impl Container {
    /// Container with a device pixel ratio of 1.
    pub fn new(id: impl Into<String>, client_width: f64, client_height: f64) -> Self {
        Self {
            id: id.into(),
            client_width,
            client_height,
            device_pixel_ratio: 1.0,
        }
    }

    /// Sets the device pixel ratio.
    #[must_use]
    pub fn with_device_pixel_ratio(mut self, ratio: f64) -> Self {
        self.device_pixel_ratio = ratio;
        self
    }
}

/// Drawing buffer dimensions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    /// Width in device pixels
    pub width: u32,
    /// Height in device pixels
    pub height: u32,
    /// Drawing buffer pixels per CSS pixel
    pub pixel_ratio: f64,
}

impl Viewport {
    /// Sizes the drawing buffer for `container`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn compute(container: &Container, resolution_scale: f64, use_recommended: bool) -> Self {
        let pixel_ratio = if use_recommended {
            resolution_scale
        } else {
            resolution_scale * container.device_pixel_ratio
        };
        Self {
            width: (container.client_width * pixel_ratio).floor().max(0.0) as u32,
            height: (container.client_height * pixel_ratio).floor().max(0.0) as u32,
            pixel_ratio,
        }
    }
}
