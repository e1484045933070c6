//! # Viewer Configuration
//!
//! Loaded once at startup, from TOML or built in code.
//!
//! ```toml
//! target_frame_rate = 30.0
//! resolution_scale = 0.5
//! show_render_loop_errors = false
//! ```
//!
//! Every field is optional in the file; missing fields take the defaults
//! below.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ViewerError, ViewerResult};

/// Viewer options.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Frames per second to render at. `None` renders on every host frame.
    pub target_frame_rate: Option<f64>,
    /// Multiplier applied to the drawing buffer resolution.
    pub resolution_scale: f64,
    /// Ignore the device pixel ratio and render at CSS pixel resolution.
    pub use_browser_recommended_resolution: bool,
    /// Render automatically on host animation frames.
    pub use_default_render_loop: bool,
    /// Open the error panel when the render loop stops.
    pub show_render_loop_errors: bool,
    /// Let newly added data sources take over the clock.
    pub automatically_track_data_source_clocks: bool,
    /// Overrides the clock's animate flag at construction. `None` keeps
    /// whatever the clock already says.
    pub should_animate: Option<bool>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            target_frame_rate: None,
            resolution_scale: 1.0,
            use_browser_recommended_resolution: true,
            use_default_render_loop: true,
            show_render_loop_errors: true,
            automatically_track_data_source_clocks: true,
            should_animate: None,
        }
    }
}

impl ViewerConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(source: &str) -> ViewerResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| ViewerError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> ViewerResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| ViewerError::ConfigIo {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&source)
    }

    /// Checks numeric ranges.
    pub fn validate(&self) -> ViewerResult<()> {
        validate_resolution_scale(self.resolution_scale)?;
        if let Some(rate) = self.target_frame_rate {
            validate_frame_rate(rate)?;
        }
        Ok(())
    }
}

pub(crate) fn validate_resolution_scale(scale: f64) -> ViewerResult<()> {
    if scale.is_finite() && scale > 0.0 {
        Ok(())
    } else {
        Err(ViewerError::invalid_argument(
            "resolution_scale",
            format!("must be greater than 0, got {scale}"),
        ))
    }
}

pub(crate) fn validate_frame_rate(rate: f64) -> ViewerResult<()> {
    // Infinity is allowed and means "no throttling"
    if rate > 0.0 {
        Ok(())
    } else {
        Err(ViewerError::invalid_argument(
            "target_frame_rate",
            format!("must be greater than 0, got {rate}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ViewerConfig::default();
        assert_eq!(config.target_frame_rate, None);
        assert_eq!(config.resolution_scale, 1.0);
        assert!(config.use_default_render_loop);
        assert!(config.show_render_loop_errors);
        assert!(config.automatically_track_data_source_clocks);
        assert_eq!(config.should_animate, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ViewerConfig::from_toml_str(
            r"
            target_frame_rate = 30.0
            show_render_loop_errors = false
            ",
        )
        .unwrap();

        assert_eq!(config.target_frame_rate, Some(30.0));
        assert!(!config.show_render_loop_errors);
        assert_eq!(config.resolution_scale, 1.0);
        assert_eq!(config.should_animate, None);

        let config = ViewerConfig::from_toml_str("should_animate = true").unwrap();
        assert_eq!(config.should_animate, Some(true));
    }

    #[test]
    fn test_rejects_non_positive_values() {
        let err = ViewerConfig::from_toml_str("resolution_scale = 0.0").unwrap_err();
        assert!(matches!(
            err,
            ViewerError::InvalidArgument { name: "resolution_scale", .. }
        ));

        let err = ViewerConfig::from_toml_str("target_frame_rate = -1.0").unwrap_err();
        assert!(matches!(
            err,
            ViewerError::InvalidArgument { name: "target_frame_rate", .. }
        ));
    }

    #[test]
    fn test_malformed_toml() {
        let err = ViewerConfig::from_toml_str("resolution_scale = \"big\"").unwrap_err();
        assert!(matches!(err, ViewerError::InvalidConfig(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = ViewerConfig::from_toml_file("/nonexistent/vantage.toml").unwrap_err();
        assert!(matches!(err, ViewerError::ConfigIo { .. }));
    }
}
