use serde::Serialize;
use xcap::Monitor;

use super::frame::{crop_rgba, FrameHandle, Region};
use crate::error::RecorderError;

/// A source of raw frames for a fixed display surface.
///
/// The production implementation talks to the OS; tests substitute scripted
/// sources that replay fixed byte patterns.
pub trait FrameSource {
    /// Pixel dimensions of the underlying display surface.
    fn bounds(&self) -> (u32, u32);

    /// Captures the region as an owned frame.
    fn capture(&self, region: &Region) -> Result<FrameHandle, RecorderError>;
}

/// Frame source backed by the primary display via `xcap`.
///
/// Captures the whole monitor and crops to the region. On macOS the
/// first capture requires the Screen Recording permission.
pub struct DisplaySource {
    monitor: Monitor,
}

impl DisplaySource {
    /// Opens the primary display, falling back to the first enumerated one.
    pub fn primary() -> Result<Self, RecorderError> {
        let monitors = Monitor::all().map_err(|e| {
            RecorderError::Capture(format!("failed to enumerate displays: {}", e))
        })?;

        let monitor = monitors
            .iter()
            .find(|m| m.is_primary())
            .or_else(|| monitors.first())
            .cloned()
            .ok_or_else(|| RecorderError::Capture("no displays found".to_string()))?;

        Ok(Self { monitor })
    }

    pub fn name(&self) -> String {
        self.monitor.name().to_string()
    }
}

impl FrameSource for DisplaySource {
    fn bounds(&self) -> (u32, u32) {
        (self.monitor.width(), self.monitor.height())
    }

    fn capture(&self, region: &Region) -> Result<FrameHandle, RecorderError> {
        let image = self
            .monitor
            .capture_image()
            .map_err(|e| RecorderError::Capture(format!("display capture failed: {}", e)))?;

        let (img_w, img_h) = (image.width(), image.height());
        let raw = image.into_raw();
        crop_rgba(&raw, img_w, img_h, region)
    }
}

/// Information about one attached display, for the `detect` subcommand.
#[derive(Debug, Serialize)]
pub struct DisplayInfo {
    pub name: String,
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub primary: bool,
}

pub fn detect_displays() -> Result<Vec<DisplayInfo>, RecorderError> {
    let monitors = Monitor::all()
        .map_err(|e| RecorderError::Capture(format!("failed to enumerate displays: {}", e)))?;

    Ok(monitors
        .iter()
        .map(|m| DisplayInfo {
            name: m.name().to_string(),
            x: m.x(),
            y: m.y(),
            width: m.width(),
            height: m.height(),
            primary: m.is_primary(),
        })
        .collect())
}
