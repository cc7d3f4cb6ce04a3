//! Render settings, export presets and the JSON-backed settings store.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::foundation::{
    core::RgbColor,
    error::{MockupError, MockupResult},
};

/// Accepted `warp_strength` range (pixels, sign flips the fold direction).
pub const WARP_STRENGTH_RANGE: std::ops::RangeInclusive<i32> = -100..=100;
/// Widest export the `Custom` preset accepts.
pub const MAX_CUSTOM_EXPORT_WIDTH: u32 = 16_384;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Jpg,
    Png,
    Webp,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Jpg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }

    /// Whether transparency survives encoding.
    pub fn has_alpha(self) -> bool {
        !matches!(self, Self::Jpg)
    }

    pub fn parse(s: &str) -> MockupResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(Self::Jpg),
            "png" => Ok(Self::Png),
            "webp" => Ok(Self::Webp),
            other => Err(MockupError::validation(format!(
                "unknown export format \"{other}\" (expected jpg, png or webp)"
            ))),
        }
    }
}

/// Output sizing applied after the full-resolution render.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExportPreset {
    /// Mockup resolution, re-encode only.
    #[default]
    #[serde(rename = "original")]
    Original,
    /// 2000 px wide, aspect preserved (marketplace listing size).
    #[serde(rename = "etsy", alias = "wide2000")]
    Wide2000,
    /// 2048 x 2048 white square, image contained and centered (storefront size).
    #[serde(rename = "shopify", alias = "square2048")]
    Square2048,
    /// `custom_export_width` wide, aspect preserved.
    #[serde(rename = "custom")]
    Custom,
}

impl ExportPreset {
    pub fn parse(s: &str) -> MockupResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "original" => Ok(Self::Original),
            "etsy" | "wide2000" => Ok(Self::Wide2000),
            "shopify" | "square2048" => Ok(Self::Square2048),
            "custom" => Ok(Self::Custom),
            other => Err(MockupError::validation(format!(
                "unknown export preset \"{other}\""
            ))),
        }
    }
}

/// Immutable snapshot of everything a render needs besides geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderSettings {
    /// Design layer opacity, percent.
    pub opacity: u8,
    /// Displacement strength in output pixels.
    pub warp_strength: i32,
    /// Realism overlay strength, percent.
    pub texture_strength: u8,
    pub show_overlay: bool,
    /// Multiplicative tint applied to the mockup background.
    pub mockup_color: RgbColor,
    pub export_format: ExportFormat,
    pub export_preset: ExportPreset,
    pub custom_export_width: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            opacity: 100,
            warp_strength: 12,
            texture_strength: 30,
            show_overlay: true,
            mockup_color: RgbColor::WHITE,
            export_format: ExportFormat::Jpg,
            export_preset: ExportPreset::Original,
            custom_export_width: 2000,
        }
    }
}

impl RenderSettings {
    pub fn validate(&self) -> MockupResult<()> {
        if self.opacity > 100 {
            return Err(MockupError::validation("opacity must be in 0..=100"));
        }
        if self.texture_strength > 100 {
            return Err(MockupError::validation("texture_strength must be in 0..=100"));
        }
        if !WARP_STRENGTH_RANGE.contains(&self.warp_strength) {
            return Err(MockupError::validation(format!(
                "warp_strength must be in {}..={}",
                WARP_STRENGTH_RANGE.start(),
                WARP_STRENGTH_RANGE.end()
            )));
        }
        if self.export_preset == ExportPreset::Custom
            && (self.custom_export_width == 0 || self.custom_export_width > MAX_CUSTOM_EXPORT_WIDTH)
        {
            return Err(MockupError::validation(format!(
                "custom_export_width must be in 1..={MAX_CUSTOM_EXPORT_WIDTH}"
            )));
        }
        Ok(())
    }

    /// Design layer alpha in `0..1`.
    pub fn design_alpha(&self) -> f32 {
        f32::from(self.opacity.min(100)) / 100.0
    }
}

/// Owner of the mutable settings; renders only ever see [`RenderSettings`] snapshots.
#[derive(Clone, Debug, Default)]
pub struct SettingsStore {
    current: RenderSettings,
}

impl SettingsStore {
    pub fn new(settings: RenderSettings) -> MockupResult<Self> {
        settings.validate()?;
        Ok(Self { current: settings })
    }

    pub fn snapshot(&self) -> RenderSettings {
        self.current
    }

    /// Apply an edit; the store is unchanged if the result does not validate.
    pub fn update<F>(&mut self, edit: F) -> MockupResult<RenderSettings>
    where
        F: FnOnce(&mut RenderSettings),
    {
        let mut next = self.current;
        edit(&mut next);
        next.validate()?;
        self.current = next;
        Ok(next)
    }

    /// Load settings from JSON. Missing fields take their defaults.
    pub fn load(path: &Path) -> MockupResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read settings file {}", path.display()))?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> MockupResult<Self> {
        let settings: RenderSettings = serde_json::from_str(text)
            .map_err(|e| MockupError::serde(format!("settings json: {e}")))?;
        Self::new(settings)
    }

    pub fn to_json(&self) -> MockupResult<String> {
        serde_json::to_string_pretty(&self.current)
            .map_err(|e| MockupError::serde(format!("settings json: {e}")))
    }

    pub fn save(&self, path: &Path) -> MockupResult<()> {
        let text = self.to_json()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create settings directory {}", parent.display()))?;
        }
        std::fs::write(path, text)
            .with_context(|| format!("write settings file {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/settings.rs"]
mod tests;
