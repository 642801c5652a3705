use serde::{Deserialize, Serialize};

use crate::foundation::error::{EpigramError, EpigramResult};

/// Background enhancement value set applied before text composition.
///
/// Two sets are supported; styles bind one of them. Each carries the
/// contrast/brightness/saturation multipliers, the Gaussian blur radius and
/// the bottom opacity of the gradient overlay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnhanceProfile {
    /// Contrast ×1.2, brightness ×0.85, saturation ×1.3, blur 3 px,
    /// gradient bottom opacity 180.
    #[default]
    Standard,
    /// Contrast ×1.3, brightness ×0.80, saturation ×1.2, blur 4 px,
    /// gradient bottom opacity 200.
    Vivid,
}

impl EnhanceProfile {
    pub(crate) fn contrast(self) -> f32 {
        match self {
            Self::Standard => 1.2,
            Self::Vivid => 1.3,
        }
    }

    pub(crate) fn brightness(self) -> f32 {
        match self {
            Self::Standard => 0.85,
            Self::Vivid => 0.80,
        }
    }

    pub(crate) fn saturation(self) -> f32 {
        match self {
            Self::Standard => 1.3,
            Self::Vivid => 1.2,
        }
    }

    pub(crate) fn blur_radius(self) -> u32 {
        match self {
            Self::Standard => 3,
            Self::Vivid => 4,
        }
    }

    pub(crate) fn gradient_opacity(self) -> u8 {
        match self {
            Self::Standard => 180,
            Self::Vivid => 200,
        }
    }
}

/// Concrete rendering parameters for one quote image.
///
/// Deserialization fills every missing field from the `modern` preset, so a
/// partial explicit config is always usable as given.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StyleConfig {
    /// Initial quote font size in points; the layout engine may shrink it.
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    /// Quote/author fill color as an RGB triple.
    #[serde(default = "default_text_color")]
    pub text_color: [u8; 3],
    /// Alpha of the diagonal shadow copies, 0..=255.
    #[serde(default = "default_shadow_opacity")]
    pub shadow_opacity: u8,
    /// Alpha of the flat black overlay composited onto the background.
    #[serde(default = "default_overlay_opacity")]
    pub overlay_opacity: u8,
    /// Composite a vertical gradient overlay onto the background.
    #[serde(default = "default_gradient_overlay")]
    pub gradient_overlay: bool,
    /// Mask the final image with rounded corners.
    #[serde(default = "default_rounded_corners")]
    pub rounded_corners: bool,
    /// Number of diagonal shadow copies per text block, at least 1.
    #[serde(default = "default_shadow_strength")]
    pub shadow_strength: u32,
    /// Background enhancement value set.
    #[serde(default)]
    pub enhance: EnhanceProfile,
}

fn default_font_size() -> u32 {
    90
}

fn default_text_color() -> [u8; 3] {
    [255, 255, 255]
}

fn default_shadow_opacity() -> u8 {
    180
}

fn default_overlay_opacity() -> u8 {
    120
}

fn default_gradient_overlay() -> bool {
    true
}

fn default_rounded_corners() -> bool {
    true
}

fn default_shadow_strength() -> u32 {
    3
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self::modern()
    }
}

impl StyleConfig {
    /// The `modern` preset: large white type over a gradient-shaded,
    /// rounded-corner background.
    pub fn modern() -> Self {
        Self {
            font_size: 90,
            text_color: [255, 255, 255],
            shadow_opacity: 180,
            overlay_opacity: 120,
            gradient_overlay: true,
            rounded_corners: true,
            shadow_strength: 3,
            enhance: EnhanceProfile::Standard,
        }
    }

    /// The `minimal` preset: no gradient, square corners, light shadow.
    pub fn minimal() -> Self {
        Self {
            font_size: 80,
            text_color: [255, 255, 255],
            shadow_opacity: 120,
            overlay_opacity: 100,
            gradient_overlay: false,
            rounded_corners: false,
            shadow_strength: 3,
            enhance: EnhanceProfile::Standard,
        }
    }

    /// The `bold` preset: warm yellow type, heavy shadow and overlay.
    pub fn bold() -> Self {
        Self {
            font_size: 100,
            text_color: [255, 232, 115],
            shadow_opacity: 200,
            overlay_opacity: 140,
            gradient_overlay: true,
            rounded_corners: false,
            shadow_strength: 3,
            enhance: EnhanceProfile::Vivid,
        }
    }

    /// Look up a preset by name. `None` for unknown names.
    pub fn preset(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "modern" => Some(Self::modern()),
            "minimal" => Some(Self::minimal()),
            "bold" => Some(Self::bold()),
            _ => None,
        }
    }

    pub(crate) fn validate(&self) -> EpigramResult<()> {
        if self.font_size == 0 {
            return Err(EpigramError::layout("style font_size must be > 0"));
        }
        if self.shadow_strength == 0 {
            return Err(EpigramError::layout("style shadow_strength must be >= 1"));
        }
        Ok(())
    }
}

/// Style selector accepted by [`QuoteRequest`](crate::QuoteRequest): either
/// a preset name or an explicit configuration.
///
/// Deserializes untagged, so both `"bold"` and
/// `{"font_size": 64, "gradient_overlay": false}` are valid JSON forms.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleSpec {
    /// A preset name; unknown names resolve to `modern`.
    Named(String),
    /// An explicit configuration, missing fields already filled from
    /// `modern` at deserialization time.
    Explicit(StyleConfig),
}

impl StyleSpec {
    /// Resolve to concrete parameters. An unknown preset name silently
    /// falls back to `modern`.
    pub fn resolve(&self) -> StyleConfig {
        match self {
            Self::Named(name) => StyleConfig::preset(name).unwrap_or_else(StyleConfig::modern),
            Self::Explicit(config) => *config,
        }
    }
}

impl Default for StyleSpec {
    fn default() -> Self {
        Self::Named("modern".to_string())
    }
}

impl From<&str> for StyleSpec {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl From<String> for StyleSpec {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

impl From<StyleConfig> for StyleSpec {
    fn from(config: StyleConfig) -> Self {
        Self::Explicit(config)
    }
}

#[cfg(test)]
#[path = "../tests/unit/style.rs"]
mod tests;
