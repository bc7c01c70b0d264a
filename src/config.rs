//! YAML configuration for the raster surface and startup typefaces.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};

/// Top-level configuration, deserialized from YAML.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub surface: SurfaceConfig,
    #[serde(default)]
    pub fonts: FontsConfig,
}

/// Raster surface settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SurfaceConfig {
    /// Surface width in pixels; windowed mode uses the monitor size instead.
    #[serde(default = "SurfaceConfig::default_width")]
    pub width: u32,
    /// Surface height in pixels; windowed mode uses the monitor size instead.
    #[serde(default = "SurfaceConfig::default_height")]
    pub height: u32,
    /// Present to a window or render headless.
    #[serde(default)]
    pub mode: SurfaceMode,
    /// Dump every presented frame to stdout as raw RGBA before showing it.
    #[serde(default)]
    pub capture: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SurfaceMode {
    #[default]
    Window,
    Offscreen,
}

impl SurfaceConfig {
    const fn default_width() -> u32 {
        1920
    }

    const fn default_height() -> u32 {
        1080
    }
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: Self::default_width(),
            height: Self::default_height(),
            mode: SurfaceMode::default(),
            capture: false,
        }
    }
}

/// The three typefaces built at startup.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FontsConfig {
    #[serde(default = "FontsConfig::default_sans")]
    pub sans: FaceSource,
    #[serde(default = "FontsConfig::default_serif")]
    pub serif: FaceSource,
    #[serde(default = "FontsConfig::default_mono")]
    pub mono: FaceSource,
}

impl FontsConfig {
    fn default_sans() -> FaceSource {
        FaceSource::family("DejaVu Sans")
    }

    fn default_serif() -> FaceSource {
        FaceSource::family("DejaVu Serif")
    }

    fn default_mono() -> FaceSource {
        FaceSource::family("DejaVu Sans Mono")
    }
}

impl Default for FontsConfig {
    fn default() -> Self {
        Self {
            sans: Self::default_sans(),
            serif: Self::default_serif(),
            mono: Self::default_mono(),
        }
    }
}

/// Where one typeface comes from: an installed family or an explicit file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FaceSource {
    #[serde(default)]
    pub family: Option<String>,
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl FaceSource {
    fn family(name: &str) -> Self {
        Self {
            family: Some(name.to_string()),
            path: None,
        }
    }

    /// Human-readable label for diagnostics.
    #[must_use]
    pub fn label(&self) -> String {
        match (&self.family, &self.path) {
            (Some(f), _) => f.clone(),
            (None, Some(p)) => p.display().to_string(),
            (None, None) => "<unspecified>".to_string(),
        }
    }
}

/// Load a [`Config`] from a YAML file.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn from_yaml_file(path: &Path) -> Result<Config> {
    let raw = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&raw)?;
    Ok(cfg)
}

impl Config {
    /// Check invariants the type system cannot express.
    ///
    /// # Errors
    /// Returns an error for an empty surface or a typeface with no source.
    pub fn validate(&self) -> Result<()> {
        if self.surface.width == 0 || self.surface.height == 0 {
            return Err(Error::Surface {
                width: self.surface.width,
                height: self.surface.height,
            });
        }
        for face in [&self.fonts.sans, &self.fonts.serif, &self.fonts.mono] {
            if face.family.is_none() && face.path.is_none() {
                return Err(Error::FontNotFound(face.label()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = Config::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.surface.width, 1920);
        assert_eq!(cfg.surface.mode, SurfaceMode::Window);
        assert_eq!(cfg.fonts.sans.label(), "DejaVu Sans");
    }

    #[test]
    fn parses_partial_yaml() {
        let cfg: Config = serde_yaml::from_str(
            "surface:\n  width: 800\n  height: 480\n  mode: offscreen\nfonts:\n  mono:\n    path: /tmp/mono.ttf\n",
        )
        .unwrap();
        cfg.validate().unwrap();
        assert_eq!(cfg.surface.width, 800);
        assert_eq!(cfg.surface.mode, SurfaceMode::Offscreen);
        assert_eq!(cfg.fonts.mono.path.as_deref(), Some(Path::new("/tmp/mono.ttf")));
        assert_eq!(cfg.fonts.sans.family.as_deref(), Some("DejaVu Sans"));
    }
}
