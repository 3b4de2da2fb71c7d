//! Configuration loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use irtify_core::dif::DEFAULT_SIGNIFICANCE_LEVEL;
use irtify_core::irt::ThetaGrid;

/// Top-level irtify configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrtifyConfig {
    /// DIF flag threshold: items with `p < significance_level` are flagged.
    #[serde(default = "default_significance_level")]
    pub significance_level: f64,
    /// Lower end of the ability grid used to sample ICCs.
    #[serde(default = "default_theta_min")]
    pub theta_min: f64,
    /// Upper end of the ability grid.
    #[serde(default = "default_theta_max")]
    pub theta_max: f64,
    /// Number of grid points, endpoints included.
    #[serde(default = "default_icc_points")]
    pub icc_points: usize,
    /// Output directory for reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Default report formats, comma-separated.
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_significance_level() -> f64 {
    DEFAULT_SIGNIFICANCE_LEVEL
}
fn default_theta_min() -> f64 {
    -3.0
}
fn default_theta_max() -> f64 {
    3.0
}
fn default_icc_points() -> usize {
    100
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./irtify-results")
}
fn default_format() -> String {
    "json".to_string()
}

impl Default for IrtifyConfig {
    fn default() -> Self {
        Self {
            significance_level: default_significance_level(),
            theta_min: default_theta_min(),
            theta_max: default_theta_max(),
            icc_points: default_icc_points(),
            output_dir: default_output_dir(),
            format: default_format(),
        }
    }
}

impl IrtifyConfig {
    /// Reject settings the estimators cannot work with.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.significance_level > 0.0 && self.significance_level < 1.0,
            "significance_level must be between 0 and 1 (exclusive), got {}",
            self.significance_level
        );
        anyhow::ensure!(
            self.theta_min < self.theta_max,
            "theta_min ({}) must be less than theta_max ({})",
            self.theta_min,
            self.theta_max
        );
        anyhow::ensure!(
            self.icc_points >= 2,
            "icc_points must be at least 2, got {}",
            self.icc_points
        );
        Ok(())
    }

    pub fn theta_grid(&self) -> ThetaGrid {
        ThetaGrid {
            min: self.theta_min,
            max: self.theta_max,
            points: self.icc_points,
        }
    }
}

/// Load configuration from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `irtify.toml` in the current directory
/// 2. `~/.config/irtify/config.toml`
///
/// Environment variable overrides: `IRTIFY_SIGNIFICANCE_LEVEL`, `IRTIFY_OUTPUT_DIR`.
pub fn load_config_from(path: Option<&Path>) -> Result<IrtifyConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("irtify.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<IrtifyConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => IrtifyConfig::default(),
    };

    apply_env_overrides(&mut config)?;
    config.validate()?;
    Ok(config)
}

fn apply_env_overrides(config: &mut IrtifyConfig) -> Result<()> {
    if let Ok(level) = std::env::var("IRTIFY_SIGNIFICANCE_LEVEL") {
        config.significance_level = level
            .trim()
            .parse()
            .with_context(|| format!("invalid IRTIFY_SIGNIFICANCE_LEVEL: '{level}'"))?;
    }
    if let Ok(dir) = std::env::var("IRTIFY_OUTPUT_DIR") {
        config.output_dir = PathBuf::from(dir);
    }
    Ok(())
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("irtify"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = IrtifyConfig::default();
        assert_eq!(config.significance_level, 0.05);
        assert_eq!(config.icc_points, 100);
        assert_eq!(config.format, "json");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_partial_config() {
        let config: IrtifyConfig = toml::from_str(
            r#"
significance_level = 0.01
theta_min = -4.0
"#,
        )
        .unwrap();
        assert_eq!(config.significance_level, 0.01);
        assert_eq!(config.theta_min, -4.0);
        assert_eq!(config.theta_max, 3.0);
        assert_eq!(config.output_dir, PathBuf::from("./irtify-results"));
    }

    #[test]
    fn theta_grid_from_config() {
        let grid = IrtifyConfig::default().theta_grid();
        assert_eq!(grid, ThetaGrid::default());
    }

    #[test]
    fn validation_rejects_bad_values() {
        let bad_alpha = IrtifyConfig {
            significance_level: 1.0,
            ..Default::default()
        };
        assert!(bad_alpha.validate().is_err());

        let bad_range = IrtifyConfig {
            theta_min: 2.0,
            theta_max: 2.0,
            ..Default::default()
        };
        assert!(bad_range.validate().is_err());

        let bad_points = IrtifyConfig {
            icc_points: 1,
            ..Default::default()
        };
        assert!(bad_points.validate().is_err());
    }

    #[test]
    fn load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("irtify.toml");
        std::fs::write(&path, "icc_points = 25\nformat = \"html\"\n").unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.icc_points, 25);
        assert_eq!(config.format, "html");
    }

    #[test]
    fn load_missing_explicit_path_fails() {
        let err = load_config_from(Some(Path::new("/nonexistent/irtify.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn invalid_file_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("irtify.toml");
        std::fs::write(&path, "significance_level = 0.0\n").unwrap();
        assert!(load_config_from(Some(&path)).is_err());
    }
}
