//! Demo configuration: TOML file plus command-line overrides.

use crate::error::DemoError;
use serde::Deserialize;
use stage_core::{Color, Viewport};
use std::path::{Path, PathBuf};

/// Settings for one demo run. Every field has a default, so a config file
/// only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemoConfig {
    /// Asset directory (the "public" folder).
    pub assets: PathBuf,
    /// Manifest path, relative to `assets`.
    pub manifest: String,
    /// SVG file the scene is written to.
    pub output: PathBuf,
    pub width: f32,
    pub height: f32,
    pub background: Color,
    pub background_alpha: f32,
    /// Pointer-downs to deliver to the sample sprite after attaching.
    pub clicks: usize,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            assets: PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/public")),
            manifest: "manifest.json".into(),
            output: PathBuf::from("scene.svg"),
            width: 800.0,
            height: 600.0,
            background: Color::from_rgb_u32(0xffea00),
            background_alpha: 0.5,
            clicks: 0,
        }
    }
}

impl DemoConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DemoError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| DemoError::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&text).map_err(|reason| DemoError::Config {
            path: path.to_path_buf(),
            reason,
        })
    }

    pub fn from_toml(text: &str) -> Result<Self, String> {
        let config: DemoConfig = toml::from_str(text).map_err(|e| e.to_string())?;
        if config.width <= 0.0 || config.height <= 0.0 {
            return Err(format!(
                "viewport must be positive, got {}x{}",
                config.width, config.height
            ));
        }
        Ok(config)
    }

    pub fn viewport(&self) -> Viewport {
        Viewport {
            width: self.width,
            height: self.height,
        }
    }

    /// Clear colour with `background_alpha` applied.
    pub fn background_color(&self) -> Color {
        self.background.with_alpha(self.background_alpha)
    }
}

// ─── Command line ────────────────────────────────────────────────────────

pub const USAGE: &str = "\
Usage: stage-demo [options]

Options:
  --config <file>   read settings from a TOML file
  --assets <dir>    asset directory (default: the bundled public/ folder)
  --out <file>      SVG output path (default: scene.svg)
  --clicks <n>      pointer-downs to deliver to the sample sprite
  -h, --help        print this help";

/// Flags given on the command line. Anything set here wins over the file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliArgs {
    pub config: Option<PathBuf>,
    pub assets: Option<PathBuf>,
    pub out: Option<PathBuf>,
    pub clicks: Option<usize>,
    pub help: bool,
}

impl CliArgs {
    /// Parse arguments, excluding the program name.
    pub fn parse(args: &[String]) -> Result<Self, DemoError> {
        let mut cli = CliArgs::default();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            let mut value = |flag: &str| {
                iter.next()
                    .cloned()
                    .ok_or_else(|| DemoError::Usage(format!("{flag} needs a value")))
            };
            match arg.as_str() {
                "--config" => cli.config = Some(value("--config")?.into()),
                "--assets" => cli.assets = Some(value("--assets")?.into()),
                "--out" => cli.out = Some(value("--out")?.into()),
                "--clicks" => {
                    let raw = value("--clicks")?;
                    let n = raw
                        .parse()
                        .map_err(|_| DemoError::Usage(format!("--clicks expects a count, got `{raw}`")))?;
                    cli.clicks = Some(n);
                }
                "-h" | "--help" => cli.help = true,
                other => return Err(DemoError::Usage(format!("unknown argument `{other}`"))),
            }
        }
        Ok(cli)
    }

    /// Resolve the final configuration: file (if any), then flags.
    pub fn resolve(&self) -> Result<DemoConfig, DemoError> {
        let mut config = match &self.config {
            Some(path) => DemoConfig::load(path)?,
            None => DemoConfig::default(),
        };
        if let Some(assets) = &self.assets {
            config.assets = assets.clone();
        }
        if let Some(out) = &self.out {
            config.output = out.clone();
        }
        if let Some(clicks) = self.clicks {
            config.clicks = clicks;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config = DemoConfig::from_toml("width = 1024\nbackground = \"#102030\"").unwrap();
        assert_eq!(config.width, 1024.0);
        assert_eq!(config.height, 600.0);
        assert_eq!(config.background, Color::from_rgb_u32(0x102030));
        assert_eq!(config.manifest, "manifest.json");
    }

    #[test]
    fn packed_background_and_alpha() {
        let config = DemoConfig::from_toml("background = 0xffea00\nbackground_alpha = 0.5").unwrap();
        let bg = config.background_color();
        assert_eq!(bg.to_rgba8(), [255, 234, 0, 128]);
    }

    #[test]
    fn rejects_unknown_keys_and_bad_viewport() {
        assert!(DemoConfig::from_toml("colour = 1").is_err());
        assert!(DemoConfig::from_toml("width = 0").is_err());
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = DemoConfig::load("/no/such/stage.toml").unwrap_err();
        assert!(matches!(err, DemoError::Config { .. }));
    }

    #[test]
    fn flags_override_defaults() {
        let cli = CliArgs::parse(&args(&["--out", "x.svg", "--clicks", "3"])).unwrap();
        assert_eq!(
            cli,
            CliArgs {
                out: Some("x.svg".into()),
                clicks: Some(3),
                ..CliArgs::default()
            }
        );
        let config = cli.resolve().unwrap();
        assert_eq!(config.output, PathBuf::from("x.svg"));
        assert_eq!(config.clicks, 3);
        assert_eq!(config.viewport(), Viewport::default());
    }

    #[test]
    fn bad_flags_are_usage_errors() {
        assert!(matches!(
            CliArgs::parse(&args(&["--clicks", "many"])),
            Err(DemoError::Usage(_))
        ));
        assert!(matches!(
            CliArgs::parse(&args(&["--out"])),
            Err(DemoError::Usage(_))
        ));
        assert!(matches!(
            CliArgs::parse(&args(&["--fast"])),
            Err(DemoError::Usage(_))
        ));
        assert!(CliArgs::parse(&args(&["-h"])).unwrap().help);
    }
}
