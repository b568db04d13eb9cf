//! Command-line arguments.

use anyhow::{anyhow, bail, Context};
use gridwalk_render::{parse_frame_indices, RenderConfig, ScreenshotConfig, ShadingMode};
use gridwalk_voxel::{parse_levels, LevelConfig, TraversalConfig};
use gridwalk_world::SceneConfig;

/// Everything the viewer needs to render a run.
#[derive(Debug, Clone)]
pub struct ViewerArgs {
    pub help: bool,
    pub scene: SceneConfig,
    pub traversal: TraversalConfig,
    pub render: RenderConfig,
    pub screenshots: ScreenshotConfig,
    /// Frames per full orbit of the camera.
    pub orbit_frames: u64,
}

impl Default for ViewerArgs {
    fn default() -> Self {
        Self {
            help: false,
            scene: SceneConfig::default(),
            traversal: TraversalConfig::default(),
            render: RenderConfig::default().with_shading(ShadingMode::FaceAxis),
            screenshots: ScreenshotConfig::default().with_output("gridwalk_{}.png"),
            orbit_frames: 120,
        }
    }
}

impl ViewerArgs {
    /// Parse from the process arguments.
    pub fn from_env() -> anyhow::Result<Self> {
        let args: Vec<String> = std::env::args().collect();
        Self::parse_args(&args)
    }

    /// Parse from a slice of arguments, the first being the program name.
    pub fn parse_args(args: &[String]) -> anyhow::Result<Self> {
        let mut parsed = Self::default();
        let mut orbit_radius = None;
        let mut flat = false;

        let mut iter = args.iter().skip(1);
        while let Some(arg) = iter.next() {
            let mut value = || {
                iter.next()
                    .map(String::as_str)
                    .ok_or_else(|| anyhow!("{arg} expects a value"))
            };
            match arg.as_str() {
                "-h" | "--help" => parsed.help = true,
                "--scene" => parsed.scene = value()?.parse()?,
                "--levels" => parsed.traversal = TraversalConfig::new(parse_levels(value()?)?),
                "--flat" => flat = true,
                "--width" => parsed.render.width = parse_number(arg, value()?)?,
                "--height" => parsed.render.height = parse_number(arg, value()?)?,
                "--shading" => parsed.render.shading = value()?.parse()?,
                "-o" | "--output" => parsed.screenshots.output_pattern = value()?.to_string(),
                "-f" | "--frames" => parsed.screenshots.frames = parse_frame_indices(value()?)?,
                "--orbit-radius" => orbit_radius = Some(parse_number::<f32>(arg, value()?)?),
                "--orbit-frames" => parsed.orbit_frames = parse_number(arg, value()?)?,
                other => bail!("unknown argument '{other}', see --help"),
            }
        }

        if let Some(radius) = orbit_radius {
            if !(radius.is_finite() && radius > 0.0) {
                bail!("--orbit-radius must be positive, got {radius}");
            }
            parsed.scene = parsed.scene.with_orbit_radius(radius);
        }
        if parsed.orbit_frames == 0 {
            bail!("--orbit-frames must be at least 1");
        }
        if flat {
            // Same total budget as the hierarchy, spent entirely at the finest scale
            let levels = &parsed.traversal.levels;
            let budget: u32 = levels.iter().map(|l| l.max_steps).sum();
            let scale = levels.last().map_or(1, |l| l.scale);
            parsed.traversal = TraversalConfig::flat(LevelConfig::new(scale, budget));
        }

        Ok(parsed)
    }

    /// Camera angle for a frame index.
    pub fn orbit_angle(&self, frame: u64) -> f32 {
        let turn = (frame % self.orbit_frames) as f32 / self.orbit_frames as f32;
        turn * std::f32::consts::TAU
    }
}

fn parse_number<T>(flag: &str, value: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse()
        .with_context(|| format!("invalid value '{value}' for {flag}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> anyhow::Result<ViewerArgs> {
        let args: Vec<String> = std::iter::once("gridwalk-viewer")
            .chain(args.iter().copied())
            .map(String::from)
            .collect();
        ViewerArgs::parse_args(&args)
    }

    #[test]
    fn defaults() {
        let args = parse(&[]).unwrap();
        assert!(!args.help);
        assert_eq!(args.traversal, TraversalConfig::default());
        assert_eq!(args.render.shading, ShadingMode::FaceAxis);
        assert!(args.screenshots.should_capture(0));
    }

    #[test]
    fn full_command_line() {
        let args = parse(&[
            "--scene", "floor", "--levels", "16:10,4:10,1:12", "--width", "320", "--height",
            "200", "--shading", "steps", "-o", "out_{}.png", "-f", "0-2,10",
        ])
        .unwrap();
        assert_eq!(args.scene, SceneConfig::floor());
        assert_eq!(args.traversal.levels.len(), 3);
        assert_eq!((args.render.width, args.render.height), (320, 200));
        assert_eq!(args.render.shading, ShadingMode::TraversalSteps);
        assert_eq!(args.screenshots.last_frame(), Some(10));
        assert_eq!(
            args.screenshots.output_path(2).to_string_lossy(),
            "out_2.png"
        );
    }

    #[test]
    fn flat_keeps_total_budget() {
        let args = parse(&["--flat"]).unwrap();
        assert_eq!(args.traversal.levels, vec![LevelConfig::new(1, 63)]);
    }

    #[test]
    fn orbit_radius_override() {
        let args = parse(&["--scene", "sine", "--orbit-radius", "12.5"]).unwrap();
        assert_eq!(args.scene.orbit_radius, 12.5);
        assert!(parse(&["--orbit-radius", "-1"]).is_err());
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse(&["--width"]).is_err());
        assert!(parse(&["--width", "wide"]).is_err());
        assert!(parse(&["--scene", "castle"]).is_err());
        assert!(parse(&["--bogus"]).is_err());
        assert!(parse(&["--orbit-frames", "0"]).is_err());
    }

    #[test]
    fn orbit_angle_wraps() {
        let args = parse(&["--orbit-frames", "4"]).unwrap();
        assert_eq!(args.orbit_angle(0), 0.0);
        assert_eq!(args.orbit_angle(4), 0.0);
        assert!((args.orbit_angle(1) - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }
}
