//! Headless rendering and visual regression testing.
//!
//! Frames are traced on the CPU, so everything here runs without a display
//! or GPU and is deterministic for a given scene, camera and level list.

use glam::Vec3;
use image::{ImageBuffer, Rgba, RgbaImage};

use gridwalk_render::{Camera, FrameRenderer, FrameStats, RenderConfig, ShadingMode};
use gridwalk_voxel::{TraversalConfig, TraversalLevels};
use gridwalk_world::VoxelOracle;

use crate::{Result, TestError, VisualTestConfig};

/// Off-screen renderer producing images for comparison.
pub struct HeadlessRenderer {
    renderer: FrameRenderer,
    levels: TraversalLevels,
}

impl HeadlessRenderer {
    /// Create a renderer with the default traversal levels.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        Self::with_levels(width, height, TraversalConfig::default().build()?)
    }

    /// Create a renderer with explicit traversal levels.
    pub fn with_levels(width: u32, height: u32, levels: TraversalLevels) -> Result<Self> {
        let config = RenderConfig::default()
            .with_size(width, height)
            .with_shading(ShadingMode::FaceAxis);
        Ok(Self {
            renderer: FrameRenderer::new(config)?,
            levels,
        })
    }

    pub fn set_shading(&mut self, shading: ShadingMode) {
        self.renderer.set_shading(shading);
    }

    /// Render `oracle` and return the image with its frame statistics.
    pub fn render<O: VoxelOracle + ?Sized>(
        &self,
        oracle: &O,
        camera: &Camera,
    ) -> Result<(RgbaImage, FrameStats)> {
        let frame = self.renderer.render(camera, oracle, &self.levels);
        let stats = frame.stats;
        let image = ImageBuffer::from_raw(frame.width, frame.height, frame.pixels).ok_or_else(
            || TestError::ImageComparison("Frame buffer does not match its size".to_string()),
        )?;
        Ok((image, stats))
    }

    /// Get the output dimensions.
    pub fn dimensions(&self) -> (u32, u32) {
        let config = self.renderer.config();
        (config.width, config.height)
    }
}

/// Visual regression test runner.
///
/// Compares rendered images against baseline images and reports differences.
/// A missing baseline is written from the current output.
pub struct VisualRegressionTest {
    config: VisualTestConfig,
    renderer: HeadlessRenderer,
}

impl VisualRegressionTest {
    pub fn new(config: VisualTestConfig) -> Result<Self> {
        Self::with_dimensions(config, 128, 128)
    }

    /// Create with custom dimensions.
    pub fn with_dimensions(config: VisualTestConfig, width: u32, height: u32) -> Result<Self> {
        let renderer = HeadlessRenderer::new(width, height)?;
        Ok(Self { config, renderer })
    }

    pub fn renderer_mut(&mut self) -> &mut HeadlessRenderer {
        &mut self.renderer
    }

    /// Render `oracle` and compare against the baseline called `name`.
    pub fn run_test<O: VoxelOracle + ?Sized>(
        &self,
        name: &str,
        oracle: &O,
        camera: &Camera,
    ) -> Result<()> {
        let (image, _) = self.renderer.render(oracle, camera)?;
        self.compare_and_save(name, &image)
    }

    /// Compare an already rendered image against the baseline called `name`.
    pub fn compare_and_save(&self, name: &str, image: &RgbaImage) -> Result<()> {
        std::fs::create_dir_all(&self.config.baseline_dir)?;
        std::fs::create_dir_all(&self.config.output_dir)?;

        let baseline_path = self.config.baseline_dir.join(format!("{name}.png"));
        let output_path = self.config.output_dir.join(format!("{name}.png"));

        image.save(&output_path)?;

        if baseline_path.exists() {
            let baseline = image::open(&baseline_path)?.to_rgba8();

            let diff = compare_images(&baseline, image)?;
            if diff > self.config.threshold {
                let diff_path = self.config.output_dir.join(format!("{name}_diff.png"));
                create_diff_image(&baseline, image).save(&diff_path)?;

                return Err(TestError::ImageComparison(format!(
                    "Image difference {:.4} exceeds threshold {:.4} (see {})",
                    diff,
                    self.config.threshold,
                    diff_path.display()
                )));
            }
        } else {
            image.save(&baseline_path)?;
            tracing::info!("Created new baseline: {}", baseline_path.display());
        }

        Ok(())
    }
}

/// Normalized RGB difference of two images (0.0-1.0).
pub fn compare_images(a: &RgbaImage, b: &RgbaImage) -> Result<f64> {
    if a.dimensions() != b.dimensions() {
        return Err(TestError::ImageComparison(format!(
            "Image dimensions don't match: {:?} vs {:?}",
            a.dimensions(),
            b.dimensions()
        )));
    }

    let total_diff: u64 = a
        .pixels()
        .zip(b.pixels())
        .map(|(pa, pb)| {
            (0..3)
                .map(|c| u64::from(pa[c].abs_diff(pb[c])))
                .sum::<u64>()
        })
        .sum();

    let max_diff = u64::from(a.width()) * u64::from(a.height()) * 3 * 255;
    if max_diff == 0 {
        return Ok(0.0);
    }
    Ok(total_diff as f64 / max_diff as f64)
}

/// Red where the images differ noticeably, the dimmed baseline elsewhere.
pub fn create_diff_image(a: &RgbaImage, b: &RgbaImage) -> RgbaImage {
    let (width, height) = a.dimensions();
    ImageBuffer::from_fn(width, height, |x, y| {
        let pa = a.get_pixel(x, y);
        let pb = b.get_pixel(x, y);
        let max_diff = (0..3).map(|c| pa[c].abs_diff(pb[c])).max().unwrap_or(0);
        if max_diff > 10 {
            Rgba([255, 0, 0, 255])
        } else {
            Rgba([pa[0] / 2, pa[1] / 2, pa[2] / 2, 255])
        }
    })
}

/// Square camera at `distance` from `target`, looking at it from above and
/// to the side.
pub fn create_test_camera(target: Vec3, distance: f32) -> Camera {
    let offset = Vec3::new(1.0, 0.6, 1.0).normalize() * distance;
    Camera::new(target + offset, target, std::f32::consts::FRAC_PI_4, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use gridwalk_voxel::LevelConfig;
    use gridwalk_world::{Empty, Floor, SceneConfig, SdfShell, SdfVolume};

    fn scratch_config(name: &str) -> VisualTestConfig {
        let root: PathBuf = std::env::temp_dir().join(format!(
            "gridwalk-test-{name}-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&root);
        VisualTestConfig {
            threshold: 0.001,
            baseline_dir: root.join("baselines"),
            output_dir: root.join("output"),
        }
    }

    #[test]
    fn headless_render_dimensions() {
        let renderer = HeadlessRenderer::new(32, 16).unwrap();
        let camera = create_test_camera(Vec3::ZERO, 40.0);
        let (image, stats) = renderer.render(&Floor::new(0), &camera).unwrap();
        assert_eq!(image.dimensions(), (32, 16));
        assert_eq!(renderer.dimensions(), (32, 16));
        assert_eq!(stats.rays, 32 * 16);
    }

    #[test]
    fn shell_is_visible_from_outside() {
        let renderer = HeadlessRenderer::new(48, 48).unwrap();
        let shell = SdfShell::default();
        let camera = create_test_camera(shell.center, 80.0);
        let (_, stats) = renderer.render(&SdfVolume(shell), &camera).unwrap();
        assert!(stats.hits > 0);
        assert!(stats.hits < stats.rays);
    }

    #[test]
    fn presets_are_visible_through_default_levels() {
        let (width, height) = (64, 36);
        let hierarchical = HeadlessRenderer::new(width, height).unwrap();
        let flat_levels = TraversalConfig::flat(LevelConfig::new(1, 400)).build().unwrap();
        let flat = HeadlessRenderer::with_levels(width, height, flat_levels).unwrap();

        for name in SceneConfig::PRESETS.into_iter().filter(|&name| name != "empty") {
            let scene = SceneConfig::preset(name).unwrap();
            let oracle = scene.oracle.build().unwrap();
            let camera = Camera::orbit(
                scene.focus,
                scene.orbit_radius,
                scene.eye_height,
                0.0,
                width as f32 / height as f32,
            );

            let (_, stats) = hierarchical.render(&*oracle, &camera).unwrap();
            let (_, reference) = flat.render(&*oracle, &camera).unwrap();
            assert!(
                stats.hit_ratio() > 0.15,
                "{name}: only {} of {} rays hit",
                stats.hits,
                stats.rays
            );
            // Coarse cells that claim content must mostly lead to it
            assert!(
                stats.hits * 2 >= reference.hits,
                "{name}: {} hits against {} for a flat unit-scale trace",
                stats.hits,
                reference.hits
            );
        }
    }

    #[test]
    fn baseline_created_then_matched() {
        let config = scratch_config("baseline");
        let test = VisualRegressionTest::with_dimensions(config.clone(), 24, 24).unwrap();
        let camera = create_test_camera(Vec3::ZERO, 30.0);

        test.run_test("floor", &Floor::new(0), &camera).unwrap();
        assert!(config.baseline_dir.join("floor.png").exists());
        // Rendering is deterministic
        test.run_test("floor", &Floor::new(0), &camera).unwrap();
    }

    #[test]
    fn mismatch_writes_diff_image() {
        let config = scratch_config("mismatch");
        let test = VisualRegressionTest::with_dimensions(config.clone(), 24, 24).unwrap();
        let camera = create_test_camera(Vec3::ZERO, 30.0);

        test.run_test("scene", &Floor::new(0), &camera).unwrap();
        let err = test.run_test("scene", &Empty, &camera).unwrap_err();
        assert!(matches!(err, TestError::ImageComparison(_)));
        assert!(config.output_dir.join("scene_diff.png").exists());
    }

    #[test]
    fn dimension_mismatch_is_an_error() {
        let a = RgbaImage::new(4, 4);
        let b = RgbaImage::new(4, 5);
        assert!(compare_images(&a, &b).is_err());
        assert_eq!(compare_images(&a, &a).unwrap(), 0.0);
    }
}
