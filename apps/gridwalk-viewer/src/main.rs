//! gridwalk viewer
//!
//! Traces a procedural voxel scene from a camera orbiting its focus point and
//! writes the selected frames as images. Every frame is rendered on the CPU
//! with hierarchical traversal, one ray per pixel.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p gridwalk-viewer --release -- [OPTIONS]
//! ```
//!
//! ## Examples
//!
//! ```bash
//! # Frame 0 of the default shell scene
//! cargo run -p gridwalk-viewer --release
//!
//! # Quarter orbit around the sine terrain, step heatmap
//! cargo run -p gridwalk-viewer --release -- --scene sine --shading steps -f 0-30 -o sine_{}.png
//!
//! # Same budget without the hierarchy, for comparison
//! cargo run -p gridwalk-viewer --release -- --scene sine --flat --shading outcome
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Set log level (e.g., info, debug, trace)

mod args;

use std::time::Instant;

use gridwalk_render::{save_frame, Camera, FrameRenderer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::args::ViewerArgs;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = ViewerArgs::from_env()?;
    if args.help {
        print_help();
        return Ok(());
    }

    let oracle = args.scene.oracle.build()?;
    let levels = args.traversal.clone().build()?;
    let renderer = FrameRenderer::new(args.render.clone())?;
    let aspect = args.render.aspect();

    info!(
        scene = args.scene.oracle.name(),
        levels = ?levels.levels(),
        width = args.render.width,
        height = args.render.height,
        shading = %args.render.shading,
        "Starting gridwalk viewer"
    );

    for &frame_index in &args.screenshots.frames {
        let angle = args.orbit_angle(frame_index);
        let camera = Camera::orbit(
            args.scene.focus,
            args.scene.orbit_radius,
            args.scene.eye_height,
            angle,
            aspect,
        );
        camera.validate()?;

        let start = Instant::now();
        let frame = renderer.render(&camera, &*oracle, &levels);
        info!(
            "Frame {frame_index}: {:.1} ms, {:.1}% hits, {:.1} mean steps",
            start.elapsed().as_secs_f64() * 1000.0,
            frame.stats.hit_ratio() * 100.0,
            frame.stats.mean_steps()
        );

        save_frame(&frame, args.screenshots.output_path(frame_index))?;
    }

    Ok(())
}

fn print_help() {
    eprintln!(
        "gridwalk viewer: hierarchical voxel ray traversal on the CPU

USAGE:
    cargo run -p gridwalk-viewer --release -- [OPTIONS]

SCENE OPTIONS:
    --scene <NAME>          empty, floor, shell, sine or lattice (default: shell)
    --orbit-radius <R>      Horizontal camera distance from the scene focus
    --orbit-frames <N>      Frames per full camera orbit (default: 120)

TRAVERSAL OPTIONS:
    --levels <LIST>         Scale levels as scale:max_steps, coarsest first
                            Default: 64:20,8:20,1:23
    --flat                  Trace only the finest scale with the summed budget

OUTPUT OPTIONS:
    --width <N>             Image width in pixels (default: 640)
    --height <N>            Image height in pixels (default: 360)
    --shading <MODE>        position, face-axis, steps or outcome
                            Default: face-axis
    -o, --output <PATTERN>  Output path pattern (use {{}} for frame number)
                            Default: gridwalk_{{}}.png
    -f, --frames <FRAMES>   Frame indices to render
                            Examples: \"0\" \"0,10,20\" \"0-5\" \"0,5-10,20\"
                            Default: 0

OTHER:
    -h, --help              Print this help message

ENVIRONMENT VARIABLES:
    RUST_LOG                Set log level (e.g., info, debug, trace)"
    );
}
