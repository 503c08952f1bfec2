//! Render a JSON scene off-screen and write the result as PNG.
//!
//! Usage: `mapcanvas-export <scene.json> <output.png>`
//!
//! Widget envelopes from the render are printed to stdout as JSON so an
//! input layer can hit-test them. Set `RUST_LOG=debug` for render details.

mod scene;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use mapcanvas_renderer::{MapRenderer, RasterBackend};

use scene::{read_bytes, widget_report, Scene, SceneError};

fn run(scene_path: &Path, output: &Path) -> Result<(), SceneError> {
    let scene = Scene::load(scene_path)?;
    let base_dir = scene_path.parent().unwrap_or_else(|| Path::new("."));

    let backend = match &scene.font {
        Some(font) => RasterBackend::with_font_bytes(&read_bytes(&base_dir.join(font))?)?,
        None => RasterBackend::new(),
    };
    let renderer = MapRenderer::with_config(backend, scene.renderer.clone());

    let mut layers = scene.build_layers(base_dir)?;
    let mut widgets = scene.widgets.clone();
    let png = renderer.render_to_bitmap_stream_with_widgets(
        &scene.viewport,
        &mut layers,
        &mut widgets,
        scene.widget_opacity,
    )?;

    std::fs::write(output, &png).map_err(|source| SceneError::Write {
        path: output.to_path_buf(),
        source,
    })?;
    log::info!("Wrote {} ({} bytes)", output.display(), png.len());

    println!("{}", widget_report(&widgets)?);
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        let program = args.first().map_or("mapcanvas-export", String::as_str);
        eprintln!("usage: {} <scene.json> <output.png>", program);
        return ExitCode::from(2);
    }

    let scene_path = PathBuf::from(&args[1]);
    let output = PathBuf::from(&args[2]);
    match run(&scene_path, &output) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
