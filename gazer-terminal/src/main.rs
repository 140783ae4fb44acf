/// Gazer Terminal - Lizard that watches the mouse
///
/// Renders the lizard (or a glTF model) as ASCII art and turns its head
/// towards the mouse cursor.
/// Controls:
///   - Mouse: Look target
///   - Left drag / WASD / Arrow Keys: Orbit the camera
///   - Scroll / +/-: Zoom
///   - Q/ESC: Quit

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use gazer_core::{gltf_loader, SceneConfig};
use gazer_terminal::TerminalApp;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "gazer-terminal")]
#[command(about = "ASCII lizard that follows the mouse with its head")]
struct Cli {
    /// glTF/GLB model with "Neck" and "Head" nodes; defaults to the built-in lizard
    #[arg(long)]
    model: Option<PathBuf>,

    /// JSON scene config overriding the defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Target frames per second
    #[arg(long, default_value_t = 30)]
    fps: u32,
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they can be redirected away from the screen
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => SceneConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => SceneConfig::default(),
    };

    let scene = match &cli.model {
        Some(path) => {
            let scene = gltf_loader::load_gltf(path, &config)
                .with_context(|| format!("failed to load model {}", path.display()))?;
            tracing::info!(nodes = scene.len(), "model loaded");
            Some(scene)
        }
        None => None,
    };

    let mut app = TerminalApp::new(config, scene, cli.fps)?;
    app.run()?;

    Ok(())
}
