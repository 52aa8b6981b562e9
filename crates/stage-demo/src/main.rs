//! stage-demo: load the demo assets, build the scene and write it as SVG.
//!
//! `RUST_LOG` controls verbosity (default `info`).

use stage_assets::DiskSource;
use stage_demo::config::USAGE;
use stage_demo::{CliArgs, DebugHandle, DemoError, pipeline};
use stage_render::SvgSurface;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(err) = run(&args).await {
        log::error!("{err}");
        if matches!(err, DemoError::Usage(_)) {
            eprintln!("{USAGE}");
        }
        std::process::exit(1);
    }
}

async fn run(args: &[String]) -> Result<(), DemoError> {
    let cli = CliArgs::parse(args)?;
    if cli.help {
        println!("{USAGE}");
        return Ok(());
    }
    let config = cli.resolve()?;

    let href_base = std::fs::canonicalize(&config.assets).unwrap_or_else(|_| config.assets.clone());
    let surface = SvgSurface::new(&config.output, config.viewport())
        .with_href_base(href_base.display().to_string());
    let source = DiskSource::new(&config.assets);
    let debug = DebugHandle::new();

    let mut demo = pipeline::run(source, surface, &config, Some(&debug)).await?;
    for _ in 0..config.clicks {
        demo.click_sample()?;
    }

    if let Some(p) = demo.stage().graph().global_position(demo.sample()) {
        log::info!("Sample sprite at ({}, {}) after {} clicks", p.x, p.y, config.clicks);
    }
    let snapshot = debug.snapshot();
    log::debug!(
        "{} nodes, {} frames, cached: {:?}",
        snapshot.nodes,
        snapshot.frames,
        snapshot.cached_paths
    );
    Ok(())
}
