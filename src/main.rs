mod cli;
mod color;
mod config;
mod data;
mod error;
mod figure;
mod generator;
mod render;

use anyhow::Result;
use clap::Parser;

use cli::Args;
use config::GeneratorConfig;
use generator::MergedHeatmapGenerator;
use render::PlottersRenderer;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = GeneratorConfig::resolve(&args)?;
    log::info!(
        "Rendering {} layer(s) of [{}] from {} into {}",
        config.num_layers,
        config
            .modules
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        config.input_dir.display(),
        config.output_dir.display()
    );

    let renderer = PlottersRenderer::new(config.width, config.height);
    let generator = MergedHeatmapGenerator::new(config, renderer);
    let summary = generator.run()?;

    log::info!(
        "{} layer(s) written, {} skipped",
        summary.written.len(),
        summary.skipped.len()
    );
    if !summary.skipped.is_empty() {
        log::warn!("Skipped layers: {:?}", summary.skipped);
    }

    println!("\nAll merged heatmaps have been processed.");
    Ok(())
}
