use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::{ImageFormat, RgbImage};

use crate::config::GeneratorConfig;
use crate::data::loader::{load_matrix, module_csv_path};
use crate::error::ModuleError;
use crate::figure::{LayerFigure, Panel, PanelContent};
use crate::render::FigureRenderer;

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerOutcome {
    Written(PathBuf),
    Skipped,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub written: Vec<PathBuf>,
    pub skipped: Vec<usize>,
}

/// `<output_dir>/layer_<layer>_merged_heatmap.png`
pub fn merged_heatmap_path(output_dir: &Path, layer: usize) -> PathBuf {
    output_dir.join(format!("layer_{layer}_merged_heatmap.png"))
}

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// Builds and saves one composite image per layer.
///
/// A layer is saved only when every module loaded. Missing or malformed
/// module files disable their panel and skip the save, but never stop the
/// run; only output-directory I/O is fatal.
pub struct MergedHeatmapGenerator<R> {
    config: GeneratorConfig,
    renderer: R,
}

impl<R: FigureRenderer> MergedHeatmapGenerator<R> {
    pub fn new(config: GeneratorConfig, renderer: R) -> Self {
        Self { config, renderer }
    }

    /// Process every layer in order.
    pub fn run(&self) -> Result<RunSummary> {
        self.prepare_output_dir()?;

        let mut summary = RunSummary::default();
        for layer in 0..self.config.num_layers {
            match self.generate(layer)? {
                LayerOutcome::Written(path) => summary.written.push(path),
                LayerOutcome::Skipped => summary.skipped.push(layer),
            }
        }
        Ok(summary)
    }

    /// Create the output directory if needed. Safe to call repeatedly.
    pub fn prepare_output_dir(&self) -> Result<()> {
        let dir = &self.config.output_dir;
        if !dir.is_dir() {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating output directory {}", dir.display()))?;
            log::info!("Created directory: {}", dir.display());
        }
        Ok(())
    }

    /// Load every module of `layer` and, if all succeeded, render and save it.
    /// The figure and pixel buffer are dropped before returning.
    pub fn generate(&self, layer: usize) -> Result<LayerOutcome> {
        log::info!("Processing layer {layer}");
        let figure = self.build_figure(layer);

        if !figure.is_complete() {
            let failed: Vec<String> = figure
                .unavailable_modules()
                .iter()
                .map(|m| m.to_string())
                .collect();
            log::warn!(
                "Skipped saving merged heatmap for Layer {layer} due to missing/error files ({})",
                failed.join(", ")
            );
            return Ok(LayerOutcome::Skipped);
        }

        let image = match self.renderer.render(&figure) {
            Ok(image) => image,
            Err(e) => {
                log::error!("Skipped saving merged heatmap for Layer {layer}: {e:#}");
                return Ok(LayerOutcome::Skipped);
            }
        };

        let path = merged_heatmap_path(&self.config.output_dir, layer);
        write_png_atomically(&image, &path)?;
        log::info!(
            "Successfully generated merged heatmap for Layer {layer}: {}",
            path.display()
        );
        Ok(LayerOutcome::Written(path))
    }

    /// One panel per configured module, each file read exactly once.
    pub fn build_figure(&self, layer: usize) -> LayerFigure {
        let panels = self
            .config
            .modules
            .iter()
            .map(|module| {
                let path = module_csv_path(&self.config.input_dir, layer, module);
                let content = match load_matrix(&path) {
                    Ok(matrix) => PanelContent::Heatmap(matrix),
                    Err(err) => {
                        match &err {
                            ModuleError::MissingFile { .. } => log::warn!(
                                "File not found, cannot generate subplot for {}",
                                path.display()
                            ),
                            _ => log::error!("Error processing {}: {err}", path.display()),
                        }
                        PanelContent::Unavailable(err.reason())
                    }
                };
                Panel::new(module.clone(), content)
            })
            .collect();
        LayerFigure::new(layer, panels)
    }
}

/// Encode to a hidden sibling file, then rename over `path`, so readers
/// never see a half-written PNG.
fn write_png_atomically(image: &RgbImage, path: &Path) -> Result<()> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .context("output path has no file name")?;
    let tmp = path.with_file_name(format!(".{file_name}.tmp"));

    if let Err(e) = image.save_with_format(&tmp, ImageFormat::Png) {
        let _ = fs::remove_file(&tmp);
        return Err(e).with_context(|| format!("writing {}", tmp.display()));
    }
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e).with_context(|| format!("moving {} into place", path.display()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::ModuleId;
    use crate::figure::UnavailableReason;
    use anyhow::bail;
    use image::Rgb;
    use std::cell::Cell;

    const GOOD_CSV: &str = "component_idx,eigenvector_idx,value\n\
                            0,0,0.1\n0,1,0.2\n1,0,0.3\n1,1,0.4\n";

    /// Paints the layer index into a tiny image so outputs differ per layer.
    #[derive(Default)]
    struct StubRenderer {
        calls: Cell<usize>,
    }

    impl FigureRenderer for StubRenderer {
        fn render(&self, figure: &LayerFigure) -> Result<RgbImage> {
            self.calls.set(self.calls.get() + 1);
            let shade = (figure.layer() * 10) as u8;
            Ok(RgbImage::from_pixel(8, 6, Rgb([shade, 0, 255 - shade])))
        }
    }

    struct FailingRenderer;

    impl FigureRenderer for FailingRenderer {
        fn render(&self, _figure: &LayerFigure) -> Result<RgbImage> {
            bail!("no fonts available")
        }
    }

    fn write_layer(input: &Path, layer: usize, skip: &[&str]) {
        for module in ["q", "k", "v", "o"] {
            if skip.contains(&module) {
                continue;
            }
            let path = input.join(format!("layer_{layer}_{module}.csv"));
            fs::write(path, GOOD_CSV).unwrap();
        }
    }

    fn config(input: &Path, output: &Path, num_layers: usize) -> GeneratorConfig {
        GeneratorConfig {
            num_layers,
            input_dir: input.to_path_buf(),
            output_dir: output.to_path_buf(),
            ..GeneratorConfig::default()
        }
    }

    fn listing(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn complete_layers_each_produce_one_image() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write_layer(input.path(), 0, &[]);
        write_layer(input.path(), 1, &[]);

        let generator =
            MergedHeatmapGenerator::new(config(input.path(), output.path(), 2), StubRenderer::default());
        let summary = generator.run().unwrap();

        assert_eq!(
            summary.written,
            vec![
                output.path().join("layer_0_merged_heatmap.png"),
                output.path().join("layer_1_merged_heatmap.png"),
            ]
        );
        assert!(summary.skipped.is_empty());
        assert_eq!(
            listing(output.path()),
            ["layer_0_merged_heatmap.png", "layer_1_merged_heatmap.png"]
        );

        let saved = image::open(&summary.written[1]).unwrap().to_rgb8();
        assert_eq!(saved.dimensions(), (8, 6));
        assert_eq!(saved.get_pixel(0, 0), &Rgb([10, 0, 245]));
    }

    #[test]
    fn layer_with_missing_module_is_skipped_without_affecting_others() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write_layer(input.path(), 0, &[]);
        write_layer(input.path(), 1, &[]);
        write_layer(input.path(), 2, &["k"]);

        let renderer = StubRenderer::default();
        let generator = MergedHeatmapGenerator::new(config(input.path(), output.path(), 3), renderer);
        let summary = generator.run().unwrap();

        assert_eq!(summary.skipped, vec![2]);
        assert_eq!(summary.written.len(), 2);
        assert!(!output.path().join("layer_2_merged_heatmap.png").exists());
        assert_eq!(generator.renderer.calls.get(), 2);

        let figure = generator.build_figure(2);
        assert_eq!(figure.unavailable_modules(), vec![&ModuleId::new("k")]);
        assert_eq!(figure.panels()[1].title(), "Module: K - FILE NOT FOUND");
        // Remaining panels still loaded.
        assert!(figure.panels()[0].is_available());
        assert!(figure.panels()[3].is_available());
    }

    #[test]
    fn malformed_module_marks_error_panel() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write_layer(input.path(), 0, &["v"]);
        fs::write(
            input.path().join("layer_0_v.csv"),
            "component_idx,eigenvector_idx,value\n3,5,0.1\n3,5,0.2\n",
        )
        .unwrap();

        let generator =
            MergedHeatmapGenerator::new(config(input.path(), output.path(), 1), StubRenderer::default());
        let figure = generator.build_figure(0);
        assert_eq!(
            figure.panels()[2].content,
            PanelContent::Unavailable(UnavailableReason::Error)
        );
        assert_eq!(figure.panels()[2].title(), "Module: V - ERROR");

        assert_eq!(generator.generate(0).unwrap(), LayerOutcome::Skipped);
        assert!(listing(output.path()).is_empty());
    }

    #[test]
    fn empty_input_directory_completes_with_no_images() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();

        let generator =
            MergedHeatmapGenerator::new(config(input.path(), output.path(), 1), StubRenderer::default());
        let summary = generator.run().unwrap();

        assert!(summary.written.is_empty());
        assert_eq!(summary.skipped, vec![0]);
        assert!(listing(output.path()).is_empty());

        let figure = generator.build_figure(0);
        assert_eq!(figure.panels().len(), 4);
        assert!(figure
            .panels()
            .iter()
            .all(|p| p.content == PanelContent::Unavailable(UnavailableReason::MissingFile)));
    }

    #[test]
    fn rerun_replaces_output_with_identical_bytes() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write_layer(input.path(), 0, &[]);
        let generator =
            MergedHeatmapGenerator::new(config(input.path(), output.path(), 1), StubRenderer::default());

        let first = generator.run().unwrap();
        let before = fs::read(&first.written[0]).unwrap();
        let second = generator.run().unwrap();
        let after = fs::read(&second.written[0]).unwrap();

        assert_eq!(before, after);
        // No temporary files left behind.
        assert_eq!(listing(output.path()), ["layer_0_merged_heatmap.png"]);
    }

    #[test]
    fn output_directory_is_created_when_absent() {
        let input = tempfile::tempdir().unwrap();
        let root = tempfile::tempdir().unwrap();
        let output = root.path().join("nested").join("heatmaps");
        write_layer(input.path(), 0, &[]);

        let generator =
            MergedHeatmapGenerator::new(config(input.path(), &output, 1), StubRenderer::default());
        generator.run().unwrap();
        generator.prepare_output_dir().unwrap();

        assert!(output.join("layer_0_merged_heatmap.png").is_file());
    }

    #[test]
    fn unusable_output_directory_is_fatal() {
        let input = tempfile::tempdir().unwrap();
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("not_a_dir");
        fs::write(&blocker, b"").unwrap();

        let generator =
            MergedHeatmapGenerator::new(config(input.path(), &blocker, 1), StubRenderer::default());
        let err = generator.run().unwrap_err();
        assert!(format!("{err:#}").contains("creating output directory"));
    }

    #[test]
    fn render_failure_skips_layer() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write_layer(input.path(), 0, &[]);

        let generator =
            MergedHeatmapGenerator::new(config(input.path(), output.path(), 1), FailingRenderer);
        let summary = generator.run().unwrap();

        assert_eq!(summary.skipped, vec![0]);
        assert!(listing(output.path()).is_empty());
    }

    #[test]
    fn zero_layers_does_nothing_but_prepare_output() {
        let input = tempfile::tempdir().unwrap();
        let root = tempfile::tempdir().unwrap();
        let output = root.path().join("out");

        let generator =
            MergedHeatmapGenerator::new(config(input.path(), &output, 0), StubRenderer::default());
        assert_eq!(generator.run().unwrap(), RunSummary::default());
        assert!(output.is_dir());
    }
}
