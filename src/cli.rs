use std::path::PathBuf;

use clap::Parser;

/// Render one merged Q/K/V/O eigenvector heatmap per layer.
///
/// Flags override values from `--config`, which override built-in defaults.
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version, about)]
pub struct Args {
    /// Path to a JSON config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Number of layers to process (0..N)
    #[arg(long)]
    pub num_layers: Option<usize>,

    /// Comma-separated module ids in panel order, e.g. q,k,v,o
    #[arg(long, value_delimiter = ',')]
    pub modules: Option<Vec<String>>,

    /// Directory holding layer_<L>_<module>.csv files
    #[arg(long, value_name = "DIR")]
    pub input_dir: Option<PathBuf>,

    /// Directory receiving layer_<L>_merged_heatmap.png files
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Canvas width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Canvas height in pixels
    #[arg(long)]
    pub height: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_flags_leaves_everything_unset() {
        let args = Args::try_parse_from(["eigen-heatmaps"]).unwrap();
        assert!(args.config.is_none());
        assert!(args.num_layers.is_none());
        assert!(args.modules.is_none());
    }

    #[test]
    fn modules_split_on_commas() {
        let args = Args::try_parse_from([
            "eigen-heatmaps",
            "--modules",
            "q,k,v",
            "--num-layers",
            "3",
            "--output-dir",
            "out",
        ])
        .unwrap();
        assert_eq!(
            args.modules,
            Some(vec!["q".to_string(), "k".to_string(), "v".to_string()])
        );
        assert_eq!(args.num_layers, Some(3));
        assert_eq!(args.output_dir, Some(PathBuf::from("out")));
    }
}
