//! Writes a synthetic input directory for eigen-heatmaps.
//!
//! Usage: generate_sample [OUTPUT_DIR] [NUM_LAYERS]

use std::path::PathBuf;

use serde::Serialize;

const MODULES: [&str; 4] = ["q", "k", "v", "o"];
const COMPONENTS: usize = 64;
const EIGENVECTORS: usize = 8;

#[derive(Serialize)]
struct Row {
    component_idx: usize,
    eigenvector_idx: usize,
    value: f64,
}

/// Minimal deterministic PRNG (xoshiro256**), seeded through an LCG so the
/// same seed always yields the same sample files.
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    /// Uniform in [-1, 1).
    fn next_signed(&mut self) -> f64 {
        let unit = (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64;
        unit * 2.0 - 1.0
    }
}

/// Eigenvector `e` oscillates over components with frequency growing in `e`,
/// damped with depth so later layers look different from earlier ones.
fn component_value(layer: usize, module: usize, component: usize, eigenvector: usize) -> f64 {
    let phase = module as f64 * std::f64::consts::FRAC_PI_4;
    let freq = (eigenvector + 1) as f64 * std::f64::consts::PI / COMPONENTS as f64;
    let damping = (-(layer as f64) / 20.0).exp();
    (freq * component as f64 + phase).sin() * damping / (eigenvector + 1) as f64
}

fn main() {
    let mut args = std::env::args().skip(1);
    let output_dir = PathBuf::from(args.next().unwrap_or_else(|| "sample_csvs".to_string()));
    let num_layers: usize = args
        .next()
        .map(|n| n.parse().expect("NUM_LAYERS must be a non-negative integer"))
        .unwrap_or(2);

    std::fs::create_dir_all(&output_dir).expect("Failed to create output directory");
    let mut rng = SimpleRng::new(42);

    for layer in 0..num_layers {
        for (m, module) in MODULES.iter().enumerate() {
            let path = output_dir.join(format!("layer_{layer}_{module}.csv"));
            let mut writer = csv::Writer::from_path(&path).expect("Failed to create CSV file");
            for component_idx in 0..COMPONENTS {
                for eigenvector_idx in 0..EIGENVECTORS {
                    let value = component_value(layer, m, component_idx, eigenvector_idx)
                        + 0.02 * rng.next_signed();
                    writer
                        .serialize(Row {
                            component_idx,
                            eigenvector_idx,
                            value,
                        })
                        .expect("Failed to write row");
                }
            }
            writer.flush().expect("Failed to flush CSV file");
        }
    }

    println!(
        "Wrote {} layer(s) × {} modules ({COMPONENTS}×{EIGENVECTORS} each) to {}",
        num_layers,
        MODULES.len(),
        output_dir.display()
    );
}
