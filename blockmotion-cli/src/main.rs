use blockmotion::image::io::{load_gray_frame, save_gray_frame};
use blockmotion::{
    BlockMatcher, Connectivity, DenseInterpolation, Frame, MatchConfig, Metric, MotionCompensator,
    RegionMap, RegionMetric, VectorField,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "Blockmotion CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
enum ModeConfig {
    #[default]
    Lattice,
    Dense,
    Arbitrary,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum MetricConfig {
    Sad,
    Mad,
    Zncc,
    MadCentered,
}

impl From<MetricConfig> for Metric {
    fn from(value: MetricConfig) -> Self {
        match value {
            MetricConfig::Sad => Metric::Sad,
            MetricConfig::Mad => Metric::Mad,
            MetricConfig::Zncc => Metric::Zncc,
            MetricConfig::MadCentered => Metric::MadCentered,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum RegionMetricConfig {
    Mad,
    Zncc,
    MadNearestIntensity,
    ZnccNearestIntensity,
}

impl From<RegionMetricConfig> for RegionMetric {
    fn from(value: RegionMetricConfig) -> Self {
        match value {
            RegionMetricConfig::Mad => RegionMetric::Mad,
            RegionMetricConfig::Zncc => RegionMetric::Zncc,
            RegionMetricConfig::MadNearestIntensity => RegionMetric::MadNearestIntensity,
            RegionMetricConfig::ZnccNearestIntensity => RegionMetric::ZnccNearestIntensity,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ConnectivityConfig {
    Four,
    Eight,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum DenseInterpolationConfig {
    Replicate,
    Bilinear,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct MatchConfigJson {
    metric: MetricConfig,
    region_metric: RegionMetricConfig,
    search_range: usize,
    flat_variance_threshold: f64,
    connectivity: ConnectivityConfig,
    dense_interpolation: DenseInterpolationConfig,
    use_quantized: bool,
    interpolate_flat_regions: bool,
    parallel: bool,
}

impl Default for MatchConfigJson {
    fn default() -> Self {
        let cfg = MatchConfig::default();
        Self {
            metric: MetricConfig::Mad,
            region_metric: RegionMetricConfig::Mad,
            search_range: cfg.search_range,
            flat_variance_threshold: cfg.flat_variance_threshold,
            connectivity: ConnectivityConfig::Four,
            dense_interpolation: DenseInterpolationConfig::Bilinear,
            use_quantized: cfg.use_quantized,
            interpolate_flat_regions: cfg.interpolate_flat_regions,
            parallel: cfg.parallel,
        }
    }
}

impl From<MatchConfigJson> for MatchConfig {
    fn from(value: MatchConfigJson) -> Self {
        Self {
            metric: value.metric.into(),
            region_metric: value.region_metric.into(),
            search_range: value.search_range,
            flat_variance_threshold: value.flat_variance_threshold,
            connectivity: match value.connectivity {
                ConnectivityConfig::Four => Connectivity::Four,
                ConnectivityConfig::Eight => Connectivity::Eight,
            },
            dense_interpolation: match value.dense_interpolation {
                DenseInterpolationConfig::Replicate => DenseInterpolation::Replicate,
                DenseInterpolationConfig::Bilinear => DenseInterpolation::Bilinear,
            },
            use_quantized: value.use_quantized,
            interpolate_flat_regions: value.interpolate_flat_regions,
            parallel: value.parallel,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    prev_path: String,
    next_path: String,
    mode: ModeConfig,
    block_size: usize,
    region_prev_path: Option<String>,
    region_next_path: Option<String>,
    compensated_path: Option<String>,
    estimate_factor: Option<f64>,
    output_path: Option<String>,
    #[serde(rename = "match")]
    match_cfg: MatchConfigJson,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prev_path: String::new(),
            next_path: String::new(),
            mode: ModeConfig::Lattice,
            block_size: 8,
            region_prev_path: None,
            region_next_path: None,
            compensated_path: None,
            estimate_factor: None,
            output_path: None,
            match_cfg: MatchConfigJson::default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct FieldSummary {
    width: usize,
    height: usize,
    mean_x: f64,
    mean_y: f64,
    max_magnitude: f64,
    zero_vectors: usize,
}

impl FieldSummary {
    fn from_field(field: &VectorField) -> Self {
        let n = field.len().max(1) as f64;
        let (sx, sy) = field
            .as_slice()
            .iter()
            .fold((0.0, 0.0), |(sx, sy), v| (sx + v.x, sy + v.y));
        Self {
            width: field.width(),
            height: field.height(),
            mean_x: sx / n,
            mean_y: sy / n,
            max_magnitude: field
                .as_slice()
                .iter()
                .map(|v| v.norm())
                .fold(0.0, f64::max),
            zero_vectors: field
                .as_slice()
                .iter()
                .filter(|v| v.norm_sq() == 0.0)
                .count(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Output {
    mode: ModeConfig,
    width: usize,
    height: usize,
    field: FieldSummary,
    /// Mean absolute difference between the prediction and the target frame.
    prediction_mad: f64,
}

fn load_labels(path: &str) -> Result<RegionMap, Box<dyn std::error::Error>> {
    Ok(load_gray_frame(path)?.map(|&label| i32::from(label)))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("blockmotion=info".parse()?),
            )
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.prev_path.is_empty() || config.next_path.is_empty() {
        return Err("prev_path and next_path must be set in the config".into());
    }

    let prev = load_gray_frame(&config.prev_path)?;
    let next = load_gray_frame(&config.next_path)?;
    let (width, height) = next.dims();

    let mut matcher = BlockMatcher::new(config.match_cfg.into());
    match config.mode {
        ModeConfig::Lattice | ModeConfig::Dense => {
            let dense = matches!(config.mode, ModeConfig::Dense);
            matcher.reset(prev.clone(), next.clone(), config.block_size, dense)?;
        }
        ModeConfig::Arbitrary => {
            let (Some(region_prev), Some(region_next)) =
                (&config.region_prev_path, &config.region_next_path)
            else {
                return Err("arbitrary mode needs region_prev_path and region_next_path".into());
            };
            let region_prev = load_labels(region_prev)?;
            let region_next = load_labels(region_next)?;
            matcher.reset_regions(prev.clone(), next.clone(), &region_prev, &region_next)?;
        }
    }
    let field = matcher.vector_field()?;
    let summary = FieldSummary::from_field(field);

    let mut compensator = MotionCompensator::new(prev, next.clone(), field)?
        .with_parallel(matcher.config().parallel);
    let predicted: &Frame<u8> = match config.estimate_factor {
        Some(factor) => compensator.create_image_estimated(factor, None)?,
        None => compensator.create_image_compensated(None)?,
    };
    let prediction_mad = predicted
        .as_slice()
        .iter()
        .zip(next.as_slice())
        .map(|(&p, &n)| (f64::from(p) - f64::from(n)).abs())
        .sum::<f64>()
        / (width * height).max(1) as f64;
    if let Some(path) = &config.compensated_path {
        save_gray_frame(predicted, path)?;
    }

    let output = Output {
        mode: config.mode,
        width,
        height,
        field: summary,
        prediction_mad,
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
