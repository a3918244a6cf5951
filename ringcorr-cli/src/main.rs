use clap::Parser;
use ringcorr::{
    load_channel, peak_heights, save_grid_png, suggest_threshold, sweep_radius, Backend, Channel,
    Collected, DetectConfig, Detector, Footprint, Grid, KernelShape, NormalizeMode, Plateau,
    RefineStrategy, RefinedPeak, RingCorrError, SweepPoint,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "RingCorr particle detector (JSON config driven)")]
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

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum ChannelConfig {
    Luma,
    Red,
    Green,
    Blue,
}

impl From<ChannelConfig> for Channel {
    fn from(value: ChannelConfig) -> Self {
        match value {
            ChannelConfig::Luma => Channel::Luma,
            ChannelConfig::Red => Channel::Red,
            ChannelConfig::Green => Channel::Green,
            ChannelConfig::Blue => Channel::Blue,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum KernelConfig {
    Ring,
    Disk,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum NormalizeConfig {
    Plain,
    EdgeEmphasis,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum FootprintConfig {
    Cross,
    Square,
    Disk,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum RefineConfig {
    AxisCentroid,
    Centroid2d,
    Parabolic,
    Gaussian,
}

impl From<RefineConfig> for RefineStrategy {
    fn from(value: RefineConfig) -> Self {
        match value {
            RefineConfig::AxisCentroid => RefineStrategy::AxisCentroid,
            RefineConfig::Centroid2d => RefineStrategy::Centroid2d,
            RefineConfig::Parabolic => RefineStrategy::Parabolic,
            RefineConfig::Gaussian => RefineStrategy::Gaussian,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
enum BackendConfig {
    Direct,
    Parallel,
    Fft,
}

impl From<BackendConfig> for Backend {
    fn from(value: BackendConfig) -> Self {
        match value {
            BackendConfig::Direct => Backend::Direct,
            BackendConfig::Parallel => Backend::Parallel,
            BackendConfig::Fft => Backend::Fft,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct DetectConfigJson {
    kernel: KernelConfig,
    radius: f32,
    width: f32,
    normalize: NormalizeConfig,
    footprint: FootprintConfig,
    footprint_radius: usize,
    min_distance: Option<usize>,
    threshold: f32,
    exclude_border: bool,
    refine: RefineConfig,
    refine_window: usize,
    backend: BackendConfig,
}

impl Default for DetectConfigJson {
    fn default() -> Self {
        let cfg = DetectConfig::default();
        Self {
            kernel: KernelConfig::Ring,
            radius: cfg.shape.radius(),
            width: 1.5,
            normalize: NormalizeConfig::EdgeEmphasis,
            footprint: FootprintConfig::Cross,
            footprint_radius: 1,
            min_distance: cfg.min_distance,
            threshold: cfg.threshold,
            exclude_border: cfg.exclude_border,
            refine: RefineConfig::AxisCentroid,
            refine_window: cfg.refine_window,
            backend: BackendConfig::Direct,
        }
    }
}

impl From<&DetectConfigJson> for DetectConfig {
    fn from(value: &DetectConfigJson) -> Self {
        let shape = match value.kernel {
            KernelConfig::Ring => KernelShape::Ring {
                radius: value.radius,
                width: value.width,
            },
            KernelConfig::Disk => KernelShape::Disk {
                radius: value.radius,
            },
        };
        let footprint = match value.footprint {
            FootprintConfig::Cross => Footprint::Cross,
            FootprintConfig::Square => Footprint::Square(value.footprint_radius),
            FootprintConfig::Disk => Footprint::Disk(value.footprint_radius),
        };
        let normalize = match value.normalize {
            NormalizeConfig::Plain => NormalizeMode::Plain,
            NormalizeConfig::EdgeEmphasis => NormalizeMode::EdgeEmphasis(footprint),
        };
        DetectConfig {
            shape,
            normalize,
            min_distance: value.min_distance,
            threshold: value.threshold,
            exclude_border: value.exclude_border,
            refine: value.refine.into(),
            refine_window: value.refine_window,
            backend: value.backend.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SweepConfigJson {
    start: f32,
    stop: f32,
    step: f32,
    #[serde(default = "default_min_plateau")]
    min_plateau: usize,
}

const RADIUS_STEP_TOLERANCE: f32 = 1e-3;

fn default_min_plateau() -> usize {
    3
}

impl SweepConfigJson {
    fn radii(&self) -> Result<Vec<f32>, Box<dyn std::error::Error>> {
        if !(self.step.is_finite() && self.step > 0.0) || self.stop < self.start {
            return Err("sweep needs step > 0 and stop >= start".into());
        }
        // Tolerate rounding so `stop` itself is included.
        let steps = (self.stop - self.start) / self.step + RADIUS_STEP_TOLERANCE;
        let n = steps.floor() as usize + 1;
        Ok((0..n).map(|i| self.start + self.step * i as f32).collect())
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    image_path: String,
    channel: ChannelConfig,
    output_path: Option<String>,
    correlation_png: Option<String>,
    detect: DetectConfigJson,
    sweep: Option<SweepConfigJson>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            image_path: String::new(),
            channel: ChannelConfig::Luma,
            output_path: None,
            correlation_png: None,
            detect: DetectConfigJson::default(),
            sweep: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct CenterRecord {
    row: f32,
    col: f32,
    score: f32,
}

impl From<RefinedPeak> for CenterRecord {
    fn from(value: RefinedPeak) -> Self {
        Self {
            row: value.row,
            col: value.col,
            score: value.score,
        }
    }
}

#[derive(Debug, Serialize)]
struct DetectOutput {
    count: usize,
    centers: Vec<CenterRecord>,
    suggested_threshold: Option<f32>,
}

#[derive(Debug, Serialize)]
struct SweepPointRecord {
    radius: f32,
    count: usize,
}

impl From<&SweepPoint> for SweepPointRecord {
    fn from(value: &SweepPoint) -> Self {
        Self {
            radius: value.radius,
            count: value.count,
        }
    }
}

#[derive(Debug, Serialize)]
struct PlateauRecord {
    start_radius: f32,
    end_radius: f32,
    count: usize,
    len: usize,
}

impl From<Plateau> for PlateauRecord {
    fn from(value: Plateau) -> Self {
        Self {
            start_radius: value.start_radius,
            end_radius: value.end_radius,
            count: value.count,
            len: value.len,
        }
    }
}

#[derive(Debug, Serialize)]
struct SweepOutput {
    points: Vec<SweepPointRecord>,
    plateaus: Vec<PlateauRecord>,
}

/// Runs detection and calibration on one image.
///
/// An image where no peak reaches the threshold is reported as zero centers;
/// the correlation map and the suggested threshold are still returned.
fn run_detect(
    config: DetectConfig,
    image: &Grid,
) -> Result<(DetectOutput, Option<Grid>), RingCorrError> {
    let detector = Detector::new(config);
    let mut diagnostics = Collected::default();
    let centers = match detector.detect_grid_with(image, &mut diagnostics) {
        Ok(detection) => detection.centers,
        Err(RingCorrError::EmptyResult { threshold }) => {
            tracing::warn!(threshold, "no peak reached the threshold");
            Vec::new()
        }
        Err(err) => return Err(err),
    };

    let suggested_threshold = diagnostics.correlation.as_ref().and_then(|corr| {
        suggest_threshold(&peak_heights(corr, config.effective_min_distance()))
    });
    let output = DetectOutput {
        count: centers.len(),
        centers: centers.into_iter().map(CenterRecord::from).collect(),
        suggested_threshold,
    };
    Ok((output, diagnostics.correlation))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("ringcorr=info".parse()?))
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
    if config.image_path.is_empty() {
        return Err("image_path must be set in the config".into());
    }

    let image = load_channel(&config.image_path, config.channel.into())?;
    let detect_cfg = DetectConfig::from(&config.detect);

    let json = match &config.sweep {
        Some(sweep) => {
            let radii = sweep.radii()?;
            let result = sweep_radius(&image, &radii, &detect_cfg)?;
            let output = SweepOutput {
                points: result.points().iter().map(SweepPointRecord::from).collect(),
                plateaus: result
                    .plateaus(sweep.min_plateau)
                    .into_iter()
                    .map(PlateauRecord::from)
                    .collect(),
            };
            tracing::info!(radii = radii.len(), plateaus = output.plateaus.len(), "sweep done");
            serde_json::to_string_pretty(&output)?
        }
        None => {
            let (output, correlation) = run_detect(detect_cfg, &image)?;
            if let (Some(path), Some(corr)) = (&config.correlation_png, &correlation) {
                save_grid_png(corr, path)?;
            }
            tracing::info!(
                count = output.count,
                suggested_threshold = ?output.suggested_threshold,
                "detection done"
            );
            serde_json::to_string_pretty(&output)?
        }
    };

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{run_detect, SweepConfigJson};
    use ringcorr::synth::{render_disks, Disk};
    use ringcorr::{DetectConfig, KernelShape, RingCorrError};

    fn sweep(start: f32, stop: f32, step: f32) -> SweepConfigJson {
        SweepConfigJson {
            start,
            stop,
            step,
            min_plateau: 3,
        }
    }

    #[test]
    fn sweep_radii_include_stop() {
        let radii = sweep(19.5, 20.5, 0.1).radii().unwrap();
        assert_eq!(radii.len(), 11);
        assert!((radii[10] - 20.5).abs() < 1e-4);
        assert_eq!(sweep(10.0, 12.0, 1.0).radii().unwrap(), vec![10.0, 11.0, 12.0]);
        assert!(sweep(12.0, 10.0, 1.0).radii().is_err());
        assert!(sweep(10.0, 12.0, 0.0).radii().is_err());
    }

    #[test]
    fn empty_detection_still_suggests_a_threshold() {
        let image = render_disks(150, 150, &[Disk::new(75.0, 75.0, 20.0)]).unwrap();
        let config = DetectConfig {
            shape: KernelShape::Ring {
                radius: 20.0,
                width: 1.5,
            },
            threshold: 2.0,
            ..DetectConfig::default()
        };
        let (output, correlation) = run_detect(config, &image).unwrap();
        assert_eq!(output.count, 0);
        assert!(output.centers.is_empty());
        assert!(correlation.is_some());
        let suggested = output.suggested_threshold.unwrap();
        assert!(suggested > 0.2 && suggested < 0.9, "suggested {suggested}");

        let (found, _) = run_detect(DetectConfig { threshold: suggested, ..config }, &image).unwrap();
        assert_eq!(found.count, 1);
    }

    #[test]
    fn other_errors_are_propagated() {
        let blank = ringcorr::Grid::zeros(64, 64).unwrap();
        assert_eq!(
            run_detect(DetectConfig::default(), &blank).err(),
            Some(RingCorrError::EmptyImage)
        );
    }
}
