//! Ephemeris table tool
//!
//! Computes the track of one or more bodies and prints one line per sample,
//! with chart-plane coordinates and date labels.
//!
//! Usage:
//!   cargo run --bin ephem_track -- [--data-dir DIR] [--kernel de421.bsp] jupiter,2460310.5,2460676.5,5

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use skychart::constants::RAD2DEG;
use skychart::ephemeris::{add_text_labels, autoscale_chart, track_ticks};
use skychart::planetlib::sun_pos;
use skychart::spherical::ang_dist_radec;
use skychart::time::format_date;
use skychart::{ChartConfig, EngineConfig, Ephemeris, EphemerisEngine, ObservingOptions};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Ephemeris table tool
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Computes ephemerides of solar-system bodies from orbital element catalogues",
    long_about = None
)]
struct Args {
    /// Engine configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the element sources and catalogues
    #[arg(short = 'D', long)]
    data_dir: Option<PathBuf>,

    /// JPL SPK kernel for the Earth, Moon and Sun
    #[arg(short, long)]
    kernel: Option<PathBuf>,

    /// Chart configuration file (JSON); the chart is autoscaled to the tracks when omitted
    #[arg(long)]
    chart: Option<PathBuf>,

    /// Julian date of the equinox for output coordinates
    #[arg(long)]
    epoch: Option<f64>,

    /// Observer latitude and longitude in degrees, for topocentric positions
    #[arg(long, num_args = 2, value_names = ["LAT", "LON"], allow_negative_numbers = true)]
    observer: Option<Vec<f64>>,

    /// Print tick marks for the labelled points
    #[arg(short, long, action = ArgAction::SetTrue)]
    ticks: bool,

    /// Track definitions, each `id,jdMin,jdMax[,step]`
    #[arg(required = true)]
    definitions: Vec<String>,
}

fn engine_config(args: &Args) -> Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    if let Some(dir) = &args.data_dir {
        config = config.with_data_dir(dir);
    }
    if let Some(kernel) = &args.kernel {
        config = config.with_jpl_kernel(kernel);
    }
    Ok(config)
}

fn chart_config(args: &Args) -> Result<ChartConfig> {
    match &args.chart {
        Some(path) => Ok(serde_json::from_str(&fs::read_to_string(path)?)?),
        None => Ok(ChartConfig {
            ephemeris_autoscale: true,
            ..ChartConfig::default()
        }),
    }
}

fn print_track(ephemeris: &Ephemeris, chart: &ChartConfig, ticks: bool) -> Result<()> {
    println!(
        "\n{} ({} points, brightest {:.2} mag, smallest phase {:.3}, largest {:.2}\")",
        ephemeris.object_id,
        ephemeris.points.len(),
        ephemeris.brightest_magnitude,
        ephemeris.minimum_phase,
        ephemeris.maximum_angular_size
    );
    println!("-------------------------------------------------------------------------------------");
    println!(
        "{:<19} {:>9} {:>9} {:>7} {:>6} {:>9} {:>7} {:>9} {:>9}  label",
        "date", "ra(h)", "dec(d)", "mag", "phase", "size(\")", "elong", "x", "y"
    );
    for point in &ephemeris.points {
        let (x, y) = chart.project(point.ra, point.dec, false);
        let (sun_ra, sun_dec) = sun_pos(point.jd);
        let elongation = ang_dist_radec(sun_ra, sun_dec, point.ra, point.dec) * RAD2DEG;
        println!(
            "{:<19} {:>9.4} {:>9.4} {:>7.2} {:>6.3} {:>9.2} {:>7.2} {:>9.4} {:>9.4}  {}",
            format_date(point.jd)?,
            point.ra * RAD2DEG / 15.0,
            point.dec * RAD2DEG,
            point.magnitude,
            point.phase,
            point.angular_size,
            elongation,
            x,
            y,
            point.text_label.as_deref().unwrap_or("")
        );
    }

    if ticks {
        println!("\nTicks:");
        for tick in track_ticks(ephemeris, chart) {
            println!(
                "  {:<12} x={:>8.4} y={:>8.4} theta={:>7.1} align=({},{}) priority={}",
                tick.label,
                tick.x,
                tick.y,
                tick.theta * RAD2DEG,
                tick.h_align,
                tick.v_align,
                tick.priority
            );
        }
    }
    Ok(())
}

fn run(args: Args) -> Result<()> {
    let engine = EphemerisEngine::from_config(engine_config(&args)?)?;

    let mut options = ObservingOptions::default();
    if let Some(epoch) = args.epoch {
        options = options.with_ra_dec_epoch(epoch);
    }
    if let Some(observer) = &args.observer {
        options = options.with_observer(observer[0], observer[1]);
    }

    let mut tracks = args
        .definitions
        .iter()
        .map(|definition| engine.track(definition, &options))
        .collect::<skychart::Result<Vec<_>>>()?;

    let mut chart = chart_config(&args)?;
    autoscale_chart(&mut chart, &tracks);
    println!(
        "Chart: {:?} centred on RA {:.3}h, Dec {:.2} deg, {:.1} deg wide",
        chart.projection,
        chart.ra0 * RAD2DEG / 15.0,
        chart.dec0 * RAD2DEG,
        chart.angular_width * RAD2DEG
    );

    for track in tracks.iter_mut() {
        add_text_labels(track, &chart)?;
        print_track(track, &chart, args.ticks)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
