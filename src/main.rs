//! routeprogress cli - replay recorded positions over a route

use std::fs::{self, File};

use argopt::{cmd_group, subcmd};
use csv::ReaderBuilder;
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use routeprogress::sources::{CsvSource, FieldsConfiguration, GpxSource};
use routeprogress::{
    polyline, PositionSample, PositionsSource, Replay, RouteSource, TrackingOptions,
    TrackingSession,
};

/// CLI of routeprogress - Follow the progress of a trip over a route
#[cmd_group(commands = [replay, decode])]
fn main() -> Result<(), String> {}

/// Replay a positions log over a route, one JSON snapshot per line
#[subcmd]
fn replay(
    /// Route file: a directions JSON object or a raw encoded polyline
    route: String,
    /// Positions file
    positions: String,
    /// Positions format: csv or gpx. Default: from the file extension
    #[opt(long)]
    format: Option<String>,
    /// Tracking and fields configuration. Default: .routeprogress.yaml, ~/.routeprogress.yaml
    #[opt(long)]
    config: Option<String>,
) -> Result<(), String> {
    init_logging();

    let raw_route = fs::read_to_string(&route)
        .map_err(|e| format!("Failed on read the route file: {}", e))?;
    let source = RouteSource::parse(&raw_route).map_err(|e| e.to_string())?;

    let conf = load_configs(config);

    let format = format.unwrap_or_else(|| {
        if positions.to_lowercase().ends_with(".gpx") {
            "gpx".to_string()
        } else {
            "csv".to_string()
        }
    });

    let file = File::open(&positions)
        .map_err(|e| format!("Failed on open the positions file: {}", e))?;

    let samples: Vec<PositionSample> = match format.as_str() {
        "gpx" => GpxSource::new(file).fetch(),
        "csv" => {
            let rdr = ReaderBuilder::new().flexible(true).from_reader(file);
            CsvSource::new(rdr, Some(conf.fields)).fetch()
        }
        other => return Err(format!("Positions format not supported: {}", other)),
    }
    .map_err(|e| e.to_string())?;

    info!(samples = samples.len(), "Positions loaded");

    let mut session = TrackingSession::new(conf.tracking);
    session.start(&source).map_err(|e| e.to_string())?;

    let snapshots = Replay::run(&mut session, samples).map_err(|e| e.to_string())?;
    session.stop();

    for snap in snapshots {
        let line = serde_json::to_string(snap.as_ref()).map_err(|e| e.to_string())?;
        println!("{}", line);
    }

    Ok(())
}

/// Decode an encoded polyline, one "lat,lng" per line
#[subcmd]
fn decode(
    /// Encoded polyline
    encoded: String,
) -> Result<(), String> {
    init_logging();

    let points = polyline::decode(&encoded);
    if points.is_empty() {
        return Err("Polyline without points".to_string());
    }

    for p in points {
        println!("{:.5},{:.5}", p.y(), p.x());
    }

    Ok(())
}

/// Logs to stderr, filtered by RUST_LOG (default: info)
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Load the current config
fn load_configs(provided: Option<String>) -> Configs {
    let mut options = vec![];

    if let Some(sprovided) = provided {
        options.push(sprovided);
    }

    options.push(".routeprogress.yaml".to_string());

    if let Some(home) = dirs::home_dir() {
        if let Some(shome) = home.to_str() {
            options.push(format!("{}/.routeprogress.yaml", shome));
        }
    }

    let mut yaml: Option<String> = None;
    for fi in options {
        if let Ok(s) = fs::read_to_string(fi) {
            yaml = Some(s);
            break;
        }
    }

    if let Some(s) = yaml {
        match serde_yaml::from_str::<Configs>(&s) {
            Ok(conf) => return conf,
            Err(e) => tracing::warn!(error = %e, "Invalid config, using the defaults"),
        }
    }

    Configs::default()
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
struct Configs {
    pub tracking: TrackingOptions,
    pub fields: FieldsConfiguration,
}

#[test]
fn parse_configs() -> Result<(), String> {
    let yaml = "\ntracking:\n  off_route_threshold_m: 80\nfields:\n  time: recorded_at";

    let conf: Configs = serde_yaml::from_str(yaml).map_err(|e| e.to_string())?;

    assert_eq!(
        Configs {
            tracking: TrackingOptions {
                off_route_threshold_m: 80.0,
                history_size: 10,
                default_speed_mps: 1.4,
                min_speed_mps: 1.0,
            },
            fields: FieldsConfiguration {
                lat: "lat".to_string(),
                lng: "lng".to_string(),
                coordinates: "coordinates".to_string(),
                time: "recorded_at".to_string(),
                accuracy: "accuracy".to_string(),
                speed: "speed".to_string(),
                flip_coordinates: false,
            },
        },
        conf
    );

    let yaml = "\ntracking:\n  history_size: 5";

    let conf: Configs = serde_yaml::from_str(yaml).map_err(|e| e.to_string())?;

    assert_eq!(5, conf.tracking.history_size);
    assert_eq!(FieldsConfiguration::default(), conf.fields);

    Ok(())
}
