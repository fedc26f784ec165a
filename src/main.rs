//! Packwise command line: weather estimates for trip destinations.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use packwise_core::{App, AppError, Config};
use packwise_weather::{BatchEntry, ForecastRequest, GeoPoint, WeatherEstimate};

/// Weather estimates for trip destinations.
#[derive(Parser)]
#[command(name = "packwise")]
#[command(about = "Weather estimates for packing lists")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate the weather for one destination, or several with --batch.
    Weather {
        /// Latitude in decimal degrees.
        #[arg(long, allow_negative_numbers = true, required_unless_present = "batch")]
        lat: Option<f64>,

        /// Longitude in decimal degrees.
        #[arg(long, allow_negative_numbers = true, required_unless_present = "batch")]
        lon: Option<f64>,

        /// Arrival date (YYYY-MM-DD).
        #[arg(long, required_unless_present = "batch")]
        date: Option<NaiveDate>,

        /// Departure date (YYYY-MM-DD); near-term forecasts use the middle of the stay.
        #[arg(long)]
        until: Option<NaiveDate>,

        /// Destination as `lat,lon,date[,until]`; repeat to resolve several concurrently.
        #[arg(
            long,
            allow_hyphen_values = true,
            value_parser = parse_destination,
            conflicts_with_all = ["lat", "lon", "date", "until"]
        )]
        batch: Vec<ForecastRequest>,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Validate the configuration file and report problems.
    CheckConfig,
}

fn parse_destination(raw: &str) -> Result<ForecastRequest, String> {
    let parts: Vec<&str> = raw.split(',').map(str::trim).collect();
    if !(3..=4).contains(&parts.len()) {
        return Err(format!("expected lat,lon,date[,until], got {raw:?}"));
    }

    let lat: f64 = parts[0]
        .parse()
        .map_err(|_| format!("invalid latitude {:?}", parts[0]))?;
    let lon: f64 = parts[1]
        .parse()
        .map_err(|_| format!("invalid longitude {:?}", parts[1]))?;
    let date: NaiveDate = parts[2]
        .parse()
        .map_err(|_| format!("invalid date {:?}", parts[2]))?;

    let mut request = ForecastRequest::new(GeoPoint::new(lat, lon), date);
    if let Some(until) = parts.get(3) {
        let until: NaiveDate = until
            .parse()
            .map_err(|_| format!("invalid end date {until:?}"))?;
        request = request.with_range_end(until);
    }
    Ok(request)
}

fn print_estimate(label: &str, estimate: Option<&WeatherEstimate>) {
    let Some(estimate) = estimate else {
        println!("{label}: date is in the past, no estimate");
        return;
    };

    println!("{label}: {}", estimate.summary());
    if let Some(description) = &estimate.description {
        println!("  {description}");
    }
    println!("  source: {}", estimate.source);
    if !estimate.attribution.is_empty() {
        println!("  {}", estimate.attribution);
    }
    if let Some(warning) = &estimate.warning {
        println!("  note: {warning}");
    }
}

fn request_label(request: &ForecastRequest) -> String {
    let mut label = format!(
        "{:.4},{:.4} on {}",
        request.point.latitude, request.point.longitude, request.target_date
    );
    if let Some(end) = request.range_end {
        label.push_str(&format!(" to {end}"));
    }
    label
}

fn load_app() -> Result<App> {
    App::new().map_err(|e| {
        eprintln!("{}", e.user_message());
        if let AppError::Config(_) = &e {
            if let Ok(path) = Config::config_path() {
                eprintln!("Config file: {}", path.display());
            }
        }
        anyhow::Error::new(e)
    })
}

async fn run_weather(
    point: Option<GeoPoint>,
    date: Option<NaiveDate>,
    until: Option<NaiveDate>,
    batch: Vec<ForecastRequest>,
    json: bool,
) -> Result<()> {
    let app = load_app()?;
    let resolver = app.resolver();

    if batch.is_empty() {
        let (Some(point), Some(date)) = (point, date) else {
            bail!("--lat, --lon and --date are required");
        };
        let mut request = ForecastRequest::new(point, date);
        request.range_end = until;

        let estimate = resolver.resolve_request(&request).await;
        if json {
            println!("{}", serde_json::to_string_pretty(&estimate)?);
        } else {
            print_estimate(&request_label(&request), estimate.as_ref());
        }
    } else {
        tracing::info!("Resolving {} destinations", batch.len());
        let entries: Vec<BatchEntry> = resolver.resolve_many(&batch).await;
        if json {
            println!("{}", serde_json::to_string_pretty(&entries)?);
        } else {
            for entry in &entries {
                let label = batch
                    .get(entry.index)
                    .map(request_label)
                    .unwrap_or_else(|| format!("#{}", entry.index));
                print_estimate(&label, entry.estimate.as_ref());
            }
        }
    }

    app.shutdown();
    Ok(())
}

fn check_config() -> Result<()> {
    let path = Config::config_path()?;
    let config = Config::load_from(&path)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    let validation = config.validate();

    println!("Config file: {}", path.display());
    for warning in &validation.warnings {
        println!("  warning: {warning}");
    }
    for error in &validation.errors {
        println!("  error: {error}");
    }

    if !validation.is_valid() {
        bail!("{} configuration error(s)", validation.errors.len());
    }
    println!("Configuration OK");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    packwise_core::init()?;

    let cli = Cli::parse();
    match cli.command {
        Commands::Weather {
            lat,
            lon,
            date,
            until,
            batch,
            json,
        } => {
            let point = lat.zip(lon).map(|(lat, lon)| GeoPoint::new(lat, lon));
            run_weather(point, date, until, batch, json).await
        }
        Commands::CheckConfig => check_config(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_destination() {
        let request = parse_destination("41.39, 2.17, 2025-07-01").unwrap();
        assert_eq!(request.point, GeoPoint::new(41.39, 2.17));
        assert_eq!(request.target_date, NaiveDate::from_ymd_opt(2025, 7, 1).unwrap());
        assert!(request.range_end.is_none());

        let ranged = parse_destination("-33.87,151.21,2025-12-20,2025-12-27").unwrap();
        assert_eq!(ranged.range_end, NaiveDate::from_ymd_opt(2025, 12, 27));
    }

    #[test]
    fn test_parse_destination_errors() {
        assert!(parse_destination("41.39,2.17").is_err());
        assert!(parse_destination("north,2.17,2025-07-01").is_err());
        assert!(parse_destination("41.39,2.17,July").is_err());
        assert!(parse_destination("41.39,2.17,2025-07-01,soon").is_err());
    }

    #[test]
    fn test_cli_parses_weather_command() {
        let cli = Cli::try_parse_from([
            "packwise", "weather", "--lat", "53.35", "--lon", "-6.26", "--date", "2025-03-12",
        ])
        .unwrap();
        match cli.command {
            Commands::Weather { lat, lon, date, .. } => {
                assert_eq!(lat, Some(53.35));
                assert_eq!(lon, Some(-6.26));
                assert_eq!(date, NaiveDate::from_ymd_opt(2025, 3, 12));
            }
            Commands::CheckConfig => panic!("wrong command"),
        }
    }

    #[test]
    fn test_cli_batch_conflicts_with_single() {
        let result = Cli::try_parse_from([
            "packwise",
            "weather",
            "--lat",
            "1.0",
            "--batch",
            "1.0,2.0,2025-03-12",
        ]);
        assert!(result.is_err());

        let cli = Cli::try_parse_from([
            "packwise",
            "weather",
            "--batch",
            "1.0,2.0,2025-03-12",
            "--batch",
            "-33.87,151.21,2025-04-01",
        ])
        .unwrap();
        match cli.command {
            Commands::Weather { batch, .. } => assert_eq!(batch.len(), 2),
            Commands::CheckConfig => panic!("wrong command"),
        }
    }
}
