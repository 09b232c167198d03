use clap::Parser;
use location_picker::config::init_tracing;
use location_picker::location::{AddressFields, Coordinate, MemoryMap, NominatimGeocoder};
use location_picker::{LocationPicker, OrderingPolicy, PickerConfig};
use serde::Serialize;
use std::path::PathBuf;

/// Location picker: place a marker, reverse geocode it, fill the address form.
///
/// Examples:
///   picker
///   picker --lat 36.8092 --lon 10.1300
///   picker --lat 35.8256 --lon 10.6084 --ordering latest-only
///   picker --serve --port 8080
#[derive(Parser)]
#[command(name = "picker", version, about, long_about = None)]
struct Cli {
    /// Latitude (-90 to 90) of a map click. Requires --lon.
    #[arg(long, allow_hyphen_values = true, requires = "lon")]
    lat: Option<f64>,

    /// Longitude (-180 to 180) of a map click. Requires --lat.
    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    lon: Option<f64>,

    /// Run the HTTP API instead of a one-shot lookup.
    #[arg(long)]
    serve: bool,

    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    #[arg(long, default_value_t = 3000)]
    port: u16,

    /// Config file (JSON). Defaults to ~/.location-picker/config.json if present.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Reverse geocoding endpoint (Nominatim-compatible).
    #[arg(long)]
    endpoint: Option<String>,

    /// User-Agent sent to the geocoder.
    #[arg(long)]
    user_agent: Option<String>,

    /// How out-of-order lookups are reconciled: "last-write-wins" or "latest-only".
    #[arg(long, value_parser = parse_ordering)]
    ordering: Option<OrderingPolicy>,

    /// Emit logs as JSON.
    #[arg(long)]
    json_logs: bool,
}

fn parse_ordering(s: &str) -> Result<OrderingPolicy, String> {
    match s.to_lowercase().as_str() {
        "last-write-wins" | "lww" => Ok(OrderingPolicy::LastWriteWins),
        "latest-only" | "latest" => Ok(OrderingPolicy::LatestOnly),
        _ => Err(format!("Unknown ordering '{}'. Use 'last-write-wins' or 'latest-only'.", s)),
    }
}

#[derive(Serialize)]
struct Output<'a> {
    #[serde(flatten)]
    fields: location_picker::location::FormSnapshot,
    /// Trimmed (region, municipality) an incident report would carry.
    #[serde(skip_serializing_if = "Option::is_none")]
    administrative_area: Option<(String, String)>,
    outcome: location_picker::UpdateOutcome,
    geocoder: &'a str,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let config = load_config(&cli).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    if cli.serve {
        if let Err(e) = location_picker::server::start(&config, &cli.host, cli.port).await {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    let click = match (cli.lat, cli.lon) {
        (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon).unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        })),
        _ => None,
    };

    let geocoder = NominatimGeocoder::from_config(&config.geocoder);
    let picker = LocationPicker::new(MemoryMap::new(), geocoder, AddressFields::in_memory(), &config);

    let mut outcome = await_lookup(picker.init()).await;
    if let Some(at) = click {
        eprintln!("  \u{1F4CD} {}", at);
        outcome = await_lookup(picker.on_map_click(at)).await;
    }

    let fields = picker.fields().snapshot();
    let output = Output {
        administrative_area: fields.administrative_area(),
        fields,
        outcome,
        geocoder: &config.geocoder.endpoint,
    };
    match serde_json::to_string_pretty(&output) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn load_config(cli: &Cli) -> Result<PickerConfig, location_picker::config::ConfigError> {
    let mut config = match &cli.config {
        Some(path) => PickerConfig::load_from(path)?,
        None => PickerConfig::load()?,
    };
    config.apply_overrides(cli.endpoint.clone(), cli.user_agent.clone());
    if let Some(ordering) = cli.ordering {
        config.ordering = ordering;
    }
    Ok(config)
}

async fn await_lookup(
    handle: tokio::task::JoinHandle<location_picker::UpdateOutcome>,
) -> location_picker::UpdateOutcome {
    handle.await.unwrap_or_else(|e| {
        eprintln!("Error: lookup task failed: {}", e);
        std::process::exit(1);
    })
}
