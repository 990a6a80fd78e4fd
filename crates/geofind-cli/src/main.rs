use std::io::Write;

use clap::{Parser, Subcommand};
use futures::StreamExt;

use geofind_core::Location;
use geofind_map::{DiscoveryClient, LatLng, SearchQueryBuilder};

#[derive(Debug, Parser)]
#[command(name = "geofind-cli")]
#[command(about = "Geofind service command line interface")]
struct Cli {
    /// Base URL of the geofind service.
    #[arg(
        long,
        env = "GEOFIND_SERVICE_URL",
        default_value = "http://127.0.0.1:2004"
    )]
    service_url: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Ping the service healthcheck.
    Health,
    /// Rebuild the geo index, streaming progress as the service reports it.
    Reindex,
    /// Run a discovery query and print the matching records.
    Find {
        #[arg(long)]
        latitude: f64,
        #[arg(long)]
        longitude: f64,
        /// Search radius in metres.
        #[arg(long)]
        radius: f64,
        /// Free-text input; every word gets a wildcard suffix.
        #[arg(long, default_value = "")]
        search: String,
        /// Category filter, repeatable.
        #[arg(long = "filter")]
        filters: Vec<String>,
        /// Collection name prefixed to the query.
        #[arg(long, default_value = "locations")]
        collection: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    tracing::debug!(service_url = %cli.service_url, "using geofind service");

    match cli.command {
        Some(Commands::Health) => health(&cli.service_url).await?,
        Some(Commands::Reindex) => reindex(&cli.service_url).await?,
        Some(Commands::Find {
            latitude,
            longitude,
            radius,
            search,
            filters,
            collection,
        }) => {
            find(
                &cli.service_url,
                LatLng::new(latitude, longitude),
                radius,
                &collection,
                &search,
                filters,
            )
            .await?;
        }
        None => println!("geofind-cli: pass a command, see --help"),
    }

    Ok(())
}

fn endpoint(service_url: &str, path: &str) -> String {
    format!("{}/{path}", service_url.trim_end_matches('/'))
}

async fn health(service_url: &str) -> anyhow::Result<()> {
    let body = reqwest::get(endpoint(service_url, "services/healthcheck"))
        .await?
        .error_for_status()?
        .text()
        .await?;
    println!("{body}");
    Ok(())
}

/// Streams the reindex progress to stdout chunk by chunk, so a long run
/// shows each location as the service adds it.
async fn reindex(service_url: &str) -> anyhow::Result<()> {
    let response = reqwest::get(endpoint(service_url, "services/locations/geo-reindex"))
        .await?
        .error_for_status()?;

    let mut stream = response.bytes_stream();
    let mut stdout = std::io::stdout();
    while let Some(chunk) = stream.next().await {
        stdout.write_all(&chunk?)?;
        stdout.flush()?;
    }
    println!();
    Ok(())
}

async fn find(
    service_url: &str,
    position: LatLng,
    radius: f64,
    collection: &str,
    search: &str,
    filters: Vec<String>,
) -> anyhow::Result<()> {
    let mut query = SearchQueryBuilder::new(collection);
    query.set_input(search);
    query.set_filters(filters);
    let query = query.build();
    tracing::debug!(%query, "discovery query");

    let client = DiscoveryClient::new(service_url, 30)?;
    let records: Vec<Location> = client.discover(position, radius, &query).await?;

    println!("{} record(s)", records.len());
    for record in &records {
        match record.coordinate() {
            Some(coordinate) => {
                println!("{}  [{}, {}]", record.title, coordinate.lat, coordinate.lng);
            }
            None => println!("{}", record.title),
        }
    }
    Ok(())
}
