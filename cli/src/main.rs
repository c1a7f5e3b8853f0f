use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dynapi_core::{ApiClient, ClientOptions, HttpMethod, RequestSpec};

#[derive(Parser, Debug)]
#[command(
    name = "dynapi",
    about = "Send a request to a configured REST API and save the JSON response",
    version
)]
struct Cli {
    /// HTTP method (case-insensitive)
    #[arg(value_parser = parse_method)]
    method: HttpMethod,

    /// Path appended to the base URL, or an absolute http(s) URL
    endpoint: String,

    /// Configuration file
    #[arg(long, short, default_value = "config.yml")]
    config: PathBuf,

    /// Base URL; overrides server.base_url from the configuration
    #[arg(long)]
    base_url: Option<String>,

    /// Output directory used when the configuration does not set one
    #[arg(long, default_value = "data_files")]
    output_dir: PathBuf,

    /// Query parameter, repeatable
    #[arg(long = "query", short = 'q', value_name = "KEY=VALUE", value_parser = parse_pair)]
    query: Vec<(String, String)>,

    /// Extra header, repeatable; overrides configured headers
    #[arg(long = "header", short = 'H', value_name = "KEY=VALUE", value_parser = parse_pair)]
    headers: Vec<(String, String)>,

    /// JSON request body
    #[arg(long = "data", short = 'd', value_name = "JSON", value_parser = parse_json)]
    data: Option<serde_json::Value>,

    /// Output file; bare names go in the output directory
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Print the response body instead of saving it
    #[arg(long)]
    no_save: bool,

    /// Enable debug logging
    #[arg(long, short)]
    verbose: bool,
}

fn parse_method(s: &str) -> Result<HttpMethod, String> {
    s.parse().map_err(|e: dynapi_core::ApiError| e.to_string())
}

fn parse_pair(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{s}`"))?;
    if key.is_empty() {
        return Err(format!("empty key in `{s}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

fn parse_json(s: &str) -> Result<serde_json::Value, String> {
    serde_json::from_str(s).map_err(|e| format!("invalid JSON body: {e}"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut options = ClientOptions::default()
        .config_path(&cli.config)
        .output_dir(&cli.output_dir);
    options.base_url = cli.base_url.clone();
    let client = ApiClient::new(options);

    println!("Using base URL: {}", client.base_url());

    let spec = RequestSpec {
        method: cli.method,
        endpoint: cli.endpoint.clone(),
        query: cli.query.clone(),
        body: cli.data.clone(),
        headers: cli.headers.clone(),
    };
    let response = client
        .send(&spec)
        .with_context(|| format!("{} {} failed", cli.method, cli.endpoint))?;

    if cli.no_save {
        println!("{}", response.body);
        return Ok(());
    }

    let path = client
        .save(Some(&response), cli.output.as_deref())
        .context("could not save response")?;
    println!("Data saved to {}", path.display());
    Ok(())
}
