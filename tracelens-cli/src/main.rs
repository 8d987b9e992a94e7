//! tracelens-cli - command-line client for the TraceLens public API
//!
//! Every response is checked against the observation contract before it is
//! printed, so a server returning an unexpected shape fails loudly instead of
//! printing partial data.
//!
//! # Subcommands
//! - `observations [--type T] [--trace-id ID] [--name N] [--user-id U] [--page P] [--limit L] [--json]`
//! - `observation <id> [--json]`
//! - `status` - show server health

use clap::{Parser, Subcommand};
use tracelens_core::{validate_observation, validate_observation_list, Observation, ObservationList};

const DEFAULT_SERVER: &str = "http://127.0.0.1:3030";

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Debug, Parser)]
#[command(name = "tracelens-cli", version, about = "Query observations from a TraceLens server")]
struct Cli {
    /// TraceLens HTTP server URL
    #[arg(long, env = "TRACELENS_HTTP_URL", default_value = DEFAULT_SERVER)]
    server: String,

    /// Project public key
    #[arg(long, env = "TRACELENS_PUBLIC_KEY")]
    public_key: Option<String>,

    /// Project secret key
    #[arg(long, env = "TRACELENS_SECRET_KEY", hide_env_values = true)]
    secret_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List observations of the project
    Observations {
        /// Only this observation type (GENERATION, SPAN, EVENT)
        #[arg(long = "type")]
        observation_type: Option<String>,

        #[arg(long)]
        trace_id: Option<String>,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        user_id: Option<String>,

        #[arg(long)]
        page: Option<u32>,

        #[arg(long)]
        limit: Option<u32>,

        /// Print the data array as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a single observation
    Observation {
        id: String,

        /// Print the observation as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show TraceLens server status
    Status,
}

// ============================================================================
// Output formatting
// ============================================================================

/// One-line summary of an observation.
pub fn summary_line(obs: &Observation) -> String {
    let name = obs.name.as_deref().unwrap_or("-");
    let model = obs.model.as_deref().unwrap_or("-");
    let duration = match obs.end_time {
        Some(end) => format!("{}ms", (end - obs.start_time).num_milliseconds()),
        None => "open".to_string(),
    };
    format!(
        "{:<10} {} trace={} name={} model={} start={} duration={}",
        obs.observation_type.as_str(),
        obs.id,
        obs.trace_id,
        name,
        model,
        obs.start_time.to_rfc3339(),
        duration
    )
}

/// Footer line with paging info, if the server sent any.
pub fn paging_line(list: &ObservationList) -> Option<String> {
    list.meta.map(|m| {
        format!(
            "page {}/{} ({} observations, {} per page)",
            m.page, m.total_pages, m.total_items, m.limit
        )
    })
}

/// Query pairs for the list endpoint, skipping unset options.
pub fn list_query(
    observation_type: Option<&str>,
    trace_id: Option<&str>,
    name: Option<&str>,
    user_id: Option<&str>,
    page: Option<u32>,
    limit: Option<u32>,
) -> Vec<(&'static str, String)> {
    let mut pairs = Vec::new();
    let strings = [
        ("type", observation_type),
        ("traceId", trace_id),
        ("name", name),
        ("userId", user_id),
    ];
    for (key, value) in strings {
        if let Some(v) = value {
            pairs.push((key, v.to_string()));
        }
    }
    if let Some(p) = page {
        pairs.push(("page", p.to_string()));
    }
    if let Some(l) = limit {
        pairs.push(("limit", l.to_string()));
    }
    pairs
}

/// Join path segments onto the server URL, percent-encoding each segment.
pub fn endpoint_url(server: &str, segments: &[&str]) -> anyhow::Result<reqwest::Url> {
    let mut url = reqwest::Url::parse(server)
        .map_err(|e| anyhow::anyhow!("invalid server URL {}: {}", server, e))?;
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("server URL cannot be a base: {}", server))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

// ============================================================================
// HTTP Client Calls
// ============================================================================

struct ApiClient {
    server: String,
    credentials: Option<(String, String)>,
    client: reqwest::blocking::Client,
}

impl ApiClient {
    fn new(server: &str, public_key: Option<String>, secret_key: Option<String>) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(Self {
            server: server.to_string(),
            credentials: public_key.zip(secret_key),
            client,
        })
    }

    fn get_json(&self, segments: &[&str], query: &[(&str, String)]) -> anyhow::Result<serde_json::Value> {
        let url = endpoint_url(&self.server, segments)?;
        let mut req = self.client.get(url.clone()).query(query);
        if let Some((pk, sk)) = &self.credentials {
            req = req.basic_auth(pk, Some(sk));
        }

        let resp = req
            .send()
            .map_err(|e| anyhow::anyhow!("connection failed to {}: {}", url, e))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().unwrap_or_default();
            anyhow::bail!("server returned {}: {}", status, body);
        }

        Ok(resp.json()?)
    }
}

fn do_observations(
    api: &ApiClient,
    query: &[(&str, String)],
    json_output: bool,
) -> anyhow::Result<()> {
    let body = api.get_json(&["api", "public", "observations"], query)?;
    let list = validate_observation_list(&body)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&list.data)?);
        return Ok(());
    }

    if list.data.is_empty() {
        eprintln!("No observations found");
        return Ok(());
    }
    for obs in &list.data {
        println!("{}", summary_line(obs));
    }
    if let Some(line) = paging_line(&list) {
        println!("\n{}", line);
    }
    Ok(())
}

fn do_observation(api: &ApiClient, id: &str, json_output: bool) -> anyhow::Result<()> {
    let body = api.get_json(&["api", "public", "observations", id], &[])?;
    let obs = validate_observation(&body)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&obs)?);
        return Ok(());
    }

    println!("{}", summary_line(&obs));
    for (label, value) in [("input", &obs.input), ("output", &obs.output), ("metadata", &obs.metadata)] {
        if let Some(v) = value {
            println!("{}: {}", label, v);
        }
    }
    Ok(())
}

/// Show the server status by calling GET /health.
fn do_status(api: &ApiClient) -> anyhow::Result<()> {
    let body = api.get_json(&["health"], &[])?;
    println!("TraceLens server: {}", body["status"].as_str().unwrap_or("unknown"));
    println!("Version:          {}", body["version"].as_str().unwrap_or("?"));
    println!("PostgreSQL:       {}", body["postgresql"].as_str().unwrap_or("?"));
    Ok(())
}

// ============================================================================
// Main
// ============================================================================

fn main() {
    let cli = Cli::parse();
    let server = cli.server.trim_end_matches('/').to_string();

    let result = ApiClient::new(&server, cli.public_key, cli.secret_key).and_then(|api| {
        match cli.command {
            Commands::Observations {
                observation_type,
                trace_id,
                name,
                user_id,
                page,
                limit,
                json,
            } => {
                let query = list_query(
                    observation_type.as_deref(),
                    trace_id.as_deref(),
                    name.as_deref(),
                    user_id.as_deref(),
                    page,
                    limit,
                );
                do_observations(&api, &query, json)
            }
            Commands::Observation { id, json } => do_observation(&api, &id, json),
            Commands::Status => do_status(&api),
        }
    });

    if let Err(e) = result {
        eprintln!("tracelens-cli: {}", e);
        std::process::exit(1);
    }
}

// ============================================================================
// Tests
// ============================================================================
