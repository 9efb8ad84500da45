//! Payables CLI - operator commands against the payables daemon

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tabled::{Table, Tabled};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:9630";

#[derive(Parser)]
#[command(name = "payables")]
#[command(about = "Payables service CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "PAYABLES_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a batch of payables from a JSON file (array of drafts)
    BatchCreate {
        /// Path to the JSON file
        #[arg(short, long)]
        file: String,
    },

    /// Create a single payable
    Create {
        #[arg(short, long)]
        assignor: String,

        /// Emission date, stored verbatim
        #[arg(short, long)]
        emission_date: String,

        #[arg(short, long)]
        value_in_cents: u64,
    },

    /// Show one payable
    Get { id: String },

    /// List payables
    List {
        /// Only payables of this assignor
        #[arg(short, long)]
        assignor: Option<String>,

        #[arg(short, long, default_value = "1")]
        page: u32,

        #[arg(short = 'n', long, default_value = "10")]
        items_per_page: u32,
    },

    /// Change fields of a payable
    Update {
        id: String,

        #[arg(long)]
        assignor: Option<String>,

        #[arg(long)]
        emission_date: Option<String>,

        #[arg(long)]
        value_in_cents: Option<u64>,
    },

    /// Soft-delete a payable
    Remove { id: String },

    /// Register an assignor
    AssignorCreate {
        #[arg(long)]
        document: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        phone: String,

        #[arg(long)]
        name: String,
    },

    /// Show batch queue counters
    QueueStats,
}

#[derive(Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: Value,
    id: u64,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    // "result": null is a valid answer (e.g. unknown id)
    #[serde(default)]
    result: Value,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

#[derive(Deserialize, Tabled)]
#[serde(rename_all = "camelCase")]
struct PayableRow {
    id: String,
    assignor_id: String,
    emission_date: String,
    value_in_cents: u64,
    updated_by: String,
}

#[derive(Deserialize, Tabled)]
#[serde(rename_all = "camelCase")]
struct AssignorRow {
    id: String,
    name: String,
    document: String,
    email: String,
    phone: String,
}

async fn call_rpc(url: &str, method: &str, params: Value) -> Result<Value> {
    let request = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        method: method.to_string(),
        params,
        id: 1,
    };

    let client = reqwest::Client::new();
    let response: JsonRpcResponse = client
        .post(url)
        .json(&request)
        .send()
        .await
        .context("Failed to connect to daemon")?
        .json()
        .await
        .context("Failed to parse response")?;

    if let Some(error) = response.error {
        anyhow::bail!("RPC error ({}): {}", error.code, error.message);
    }

    Ok(response.result)
}

fn print_payables(rows: Vec<PayableRow>) {
    if rows.is_empty() {
        println!("{}", "No payables found".yellow());
    } else {
        println!("{}", Table::new(rows));
    }
}

/// Build request params for the command; `None` when it reads a file
fn request_for(command: &Commands) -> Option<(&'static str, Value)> {
    let request = match command {
        Commands::BatchCreate { .. } => return None,
        Commands::Create {
            assignor,
            emission_date,
            value_in_cents,
        } => (
            "payable.create.v1",
            json!({
                "assignorId": assignor,
                "emissionDate": emission_date,
                "valueInCents": value_in_cents,
            }),
        ),
        Commands::Get { id } => ("payable.find_one.v1", json!({ "id": id })),
        Commands::List {
            assignor,
            page,
            items_per_page,
        } => (
            "payable.find_all.v1",
            json!({
                "assignorId": assignor,
                "page": page,
                "itemsPerPage": items_per_page,
            }),
        ),
        Commands::Update {
            id,
            assignor,
            emission_date,
            value_in_cents,
        } => {
            let mut data = serde_json::Map::new();
            if let Some(assignor) = assignor {
                data.insert("assignorId".to_string(), json!(assignor));
            }
            if let Some(date) = emission_date {
                data.insert("emissionDate".to_string(), json!(date));
            }
            if let Some(value) = value_in_cents {
                data.insert("valueInCents".to_string(), json!(value));
            }
            ("payable.update.v1", json!({ "id": id, "data": data }))
        }
        Commands::Remove { id } => ("payable.remove.v1", json!({ "id": id })),
        Commands::AssignorCreate {
            document,
            email,
            phone,
            name,
        } => (
            "assignor.create.v1",
            json!({
                "document": document,
                "email": email,
                "phone": phone,
                "name": name,
            }),
        ),
        Commands::QueueStats => ("admin.queue_stats.v1", json!({})),
    };
    Some(request)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::BatchCreate { file } = &cli.command {
        let raw = std::fs::read_to_string(file).with_context(|| format!("Cannot read {}", file))?;
        let payables: Value = serde_json::from_str(&raw).context("Invalid JSON in batch file")?;
        let count = payables.as_array().map(Vec::len).unwrap_or(0);

        call_rpc(
            &cli.rpc_url,
            "payable.batch_create.v1",
            json!({ "payables": payables }),
        )
        .await?;

        println!(
            "{}",
            format!("✓ Batch of {} payables accepted for processing", count)
                .green()
                .bold()
        );
        return Ok(());
    }

    let Some((method, params)) = request_for(&cli.command) else {
        return Ok(());
    };
    let result = call_rpc(&cli.rpc_url, method, params).await?;

    match cli.command {
        Commands::Create { .. } | Commands::Update { .. } => {
            let row: PayableRow = serde_json::from_value(result)?;
            println!("{}", "✓ Payable saved".green().bold());
            println!();
            print_payables(vec![row]);
        }
        Commands::Get { id } => {
            if result.is_null() {
                println!("{}", format!("Payable {} not found", id).yellow());
            } else {
                print_payables(vec![serde_json::from_value(result)?]);
            }
        }
        Commands::List { .. } => {
            let rows: Vec<PayableRow> = serde_json::from_value(result)?;
            print_payables(rows);
        }
        Commands::Remove { .. } => {
            let message = result["message"].as_str().unwrap_or("Payable deleted");
            println!("{}", format!("✓ {}", message).green().bold());
        }
        Commands::AssignorCreate { .. } => {
            let row: AssignorRow = serde_json::from_value(result)?;
            println!("{}", "✓ Assignor registered".green().bold());
            println!();
            println!("{}", Table::new(vec![row]));
        }
        Commands::QueueStats => {
            println!("{}", "Batch Queue".cyan().bold());
            println!();
            println!("  {} {}", "Queue:".bold(), result["queue"]);
            println!("  {} {}", "Queued:".bold(), result["queued"]);
            println!("  {} {}", "Running:".bold(), result["running"]);
            println!("  {} {}", "Done:".bold(), result["done"]);
            println!("  {} {}", "Failed:".bold(), result["failed"].to_string().red());
        }
        Commands::BatchCreate { .. } => {}
    }

    Ok(())
}
