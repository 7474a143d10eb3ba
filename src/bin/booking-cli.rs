use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "booking-cli")]
#[command(about = "Inspection CLI for the lesson booking API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List lessons with remaining spaces
    Lessons,
    /// Add a signed delta to a lesson's spaces
    Adjust {
        id: u32,
        #[arg(allow_hyphen_values = true)]
        delta: i64,
    },
    /// Show recent requests, newest first
    Logs {
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Show one request log entry
    Log { id: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Lessons => client.get(format!("{base}/api/lessons")).send().await?,
        Commands::Adjust { id, delta } => {
            client
                .put(format!("{base}/api/lessons/{id}/spaces"))
                .json(&json!({ "delta": delta }))
                .send()
                .await?
        }
        Commands::Logs { limit } => {
            let mut req = client.get(format!("{base}/api/logs"));
            if let Some(limit) = limit {
                req = req.query(&[("limit", limit)]);
            }
            req.send().await?
        }
        Commands::Log { id } => client.get(format!("{base}/api/logs/{id}")).send().await?,
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let json: Value = res.json().await.unwrap_or(Value::Null);

    if !status.is_success() {
        eprintln!("Error: API returned status {}", status);
        if let Some(message) = json.get("message").and_then(Value::as_str) {
            eprintln!("Message: {}", message);
        }
        return Ok(());
    }

    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
