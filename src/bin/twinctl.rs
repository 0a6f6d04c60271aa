use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "twinctl")]
#[command(about = "Management CLI for the twinning coordinator", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check coordinator status
    Status,
    /// Show the aggregate health report for every backend
    Backends,
    /// Show reachability of one backend
    Backend {
        name: String,
    },
    /// Dry-run a wish through the policy gate
    Evaluate {
        #[arg(long)]
        objective: String,
        #[arg(long, default_value = "")]
        domain: String,
        #[arg(long, default_value = "")]
        actor: String,
        /// Declared safeguard tag (repeatable)
        #[arg(long = "safeguard")]
        safeguards: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let res = match cli.command {
        Commands::Status => client.get(format!("{base}/health")).send().await?,
        Commands::Backends => client.get(format!("{base}/health/all")).send().await?,
        Commands::Backend { name } => client.get(format!("{base}/backends/{name}")).send().await?,
        Commands::Evaluate {
            objective,
            domain,
            actor,
            safeguards,
        } => {
            let wish = json!({
                "objective": objective,
                "domain": domain,
                "actor_identity": actor,
                "declared_safeguards": safeguards,
            });
            client
                .post(format!("{base}/evaluate"))
                .json(&wish)
                .send()
                .await?
        }
    };
    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: coordinator returned status {}", status);
    }
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }
    Ok(())
}
