use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use url_tester::config::ExecutorConfig;
use url_tester::loadtest::{run_all, BatchExecutor, RequestSpec, ResultRecord};

#[derive(Parser)]
#[command(name = "url-tester-cli")]
#[command(about = "Run URL load tests locally or against a url-tester server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the specs in-process and print the results
    Run {
        /// JSON file holding an array of specs
        #[arg(short, long)]
        file: PathBuf,

        /// Per-attempt timeout in seconds
        #[arg(long, default_value_t = 10)]
        attempt_timeout: u64,
    },
    /// Submit the specs to a running server
    Submit {
        /// JSON file holding an array of specs
        #[arg(short, long)]
        file: PathBuf,

        #[arg(short, long, default_value = "http://localhost:4044")]
        server: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { file, attempt_timeout } => {
            let specs = read_specs(&file)?;
            let config = ExecutorConfig {
                attempt_timeout_secs: attempt_timeout,
                ..ExecutorConfig::default()
            };
            let executor = BatchExecutor::new(&config)?;
            let records = run_all(&executor, &specs).await?;
            print_records(&records)?;
        }
        Commands::Submit { file, server } => {
            let specs = read_specs(&file)?;
            let res = reqwest::Client::new()
                .post(format!("{}/test/post", server.trim_end_matches('/')))
                .json(&specs)
                .send()
                .await?;

            let status = res.status();
            if !status.is_success() {
                let text = res.text().await.unwrap_or_default();
                return Err(submit_error(status, &text).into());
            }

            let records: Vec<ResultRecord> = res.json().await?;
            print_records(&records)?;
        }
    }

    Ok(())
}

fn submit_error(status: reqwest::StatusCode, body: &str) -> String {
    if body.is_empty() {
        format!("server returned status {}", status)
    } else {
        format!("server returned status {}: {}", status, body)
    }
}

fn read_specs(path: &Path) -> Result<Vec<RequestSpec>, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn print_records(records: &[ResultRecord]) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(records)?);
    Ok(())
}
