use clap::{Parser, Subcommand};
use reqwest::{Client, RequestBuilder};

#[derive(Parser)]
#[command(name = "job-search-cli")]
#[command(about = "Job search service CLI", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080", env = "JOB_SEARCH_ENDPOINT")]
    endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drop and reload the job index from the canonical source
    Rebuild,

    /// Fuzzy search job titles
    Search {
        #[arg(value_name = "KEYWORD")]
        keyword: String,
    },

    /// Count and list the jobs of one department
    Department {
        #[arg(value_name = "ISOCODE")]
        isocode: String,
    },

    /// Check server health
    Health,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = Client::new();
    let endpoint = cli.endpoint.trim_end_matches('/');

    let request = match cli.command {
        Commands::Rebuild => client.get(format!("{}/index-jobs", endpoint)),

        Commands::Search { keyword } => client
            .get(format!("{}/search-jobs", endpoint))
            .query(&[("keyword", keyword)]),

        Commands::Department { isocode } => client
            .get(format!("{}/jobs-by-department", endpoint))
            .query(&[("isocode", isocode)]),

        Commands::Health => client.get(format!("{}/health", endpoint)),
    };

    print_response(request).await
}

async fn print_response(request: RequestBuilder) -> anyhow::Result<()> {
    let response = request.send().await?;
    let status = response.status();

    let body: serde_json::Value = response.json().await?;
    println!("{}", serde_json::to_string_pretty(&body)?);

    if !status.is_success() {
        anyhow::bail!("server returned {}", status);
    }
    Ok(())
}
