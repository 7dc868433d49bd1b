use anyhow::{bail, Result};
use pxweb_viewer::{
    parse,
    schema::{TableEntry, TableMetadata},
    Config, StatsClient,
};
use std::env;
use tracing_subscriber::{fmt, EnvFilter};

const USAGE: &str = "Usage: pxweb-explore [list | meta <ID> | search <KEYWORD> | data <ID>]";

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(env_filter).init();

    let client = StatsClient::new(
        config.base_url.clone(),
        config.language.clone(),
        config.timeout,
    )?;

    let mut args = env::args().skip(1);
    let command = args.next().unwrap_or_else(|| "list".to_string());
    let arg = args.next();

    println!("{}", "=".repeat(60));
    println!("PX-Web: {}{}", client.base_url(), client.language());
    println!("{}", "=".repeat(60));

    match (command.as_str(), arg) {
        ("list", _) => list(&client).await,
        ("meta", Some(id)) => meta(&client, &id).await,
        ("search", Some(keyword)) => search(&client, &keyword).await,
        ("data", Some(id)) => data(&client, &id, config.row_limit).await,
        _ => bail!(USAGE),
    }
}

async fn list(client: &StatsClient) -> Result<()> {
    let entries = client.list_entries().await.unwrap_or_default();
    println!("Entries: {}", entries.len());
    for entry in entries.iter().take(5) {
        print_entry(entry);
    }
    if entries.len() > 5 {
        println!("  ... and {} more", entries.len() - 5);
    }
    Ok(())
}

async fn meta(client: &StatsClient, id: &str) -> Result<()> {
    match client.get_metadata(id).await {
        Ok(TableMetadata {
            title,
            updated,
            variables,
            ..
        }) => {
            println!("Title:     {}", title);
            println!("Updated:   {}", updated.as_deref().unwrap_or("N/A"));
            println!("Variables: {}", variables.len());
            for v in &variables {
                println!("  - {} ({})", v.code, v.text.as_deref().unwrap_or(""));
            }
        }
        Err(e) => println!("Metadata unavailable: {}", e),
    }
    Ok(())
}

async fn search(client: &StatsClient, keyword: &str) -> Result<()> {
    println!("Searching for {:?} (one request per folder, this can take a while)", keyword);
    let found = client.search(keyword).await.unwrap_or_default();
    println!("Matches: {}", found.len());
    for entry in &found {
        print_entry(entry);
    }
    Ok(())
}

async fn data(client: &StatsClient, id: &str, limit: Option<usize>) -> Result<()> {
    match client.get_data(id, None).await {
        Ok(table) => {
            let rows = parse::flatten(&table, limit);
            println!("Rows: {} of {}", rows.len(), table.data.len());
            for row in rows {
                let cells: Vec<String> = row.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
                println!("  {}", cells.join(", "));
            }
        }
        Err(e) => println!("Data unavailable: {}", e),
    }
    Ok(())
}

fn print_entry(entry: &TableEntry) {
    println!("  - {:<6} {} [{}]", entry.kind.label(), entry.text, entry.id);
}
