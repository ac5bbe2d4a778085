use anyhow::Result;
use clap::Parser;
use tokio::io::{ AsyncBufReadExt, AsyncWriteExt, BufReader };
use tracing::{ error, info };
use tracing_subscriber::{ layer::SubscriberExt, util::SubscriberInitExt };

use jobgenie::config::{ Cli, Command, OutputFormat, Settings };
use jobgenie::{ app, render, App, Page };

const QUIT: &str = ":quit";

fn print_page(page: &Page, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => println!("{}", render::render_text(page)),
        OutputFormat::Json => println!("{}", render::render_json(page)?),
    }
    Ok(())
}

async fn search_once(app: &App, settings: &Settings, query: &str) -> Result<()> {
    let page = app.run_search(query, settings.top_k, settings.api_key()).await?;
    print_page(&page, settings.format)
}

async fn repl(app: &App, settings: &Settings) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"query> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim() == QUIT {
            break;
        }

        // A failed action is reported and the session goes on.
        if let Err(e) = search_once(app, settings, &line).await {
            error!("Search for {:?} failed: {:#}", line, e);
        }
    }

    info!("Session closed");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber
        ::registry()
        .with(
            tracing_subscriber::EnvFilter
                ::try_from_default_env()
                .unwrap_or_else(|_| "jobgenie=info".into())
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if cli.settings.api_key().is_none() {
        info!("No OpenAI API key configured; AI analysis will be skipped");
    }

    let app = app::bootstrap(&cli.settings)?;

    match &cli.command {
        Command::Search { query } => search_once(&app, &cli.settings, query).await?,
        Command::Repl => repl(&app, &cli.settings).await?,
    }

    Ok(())
}
