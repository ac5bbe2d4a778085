use std::convert::Infallible;
use std::path::PathBuf;

use clap::{ Args, Parser, Subcommand, ValueEnum };

use crate::index::MAX_TOP_K;
use crate::pipeline::DEFAULT_TOP_K;
use crate::summarizer::{ ApiKey, DEFAULT_API_BASE, DEFAULT_CHAT_MODEL };

pub const DEFAULT_QUERY: &str = "Data Scientist";

#[derive(Parser, Debug)]
#[command(
    name = "jobgenie",
    version,
    about = "Semantic job search over a prebuilt index, with market insights and an optional AI analysis"
)]
pub struct Cli {
    #[command(flatten)]
    pub settings: Settings,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Run one search and print the results page
    Search {
        /// Job-related question or role
        #[arg(default_value = DEFAULT_QUERY)]
        query: String,
    },
    /// Read one query per line from stdin until EOF or `:quit`
    Repl,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Args, Debug, Clone)]
pub struct Settings {
    /// Prebuilt vector index (bincode)
    #[arg(long, env = "JOBGENIE_INDEX", default_value = "job_index.bin", global = true)]
    pub index: PathBuf,

    /// Row-id to job record mapping (JSON)
    #[arg(long, env = "JOBGENIE_METADATA", default_value = "job_metadata.json", global = true)]
    pub metadata: PathBuf,

    /// Directory for the downloaded embedding model
    #[arg(long, env = "JOBGENIE_MODEL_CACHE", global = true)]
    pub model_cache: Option<PathBuf>,

    /// Number of nearest postings to retrieve
    #[arg(long, default_value_t = DEFAULT_TOP_K, value_parser = parse_top_k, global = true)]
    pub top_k: usize,

    /// OpenAI API key; without it the AI analysis is skipped
    #[arg(
        long,
        env = "OPENAI_API_KEY",
        hide_env_values = true,
        value_parser = parse_api_key,
        global = true
    )]
    pub openai_api_key: Option<ApiKey>,

    /// Chat model used for the market analysis
    #[arg(long, env = "JOBGENIE_CHAT_MODEL", default_value = DEFAULT_CHAT_MODEL, global = true)]
    pub model: String,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, env = "JOBGENIE_API_BASE", default_value = DEFAULT_API_BASE, global = true)]
    pub api_base: String,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    pub format: OutputFormat,
}

impl Settings {
    pub fn model_cache_dir(&self) -> Option<PathBuf> {
        self.model_cache.clone().or_else(|| dirs::cache_dir().map(|dir| dir.join("jobgenie").join("models")))
    }

    /// The configured key, if it is non-blank.
    pub fn api_key(&self) -> Option<&ApiKey> {
        self.openai_api_key.as_ref().filter(|key| !key.is_empty())
    }
}

fn parse_top_k(raw: &str) -> Result<usize, String> {
    let top_k: usize = raw.parse().map_err(|e| format!("{}", e))?;
    if (1..=MAX_TOP_K).contains(&top_k) {
        Ok(top_k)
    } else {
        Err(format!("must be between 1 and {}", MAX_TOP_K))
    }
}

fn parse_api_key(raw: &str) -> Result<ApiKey, Infallible> {
    Ok(ApiKey::new(raw))
}
