use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use log::LevelFilter;

use crate::platform::logging::LogDestination;

/// Command-line client for the AI SEO analysis backend.
#[derive(Debug, Parser)]
#[command(name = "seo", version, about)]
pub struct Cli {
    /// Backend base URL (overrides SEO_API_URL).
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Directory holding the saved sign-in session.
    #[arg(long, global = true, env = "SEO_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// Also write developer logs to this file.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Increase developer log verbosity (-v, -vv).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    pub fn log_destination(&self) -> LogDestination {
        match &self.log_file {
            Some(path) if self.verbose > 0 => LogDestination::Both(path.clone()),
            Some(path) => LogDestination::File(path.clone()),
            None => LogDestination::Terminal,
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 if self.log_file.is_some() => LevelFilter::Info,
            0 => LevelFilter::Warn,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the analysis agents.
    Agents,
    /// Stream a live analysis of a URL or sitemap.
    Analyze(AnalyzeArgs),
    /// Sign in and remember the session.
    Login {
        #[arg(long)]
        email: Option<String>,
    },
    /// Create an account and remember the session.
    Signup {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Forget the saved session.
    Logout,
    /// Verify the saved session with the backend.
    Whoami,
    /// Research related keywords.
    Keywords(KeywordArgs),
    /// Generate a blog post.
    Blog(BlogArgs),
    /// Browse stored analysis reports.
    Results {
        #[command(subcommand)]
        command: ResultsCommand,
    },
    /// Show the product demo video link.
    Demo,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Page URL or sitemap URL.
    pub target: String,

    /// Comma-separated agent ids; `crawl` is always included.
    #[arg(long, value_delimiter = ',')]
    pub agents: Vec<String>,

    /// Skip an agent from the default selection.
    #[arg(long = "without", value_delimiter = ',')]
    pub without: Vec<String>,

    /// Save the merged results as JSON into this directory.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Print the merged results as JSON when done.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct KeywordArgs {
    pub keyword: String,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long)]
    pub limit: Option<u32>,
}

#[derive(Debug, Args)]
pub struct BlogArgs {
    pub topic: String,
    /// Target keyword; repeat for several.
    #[arg(long = "keyword")]
    pub keywords: Vec<String>,
    #[arg(long)]
    pub tone: Option<String>,
    #[arg(long)]
    pub words: Option<u32>,
    /// Write the post as markdown to this file.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum ResultsCommand {
    /// List stored reports.
    List,
    /// Show one report version, optionally downloading its artifact.
    Show {
        id: String,
        version: u32,
        /// Directory to save the JSON/PDF artifact into.
        #[arg(long)]
        download: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_parses_agent_lists() {
        let cli = Cli::parse_from([
            "seo",
            "analyze",
            "https://example.com",
            "--agents",
            "meta,schema",
            "--json",
        ]);
        match cli.command {
            Command::Analyze(args) => {
                assert_eq!(args.target, "https://example.com");
                assert_eq!(args.agents, vec!["meta", "schema"]);
                assert!(args.json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn verbosity_selects_level_and_destination() {
        let cli = Cli::parse_from(["seo", "-vv", "agents"]);
        assert_eq!(cli.log_level(), LevelFilter::Trace);
        assert!(matches!(cli.log_destination(), LogDestination::Terminal));

        let cli = Cli::parse_from(["seo", "--log-file", "seo.log", "agents"]);
        assert_eq!(cli.log_level(), LevelFilter::Info);
        assert!(matches!(cli.log_destination(), LogDestination::File(_)));
    }
}
