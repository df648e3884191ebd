use std::future::Future;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use colored::Colorize;
use dialoguer::{Input, Password};
use seo_core::{find_agent, AgentSelection, SessionStatus, AGENT_CATALOG, REQUIRED_AGENT};
use seo_engine::{
    report_filename, ApiClient, AtomicFileWriter, AuthSession, BlogRequest, ClientConfig,
    KeywordRequest,
};
use seo_logging::{seo_info, seo_warn};

use crate::cli::{AnalyzeArgs, BlogArgs, Cli, Command, KeywordArgs, ResultsCommand};
use crate::platform::app::{AnalysisApp, AnalysisRequest};
use crate::platform::effects::EffectRunner;
use crate::platform::persistence::{clear_session, default_state_dir, load_session, save_session};
use crate::platform::ui::render::render_results;

struct AppContext {
    config: ClientConfig,
    state_dir: PathBuf,
}

pub fn run(cli: Cli) -> Result<()> {
    let mut config = ClientConfig::from_env().context("invalid SEO_* environment")?;
    if let Some(url) = &cli.api_url {
        config = config.with_api_url(url).context("invalid --api-url")?;
    }
    let ctx = AppContext {
        config,
        state_dir: cli.state_dir.clone().unwrap_or_else(default_state_dir),
    };
    seo_info!(
        "api={} state_dir={:?}",
        ctx.config.api_base_url,
        ctx.state_dir
    );

    match cli.command {
        Command::Agents => list_agents(),
        Command::Analyze(args) => analyze(&ctx, args),
        Command::Login { email } => login(&ctx, email),
        Command::Signup { name, email } => signup(&ctx, name, email),
        Command::Logout => logout(&ctx),
        Command::Whoami => whoami(&ctx),
        Command::Keywords(args) => keywords(&ctx, args),
        Command::Blog(args) => blog(&ctx, args),
        Command::Results { command } => results(&ctx, command),
        Command::Demo => demo(&ctx),
    }
}

fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    Ok(runtime.block_on(future))
}

fn require_session(ctx: &AppContext) -> Result<AuthSession> {
    match load_session(&ctx.state_dir) {
        Some(session) => Ok(session),
        None => bail!("Sign in first with `seo login`"),
    }
}

fn api_client(ctx: &AppContext) -> Result<ApiClient> {
    ApiClient::new(&ctx.config.api_settings()).context("failed to build HTTP client")
}

fn list_agents() -> Result<()> {
    for agent in AGENT_CATALOG {
        let marker = if agent.required {
            " (required)".dimmed().to_string()
        } else {
            String::new()
        };
        println!(
            "{} {}{}\n           {}",
            format!("{:<10}", agent.id).bold(),
            agent.name,
            marker,
            agent.description.dimmed()
        );
    }
    Ok(())
}

/// Explicit `--agents` wins; otherwise every agent minus `--without`.
fn resolve_agents(args: &AnalyzeArgs) -> Result<Vec<String>> {
    let trimmed = |ids: &[String]| -> Vec<String> {
        ids.iter()
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .collect()
    };
    let agents = trimmed(&args.agents);
    let without = trimmed(&args.without);

    for id in agents.iter().chain(&without) {
        if find_agent(id).is_none() {
            bail!("Unknown agent `{}`; run `seo agents` for the list", id);
        }
    }
    if without.iter().any(|id| id == REQUIRED_AGENT) {
        seo_warn!("`{}` cannot be deselected", REQUIRED_AGENT);
    }

    let mut selection = AgentSelection::default();
    if !agents.is_empty() {
        selection.replace(agents.as_slice());
    }
    for id in &without {
        if selection.contains(id) {
            selection.toggle(id);
        }
    }
    Ok(selection.ids())
}

fn analyze(ctx: &AppContext, args: AnalyzeArgs) -> Result<()> {
    let session = require_session(ctx)?;
    let agents = resolve_agents(&args)?;

    let runner = EffectRunner::new(&ctx.config)?;
    let app = AnalysisApp::new(&runner, ctx.config.max_reconnects);
    let outcome = app.run(AnalysisRequest {
        target: args.target.clone(),
        agents,
        token: Some(session.token),
    });
    if outcome.parse_failures > 0 {
        seo_warn!("{} malformed events were ignored", outcome.parse_failures);
    }

    println!();
    for line in render_results(&outcome.results) {
        println!("{line}");
    }

    let json = serde_json::to_string_pretty(&outcome.results.to_json())?;
    if let Some(dir) = &args.output_dir {
        let writer = AtomicFileWriter::new(dir.clone());
        let path = writer
            .write(&report_filename(&args.target, "json"), json.as_bytes())
            .with_context(|| format!("failed to save results into {}", dir.display()))?;
        println!("Saved results to {}", path.display());
    }
    if args.json {
        println!("{json}");
    }

    match outcome.status {
        SessionStatus::Completed => Ok(()),
        SessionStatus::Failed => bail!("Analysis failed"),
        SessionStatus::Idle | SessionStatus::Running => bail!("Analysis did not start"),
    }
}

fn prompt_email(email: Option<String>) -> Result<String> {
    match email {
        Some(email) => Ok(email),
        None => Input::<String>::new()
            .with_prompt("Email")
            .interact_text()
            .context("failed to read email"),
    }
}

fn prompt_password() -> Result<String> {
    Password::new()
        .with_prompt("Password")
        .interact()
        .context("failed to read password")
}

fn remember(ctx: &AppContext, session: &AuthSession) -> Result<()> {
    if !save_session(&ctx.state_dir, session) {
        bail!("Could not save the session under {}", ctx.state_dir.display());
    }
    println!("Signed in as {}", session.user.email.bold());
    Ok(())
}

fn login(ctx: &AppContext, email: Option<String>) -> Result<()> {
    let email = prompt_email(email)?;
    let password = prompt_password()?;
    let client = api_client(ctx)?;
    let session = block_on(client.sign_in(&email, &password))?.context("sign in failed")?;
    remember(ctx, &session)
}

fn signup(ctx: &AppContext, name: Option<String>, email: Option<String>) -> Result<()> {
    let name = match name {
        Some(name) => name,
        None => Input::<String>::new()
            .with_prompt("Name")
            .interact_text()
            .context("failed to read name")?,
    };
    let email = prompt_email(email)?;
    let password = prompt_password()?;
    let client = api_client(ctx)?;
    let session =
        block_on(client.sign_up(&name, &email, &password))?.context("sign up failed")?;
    remember(ctx, &session)
}

fn logout(ctx: &AppContext) -> Result<()> {
    if clear_session(&ctx.state_dir) {
        println!("Signed out.");
    } else {
        println!("No saved session.");
    }
    Ok(())
}

fn whoami(ctx: &AppContext) -> Result<()> {
    let session = require_session(ctx)?;
    let client = api_client(ctx)?;
    let user = block_on(client.verify(&session.token))?.context("session is no longer valid")?;
    match &user.name {
        Some(name) => println!("{} <{}>", name, user.email),
        None => println!("{}", user.email),
    }
    Ok(())
}

fn keywords(ctx: &AppContext, args: KeywordArgs) -> Result<()> {
    let session = require_session(ctx)?;
    let client = api_client(ctx)?.with_token(session.token);
    let request = KeywordRequest {
        keyword: args.keyword,
        location: args.location,
        limit: args.limit,
    };
    let report =
        block_on(client.research_keywords(&request))?.context("keyword research failed")?;

    println!("Keywords related to {}", report.keyword.bold());
    for idea in &report.keywords {
        let volume = idea
            .search_volume
            .map_or_else(|| "-".to_string(), |v| v.to_string());
        let difficulty = idea
            .difficulty
            .map_or_else(|| "-".to_string(), |d| format!("{d:.0}"));
        println!(
            "  {:<40} volume {:>8}  difficulty {:>3}  {}",
            idea.keyword,
            volume,
            difficulty,
            idea.intent.as_deref().unwrap_or("").dimmed()
        );
    }
    Ok(())
}

fn blog(ctx: &AppContext, args: BlogArgs) -> Result<()> {
    let session = require_session(ctx)?;
    let client = api_client(ctx)?.with_token(session.token);
    let request = BlogRequest {
        topic: args.topic,
        keywords: args.keywords,
        tone: args.tone,
        word_count: args.words,
    };
    let post = block_on(client.generate_blog(&request))?.context("blog generation failed")?;

    match &args.output {
        Some(path) => {
            let markdown = format!("# {}\n\n{}\n", post.title, post.content);
            write_file(path, markdown.as_bytes())?;
            println!("Saved \"{}\" to {}", post.title, path.display());
        }
        None => {
            println!("{}\n", post.title.bold());
            if let Some(description) = &post.meta_description {
                println!("{}\n", description.dimmed());
            }
            println!("{}", post.content);
        }
    }
    Ok(())
}

fn results(ctx: &AppContext, command: ResultsCommand) -> Result<()> {
    let session = require_session(ctx)?;
    let client = api_client(ctx)?.with_token(session.token);

    match command {
        ResultsCommand::List => {
            let summaries = block_on(client.list_results())?.context("failed to list results")?;
            if summaries.is_empty() {
                println!("No stored results.");
            }
            for summary in summaries {
                let versions: Vec<String> =
                    summary.versions.iter().map(|v| format!("v{v}")).collect();
                println!(
                    "{}  {}  {}  {}",
                    summary.id.bold(),
                    summary.url,
                    summary.created_at.as_deref().unwrap_or("-").dimmed(),
                    versions.join(" ")
                );
            }
        }
        ResultsCommand::Show {
            id,
            version,
            download,
        } => {
            let report = block_on(client.result_version(&id, version))?
                .with_context(|| format!("failed to load result {id} v{version}"))?;
            println!(
                "{} v{} ({}) {}",
                report.id.bold(),
                report.version,
                report.format.extension(),
                report.created_at.as_deref().unwrap_or("")
            );
            println!("{}", report.report_url);
            if !report.metadata.is_null() {
                println!("{}", serde_json::to_string_pretty(&report.metadata)?);
            }

            if let Some(dir) = download {
                let bytes = block_on(client.download_artifact(&report.report_url))?
                    .context("failed to download report")?;
                let filename = format!(
                    "{}-v{}.{}",
                    report.id,
                    report.version,
                    report.format.extension()
                );
                let path = AtomicFileWriter::new(dir.clone())
                    .write(&filename, &bytes)
                    .with_context(|| format!("failed to save report into {}", dir.display()))?;
                println!("Saved {}", path.display());
            }
        }
    }
    Ok(())
}

fn demo(ctx: &AppContext) -> Result<()> {
    match &ctx.config.demo_video_url {
        Some(url) => println!("Demo video: {url}"),
        None => println!("No demo video configured (set SEO_DEMO_VIDEO_URL)."),
    }
    Ok(())
}

fn write_file(path: &Path, content: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .context("output path has no file name")?;
    AtomicFileWriter::new(dir)
        .write(filename, content)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(agents: &[&str], without: &[&str]) -> AnalyzeArgs {
        AnalyzeArgs {
            target: "https://example.com".into(),
            agents: agents.iter().map(|s| s.to_string()).collect(),
            without: without.iter().map(|s| s.to_string()).collect(),
            output_dir: None,
            json: false,
        }
    }

    #[test]
    fn default_selection_is_every_agent() {
        let agents = resolve_agents(&args(&[], &[])).unwrap();
        assert_eq!(agents.len(), AGENT_CATALOG.len());
        assert_eq!(agents[0], REQUIRED_AGENT);
    }

    #[test]
    fn without_removes_optional_agents_only() {
        let agents = resolve_agents(&args(&[], &["schema", "crawl"])).unwrap();
        assert!(agents.contains(&"crawl".to_string()));
        assert!(!agents.contains(&"schema".to_string()));
    }

    #[test]
    fn explicit_agents_keep_crawl() {
        let agents = resolve_agents(&args(&["meta"], &[])).unwrap();
        assert_eq!(agents, vec!["crawl".to_string(), "meta".to_string()]);
    }

    #[test]
    fn agent_ids_with_surrounding_spaces_are_kept() {
        let agents = resolve_agents(&args(&["meta", " schema"], &[" keyword "])).unwrap();
        assert_eq!(
            agents,
            vec!["crawl".to_string(), "meta".to_string(), "schema".to_string()]
        );
    }

    #[test]
    fn unknown_agents_are_rejected() {
        assert!(resolve_agents(&args(&["sitemapper"], &[])).is_err());
    }
}
