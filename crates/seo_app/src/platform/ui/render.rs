use colored::Colorize;
use seo_core::{find_agent, AppViewModel, LogEntry, LogKind, ResultSet, SessionStatus};
use serde_json::Value;

/// What has already been written to the terminal for the current view.
#[derive(Debug, Default)]
pub struct RenderCursor {
    printed_entries: usize,
    progress: Option<(u8, String)>,
    banner_shown: bool,
}

/// Lines to print for everything that changed since the last call.
pub fn render(view: &AppViewModel, cursor: &mut RenderCursor) -> Vec<String> {
    let mut lines = Vec::new();

    // A new session clears the log.
    if view.log.len() < cursor.printed_entries {
        cursor.printed_entries = 0;
    }

    match (&view.banner, cursor.banner_shown) {
        (Some(banner), false) => {
            lines.extend(banner_box(banner));
            cursor.banner_shown = true;
        }
        (None, true) => cursor.banner_shown = false,
        _ => {}
    }

    for entry in &view.log[cursor.printed_entries..] {
        lines.push(format_entry(entry));
    }
    cursor.printed_entries = view.log.len();

    let progress = (view.progress_percent, view.progress_message.clone());
    if view.status == SessionStatus::Running && cursor.progress.as_ref() != Some(&progress) {
        if !progress.1.is_empty() || progress.0 > 0 {
            lines.push(format_progress(progress.0, &progress.1));
        }
        cursor.progress = Some(progress);
    }

    lines
}

fn format_entry(entry: &LogEntry) -> String {
    let tag = match entry.kind {
        LogKind::Info => "info".blue(),
        LogKind::Success => "done".green(),
        LogKind::Warning => "warn".yellow(),
        LogKind::Error => "fail".red(),
    };
    format!("{} [{}] {}", entry.timestamp.dimmed(), tag, entry.message)
}

fn format_progress(percent: u8, message: &str) -> String {
    const WIDTH: usize = 20;
    let filled = usize::from(percent.min(100)) * WIDTH / 100;
    let bar = format!("{}{}", "#".repeat(filled), "-".repeat(WIDTH - filled));
    if message.is_empty() {
        format!("[{}] {:>3}%", bar.cyan(), percent)
    } else {
        format!("[{}] {:>3}% {}", bar.cyan(), percent, message)
    }
}

fn banner_box(message: &str) -> Vec<String> {
    let width = message.chars().count() + 2;
    let edge = format!("+{}+", "-".repeat(width));
    vec![
        edge.yellow().to_string(),
        format!("{} {} {}", "|".yellow(), message.bold(), "|".yellow()),
        edge.yellow().to_string(),
    ]
}

/// Final per-URL summary of the merged results.
pub fn render_results(results: &ResultSet) -> Vec<String> {
    if results.is_empty() {
        return vec!["No results received.".dimmed().to_string()];
    }

    let mut lines = Vec::new();
    for url in results.urls() {
        lines.push(url.bold().underline().to_string());
        for (agent_id, result) in results.agents(url) {
            let name = find_agent(agent_id).map_or(agent_id, |agent| agent.name);
            let fields: Vec<String> = result
                .iter()
                .filter(|(key, _)| key.as_str() != "formatted")
                .map(|(key, value)| format!("{key}={}", summarize(value)))
                .collect();
            if fields.is_empty() {
                lines.push(format!("  {}", name.green()));
            } else {
                lines.push(format!("  {}: {}", name.green(), fields.join(", ")));
            }
        }
    }
    lines
}

fn summarize(value: &Value) -> String {
    const MAX: usize = 60;
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => format!("[{} items]", items.len()),
        Value::Object(map) => format!("{{{} fields}}", map.len()),
        other => other.to_string(),
    };
    if text.chars().count() > MAX {
        let cut: String = text.chars().take(MAX).collect();
        format!("{cut}...")
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn entry(kind: LogKind, message: &str) -> LogEntry {
        LogEntry {
            kind,
            message: message.into(),
            timestamp: "10:00:00".into(),
        }
    }

    fn running_view() -> AppViewModel {
        AppViewModel {
            status: SessionStatus::Running,
            ..AppViewModel::default()
        }
    }

    #[test]
    fn only_new_log_entries_are_printed() {
        colored::control::set_override(false);
        let mut cursor = RenderCursor::default();
        let mut view = running_view();
        view.log.push(entry(LogKind::Info, "Starting crawl..."));

        assert_eq!(
            render(&view, &mut cursor),
            vec!["10:00:00 [info] Starting crawl...".to_string()]
        );

        view.log.push(entry(LogKind::Success, "Completed crawl"));
        assert_eq!(
            render(&view, &mut cursor),
            vec!["10:00:00 [done] Completed crawl".to_string()]
        );
        assert!(render(&view, &mut cursor).is_empty());
    }

    #[test]
    fn progress_is_printed_when_it_changes() {
        colored::control::set_override(false);
        let mut cursor = RenderCursor::default();
        let mut view = running_view();
        view.progress_percent = 50;
        view.progress_message = "Halfway".into();

        assert_eq!(
            render(&view, &mut cursor),
            vec!["[##########----------]  50% Halfway".to_string()]
        );
        assert!(render(&view, &mut cursor).is_empty());
    }

    #[test]
    fn banner_is_boxed_once() {
        colored::control::set_override(false);
        let mut cursor = RenderCursor::default();
        let mut view = running_view();
        view.banner = Some("Set the key".into());

        let lines = render(&view, &mut cursor);
        assert_eq!(
            lines,
            vec![
                "+-------------+".to_string(),
                "| Set the key |".to_string(),
                "+-------------+".to_string(),
            ]
        );
        assert!(render(&view, &mut cursor).is_empty());
    }

    #[test]
    fn results_summary_lists_agents_per_url() {
        colored::control::set_override(false);
        let mut results = ResultSet::new();
        let partial = json!({"title": "Home", "formatted": {"x": 1}, "issues": [1, 2]});
        if let Value::Object(map) = partial {
            results.merge_agent_result("https://example.com", "meta", map);
        }

        assert_eq!(
            render_results(&results),
            vec![
                "https://example.com".to_string(),
                "  Meta Tag Optimizer: issues=[2 items], title=Home".to_string(),
            ]
        );
    }
}
