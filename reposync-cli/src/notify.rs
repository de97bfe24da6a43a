//! Slack progress notifications over `chat.postMessage`.
//!
//! Enabled when `SLACK_BOT_TOKEN` and `SLACK_CHANNEL` are both set. The
//! start message opens a thread; per-pair results and the summary reply in
//! it. Delivery failures are logged and never affect the sync.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use reposync_core::{SyncResult, SyncSpec, SyncStatus, SyncSummary};
use reposync_engine::SyncObserver;

pub const SLACK_POST_MESSAGE_URL: &str = "https://slack.com/api/chat.postMessage";

const LIST_LIMIT: usize = 10;
const SLACK_TIMEOUT: Duration = Duration::from_secs(10);

/// Slack settings read from the environment.
#[derive(Clone)]
pub struct SlackConfig {
    token: String,
    channel: String,
    /// Build messages and log them instead of posting.
    dry_run: bool,
}

impl std::fmt::Debug for SlackConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackConfig")
            .field("channel", &self.channel)
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

impl SlackConfig {
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let token = non_empty("SLACK_BOT_TOKEN")?;
        let Some(channel) = non_empty("SLACK_CHANNEL") else {
            tracing::debug!("[slack] SLACK_BOT_TOKEN set without SLACK_CHANNEL; notifications off");
            return None;
        };
        let dry_run = non_empty("SLACK_DRY_RUN").is_some_and(|v| is_truthy(&v));
        Some(Self {
            token,
            channel,
            dry_run,
        })
    }
}

fn is_truthy(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    ts: Option<String>,
    error: Option<String>,
}

/// [`SyncObserver`] that reports the batch to a Slack channel.
pub struct SlackNotifier {
    config: SlackConfig,
    agent: ureq::Agent,
    source_org: String,
    thread_ts: Option<String>,
}

impl SlackNotifier {
    pub fn new(config: SlackConfig, source_org: &str) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(SLACK_TIMEOUT)
            .user_agent(concat!("reposync/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            config,
            agent,
            source_org: source_org.to_string(),
            thread_ts: None,
        }
    }

    /// Post `text`, threaded under the start message when there is one.
    /// Returns the new message's `ts`.
    fn post(&self, text: &str) -> Result<Option<String>> {
        if self.config.dry_run {
            tracing::info!("[slack] dry run, would post:\n{text}");
            return Ok(None);
        }

        let mut body = json!({
            "channel": self.config.channel,
            "text": text,
            "unfurl_links": false,
        });
        if let Some(ts) = &self.thread_ts {
            body["thread_ts"] = json!(ts);
        }

        let response: PostMessageResponse = self
            .agent
            .post(SLACK_POST_MESSAGE_URL)
            .set("Authorization", &format!("Bearer {}", self.config.token))
            .set("Content-Type", "application/json; charset=utf-8")
            .send_json(body)
            .context("chat.postMessage request failed")?
            .into_json()
            .context("failed to decode chat.postMessage response")?;

        if !response.ok {
            bail!(
                "chat.postMessage rejected: {}",
                response.error.as_deref().unwrap_or("unknown error")
            );
        }
        Ok(response.ts)
    }

    fn deliver(&self, what: &str, text: &str) -> Option<String> {
        match self.post(text) {
            Ok(ts) => {
                tracing::debug!("[slack] {what} notification sent");
                ts
            }
            Err(err) => {
                tracing::debug!("[slack] {what} notification failed: {err:#}");
                None
            }
        }
    }
}

impl SyncObserver for SlackNotifier {
    fn on_batch_start(&mut self, spec: &SyncSpec) {
        let text = start_message(spec, Utc::now());
        self.thread_ts = self.deliver("start", &text);
    }

    fn on_result(&mut self, index: usize, total: usize, result: &SyncResult) {
        let text = result_message(&self.source_org, index, total, result);
        self.deliver(&format!("progress ({})", result.target_slug()), &text);
    }

    fn on_batch_end(&mut self, results: &[SyncResult], elapsed: Duration) {
        let text = summary_message(results, elapsed);
        self.deliver("summary", &text);
    }
}

fn bullet_list(items: impl ExactSizeIterator<Item = String>, noun: &str) -> String {
    let len = items.len();
    let mut lines: Vec<String> = items.take(LIST_LIMIT).map(|i| format!("• {i}")).collect();
    if len > LIST_LIMIT {
        let more = len - LIST_LIMIT;
        lines.push(if noun.is_empty() {
            format!("• ... and {more} more")
        } else {
            format!("• ... and {more} more {noun}")
        });
    }
    lines.join("\n")
}

pub fn start_message(spec: &SyncSpec, started_at: DateTime<Utc>) -> String {
    let targets = spec
        .target_orgs()
        .iter()
        .map(|org| format!("• {org}"))
        .collect::<Vec<_>>()
        .join("\n");
    let repos = bullet_list(spec.repositories().iter().cloned(), "");
    format!(
        ":rocket: *Repository Sync Starting*\n\
         *Source Organization:* {}\n\n\
         *Target Organizations ({}):*\n{targets}\n\n\
         *Repositories ({}):*\n{repos}\n\n\
         *Total Operations:* {}\n\
         *Started:* {}",
        spec.source_org(),
        spec.target_orgs().len(),
        spec.repositories().len(),
        spec.total_operations(),
        started_at.format("%Y-%m-%d %H:%M:%S UTC"),
    )
}

fn status_icon(status: SyncStatus) -> (&'static str, &'static str) {
    match status {
        SyncStatus::Created => (":white_check_mark:", "Created"),
        SyncStatus::Updated => (":arrows_counterclockwise:", "Updated"),
        SyncStatus::Skipped => (":warning:", "Skipped"),
        SyncStatus::Error => (":x:", "Error"),
    }
}

pub fn result_message(source_org: &str, index: usize, total: usize, result: &SyncResult) -> String {
    let (icon, action) = status_icon(result.status);
    let mut text = format!(
        "{icon} *{action}:* {repo} → {target} ({index}/{total})\n\
         *Repository:* {source_org}/{repo}\n\
         *Target:* {slug}",
        repo = result.repo_name,
        target = result.target_org,
        slug = result.target_slug(),
    );
    if !result.message.is_empty() {
        text.push_str(&format!("\n_{}_", result.message));
    }
    text
}

pub fn summary_message(results: &[SyncResult], elapsed: Duration) -> String {
    let summary = SyncSummary::from_results(results);
    let title = if summary.errors > 0 {
        ":x: Repository Sync Completed with Errors"
    } else if summary.skipped > 0 {
        ":warning: Repository Sync Completed with Skipped Repos"
    } else {
        ":white_check_mark: Repository Sync Completed Successfully"
    };

    let secs = elapsed.as_secs();
    let mut text = format!(
        "*{title}*\n\
         *Summary:*\n\
         • Total operations: {}\n\
         • Created: {}\n\
         • Updated: {}\n\
         • Skipped: {}\n\
         • Errors: {}\n\
         • Duration: {}m {}s",
        summary.total,
        summary.created,
        summary.updated,
        summary.skipped,
        summary.errors,
        secs / 60,
        secs % 60,
    );

    for (status, heading, noun) in [
        (SyncStatus::Error, "Errors", "errors"),
        (SyncStatus::Skipped, "Skipped", "skipped"),
    ] {
        let lines: Vec<String> = results
            .iter()
            .filter(|r| r.status == status)
            .map(|r| format!("{}: {}", r.target_slug(), r.message))
            .collect();
        if !lines.is_empty() {
            text.push_str(&format!("\n\n*{heading}:*\n"));
            text.push_str(&bullet_list(lines.into_iter(), noun));
        }
    }
    text
}
