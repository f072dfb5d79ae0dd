use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where a reply should go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyTarget {
    Direct(String),
    /// Raw group id as delivered by signal-cli (already base64)
    Group(String),
}

impl ReplyTarget {
    /// Recipient string accepted by `/v2/send`
    pub fn recipient(&self) -> String {
        match self {
            ReplyTarget::Direct(number) => number.clone(),
            ReplyTarget::Group(id) => format!("group.{}", STANDARD.encode(id.as_bytes())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub sender: String,
    pub text: String,
    pub timestamp: i64,
    pub reply_to: ReplyTarget,
}

// signal-cli-rest-api receive payload (only the fields we read)

#[derive(Debug, Deserialize)]
struct ReceivedItem {
    envelope: Envelope,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    source: Option<String>,
    source_number: Option<String>,
    #[serde(default)]
    timestamp: i64,
    data_message: Option<DataMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DataMessage {
    message: Option<String>,
    group_info: Option<GroupInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroupInfo {
    group_id: String,
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    message: &'a str,
    number: &'a str,
    recipients: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SignalClient {
    http: Client,
    base_url: String,
    number: String,
}

impl SignalClient {
    pub fn new(base_url: String, number: String) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create Signal HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            number,
        })
    }

    /// Pull pending messages. Receipts, typing notices and attachments
    /// without text are dropped.
    pub async fn receive(&self) -> Result<Vec<IncomingMessage>> {
        let url = format!("{}/v1/receive/{}", self.base_url, self.number);

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Signal API request failed: {url}"))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("Signal API non-2xx: {status} body={text}");
        }

        let body = resp.text().await.context("Failed to read Signal receive body")?;
        parse_received(&body)
    }

    /// Send a reply, split into chunks no longer than `max_chars`
    pub async fn send(&self, target: &ReplyTarget, message: &str, max_chars: usize) -> Result<()> {
        let url = format!("{}/v2/send", self.base_url);
        let recipient = target.recipient();

        for chunk in chunk_reply(message, max_chars) {
            let body = SendRequest {
                message: &chunk,
                number: &self.number,
                recipients: vec![recipient.clone()],
            };

            let resp = self
                .http
                .post(&url)
                .json(&body)
                .send()
                .await
                .with_context(|| format!("Signal API request failed: {url}"))?;

            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            if !status.is_success() {
                anyhow::bail!("Signal API non-2xx: {status} body={text}");
            }
        }
        Ok(())
    }
}

/// Decode a `/v1/receive` body into text messages
pub fn parse_received(body: &str) -> Result<Vec<IncomingMessage>> {
    let items: Vec<ReceivedItem> =
        serde_json::from_str(body).context("Unexpected Signal receive payload")?;

    Ok(items
        .into_iter()
        .filter_map(|item| {
            let env = item.envelope;
            let data = env.data_message?;
            let text = data.message.filter(|m| !m.trim().is_empty())?;
            let sender = env.source_number.or(env.source)?;
            let reply_to = match data.group_info {
                Some(group) => ReplyTarget::Group(group.group_id),
                None => ReplyTarget::Direct(sender.clone()),
            };
            Some(IncomingMessage {
                sender,
                text,
                timestamp: env.timestamp,
                reply_to,
            })
        })
        .collect())
}

/// Split `text` into chunks of at most `max_chars` characters, breaking at
/// line boundaries. A single line longer than the limit is hard-split.
pub fn chunk_reply(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.lines() {
        let line_len = line.chars().count();

        if line_len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = line.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        let needed = if current.is_empty() { line_len } else { current_len + 1 + line_len };
        if needed > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if !current.is_empty() {
            current.push('\n');
            current_len += 1;
        }
        current.push_str(line);
        current_len += line_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
