// src/channel/discord.rs

//! Discord REST implementation of [`MessageChannel`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

use super::{ChannelMessage, MessageChannel};
use crate::error::{AppError, Result};
use crate::models::DiscordConfig;

/// Largest page the messages endpoint returns.
const MAX_FETCH: usize = 100;
const MAX_ATTEMPTS: usize = 2;

#[derive(Debug, Deserialize)]
struct RawUser {
    id: String,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    id: String,
    #[serde(default)]
    content: String,
    author: RawUser,
}

#[derive(Debug, Deserialize)]
struct RateLimited {
    retry_after: f64,
}

/// What to do with a response that did not succeed.
#[derive(Debug)]
enum Failure {
    /// Rate limited; retry after the given wait.
    RateLimited(Duration),
    Rejected(AppError),
}

/// Map a non-success status and its body to a retry or an error.
fn classify(operation: &str, status: StatusCode, body: &str) -> Failure {
    if status == StatusCode::TOO_MANY_REQUESTS {
        let wait = serde_json::from_str::<RateLimited>(body)
            .map(|r| r.retry_after)
            .unwrap_or(1.0);
        if wait.is_finite() {
            return Failure::RateLimited(Duration::from_secs_f64(wait.max(0.0)));
        }
        return Failure::RateLimited(Duration::from_secs(1));
    }
    Failure::Rejected(AppError::channel(operation, format!("{status}: {body}")))
}

#[derive(Debug, Serialize)]
struct MessageBody<'a> {
    content: &'a str,
}

/// One Discord text channel, accessed with a bot token.
pub struct DiscordChannel {
    client: Client,
    api_base: String,
    token: String,
    channel_id: String,
    bot_user_id: String,
}

impl DiscordChannel {
    /// Resolve the bot's own user id and bind to the configured channel.
    pub async fn connect(client: Client, config: &DiscordConfig) -> Result<Self> {
        let mut channel = Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            channel_id: config.channel_id.clone(),
            bot_user_id: String::new(),
        };

        let url = format!("{}/users/@me", channel.api_base);
        let me: RawUser = channel
            .execute("fetching bot user", || channel.client.get(&url))
            .await?
            .json()
            .await?;
        log::info!("Connected to Discord as user {}", me.id);
        channel.bot_user_id = me.id;
        Ok(channel)
    }

    fn messages_url(&self) -> String {
        format!("{}/channels/{}/messages", self.api_base, self.channel_id)
    }

    fn message_url(&self, message_id: &str) -> String {
        format!("{}/{}", self.messages_url(), message_id)
    }

    fn convert(&self, raw: RawMessage) -> ChannelMessage {
        let own = raw.author.id == self.bot_user_id;
        ChannelMessage {
            id: raw.id,
            author_id: raw.author.id,
            content: raw.content,
            editable: own,
            deletable: own,
        }
    }

    /// Send a request, waiting out one rate limit response.
    async fn execute<F>(&self, operation: &str, build: F) -> Result<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let auth = format!("Bot {}", self.token);

        for _ in 0..MAX_ATTEMPTS {
            let response = build().header(AUTHORIZATION, &auth).send().await?;
            let status = response.status();
            if status.is_success() {
                return Ok(response);
            }

            let body = response.text().await.unwrap_or_default();
            match classify(operation, status, &body) {
                Failure::RateLimited(wait) => {
                    log::warn!(
                        "Rate limited while {operation}, retrying in {:.2}s",
                        wait.as_secs_f64()
                    );
                    tokio::time::sleep(wait).await;
                }
                Failure::Rejected(e) => return Err(e),
            }
        }

        Err(AppError::channel(operation, "still rate limited"))
    }

    async fn fetch(&self, query: Vec<(&str, String)>) -> Result<Vec<ChannelMessage>> {
        let url = self.messages_url();
        let raw: Vec<RawMessage> = self
            .execute("fetching messages", || self.client.get(&url).query(&query))
            .await?
            .json()
            .await?;
        Ok(raw.into_iter().map(|m| self.convert(m)).collect())
    }
}

#[async_trait]
impl MessageChannel for DiscordChannel {
    fn bot_user_id(&self) -> &str {
        &self.bot_user_id
    }

    async fn recent_messages(&self, limit: usize) -> Result<Vec<ChannelMessage>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        self.fetch(vec![("limit", limit.min(MAX_FETCH).to_string())])
            .await
    }

    async fn messages_before(&self, before: &str, limit: usize) -> Result<Vec<ChannelMessage>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        self.fetch(vec![
            ("limit", limit.min(MAX_FETCH).to_string()),
            ("before", before.to_string()),
        ])
        .await
    }

    async fn send(&self, content: &str) -> Result<ChannelMessage> {
        let url = self.messages_url();
        let body = MessageBody { content };
        let raw: RawMessage = self
            .execute("sending message", || self.client.post(&url).json(&body))
            .await?
            .json()
            .await?;
        Ok(self.convert(raw))
    }

    async fn edit(&self, message_id: &str, content: &str) -> Result<()> {
        let url = self.message_url(message_id);
        let body = MessageBody { content };
        self.execute("editing message", || self.client.patch(&url).json(&body))
            .await?;
        Ok(())
    }

    async fn delete(&self, message_id: &str) -> Result<()> {
        let url = self.message_url(message_id);
        self.execute("deleting message", || self.client.delete(&url))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_waits_for_retry_after() {
        let failure = classify(
            "sending message",
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"message": "You are being rate limited.", "retry_after": 0.25, "global": false}"#,
        );
        assert!(matches!(failure, Failure::RateLimited(wait) if wait == Duration::from_millis(250)));
    }

    #[test]
    fn rate_limit_without_body_waits_one_second() {
        let failure = classify("editing message", StatusCode::TOO_MANY_REQUESTS, "");
        assert!(matches!(failure, Failure::RateLimited(wait) if wait == Duration::from_secs(1)));
    }

    #[test]
    fn negative_retry_after_does_not_wait() {
        let failure = classify(
            "deleting message",
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"retry_after": -3.0}"#,
        );
        assert!(matches!(failure, Failure::RateLimited(wait) if wait.is_zero()));
    }

    #[test]
    fn other_status_becomes_channel_error() {
        let failure = classify(
            "editing message",
            StatusCode::FORBIDDEN,
            r#"{"message": "Missing Permissions", "code": 50013}"#,
        );
        match failure {
            Failure::Rejected(AppError::Channel { operation, message }) => {
                assert_eq!(operation, "editing message");
                assert!(message.starts_with("403 Forbidden"));
                assert!(message.contains("Missing Permissions"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn server_error_is_not_retried() {
        let failure = classify("fetching messages", StatusCode::BAD_GATEWAY, "");
        assert!(matches!(
            failure,
            Failure::Rejected(AppError::Channel { .. })
        ));
    }
}
