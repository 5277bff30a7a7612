use reqwest::header::AUTHORIZATION;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

pub const DISCORD_API_BASE: &str = "https://discord.com/api/v10";

/// Slash command type for plain chat-input commands.
const CHAT_INPUT: u8 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandDefinition {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "type")]
    pub kind: u8,
}

/// The commands the bot answers.
pub fn guild_commands() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition {
            name: "pull",
            description: "Pulls the slot machine lever.",
            kind: CHAT_INPUT,
        },
        CommandDefinition {
            name: "units",
            description: "Checks how many units you have.",
            kind: CHAT_INPUT,
        },
    ]
}

/// Minimal REST client for the chat platform's application API.
pub struct DiscordClient {
    http: reqwest::Client,
    base_url: String,
    token: SecretString,
}

impl DiscordClient {
    pub fn new(token: SecretString) -> Self {
        Self::with_base_url(token, DISCORD_API_BASE)
    }

    pub fn with_base_url(token: SecretString, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token,
        }
    }

    /// Replace the guild's command set with [`guild_commands`].
    ///
    /// A bulk overwrite, so running it on every start is idempotent.
    pub async fn register_guild_commands(
        &self,
        application_id: u64,
        guild_id: u64,
    ) -> Result<(), DiscordError> {
        let url = format!(
            "{}/applications/{application_id}/guilds/{guild_id}/commands",
            self.base_url.trim_end_matches('/')
        );
        let commands = guild_commands();

        let response = self
            .http
            .put(&url)
            .header(AUTHORIZATION, format!("Bot {}", self.token.expose_secret()))
            .json(&commands)
            .send()
            .await
            .map_err(|e| DiscordError::Request { source: e })?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => format!("<unreadable body: {e}>"),
            };
            return Err(DiscordError::Status {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!(
            guild_id,
            commands = commands.len(),
            "guild commands registered"
        );
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DiscordError {
    #[error("request to the chat API failed")]
    Request { source: reqwest::Error },

    #[error("chat API answered {status}: {body}")]
    Status { status: u16, body: String },
}
