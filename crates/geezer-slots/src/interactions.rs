//! The interaction endpoint: pings and the `pull` / `units` commands.

use axum::{
    Json, Router,
    extract::State,
    middleware,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::ledger::LedgerError;
use crate::machine::Spin;
use crate::signature::InteractionSignature;
use crate::state::AppState;

pub const PING: u8 = 1;
pub const APPLICATION_COMMAND: u8 = 2;

const PONG: u8 = 1;
const CHANNEL_MESSAGE_WITH_SOURCE: u8 = 4;

pub const OUT_OF_TICKETS: &str = "❌Unfortunately, you do not have any tickets to perform pulls.";
pub const UNKNOWN_COMMAND: &str = "Unknown command.";

/// `POST /interactions` behind signature verification, plus an open `/healthz`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/interactions", post(handle))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            InteractionSignature::verify,
        ))
        .route("/healthz", get(|| async { "ok" }))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Clone, Deserialize)]
pub struct Interaction {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub data: Option<CommandData>,
    /// Present for commands issued in a guild
    #[serde(default)]
    pub member: Option<Member>,
    /// Present for commands issued in a direct message
    #[serde(default)]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommandData {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Member {
    pub user: User,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    /// Snowflake, serialized as a decimal string
    pub id: String,
}

impl Interaction {
    pub fn user_id(&self) -> Option<u64> {
        self.member
            .as_ref()
            .map(|m| &m.user)
            .or(self.user.as_ref())
            // arch-lint: allow(no-silent-result-drop) reason="a non-numeric snowflake is reported as a malformed interaction"
            .and_then(|u| u.id.parse().ok())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<MessageData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageData {
    pub content: String,
}

impl InteractionResponse {
    pub fn pong() -> Self {
        Self {
            kind: PONG,
            data: None,
        }
    }

    pub fn message(content: impl Into<String>) -> Self {
        Self {
            kind: CHANNEL_MESSAGE_WITH_SOURCE,
            data: Some(MessageData {
                content: content.into(),
            }),
        }
    }
}

pub async fn handle(
    State(state): State<AppState>,
    Json(interaction): Json<Interaction>,
) -> Result<Json<InteractionResponse>, AppError> {
    match interaction.kind {
        PING => Ok(Json(InteractionResponse::pong())),
        APPLICATION_COMMAND => {
            let command = interaction
                .data
                .as_ref()
                .ok_or_else(|| AppError::BadInteraction("command without data".to_owned()))?;
            let user = interaction
                .user_id()
                .ok_or_else(|| AppError::BadInteraction("command without a user id".to_owned()))?;

            let content = match command.name.as_str() {
                "pull" => pull(&state, user).await?,
                "units" => format!("You have {} Units.", state.ledger.units(user)?),
                other => {
                    tracing::warn!(command = other, user, "unknown command");
                    UNKNOWN_COMMAND.to_owned()
                }
            };
            Ok(Json(InteractionResponse::message(content)))
        }
        other => Err(AppError::BadInteraction(format!(
            "unsupported interaction type {other}"
        ))),
    }
}

async fn pull(state: &AppState, user: u64) -> Result<String, AppError> {
    let spin = Spin::roll(&mut rand::thread_rng());

    match state.ledger.settle_pull(user, spin.payout()) {
        Ok(settlement) => {
            tracing::info!(
                user,
                tier = ?spin.tier,
                payout = spin.payout(),
                tickets_left = settlement.tickets_left,
                "pull"
            );
            state.ledger.flush().await?;
            Ok(spin.render(&state.emoji))
        }
        Err(LedgerError::OutOfTickets { .. }) => {
            tracing::info!(user, "pull refused: out of tickets");
            Ok(OUT_OF_TICKETS.to_owned())
        }
        Err(e) => Err(e.into()),
    }
}
