//! Network Layer
//!
//! Wire formats and client credentials. Request routing lives outside this
//! crate; everything here is transport-agnostic.

pub mod auth;
pub mod protocol;

pub use auth::Credential;
pub use protocol::{
    ActiveGamesView, BulkTurnRequest, BulkTurnResponse, ErrorCode, ErrorResponse, GameListView,
    GameStateView, GameView, JsonMessage, MatchmakingRequest, MatchmakingView, PlayerView,
    SignupRequest, SignupResponse,
};
