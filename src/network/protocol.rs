//! Protocol Messages
//!
//! JSON shapes exchanged with clients. Views are built from domain types at
//! the serialization boundary; derived fields (legal moves, side to move,
//! game-over flag, state hash) are computed here and never stored.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::arena::error::{ArenaError, ErrorClass};
use crate::arena::game::{Game, GameId};
use crate::arena::matchmaking::MatchResponse;
use crate::arena::player::{HistoryEntry, Player, PlayerId};
use crate::arena::registry::ActiveGames;
use crate::core::hash::to_hex;
use crate::game::board::Side;
use crate::game::state::{GameState, Outcome, RuleError, Turn};
use crate::network::auth::Credential;

// =============================================================================
// CLIENT -> SERVER
// =============================================================================

/// Signup request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    /// Desired display name.
    pub name: String,
}

/// Matchmaking request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchmakingRequest {
    /// Number of games wanted.
    #[serde(rename = "gameCount")]
    pub game_count: u32,
}

/// One entry of a bulk turn submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkTurnRequest {
    /// Target game.
    #[serde(rename = "gameId")]
    pub game_id: GameId,
    /// Turn to play.
    pub action: Turn,
}

// =============================================================================
// SERVER -> CLIENT
// =============================================================================

/// Signup response carrying the new credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupResponse {
    /// Bearer token; shown to the player once.
    pub token: Credential,
}

/// Board and history of a game with derived fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateView {
    /// Board rows.
    pub rows: usize,
    /// Board columns.
    pub cols: usize,
    /// Recorded turns.
    pub history: Vec<Turn>,
    /// Cell codes, row by row.
    pub board: Vec<Vec<u8>>,
    /// Whether the position is terminal.
    pub game_over: bool,
    /// Outcome code of the position.
    pub winner: Outcome,
    /// Legal moves for the side to move.
    pub move_options: Vec<Turn>,
    /// Side to move.
    pub current_player: Side,
    /// Hex state hash.
    pub state_hash: String,
}

impl From<&GameState> for GameStateView {
    fn from(state: &GameState) -> Self {
        let winner = state.winner();
        Self {
            rows: state.rows(),
            cols: state.cols(),
            history: state.history().to_vec(),
            board: state.board().to_codes(),
            game_over: winner.is_finished(),
            winner,
            move_options: state.legal_moves().collect(),
            current_player: state.side_to_move(),
            state_hash: to_hex(&state.compute_hash()),
        }
    }
}

/// A game as served to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameView {
    /// Game identifier.
    pub id: GameId,
    /// Player on side A.
    pub player1_id: PlayerId,
    /// Player on side B.
    pub player2_id: PlayerId,
    /// Outcome code.
    pub outcome: Outcome,
    /// Position details.
    pub game_state: GameStateView,
}

impl From<&Game> for GameView {
    fn from(game: &Game) -> Self {
        Self {
            id: game.id,
            player1_id: game.side_a,
            player2_id: game.side_b,
            outcome: game.outcome,
            game_state: GameStateView::from(&game.state),
        }
    }
}

/// A player as served to clients. The credential is never included.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerView {
    /// Player identifier.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Current rating.
    pub current_elo: i32,
    /// Finished games.
    pub game_history: Vec<HistoryEntry>,
}

impl From<&Player> for PlayerView {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id,
            name: player.name.clone(),
            current_elo: player.rating,
            game_history: player.history.clone(),
        }
    }
}

/// A plain list of games: every active game, or one page of all games.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameListView(pub Vec<GameView>);

impl From<&[Game]> for GameListView {
    fn from(games: &[Game]) -> Self {
        Self(games.iter().map(GameView::from).collect())
    }
}

/// Ongoing games of the requesting player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveGamesView {
    /// Games waiting for the requester.
    pub my_turn: Vec<GameView>,
    /// Games waiting for the opponent.
    pub awaiting: Vec<GameView>,
}

impl From<&ActiveGames> for ActiveGamesView {
    fn from(active: &ActiveGames) -> Self {
        Self {
            my_turn: active.my_turn.iter().map(GameView::from).collect(),
            awaiting: active.awaiting.iter().map(GameView::from).collect(),
        }
    }
}

/// Matchmaking status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MatchmakingView {
    /// Queued, no opponent yet.
    Waiting,
    /// Paired and games created.
    Matched {
        /// Games created.
        created: u32,
        /// Creation failures.
        errors: Vec<String>,
    },
}

impl From<&MatchResponse> for MatchmakingView {
    fn from(response: &MatchResponse) -> Self {
        match response {
            MatchResponse::Waiting => MatchmakingView::Waiting,
            MatchResponse::Matched { created, errors, .. } => MatchmakingView::Matched {
                created: *created,
                errors: errors.clone(),
            },
        }
    }
}

/// Per-game failures of a bulk turn submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BulkTurnResponse {
    /// Failure message by game id; games that succeeded are absent.
    pub errors: BTreeMap<GameId, String>,
}

impl From<&BTreeMap<GameId, ArenaError>> for BulkTurnResponse {
    fn from(failures: &BTreeMap<GameId, ArenaError>) -> Self {
        Self {
            errors: failures
                .iter()
                .map(|(id, e)| (*id, e.to_string()))
                .collect(),
        }
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Move not allowed by the rules.
    IllegalMove,
    /// Board size out of range.
    InvalidDimensions,
    /// Not the caller's turn.
    WrongTurn,
    /// Unknown game.
    GameNotFound,
    /// Game already finished.
    GameOver,
    /// Unknown player.
    PlayerNotFound,
    /// Credential rejected.
    InvalidCredential,
    /// Name already registered.
    DuplicateName,
    /// Malformed request.
    InvalidRequest,
    /// Server-side failure.
    InternalError,
}

/// Error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// Who is at fault.
    pub class: ErrorClass,
}

impl From<&ArenaError> for ErrorResponse {
    fn from(err: &ArenaError) -> Self {
        let code = match err {
            ArenaError::Rule(RuleError::IllegalMove { .. }) => ErrorCode::IllegalMove,
            ArenaError::Rule(RuleError::InvalidDimensions { .. }) => ErrorCode::InvalidDimensions,
            ArenaError::WrongTurn => ErrorCode::WrongTurn,
            ArenaError::GameNotFound(_) => ErrorCode::GameNotFound,
            ArenaError::GameOver(_) => ErrorCode::GameOver,
            ArenaError::PlayerNotFound(_) => ErrorCode::PlayerNotFound,
            ArenaError::InvalidCredential => ErrorCode::InvalidCredential,
            ArenaError::DuplicateName(_) => ErrorCode::DuplicateName,
            ArenaError::InvalidRequest(_) => ErrorCode::InvalidRequest,
            ArenaError::CorruptGame { .. } | ArenaError::Persistence(_) => {
                ErrorCode::InternalError
            }
        };
        let class = err.class();
        // Server faults keep their details in the logs.
        let message = match class {
            ErrorClass::Client => err.to_string(),
            ErrorClass::Server => "internal server error".to_string(),
        };
        Self { code, message, class }
    }
}

// =============================================================================
// SERIALIZATION HELPERS
// =============================================================================

/// JSON encoding shared by every wire type.
pub trait JsonMessage: Serialize + DeserializeOwned {
    /// Serialize to JSON string.
    fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

impl JsonMessage for SignupRequest {}
impl JsonMessage for MatchmakingRequest {}
impl JsonMessage for BulkTurnRequest {}
impl JsonMessage for Turn {}
impl JsonMessage for SignupResponse {}
impl JsonMessage for GameView {}
impl JsonMessage for PlayerView {}
impl JsonMessage for GameListView {}
impl JsonMessage for ActiveGamesView {}
impl JsonMessage for MatchmakingView {}
impl JsonMessage for BulkTurnResponse {}
impl JsonMessage for ErrorResponse {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::board::Square;
    use crate::store::StoreError;

    fn sample_game() -> Game {
        let mut state = GameState::new(3, 3).unwrap();
        let opening = state.legal_moves().next().unwrap();
        state.apply(opening).unwrap();
        Game {
            id: GameId(4),
            side_a: PlayerId(1),
            side_b: PlayerId(2),
            outcome: Outcome::Ongoing,
            state,
        }
    }

    #[test]
    fn test_game_view_field_names() {
        let view = GameView::from(&sample_game());
        let value: serde_json::Value = serde_json::from_str(&view.to_json().unwrap()).unwrap();

        assert_eq!(value["id"], 4);
        assert_eq!(value["player1_id"], 1);
        assert_eq!(value["player2_id"], 2);
        assert_eq!(value["outcome"], 0);

        let state = &value["game_state"];
        assert_eq!(state["rows"], 3);
        assert_eq!(state["board"][1][0], 1);
        assert_eq!(state["gameOver"], false);
        assert_eq!(state["winner"], 0);
        assert_eq!(state["currentPlayer"], 2);
        assert_eq!(state["history"][0]["turnID"], 0);
        assert_eq!(state["stateHash"].as_str().map(str::len), Some(64));
        assert!(state["moveOptions"]
            .as_array()
            .unwrap()
            .iter()
            .all(|m| m["player"] == 2));
    }

    #[test]
    fn test_game_list_is_a_bare_array() {
        let games = vec![sample_game()];
        let value = serde_json::to_value(GameListView::from(games.as_slice())).unwrap();

        assert_eq!(value.as_array().map(Vec::len), Some(1));
        assert_eq!(value[0]["id"], 4);
        assert_eq!(value[0]["game_state"]["currentPlayer"], 2);
    }

    #[test]
    fn test_player_view_hides_credential() {
        let player = Player {
            id: PlayerId(9),
            name: "ann".into(),
            rating: 1016,
            credential_digest: "feedface".into(),
            history: vec![HistoryEntry::for_side(GameId(1), Outcome::AWins, Side::A, 1016)],
        };
        let json = PlayerView::from(&player).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["current_elo"], 1016);
        assert_eq!(value["game_history"][0]["win"], true);
        assert!(!json.contains("feedface"));
    }

    #[test]
    fn test_matchmaking_view_tags() {
        let waiting = MatchmakingView::from(&MatchResponse::Waiting);
        assert_eq!(waiting.to_json().unwrap(), r#"{"status":"waiting"}"#);

        let matched = MatchmakingView::from(&MatchResponse::Matched {
            opponent: PlayerId(3),
            created: 2,
            errors: Vec::new(),
        });
        assert_eq!(
            serde_json::to_value(&matched).unwrap(),
            serde_json::json!({"status": "matched", "created": 2, "errors": []})
        );
    }

    #[test]
    fn test_bulk_request_parses() {
        let json = r#"[{"gameId": 5, "action": {"turnID": 0, "sourceRow": 0, "sourceCol": 1,
            "destRow": 1, "destCol": 1, "player": 1}}]"#;
        let batch: Vec<BulkTurnRequest> = serde_json::from_str(json).unwrap();
        assert_eq!(batch[0].game_id, GameId(5));
        assert_eq!(batch[0].action.dest, Square::new(1, 1));
    }

    #[test]
    fn test_bulk_response_keys_by_game() {
        let mut failures = BTreeMap::new();
        failures.insert(GameId(8), ArenaError::WrongTurn);
        let json = BulkTurnResponse::from(&failures).to_json().unwrap();
        assert_eq!(json, r#"{"errors":{"8":"not your turn"}}"#);
    }

    #[test]
    fn test_error_response_classes() {
        let client = ErrorResponse::from(&ArenaError::WrongTurn);
        assert_eq!(client.code, ErrorCode::WrongTurn);
        assert_eq!(client.class, ErrorClass::Client);

        let server = ErrorResponse::from(&ArenaError::Persistence(StoreError::Conflict(
            "secret detail".into(),
        )));
        assert_eq!(server.code, ErrorCode::InternalError);
        assert_eq!(server.class, ErrorClass::Server);
        assert!(!server.message.contains("secret detail"));
        let value = serde_json::to_value(&server).unwrap();
        assert_eq!(value["code"], "internal_error");
        assert_eq!(value["class"], "server");
        assert_eq!(serde_json::to_value(&client).unwrap()["class"], "client");
    }

    #[test]
    fn test_signup_roundtrip() {
        let request = SignupRequest::from_json(r#"{"name":"zed"}"#).unwrap();
        assert_eq!(request.name, "zed");

        let response = SignupResponse { token: Credential::new("abc") };
        assert_eq!(response.to_json().unwrap(), r#"{"token":"abc"}"#);
    }
}
