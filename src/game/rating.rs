//! Elo Ratings
//!
//! Pure rating arithmetic applied once per finished game.

use crate::game::state::Outcome;

/// Rating of a freshly registered player.
pub const INITIAL_RATING: i32 = 1000;

/// Maximum rating change per game.
pub const K_FACTOR: f64 = 32.0;

/// Expected score of a player rated `rating` against `opponent`.
pub fn expected_score(rating: i32, opponent: i32) -> f64 {
    let diff = f64::from(opponent - rating);
    1.0 / (1.0 + 10f64.powf(diff / 400.0))
}

/// Scores of side A and side B for a finished game.
fn scores(outcome: Outcome) -> Option<(f64, f64)> {
    match outcome {
        Outcome::AWins => Some((1.0, 0.0)),
        Outcome::Draw => Some((0.5, 0.5)),
        Outcome::BWins => Some((0.0, 1.0)),
        Outcome::Ongoing => None,
    }
}

/// New ratings of side A and side B after a finished game.
///
/// The change is truncated toward zero. Returns `None` for an ongoing game.
pub fn update_ratings(rating_a: i32, rating_b: i32, outcome: Outcome) -> Option<(i32, i32)> {
    let (score_a, score_b) = scores(outcome)?;
    let delta_a = (K_FACTOR * (score_a - expected_score(rating_a, rating_b))) as i32;
    let delta_b = (K_FACTOR * (score_b - expected_score(rating_b, rating_a))) as i32;
    Some((rating_a + delta_a, rating_b + delta_b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_ratings_a_wins() {
        assert_eq!(update_ratings(1000, 1000, Outcome::AWins), Some((1016, 984)));
    }

    #[test]
    fn test_equal_ratings_b_wins() {
        assert_eq!(update_ratings(1000, 1000, Outcome::BWins), Some((984, 1016)));
    }

    #[test]
    fn test_equal_ratings_draw_is_neutral() {
        assert_eq!(update_ratings(1200, 1200, Outcome::Draw), Some((1200, 1200)));
    }

    #[test]
    fn test_ongoing_has_no_update() {
        assert_eq!(update_ratings(1000, 1000, Outcome::Ongoing), None);
    }

    #[test]
    fn test_expected_score_symmetry() {
        let e_a = expected_score(1400, 1000);
        let e_b = expected_score(1000, 1400);
        assert!((e_a + e_b - 1.0).abs() < 1e-12);
        assert!(e_a > 0.9);
    }

    #[test]
    fn test_change_truncates_toward_zero() {
        // 400 points apart: the favourite expects ~0.909 and gains 32 * 0.0909 = 2.9.
        let (strong, weak) = update_ratings(1400, 1000, Outcome::AWins).unwrap();
        assert_eq!(strong, 1402);
        // The underdog loses 32 * 0.0909 = 2.9, truncated to 2.
        assert_eq!(weak, 998);
    }

    #[test]
    fn test_upset_moves_more() {
        let (strong, weak) = update_ratings(1400, 1000, Outcome::BWins).unwrap();
        // 32 * 0.909 = 29.09 either way.
        assert_eq!(strong, 1371);
        assert_eq!(weak, 1029);
    }
}
