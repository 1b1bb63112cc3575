use std::time::Duration;

/// Score awarded for a correct guess at the full guessing window.
const MAX_GUESS_SCORE: u64 = 600;

/// Denominator of the guess score formula, matching the drawing phase length.
const GUESS_WINDOW_SECS: u64 = 1200;

/// Turn score for a correct guess: `floor(600 * remaining / 1200)`.
/// A guess landing exactly at expiry scores 0.
pub fn guesser_score(remaining: Duration) -> u32 {
    (MAX_GUESS_SCORE * remaining.as_secs() / GUESS_WINDOW_SECS) as u32
}

/// Turn score for the drawer once the turn ends: 90% of the mean of all
/// players' turn scores, the drawer itself included at 0.
pub fn drawer_score(turn_scores: &[u32]) -> u32 {
    if turn_scores.is_empty() {
        return 0;
    }
    let sum: u64 = turn_scores.iter().map(|&s| u64::from(s)).sum();
    let avg = sum as f64 / turn_scores.len() as f64;
    (0.9 * avg).floor() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guesser_score_halfway() {
        assert_eq!(guesser_score(Duration::from_secs(300)), 150);
        assert_eq!(guesser_score(Duration::from_secs(600)), 300);
        assert_eq!(guesser_score(Duration::from_secs(1200)), 600);
    }

    #[test]
    fn guesser_score_at_expiry_is_zero() {
        assert_eq!(guesser_score(Duration::ZERO), 0);
        assert_eq!(guesser_score(Duration::from_millis(900)), 0);
    }

    #[test]
    fn drawer_score_is_ninety_percent_of_mean() {
        // one guesser at 150, one at 0, drawer at 0
        assert_eq!(drawer_score(&[150, 0, 0]), 45);
        assert_eq!(drawer_score(&[300, 300, 0]), 180);
    }

    #[test]
    fn drawer_score_floors() {
        // mean 100/3 = 33.33.., * 0.9 = 30.0
        assert_eq!(drawer_score(&[100, 0, 0]), 30);
        // mean 50, * 0.9 = 45; [50, 51, 0] -> mean 33.66 * 0.9 = 30.3 -> 30
        assert_eq!(drawer_score(&[50, 51, 0]), 30);
    }

    #[test]
    fn drawer_score_empty_roster() {
        assert_eq!(drawer_score(&[]), 0);
    }
}
