use rand::{
    Rng, SeedableRng,
    distr::{Distribution, StandardUniform},
    rngs::SmallRng,
};

use crate::types::{Move, Outcome, RoundResult, ScoreBoard};

impl Distribution<Move> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Move {
        Move::ALL[rng.random_range(0..Move::ALL.len())]
    }
}

/// Supplies the computer's move for each round.
pub trait MoveSource {
    fn next_move(&mut self) -> Move;
}

/// Uniform, independent draws.
pub struct RandomMoves {
    rng: SmallRng,
}

impl RandomMoves {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_os_rng(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomMoves {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveSource for RandomMoves {
    fn next_move(&mut self) -> Move {
        self.rng.random()
    }
}

/// Scores one round. Exactly one score moves, by one, unless it is a tie.
pub fn resolve(player: Move, computer: Move, scores: ScoreBoard) -> RoundResult {
    let mut scores = scores;
    let outcome = if player == computer {
        Outcome::Tie
    } else if player.beats(computer) {
        scores.player += 1;
        Outcome::PlayerWin
    } else {
        scores.computer += 1;
        Outcome::ComputerWin
    };

    RoundResult {
        outcome,
        player_move: player,
        computer_move: computer,
        scores,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_moves_tie_without_scoring() {
        let scores = ScoreBoard {
            player: 2,
            computer: 5,
        };
        for mv in Move::ALL {
            let result = resolve(mv, mv, scores);
            assert_eq!(result.outcome, Outcome::Tie);
            assert_eq!(result.scores, scores);
            assert_eq!(result.display_text(), format!("Tie: both {mv}"));
        }
    }

    #[test]
    fn winning_pairs_follow_the_cycle() {
        let pairs = [
            (Move::Rock, Move::Scissor),
            (Move::Paper, Move::Rock),
            (Move::Scissor, Move::Paper),
        ];
        for (winner, loser) in pairs {
            let won = resolve(winner, loser, ScoreBoard::default());
            assert_eq!(won.outcome, Outcome::PlayerWin);
            assert_eq!(won.scores, ScoreBoard { player: 1, computer: 0 });

            let lost = resolve(loser, winner, ScoreBoard::default());
            assert_eq!(lost.outcome, Outcome::ComputerWin);
            assert_eq!(lost.scores, ScoreBoard { player: 0, computer: 1 });
        }
    }

    #[test]
    fn beats_is_antisymmetric() {
        for a in Move::ALL {
            for b in Move::ALL {
                if a == b {
                    assert!(!a.beats(b));
                } else {
                    assert!(a.beats(b) ^ b.beats(a), "{a} vs {b}");
                }
            }
        }
    }

    #[test]
    fn result_text_names_the_winner_first() {
        let result = resolve(Move::Scissor, Move::Paper, ScoreBoard::default());
        assert_eq!(result.display_text(), "Player wins: Scissor beats Paper");
        let result = resolve(Move::Rock, Move::Paper, ScoreBoard::default());
        assert_eq!(result.display_text(), "Computer wins: Paper beats Rock");
    }

    #[test]
    fn random_moves_cover_every_move() {
        let mut moves = RandomMoves::seeded(7);
        let drawn: Vec<Move> = (0..300).map(|_| moves.next_move()).collect();
        for mv in Move::ALL {
            assert!(drawn.contains(&mv));
        }
    }
}
