//! Rock-paper-scissors over a fixed number of rounds.
//!
//! Both roles move simultaneously every round, so each non-terminal state
//! has 3 x 3 joint moves. The role with more won rounds scores 100.

use std::fmt::Write as _;

/// Builder for rock-paper-scissors rules.
///
/// ```
/// use gdl_play::games::RoshamboBuilder;
///
/// let rules = RoshamboBuilder::new().rounds(3).build();
/// assert!(rules.contains("(role left)"));
/// ```
#[derive(Clone, Debug)]
pub struct RoshamboBuilder {
    rounds: u32,
}

impl Default for RoshamboBuilder {
    fn default() -> Self {
        Self { rounds: 3 }
    }
}

impl RoshamboBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rounds before the game ends.
    pub fn rounds(mut self, rounds: u32) -> Self {
        assert!((1..=9).contains(&rounds), "Round count must be 1-9");
        self.rounds = rounds;
        self
    }

    /// Generate the GDL text.
    #[must_use]
    pub fn build(&self) -> String {
        let mut gdl = String::from(
            "(role left)
(role right)

(weapon rock) (weapon paper) (weapon scissors)
(beats rock scissors) (beats paper rock) (beats scissors paper)

(init (step 0))
(init (score left 0))
(init (score right 0))

(<= (legal ?r (throw ?w)) (role ?r) (weapon ?w))

(<= (won ?r)
    (does ?r (throw ?a))
    (does ?o (throw ?b))
    (distinct ?r ?o)
    (beats ?a ?b))

(<= (next (step ?y)) (true (step ?x)) (succ ?x ?y))
(<= (next (score ?r ?y)) (won ?r) (true (score ?r ?x)) (succ ?x ?y))
(<= (next (score ?r ?x)) (true (score ?r ?x)) (not (won ?r)))

(<= (goal ?r 100) (true (score ?r ?x)) (true (score ?o ?y)) (distinct ?r ?o) (greater ?x ?y))
(<= (goal ?r 50) (true (score ?r ?x)) (true (score ?o ?x)) (distinct ?r ?o))
(<= (goal ?r 0) (true (score ?r ?x)) (true (score ?o ?y)) (distinct ?r ?o) (greater ?y ?x))

",
        );
        for n in 0..self.rounds {
            let _ = writeln!(gdl, "(succ {n} {})", n + 1);
        }
        for high in 1..=self.rounds {
            for low in 0..high {
                let _ = writeln!(gdl, "(greater {high} {low})");
            }
        }
        let _ = writeln!(gdl, "(<= terminal (true (step {})))", self.rounds);
        gdl
    }
}
