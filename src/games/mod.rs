//! Built-in rule sets for testing and benchmarking.
//!
//! - [`TICTACTOE`]: alternating moves, one role plays `noop`
//! - [`RoshamboBuilder`]: simultaneous moves over several rounds

mod roshambo;
mod tictactoe;

pub use roshambo::RoshamboBuilder;
pub use tictactoe::TICTACTOE;
