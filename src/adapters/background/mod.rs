//! Detached background work.

mod token_award;

pub use token_award::{award_once, TokenAwardTask};
