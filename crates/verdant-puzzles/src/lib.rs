//! Typed curry arguments and solutions for the puzzle layers the wallet
//! stacks on top of each other, plus the synthetic-key transform that binds a
//! derived key to its hidden recovery puzzle.
//!
//! The compiled puzzle bytecode itself comes from the `chia-puzzles` crate;
//! this crate only controls curry arguments and their ordering.

mod cat;
mod memos;
mod nft;
mod proof;
mod singleton;
mod standard;
mod synthetic;

pub use cat::*;
pub use memos::*;
pub use nft::*;
pub use proof::*;
pub use singleton::*;
pub use standard::*;
pub use synthetic::*;
