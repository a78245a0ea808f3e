#![doc = include_str!("../README.md")]

#[cfg(feature = "protocol")]
pub use verdant_protocol as protocol;

#[cfg(feature = "puzzles")]
pub use verdant_puzzles as puzzles;

#[cfg(feature = "wallet")]
pub use verdant_wallet as wallet;
