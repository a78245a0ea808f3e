use chia_bls::PublicKey;
use chia_puzzles::P2_DELEGATED_PUZZLE_OR_HIDDEN_PUZZLE;
use clvm_traits::ToClvm;
use clvm_utils::CurriedProgram;
use clvmr::serde::node_from_bytes;
use clvmr::Allocator;
use verdant_protocol::{Coin, CoinSpend, Program};
use verdant_puzzles::{StandardArgs, StandardSolution};

use crate::error::Result;

/// The standard transaction puzzle curried with a synthetic key.
pub fn standard_puzzle_reveal(a: &mut Allocator, synthetic_key: PublicKey) -> Result<Program> {
    let mod_ptr = node_from_bytes(a, &P2_DELEGATED_PUZZLE_OR_HIDDEN_PUZZLE)
        .map_err(|_| chia_traits::Error::InvalidClvm)?;
    let curried = CurriedProgram {
        program: mod_ptr,
        args: StandardArgs::new(synthetic_key),
    }
    .to_clvm(a)?;
    Ok(Program::from_node(a, curried)?)
}

/// A solution that takes the synthetic-key path and outputs `conditions`
/// directly.
pub fn standard_solution<T>(a: &mut Allocator, conditions: T) -> Result<Program>
where
    T: ToClvm<Allocator>,
{
    let solution = StandardSolution::from_conditions(conditions).to_clvm(a)?;
    Ok(Program::from_node(a, solution)?)
}

/// Spend a standard coin through its synthetic key, emitting `conditions`.
pub fn spend_standard_coin<T>(
    a: &mut Allocator,
    coin: Coin,
    synthetic_key: PublicKey,
    conditions: T,
) -> Result<CoinSpend>
where
    T: ToClvm<Allocator>,
{
    let puzzle_reveal = standard_puzzle_reveal(a, synthetic_key)?;
    let solution = standard_solution(a, conditions)?;
    Ok(CoinSpend::new(coin, puzzle_reveal, solution))
}
