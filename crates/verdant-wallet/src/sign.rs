use chia_bls::{aggregate, sign, SecretKey, Signature};
use clvmr::Allocator;
use verdant_protocol::{Bytes32, CoinSpend, SpendBundle};

use crate::conditions::{agg_sig_conditions, AggSigCondition, AGG_SIG_ME, MAX_COST};
use crate::error::{Result, WalletError};

/// What to do when a signing obligation has no matching secret key.
///
/// `Partial` supports collaborative signing: each party contributes the
/// signatures it can and the aggregates are merged afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignMode {
    #[default]
    Complete,
    Partial,
}

/// The exact bytes a signer commits to for one obligation. Unsafe
/// signatures cover the message verbatim; everything else is suffixed with
/// the coin id and the network's domain tag so it cannot be replayed
/// against another coin or network.
pub fn signing_message(
    condition: &AggSigCondition,
    coin_spend: &CoinSpend,
    agg_sig_me_extra_data: Bytes32,
) -> Vec<u8> {
    let mut message = condition.message.clone();
    if condition.opcode == AGG_SIG_ME {
        message.extend(coin_spend.coin.coin_id().as_slice());
        message.extend(agg_sig_me_extra_data.as_slice());
    }
    message
}

/// Execute the puzzle reveal, collect its signing obligations and sign the
/// ones a key is available for. The result is the aggregate of every
/// produced signature, or the identity element if there were none.
pub fn sign_coin_spend(
    coin_spend: &CoinSpend,
    secret_keys: &[SecretKey],
    agg_sig_me_extra_data: Bytes32,
    mode: SignMode,
) -> Result<Signature> {
    let mut a = Allocator::new();
    let solution = coin_spend.solution.to_node(&mut a)?;
    let (_cost, output) = coin_spend
        .puzzle_reveal
        .run(&mut a, 0, MAX_COST, &solution)?;

    let mut signatures = Vec::new();
    for condition in agg_sig_conditions(&a, output)? {
        let secret_key = secret_keys
            .iter()
            .find(|sk| sk.public_key() == condition.public_key);

        match secret_key {
            Some(sk) => {
                let message = signing_message(&condition, coin_spend, agg_sig_me_extra_data);
                signatures.push(sign(sk, &message));
            }
            None if mode == SignMode::Partial => {}
            None => return Err(WalletError::MissingKey(condition.public_key)),
        }
    }

    Ok(aggregate(&signatures))
}

/// Sign every coin spend in the bundle and fold the new signatures into its
/// aggregate, in place. Calling this repeatedly with disjoint key sets in
/// partial mode accumulates the same aggregate a single complete-mode pass
/// would produce.
pub fn sign_spend_bundle(
    bundle: &mut SpendBundle,
    secret_keys: &[SecretKey],
    agg_sig_me_extra_data: Bytes32,
    mode: SignMode,
) -> Result<()> {
    let mut signatures = vec![bundle.aggregated_signature.clone()];
    for coin_spend in &bundle.coin_spends {
        signatures.push(sign_coin_spend(
            coin_spend,
            secret_keys,
            agg_sig_me_extra_data,
            mode,
        )?);
    }
    bundle.aggregated_signature = aggregate(&signatures);
    Ok(())
}
