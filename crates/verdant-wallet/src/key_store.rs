use chia_bls::{PublicKey, SecretKey};
use verdant_protocol::Bytes32;
use verdant_puzzles::{synthetic_public_key, synthetic_secret_key, DEFAULT_HIDDEN_PUZZLE_HASH};

use crate::error::{Result, WalletError};
use crate::keys::{
    intermediate_public_key, intermediate_secret_key, public_key_at_index, secret_key_at_index,
    MasterKey,
};

/// One derived address slot: the key pair at an index together with its
/// synthetic variant. Secret halves are present only when the store was
/// created from a secret master key.
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPair {
    pub index: u32,
    pub public_key: PublicKey,
    pub secret_key: Option<SecretKey>,
    pub synthetic_public_key: PublicKey,
    pub synthetic_secret_key: Option<SecretKey>,
}

enum Intermediate {
    Public(PublicKey),
    Secret(SecretKey),
}

/// A lazily generated, append-only cache of derived key pairs under the
/// fixed wallet path. Key pairs are pure functions of
/// (master key, index, hardened flag, hidden puzzle hash), so the cache
/// never needs invalidation.
pub struct KeyStore {
    public_key: PublicKey,
    secret_key: Option<SecretKey>,
    intermediate: Intermediate,
    hardened: bool,
    hidden_puzzle_hash: Bytes32,
    keys: Vec<KeyPair>,
}

impl KeyStore {
    /// Hardened stores require secret material up front; rejecting the
    /// combination here keeps `generate` infallible.
    pub fn new(master: MasterKey, hardened: bool, hidden_puzzle_hash: Bytes32) -> Result<Self> {
        let (public_key, secret_key, intermediate) = match master {
            MasterKey::Secret(sk) => (
                sk.public_key(),
                Some(sk.clone()),
                Intermediate::Secret(intermediate_secret_key(&sk, hardened)),
            ),
            MasterKey::Public(_) if hardened => return Err(WalletError::HardenedDerivation),
            MasterKey::Public(pk) => (
                pk,
                None,
                Intermediate::Public(intermediate_public_key(&pk)),
            ),
        };

        Ok(Self {
            public_key,
            secret_key,
            intermediate,
            hardened,
            hidden_puzzle_hash,
            keys: Vec::new(),
        })
    }

    pub fn from_secret_key(master: SecretKey, hardened: bool) -> Self {
        // a secret master key satisfies every derivation mode
        Self::new(
            MasterKey::Secret(master),
            hardened,
            DEFAULT_HIDDEN_PUZZLE_HASH.into(),
        )
        .unwrap()
    }

    pub fn from_public_key(master: PublicKey) -> Self {
        Self::new(
            MasterKey::Public(master),
            false,
            DEFAULT_HIDDEN_PUZZLE_HASH.into(),
        )
        .unwrap()
    }

    pub fn public_key(&self) -> PublicKey {
        self.public_key
    }

    pub fn secret_key(&self) -> Option<&SecretKey> {
        self.secret_key.as_ref()
    }

    pub fn hardened(&self) -> bool {
        self.hardened
    }

    pub fn hidden_puzzle_hash(&self) -> Bytes32 {
        self.hidden_puzzle_hash
    }

    pub fn keys(&self) -> &[KeyPair] {
        &self.keys
    }

    /// Extend the cache by `count` key pairs.
    pub fn generate(&mut self, count: u32) {
        let start = self.keys.len() as u32;
        for index in start..start + count {
            let key_pair = self.key_pair_at_index(index);
            self.keys.push(key_pair);
        }
    }

    /// Extend the cache so it holds at least `count` key pairs.
    pub fn generate_until(&mut self, count: usize) {
        if count > self.keys.len() {
            self.generate((count - self.keys.len()) as u32);
        }
    }

    /// The key pair at `index`, generating any missing predecessors.
    pub fn key_pair(&mut self, index: u32) -> &KeyPair {
        self.generate_until(index as usize + 1);
        &self.keys[index as usize]
    }

    fn key_pair_at_index(&self, index: u32) -> KeyPair {
        let hidden = self.hidden_puzzle_hash.to_bytes();

        let (public_key, secret_key) = match &self.intermediate {
            Intermediate::Secret(intermediate) => {
                let sk = secret_key_at_index(intermediate, index, self.hardened);
                (sk.public_key(), Some(sk))
            }
            Intermediate::Public(intermediate) => {
                // the constructor rejected hardened public-only stores
                let pk = public_key_at_index(intermediate, index, self.hardened).unwrap();
                (pk, None)
            }
        };

        let synthetic_secret_key = secret_key
            .as_ref()
            .map(|sk| synthetic_secret_key(sk, &hidden));
        let synthetic_public_key = match &synthetic_secret_key {
            Some(sk) => sk.public_key(),
            None => synthetic_public_key(&public_key, &hidden),
        };

        KeyPair {
            index,
            public_key,
            secret_key,
            synthetic_public_key,
            synthetic_secret_key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use hex_literal::hex;

    fn master() -> SecretKey {
        SecretKey::from_bytes(&hex!(
            "6bb19282e27bc6e7e397fb19efc2627a412410fdfd13bf14f4ce5bfdce084c71"
        ))
        .unwrap()
    }

    #[test]
    fn known_synthetic_key_at_index_zero() {
        let mut store = KeyStore::from_secret_key(master(), false);
        store.generate(1);

        assert_eq!(
            hex::encode(store.keys()[0].synthetic_public_key.to_bytes()),
            "b0c8cf08fdbe7fdb7bb1795740153b944c32364b100c372a05833554cb97794563b096cb5f57bfa09f38d7aebb48704e"
        );
    }

    #[test]
    fn generation_is_lazy_and_append_only() {
        let mut store = KeyStore::from_secret_key(master(), false);
        assert!(store.keys().is_empty());

        store.generate(2);
        store.generate_until(5);
        store.generate_until(3);
        assert_eq!(store.keys().len(), 5);

        let indices: Vec<u32> = store.keys().iter().map(|kp| kp.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);

        // repeated access returns the same derivation
        let pk = store.key_pair(4).public_key;
        assert_eq!(store.key_pair(4).public_key, pk);
    }

    #[test]
    fn watch_only_store_tracks_secret_store() {
        let sk = master();
        let mut secret_store = KeyStore::from_secret_key(sk.clone(), false);
        let mut public_store = KeyStore::from_public_key(sk.public_key());

        secret_store.generate(3);
        public_store.generate(3);

        for (a, b) in secret_store.keys().iter().zip(public_store.keys()) {
            assert_eq!(a.public_key, b.public_key);
            assert_eq!(a.synthetic_public_key, b.synthetic_public_key);
            assert!(b.secret_key.is_none());
            assert!(b.synthetic_secret_key.is_none());
        }
    }

    #[test]
    fn hardened_store_requires_secret_master() {
        let result = KeyStore::new(
            MasterKey::Public(master().public_key()),
            true,
            DEFAULT_HIDDEN_PUZZLE_HASH.into(),
        );
        assert!(matches!(result, Err(WalletError::HardenedDerivation)));
    }

    #[test]
    fn hardened_keys_differ_from_unhardened() {
        let mut hardened = KeyStore::from_secret_key(master(), true);
        let mut unhardened = KeyStore::from_secret_key(master(), false);
        hardened.generate(1);
        unhardened.generate(1);
        assert_ne!(
            hardened.keys()[0].public_key,
            unhardened.keys()[0].public_key
        );
    }
}
