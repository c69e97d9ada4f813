//! # Identity
//!
//! The single key this registry funds and signs its own registrations with.
//! Generated once, persisted as WIF, reloaded on every start, never rotated.

use super::errors::RegistrationError;
use bitcoin::secp256k1::{rand, Secp256k1, SecretKey};
use bitcoin::{Address, Network, PrivateKey, PublicKey, ScriptBuf};
use std::fmt;

#[derive(Clone)]
pub struct Identity {
    private_key: PrivateKey,
    public_key: PublicKey,
    address: Address,
}

impl Identity {
    /// Fresh random key for `network`.
    pub fn generate(network: Network) -> Self {
        let secret = SecretKey::new(&mut rand::thread_rng());
        Self::from_private_key(PrivateKey::new(secret, network), network)
    }

    /// Load a persisted WIF key. The address is derived for `network`.
    pub fn from_wif(wif: &str, network: Network) -> Result<Self, RegistrationError> {
        let private_key = PrivateKey::from_wif(wif)
            .map_err(|e| RegistrationError::InvalidIdentityKey(e.to_string()))?;
        Ok(Self::from_private_key(private_key, network))
    }

    fn from_private_key(private_key: PrivateKey, network: Network) -> Self {
        let secp = Secp256k1::signing_only();
        let public_key = private_key.public_key(&secp);
        let address = Address::p2pkh(public_key.pubkey_hash(), network);
        Self {
            private_key,
            public_key,
            address,
        }
    }

    pub fn to_wif(&self) -> String {
        self.private_key.to_wif()
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.private_key
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Receiving address; also where change goes.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// P2PKH locking script of [`address`](Self::address).
    pub fn script_pubkey(&self) -> ScriptBuf {
        self.address.script_pubkey()
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("address", &self.address.to_string())
            .finish_non_exhaustive()
    }
}
