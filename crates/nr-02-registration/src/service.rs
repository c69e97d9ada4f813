//! # Registration Service
//!
//! Validates a request, rejects names that already have an entry, funds the
//! transaction from the first identity output covering the fixed fee, signs,
//! validates and broadcasts it.
//!
//! Registration never mutates the registry itself. The entry appears once
//! the broadcast transaction is seen unconfirmed or in a block.

use crate::domain::errors::RegistrationError;
use crate::domain::identity::Identity;
use crate::domain::transaction::{build_registration, FIXED_FEE};
use crate::domain::utxo::{select_utxo, SpendableOutput};
use crate::ports::inbound::RegistrationApi;
use crate::ports::outbound::{IdentityStore, NameRegistry, TransactionBroadcaster, UtxoIndex};
use async_trait::async_trait;
use bitcoin::{Address, Amount, Network, Txid};
use nr_01_name_indexing::Frame;
use shared_types::{ContentHash, Name};
use tracing::{info, warn};

/// Load the persisted identity, or create and persist one on first start.
pub async fn load_or_create_identity<S: IdentityStore + ?Sized>(
    store: &S,
    network: Network,
) -> Result<Identity, RegistrationError> {
    if let Some(wif) = store.load_key().await? {
        let identity = Identity::from_wif(&wif, network)?;
        info!(address = %identity.address(), "[nr-02] Loaded identity");
        return Ok(identity);
    }

    let identity = Identity::generate(network);
    store.store_key(&identity.to_wif()).await?;
    info!(address = %identity.address(), "[nr-02] Created identity");
    Ok(identity)
}

pub struct RegistrationService<R, U, B> {
    identity: Identity,
    registry: R,
    utxos: U,
    broadcaster: B,
}

impl<R, U, B> RegistrationService<R, U, B>
where
    R: NameRegistry,
    U: UtxoIndex,
    B: TransactionBroadcaster,
{
    pub fn new(identity: Identity, registry: R, utxos: U, broadcaster: B) -> Self {
        Self {
            identity,
            registry,
            utxos,
            broadcaster,
        }
    }

    /// First identity output worth at least `min_amount`, unconfirmed
    /// outputs included.
    pub async fn select_funding(
        &self,
        min_amount: Amount,
    ) -> Result<SpendableOutput, RegistrationError> {
        let outputs = self
            .utxos
            .unspent_outputs(self.identity.address(), true)
            .await?;

        select_utxo(&outputs, min_amount)
            .cloned()
            .ok_or(RegistrationError::InsufficientFunds {
                required: min_amount.to_sat(),
            })
    }

    /// Fund, build, sign and broadcast a registration for validated input.
    pub async fn create_registration(
        &self,
        name: Name,
        content_hash: ContentHash,
    ) -> Result<Txid, RegistrationError> {
        let funding = self.select_funding(FIXED_FEE).await?;
        let signed = build_registration(
            &self.identity,
            &funding,
            &Frame::new(name, content_hash),
        )?;

        self.broadcaster.broadcast(&signed.raw).await?;

        info!(
            %name,
            txid = %signed.txid,
            funding = %funding.outpoint(),
            "[nr-02] Broadcast registration"
        );
        Ok(signed.txid)
    }
}

#[async_trait]
impl<R, U, B> RegistrationApi for RegistrationService<R, U, B>
where
    R: NameRegistry,
    U: UtxoIndex,
    B: TransactionBroadcaster,
{
    async fn lookup(&self, name: &str) -> Result<Option<ContentHash>, RegistrationError> {
        let name = Name::from_hex(name)?;
        self.registry.lookup(&name).await
    }

    async fn register(&self, name: &str, content_hash: &str) -> Result<Txid, RegistrationError> {
        let name = Name::from_hex(name)?;
        let content_hash = ContentHash::from_hex(content_hash)?;

        if self.registry.lookup(&name).await?.is_some() {
            return Err(RegistrationError::AlreadyRegistered);
        }

        self.create_registration(name, content_hash)
            .await
            .inspect_err(|e| warn!(%name, error = %e, "[nr-02] Registration failed"))
    }

    fn funding_address(&self) -> &Address {
        self.identity.address()
    }
}
