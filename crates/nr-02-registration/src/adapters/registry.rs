//! Registry reads and identity persistence go through the same writer
//! queue as indexing, so they observe a consistent store.

use crate::domain::errors::RegistrationError;
use crate::ports::outbound::{IdentityStore, NameRegistry};
use async_trait::async_trait;
use nr_01_name_indexing::RegistryHandle;
use shared_types::{ContentHash, Name};

#[async_trait]
impl NameRegistry for RegistryHandle {
    async fn lookup(&self, name: &Name) -> Result<Option<ContentHash>, RegistrationError> {
        Ok(RegistryHandle::lookup(self, *name).await?)
    }
}

#[async_trait]
impl IdentityStore for RegistryHandle {
    async fn load_key(&self) -> Result<Option<String>, RegistrationError> {
        Ok(self.identity_key().await?)
    }

    async fn store_key(&self, wif: &str) -> Result<(), RegistrationError> {
        Ok(self.store_identity_key(wif.to_string()).await?)
    }
}
