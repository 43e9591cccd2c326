//! # VaultStore
//!
//! Persistent vault snapshots on sled's embedded key-value store.
//!
//! ## Tree Layout
//!
//! | Tree     | Key              | Value                  |
//! |----------|------------------|------------------------|
//! | `vaults` | owner (UTF-8)    | `bincode(VaultAccount)` |
//!
//! ## Concurrency
//!
//! Each vault is single-writer. [`VaultStore::apply`] reads the current
//! snapshot, runs an engine operation on it, and installs the result with
//! a compare-and-swap against the bytes it read. If another writer got
//! there first the operation is re-run on the fresh snapshot. Because
//! engine operations are pure functions of the snapshot, re-running them
//! is always safe.

use sled::{Db, IVec, Tree};
use std::path::Path;
use tracing::debug;

use crate::error::EngineError;
use crate::vault::VaultAccount;

// ---------------------------------------------------------------------------
// Error Type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("no vault for owner {0}")]
    NotFound(String),

    #[error("a vault for owner {0} already exists")]
    AlreadyExists(String),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

pub type StoreResult<T> = Result<T, StoreError>;

fn encode(vault: &VaultAccount) -> StoreResult<Vec<u8>> {
    bincode::serialize(vault).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn decode(bytes: &[u8]) -> StoreResult<VaultAccount> {
    bincode::deserialize(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
}

// ---------------------------------------------------------------------------
// VaultStore
// ---------------------------------------------------------------------------

/// Vault snapshots keyed by owner.
///
/// Cloning is cheap; clones share the same sled handle.
#[derive(Debug, Clone)]
pub struct VaultStore {
    db: Db,
    vaults: Tree,
}

impl VaultStore {
    /// Opens or creates a store at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// An in-memory store, removed on drop.
    pub fn open_temporary() -> StoreResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> StoreResult<Self> {
        let vaults = db.open_tree("vaults")?;
        Ok(Self { db, vaults })
    }

    /// Inserts a newly created vault. Fails if the owner already has one.
    pub fn insert_new(&self, vault: &VaultAccount) -> StoreResult<()> {
        let bytes = encode(vault)?;
        self.vaults
            .compare_and_swap(vault.owner().as_bytes(), None as Option<&[u8]>, Some(bytes))?
            .map_err(|_| StoreError::AlreadyExists(vault.owner().to_string()))?;
        self.db.flush()?;
        debug!(owner = vault.owner(), "vault inserted");
        Ok(())
    }

    /// Overwrites the snapshot for `vault.owner()` unconditionally.
    pub fn put(&self, vault: &VaultAccount) -> StoreResult<()> {
        self.vaults.insert(vault.owner().as_bytes(), encode(vault)?)?;
        Ok(())
    }

    pub fn get(&self, owner: &str) -> StoreResult<Option<VaultAccount>> {
        match self.vaults.get(owner.as_bytes())? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Like [`get`](Self::get), but a missing vault is an error.
    pub fn load(&self, owner: &str) -> StoreResult<VaultAccount> {
        self.get(owner)?
            .ok_or_else(|| StoreError::NotFound(owner.to_string()))
    }

    /// Every stored owner, in key order.
    pub fn owners(&self) -> StoreResult<Vec<String>> {
        self.vaults
            .iter()
            .keys()
            .map(|key| {
                let key = key?;
                String::from_utf8(key.to_vec())
                    .map_err(|e| StoreError::Serialization(e.to_string()))
            })
            .collect()
    }

    /// Every stored snapshot, in owner order.
    pub fn list(&self) -> StoreResult<Vec<VaultAccount>> {
        self.vaults
            .iter()
            .values()
            .map(|bytes| decode(&bytes?))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.vaults.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vaults.is_empty()
    }

    /// Runs `op` against the stored snapshot of `owner` and commits the
    /// snapshot it returns. Returns the operation's receipt.
    ///
    /// Engine errors leave the stored snapshot untouched.
    pub fn apply<T, F>(&self, owner: &str, op: F) -> StoreResult<T>
    where
        F: Fn(&VaultAccount) -> Result<(VaultAccount, T), EngineError>,
    {
        loop {
            let current: IVec = self
                .vaults
                .get(owner.as_bytes())?
                .ok_or_else(|| StoreError::NotFound(owner.to_string()))?;
            let (next, outcome) = op(&decode(&current)?)?;

            let swapped = self.vaults.compare_and_swap(
                owner.as_bytes(),
                Some(&current),
                Some(encode(&next)?),
            )?;
            match swapped {
                Ok(()) => {
                    self.db.flush()?;
                    return Ok(outcome);
                }
                Err(_) => {
                    debug!(owner, "concurrent vault update, retrying");
                }
            }
        }
    }

    /// Blocks until pending writes are durable.
    pub fn flush(&self) -> StoreResult<()> {
        self.db.flush()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::tokens;
    use crate::error::{PolicyViolation, ValidationError};
    use crate::vault::{Beneficiary, TokenSymbol};

    fn vault(owner: &str) -> VaultAccount {
        VaultAccount::create(owner, true, vec![Beneficiary::new("0xheir", 10_000)], 0).unwrap()
    }

    #[test]
    fn open_temporary_store() {
        let store = VaultStore::open_temporary().expect("temp store");
        assert!(store.is_empty());
        assert_eq!(store.get("0xnobody").unwrap(), None);
    }

    #[test]
    fn insert_and_reload() {
        let store = VaultStore::open_temporary().unwrap();
        let v = vault("0xalice");
        store.insert_new(&v).unwrap();
        assert_eq!(store.load("0xalice").unwrap(), v);
        assert_eq!(store.owners().unwrap(), vec!["0xalice".to_string()]);
        assert_eq!(store.list().unwrap(), vec![v]);
    }

    #[test]
    fn insert_new_refuses_duplicates() {
        let store = VaultStore::open_temporary().unwrap();
        store.insert_new(&vault("0xalice")).unwrap();
        let err = store.insert_new(&vault("0xalice")).unwrap_err();
        assert!(matches!(err, StoreError::AlreadyExists(owner) if owner == "0xalice"));
    }

    #[test]
    fn apply_commits_successful_operations() {
        let store = VaultStore::open_temporary().unwrap();
        store.insert_new(&vault("0xalice")).unwrap();

        store
            .apply("0xalice", |v| {
                v.deposit(TokenSymbol::Vet, tokens(250), 10).map(|n| (n, ()))
            })
            .unwrap();

        let stored = store.load("0xalice").unwrap();
        assert_eq!(stored.basket().balance(TokenSymbol::Vet), tokens(250));
    }

    #[test]
    fn apply_leaves_snapshot_on_engine_error() {
        let store = VaultStore::open_temporary().unwrap();
        let v = vault("0xalice");
        store.insert_new(&v).unwrap();

        let err = store
            .apply("0xalice", |v| {
                v.deposit(TokenSymbol::Obol, tokens(1), 10).map(|n| (n, ()))
            })
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Engine(EngineError::Validation(ValidationError::UnsupportedDeposit(
                TokenSymbol::Obol
            )))
        ));
        assert_eq!(store.load("0xalice").unwrap(), v);
    }

    #[test]
    fn apply_on_missing_vault() {
        let store = VaultStore::open_temporary().unwrap();
        let err = store.apply("0xghost", |v| Ok((v.clone(), ()))).unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn persistent_store_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let store = VaultStore::open(dir.path()).unwrap();
            store.insert_new(&vault("0xalice")).unwrap();
        }
        let reopened = VaultStore::open(dir.path()).unwrap();
        let mut deceased = reopened.load("0xalice").unwrap();
        deceased.is_deceased = true;
        reopened.put(&deceased).unwrap();
        let err = reopened
            .apply("0xalice", |v| v.remove_beneficiary("0xheir").map(|n| (n, ())))
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Engine(EngineError::Policy(PolicyViolation::AlreadyDeceased(_)))
        ));
    }

    #[test]
    fn concurrent_appliers_serialize() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(VaultStore::open_temporary().unwrap());
        store.insert_new(&vault("0xalice")).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for _ in 0..10 {
                        store
                            .apply("0xalice", |v| {
                                v.deposit(TokenSymbol::Vet, tokens(1), 0).map(|n| (n, ()))
                            })
                            .unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let stored = store.load("0xalice").unwrap();
        assert_eq!(stored.basket().balance(TokenSymbol::Vet), tokens(80));
    }
}
