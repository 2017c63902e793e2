use async_trait::async_trait;
use models::{AccountsDocument, LimitsDocument, TemporaryLimitsDocument};

use crate::errors::ServiceError;
use crate::storage::json_doc_store::JsonDocStore;

pub const ACCOUNTS_DOC: &str = "accounts.json";
pub const LIMITS_DOC: &str = "limits.json";
pub const TEMPORARY_LIMITS_DOC: &str = "temporary_limits.json";

/// Every document the repository expects to find in the data directory.
pub const DOCUMENTS: [&str; 3] = [ACCOUNTS_DOC, LIMITS_DOC, TEMPORARY_LIMITS_DOC];

/// Load/save access to the three card documents.
///
/// Each call reflects the current persisted state; implementations must not
/// cache between calls.
#[async_trait]
pub trait CardLimitsRepository: Send + Sync {
    async fn load_accounts(&self) -> Result<AccountsDocument, ServiceError>;

    async fn load_limits(&self) -> Result<LimitsDocument, ServiceError>;
    async fn save_limits(&self, doc: &LimitsDocument) -> Result<(), ServiceError>;

    async fn load_temporary_limits(&self) -> Result<TemporaryLimitsDocument, ServiceError>;
    async fn save_temporary_limits(&self, doc: &TemporaryLimitsDocument) -> Result<(), ServiceError>;
}

/// Repository over the JSON files of one data directory.
#[derive(Clone, Debug)]
pub struct FileCardLimitsRepository {
    store: JsonDocStore,
}

impl FileCardLimitsRepository {
    pub fn new<P: Into<std::path::PathBuf>>(data_dir: P) -> Self {
        Self { store: JsonDocStore::new(data_dir) }
    }
}

#[async_trait]
impl CardLimitsRepository for FileCardLimitsRepository {
    async fn load_accounts(&self) -> Result<AccountsDocument, ServiceError> {
        self.store.load(ACCOUNTS_DOC).await
    }

    async fn load_limits(&self) -> Result<LimitsDocument, ServiceError> {
        self.store.load(LIMITS_DOC).await
    }

    async fn save_limits(&self, doc: &LimitsDocument) -> Result<(), ServiceError> {
        self.store.save(LIMITS_DOC, doc).await
    }

    async fn load_temporary_limits(&self) -> Result<TemporaryLimitsDocument, ServiceError> {
        self.store.load(TEMPORARY_LIMITS_DOC).await
    }

    async fn save_temporary_limits(&self, doc: &TemporaryLimitsDocument) -> Result<(), ServiceError> {
        self.store.save(TEMPORARY_LIMITS_DOC, doc).await
    }
}

/// Simple in-memory repository for tests and doc examples
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Mutex, MutexGuard};

    use models::LimitSet;

    #[derive(Default)]
    pub struct InMemoryCardLimitsRepository {
        accounts: Mutex<AccountsDocument>,
        limits: Mutex<LimitsDocument>,
        temporary: Mutex<TemporaryLimitsDocument>,
        saves: AtomicUsize,
    }

    fn locked<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
        m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    impl InMemoryCardLimitsRepository {
        pub fn with_documents(
            accounts: AccountsDocument,
            limits: LimitsDocument,
            temporary: TemporaryLimitsDocument,
        ) -> Self {
            Self {
                accounts: Mutex::new(accounts),
                limits: Mutex::new(limits),
                temporary: Mutex::new(temporary),
                saves: AtomicUsize::new(0),
            }
        }

        pub fn put_limits(&self, card_id: &str, limits: LimitSet) {
            locked(&self.limits).insert(card_id.to_string(), limits);
        }

        /// Number of document writes performed so far.
        pub fn save_count(&self) -> usize {
            self.saves.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CardLimitsRepository for InMemoryCardLimitsRepository {
        async fn load_accounts(&self) -> Result<AccountsDocument, ServiceError> {
            Ok(locked(&self.accounts).clone())
        }

        async fn load_limits(&self) -> Result<LimitsDocument, ServiceError> {
            Ok(locked(&self.limits).clone())
        }

        async fn save_limits(&self, doc: &LimitsDocument) -> Result<(), ServiceError> {
            *locked(&self.limits) = doc.clone();
            self.saves.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn load_temporary_limits(&self) -> Result<TemporaryLimitsDocument, ServiceError> {
            Ok(locked(&self.temporary).clone())
        }

        async fn save_temporary_limits(&self, doc: &TemporaryLimitsDocument) -> Result<(), ServiceError> {
            *locked(&self.temporary) = doc.clone();
            self.saves.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }
}
