use std::sync::Arc;

use models::{AccountsDocument, LimitType, LimitsDocument, TemporaryLimit, TemporaryLimitsDocument};
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use super::domain::{CurrentLimits, LimitChange, PaymentInstruments, TemporaryLimitCreation};
use super::repository::CardLimitsRepository;
use crate::errors::ServiceError;

/// Attach each card's standing and temporary limits, keyed by card id.
///
/// Cards without an entry get `{}` and `[]` respectively.
pub fn attach_limits(
    mut accounts: AccountsDocument,
    limits: &LimitsDocument,
    temporary: &TemporaryLimitsDocument,
) -> AccountsDocument {
    for card in accounts.iter_mut().flat_map(|a| a.cards.iter_mut()) {
        card.current_limits = Some(limits.get(&card.card_id).cloned().unwrap_or_default());
        card.temporary_limits = Some(temporary.get(&card.card_id).cloned().unwrap_or_default());
    }
    accounts
}

/// Card limit operations on top of a [`CardLimitsRepository`].
///
/// Reads tolerate cards missing from the limit documents. Writes do too: a
/// card without an entry is initialized (`{}` or `[]`) before the change is
/// applied. Mutations are serialized through a single in-process guard so
/// concurrent calls on one service cannot lose each other's updates.
pub struct CardLimitsService<R: CardLimitsRepository + ?Sized> {
    repo: Arc<R>,
    default_card_id: String,
    write_guard: Mutex<()>,
}

impl<R: CardLimitsRepository + ?Sized> CardLimitsService<R> {
    pub fn new(repo: Arc<R>, default_card_id: impl Into<String>) -> Self {
        Self { repo, default_card_id: default_card_id.into(), write_guard: Mutex::new(()) }
    }

    /// Card targeted by the single-card operations.
    pub fn default_card_id(&self) -> &str {
        &self.default_card_id
    }

    /// All accounts, every card augmented with its limits.
    #[instrument(skip(self))]
    pub async fn payment_instruments(&self) -> Result<PaymentInstruments, ServiceError> {
        let accounts = self.repo.load_accounts().await?;
        let limits = self.repo.load_limits().await?;
        let temporary = self.repo.load_temporary_limits().await?;
        let accounts = attach_limits(accounts, &limits, &temporary);
        info!(accounts = accounts.len(), "payment_instruments_listed");
        Ok(PaymentInstruments { accounts })
    }

    /// Limits of the default card.
    pub async fn current_limits(&self) -> Result<CurrentLimits, ServiceError> {
        self.current_limits_for(&self.default_card_id).await
    }

    #[instrument(skip(self))]
    pub async fn current_limits_for(&self, card_id: &str) -> Result<CurrentLimits, ServiceError> {
        let limits = self.repo.load_limits().await?;
        let temporary = self.repo.load_temporary_limits().await?;
        Ok(CurrentLimits {
            card_id: card_id.to_string(),
            limits: limits.get(card_id).cloned().unwrap_or_default(),
            temporary_limits: temporary.get(card_id).cloned().unwrap_or_default(),
        })
    }

    /// Replace one standing limit of the default card.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::card_limits::{repository::mock::InMemoryCardLimitsRepository, CardLimitsService, LimitChange};
    /// let repo = Arc::new(InMemoryCardLimitsRepository::default());
    /// repo.put_limits("CARD-001", models::LimitSet::new(300, 500, 1000));
    /// let svc = CardLimitsService::new(repo, "CARD-001");
    /// let change = tokio_test::block_on(svc.change_limit("pos", 500)).unwrap();
    /// assert!(matches!(change, LimitChange::Applied { old: Some(300), new: 500, .. }));
    /// ```
    #[instrument(skip(self), fields(card_id = %self.default_card_id))]
    pub async fn change_limit(&self, limit_type: &str, limit: i64) -> Result<LimitChange, ServiceError> {
        let limit_type = match limit_type.parse::<LimitType>() {
            Ok(t) => t,
            Err(e) => {
                warn!(error = %e, "limit_change_rejected");
                return Ok(LimitChange::Rejected { error: e.to_string() });
            }
        };

        let _guard = self.write_guard.lock().await;
        let mut limits = self.repo.load_limits().await?;
        let old = limits
            .entry(self.default_card_id.clone())
            .or_default()
            .set(limit_type, limit);
        self.repo.save_limits(&limits).await?;

        info!(limit_type = %limit_type, old = ?old, new = limit, "limit_changed");
        Ok(LimitChange::Applied {
            card_id: self.default_card_id.clone(),
            limit_type,
            old,
            new: limit,
        })
    }

    /// Append a temporary override to the default card.
    ///
    /// Dates are stored verbatim; no format, ordering or overlap checks.
    #[instrument(skip(self), fields(card_id = %self.default_card_id))]
    pub async fn create_temporary_limit(
        &self,
        limit_type: &str,
        limit: i64,
        start_date: &str,
        end_date: &str,
    ) -> Result<TemporaryLimitCreation, ServiceError> {
        let limit_type = match limit_type.parse::<LimitType>() {
            Ok(t) => t,
            Err(e) => {
                warn!(error = %e, "temporary_limit_rejected");
                return Ok(TemporaryLimitCreation::Rejected { error: e.to_string() });
            }
        };

        let entry = TemporaryLimit {
            limit_type,
            limit,
            start_date: start_date.to_string(),
            end_date: end_date.to_string(),
        };

        let _guard = self.write_guard.lock().await;
        let mut temporary = self.repo.load_temporary_limits().await?;
        let overrides = temporary.entry(self.default_card_id.clone()).or_default();
        overrides.push(entry.clone());
        let total = overrides.len();
        self.repo.save_temporary_limits(&temporary).await?;

        info!(limit_type = %limit_type, limit, total, "temporary_limit_created");
        Ok(TemporaryLimitCreation::Created { card_id: self.default_card_id.clone(), created: entry })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card_limits::repository::{mock::InMemoryCardLimitsRepository, FileCardLimitsRepository};
    use crate::test_support;
    use models::LimitSet;

    fn seeded_memory_service(default_card: &str) -> (Arc<InMemoryCardLimitsRepository>, CardLimitsService<InMemoryCardLimitsRepository>) {
        let (accounts, limits, temporary) = test_support::seed_documents();
        let repo = Arc::new(InMemoryCardLimitsRepository::with_documents(accounts, limits, temporary));
        let svc = CardLimitsService::new(repo.clone(), default_card);
        (repo, svc)
    }

    #[tokio::test]
    async fn payment_instruments_attach_limits_with_empty_defaults() -> Result<(), anyhow::Error> {
        let (_, svc) = seeded_memory_service("CARD-001");
        let result = svc.payment_instruments().await?;

        let cards: Vec<_> = result.accounts.iter().flat_map(|a| a.cards.iter()).collect();
        assert_eq!(cards.len(), 3);

        let card1 = cards.iter().find(|c| c.card_id == "CARD-001").unwrap();
        assert_eq!(card1.current_limits, Some(LimitSet::new(300, 500, 1000)));
        assert_eq!(card1.temporary_limits, Some(vec![]));

        let card2 = cards.iter().find(|c| c.card_id == "CARD-002").unwrap();
        assert_eq!(card2.temporary_limits.as_ref().map(Vec::len), Some(1));

        // CARD-003 has no entry in either limit document
        let card3 = cards.iter().find(|c| c.card_id == "CARD-003").unwrap();
        assert_eq!(card3.current_limits, Some(LimitSet::default()));
        assert_eq!(card3.temporary_limits, Some(vec![]));
        Ok(())
    }

    #[tokio::test]
    async fn payment_instruments_is_repeatable() -> Result<(), anyhow::Error> {
        let (_, svc) = seeded_memory_service("CARD-001");
        let first = svc.payment_instruments().await?;
        let second = svc.payment_instruments().await?;
        assert_eq!(first, second);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_card_reads_as_empty() -> Result<(), anyhow::Error> {
        let (_, svc) = seeded_memory_service("CARD-001");
        let current = svc.current_limits_for("CARD-999").await?;
        assert_eq!(current.card_id, "CARD-999");
        assert_eq!(current.limits, LimitSet::default());
        assert!(current.temporary_limits.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn current_limits_targets_default_card() -> Result<(), anyhow::Error> {
        let (_, svc) = seeded_memory_service("CARD-002");
        let current = svc.current_limits().await?;
        assert_eq!(current.card_id, "CARD-002");
        assert_eq!(current.limits.get(LimitType::Pos), Some(2000));
        assert_eq!(current.temporary_limits.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn change_limit_returns_old_and_new_and_persists() -> Result<(), anyhow::Error> {
        let (repo, svc) = seeded_memory_service("CARD-001");
        let change = svc.change_limit("pos", 500).await?;
        assert_eq!(
            change,
            LimitChange::Applied { card_id: "CARD-001".into(), limit_type: LimitType::Pos, old: Some(300), new: 500 }
        );
        assert_eq!(repo.save_count(), 1);

        let current = svc.current_limits().await?;
        assert_eq!(current.limits, LimitSet::new(500, 500, 1000));
        Ok(())
    }

    #[tokio::test]
    async fn invalid_limit_type_is_rejected_without_writes() -> Result<(), anyhow::Error> {
        let (repo, svc) = seeded_memory_service("CARD-001");
        let before = svc.payment_instruments().await?;

        let change = svc.change_limit("bogus", 100).await?;
        assert_eq!(
            change,
            LimitChange::Rejected { error: "Invalid limit_type: bogus. Must be pos, atm, or ecom".into() }
        );
        let created = svc.create_temporary_limit("ATM", 100, "2024-01-01", "2024-01-02").await?;
        assert!(created.is_rejected());

        assert_eq!(repo.save_count(), 0);
        assert_eq!(svc.payment_instruments().await?, before);
        Ok(())
    }

    #[tokio::test]
    async fn change_limit_initializes_missing_card() -> Result<(), anyhow::Error> {
        let (_, svc) = seeded_memory_service("CARD-003");
        let change = svc.change_limit("atm", 250).await?;
        assert!(matches!(change, LimitChange::Applied { old: None, new: 250, .. }));

        let current = svc.current_limits().await?;
        assert_eq!(current.limits, LimitSet { atm: Some(250), ..Default::default() });
        Ok(())
    }

    #[tokio::test]
    async fn negative_limits_are_stored_as_given() -> Result<(), anyhow::Error> {
        let (_, svc) = seeded_memory_service("CARD-001");
        svc.change_limit("ecom", -10).await?;
        assert_eq!(svc.current_limits().await?.limits.ecom, Some(-10));
        Ok(())
    }

    #[tokio::test]
    async fn create_temporary_limit_appends_exactly_one_entry() -> Result<(), anyhow::Error> {
        let (_, svc) = seeded_memory_service("CARD-001");
        let created = svc.create_temporary_limit("atm", 200, "2024-01-01", "2024-01-31").await?;

        let entry = match created {
            TemporaryLimitCreation::Created { card_id, created } => {
                assert_eq!(card_id, "CARD-001");
                created
            }
            other => panic!("unexpected result: {other:?}"),
        };
        assert_eq!(
            entry,
            TemporaryLimit { limit_type: LimitType::Atm, limit: 200, start_date: "2024-01-01".into(), end_date: "2024-01-31".into() }
        );

        let current = svc.current_limits().await?;
        assert_eq!(current.temporary_limits, vec![entry]);
        Ok(())
    }

    #[tokio::test]
    async fn create_temporary_limit_keeps_order_and_duplicates() -> Result<(), anyhow::Error> {
        let (_, svc) = seeded_memory_service("CARD-002");
        svc.create_temporary_limit("pos", 10, "2025-02-30", "2025-01-01").await?;
        svc.create_temporary_limit("pos", 10, "2025-02-30", "2025-01-01").await?;

        let overrides = svc.current_limits().await?.temporary_limits;
        assert_eq!(overrides.len(), 3);
        assert_eq!(overrides[0].limit_type, LimitType::Ecom);
        assert_eq!(overrides[1], overrides[2]);
        Ok(())
    }

    #[tokio::test]
    async fn create_temporary_limit_initializes_missing_card() -> Result<(), anyhow::Error> {
        let (_, svc) = seeded_memory_service("CARD-003");
        let created = svc.create_temporary_limit("ecom", 99, "2024-05-01", "2024-05-02").await?;
        assert!(!created.is_rejected());
        assert_eq!(svc.current_limits().await?.temporary_limits.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn file_backed_round_trip() -> Result<(), anyhow::Error> {
        let dir = test_support::seeded_data_dir().await?;
        let repo = Arc::new(FileCardLimitsRepository::new(&dir));
        let svc = CardLimitsService::new(repo.clone(), "CARD-001");

        svc.change_limit("pos", 500).await?;
        svc.create_temporary_limit("atm", 200, "2024-01-01", "2024-01-31").await?;

        // a fresh service over the same directory sees both writes
        let reopened = CardLimitsService::new(Arc::new(FileCardLimitsRepository::new(&dir)), "CARD-001");
        let current = reopened.current_limits().await?;
        assert_eq!(current.limits.pos, Some(500));
        assert_eq!(current.temporary_limits.len(), 1);

        let listed = reopened.payment_instruments().await?;
        let card1 = listed.accounts[0].cards.iter().find(|c| c.card_id == "CARD-001").unwrap();
        assert_eq!(card1.current_limits.as_ref().and_then(|l| l.pos), Some(500));

        test_support::cleanup(&dir).await;
        Ok(())
    }

    #[tokio::test]
    async fn accounts_without_account_id_are_listed() -> Result<(), anyhow::Error> {
        let dir = test_support::seeded_data_dir().await?;
        tokio::fs::write(dir.join("accounts.json"), r#"[{"id":"A1","cards":[{"cardId":"CARD-001"}]}]"#).await?;
        let svc = CardLimitsService::new(Arc::new(FileCardLimitsRepository::new(&dir)), "CARD-001");

        let listed = serde_json::to_value(svc.payment_instruments().await?)?;
        assert_eq!(listed["accounts"][0]["id"], "A1");
        assert_eq!(listed["accounts"][0]["cards"][0]["currentLimits"]["pos"], 300);

        test_support::cleanup(&dir).await;
        Ok(())
    }

    #[tokio::test]
    async fn change_limit_keeps_unknown_limit_keys() -> Result<(), anyhow::Error> {
        let dir = test_support::seeded_data_dir().await?;
        let seeded = serde_json::json!({
            "CARD-001": {"pos": 300, "atm": 500, "ecom": 1000, "contactless": 100},
            "CARD-002": {"pos": 2000, "atm": 400, "ecom": 1500, "currency": "USD"}
        });
        tokio::fs::write(dir.join("limits.json"), seeded.to_string()).await?;
        let svc = CardLimitsService::new(Arc::new(FileCardLimitsRepository::new(&dir)), "CARD-001");

        assert_eq!(svc.current_limits().await?.limits.extra["contactless"], 100);
        svc.change_limit("pos", 500).await?;

        let on_disk: serde_json::Value =
            serde_json::from_str(&tokio::fs::read_to_string(dir.join("limits.json")).await?)?;
        assert_eq!(on_disk["CARD-001"], serde_json::json!({"pos": 500, "atm": 500, "ecom": 1000, "contactless": 100}));
        assert_eq!(on_disk["CARD-002"], seeded["CARD-002"]);

        test_support::cleanup(&dir).await;
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_changes_are_not_lost() -> Result<(), anyhow::Error> {
        let dir = test_support::seeded_data_dir().await?;
        let svc = Arc::new(CardLimitsService::new(Arc::new(FileCardLimitsRepository::new(&dir)), "CARD-001"));

        let mut handles = Vec::new();
        for i in 0..10i64 {
            let svc = svc.clone();
            handles.push(tokio::spawn(async move {
                svc.create_temporary_limit("pos", i, "2024-01-01", "2024-01-02").await
            }));
        }
        for h in handles {
            h.await??;
        }
        assert_eq!(svc.current_limits().await?.temporary_limits.len(), 10);

        test_support::cleanup(&dir).await;
        Ok(())
    }

    #[tokio::test]
    async fn storage_failure_propagates() {
        let repo = Arc::new(FileCardLimitsRepository::new(std::env::temp_dir().join("card_limits_absent_dir")));
        let svc = CardLimitsService::new(repo, "CARD-001");
        assert!(matches!(svc.change_limit("pos", 1).await, Err(ServiceError::Storage(_))));
        assert!(matches!(svc.payment_instruments().await, Err(ServiceError::Storage(_))));
    }
}
