//! Runs searches against the gateway and fills the edit buffer.

use crate::{EditBuffer, Notifier};
use audit_types::{AuditRecord, Gateway, SearchFilters};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

pub(crate) const SEARCH_FAILED: &str = "Erreur lors de la recherche";

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Results replaced the buffer.
    Applied(Vec<AuditRecord>),
    /// A later search was issued before this one answered; its response was dropped.
    Superseded,
    /// Gateway error; previous results are still displayed.
    Failed,
}

impl SearchOutcome {
    pub fn count(&self) -> Option<usize> {
        match self {
            SearchOutcome::Applied(rows) => Some(rows.len()),
            _ => None,
        }
    }
}

/// Issues searches tagged with a monotonic sequence number; only the response to the
/// latest issued search may touch the results.
pub struct SearchExecutor {
    gateway: Arc<dyn Gateway>,
    notifier: Arc<Notifier>,
    buffer: Arc<RwLock<EditBuffer>>,
    issued: AtomicU64,
    in_flight: AtomicUsize,
}

impl SearchExecutor {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        notifier: Arc<Notifier>,
        buffer: Arc<RwLock<EditBuffer>>,
    ) -> Self {
        Self {
            gateway,
            notifier,
            buffer,
            issued: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn is_searching(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub async fn search(&self, filters: &SearchFilters) -> SearchOutcome {
        let seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let result = self.gateway.search_regulations(filters).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        // Announce while holding the buffer lock: the banner must match the applied rows.
        let mut buffer = self.buffer.write().await;
        if seq != self.issued.load(Ordering::SeqCst) {
            tracing::debug!(seq, ok = result.is_ok(), "dropping superseded search response");
            return SearchOutcome::Superseded;
        }
        match result {
            Ok(rows) => {
                buffer.replace(rows.clone());
                tracing::info!(seq, rows = rows.len(), query = %filters.query, "search applied");
                self.notifier
                    .success(format!("{} résultats trouvés", rows.len()))
                    .await;
                SearchOutcome::Applied(rows)
            }
            Err(e) => {
                tracing::warn!(seq, error = %e, "search failed");
                self.notifier.error(SEARCH_FAILED).await;
                SearchOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NotificationKind;
    use audit_gateway::{MockCall, MockGateway};
    use std::time::Duration;

    fn setup(gateway: Arc<MockGateway>) -> (SearchExecutor, Arc<RwLock<EditBuffer>>, Arc<Notifier>) {
        let notifier = Arc::new(Notifier::default());
        let buffer = Arc::new(RwLock::new(EditBuffer::default()));
        let exec = SearchExecutor::new(gateway, Arc::clone(&notifier), Arc::clone(&buffer));
        (exec, buffer, notifier)
    }

    fn catalog() -> Vec<AuditRecord> {
        vec![
            MockGateway::record(1, "Code du travail", "Sécurité", "Fire safety: extincteurs"),
            MockGateway::record(2, "ERP", "Sécurité", "Fire safety: issues de secours"),
            MockGateway::record(3, "ICPE", "Environnement", "Rejets atmosphériques"),
        ]
    }

    #[tokio::test]
    async fn applied_search_fills_results_and_announces_count() {
        let gateway = Arc::new(MockGateway::with_catalog(catalog()));
        let (exec, buffer, notifier) = setup(gateway);

        let outcome = exec.search(&SearchFilters::new("fire safety", "", "")).await;

        assert_eq!(outcome.count(), Some(2));
        assert_eq!(buffer.read().await.len(), 2);
        let n = notifier.current().await.unwrap();
        assert_eq!(n.message, "2 résultats trouvés");
        assert_eq!(n.kind, NotificationKind::Success);
    }

    #[tokio::test]
    async fn empty_result_is_not_an_error() {
        let gateway = Arc::new(MockGateway::with_catalog(catalog()));
        let (exec, buffer, notifier) = setup(gateway);
        let outcome = exec.search(&SearchFilters::new("amiante", "", "")).await;
        assert_eq!(outcome, SearchOutcome::Applied(Vec::new()));
        assert!(buffer.read().await.is_empty());
        assert_eq!(notifier.current().await.unwrap().message, "0 résultats trouvés");
    }

    #[tokio::test]
    async fn failure_keeps_previous_results() {
        let gateway = Arc::new(MockGateway::with_catalog(catalog()));
        let (exec, buffer, notifier) = setup(Arc::clone(&gateway));
        exec.search(&SearchFilters::default()).await;
        let before = buffer.read().await.rows().to_vec();

        gateway.fail(MockCall::SearchRegulations);
        let outcome = exec.search(&SearchFilters::new("fire", "", "")).await;

        assert_eq!(outcome, SearchOutcome::Failed);
        assert_eq!(buffer.read().await.rows(), &before[..]);
        let n = notifier.current().await.unwrap();
        assert_eq!(n.kind, NotificationKind::Error);
        assert_eq!(n.message, SEARCH_FAILED);
    }

    #[tokio::test(start_paused = true)]
    async fn slower_older_search_cannot_overwrite_newer_results() {
        let gateway = Arc::new(MockGateway::with_catalog(catalog()));
        gateway.delay_search("rejets", Duration::from_millis(500));
        let (exec, buffer, notifier) = setup(gateway);
        let mut rx = notifier.subscribe();

        let slow = SearchFilters::new("rejets", "", "");
        let fast = SearchFilters::new("fire safety", "", "");
        let (first, second) = tokio::join!(exec.search(&slow), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            exec.search(&fast).await
        });

        assert_eq!(first, SearchOutcome::Superseded);
        assert_eq!(second.count(), Some(2));
        let ids: Vec<i64> = buffer.read().await.rows().iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(rx.recv().await.unwrap().message, "2 résultats trouvés");
        assert!(rx.try_recv().is_err());
        assert!(!exec.is_searching());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn announced_count_always_matches_the_applied_results() {
        let gateway = Arc::new(MockGateway::with_catalog(catalog()));
        let (exec, buffer, notifier) = setup(gateway);
        let exec = Arc::new(exec);

        for _ in 0..50 {
            let tasks: Vec<_> = ["fire safety", "rejets", "fire safety", "rejets"]
                .into_iter()
                .map(|query| {
                    let exec = Arc::clone(&exec);
                    tokio::spawn(async move {
                        exec.search(&SearchFilters::new(query, "", "")).await
                    })
                })
                .collect();
            for task in tasks {
                task.await.unwrap();
            }

            let shown = buffer.read().await.len();
            assert_eq!(
                notifier.current().await.unwrap().message,
                format!("{shown} résultats trouvés")
            );
        }
        assert!(!exec.is_searching());
    }

    #[tokio::test]
    async fn new_search_discards_pending_edits() {
        let gateway = Arc::new(MockGateway::with_catalog(catalog()));
        let (exec, buffer, _) = setup(gateway);
        exec.search(&SearchFilters::default()).await;
        buffer
            .write()
            .await
            .set_field(1, audit_types::AuditEdit::Owner(Some("Claire".into())))
            .unwrap();

        exec.search(&SearchFilters::default()).await;

        assert_eq!(buffer.read().await.get(1).unwrap().owner, None);
    }
}
