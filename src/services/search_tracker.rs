// src/services/search_tracker.rs
// DOCUMENTATION: Sequencing of re-entrant searches
// PURPOSE: Discard results of a search once a newer one was issued by the
// same client (last request wins)

use crate::errors::CareError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Handle for one in-flight search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    pub client_id: String,
    pub sequence: u64,
}

/// Per-client bookkeeping, dropped once no search of the client is in flight
#[derive(Debug, Clone, Copy)]
struct ClientSearches {
    newest: u64,
    in_flight: usize,
    touched: Instant,
}

/// Issues monotonically increasing sequence numbers per client
#[derive(Debug, Default)]
pub struct SearchTracker {
    next_sequence: AtomicU64,
    clients: RwLock<HashMap<String, ClientSearches>>,
}

impl SearchTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new search for `client_id`, superseding earlier ones
    pub async fn begin(&self, client_id: &str) -> SearchTicket {
        let sequence = self.next_sequence.fetch_add(1, Ordering::SeqCst) + 1;

        let mut clients = self.clients.write().await;
        let entry = clients
            .entry(client_id.to_string())
            .or_insert(ClientSearches {
                newest: 0,
                in_flight: 0,
                touched: Instant::now(),
            });
        entry.newest = entry.newest.max(sequence);
        entry.in_flight += 1;
        entry.touched = Instant::now();

        log::debug!("Search {} started for client {}", sequence, client_id);
        SearchTicket {
            client_id: client_id.to_string(),
            sequence,
        }
    }

    /// Whether no newer search was issued for the ticket's client
    pub async fn is_current(&self, ticket: &SearchTicket) -> bool {
        let clients = self.clients.read().await;
        clients
            .get(&ticket.client_id)
            .map_or(true, |searches| ticket.sequence >= searches.newest)
    }

    /// Release the ticket and hand back `result` only if the search is still
    /// the latest one
    pub async fn complete<T>(&self, ticket: &SearchTicket, result: T) -> Result<T, CareError> {
        let current = {
            let mut clients = self.clients.write().await;
            let (current, finished) = match clients.get_mut(&ticket.client_id) {
                Some(searches) => {
                    searches.in_flight = searches.in_flight.saturating_sub(1);
                    searches.touched = Instant::now();
                    (ticket.sequence >= searches.newest, searches.in_flight == 0)
                }
                None => (true, false),
            };
            if finished {
                clients.remove(&ticket.client_id);
            }
            current
        };

        if current {
            Ok(result)
        } else {
            log::info!(
                "Discarding stale search {} for client {}",
                ticket.sequence,
                ticket.client_id
            );
            Err(CareError::SearchSuperseded(ticket.sequence))
        }
    }

    /// Number of clients with bookkeeping
    pub async fn client_count(&self) -> usize {
        self.clients.read().await.len()
    }

    /// Drop clients untouched for longer than `max_idle`
    /// Covers searches whose request was cancelled before completing
    pub async fn purge_idle(&self, max_idle: Duration) -> usize {
        let mut clients = self.clients.write().await;
        let before = clients.len();
        clients.retain(|_, searches| searches.touched.elapsed() < max_idle);
        let removed = before - clients.len();

        if removed > 0 {
            log::info!(
                "Search tracker cleanup: removed {} idle clients ({} remaining)",
                removed,
                clients.len()
            );
        }
        removed
    }
}

/// Start background cleanup task
/// DOCUMENTATION: Periodically removes clients whose searches were abandoned
pub fn start_cleanup_task(tracker: Arc<SearchTracker>, interval_seconds: u64, max_idle: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));

        loop {
            interval.tick().await;
            tracker.purge_idle(max_idle).await;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequences_increase() {
        let tracker = SearchTracker::new();
        let first = tokio_test::block_on(tracker.begin("tab-1"));
        let second = tokio_test::block_on(tracker.begin("tab-2"));
        assert!(second.sequence > first.sequence);
    }

    #[tokio::test]
    async fn test_stale_search_is_discarded() {
        let tracker = SearchTracker::new();
        let older = tracker.begin("tab-1").await;
        let newer = tracker.begin("tab-1").await;

        // newer resolves first, older resolves late
        assert_eq!(tracker.complete(&newer, vec![1, 2]).await.unwrap(), vec![1, 2]);
        let stale = tracker.complete(&older, vec![3]).await;
        assert!(matches!(stale, Err(CareError::SearchSuperseded(seq)) if seq == older.sequence));
    }

    #[tokio::test]
    async fn test_clients_do_not_supersede_each_other() {
        let tracker = SearchTracker::new();
        let a = tracker.begin("tab-a").await;
        let _b = tracker.begin("tab-b").await;
        assert!(tracker.is_current(&a).await);
    }

    #[tokio::test]
    async fn test_completed_searches_leave_no_entries() {
        let tracker = SearchTracker::new();
        for i in 0..500 {
            let ticket = tracker.begin(&format!("client-{}", i)).await;
            tracker.complete(&ticket, ()).await.unwrap();
        }
        assert_eq!(tracker.client_count().await, 0);

        let older = tracker.begin("tab").await;
        let newer = tracker.begin("tab").await;
        tracker.complete(&newer, ()).await.unwrap();
        assert_eq!(tracker.client_count().await, 1);
        assert!(tracker.complete(&older, ()).await.is_err());
        assert_eq!(tracker.client_count().await, 0);
    }

    #[tokio::test]
    async fn test_purge_idle_drops_abandoned_searches() {
        let tracker = SearchTracker::new();
        let _abandoned = tracker.begin("closed-tab").await;
        assert_eq!(tracker.purge_idle(Duration::from_secs(60)).await, 0);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(tracker.purge_idle(Duration::from_millis(10)).await, 1);
        assert_eq!(tracker.client_count().await, 0);
    }
}
