use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, RwLock};

use crate::models::{Alert, PendingOrder};

/// Everything the bot remembers about one user. Volatile, process-scoped.
#[derive(Debug, Default)]
pub struct UserState {
    // insertion order preserved for display
    pub watchlist: Vec<String>,
    pub alerts: Vec<Alert>,
    pub pending_order: Option<PendingOrder>,

    // never decremented, so deleted alert ids are never handed out again
    next_alert_id: u64,
}

impl UserState {
    /// Returns false (and changes nothing) when the symbol is already listed.
    pub fn add_watch(&mut self, symbol: &str) -> bool {
        if self.watchlist.iter().any(|s| s == symbol) {
            return false;
        }
        self.watchlist.push(symbol.to_string());
        true
    }

    pub fn remove_watch(&mut self, symbol: &str) -> bool {
        let before = self.watchlist.len();
        self.watchlist.retain(|s| s != symbol);
        self.watchlist.len() != before
    }

    pub fn create_alert(
        &mut self,
        user_id: i64,
        symbol: &str,
        target_price: f64,
        chat_id: i64,
    ) -> Alert {
        self.next_alert_id += 1;
        let alert = Alert {
            id: self.next_alert_id,
            user_id,
            symbol: symbol.to_string(),
            target_price,
            chat_id,
            created_at: Utc::now().timestamp(),
        };
        self.alerts.push(alert.clone());
        alert
    }

    pub fn delete_alert(&mut self, alert_id: u64) -> bool {
        let before = self.alerts.len();
        self.alerts.retain(|a| a.id != alert_id);
        self.alerts.len() != before
    }

    /// A newer request simply replaces whatever was awaiting confirmation.
    pub fn set_pending_order(&mut self, order: PendingOrder) {
        self.pending_order = Some(order);
    }

    /// Clears and returns the pending order, but only when `session` names
    /// the prompt currently on file; a stale prompt's button gets None.
    pub fn take_pending_order(&mut self, session: &str) -> Option<PendingOrder> {
        if self
            .pending_order
            .as_ref()
            .is_some_and(|p| p.session == session)
        {
            self.pending_order.take()
        } else {
            None
        }
    }
}

/// Concurrency-safe map of per-user rows.
///
/// Each user gets their own lock, so two users never contend. Mutations go
/// through [`UserStore::with_user`], which runs a synchronous closure under
/// the row lock; the lock is never held across a market-data or delivery
/// call.
#[derive(Clone, Default)]
pub struct UserStore {
    rows: Arc<RwLock<HashMap<i64, Arc<Mutex<UserState>>>>>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn row(&self, user_id: i64) -> Arc<Mutex<UserState>> {
        if let Some(row) = self.rows.read().await.get(&user_id) {
            return row.clone();
        }
        let mut rows = self.rows.write().await;
        rows.entry(user_id).or_default().clone()
    }

    pub async fn with_user<T>(&self, user_id: i64, f: impl FnOnce(&mut UserState) -> T) -> T {
        let row = self.row(user_id).await;
        let mut state = row.lock().await;
        f(&mut state)
    }

    /// Consistent copy of every user's alert list for one monitor pass.
    /// Concurrent additions and deletions land in the next pass.
    pub async fn alerts_snapshot(&self) -> Vec<(i64, Vec<Alert>)> {
        let rows: Vec<(i64, Arc<Mutex<UserState>>)> = {
            let map = self.rows.read().await;
            map.iter().map(|(id, row)| (*id, row.clone())).collect()
        };

        let mut out = Vec::with_capacity(rows.len());
        for (user_id, row) in rows {
            let state = row.lock().await;
            if !state.alerts.is_empty() {
                out.push((user_id, state.alerts.clone()));
            }
        }
        out
    }

    /// Compare-and-remove keyed by (user, id); true only for the caller
    /// that actually removed the alert.
    pub async fn remove_alert(&self, user_id: i64, alert_id: u64) -> bool {
        self.with_user(user_id, |u| u.delete_alert(alert_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OrderAction;

    #[tokio::test]
    async fn watchlist_add_is_idempotent() {
        let store = UserStore::new();
        assert!(store.with_user(1, |u| u.add_watch("AAPL")).await);
        assert!(!store.with_user(1, |u| u.add_watch("AAPL")).await);

        let list = store.with_user(1, |u| u.watchlist.clone()).await;
        assert_eq!(list, vec!["AAPL".to_string()]);
    }

    #[tokio::test]
    async fn watchlist_keeps_insertion_order() {
        let store = UserStore::new();
        for s in ["MSFT", "AAPL", "TSLA"] {
            store.with_user(1, |u| u.add_watch(s)).await;
        }
        let list = store.with_user(1, |u| u.watchlist.clone()).await;
        assert_eq!(list, vec!["MSFT", "AAPL", "TSLA"]);
    }

    #[tokio::test]
    async fn alert_ids_are_monotonic_and_never_reused() {
        let store = UserStore::new();
        let a1 = store
            .with_user(1, |u| u.create_alert(1, "MSFT", 300.0, 10))
            .await;
        let a2 = store
            .with_user(1, |u| u.create_alert(1, "MSFT", 310.0, 10))
            .await;
        assert_eq!(a1.id, 1);
        assert_eq!(a2.id, 2);

        assert!(store.remove_alert(1, 1).await);

        let a3 = store
            .with_user(1, |u| u.create_alert(1, "AAPL", 150.0, 10))
            .await;
        assert_eq!(a3.id, 3);
    }

    #[tokio::test]
    async fn alert_ids_are_scoped_per_user() {
        let store = UserStore::new();
        let a = store
            .with_user(1, |u| u.create_alert(1, "MSFT", 300.0, 10))
            .await;
        let b = store
            .with_user(2, |u| u.create_alert(2, "MSFT", 300.0, 20))
            .await;
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 1);

        // removing user 1's alert must not touch user 2's
        assert!(store.remove_alert(1, 1).await);
        assert!(!store.with_user(2, |u| u.alerts.is_empty()).await);
    }

    #[tokio::test]
    async fn remove_alert_reports_absent_ids() {
        let store = UserStore::new();
        assert!(!store.remove_alert(1, 99).await);
    }

    fn pending(session: &str) -> PendingOrder {
        PendingOrder {
            session: session.to_string(),
            symbol: "AAPL".to_string(),
            shares: 10,
            action: OrderAction::Buy,
            reference_price: 150.0,
            chat_id: 10,
        }
    }

    #[tokio::test]
    async fn pending_order_overwrites_and_checks_session() {
        let store = UserStore::new();
        store.with_user(1, |u| u.set_pending_order(pending("old"))).await;
        store.with_user(1, |u| u.set_pending_order(pending("new"))).await;

        // the superseded prompt's button no longer resolves
        assert!(store
            .with_user(1, |u| u.take_pending_order("old"))
            .await
            .is_none());

        let taken = store.with_user(1, |u| u.take_pending_order("new")).await;
        assert_eq!(taken.unwrap().session, "new");

        // and taking it twice fails
        assert!(store
            .with_user(1, |u| u.take_pending_order("new"))
            .await
            .is_none());
    }
}
