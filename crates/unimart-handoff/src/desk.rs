//! # Handoff Desk
//!
//! Confirms vendor handoffs and customer pickups at the post office.
//!
//! ## Confirm Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  confirm(scan, operator)                                                │
//! │                                                                         │
//! │  key = "{order_id}:{action}"                                            │
//! │    └── running now?      ──► AlreadyInFlight                            │
//! │                                                                         │
//! │  1. fetch order                                                         │
//! │  2. AuditLedger::find(order_id, action)                                 │
//! │        found, order at target or moved on ──► replay (replayed = true)  │
//! │        found, status not applied          ──► skip to step 4            │
//! │  3. assess (soft gate: warning only), AuditLedger::record               │
//! │        fails ──► DependencyFailure (no change)                          │
//! │  4. OrderService::update_status                                         │
//! │        retryable failure ──► backoff, try again (max_attempts)          │
//! │        still failing     ──► ReconciliationRequired { tx_hash, .. }     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Audit always happens before the status change, so a status is never
//! changed without a matching audit entry. Repeat detection reads the
//! ledger, so it holds across desk instances and restarts: a confirm that
//! ended in `ReconciliationRequired` can be repeated from any desk sharing
//! the ledger, and only the status update is retried. The desk itself only
//! remembers which keys are being confirmed right now.

use backoff::backoff::Backoff;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{error, info, instrument, warn};

use crate::collaborators::{AuditLedger, LedgerRecord, OrderService};
use crate::config::RetrySettings;
use crate::error::{HandoffError, HandoffResult};
use unimart_core::{
    assess, parse_scan, AuditEvent, AuditMetadata, AuditReceipt, HandoffAction, HandoffCheck,
    Order, OrderStatus, ScanPayload,
};

// =============================================================================
// Types
// =============================================================================

/// Desk location and operator, stamped into each audit entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorContext {
    pub location: String,
    pub operator: String,
}

/// What the operator sees after scanning, before confirming.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inspection {
    pub scan: ScanPayload,
    pub order: Order,
    pub check: HandoffCheck,
    /// Status the order will move to on confirm.
    pub target_status: OrderStatus,
}

/// Result of a confirmed handoff or pickup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffOutcome {
    pub order_id: String,
    pub action: HandoffAction,
    pub previous_status: OrderStatus,
    pub new_status: OrderStatus,
    pub receipt: AuditReceipt,
    pub warning: Option<String>,
    /// True when the scan had already been confirmed and nothing changed.
    pub replayed: bool,
}

/// An audit receipt plus what was known about the order when it was taken.
#[derive(Debug, Clone)]
struct AuditedHandoff {
    receipt: AuditReceipt,
    previous_status: OrderStatus,
    warning: Option<String>,
}

impl AuditedHandoff {
    /// Rebuilds the audited state from a stored entry. Entries written
    /// before `previous_status` was stamped fall back to `current`.
    fn from_record(record: LedgerRecord, current: OrderStatus) -> Self {
        let previous_status = record.event.metadata.previous_status.unwrap_or(current);
        AuditedHandoff {
            receipt: record.receipt,
            previous_status,
            warning: assess(record.event.action, previous_status).warning,
        }
    }

    fn into_outcome(
        self,
        scan: &ScanPayload,
        new_status: OrderStatus,
        replayed: bool,
    ) -> HandoffOutcome {
        HandoffOutcome {
            order_id: scan.order_id.clone(),
            action: scan.action,
            previous_status: self.previous_status,
            new_status,
            receipt: self.receipt,
            warning: self.warning,
            replayed,
        }
    }
}

type InFlightKeys = Mutex<HashSet<String>>;

fn lock(keys: &InFlightKeys) -> MutexGuard<'_, HashSet<String>> {
    keys.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Holds a scan key for one confirm and releases it on drop.
struct InFlight<'a> {
    keys: &'a InFlightKeys,
    key: String,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        lock(self.keys).remove(&self.key);
    }
}

// =============================================================================
// Handoff Desk
// =============================================================================

/// The post-office desk service. Share it behind an `Arc`.
pub struct HandoffDesk {
    ledger: Arc<dyn AuditLedger>,
    orders: Arc<dyn OrderService>,
    retry: RetrySettings,
    in_flight: InFlightKeys,
}

impl HandoffDesk {
    pub fn new(
        ledger: Arc<dyn AuditLedger>,
        orders: Arc<dyn OrderService>,
        retry: RetrySettings,
    ) -> Self {
        Self {
            ledger,
            orders,
            retry,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Decodes a scan and reports whether the action fits the order.
    ///
    /// Read-only: nothing is audited or changed.
    #[instrument(skip(self, raw_scan))]
    pub async fn inspect(&self, raw_scan: &str) -> HandoffResult<Inspection> {
        let scan = parse_scan(raw_scan)?;
        let order = self.fetch_order(&scan.order_id).await?;

        let check = assess(scan.action, order.status);
        if let Some(warning) = &check.warning {
            warn!(order_id = %scan.order_id, action = %scan.action, %warning, "Unexpected order status");
        }

        Ok(Inspection {
            target_status: scan.action.target_status(),
            scan,
            order,
            check,
        })
    }

    /// Audits the handoff, then moves the order to its next status.
    ///
    /// A status warning does not stop the confirm. A scan the ledger has
    /// already seen is never audited twice.
    #[instrument(skip(self, scan, operator), fields(order_id = %scan.order_id, action = %scan.action))]
    pub async fn confirm(
        &self,
        scan: &ScanPayload,
        operator: &OperatorContext,
    ) -> HandoffResult<HandoffOutcome> {
        let _guard = self.claim(scan.idempotency_key())?;

        let order = self.fetch_order(&scan.order_id).await?;
        let target = scan.action.target_status();

        let prior = self
            .ledger
            .find(&scan.order_id, scan.action)
            .await
            .map_err(|e| e.into_dependency_failure("audit"))?;

        let audited = match prior {
            Some(record) if record.superseded || order.status == target => {
                let audited = AuditedHandoff::from_record(record, order.status);
                info!(tx_hash = %audited.receipt.tx_hash, "Replaying completed handoff");
                return Ok(audited.into_outcome(scan, target, true));
            }
            Some(record) => {
                let audited = AuditedHandoff::from_record(record, order.status);
                info!(tx_hash = %audited.receipt.tx_hash, current = %order.status, "Resuming audited handoff");
                audited
            }
            None => self.audit(scan, operator, &order).await?,
        };

        match self.update_with_retry(&scan.order_id, target).await {
            Ok(order) => {
                let outcome = audited.into_outcome(scan, order.status, false);
                info!(
                    new_status = %outcome.new_status,
                    tx_hash = %outcome.receipt.tx_hash,
                    "Handoff confirmed"
                );
                Ok(outcome)
            }
            Err(e) => {
                error!(
                    tx_hash = %audited.receipt.tx_hash,
                    error = %e,
                    "Audit recorded but status update failed"
                );
                Err(HandoffError::ReconciliationRequired {
                    order_id: scan.order_id.clone(),
                    action: scan.action,
                    tx_hash: audited.receipt.tx_hash,
                    reason: e.to_string(),
                })
            }
        }
    }

    // =========================================================================
    // Steps
    // =========================================================================

    fn claim(&self, key: String) -> HandoffResult<InFlight<'_>> {
        if !lock(&self.in_flight).insert(key.clone()) {
            return Err(HandoffError::AlreadyInFlight { key });
        }
        Ok(InFlight {
            keys: &self.in_flight,
            key,
        })
    }

    async fn fetch_order(&self, order_id: &str) -> HandoffResult<Order> {
        self.orders
            .fetch_order(order_id)
            .await
            .map_err(|e| e.into_dependency_failure("orders"))
    }

    /// Step 3. Any failure here leaves the order untouched.
    async fn audit(
        &self,
        scan: &ScanPayload,
        operator: &OperatorContext,
        order: &Order,
    ) -> HandoffResult<AuditedHandoff> {
        let check = assess(scan.action, order.status);
        if let Some(warning) = &check.warning {
            warn!(current = %order.status, %warning, "Operator confirming despite warning");
        }

        let now = Utc::now();
        let event = AuditEvent {
            order_id: scan.order_id.clone(),
            action: scan.action,
            seller_id: scan.seller_id.clone().or_else(|| order.seller_id.clone()),
            timestamp: now,
            metadata: AuditMetadata {
                timestamp: now,
                location: operator.location.clone(),
                operator: operator.operator.clone(),
                previous_status: Some(order.status),
            },
        };

        let receipt = self.ledger.record(&event).await.map_err(|e| {
            error!(error = %e, "Audit failed, order status left unchanged");
            e.into_dependency_failure("audit")
        })?;

        Ok(AuditedHandoff {
            receipt,
            previous_status: order.status,
            warning: check.warning,
        })
    }

    /// Step 4: the status update, retried with backoff on retryable errors.
    async fn update_with_retry(&self, order_id: &str, target: OrderStatus) -> HandoffResult<Order> {
        let mut backoff = self.retry.backoff();
        let mut attempt = 0u32;

        loop {
            attempt += 1;

            match self.orders.update_status(order_id, target).await {
                Ok(order) => return Ok(order),
                Err(e) if e.is_retryable() && attempt < self.retry.max_attempts => {
                    let delay = backoff.next_backoff().unwrap_or_else(|| self.retry.max_backoff());
                    warn!(attempt, ?delay, error = %e, "Status update failed, retrying");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    #[cfg(test)]
    fn in_flight_len(&self) -> usize {
        lock(&self.in_flight).len()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{SqliteAuditLedger, SqliteOrderService};
    use async_trait::async_trait;
    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use unimart_db::{Database, DbConfig};

    // -------------------------------------------------------------------------
    // Test collaborators
    // -------------------------------------------------------------------------

    #[derive(Default)]
    struct FakeLedger {
        fail: bool,
        calls: AtomicUsize,
        records: Mutex<Vec<LedgerRecord>>,
    }

    #[async_trait]
    impl AuditLedger for FakeLedger {
        async fn record(&self, event: &AuditEvent) -> HandoffResult<AuditReceipt> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail {
                return Err(HandoffError::unavailable("audit", "ledger offline"));
            }
            let receipt = AuditReceipt {
                tx_hash: format!("hash-{}-{n}", event.order_id),
                status: "recorded".into(),
                block_height: n as i64,
            };
            self.records.lock().unwrap().push(LedgerRecord {
                receipt: receipt.clone(),
                event: event.clone(),
                superseded: false,
            });
            Ok(receipt)
        }

        async fn find(
            &self,
            order_id: &str,
            action: HandoffAction,
        ) -> HandoffResult<Option<LedgerRecord>> {
            let records = self.records.lock().unwrap();
            let for_order: Vec<&LedgerRecord> = records
                .iter()
                .filter(|r| r.event.order_id == order_id)
                .collect();
            Ok(for_order
                .iter()
                .rposition(|r| r.event.action == action)
                .map(|i| LedgerRecord {
                    superseded: i + 1 < for_order.len(),
                    ..for_order[i].clone()
                }))
        }
    }

    struct FakeOrders {
        orders: Mutex<HashMap<String, Order>>,
        /// Errors returned by the next update calls, in order.
        update_failures: Mutex<VecDeque<HandoffError>>,
        update_calls: AtomicUsize,
    }

    impl FakeOrders {
        fn with(status: OrderStatus) -> Self {
            let now = Utc::now();
            let order = Order {
                id: "ord-1".into(),
                user_id: "u-1".into(),
                seller_id: Some("vendor-1".into()),
                status,
                total_amount: 2_000,
                created_at: now,
                updated_at: now,
            };
            Self {
                orders: Mutex::new(HashMap::from([(order.id.clone(), order)])),
                update_failures: Mutex::new(VecDeque::new()),
                update_calls: AtomicUsize::new(0),
            }
        }

        fn failing_updates(self, errors: Vec<HandoffError>) -> Self {
            *self.update_failures.lock().unwrap() = errors.into();
            self
        }

        fn status(&self) -> OrderStatus {
            self.orders.lock().unwrap()["ord-1"].status
        }
    }

    #[async_trait]
    impl OrderService for FakeOrders {
        async fn fetch_order(&self, order_id: &str) -> HandoffResult<Order> {
            self.orders
                .lock()
                .unwrap()
                .get(order_id)
                .cloned()
                .ok_or_else(|| HandoffError::not_found("Order", order_id))
        }

        async fn update_status(&self, order_id: &str, status: OrderStatus) -> HandoffResult<Order> {
            self.update_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(err) = self.update_failures.lock().unwrap().pop_front() {
                return Err(err);
            }
            let mut orders = self.orders.lock().unwrap();
            let order = orders
                .get_mut(order_id)
                .ok_or_else(|| HandoffError::not_found("Order", order_id))?;
            order.status = status;
            Ok(order.clone())
        }
    }

    fn fast_retry(max_attempts: u32) -> RetrySettings {
        RetrySettings {
            max_attempts,
            initial_backoff_ms: 1,
            max_backoff_ms: 2,
        }
    }

    fn operator() -> OperatorContext {
        OperatorContext {
            location: "Main Gate Post Office".into(),
            operator: "desk-1".into(),
        }
    }

    fn scan(action: HandoffAction) -> ScanPayload {
        ScanPayload {
            order_id: "ord-1".into(),
            action,
            seller_id: None,
        }
    }

    fn desk(
        ledger: Arc<FakeLedger>,
        orders: Arc<FakeOrders>,
        retry: RetrySettings,
    ) -> HandoffDesk {
        HandoffDesk::new(ledger, orders, retry)
    }

    // -------------------------------------------------------------------------
    // Scenarios
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_handoff_from_processing() {
        let ledger = Arc::new(FakeLedger::default());
        let orders = Arc::new(FakeOrders::with(OrderStatus::Processing));
        let desk = desk(ledger.clone(), orders.clone(), fast_retry(3));

        let outcome = desk
            .confirm(&scan(HandoffAction::Handoff), &operator())
            .await
            .unwrap();

        assert_eq!(outcome.previous_status, OrderStatus::Processing);
        assert_eq!(outcome.new_status, OrderStatus::SentToPostOffice);
        assert!(outcome.warning.is_none());
        assert!(!outcome.replayed);
        assert_eq!(ledger.calls.load(Ordering::SeqCst), 1);
        assert_eq!(orders.status(), OrderStatus::SentToPostOffice);
    }

    #[tokio::test]
    async fn test_audit_failure_leaves_status() {
        let ledger = Arc::new(FakeLedger {
            fail: true,
            ..Default::default()
        });
        let orders = Arc::new(FakeOrders::with(OrderStatus::Processing));
        let desk = desk(ledger.clone(), orders.clone(), fast_retry(3));

        let err = desk
            .confirm(&scan(HandoffAction::Handoff), &operator())
            .await
            .unwrap_err();

        assert!(matches!(err, HandoffError::DependencyFailure { ref service, .. } if service == "audit"));
        assert_eq!(orders.status(), OrderStatus::Processing);
        assert_eq!(orders.update_calls.load(Ordering::SeqCst), 0);
        // the key is released so the operator can try again
        assert_eq!(desk.in_flight_len(), 0);
        assert!(desk
            .confirm(&scan(HandoffAction::Handoff), &operator())
            .await
            .is_err());
        assert_eq!(ledger.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_pickup_before_post_office_warns_but_proceeds() {
        let ledger = Arc::new(FakeLedger::default());
        let orders = Arc::new(FakeOrders::with(OrderStatus::Processing));
        let desk = desk(ledger.clone(), orders.clone(), fast_retry(3));

        let inspection = desk
            .inspect(r#"{"order_id":"ord-1","action":"pickup"}"#)
            .await
            .unwrap();
        assert!(!inspection.check.consistent);
        assert_eq!(inspection.target_status, OrderStatus::Delivered);

        let outcome = desk
            .confirm(&inspection.scan, &operator())
            .await
            .unwrap();
        assert!(outcome
            .warning
            .as_deref()
            .unwrap()
            .contains("item might not be at Post Office yet"));
        assert_eq!(outcome.new_status, OrderStatus::Delivered);
        assert_eq!(ledger.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_repeat_confirm_replays() {
        let ledger = Arc::new(FakeLedger::default());
        let orders = Arc::new(FakeOrders::with(OrderStatus::Confirmed));
        let desk = desk(ledger.clone(), orders.clone(), fast_retry(3));

        let first = desk
            .confirm(&scan(HandoffAction::Handoff), &operator())
            .await
            .unwrap();
        let second = desk
            .confirm(&scan(HandoffAction::Handoff), &operator())
            .await
            .unwrap();

        assert!(second.replayed);
        assert_eq!(second.receipt, first.receipt);
        assert_eq!(second.previous_status, OrderStatus::Confirmed);
        assert_eq!(second.new_status, OrderStatus::SentToPostOffice);
        assert_eq!(ledger.calls.load(Ordering::SeqCst), 1);
        assert_eq!(orders.update_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_repeat_handoff_after_pickup_does_not_rewind() {
        let ledger = Arc::new(FakeLedger::default());
        let orders = Arc::new(FakeOrders::with(OrderStatus::Processing));
        let desk = desk(ledger.clone(), orders.clone(), fast_retry(3));

        let handoff = desk
            .confirm(&scan(HandoffAction::Handoff), &operator())
            .await
            .unwrap();
        desk.confirm(&scan(HandoffAction::Pickup), &operator())
            .await
            .unwrap();

        let again = desk
            .confirm(&scan(HandoffAction::Handoff), &operator())
            .await
            .unwrap();
        assert!(again.replayed);
        assert_eq!(again.receipt, handoff.receipt);
        assert_eq!(orders.status(), OrderStatus::Delivered);
        assert_eq!(ledger.calls.load(Ordering::SeqCst), 2);
        assert_eq!(orders.update_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_second_desk_resumes_audited_handoff() {
        let ledger = Arc::new(FakeLedger::default());
        let orders = Arc::new(FakeOrders::with(OrderStatus::Processing).failing_updates(
            (0..2)
                .map(|_| HandoffError::unavailable("orders", "down"))
                .collect(),
        ));

        let first = desk(ledger.clone(), orders.clone(), fast_retry(2));
        let err = first
            .confirm(&scan(HandoffAction::Handoff), &operator())
            .await
            .unwrap_err();
        assert!(matches!(err, HandoffError::ReconciliationRequired { .. }));
        drop(first);

        let second = desk(ledger.clone(), orders.clone(), fast_retry(2));
        let outcome = second
            .confirm(&scan(HandoffAction::Handoff), &operator())
            .await
            .unwrap();
        assert!(!outcome.replayed);
        assert_eq!(outcome.receipt.tx_hash, "hash-ord-1-1");
        assert_eq!(outcome.previous_status, OrderStatus::Processing);
        assert_eq!(orders.status(), OrderStatus::SentToPostOffice);
        assert_eq!(ledger.calls.load(Ordering::SeqCst), 1);

        let third = desk(ledger.clone(), orders.clone(), fast_retry(2));
        let replay = third
            .confirm(&scan(HandoffAction::Handoff), &operator())
            .await
            .unwrap();
        assert!(replay.replayed);
        assert_eq!(ledger.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_in_flight_keys_are_released() {
        let ledger = Arc::new(FakeLedger::default());
        let orders = Arc::new(FakeOrders::with(OrderStatus::Processing));
        let desk = desk(ledger, orders, fast_retry(1));

        for _ in 0..3 {
            desk.confirm(&scan(HandoffAction::Handoff), &operator())
                .await
                .unwrap();
            assert_eq!(desk.in_flight_len(), 0);
        }

        let missing = ScanPayload {
            order_id: "ord-404".into(),
            action: HandoffAction::Pickup,
            seller_id: None,
        };
        assert!(desk.confirm(&missing, &operator()).await.is_err());
        assert_eq!(desk.in_flight_len(), 0);
    }

    #[tokio::test]
    async fn test_transient_update_failures_are_retried() {
        let ledger = Arc::new(FakeLedger::default());
        let orders = Arc::new(
            FakeOrders::with(OrderStatus::Processing).failing_updates(vec![
                HandoffError::unavailable("orders", "busy"),
                HandoffError::unavailable("orders", "busy"),
            ]),
        );
        let desk = desk(ledger.clone(), orders.clone(), fast_retry(3));

        let outcome = desk
            .confirm(&scan(HandoffAction::Handoff), &operator())
            .await
            .unwrap();

        assert_eq!(outcome.new_status, OrderStatus::SentToPostOffice);
        assert_eq!(orders.update_calls.load(Ordering::SeqCst), 3);
        assert_eq!(ledger.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_exhausted_retries_require_reconciliation() {
        let ledger = Arc::new(FakeLedger::default());
        let orders = Arc::new(FakeOrders::with(OrderStatus::Processing).failing_updates(
            (0..3)
                .map(|_| HandoffError::unavailable("orders", "down"))
                .collect(),
        ));
        let desk = desk(ledger.clone(), orders.clone(), fast_retry(3));

        let err = desk
            .confirm(&scan(HandoffAction::Handoff), &operator())
            .await
            .unwrap_err();

        match err {
            HandoffError::ReconciliationRequired {
                order_id,
                action,
                tx_hash,
                ..
            } => {
                assert_eq!(order_id, "ord-1");
                assert_eq!(action, HandoffAction::Handoff);
                assert_eq!(tx_hash, "hash-ord-1-1");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(orders.status(), OrderStatus::Processing);
        assert_eq!(desk.in_flight_len(), 0);

        // repeating the scan finishes the update without a second audit entry
        let outcome = desk
            .confirm(&scan(HandoffAction::Handoff), &operator())
            .await
            .unwrap();
        assert_eq!(outcome.receipt.tx_hash, "hash-ord-1-1");
        assert_eq!(outcome.previous_status, OrderStatus::Processing);
        assert!(!outcome.replayed);
        assert_eq!(ledger.calls.load(Ordering::SeqCst), 1);
        assert_eq!(orders.status(), OrderStatus::SentToPostOffice);
    }

    #[tokio::test]
    async fn test_rejected_update_is_not_retried() {
        let ledger = Arc::new(FakeLedger::default());
        let orders = Arc::new(
            FakeOrders::with(OrderStatus::Processing)
                .failing_updates(vec![HandoffError::rejected("orders", "read-only")]),
        );
        let desk = desk(ledger, orders.clone(), fast_retry(5));

        let err = desk
            .confirm(&scan(HandoffAction::Handoff), &operator())
            .await
            .unwrap_err();

        assert!(matches!(err, HandoffError::ReconciliationRequired { .. }));
        assert_eq!(orders.update_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_order_is_not_found() {
        let desk = desk(
            Arc::new(FakeLedger::default()),
            Arc::new(FakeOrders::with(OrderStatus::Processing)),
            fast_retry(1),
        );

        let err = desk
            .inspect(r#"{"order_id":"ord-404","action":"handoff"}"#)
            .await
            .unwrap_err();
        assert!(matches!(err, HandoffError::NotFound { .. }));

        let err = desk.inspect("{not json").await.unwrap_err();
        assert!(matches!(err, HandoffError::InvalidArgument(_)));
    }

    #[test]
    fn test_second_claim_is_in_flight() {
        let desk = desk(
            Arc::new(FakeLedger::default()),
            Arc::new(FakeOrders::with(OrderStatus::Processing)),
            fast_retry(1),
        );

        let first = desk.claim("ord-1:handoff".into()).unwrap();
        assert!(matches!(
            desk.claim("ord-1:handoff".into()),
            Err(HandoffError::AlreadyInFlight { .. })
        ));
        let other = desk.claim("ord-1:pickup".into()).unwrap();
        assert_eq!(desk.in_flight_len(), 2);

        drop(first);
        drop(other);
        assert_eq!(desk.in_flight_len(), 0);
        assert!(desk.claim("ord-1:handoff".into()).is_ok());
    }

    #[tokio::test]
    async fn test_confirm_while_in_flight_is_refused() {
        let ledger = Arc::new(FakeLedger::default());
        let orders = Arc::new(FakeOrders::with(OrderStatus::Processing));
        let desk = desk(ledger.clone(), orders, fast_retry(1));

        let _held = desk.claim("ord-1:handoff".into()).unwrap();
        let err = desk
            .confirm(&scan(HandoffAction::Handoff), &operator())
            .await
            .unwrap_err();
        assert!(matches!(err, HandoffError::AlreadyInFlight { ref key } if key == "ord-1:handoff"));
        assert_eq!(ledger.calls.load(Ordering::SeqCst), 0);
    }

    // -------------------------------------------------------------------------
    // Shared SQLite file
    // -------------------------------------------------------------------------

    /// Order service whose status updates are always refused.
    struct DownOrders(SqliteOrderService);

    #[async_trait]
    impl OrderService for DownOrders {
        async fn fetch_order(&self, order_id: &str) -> HandoffResult<Order> {
            self.0.fetch_order(order_id).await
        }

        async fn update_status(&self, _order_id: &str, _status: OrderStatus) -> HandoffResult<Order> {
            Err(HandoffError::unavailable("orders", "offline"))
        }
    }

    async fn open_file(path: &std::path::Path) -> Database {
        Database::new(DbConfig::new(path)).await.unwrap()
    }

    #[tokio::test]
    async fn test_desks_over_one_database_file_share_idempotency() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("desk.db");

        let db = open_file(&path).await;
        let order = db
            .orders()
            .create("u-1", Some("vendor-1"), OrderStatus::Processing, 3_000)
            .await
            .unwrap();
        let scan = ScanPayload {
            order_id: order.id.clone(),
            action: HandoffAction::Handoff,
            seller_id: None,
        };

        // audited, but the status update never lands
        let first = HandoffDesk::new(
            Arc::new(SqliteAuditLedger::new(db.clone())),
            Arc::new(DownOrders(SqliteOrderService::new(db.clone()))),
            fast_retry(1),
        );
        let err = first.confirm(&scan, &operator()).await.unwrap_err();
        let tx_hash = match err {
            HandoffError::ReconciliationRequired { tx_hash, .. } => tx_hash,
            other => panic!("unexpected error: {other}"),
        };
        db.close().await;

        let db = open_file(&path).await;
        let second = HandoffDesk::new(
            Arc::new(SqliteAuditLedger::new(db.clone())),
            Arc::new(SqliteOrderService::new(db.clone())),
            fast_retry(1),
        );
        let outcome = second.confirm(&scan, &operator()).await.unwrap();
        assert!(!outcome.replayed);
        assert_eq!(outcome.receipt.tx_hash, tx_hash);
        assert_eq!(outcome.previous_status, OrderStatus::Processing);
        assert_eq!(outcome.new_status, OrderStatus::SentToPostOffice);
        db.close().await;

        let db = open_file(&path).await;
        let third = HandoffDesk::new(
            Arc::new(SqliteAuditLedger::new(db.clone())),
            Arc::new(SqliteOrderService::new(db.clone())),
            fast_retry(1),
        );
        let replay = third.confirm(&scan, &operator()).await.unwrap();
        assert!(replay.replayed);
        assert_eq!(replay.receipt.tx_hash, tx_hash);

        let entries = db.audit_log().list_for_order(&order.id).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].metadata.previous_status, Some(OrderStatus::Processing));
        assert!(db.audit_log().verify_chain().await.unwrap().is_intact());
    }
}
