//! The pending-order store: the one piece of process-wide mutable state,
//! shared between the ingest path (inserts) and the review workflow
//! (status updates and removals).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

/// Disposition of an order. `Pending` transitions exactly once to one of the
/// terminal states and never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    /// Received and waiting for a reviewer.
    Pending,
    /// A result was composed and sent downstream.
    Processed,
    /// Rejected by the reviewer, no result sent.
    Discarded,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Processed | OrderStatus::Discarded)
    }
}

/// The structured fields extracted from one inbound order message.
/// Empty strings mean "not present in the message and no fallback applies".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFields {
    pub sending_application: String,
    pub sending_facility: String,
    pub message_control_id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub patient_dob: String,
    pub patient_sex: String,
    pub patient_address: String,
    pub patient_phone: String,
    pub encounter_id: String,
    pub placer_order_number: String,
    pub filler_order_number: String,
    pub ordering_provider: String,
    /// Always non-empty: extraction fails rather than store an order whose
    /// test is unknown.
    pub test_code: String,
    pub test_name: String,
    pub test_coding_system: String,
}

/// One accepted order, as held by the store.
#[derive(Debug, Clone)]
pub struct OrderRecord {
    pub id: Uuid,
    /// The decoded HL7 text exactly as received.
    pub raw_message: String,
    pub fields: OrderFields,
    pub status: OrderStatus,
    pub received_at: DateTime<Utc>,
    /// Set exactly once, when the status leaves `Pending`.
    pub processed_at: Option<DateTime<Utc>>,
    /// The composed ORU text, once a result was successfully built.
    pub result_message: Option<String>,
}

/// Concurrency-safe map of order id to record. Every operation takes the one
/// lock; reads hand out clones so callers never observe in-place mutation.
#[derive(Default)]
pub struct OrderStore {
    orders: Mutex<HashMap<Uuid, OrderRecord>>,
}

impl OrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new `Pending` record and returns its freshly assigned id.
    pub fn add(&self, raw_message: String, fields: OrderFields) -> Uuid {
        let id = Uuid::new_v4();
        let record = OrderRecord {
            id,
            raw_message,
            fields,
            status: OrderStatus::Pending,
            received_at: Utc::now(),
            processed_at: None,
            result_message: None,
        };
        self.orders.lock().insert(id, record);
        id
    }

    pub fn get(&self, id: Uuid) -> Option<OrderRecord> {
        self.orders.lock().get(&id).cloned()
    }

    /// A snapshot of every record, in no particular order.
    pub fn get_all(&self) -> Vec<OrderRecord> {
        self.orders.lock().values().cloned().collect()
    }

    /// A snapshot of the records still awaiting review.
    pub fn get_pending(&self) -> Vec<OrderRecord> {
        self.orders
            .lock()
            .values()
            .filter(|r| r.status == OrderStatus::Pending)
            .cloned()
            .collect()
    }

    /// Moves an order out of `Pending`, stamping `processed_at` and recording
    /// the result text when given. Returns `false` when the id is unknown,
    /// when the record has already reached a terminal state, or when asked to
    /// re-enter `Pending` — terminal records are immutable.
    pub fn update_status(
        &self,
        id: Uuid,
        status: OrderStatus,
        result_message: Option<String>,
    ) -> bool {
        let mut orders = self.orders.lock();
        let Some(record) = orders.get_mut(&id) else {
            return false;
        };
        if record.status.is_terminal() || !status.is_terminal() {
            return false;
        }

        record.status = status;
        record.processed_at = Some(Utc::now());
        if result_message.is_some() {
            record.result_message = result_message;
        }
        true
    }

    pub fn remove(&self, id: Uuid) -> bool {
        self.orders.lock().remove(&id).is_some()
    }

    /// Deletes every record in a terminal state; returns how many went.
    pub fn clear_processed(&self) -> usize {
        let mut orders = self.orders.lock();
        let before = orders.len();
        orders.retain(|_, r| !r.status.is_terminal());
        before - orders.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn fields(test_code: &str) -> OrderFields {
        OrderFields {
            test_code: test_code.to_string(),
            ..OrderFields::default()
        }
    }

    #[test]
    fn add_assigns_distinct_ids_and_starts_pending() {
        let store = OrderStore::new();
        let a = store.add("MSH|...".into(), fields("BMP"));
        let b = store.add("MSH|...".into(), fields("GLUCOSE"));
        assert_ne!(a, b);

        let record = store.get(a).unwrap();
        assert_eq!(record.status, OrderStatus::Pending);
        assert!(record.processed_at.is_none());
        assert!(record.result_message.is_none());
    }

    #[test]
    fn get_pending_filters_out_terminal_records() {
        let store = OrderStore::new();
        let a = store.add("a".into(), fields("BMP"));
        let _b = store.add("b".into(), fields("BMP"));
        assert!(store.update_status(a, OrderStatus::Discarded, None));

        let pending = store.get_pending();
        assert_eq!(pending.len(), 1);
        assert_eq!(store.get_all().len(), 2);
    }

    #[test]
    fn update_status_stamps_time_and_result() {
        let store = OrderStore::new();
        let id = store.add("a".into(), fields("BMP"));
        assert!(store.update_status(id, OrderStatus::Processed, Some("ORU...".into())));

        let record = store.get(id).unwrap();
        assert_eq!(record.status, OrderStatus::Processed);
        assert!(record.processed_at.is_some());
        assert_eq!(record.result_message.as_deref(), Some("ORU..."));
    }

    #[test]
    fn terminal_records_are_immutable() {
        let store = OrderStore::new();
        let id = store.add("a".into(), fields("BMP"));
        assert!(store.update_status(id, OrderStatus::Processed, Some("first".into())));
        let stamped = store.get(id).unwrap().processed_at;

        // any further transition must be refused and change nothing
        assert!(!store.update_status(id, OrderStatus::Discarded, Some("second".into())));
        assert!(!store.update_status(id, OrderStatus::Pending, None));

        let record = store.get(id).unwrap();
        assert_eq!(record.status, OrderStatus::Processed);
        assert_eq!(record.processed_at, stamped);
        assert_eq!(record.result_message.as_deref(), Some("first"));
    }

    #[test]
    fn pending_cannot_be_reentered() {
        let store = OrderStore::new();
        let id = store.add("a".into(), fields("BMP"));
        assert!(!store.update_status(id, OrderStatus::Pending, None));
        assert_eq!(store.get(id).unwrap().status, OrderStatus::Pending);
    }

    #[test]
    fn update_status_on_unknown_id_is_a_refused_noop() {
        let store = OrderStore::new();
        assert!(!store.update_status(Uuid::new_v4(), OrderStatus::Processed, None));
    }

    #[test]
    fn remove_and_clear_processed() {
        let store = OrderStore::new();
        let a = store.add("a".into(), fields("BMP"));
        let b = store.add("b".into(), fields("BMP"));
        let c = store.add("c".into(), fields("BMP"));

        assert!(store.remove(a));
        assert!(!store.remove(a));

        store.update_status(b, OrderStatus::Processed, None);
        store.update_status(c, OrderStatus::Discarded, None);
        assert_eq!(store.clear_processed(), 2);
        assert!(store.get_all().is_empty());
    }

    #[test]
    fn concurrent_adds_lose_nothing() {
        let store = Arc::new(OrderStore::new());
        let handles: Vec<_> = (0..32)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.add(format!("msg {}", i), fields("BMP")))
            })
            .collect();

        let mut ids: Vec<Uuid> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 32);
        assert_eq!(store.get_all().len(), 32);
        assert_eq!(store.get_pending().len(), 32);
    }
}
