//! Message delivery tracking.
//!
//! The server is a relay, not a message store. The ledger only remembers
//! enough per message id (author, status, whether it was deleted) to keep
//! `seen` sticky and make deletes idempotent. It is bounded; the oldest ids
//! fall out first and are then treated as unknown.

use std::collections::{HashMap, VecDeque};

use super::{
    entity::DeliveryStatus,
    error::DeliveryError,
    value_object::{DisplayName, MessageId},
};

/// Default number of message ids remembered per room.
pub const DEFAULT_LEDGER_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
struct LedgerEntry {
    author: DisplayName,
    status: DeliveryStatus,
    deleted: bool,
}

#[derive(Debug)]
pub struct MessageLedger {
    entries: HashMap<MessageId, LedgerEntry>,
    order: VecDeque<MessageId>,
    capacity: usize,
}

impl Default for MessageLedger {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_LEDGER_CAPACITY)
    }
}

impl MessageLedger {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    /// Record a freshly broadcast message as `sent`.
    ///
    /// A reused id simply overwrites the previous entry.
    pub fn record_sent(&mut self, id: MessageId, author: DisplayName) {
        self.insert(
            id,
            LedgerEntry {
                author,
                status: DeliveryStatus::Sent,
                deleted: false,
            },
        );
    }

    /// Mark a message seen. Re-marking is fine; unknown ids pass through.
    pub fn mark_seen(&mut self, id: &MessageId) -> Result<(), DeliveryError> {
        match self.entries.get_mut(id) {
            Some(entry) if entry.deleted => {
                Err(DeliveryError::AlreadyDeleted(id.as_str().to_string()))
            }
            Some(entry) => {
                entry.status = DeliveryStatus::Seen;
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Delete a message on behalf of `requester`.
    ///
    /// Known messages may only be deleted by their author. Unknown ids are
    /// accepted and remembered as deleted so a repeat is a no-op.
    pub fn delete(&mut self, id: &MessageId, requester: &DisplayName) -> Result<(), DeliveryError> {
        match self.entries.get_mut(id) {
            Some(entry) if entry.deleted => {
                Err(DeliveryError::AlreadyDeleted(id.as_str().to_string()))
            }
            Some(entry) if entry.author != *requester => {
                Err(DeliveryError::NotAuthor(id.as_str().to_string()))
            }
            Some(entry) => {
                entry.deleted = true;
                Ok(())
            }
            None => {
                self.insert(
                    id.clone(),
                    LedgerEntry {
                        author: requester.clone(),
                        status: DeliveryStatus::Sent,
                        deleted: true,
                    },
                );
                Ok(())
            }
        }
    }

    /// Current status of a live message; `None` when unknown or deleted.
    pub fn status(&self, id: &MessageId) -> Option<DeliveryStatus> {
        self.entries
            .get(id)
            .filter(|entry| !entry.deleted)
            .map(|entry| entry.status)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, id: MessageId, entry: LedgerEntry) {
        if self.entries.insert(id.clone(), entry).is_none() {
            self.order.push_back(id);
        }
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(value: &str) -> DisplayName {
        DisplayName::new(value.to_string()).unwrap()
    }

    #[test]
    fn test_seen_is_sticky() {
        // テスト項目: 既読を2回付けても seen のまま（sent に戻らない）
        // given (前提条件):
        let mut ledger = MessageLedger::default();
        let id = MessageId::from("m1");
        ledger.record_sent(id.clone(), name("alice"));

        // when (操作):
        let first = ledger.mark_seen(&id);
        let second = ledger.mark_seen(&id);

        // then (期待する結果):
        assert!(first.is_ok());
        assert!(second.is_ok());
        assert_eq!(ledger.status(&id), Some(DeliveryStatus::Seen));
    }

    #[test]
    fn test_seen_unknown_id_passes_through() {
        // テスト項目: 未知のメッセージ ID への既読はそのまま通す
        // given (前提条件):
        let mut ledger = MessageLedger::default();

        // when (操作):
        let result = ledger.mark_seen(&MessageId::from("ghost"));

        // then (期待する結果):
        assert!(result.is_ok());
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_delete_twice_is_noop_second_time() {
        // テスト項目: 同じメッセージの2回目の削除はエラー（何もしない）になる
        // given (前提条件):
        let mut ledger = MessageLedger::default();
        let id = MessageId::from("m1");
        ledger.record_sent(id.clone(), name("alice"));

        // when (操作):
        let first = ledger.delete(&id, &name("alice"));
        let second = ledger.delete(&id, &name("alice"));

        // then (期待する結果):
        assert!(first.is_ok());
        assert_eq!(second, Err(DeliveryError::AlreadyDeleted("m1".to_string())));
        assert_eq!(ledger.status(&id), None);
    }

    #[test]
    fn test_delete_unknown_id_is_remembered() {
        // テスト項目: 未知の ID の削除は通し、2回目は何もしない
        // given (前提条件):
        let mut ledger = MessageLedger::default();
        let id = MessageId::from("unknown");

        // when (操作):
        let first = ledger.delete(&id, &name("bob"));
        let second = ledger.delete(&id, &name("bob"));

        // then (期待する結果):
        assert!(first.is_ok());
        assert!(matches!(second, Err(DeliveryError::AlreadyDeleted(_))));
    }

    #[test]
    fn test_delete_by_non_author_is_rejected() {
        // テスト項目: 作成者以外による削除は拒否される
        // given (前提条件):
        let mut ledger = MessageLedger::default();
        let id = MessageId::from("m1");
        ledger.record_sent(id.clone(), name("alice"));

        // when (操作):
        let result = ledger.delete(&id, &name("mallory"));

        // then (期待する結果):
        assert_eq!(result, Err(DeliveryError::NotAuthor("m1".to_string())));
        assert_eq!(ledger.status(&id), Some(DeliveryStatus::Sent));
    }

    #[test]
    fn test_seen_after_delete_is_rejected() {
        // テスト項目: 削除済みメッセージへの既読は拒否される
        // given (前提条件):
        let mut ledger = MessageLedger::default();
        let id = MessageId::from("m1");
        ledger.record_sent(id.clone(), name("alice"));
        ledger.delete(&id, &name("alice")).unwrap();

        // when (操作):
        let result = ledger.mark_seen(&id);

        // then (期待する結果):
        assert!(matches!(result, Err(DeliveryError::AlreadyDeleted(_))));
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        // テスト項目: 容量を超えると最も古い ID から忘れられる
        // given (前提条件):
        let mut ledger = MessageLedger::with_capacity(2);

        // when (操作):
        ledger.record_sent(MessageId::from("m1"), name("alice"));
        ledger.record_sent(MessageId::from("m2"), name("alice"));
        ledger.record_sent(MessageId::from("m3"), name("alice"));

        // then (期待する結果):
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.status(&MessageId::from("m1")), None);
        assert_eq!(
            ledger.status(&MessageId::from("m3")),
            Some(DeliveryStatus::Sent)
        );
    }
}
