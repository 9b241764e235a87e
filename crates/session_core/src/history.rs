use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use shared::domain::{HistoryId, HistoryItem};

/// Ordered record of successful generations, in completion order.
///
/// Items only ever get appended; the only removal is a full `clear`.
#[derive(Debug, Clone, Default)]
pub struct HistoryLedger {
    items: Vec<HistoryItem>,
}

impl HistoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, item: HistoryItem) {
        self.items.push(item);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> &[HistoryItem] {
        &self.items
    }

    pub fn get(&self, id: HistoryId) -> Option<&HistoryItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn latest(&self) -> Option<&HistoryItem> {
        self.items.last()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Hands out ids from the creation time in milliseconds, bumped so they stay
/// strictly increasing for the life of the process.
#[derive(Debug, Default)]
pub(crate) struct HistoryIdSource {
    last: AtomicI64,
}

impl HistoryIdSource {
    pub(crate) fn next(&self, now: DateTime<Utc>) -> HistoryId {
        let candidate = now.timestamp_millis();
        let previous = self
            .last
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |prev| {
                Some(candidate.max(prev + 1))
            })
            .unwrap_or_else(|prev| prev);
        HistoryId(candidate.max(previous + 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::domain::{ImagePayload, TransformationState};

    fn item(id: i64, description: &str) -> HistoryItem {
        HistoryItem {
            id: HistoryId(id),
            image_data: ImagePayload::new(format!("img-{id}")),
            thumbnail: ImagePayload::new(format!("img-{id}")),
            description: description.to_string(),
            timestamp: Utc::now(),
            transformation: TransformationState::default(),
        }
    }

    #[test]
    fn append_preserves_insertion_order() {
        let mut ledger = HistoryLedger::new();
        ledger.append(item(1, "Front View"));
        ledger.append(item(2, "Back View"));
        let descriptions: Vec<_> = ledger.items().iter().map(|i| i.description.as_str()).collect();
        assert_eq!(descriptions, ["Front View", "Back View"]);
        assert_eq!(ledger.latest().map(|i| i.id), Some(HistoryId(2)));
    }

    #[test]
    fn lookup_by_id_and_clear() {
        let mut ledger = HistoryLedger::new();
        ledger.append(item(7, "Top-down View"));
        assert_eq!(
            ledger.get(HistoryId(7)).map(|i| i.description.as_str()),
            Some("Top-down View")
        );
        assert!(ledger.get(HistoryId(8)).is_none());

        ledger.clear();
        assert!(ledger.is_empty());
        assert_eq!(ledger.len(), 0);
    }

    #[test]
    fn ids_follow_the_clock_and_never_repeat() {
        let source = HistoryIdSource::default();
        let now = Utc::now();
        let first = source.next(now);
        let second = source.next(now);
        let earlier = source.next(now - chrono::Duration::seconds(5));
        assert_eq!(first.0, now.timestamp_millis());
        assert_eq!(second.0, first.0 + 1);
        assert_eq!(earlier.0, second.0 + 1);
    }
}
