//! In-process notifications between independent parts of the app.
//!
//! Subscribers are plain callbacks run synchronously, in subscription order,
//! after the change they describe has been committed.

use crate::models::{RewardReason, TransactionKind};

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    TransactionUpdated { kind: TransactionKind, id: u64 },
    FincoinsNotification { amount: u64, reason: RewardReason, balance: u64 },
    ProfileUpdated,
    BillPaid { bill_id: u64, next_bill_id: Option<u64> },
}

impl AppEvent {
    pub fn name(&self) -> &'static str {
        match self {
            AppEvent::TransactionUpdated { .. } => "transaction-updated",
            AppEvent::FincoinsNotification { .. } => "fincoins-notification",
            AppEvent::ProfileUpdated => "profile-updated",
            AppEvent::BillPaid { .. } => "bill-paid",
        }
    }
}

type Subscriber = Box<dyn Fn(&AppEvent)>;

#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<Subscriber>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, subscriber: impl Fn(&AppEvent) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    pub fn emit(&self, event: &AppEvent) {
        log::debug!("event {}: {event:?}", event.name());
        for subscriber in &self.subscribers {
            subscriber(event);
        }
    }
}

#[cfg(test)]
pub(crate) fn recording_bus() -> (EventBus, std::rc::Rc<std::cell::RefCell<Vec<AppEvent>>>) {
    let seen = std::rc::Rc::new(std::cell::RefCell::new(Vec::new()));
    let sink = seen.clone();
    let mut bus = EventBus::new();
    bus.subscribe(move |e| sink.borrow_mut().push(e.clone()));
    (bus, seen)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_reaches_all_subscribers_in_order() {
        let (mut bus, seen) = recording_bus();
        let second = std::rc::Rc::new(std::cell::Cell::new(0));
        let counter = second.clone();
        bus.subscribe(move |_| counter.set(counter.get() + 1));

        bus.emit(&AppEvent::ProfileUpdated);
        bus.emit(&AppEvent::TransactionUpdated { kind: TransactionKind::Expense, id: 7 });

        assert_eq!(
            *seen.borrow(),
            vec![
                AppEvent::ProfileUpdated,
                AppEvent::TransactionUpdated { kind: TransactionKind::Expense, id: 7 },
            ]
        );
        assert_eq!(second.get(), 2);
    }

    #[test]
    fn test_event_names() {
        assert_eq!(AppEvent::ProfileUpdated.name(), "profile-updated");
        assert_eq!(
            AppEvent::BillPaid { bill_id: 1, next_bill_id: None }.name(),
            "bill-paid"
        );
    }

    #[test]
    fn test_emit_without_subscribers_is_noop() {
        EventBus::new().emit(&AppEvent::ProfileUpdated);
    }
}
