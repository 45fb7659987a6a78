//! Event bus for broadcasting order changes.
//!
//! The bus is the service's notify-on-change boundary: after a status
//! write commits, the engine publishes an event and interested parties
//! (the HTTP layer, background listeners, tests) consume it from their own
//! subscription. Slow subscribers lag and drop rather than backpressuring
//! the engine.

use kusina_types::AdminEvent;
use tokio::sync::broadcast;

/// Broadcast channel for admin events.
#[derive(Clone)]
pub struct EventBus {
	sender: broadcast::Sender<AdminEvent>,
}

impl EventBus {
	/// Creates a new EventBus with the given buffer capacity.
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	/// Publishes an event to all current subscribers.
	///
	/// Returns the number of subscribers that received the event. An
	/// error means no subscriber is listening, which callers may ignore.
	pub fn publish(
		&self,
		event: AdminEvent,
	) -> Result<usize, broadcast::error::SendError<AdminEvent>> {
		self.sender.send(event)
	}

	/// Creates a new subscription receiving events published from now on.
	pub fn subscribe(&self) -> broadcast::Receiver<AdminEvent> {
		self.sender.subscribe()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use kusina_types::{OrderEvent, OrderStatus};

	#[tokio::test]
	async fn test_subscribers_receive_published_events() {
		let bus = EventBus::new(16);
		let mut receiver = bus.subscribe();

		bus.publish(AdminEvent::Order(OrderEvent::StatusChanged {
			order_id: "ord-1".to_string(),
			order_number: "A-1".to_string(),
			from: OrderStatus::Pending,
			to: OrderStatus::Preparing,
		}))
		.unwrap();

		match receiver.recv().await.unwrap() {
			AdminEvent::Order(OrderEvent::StatusChanged { order_id, to, .. }) => {
				assert_eq!(order_id, "ord-1");
				assert_eq!(to, OrderStatus::Preparing);
			},
			other => panic!("unexpected event: {:?}", other),
		}
	}

	#[test]
	fn test_publish_without_subscribers_is_an_ignorable_error() {
		let bus = EventBus::new(16);
		let result = bus.publish(AdminEvent::Order(OrderEvent::Updated {
			order_id: "ord-1".to_string(),
		}));
		assert!(result.is_err());
	}
}
