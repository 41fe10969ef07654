use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Events the bridge emits towards the host container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum HostEvent {
    /// The content grew taller than the host's baseline; carries the
    /// zoom-adjusted height the host should give the container.
    Resize { height: u32 },
}

pub type HostEventReceiver = broadcast::Receiver<HostEvent>;

pub struct EventBus {
    sender: broadcast::Sender<HostEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> HostEventReceiver {
        self.sender.subscribe()
    }

    /// Returns the number of receivers that got the event.
    pub fn publish(&self, event: HostEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(HostEvent::Resize { height: 150 });

        let event = rx.recv().await.unwrap();
        assert_eq!(event, HostEvent::Resize { height: 150 });
    }

    #[tokio::test]
    async fn multiple_subscribers() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        assert_eq!(bus.publish(HostEvent::Resize { height: 10 }), 2);

        assert_eq!(rx1.recv().await.unwrap(), HostEvent::Resize { height: 10 });
        assert_eq!(rx2.recv().await.unwrap(), HostEvent::Resize { height: 10 });
    }

    #[test]
    fn publish_without_subscribers_returns_zero() {
        let bus = EventBus::new(4);
        assert_eq!(bus.publish(HostEvent::Resize { height: 1 }), 0);
    }

    #[test]
    fn try_recv_outside_runtime() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        bus.publish(HostEvent::Resize { height: 320 });
        assert_eq!(rx.try_recv().unwrap(), HostEvent::Resize { height: 320 });
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn resize_event_wire_format() {
        let json = serde_json::to_value(HostEvent::Resize { height: 150 }).unwrap();
        assert_eq!(json, serde_json::json!({"event": "resize", "height": 150}));

        let parsed: HostEvent =
            serde_json::from_str(r#"{"event":"resize","height":42}"#).unwrap();
        assert_eq!(parsed, HostEvent::Resize { height: 42 });
    }
}
