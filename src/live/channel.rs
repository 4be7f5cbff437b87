use futures_util::stream::{self, Stream};
use tokio::sync::broadcast::{
    self,
    error::{RecvError, TryRecvError},
};

use super::event::{FrameError, LiveEvent};

/// Something a view can subscribe to for live events.
pub trait EventSource: Send + Sync {
    fn subscribe(&self) -> Subscription;
}

#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    Event(LiveEvent),
    // The subscriber fell behind and this many events were dropped
    Missed(u64),
}

/// One view's handle on an event source. Dropping it (or calling
/// [`Subscription::unsubscribe`]) detaches the view.
pub struct Subscription {
    receiver: broadcast::Receiver<LiveEvent>,
}

impl Subscription {
    // None once the source has shut down
    pub async fn recv(&mut self) -> Option<Delivery> {
        match self.receiver.recv().await {
            Ok(event) => Some(Delivery::Event(event)),
            Err(RecvError::Lagged(missed)) => {
                tracing::warn!(missed, "Live subscriber lagged; events were dropped");
                Some(Delivery::Missed(missed))
            }
            Err(RecvError::Closed) => None,
        }
    }

    // Non-blocking variant for draining whatever is already queued
    pub fn try_recv(&mut self) -> Option<Delivery> {
        match self.receiver.try_recv() {
            Ok(event) => Some(Delivery::Event(event)),
            Err(TryRecvError::Lagged(missed)) => {
                tracing::warn!(missed, "Live subscriber lagged; events were dropped");
                Some(Delivery::Missed(missed))
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => None,
        }
    }

    pub fn into_stream(self) -> impl Stream<Item = Delivery> {
        stream::unfold(self, |mut subscription| async move {
            subscription.recv().await.map(|delivery| (delivery, subscription))
        })
    }

    pub fn unsubscribe(self) {
        tracing::debug!("Live subscription closed");
    }
}

/// In-process fan-out of live events.
///
/// Whatever transport talks to the push server decodes frames and hands
/// them to [`LiveChannel::publish_frame`]; views subscribe here.
#[derive(Clone)]
pub struct LiveChannel {
    sender: broadcast::Sender<LiveEvent>,
}

impl LiveChannel {
    pub fn new(buffer: usize) -> Self {
        let (sender, _) = broadcast::channel(buffer.max(1));
        Self { sender }
    }

    // Returns how many subscribers the event reached
    pub fn publish(&self, event: LiveEvent) -> usize {
        let name = event.name();
        match self.sender.send(event) {
            Ok(receivers) => receivers,
            Err(_) => {
                tracing::debug!(event = name, "No live subscribers for event");
                0
            }
        }
    }

    pub fn publish_frame(&self, frame: &str) -> Result<usize, FrameError> {
        let event = LiveEvent::from_frame(frame).map_err(|e| {
            tracing::warn!(error = ?e, "Skipping undecodable live frame");
            e
        })?;
        Ok(self.publish(event))
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl EventSource for LiveChannel {
    fn subscribe(&self) -> Subscription {
        Subscription { receiver: self.sender.subscribe() }
    }
}
