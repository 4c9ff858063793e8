//! Background stream listeners
//!
//! Each external stream (hand poses, mesh anchors, session events) is read
//! by its own worker thread. Workers block on their source and forward
//! [`AppMessage`]s over one channel to the frame loop, which is the only
//! place state is mutated.
//!
//! Order is preserved within a stream. Nothing orders messages across
//! streams.

use std::collections::VecDeque;
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use throwball_core::{AnchorId, MeshAnchorUpdate, MeshChange};
use throwball_input::HandUpdate;
use throwball_physics::ShapeError;

use crate::session::SessionEvent;

/// A blocking, ordered event stream
///
/// `None` means the stream has closed for good.
pub trait EventSource<T>: Send + 'static {
    fn next_event(&mut self) -> Option<T>;
}

impl<T: Send + 'static> EventSource<T> for Receiver<T> {
    fn next_event(&mut self) -> Option<T> {
        self.recv().ok()
    }
}

/// A finite, pre-recorded stream
pub struct Replay<T> {
    events: VecDeque<T>,
}

impl<T> Replay<T> {
    pub fn new(events: impl IntoIterator<Item = T>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }
}

impl<T: Send + 'static> EventSource<T> for Replay<T> {
    fn next_event(&mut self) -> Option<T> {
        self.events.pop_front()
    }
}

/// Which listener a message came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamKind {
    Hands,
    Meshes,
    Session,
}

impl StreamKind {
    fn thread_name(self) -> &'static str {
        match self {
            StreamKind::Hands => "hand-listener",
            StreamKind::Meshes => "mesh-listener",
            StreamKind::Session => "session-listener",
        }
    }
}

/// Work handed from a listener to the frame loop
#[derive(Debug)]
pub enum AppMessage {
    Hand(HandUpdate),
    /// Mesh event with its collision shape already generated
    Mesh(MeshChange),
    /// Mesh event whose geometry could not be turned into a shape
    MeshSkipped { id: AnchorId, error: ShapeError },
    Session(SessionEvent),
}

/// What travels over the hub channel
enum Delivery {
    Message(AppMessage),
    /// The stream ended; always the last delivery from its listener
    Closed(StreamKind),
}

/// Owns the listener threads and the receiving end of their channel
pub struct StreamHub {
    sender: Sender<Delivery>,
    receiver: Receiver<Delivery>,
    open: usize,
}

impl StreamHub {
    pub fn new() -> Self {
        let (sender, receiver) = channel();
        Self {
            sender,
            receiver,
            open: 0,
        }
    }

    /// Start listening to hand updates
    pub fn listen_hands(&mut self, source: impl EventSource<HandUpdate>) {
        self.spawn(StreamKind::Hands, source, AppMessage::Hand);
    }

    /// Start listening to mesh-anchor updates
    ///
    /// Shape generation happens on the listener thread.
    pub fn listen_meshes(&mut self, source: impl EventSource<MeshAnchorUpdate>) {
        self.spawn(StreamKind::Meshes, source, |update| {
            let id = update.id();
            match update.prepare() {
                Ok(change) => AppMessage::Mesh(change),
                Err(error) => AppMessage::MeshSkipped { id, error },
            }
        });
    }

    /// Start listening to session events
    pub fn listen_session(&mut self, source: impl EventSource<SessionEvent>) {
        self.spawn(StreamKind::Session, source, AppMessage::Session);
    }

    fn spawn<T, S, F>(&mut self, kind: StreamKind, mut source: S, mut map: F)
    where
        S: EventSource<T>,
        F: FnMut(T) -> AppMessage + Send + 'static,
    {
        let sender = self.sender.clone();
        let spawned = thread::Builder::new()
            .name(kind.thread_name().to_string())
            .spawn(move || {
                while let Some(event) = source.next_event() {
                    // If the receiver is dropped, we stop
                    if sender.send(Delivery::Message(map(event))).is_err() {
                        return;
                    }
                }
                let _ = sender.send(Delivery::Closed(kind));
            });

        match spawned {
            Ok(_) => self.open += 1,
            Err(e) => log::error!("Failed to start {}: {}", kind.thread_name(), e),
        }
    }

    /// Number of listeners whose stream has not closed yet
    pub fn open_streams(&self) -> usize {
        self.open
    }

    /// All listeners have closed and their messages were consumed
    pub fn is_finished(&self) -> bool {
        self.open == 0
    }

    fn filter(&mut self, delivery: Delivery) -> Option<AppMessage> {
        match delivery {
            Delivery::Message(message) => Some(message),
            Delivery::Closed(kind) => {
                log::info!("{:?} stream closed", kind);
                self.open = self.open.saturating_sub(1);
                None
            }
        }
    }

    /// Next pending message (non-blocking)
    pub fn poll(&mut self) -> Option<AppMessage> {
        loop {
            match self.receiver.try_recv() {
                Ok(delivery) => {
                    if let Some(message) = self.filter(delivery) {
                        return Some(message);
                    }
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => return None,
            }
        }
    }

    /// Every message available right now, in arrival order
    pub fn drain(&mut self) -> Vec<AppMessage> {
        let mut messages = Vec::new();
        while let Some(message) = self.poll() {
            messages.push(message);
        }
        messages
    }

    /// Block until `count` messages arrived or `timeout` passed
    pub fn collect(&mut self, count: usize, timeout: Duration) -> Vec<AppMessage> {
        let deadline = Instant::now() + timeout;
        let mut messages = Vec::with_capacity(count);

        while messages.len() < count && !self.is_finished() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.receiver.recv_timeout(remaining) {
                Ok(delivery) => messages.extend(self.filter(delivery)),
                Err(RecvTimeoutError::Timeout) => {
                    log::warn!("Timed out waiting for {} stream messages", count - messages.len());
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        messages
    }

    /// Block until every listener has closed, returning what arrived
    pub fn wait_finished(&mut self, timeout: Duration) -> Vec<AppMessage> {
        let deadline = Instant::now() + timeout;
        let mut messages = Vec::new();

        while !self.is_finished() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.receiver.recv_timeout(remaining) {
                Ok(delivery) => messages.extend(self.filter(delivery)),
                Err(_) => break,
            }
        }
        messages
    }
}

impl Default for StreamHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use throwball_core::{MeshGeometry, RigidTransform, Vec3};
    use throwball_input::{Chirality, HandPose};

    const WAIT: Duration = Duration::from_secs(5);

    fn pose_at(x: f32) -> HandUpdate {
        HandUpdate::updated(HandPose::new(Chirality::Right, RigidTransform::from_translation(Vec3::new(x, 0.0, 0.0))))
    }

    #[test]
    fn test_empty_hub_is_finished() {
        let mut hub = StreamHub::new();
        assert!(hub.is_finished());
        assert!(hub.poll().is_none());
    }

    #[test]
    fn test_per_stream_order_preserved() {
        let mut hub = StreamHub::new();
        hub.listen_hands(Replay::new((0..50).map(|i| pose_at(i as f32))));
        hub.listen_session(Replay::new(vec![SessionEvent::Unknown("a".into()), SessionEvent::Unknown("b".into())]));

        let messages = hub.wait_finished(WAIT);
        assert!(hub.is_finished());

        let hands: Vec<f32> = messages
            .iter()
            .filter_map(|m| match m {
                AppMessage::Hand(update) => Some(update.pose.origin_from_anchor.translation.x),
                _ => None,
            })
            .collect();
        assert_eq!(hands, (0..50).map(|i| i as f32).collect::<Vec<_>>());

        let session: Vec<&SessionEvent> = messages
            .iter()
            .filter_map(|m| match m {
                AppMessage::Session(event) => Some(event),
                _ => None,
            })
            .collect();
        assert_eq!(
            session,
            vec![&SessionEvent::Unknown("a".into()), &SessionEvent::Unknown("b".into())]
        );
    }

    #[test]
    fn test_channel_source_and_close() {
        let (tx, rx) = channel();
        let mut hub = StreamHub::new();
        hub.listen_hands(rx);
        assert_eq!(hub.open_streams(), 1);

        tx.send(pose_at(1.0)).unwrap();
        tx.send(pose_at(2.0)).unwrap();
        assert_eq!(hub.collect(2, WAIT).len(), 2);
        assert!(!hub.is_finished());

        drop(tx);
        assert!(hub.wait_finished(WAIT).is_empty());
        assert!(hub.is_finished());
    }

    #[test]
    fn test_mesh_listener_prepares_shapes() {
        let good = MeshAnchorUpdate::Added {
            id: AnchorId::new(),
            origin_from_anchor: RigidTransform::IDENTITY,
            geometry: MeshGeometry::new(vec![Vec3::ZERO, Vec3::X, Vec3::Z], vec![[0, 2, 1]]),
        };
        let bad_id = AnchorId::new();
        let bad = MeshAnchorUpdate::Added {
            id: bad_id,
            origin_from_anchor: RigidTransform::IDENTITY,
            geometry: MeshGeometry::default(),
        };
        let removed = MeshAnchorUpdate::Removed { id: bad_id };

        let mut hub = StreamHub::new();
        hub.listen_meshes(Replay::new(vec![good, bad, removed]));
        let messages = hub.wait_finished(WAIT);

        assert_eq!(messages.len(), 3);
        assert!(matches!(messages[0], AppMessage::Mesh(MeshChange::Added { .. })));
        assert!(matches!(
            &messages[1],
            AppMessage::MeshSkipped { id, error: ShapeError::Empty } if *id == bad_id
        ));
        assert!(matches!(messages[2], AppMessage::Mesh(MeshChange::Removed { .. })));
    }
}
