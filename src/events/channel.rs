//! Event channel implementation using crossbeam-channel.
//!
//! Sending never blocks: a full or disconnected channel drops the event.
//! The indexer must keep running no matter how slow the observer is.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::Event;

/// Default channel capacity
pub const DEFAULT_CAPACITY: usize = 1024;

/// Sends events from the indexer.
///
/// Cheap to clone and safe to share across fingerprint workers.
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<Event>,
    dropped: Arc<AtomicU64>,
}

impl EventSender {
    /// Create a new EventSender from a raw crossbeam sender.
    pub fn new(sender: Sender<Event>) -> Self {
        Self {
            inner: sender,
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Send an event without blocking.
    ///
    /// If the channel is full the event is counted and discarded. If the
    /// receiver is gone the event is silently discarded.
    pub fn send(&self, event: Event) {
        match self.inner.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            }
            Err(TrySendError::Disconnected(_)) => {}
        }
    }

    /// Shorthand for a status line
    pub fn status(&self, message: impl Into<String>) {
        self.send(Event::status(message));
    }

    /// Number of events dropped because the channel was full
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Receives events from the indexer.
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Block until the next event is received
    pub fn recv(&self) -> Option<Event> {
        self.inner.recv().ok()
    }

    /// Try to receive an event without blocking
    pub fn try_recv(&self) -> Option<Event> {
        self.inner.try_recv().ok()
    }

    /// Returns an iterator over received events
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }
}

/// Constructors for indexer event channels.
pub struct EventChannel;

impl EventChannel {
    /// Create a channel with the default capacity.
    pub fn new() -> (EventSender, EventReceiver) {
        Self::bounded(DEFAULT_CAPACITY)
    }

    /// Create a bounded event channel with the specified capacity.
    pub fn bounded(capacity: usize) -> (EventSender, EventReceiver) {
        let (sender, receiver) = bounded(capacity);
        (EventSender::new(sender), EventReceiver { inner: receiver })
    }
}

impl Default for EventChannel {
    fn default() -> Self {
        EventChannel
    }
}

/// A no-op event sender for when you don't need progress reporting.
pub fn null_sender() -> EventSender {
    let (sender, _receiver) = EventChannel::bounded(1);
    sender
}

/// Receives human-readable log lines from a scan.
///
/// `size_hint` is 0 for status lines and the file size for found-file
/// lines.
pub trait LogObserver: Send + 'static {
    fn on_log_message(&self, message: &str, size_hint: u64);
}

impl<F> LogObserver for F
where
    F: Fn(&str, u64) + Send + 'static,
{
    fn on_log_message(&self, message: &str, size_hint: u64) {
        self(message, size_hint)
    }
}

/// Drain `receiver` on a background thread, forwarding log lines to `observer`.
///
/// The thread exits once every sender has been dropped.
pub fn spawn_observer<O: LogObserver>(receiver: EventReceiver, observer: O) -> JoinHandle<()> {
    thread::spawn(move || {
        for event in receiver.iter() {
            if let Event::Log { message, size_hint } = event {
                observer.on_log_message(&message, size_hint);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn events_can_be_sent_across_threads() {
        let (sender, receiver) = EventChannel::new();

        let handle = thread::spawn(move || {
            sender.send(Event::found("Found [Audio] /music/a.flac", 25));
        });

        handle.join().unwrap();

        match receiver.recv().unwrap() {
            Event::Log { size_hint, .. } => assert_eq!(size_hint, 25),
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn null_sender_does_not_panic() {
        let sender = null_sender();
        sender.status("nobody is listening");
        sender.status("still nobody");
    }

    #[test]
    fn full_channel_drops_instead_of_blocking() {
        let (sender, receiver) = EventChannel::bounded(2);

        sender.status("one");
        sender.status("two");
        sender.status("three");

        assert_eq!(sender.dropped(), 1);
        assert!(receiver.try_recv().is_some());
        assert!(receiver.try_recv().is_some());
        assert!(receiver.try_recv().is_none());
    }

    #[test]
    fn observer_receives_log_lines_only() {
        let (sender, receiver) = EventChannel::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let handle = spawn_observer(receiver, move |message: &str, size: u64| {
            sink.lock().unwrap().push((message.to_string(), size));
        });

        sender.status("Scanning /videos");
        sender.send(Event::StateChanged {
            state: super::super::ScanState::Scanning,
        });
        sender.send(Event::found("Found [Video] /videos/a.mkv", 10));
        drop(sender);
        handle.join().unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], ("Scanning /videos".to_string(), 0));
        assert_eq!(seen[1].1, 10);
    }
}
