//! Network reachability.
//!
//! [`ConnectivityMonitor`] is a process-wide handle: clone it and pass it to
//! whatever needs it. The platform behind it is pluggable through
//! [`NetworkPlatform`]; the monitor only listens to the platform while at
//! least one [`ConnectivitySubscription`] is alive.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinHandle;

const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Kind of the currently active network path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Wifi,
    Cellular,
    Ethernet,
    Bluetooth,
    Vpn,
}

impl Transport {
    /// Wi-Fi, cellular and ethernet count as a usable path.
    pub fn is_reachable(self) -> bool {
        matches!(
            self,
            Transport::Wifi | Transport::Cellular | Transport::Ethernet
        )
    }
}

/// Source of network state, typically backed by the OS.
pub trait NetworkPlatform: Send + Sync {
    /// Snapshot of the active transport; must not block.
    fn active_transport(&self) -> Option<Transport>;

    /// Start delivering change notifications to `events`.
    fn register(&self, events: NetworkEvents);

    /// Stop delivering change notifications.
    fn unregister(&self);
}

/// Sink a platform posts change notifications into.
#[derive(Clone)]
pub struct NetworkEvents {
    state: Arc<watch::Sender<bool>>,
}

impl NetworkEvents {
    pub fn available(&self) {
        self.post(true);
    }

    pub fn lost(&self) {
        self.post(false);
    }

    fn post(&self, connected: bool) {
        let changed = self.state.send_if_modified(|current| {
            if *current == connected {
                return false;
            }
            *current = connected;
            true
        });
        if changed {
            log::debug!("Connectivity changed: connected={}", connected);
        }
    }
}

struct MonitorInner {
    platform: Arc<dyn NetworkPlatform>,
    state: Arc<watch::Sender<bool>>,
    subscribers: Mutex<usize>,
}

impl MonitorInner {
    fn events(&self) -> NetworkEvents {
        NetworkEvents {
            state: Arc::clone(&self.state),
        }
    }

    fn snapshot(&self) -> bool {
        self.platform
            .active_transport()
            .is_some_and(Transport::is_reachable)
    }

    fn activate(&self) {
        self.events().post(self.snapshot());
        self.platform.register(self.events());
        log::debug!("Connectivity monitor active, registered with platform");
    }

    fn deactivate(&self) {
        self.platform.unregister();
        log::debug!("Connectivity monitor inactive, unregistered from platform");
    }
}

/// Observable "is a network path reachable" signal.
#[derive(Clone)]
pub struct ConnectivityMonitor {
    inner: Arc<MonitorInner>,
}

impl fmt::Debug for ConnectivityMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectivityMonitor")
            .field("last_known", &*self.inner.state.borrow())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl ConnectivityMonitor {
    pub fn new(platform: Arc<dyn NetworkPlatform>) -> Self {
        let (state, _) = watch::channel(false);
        let inner = MonitorInner {
            platform,
            state: Arc::new(state),
            subscribers: Mutex::new(0),
        };
        inner.events().post(inner.snapshot());

        Self {
            inner: Arc::new(inner),
        }
    }

    /// Best-effort snapshot, read straight from the platform.
    pub fn is_connected(&self) -> bool {
        self.inner.snapshot()
    }

    /// Last value published to subscribers.
    pub fn last_known(&self) -> bool {
        *self.inner.state.borrow()
    }

    pub fn subscriber_count(&self) -> usize {
        *self
            .inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Attach a subscriber. The first one registers with the platform.
    pub fn subscribe(&self) -> ConnectivitySubscription {
        let mut subscribers = self
            .inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *subscribers += 1;
        if *subscribers == 1 {
            self.inner.activate();
        }

        ConnectivitySubscription {
            receiver: self.inner.state.subscribe(),
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Live subscription to connectivity changes. Dropping the last one
/// unregisters the monitor from the platform.
pub struct ConnectivitySubscription {
    receiver: watch::Receiver<bool>,
    inner: Arc<MonitorInner>,
}

impl ConnectivitySubscription {
    pub fn current(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Waits for the next change and returns the new value.
    pub async fn changed(&mut self) -> bool {
        // The sender lives in `inner`, which this subscription keeps alive.
        let _ = self.receiver.changed().await;
        *self.receiver.borrow_and_update()
    }
}

impl Drop for ConnectivitySubscription {
    fn drop(&mut self) {
        let mut subscribers = self
            .inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        *subscribers = subscribers.saturating_sub(1);
        if *subscribers == 0 {
            self.inner.deactivate();
        }
    }
}

/// Platform driven by the host: it calls [`ManualNetwork::set_transport`]
/// from its own network callbacks.
#[derive(Default)]
pub struct ManualNetwork {
    transport: Mutex<Option<Transport>>,
    events: Mutex<Option<NetworkEvents>>,
    registrations: AtomicUsize,
}

impl ManualNetwork {
    pub fn new(transport: Option<Transport>) -> Self {
        Self {
            transport: Mutex::new(transport),
            ..Default::default()
        }
    }

    pub fn connected() -> Self {
        Self::new(Some(Transport::Wifi))
    }

    pub fn disconnected() -> Self {
        Self::new(None)
    }

    pub fn set_transport(&self, transport: Option<Transport>) {
        *self
            .transport
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = transport;

        let events = self
            .events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(events) = events {
            if transport.is_some_and(Transport::is_reachable) {
                events.available();
            } else {
                events.lost();
            }
        }
    }

    /// How many times `register` has been called in total.
    pub fn registrations(&self) -> usize {
        self.registrations.load(Ordering::SeqCst)
    }

    pub fn is_registered(&self) -> bool {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl NetworkPlatform for ManualNetwork {
    fn active_transport(&self) -> Option<Transport> {
        *self
            .transport
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn register(&self, events: NetworkEvents) {
        self.registrations.fetch_add(1, Ordering::SeqCst);
        *self.events.lock().unwrap_or_else(PoisonError::into_inner) = Some(events);
    }

    fn unregister(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }
}

/// Platform that decides reachability by periodically opening a TCP
/// connection to a well-known address.
///
/// A probe cannot tell interfaces apart, so a successful one reports
/// [`Transport::Ethernet`]. A platform built with [`ProbeNetwork::new`]
/// assumes the network is reachable until its first probe completes. Use
/// [`ProbeNetwork::primed`] to start from a measured state.
pub struct ProbeNetwork {
    address: String,
    interval: Duration,
    timeout: Duration,
    reachable: Arc<AtomicBool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl ProbeNetwork {
    pub fn new(address: impl Into<String>, interval: Duration) -> Self {
        Self {
            address: address.into(),
            interval,
            timeout: DEFAULT_PROBE_TIMEOUT,
            reachable: Arc::new(AtomicBool::new(true)),
            task: Mutex::new(None),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Probes once before handing the platform out, so the first
    /// connectivity check reflects a real measurement.
    pub async fn primed(self) -> Self {
        let reachable = self.probe().await;
        log::debug!(
            "Initial probe of {}: {}",
            self.address,
            if reachable { "reachable" } else { "unreachable" }
        );
        self
    }

    /// Probe once right now and remember the outcome.
    pub async fn probe(&self) -> bool {
        let reachable = probe_once(&self.address, self.timeout).await;
        self.reachable.store(reachable, Ordering::Relaxed);
        reachable
    }

    fn stop(&self) {
        if let Some(task) = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            task.abort();
        }
    }
}

async fn probe_once(address: &str, timeout: Duration) -> bool {
    matches!(
        tokio::time::timeout(timeout, TcpStream::connect(address)).await,
        Ok(Ok(_))
    )
}

impl NetworkPlatform for ProbeNetwork {
    fn active_transport(&self) -> Option<Transport> {
        self.reachable
            .load(Ordering::Relaxed)
            .then_some(Transport::Ethernet)
    }

    fn register(&self, events: NetworkEvents) {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => runtime,
            Err(_) => {
                log::warn!("No tokio runtime, connectivity probe for {} not started", self.address);
                return;
            }
        };

        let address = self.address.clone();
        let interval = self.interval;
        let timeout = self.timeout;
        let reachable = Arc::clone(&self.reachable);

        let task = runtime.spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let now = probe_once(&address, timeout).await;
                let before = reachable.swap(now, Ordering::Relaxed);
                if before != now {
                    if now {
                        events.available();
                    } else {
                        events.lost();
                    }
                }
            }
        });

        if let Some(previous) = self
            .task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(task)
        {
            previous.abort();
        }
    }

    fn unregister(&self) {
        self.stop();
    }
}

impl Drop for ProbeNetwork {
    fn drop(&mut self) {
        self.stop();
    }
}
