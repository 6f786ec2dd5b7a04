use std::{
    any::Any,
    collections::HashMap,
    future::Future,
    marker::PhantomData,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Weak,
    },
    time::Duration,
};

use futures::{future::BoxFuture, FutureExt};
use parking_lot::Mutex;
use tokio::{
    runtime::Handle,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};
use tracing::{debug, warn};

use crate::{
    key::QueryKey,
    state::{QueryOptions, QueryState, QueryStatus},
};

type AnyValue = Arc<dyn Any + Send + Sync>;
type Fetcher = Arc<dyn Fn() -> BoxFuture<'static, anyhow::Result<AnyValue>> + Send + Sync>;
type Listener = Arc<dyn Fn() + Send + Sync>;

/// How long an entry with no subscribers keeps its data before it is evicted.
pub const DEFAULT_GC_TIME: Duration = Duration::from_secs(5 * 60);

struct Subscriber {
    listener: Listener,
    refetch_interval: Option<Duration>,
}

#[derive(Default)]
struct Entry {
    status: QueryStatus,
    data: Option<AnyValue>,
    error: Option<Arc<anyhow::Error>>,
    data_updated_at: Option<Instant>,
    fetcher: Option<Fetcher>,
    subscribers: HashMap<u64, Subscriber>,
    in_flight: usize,
    /// Sequence number of the most recently issued request.
    issued_seq: u64,
    /// Sequence number of the response currently reflected in the entry.
    applied_seq: u64,
    timer: Option<(Duration, JoinHandle<()>)>,
    /// Pending eviction, armed while nobody is subscribed.
    gc: Option<JoinHandle<()>>,
}

impl Entry {
    fn listeners(&self) -> Vec<Listener> {
        self.subscribers
            .values()
            .map(|subscriber| subscriber.listener.clone())
            .collect()
    }

    fn effective_interval(&self) -> Option<Duration> {
        self.subscribers
            .values()
            .filter_map(|subscriber| subscriber.refetch_interval)
            .filter(|interval| !interval.is_zero())
            .min()
    }
}

struct Inner {
    handle: Handle,
    gc_time: Duration,
    entries: Mutex<HashMap<QueryKey, Entry>>,
    next_subscriber: AtomicU64,
}

impl Drop for Inner {
    fn drop(&mut self) {
        for entry in self.entries.get_mut().values_mut() {
            if let Some((_, timer)) = entry.timer.take() {
                timer.abort();
            }
            if let Some(gc) = entry.gc.take() {
                gc.abort();
            }
        }
    }
}

/// Shared polling cache. Cloning is cheap and every clone sees the same
/// key→value map, so create one per application and pass it to whoever
/// needs data.
#[derive(Clone)]
pub struct QueryClient {
    inner: Arc<Inner>,
}

impl QueryClient {
    pub fn new(handle: Handle) -> Self {
        Self::with_gc_time(handle, DEFAULT_GC_TIME)
    }

    /// Idle entries are dropped `gc_time` after their last subscriber left.
    pub fn with_gc_time(handle: Handle, gc_time: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                handle,
                gc_time,
                entries: Mutex::new(HashMap::new()),
                next_subscriber: AtomicU64::new(0),
            }),
        }
    }

    /// Registers interest in `key`. The first subscriber (or the first one
    /// after the query went idle) triggers a request; later subscribers share
    /// whatever is in flight. `on_change` runs after every state change of the
    /// key, outside of the cache lock.
    pub fn subscribe<T, F, Fut, L>(
        &self,
        key: QueryKey,
        fetch: F,
        options: QueryOptions,
        on_change: L,
    ) -> Subscription<T>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
        L: Fn() + Send + Sync + 'static,
    {
        let fetcher: Fetcher = Arc::new(move || {
            let request = fetch();
            async move { request.await.map(|value| Arc::new(value) as AnyValue) }.boxed()
        });
        let id = self.inner.next_subscriber.fetch_add(1, Ordering::Relaxed);

        let should_fetch = {
            let mut entries = self.inner.entries.lock();
            let entry = entries.entry(key.clone()).or_default();
            let was_idle = entry.subscribers.is_empty();
            if let Some(gc) = entry.gc.take() {
                gc.abort();
            }
            entry.fetcher = Some(fetcher);
            entry.subscribers.insert(
                id,
                Subscriber {
                    listener: Arc::new(on_change),
                    refetch_interval: options.refetch_interval,
                },
            );
            self.inner.reschedule(&key, entry);
            entry.in_flight == 0 && (was_idle || entry.status == QueryStatus::Pending)
        };
        debug!(%key, id, "subscribed");

        if should_fetch {
            self.inner.fetch(&key, false);
        }

        Subscription {
            client: self.clone(),
            key,
            id,
            _marker: PhantomData,
        }
    }

    pub fn state<T: Send + Sync + 'static>(&self, key: &QueryKey) -> QueryState<T> {
        let entries = self.inner.entries.lock();
        let Some(entry) = entries.get(key) else {
            return QueryState::pending();
        };
        let data = entry.data.clone().and_then(|value| match value.downcast::<T>() {
            Ok(data) => Some(data),
            Err(_) => {
                warn!(%key, "cached value has a different type than requested");
                None
            }
        });
        QueryState {
            status: entry.status,
            data,
            error: entry.error.clone(),
            is_fetching: entry.in_flight > 0,
            data_updated_at: entry.data_updated_at,
        }
    }

    /// Reads the cached value without subscribing.
    pub fn get_data<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<Arc<T>> {
        self.state::<T>(key).data
    }

    /// Issues a new request for `key` even if one is already in flight. Does
    /// nothing if nobody is subscribed.
    pub fn invalidate(&self, key: &QueryKey) {
        self.inner.fetch(key, true);
    }

    /// Number of keys currently held, idle ones included.
    pub fn cached_keys(&self) -> usize {
        self.inner.entries.lock().len()
    }

    pub fn subscriber_count(&self, key: &QueryKey) -> usize {
        self.inner
            .entries
            .lock()
            .get(key)
            .map_or(0, |entry| entry.subscribers.len())
    }

    /// Whether an interval timer is currently running for `key`.
    pub fn is_polling(&self, key: &QueryKey) -> bool {
        self.inner
            .entries
            .lock()
            .get(key)
            .is_some_and(|entry| entry.timer.is_some())
    }
}

impl Inner {
    fn fetch(self: &Arc<Self>, key: &QueryKey, force: bool) {
        let (fetcher, seq, listeners) = {
            let mut entries = self.entries.lock();
            let Some(entry) = entries.get_mut(key) else {
                return;
            };
            if entry.subscribers.is_empty() {
                return;
            }
            if entry.in_flight > 0 && !force {
                debug!(%key, "request already in flight, skipping");
                return;
            }
            let Some(fetcher) = entry.fetcher.clone() else {
                return;
            };
            entry.issued_seq += 1;
            entry.in_flight += 1;
            (fetcher, entry.issued_seq, entry.listeners())
        };
        debug!(%key, seq, "issuing request");
        notify(&listeners);

        let request = fetcher();
        let inner = Arc::downgrade(self);
        let key = key.clone();
        self.handle.spawn(async move {
            let result = request.await;
            if let Some(inner) = inner.upgrade() {
                inner.complete(&key, seq, result);
            }
        });
    }

    fn complete(&self, key: &QueryKey, seq: u64, result: anyhow::Result<AnyValue>) {
        let listeners = {
            let mut entries = self.entries.lock();
            let Some(entry) = entries.get_mut(key) else {
                return;
            };
            entry.in_flight = entry.in_flight.saturating_sub(1);

            if entry.subscribers.is_empty() {
                debug!(%key, seq, "no subscribers left, discarding response");
                return;
            }

            if seq <= entry.applied_seq {
                debug!(%key, seq, applied = entry.applied_seq, "discarding stale response");
            } else {
                entry.applied_seq = seq;
                match result {
                    Ok(value) => {
                        debug!(%key, seq, "applied response");
                        entry.status = QueryStatus::Success;
                        entry.data = Some(value);
                        entry.error = None;
                        entry.data_updated_at = Some(Instant::now());
                    }
                    Err(err) => {
                        warn!(%key, seq, error = %err, "request failed");
                        entry.status = QueryStatus::Error;
                        entry.error = Some(Arc::new(err));
                    }
                }
            }
            entry.listeners()
        };
        notify(&listeners);
    }

    fn unsubscribe(self: &Arc<Self>, key: &QueryKey, id: u64) {
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.get_mut(key) {
            entry.subscribers.remove(&id);
            self.reschedule(key, entry);
            if entry.subscribers.is_empty() && entry.gc.is_none() {
                entry.gc = Some(self.schedule_gc(key));
            }
        }
        debug!(%key, id, "unsubscribed");
    }

    /// Evicts `key` after `gc_time` unless someone subscribes in between. A
    /// response still in flight at that point finds no entry and is dropped.
    fn schedule_gc(self: &Arc<Self>, key: &QueryKey) -> JoinHandle<()> {
        let inner: Weak<Inner> = Arc::downgrade(self);
        let key = key.clone();
        let gc_time = self.gc_time;
        self.handle.spawn(async move {
            tokio::time::sleep(gc_time).await;
            let Some(inner) = inner.upgrade() else {
                return;
            };
            let mut entries = inner.entries.lock();
            if entries
                .get(&key)
                .is_some_and(|entry| entry.subscribers.is_empty())
            {
                entries.remove(&key);
                debug!(%key, "evicted idle query");
            }
        })
    }

    /// Keeps the interval timer in line with the fastest current subscriber.
    /// Called with the entry locked.
    fn reschedule(self: &Arc<Self>, key: &QueryKey, entry: &mut Entry) {
        let wanted = entry.effective_interval();
        if entry.timer.as_ref().map(|(period, _)| *period) == wanted {
            return;
        }
        if let Some((_, timer)) = entry.timer.take() {
            timer.abort();
        }
        let Some(period) = wanted else {
            debug!(%key, "polling stopped");
            return;
        };

        debug!(%key, ?period, "polling started");
        let inner: Weak<Inner> = Arc::downgrade(self);
        let key = key.clone();
        let timer = self.handle.spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let Some(inner) = inner.upgrade() else {
                    break;
                };
                inner.fetch(&key, false);
            }
        });
        entry.timer = Some((period, timer));
    }
}

fn notify(listeners: &[Listener]) {
    for listener in listeners {
        listener();
    }
}

/// A live interest in one query. Dropping it unsubscribes.
pub struct Subscription<T> {
    client: QueryClient,
    key: QueryKey,
    id: u64,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> Subscription<T> {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub fn state(&self) -> QueryState<T> {
        self.client.state(&self.key)
    }

    pub fn refetch(&self) {
        self.client.invalidate(&self.key);
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.client.inner.unsubscribe(&self.key, self.id);
    }
}
