//! # Thread Name Resolution
//!
//! Maps numeric thread identifiers to thread names for the formatter's
//! thread slot. Two layers:
//!
//! - [`ThreadRegistry`]: a process-wide registry of live threads, the
//!   runtime's thread-management facility. Threads are registered on their
//!   first logging call (or explicitly by the host framework) and may be
//!   retired with [`ThreadRegistry::unregister`].
//! - [`ThreadNameCache`]: a bounded, insertion-ordered cache of resolved
//!   names. Each calling thread owns an independent instance, so cache
//!   access never takes a lock; the cost is duplicate lookups across
//!   threads for the same ID.
//!
//! Identifiers above [`SYNTHETIC_ID_THRESHOLD`] are treated as synthetic:
//! they are never looked up in the registry and resolve to an
//! `"Unknown thread with ID <id>"` placeholder instead.


use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{OnceLock, RwLock};
use std::thread;

/// Maximum number of entries one thread's name cache may hold.
pub const THREAD_NAME_CACHE_SIZE: usize = 10_000;

/// Prefix of the placeholder name for synthetic thread IDs.
pub const UNKNOWN_THREAD_NAME: &str = "Unknown thread with ID ";

/// Thread IDs above this value are synthetic and never correspond to a
/// registered thread.
pub const SYNTHETIC_ID_THRESHOLD: u64 = (i32::MAX / 2) as u64;

static REGISTRY: OnceLock<ThreadRegistry> = OnceLock::new();

thread_local! {
  static CURRENT_THREAD_ID: Cell<Option<u64>> = Cell::new(None);
  static NAME_CACHE: RefCell<ThreadNameCache> =
    RefCell::new(ThreadNameCache::new(THREAD_NAME_CACHE_SIZE));
}

/// Process-wide registry mapping thread IDs to thread names.
///
/// The registry is also the ID allocator: the standard library exposes no
/// stable numeric thread identifier, so IDs are handed out from an atomic
/// counter starting at 1.
#[derive(Debug)]
pub struct ThreadRegistry {
  names: RwLock<HashMap<u64, String>>,
  next_id: AtomicU64,
}

impl ThreadRegistry {
  fn new() -> Self {
    Self {
      names: RwLock::new(HashMap::new()),
      next_id: AtomicU64::new(1),
    }
  }

  /// Returns the process-wide registry, initializing it on first use.
  pub fn global() -> &'static ThreadRegistry {
    REGISTRY.get_or_init(ThreadRegistry::new)
  }

  /// Records a name for the given thread ID, replacing any previous name.
  pub fn register(&self, id: u64, name: impl Into<String>) {
    if let Ok(mut names) = self.names.write() {
      names.insert(id, name.into());
    }
  }

  /// Registers the calling thread under a fresh ID and returns that ID.
  ///
  /// The name is taken from the OS thread name when set, otherwise
  /// `thread-<id>`.
  pub fn register_current(&self) -> u64 {
    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
    let name = thread::current()
      .name()
      .map(str::to_owned)
      .unwrap_or_else(|| format!("thread-{}", id));
    self.register(id, name);
    id
  }

  /// Looks up the name registered for a thread ID.
  pub fn lookup(&self, id: u64) -> Option<String> {
    self
      .names
      .read()
      .ok()
      .and_then(|names| names.get(&id).cloned())
  }

  /// Removes a thread from the registry. Names already cached per-thread
  /// are unaffected.
  pub fn unregister(&self, id: u64) {
    if let Ok(mut names) = self.names.write() {
      names.remove(&id);
    }
  }
}

/// Returns the calling thread's registry ID, registering the thread on
/// first use. The ID is cached thread-locally, so repeated calls are cheap
/// and stable.
pub fn current_thread_id() -> u64 {
  CURRENT_THREAD_ID.with(|cell| match cell.get() {
    Some(id) => id,
    None => {
      let id = ThreadRegistry::global().register_current();
      cell.set(Some(id));
      id
    },
  })
}

/// A bounded map from thread ID to resolved name with insertion-ordered
/// eviction.
///
/// When an insert pushes the map past its capacity, the oldest entry is
/// removed, bounding memory for processes with extreme thread churn while
/// keeping hot lookups O(1).
#[derive(Debug)]
pub struct ThreadNameCache {
  names: HashMap<u64, String>,
  order: VecDeque<u64>,
  capacity: usize,
}

impl ThreadNameCache {
  /// Creates an empty cache holding at most `capacity` entries.
  pub fn new(capacity: usize) -> Self {
    Self {
      names: HashMap::new(),
      order: VecDeque::new(),
      capacity,
    }
  }

  /// Returns the cached name for a thread ID, if present.
  pub fn get(&self, id: u64) -> Option<&str> {
    self.names.get(&id).map(String::as_str)
  }

  /// Inserts a name, evicting the oldest entry if the cache grows past its
  /// capacity. Re-inserting an existing ID updates the name without
  /// touching the insertion order.
  pub fn insert(&mut self, id: u64, name: String) {
    if self.names.insert(id, name).is_none() {
      self.order.push_back(id);
    }
    while self.names.len() > self.capacity {
      match self.order.pop_front() {
        Some(oldest) => {
          self.names.remove(&oldest);
        },
        None => break,
      }
    }
  }

  /// Number of cached entries.
  pub fn len(&self) -> usize {
    self.names.len()
  }

  /// Whether the cache is empty.
  pub fn is_empty(&self) -> bool {
    self.names.is_empty()
  }

  /// Resolves a thread ID to its display name through this cache.
  ///
  /// - Cache hits return the cached name without consulting the registry.
  /// - Synthetic IDs (above [`SYNTHETIC_ID_THRESHOLD`]) resolve to the
  ///   unknown-thread placeholder and are cached.
  /// - Registry misses return the decimal ID uncached; the thread may
  ///   simply not have registered yet, so the miss is not a stable fact.
  /// - Registry hits are cached.
  pub fn resolve(&mut self, thread_id: u64) -> String {
    if let Some(name) = self.get(thread_id) {
      return name.to_owned();
    }
    if thread_id > SYNTHETIC_ID_THRESHOLD {
      let name = format!("{}{}", UNKNOWN_THREAD_NAME, thread_id);
      self.insert(thread_id, name.clone());
      return name;
    }
    match ThreadRegistry::global().lookup(thread_id) {
      Some(name) => {
        self.insert(thread_id, name.clone());
        name
      },
      None => thread_id.to_string(),
    }
  }
}

/// Resolves a thread ID using the calling thread's own cache instance.
pub fn resolve_thread_name(thread_id: u64) -> String {
  NAME_CACHE.with(|cache| cache.borrow_mut().resolve(thread_id))
}
