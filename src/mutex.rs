//! Mutex used for every critical section in the pool.
//!
//! The pool keeps three independent critical sections (the scheduler's
//! backing store, the lifecycle/stop state, and connection setup), all of
//! them guarded by this type. It is `parking_lot`'s mutex: no poisoning,
//! so a panicking job cannot wedge the queue.
//!
//! ```
//! use prometheus_conpool::Mutex;
//! use std::collections::VecDeque;
//!
//! let store = Mutex::new(VecDeque::new());
//! store.lock().push_back("job-a");
//! store.lock().push_back("job-b");
//! assert_eq!(store.lock().pop_front(), Some("job-a"));
//! ```

pub use parking_lot::{Mutex, MutexGuard};
