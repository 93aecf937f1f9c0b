//! In-memory table store and connector for development/testing.
//!
//! [`MemoryDatabase`] holds named tables of `(name, age)` rows.
//! [`MemoryConnector`] hands out [`MemoryConnection`]s to it and can be told to
//! fail the next few connects or to take a while connecting, which is enough
//! to exercise the pool's reconnect and connection-setup paths without a real
//! server.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde::Serialize;
use tracing::trace;

use crate::core::{Connector, Credentials, Job, JobError, ResourceError};
use crate::Mutex;

/// Longest accepted `name` value, matching a `VARCHAR(80)` column.
pub const MAX_NAME_LEN: usize = 80;

/// One stored row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    /// Name column.
    pub name: String,
    /// Age column.
    pub age: i64,
    /// Connection that wrote the row.
    pub connection_id: u64,
}

/// Shared in-memory table store. Clones see the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryDatabase {
    tables: Arc<Mutex<HashMap<String, Vec<Row>>>>,
}

impl MemoryDatabase {
    /// Create an empty database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every row in `table`, in insertion order.
    #[must_use]
    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.tables.lock().get(table).cloned().unwrap_or_default()
    }

    /// Number of rows in `table`.
    #[must_use]
    pub fn row_count(&self, table: &str) -> usize {
        self.tables.lock().get(table).map_or(0, Vec::len)
    }

    fn append(&self, table: &str, row: Row) -> usize {
        let mut tables = self.tables.lock();
        let rows = tables.entry(table.to_owned()).or_default();
        rows.push(row);
        rows.len()
    }
}

/// Live handle to a [`MemoryDatabase`].
#[derive(Debug)]
pub struct MemoryConnection {
    id: u64,
    user: String,
    db: MemoryDatabase,
}

impl MemoryConnection {
    /// Connection number, unique per connector.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// User this connection logged in as.
    #[must_use]
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Insert `(name, age)` into `table`, returning the table's new row count.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Driver`] if `name` is longer than
    /// [`MAX_NAME_LEN`].
    pub fn insert(&mut self, table: &str, name: &str, age: i64) -> Result<usize, ResourceError> {
        if name.len() > MAX_NAME_LEN {
            return Err(ResourceError::Driver {
                code: 1406,
                state: "22001".into(),
                message: format!("data too long for column 'name' in table '{table}'"),
            });
        }
        Ok(self.db.append(
            table,
            Row {
                name: name.to_owned(),
                age,
                connection_id: self.id,
            },
        ))
    }
}

/// [`Connector`] for [`MemoryDatabase`] with failure injection.
#[derive(Debug)]
pub struct MemoryConnector {
    db: MemoryDatabase,
    connect_delay: Duration,
    failures_left: AtomicU32,
    next_id: AtomicU64,
    connects: AtomicU64,
    disconnects: AtomicU64,
    connecting: AtomicBool,
    overlapped: AtomicBool,
}

impl MemoryConnector {
    /// Connector to `db` that always succeeds immediately.
    #[must_use]
    pub fn new(db: MemoryDatabase) -> Self {
        Self {
            db,
            connect_delay: Duration::ZERO,
            failures_left: AtomicU32::new(0),
            next_id: AtomicU64::new(0),
            connects: AtomicU64::new(0),
            disconnects: AtomicU64::new(0),
            connecting: AtomicBool::new(false),
            overlapped: AtomicBool::new(false),
        }
    }

    /// Make every connect take `delay`.
    #[must_use]
    pub fn with_connect_delay(mut self, delay: Duration) -> Self {
        self.connect_delay = delay;
        self
    }

    /// Fail the next `count` connect attempts.
    pub fn fail_next_connects(&self, count: u32) {
        self.failures_left.store(count, Ordering::SeqCst);
    }

    /// Successful connects so far.
    #[must_use]
    pub fn connects(&self) -> u64 {
        self.connects.load(Ordering::SeqCst)
    }

    /// Connections handed back so far.
    #[must_use]
    pub fn disconnects(&self) -> u64 {
        self.disconnects.load(Ordering::SeqCst)
    }

    /// Whether two `connect` calls were ever in flight at the same time.
    #[must_use]
    pub fn saw_concurrent_connect(&self) -> bool {
        self.overlapped.load(Ordering::SeqCst)
    }

    /// The database this connector opens connections to.
    #[must_use]
    pub const fn database(&self) -> &MemoryDatabase {
        &self.db
    }

    fn take_failure(&self) -> bool {
        self.failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl Connector for MemoryConnector {
    type Connection = MemoryConnection;

    fn connect(&self, credentials: &Credentials) -> Result<MemoryConnection, ResourceError> {
        if self.connecting.swap(true, Ordering::SeqCst) {
            self.overlapped.store(true, Ordering::SeqCst);
        }
        if !self.connect_delay.is_zero() {
            thread::sleep(self.connect_delay);
        }
        let failed = self.take_failure();
        self.connecting.store(false, Ordering::SeqCst);

        if failed {
            return Err(ResourceError::Connect {
                address: credentials.address.clone(),
                reason: "connection refused".into(),
            });
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.connects.fetch_add(1, Ordering::SeqCst);
        trace!(connection_id = id, user = %credentials.user, "memory connection opened");
        Ok(MemoryConnection {
            id,
            user: credentials.user.clone(),
            db: self.db.clone(),
        })
    }

    fn disconnect(&self, conn: MemoryConnection) {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        trace!(connection_id = conn.id, "memory connection closed");
    }
}

/// Job inserting one `(name, age)` row.
#[derive(Debug, Clone)]
pub struct InsertRow {
    table: String,
    name: String,
    age: i64,
    priority: u32,
}

impl InsertRow {
    /// Insert `(name, age)` into `table` at priority 0.
    pub fn new(table: impl Into<String>, name: impl Into<String>, age: i64) -> Self {
        Self {
            table: table.into(),
            name: name.into(),
            age,
            priority: 0,
        }
    }

    /// Set the priority key.
    #[must_use]
    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }
}

impl Job<MemoryConnection> for InsertRow {
    fn priority(&self) -> u32 {
        self.priority
    }

    fn run(self: Box<Self>, conn: &mut MemoryConnection) -> Result<(), JobError> {
        conn.insert(&self.table, &self.name, self.age)?;
        Ok(())
    }
}
