//! Fixed-size pool of SQLite connections shared by the benchmark workers.
//!
//! Every read checks out one connection and hands it back when the
//! [`PooledConnection`] guard drops, whichever way the read ends. When all
//! connections are checked out, [`ConnectionPool::get`] blocks until one is
//! returned.

use std::ops::{Deref, DerefMut};
use std::path::Path;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use bench_core::constants::BUSY_TIMEOUT_MS;
use rusqlite::{Connection, OpenFlags};

pub struct ConnectionPool {
    idle: Mutex<Vec<Connection>>,
    returned: Condvar,
    capacity: usize,
}

impl ConnectionPool {
    /// Open `size` connections to the database file at `path`.
    ///
    /// A `size` of zero is treated as one.
    pub fn open(path: &Path, size: usize) -> rusqlite::Result<Self> {
        let capacity = size.max(1);
        let mut idle = Vec::with_capacity(capacity);
        for _ in 0..capacity {
            let conn = Connection::open_with_flags(
                path,
                OpenFlags::SQLITE_OPEN_READ_WRITE
                    | OpenFlags::SQLITE_OPEN_CREATE
                    | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            configure_connection(&conn)?;
            idle.push(conn);
        }
        log::debug!(
            "opened {} pooled connections to {}",
            capacity,
            path.display()
        );

        Ok(Self {
            idle: Mutex::new(idle),
            returned: Condvar::new(),
            capacity,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Connections currently checked in.
    pub fn idle_count(&self) -> usize {
        self.lock_idle().len()
    }

    /// Check out one connection, waiting while the pool is exhausted.
    pub fn get(&self) -> PooledConnection<'_> {
        let mut idle = self.lock_idle();
        loop {
            if let Some(conn) = idle.pop() {
                return PooledConnection {
                    pool: self,
                    conn: Some(conn),
                };
            }
            idle = self
                .returned
                .wait(idle)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn put(&self, conn: Connection) {
        self.lock_idle().push(conn);
        self.returned.notify_one();
    }

    // A worker that panicked mid-read can't leave the Vec half-updated, so a
    // poisoned lock is still safe to use.
    fn lock_idle(&self) -> MutexGuard<'_, Vec<Connection>> {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A checked-out connection. Returned to its pool on drop.
pub struct PooledConnection<'a> {
    pool: &'a ConnectionPool,
    conn: Option<Connection>,
}

impl Deref for PooledConnection<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        // Only `drop` takes the connection out.
        self.conn.as_ref().expect("pooled connection already released")
    }
}

impl DerefMut for PooledConnection<'_> {
    fn deref_mut(&mut self) -> &mut Connection {
        self.conn.as_mut().expect("pooled connection already released")
    }
}

impl Drop for PooledConnection<'_> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.put(conn);
        }
    }
}

/// Per-connection settings for a throwaway benchmark database.
pub fn configure_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS))?;
    conn.execute_batch(
        "PRAGMA synchronous = OFF;
         PRAGMA temp_store = MEMORY;",
    )?;
    Ok(())
}
