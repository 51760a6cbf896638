//! Shared handle to a route table.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use trellis_core::{HandlerReference, RouteError, RouteKind};

use crate::table::{RouteEntry, RouteTable};

struct Inner {
    table: RwLock<RouteTable>,
    rejected: Mutex<Vec<RouteError>>,
}

/// Cheaply clonable handle to one route table.
///
/// The router writes through it during the registration window and the
/// dispatch engine reads from it at each trigger. Readers take clones of the
/// per-kind lists so no lock is held while handlers run.
#[derive(Clone)]
pub struct RouteRegistry {
    inner: Arc<Inner>,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                table: RwLock::new(RouteTable::new()),
                rejected: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Read access to the table.
    pub fn read(&self) -> RwLockReadGuard<'_, RouteTable> {
        self.inner.table.read()
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, RouteTable> {
        self.inner.table.write()
    }

    /// Clone of the whole table.
    pub fn snapshot(&self) -> RouteTable {
        self.read().clone()
    }

    /// Clone of the full routes of `kind`.
    pub fn entries(&self, kind: RouteKind) -> Vec<RouteEntry> {
        self.read().entries(kind).to_vec()
    }

    /// Clone of the model-only routes of `kind`.
    pub fn models(&self, kind: RouteKind) -> Vec<HandlerReference> {
        self.read().models(kind).to_vec()
    }

    pub(crate) fn reject(&self, error: RouteError) {
        self.inner.rejected.lock().push(error);
    }

    /// Usage errors raised by registrations against this table.
    pub fn rejected(&self) -> Vec<RouteError> {
        self.inner.rejected.lock().clone()
    }
}

impl Default for RouteRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RouteRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteRegistry")
            .field("routes", &self.read().len())
            .field("rejected", &self.inner.rejected.lock().len())
            .finish()
    }
}
