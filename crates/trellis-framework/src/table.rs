//! In-memory route table.

use std::collections::HashMap;

use trellis_core::{HandlerReference, IdentityKey, RouteKind};

/// One declared full route.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    kind: RouteKind,
    key: IdentityKey,
    controller: HandlerReference,
    model: Option<HandlerReference>,
    view: Option<HandlerReference>,
}

impl RouteEntry {
    pub fn new(kind: RouteKind, key: IdentityKey, controller: HandlerReference) -> Self {
        Self {
            kind,
            key,
            controller,
            model: None,
            view: None,
        }
    }

    pub fn kind(&self) -> RouteKind {
        self.kind
    }

    pub fn key(&self) -> &IdentityKey {
        &self.key
    }

    pub fn controller(&self) -> &HandlerReference {
        &self.controller
    }

    pub fn model(&self) -> Option<&HandlerReference> {
        self.model.as_ref()
    }

    pub fn view(&self) -> Option<&HandlerReference> {
        self.view.as_ref()
    }
}

/// Per-kind route lists, in registration order.
///
/// Full routes are keyed by [`IdentityKey`] inside each kind; model-only
/// routes are bare references.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<RouteKind, Vec<RouteEntry>>,
    models: HashMap<RouteKind, Vec<HandlerReference>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `entry`, overwriting an entry of the same kind and key in place.
    pub fn insert(&mut self, entry: RouteEntry) {
        let entries = self.routes.entry(entry.kind).or_default();
        match entries.iter_mut().find(|e| e.key == entry.key) {
            Some(slot) => *slot = entry,
            None => entries.push(entry),
        }
    }

    /// Attaches a model reference to an existing entry.
    ///
    /// Returns `false` if no entry has that kind and key.
    pub fn attach_model(
        &mut self,
        kind: RouteKind,
        key: &IdentityKey,
        model: HandlerReference,
    ) -> bool {
        match self.get_mut(kind, key) {
            Some(entry) => {
                entry.model = Some(model);
                true
            }
            None => false,
        }
    }

    /// Attaches a view reference to an existing entry.
    pub fn attach_view(&mut self, kind: RouteKind, key: &IdentityKey, view: HandlerReference) -> bool {
        match self.get_mut(kind, key) {
            Some(entry) => {
                entry.view = Some(view);
                true
            }
            None => false,
        }
    }

    /// Appends a model-only route.
    pub fn push_model(&mut self, kind: RouteKind, model: HandlerReference) {
        self.models.entry(kind).or_default().push(model);
    }

    /// Full routes of `kind`, in registration order.
    pub fn entries(&self, kind: RouteKind) -> &[RouteEntry] {
        self.routes.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }

    /// Model-only routes of `kind`, in registration order.
    pub fn models(&self, kind: RouteKind) -> &[HandlerReference] {
        self.models.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn get(&self, kind: RouteKind, key: &IdentityKey) -> Option<&RouteEntry> {
        self.entries(kind).iter().find(|e| &e.key == key)
    }

    fn get_mut(&mut self, kind: RouteKind, key: &IdentityKey) -> Option<&mut RouteEntry> {
        self.routes
            .get_mut(&kind)
            .and_then(|entries| entries.iter_mut().find(|e| &e.key == key))
    }

    /// Total number of full and model-only routes.
    pub fn len(&self) -> usize {
        self.routes.values().map(Vec::len).sum::<usize>()
            + self.models.values().map(Vec::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
