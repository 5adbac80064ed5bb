//! The layer stack: paint order of every entity on the canvas.
//!
//! Index 0 is the bottom-most entity (painted first), the last index is the
//! top-most. The stack is the single source of truth for both render order and
//! the layer panel. Every mutation publishes a [`LayerChange`] to subscribers.

use crate::{CollageError, CollageResult, DrawableEntity, EntityId};

/// Offset applied to a duplicate's position along both axes.
pub const DUPLICATE_OFFSET: f32 = 10.0;

/// A change published after a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerChange {
    /// An entity was inserted at `index`.
    Added {
        /// Inserted entity.
        id: EntityId,
        /// Stack index it now occupies.
        index: usize,
    },
    /// An entity was removed from `index`.
    Removed {
        /// Removed entity.
        id: EntityId,
        /// Stack index it occupied.
        index: usize,
    },
    /// An entity swapped places with its neighbour.
    Reordered {
        /// Entity that moved.
        id: EntityId,
        /// Previous index.
        from: usize,
        /// New index.
        to: usize,
    },
    /// An entity's properties changed in place.
    Updated {
        /// Changed entity.
        id: EntityId,
    },
}

/// Handle returned by [`LayerStack::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&LayerChange)>;

/// Ordered collection of entities, bottom to top.
#[derive(Default)]
pub struct LayerStack {
    entities: Vec<DrawableEntity>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
    revision: u64,
}

impl std::fmt::Debug for LayerStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerStack")
            .field("entities", &self.entities)
            .field("listeners", &self.listeners.len())
            .field("revision", &self.revision)
            .finish()
    }
}

impl LayerStack {
    /// Create an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener called after every mutation.
    pub fn subscribe(&mut self, listener: impl FnMut(&LayerChange) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    /// Monotonic counter bumped by every mutation.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn publish(&mut self, change: LayerChange) {
        self.revision += 1;
        tracing::debug!("Layer change: {change:?}");
        for (_, listener) in &mut self.listeners {
            listener(&change);
        }
    }

    /// Insert an entity at the top of the stack.
    ///
    /// # Errors
    ///
    /// Returns [`CollageError::DuplicateEntity`] if the ID is already present.
    pub fn append(&mut self, entity: DrawableEntity) -> CollageResult<EntityId> {
        let index = self.entities.len();
        self.insert_at(index, entity)
    }

    /// Insert an entity directly above `anchor`.
    ///
    /// # Errors
    ///
    /// Returns an error if `anchor` is absent or the new ID is already present.
    pub fn insert_above(&mut self, anchor: EntityId, entity: DrawableEntity) -> CollageResult<EntityId> {
        let index = self
            .index_of(anchor)
            .ok_or_else(|| CollageError::EntityNotFound(anchor.to_string()))?;
        self.insert_at(index + 1, entity)
    }

    fn insert_at(&mut self, index: usize, entity: DrawableEntity) -> CollageResult<EntityId> {
        let id = entity.id;
        if self.contains(id) {
            return Err(CollageError::DuplicateEntity(id.to_string()));
        }
        self.entities.insert(index, entity);
        self.publish(LayerChange::Added { id, index });
        Ok(id)
    }

    /// Remove an entity. Absent IDs are a no-op and return `None`.
    pub fn remove(&mut self, id: EntityId) -> Option<DrawableEntity> {
        let index = self.index_of(id)?;
        let entity = self.entities.remove(index);
        self.publish(LayerChange::Removed { id, index });
        Some(entity)
    }

    /// Clone an image entity directly above the original.
    ///
    /// The clone gets a new ID, keeps the source reference and sits
    /// [`DUPLICATE_OFFSET`] pixels right and down of the original.
    ///
    /// # Errors
    ///
    /// Returns [`CollageError::EntityNotFound`] for an absent ID and
    /// [`CollageError::UnsupportedOperation`] for text entities. Either way the
    /// stack is untouched.
    pub fn duplicate(&mut self, id: EntityId) -> CollageResult<EntityId> {
        let original = self
            .get(id)
            .ok_or_else(|| CollageError::EntityNotFound(id.to_string()))?;

        if !original.is_image() {
            return Err(CollageError::UnsupportedOperation(format!(
                "cannot duplicate {} entity {id}; only images can be duplicated",
                original.kind_name()
            )));
        }

        let mut clone = original.clone();
        clone.id = EntityId::new();
        clone.position = original.position.offset(DUPLICATE_OFFSET, DUPLICATE_OFFSET);
        self.insert_above(id, clone)
    }

    /// Swap an entity with the one above it.
    ///
    /// Returns `false` (no-op) if it is already top-most or absent.
    pub fn move_forward(&mut self, id: EntityId) -> bool {
        match self.index_of(id) {
            Some(index) if index + 1 < self.entities.len() => {
                self.swap(id, index, index + 1);
                true
            }
            _ => false,
        }
    }

    /// Swap an entity with the one below it.
    ///
    /// Returns `false` (no-op) if it is already bottom-most or absent.
    pub fn move_backward(&mut self, id: EntityId) -> bool {
        match self.index_of(id) {
            Some(index) if index > 0 => {
                self.swap(id, index, index - 1);
                true
            }
            _ => false,
        }
    }

    fn swap(&mut self, id: EntityId, from: usize, to: usize) {
        self.entities.swap(from, to);
        self.publish(LayerChange::Reordered { id, from, to });
    }

    /// Modify an entity in place. The ID cannot be changed.
    ///
    /// Returns `false` if the entity is absent.
    pub fn update(&mut self, id: EntityId, f: impl FnOnce(&mut DrawableEntity)) -> bool {
        let Some(entity) = self.entities.iter_mut().find(|e| e.id == id) else {
            return false;
        };
        f(entity);
        entity.id = id;
        self.publish(LayerChange::Updated { id });
        true
    }

    /// Entities bottom to top, the order the surface paints them.
    #[must_use]
    pub fn render_order(&self) -> &[DrawableEntity] {
        &self.entities
    }

    /// Entities top to bottom, the order the layer panel lists them.
    pub fn panel_order(&self) -> impl Iterator<Item = &DrawableEntity> {
        self.entities.iter().rev()
    }

    /// Get an entity by ID.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&DrawableEntity> {
        self.entities.iter().find(|e| e.id == id)
    }

    /// Stack index of an entity (0 = bottom).
    #[must_use]
    pub fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entities.iter().position(|e| e.id == id)
    }

    /// Entity at a stack index (0 = bottom).
    #[must_use]
    pub fn at(&self, index: usize) -> Option<&DrawableEntity> {
        self.entities.get(index)
    }

    /// Whether an entity is in the stack.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.index_of(id).is_some()
    }

    /// IDs bottom to top.
    #[must_use]
    pub fn ids(&self) -> Vec<EntityId> {
        self.entities.iter().map(|e| e.id).collect()
    }

    /// Number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the stack is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
