//! Repeating groups
//!
//! A [`ListBit`] owns an ordered collection of homogeneous items built by a
//! factory. Its value is the array of item values. Distributing an array
//! grows or shrinks the collection to match: this is the one place where
//! nodes are created from data.

use crate::error::BlocksError;
use crate::listener::{self, ChangeListener};
use formtree_binding::{validation, value, walker};
use formtree_node::{
    is_reserved_name, ChangeEvent, Container, DataNode, DataValue, ErrorBatch, ErrorOrigin,
    Node, NodeId, NodeKind, RenderSignal, ValidationContext, ValidationError,
};

/// Builds one empty list item
pub type ItemFactory = Box<dyn Fn() -> Box<dyn Node> + Send>;

/// Named repeating group
pub struct ListBit {
    id: NodeId,
    name: String,
    title: String,
    items: Vec<Box<dyn Node>>,
    factory: ItemFactory,
    min_items: Option<usize>,
    max_items: Option<usize>,
    clean_len: usize,
    listeners: Vec<ChangeListener>,
    error: Option<ValidationError>,
    render: RenderSignal,
}

impl std::fmt::Debug for ListBit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListBit")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("items", &self.items)
            .field("min_items", &self.min_items)
            .field("max_items", &self.max_items)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}

fn item_value(item: &dyn Node) -> DataValue {
    match item.as_data() {
        Some(data) => data.value(),
        None => value::collect(item),
    }
}

fn set_item_value(item: &mut dyn Node, value: DataValue) -> bool {
    match item.as_data_mut() {
        Some(data) => data.set_value(value),
        None => value::apply(item, &value),
    }
}

impl ListBit {
    /// Create new empty list bound to `name`
    #[must_use]
    pub fn new<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Node> + Send + 'static,
    {
        let name = name.into();
        Self {
            id: NodeId::new(),
            title: name.clone(),
            name,
            items: Vec::new(),
            factory: Box::new(factory),
            min_items: None,
            max_items: None,
            clean_len: 0,
            listeners: Vec::new(),
            error: None,
            render: RenderSignal::default(),
        }
    }

    /// Set caption
    #[inline]
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Require at least `min` items
    #[inline]
    #[must_use]
    pub fn with_min_items(mut self, min: usize) -> Self {
        self.min_items = Some(min);
        self
    }

    /// Allow at most `max` items
    #[inline]
    #[must_use]
    pub fn with_max_items(mut self, max: usize) -> Self {
        self.max_items = Some(max);
        self
    }

    /// Add change listener
    #[must_use]
    pub fn with_listener(mut self, listener: ChangeListener) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Number of items
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the list has no items
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Item at `index`
    #[must_use]
    pub fn item(&self, index: usize) -> Option<&dyn Node> {
        self.items.get(index).map(|item| &**item)
    }

    /// Append an empty item (user action)
    ///
    /// The caller raises the change notification for the list.
    ///
    /// # Errors
    /// - `BlocksError::ListFull` if the list is at its maximum
    pub fn push_item(&mut self) -> Result<usize, BlocksError> {
        if let Some(max) = self.max_items.filter(|max| self.items.len() >= *max) {
            return Err(BlocksError::ListFull {
                name: self.name.clone(),
                max,
            });
        }
        self.items.push((self.factory)());
        self.render.request();
        Ok(self.items.len() - 1)
    }

    /// Remove the item at `index` (user action)
    ///
    /// The caller raises the change notification for the list.
    ///
    /// # Errors
    /// - `BlocksError::IndexOutOfRange` if there is no such item
    pub fn remove_item(&mut self, index: usize) -> Result<Box<dyn Node>, BlocksError> {
        if index >= self.items.len() {
            return Err(BlocksError::IndexOutOfRange {
                name: self.name.clone(),
                index,
                len: self.items.len(),
            });
        }
        let removed = self.items.remove(index);
        self.render.request();
        Ok(removed)
    }

    fn listeners(list: &mut Self) -> &mut Vec<ChangeListener> {
        &mut list.listeners
    }
}

impl Node for ListBit {
    fn id(&self) -> NodeId {
        self.id
    }

    fn kind(&self) -> NodeKind {
        NodeKind::ListBit
    }

    fn children(&self) -> &[Box<dyn Node>] {
        &self.items
    }

    fn children_mut(&mut self) -> &mut [Box<dyn Node>] {
        &mut self.items
    }

    fn as_data(&self) -> Option<&dyn DataNode> {
        Some(self)
    }

    fn as_data_mut(&mut self) -> Option<&mut dyn DataNode> {
        Some(self)
    }

    fn render_epoch(&self) -> u64 {
        self.render.epoch()
    }
}

impl DataNode for ListBit {
    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn set_name(&mut self, name: Option<String>) {
        match name {
            Some(name) if !is_reserved_name(&name) => self.name = name,
            other => tracing::warn!(name = other.as_deref(), "list bits keep a non-reserved name"),
        }
    }

    fn value(&self) -> DataValue {
        DataValue::Array(self.items.iter().map(|item| item_value(&**item)).collect())
    }

    /// Grow or shrink to the array length, then distribute positionally
    ///
    /// Anything other than an array empties the list.
    fn set_value(&mut self, value: DataValue) -> bool {
        let before = self.value();
        let entries = match value {
            DataValue::Array(entries) => entries,
            _ => Vec::new(),
        };

        self.items.truncate(entries.len());
        while self.items.len() < entries.len() {
            self.items.push((self.factory)());
        }
        for (item, entry) in self.items.iter_mut().zip(entries) {
            set_item_value(&mut **item, entry);
        }

        let changed = self.value() != before;
        if changed {
            tracing::trace!(list = %self.name, len = self.items.len(), "resized list");
            self.render.request();
        }
        changed
    }

    fn validate(
        &mut self,
        ctx: &ValidationContext,
        scope: Option<&str>,
        apply: bool,
    ) -> anyhow::Result<Option<ValidationError>> {
        Ok(validation::validate(self, ctx, scope, apply))
    }

    fn error(&self) -> Option<&ValidationError> {
        self.error.as_ref()
    }

    fn clear_errors(&mut self) {
        validation::clear(self);
    }

    fn is_dirty(&self) -> bool {
        self.items.len() != self.clean_len
            || walker::members(self, true).iter().any(|member| member.is_dirty())
    }

    fn mark_clean(&mut self) {
        self.clean_len = self.items.len();
        walker::for_each_member_mut(self, true, &mut |member| member.mark_clean());
    }

    fn on_value_changed(&mut self, event: &mut ChangeEvent) {
        listener::dispatch(self, Self::listeners, event);
    }
}

impl Container for ListBit {
    fn origin(&self) -> ErrorOrigin {
        ErrorOrigin {
            name: Some(self.name.clone()),
            schema: None,
            title: self.title.clone(),
        }
    }

    fn check(
        &self,
        _value: &DataValue,
        _ctx: &ValidationContext,
        scope: Option<&str>,
        batch: &mut ErrorBatch,
    ) {
        let len = self.items.len();
        let message = match (self.min_items, self.max_items) {
            (Some(min), _) if len < min => format!("needs at least {min} entries"),
            (_, Some(max)) if len > max => format!("allows at most {max} entries"),
            _ => return,
        };
        batch.push(
            ValidationError::cross_field(Some(self.name.clone()), &self.title, message)
                .with_scope(scope),
        );
    }

    fn store_error(&mut self, error: Option<ValidationError>) {
        self.error = error;
        self.render.request();
    }
}
