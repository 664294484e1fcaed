//! The data tree.
//!
//! A tree is a [`DataContainer`] (its root) plus nested [`DataView`]s, each
//! an insertion-ordered map from single-segment keys to [`DataValue`]s.
//! Views are handles: cloning one yields another handle onto the same node,
//! which is how a child view read from a tree can be mutated in place.
//!
//! ```
//! use sponge_data::{DataContainer, DataQuery};
//!
//! let container = DataContainer::new();
//! container.set("player.name", "alex").unwrap();
//! container.set("player.level", 12).unwrap();
//!
//! let player = container.get_view("player").unwrap();
//! assert_eq!(player.current_path(), DataQuery::from("player"));
//! assert_eq!(container.get_int("player.level"), Some(12));
//! ```

mod accessors;
mod container;
mod normalize;

pub use container::DataContainer;

use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};

use indexmap::{IndexMap, IndexSet};
use serde::{Serialize, Serializer};
use sponge_data_query::{validate_query, DataQuery};

use crate::context::DataContext;
use crate::error::DataError;
use crate::input::DataInput;
use crate::safety::SafetyMode;
use crate::value::{hash_unordered, DataValue};

use normalize::{Normalizer, Staged};

struct Node {
    entries: IndexMap<String, DataValue>,
    path: DataQuery,
    parent: Option<Weak<RefCell<Node>>>,
    container: Weak<RefCell<Node>>,
    safety: SafetyMode,
    context: DataContext,
}

/// A handle onto one interior node of a data tree.
#[derive(Clone)]
pub struct DataView {
    node: Rc<RefCell<Node>>,
}

impl DataView {
    pub(crate) fn new_root(safety: SafetyMode, context: DataContext) -> Self {
        let node = Rc::new_cyclic(|this| {
            RefCell::new(Node {
                entries: IndexMap::new(),
                path: DataQuery::empty(),
                parent: None,
                container: this.clone(),
                safety,
                context,
            })
        });
        DataView { node }
    }

    /// Absolute path of this view from its container.
    pub fn current_path(&self) -> DataQuery {
        self.node.borrow().path.clone()
    }

    /// Last segment of [`current_path`](Self::current_path), empty for a root.
    pub fn name(&self) -> String {
        self.node.borrow().path.last().unwrap_or_default().to_owned()
    }

    /// `None` for a root, or once the parent has been dropped.
    pub fn parent(&self) -> Option<DataView> {
        let node = self.node.borrow();
        let parent = node.parent.as_ref()?.upgrade()?;
        Some(DataView { node: parent })
    }

    /// The root of this view's tree, while it is alive.
    pub fn container(&self) -> Option<DataContainer> {
        let root = self.node.borrow().container.upgrade()?;
        Some(DataContainer::from_root(DataView { node: root }))
    }

    pub fn is_root(&self) -> bool {
        self.node.borrow().parent.is_none()
    }

    pub fn safety_mode(&self) -> SafetyMode {
        self.node.borrow().safety
    }

    pub fn context(&self) -> DataContext {
        self.node.borrow().context.clone()
    }

    /// Whether both handles refer to the same node.
    pub fn ptr_eq(&self, other: &DataView) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }

    pub fn len(&self) -> usize {
        self.node.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node.borrow().entries.is_empty()
    }

    /// Whether a value exists at `path`. The empty path names this view.
    pub fn contains(&self, path: impl Into<DataQuery>) -> bool {
        self.contains_at(path.into().parts())
    }

    fn contains_at(&self, parts: &[String]) -> bool {
        match parts {
            [] => true,
            [key] => self.node.borrow().entries.contains_key(key),
            [key, rest @ ..] => self.child_view(key).is_some_and(|child| child.contains_at(rest)),
        }
    }

    pub fn contains_all<I, Q>(&self, paths: I) -> bool
    where
        I: IntoIterator<Item = Q>,
        Q: Into<DataQuery>,
    {
        paths.into_iter().all(|path| self.contains(path))
    }

    /// The value at `path`. The empty path yields this view itself.
    ///
    /// Arrays are returned as copies when the safety mode clones on read.
    pub fn get(&self, path: impl Into<DataQuery>) -> Option<DataValue> {
        self.get_at(path.into().parts())
    }

    pub(crate) fn get_at(&self, parts: &[String]) -> Option<DataValue> {
        match parts {
            [] => Some(DataValue::View(self.clone())),
            [key] => {
                let node = self.node.borrow();
                let value = node.entries.get(key)?;
                Some(read_value(node.safety, value))
            }
            [key, rest @ ..] => self.child_view(key)?.get_at(rest),
        }
    }

    /// Stores `value` at `path`, creating missing intermediate views.
    ///
    /// Views (and anything converted into one) are copied into the tree,
    /// never linked. Mappings become child views, other collections become
    /// immutable lists, and opaque objects are replaced by their registry
    /// key or translated through the tree's [`DataContext`].
    ///
    /// # Errors
    ///
    /// - [`DataError::EmptyPath`] for the empty path.
    /// - [`DataError::InvalidQuery`] for a path past the depth limit.
    /// - [`DataError::SelfReference`] if the value contains the view being
    ///   written to, or one of its ancestors, or converts into a non-empty
    ///   tree equal to the view being written to. A view the write
    ///   materializes is empty, so only an existing one can match.
    /// - [`DataError::CollaboratorUnavailable`] or
    ///   [`DataError::Unrepresentable`] for objects nothing can represent.
    ///
    /// The tree is left unmodified on error.
    pub fn set(&self, path: impl Into<DataQuery>, value: impl Into<DataInput>) -> Result<&Self, DataError> {
        let path = path.into();
        let Some((key, parents)) = path.parts().split_last() else {
            return Err(DataError::EmptyPath);
        };
        validate_query(&path)?;

        let anchor = self.deepest_view(parents);
        let mut normalizer = Normalizer::new(&anchor, self.current_path().then(&path));
        if anchor.current_path().len() < self.current_path().len() + parents.len() {
            normalizer = normalizer.into_fresh_destination();
        }
        let staged = normalizer.stage_input(value.into())?;

        self.view_at_or_create(parents).write_staged(key, staged);
        Ok(self)
    }

    /// Removes the entry at `path`. Intermediate views are left in place and
    /// missing paths are ignored.
    pub fn remove(&self, path: impl Into<DataQuery>) -> &Self {
        let path = path.into();
        match path.parts() {
            [] => {}
            [key] => {
                self.node.borrow_mut().entries.shift_remove(key);
            }
            [key, ..] => {
                if let Some(child) = self.child_view(key) {
                    child.remove(path.pop_first());
                }
            }
        }
        self
    }

    /// Creates an empty view at `path`, replacing whatever was stored there.
    ///
    /// # Errors
    ///
    /// Fails for the empty path or a path past the depth limit.
    pub fn create_view(&self, path: impl Into<DataQuery>) -> Result<DataView, DataError> {
        let path = path.into();
        let Some((key, parents)) = path.parts().split_last() else {
            return Err(DataError::EmptyPath);
        };
        validate_query(&path)?;
        Ok(self.view_at_or_create(parents).create_child(key))
    }

    /// Creates a view at `path` and fills it from `entries`.
    ///
    /// Entry keys are dot-separated queries relative to the new view;
    /// [`DataInput::Map`] values become nested views the same way.
    ///
    /// # Errors
    ///
    /// As [`create_view`](Self::create_view) and [`set`](Self::set). Entries
    /// written before a failing one are kept.
    pub fn create_view_with<I, K, V>(&self, path: impl Into<DataQuery>, entries: I) -> Result<DataView, DataError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<DataInput>,
    {
        let section = self.create_view(path)?;
        for (key, value) in entries {
            let query = DataQuery::from(key.as_ref());
            match value.into() {
                DataInput::Map(nested) => {
                    section.create_view_with(query, nested)?;
                }
                other => {
                    section.set(query, other)?;
                }
            }
        }
        Ok(section)
    }

    /// Keys of this view. With `deep`, also every path below nested views,
    /// relative to this view.
    pub fn keys(&self, deep: bool) -> IndexSet<DataQuery> {
        let node = self.node.borrow();
        let mut keys: IndexSet<DataQuery> = node.entries.keys().map(|key| DataQuery::of([key.as_str()])).collect();
        if deep {
            for (key, value) in &node.entries {
                if let DataValue::View(child) = value {
                    let prefix = DataQuery::of([key.as_str()]);
                    keys.extend(child.keys(true).iter().map(|sub| prefix.then(sub)));
                }
            }
        }
        keys
    }

    /// The value at every key of [`keys`](Self::keys). Nested views are
    /// returned as [`DataValue::Map`]s.
    pub fn values(&self, deep: bool) -> IndexMap<DataQuery, DataValue> {
        self.keys(deep)
            .into_iter()
            .filter_map(|query| {
                let value = match self.get_at(query.parts())? {
                    DataValue::View(view) => DataValue::Map(view.to_map()),
                    other => other,
                };
                Some((query, value))
            })
            .collect()
    }

    /// This view as a nested mapping, with views replaced by maps at every
    /// depth, including inside lists.
    pub fn to_map(&self) -> IndexMap<String, DataValue> {
        self.snapshot()
            .into_iter()
            .map(|(key, value)| (key, value_to_mapping(value)))
            .collect()
    }

    /// A deep copy of this view as a new container with the same safety
    /// mode and context.
    pub fn copy(&self) -> DataContainer {
        self.copy_with(self.safety_mode())
    }

    /// A deep copy of this view as a new container under `safety`.
    pub fn copy_with(&self, safety: SafetyMode) -> DataContainer {
        let container = DataContainer::new_with(safety, self.context());
        let normalizer = Normalizer::new(container.as_view(), DataQuery::empty());
        container.write_entries(normalizer.view_entries(self));
        container
    }

    /// Whether `target` is this view or nested anywhere below it.
    pub(crate) fn reaches(&self, target: &DataView) -> bool {
        self.ptr_eq(target) || self.node.borrow().entries.values().any(|value| value.reaches(target))
    }

    /// Entries as read through this view's safety mode.
    pub(crate) fn snapshot(&self) -> Vec<(String, DataValue)> {
        let node = self.node.borrow();
        node.entries
            .iter()
            .map(|(key, value)| (key.clone(), read_value(node.safety, value)))
            .collect()
    }

    fn child_view(&self, key: &str) -> Option<DataView> {
        match self.node.borrow().entries.get(key)? {
            DataValue::View(child) => Some(child.clone()),
            _ => None,
        }
    }

    /// The deepest existing view along `parts`, starting from this one.
    fn deepest_view(&self, parts: &[String]) -> DataView {
        let mut view = self.clone();
        for key in parts {
            match view.child_view(key) {
                Some(child) => view = child,
                None => break,
            }
        }
        view
    }

    fn view_at_or_create(&self, parts: &[String]) -> DataView {
        parts
            .iter()
            .fold(self.clone(), |view, key| view.child_or_create(key))
    }

    fn child_or_create(&self, key: &str) -> DataView {
        match self.child_view(key) {
            Some(child) => child,
            None => {
                log::trace!("materializing view `{}` under `{}`", key, self.current_path());
                self.create_child(key)
            }
        }
    }

    fn create_child(&self, key: &str) -> DataView {
        let child = {
            let node = self.node.borrow();
            let child = Node {
                entries: IndexMap::new(),
                path: node.path.then_key(key),
                parent: Some(Rc::downgrade(&self.node)),
                container: node.container.clone(),
                safety: node.safety,
                context: node.context.clone(),
            };
            DataView {
                node: Rc::new(RefCell::new(child)),
            }
        };
        self.node
            .borrow_mut()
            .entries
            .insert(key.to_owned(), DataValue::View(child.clone()));
        child
    }

    fn write_staged(&self, key: &str, staged: Staged) {
        match staged {
            Staged::Leaf(value) => {
                self.node.borrow_mut().entries.insert(key.to_owned(), value);
            }
            Staged::Tree(entries) => self.create_child(key).write_entries(entries),
        }
    }

    pub(crate) fn write_entries(&self, entries: Vec<(String, Staged)>) {
        for (key, staged) in entries {
            self.write_staged(&key, staged);
        }
    }
}

fn read_value(safety: SafetyMode, value: &DataValue) -> DataValue {
    if safety.clones_on_get() {
        value.deep_clone_arrays()
    } else {
        value.clone()
    }
}

fn value_to_mapping(value: DataValue) -> DataValue {
    match value {
        DataValue::View(view) => DataValue::Map(view.to_map()),
        DataValue::List(items) => DataValue::List(items.into_iter().map(value_to_mapping).collect()),
        DataValue::Map(map) => DataValue::Map(
            map.into_iter()
                .map(|(key, value)| (key, value_to_mapping(value)))
                .collect(),
        ),
        other => other,
    }
}

impl PartialEq for DataView {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        let (a, b) = (self.node.borrow(), other.node.borrow());
        a.path == b.path && a.entries == b.entries
    }
}

impl Eq for DataView {}

impl Hash for DataView {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let node = self.node.borrow();
        node.path.hash(state);
        hash_unordered(node.entries.iter(), state);
    }
}

impl fmt::Debug for DataView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.node.borrow();
        let mut s = f.debug_struct("DataView");
        if !node.path.is_empty() {
            s.field("path", &format_args!("{}", node.path));
        }
        s.field("safety", &node.safety)
            .field("entries", &node.entries)
            .finish()
    }
}

impl Serialize for DataView {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let node = self.node.borrow();
        serializer.collect_map(node.entries.iter())
    }
}
