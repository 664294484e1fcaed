use std::fmt;
use std::ops::Deref;

use super::DataView;
use crate::context::DataContext;
use crate::safety::SafetyMode;

/// The root of a data tree.
///
/// Dereferences to its root [`DataView`]. Collaborators in the
/// [`DataContext`] and the [`SafetyMode`] are fixed at construction and
/// shared by every view of the tree.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct DataContainer {
    root: DataView,
}

impl DataContainer {
    pub fn new() -> Self {
        Self::new_with(SafetyMode::default(), DataContext::default())
    }

    pub fn with_safety(safety: SafetyMode) -> Self {
        Self::new_with(safety, DataContext::default())
    }

    pub fn with_context(context: DataContext) -> Self {
        Self::new_with(SafetyMode::default(), context)
    }

    pub fn new_with(safety: SafetyMode, context: DataContext) -> Self {
        Self {
            root: DataView::new_root(safety, context),
        }
    }

    pub(crate) fn from_root(root: DataView) -> Self {
        Self { root }
    }

    pub fn as_view(&self) -> &DataView {
        &self.root
    }

    pub fn into_view(self) -> DataView {
        self.root
    }
}

impl Default for DataContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for DataContainer {
    type Target = DataView;

    fn deref(&self) -> &DataView {
        &self.root
    }
}

impl From<DataContainer> for DataView {
    fn from(container: DataContainer) -> Self {
        container.root
    }
}

impl fmt::Debug for DataContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.root.fmt(f)
    }
}
