//! Turning caller input into storable values.
//!
//! Normalization runs to completion before the tree is touched: the result
//! is a [`Staged`] value that is then written in one pass, so a failing
//! `set` leaves the tree as it was.

use indexmap::IndexMap;
use sponge_data_query::DataQuery;

use super::{DataContainer, DataView};
use crate::context::{DataContext, Lookup};
use crate::error::{Collaborator, DataError};
use crate::input::{DataInput, DataObject};
use crate::registry::ResourceKey;
use crate::safety::SafetyMode;
use crate::value::DataValue;

/// A normalized value waiting to be written under some key.
pub(crate) enum Staged {
    Leaf(DataValue),
    /// Becomes a fresh child view.
    Tree(Vec<(String, Staged)>),
}

enum Resolved {
    Key(ResourceKey),
    Tree(DataContainer),
}

pub(crate) struct Normalizer {
    safety: SafetyMode,
    context: DataContext,
    /// Nearest existing view the value will land under. Nothing being
    /// written may contain it.
    anchor: DataView,
    /// The view receiving the write, if it exists before the write. One
    /// materialized by the write starts empty and cannot match anything.
    destination: Option<DataView>,
    /// Absolute destination, for errors.
    path: DataQuery,
}

impl Normalizer {
    pub(crate) fn new(anchor: &DataView, path: DataQuery) -> Self {
        Self {
            safety: anchor.safety_mode(),
            context: anchor.context(),
            anchor: anchor.clone(),
            destination: Some(anchor.clone()),
            path,
        }
    }

    /// The write materializes its destination below the anchor.
    pub(crate) fn into_fresh_destination(mut self) -> Self {
        self.destination = None;
        self
    }

    fn self_reference(&self) -> DataError {
        DataError::SelfReference {
            path: self.path.clone(),
        }
    }

    pub(crate) fn stage_input(&self, input: DataInput) -> Result<Staged, DataError> {
        if input_reaches(&input, &self.anchor) {
            return Err(self.self_reference());
        }
        self.stage(input)
    }

    fn stage(&self, input: DataInput) -> Result<Staged, DataError> {
        match input {
            DataInput::View(view) => Ok(Staged::Tree(self.view_entries(&view))),
            DataInput::Serializable(serializable) => {
                let container = serializable.to_container();
                self.guard(&container)?;
                Ok(Staged::Tree(self.view_entries(&container)))
            }
            DataInput::Object(object) => match self.resolve(&object)? {
                Resolved::Key(key) => Ok(Staged::Leaf(DataValue::String(key.to_string()))),
                Resolved::Tree(container) => Ok(Staged::Tree(self.view_entries(&container))),
            },
            DataInput::ResourceKey(key) => Ok(Staged::Leaf(DataValue::String(key.to_string()))),
            DataInput::List(items) => {
                let items = items
                    .into_iter()
                    .map(|item| self.element(item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Staged::Leaf(DataValue::List(items)))
            }
            DataInput::Map(entries) => {
                let entries = entries
                    .into_iter()
                    .map(|(key, value)| Ok((key, self.stage(value)?)))
                    .collect::<Result<Vec<_>, DataError>>()?;
                Ok(Staged::Tree(entries))
            }
            DataInput::Value(value) => Ok(self.stage_value(value)),
        }
    }

    /// Normalizes one element of a list.
    fn element(&self, input: DataInput) -> Result<DataValue, DataError> {
        match input {
            DataInput::View(view) => Ok(self.element_view(view)),
            DataInput::Serializable(serializable) => {
                let container = serializable.to_container();
                self.guard(&container)?;
                Ok(self.element_view(container.into_view()))
            }
            DataInput::Object(object) => match self.resolve(&object)? {
                Resolved::Key(key) => Ok(DataValue::String(key.to_string())),
                Resolved::Tree(container) => Ok(self.element_view(container.into_view())),
            },
            DataInput::ResourceKey(key) => Ok(DataValue::String(key.to_string())),
            DataInput::List(items) => items
                .into_iter()
                .map(|item| self.element(item))
                .collect::<Result<Vec<_>, _>>()
                .map(DataValue::List),
            DataInput::Map(entries) => entries
                .into_iter()
                .map(|(key, value)| Ok((key, self.element(value)?)))
                .collect::<Result<IndexMap<_, _>, DataError>>()
                .map(DataValue::Map),
            DataInput::Value(value) => Ok(self.element_value(value)),
        }
    }

    fn stage_value(&self, value: DataValue) -> Staged {
        match value {
            DataValue::View(view) => Staged::Tree(self.view_entries(&view)),
            DataValue::Map(map) => Staged::Tree(
                map.into_iter()
                    .map(|(key, value)| (key, self.stage_value(value)))
                    .collect(),
            ),
            DataValue::List(items) => Staged::Leaf(DataValue::List(
                items.into_iter().map(|item| self.element_value(item)).collect(),
            )),
            other => Staged::Leaf(self.array(other)),
        }
    }

    fn element_value(&self, value: DataValue) -> DataValue {
        match value {
            DataValue::View(view) => self.element_view(view),
            DataValue::List(items) => {
                DataValue::List(items.into_iter().map(|item| self.element_value(item)).collect())
            }
            DataValue::Map(map) => DataValue::Map(
                map.into_iter()
                    .map(|(key, value)| (key, self.element_value(value)))
                    .collect(),
            ),
            other => self.array(other),
        }
    }

    /// Views inside lists are copied into containers of their own when the
    /// safety mode clones on write, and linked otherwise.
    fn element_view(&self, view: DataView) -> DataValue {
        if !self.safety.clones_on_set() {
            return DataValue::View(view);
        }
        let container = DataContainer::new_with(self.safety, self.context.clone());
        container.write_entries(self.view_entries(&view));
        DataValue::View(container.into_view())
    }

    /// A view's entries as read through its own safety mode, normalized
    /// for this tree.
    pub(crate) fn view_entries(&self, view: &DataView) -> Vec<(String, Staged)> {
        view.snapshot()
            .into_iter()
            .map(|(key, value)| (key, self.stage_value(value)))
            .collect()
    }

    fn array(&self, value: DataValue) -> DataValue {
        if value.is_array() && self.safety.clones_on_set() {
            value.deep_clone_arrays()
        } else {
            value
        }
    }

    /// Rejects converted containers that are, or contain, the destination.
    ///
    /// Structural equality with a non-empty destination counts too.
    fn guard(&self, container: &DataView) -> Result<(), DataError> {
        let mirrors_destination = self
            .destination
            .as_ref()
            .is_some_and(|destination| !container.is_empty() && container == destination);
        if container.reaches(&self.anchor) || mirrors_destination {
            return Err(self.self_reference());
        }
        Ok(())
    }

    fn resolve(&self, object: &DataObject) -> Result<Resolved, DataError> {
        let registry = self.context.registry_key(object);
        if let Lookup::Found(key) = registry {
            log::debug!("storing {} at `{}` as registry key {}", object.type_name(), self.path, key);
            return Ok(Resolved::Key(key));
        }

        let translated = self.context.translate(object);
        if let Lookup::Found(container) = translated {
            log::debug!("translated {} at `{}`", object.type_name(), self.path);
            self.guard(&container)?;
            return Ok(Resolved::Tree(container));
        }

        let collaborator = if registry.is_unavailable() {
            Some(Collaborator::Registry)
        } else if translated.is_unavailable() {
            Some(Collaborator::DataManager)
        } else {
            None
        };
        match collaborator {
            Some(collaborator) => {
                log::warn!(
                    "cannot store {} at `{}`: no {} configured",
                    object.type_name(),
                    self.path,
                    collaborator
                );
                Err(DataError::CollaboratorUnavailable {
                    collaborator,
                    type_name: object.type_name(),
                })
            }
            None => Err(DataError::Unrepresentable(object.type_name())),
        }
    }
}

fn input_reaches(input: &DataInput, target: &DataView) -> bool {
    match input {
        DataInput::View(view) => view.reaches(target),
        DataInput::Value(value) => value.reaches(target),
        DataInput::List(items) => items.iter().any(|item| input_reaches(item, target)),
        DataInput::Map(entries) => entries.iter().any(|(_, value)| input_reaches(value, target)),
        DataInput::Serializable(_) | DataInput::Object(_) | DataInput::ResourceKey(_) => false,
    }
}
