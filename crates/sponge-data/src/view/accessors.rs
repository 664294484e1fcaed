//! Typed reads.
//!
//! Every accessor returns `None` when nothing is stored at the path or the
//! stored value cannot be read as the requested type. List accessors accept
//! lists and typed arrays alike, and drop elements that do not convert.

use indexmap::IndexMap;
use sponge_data_query::DataQuery;

use super::{value_to_mapping, DataView};
use crate::coerce;
use crate::context::Lookup;
use crate::registry::{RegistryLookup, RegistryType, ResourceKey};
use crate::value::DataValue;

fn found<T>(lookup: Lookup<T>, what: &str, path: &DataQuery) -> Option<T> {
    match lookup {
        Lookup::Found(value) => Some(value),
        Lookup::Missing => {
            log::debug!("no {what} registered for value at `{path}`");
            None
        }
        Lookup::Unavailable => {
            log::warn!("cannot read `{path}`: no data manager configured");
            None
        }
    }
}

impl DataView {
    pub fn get_view(&self, path: impl Into<DataQuery>) -> Option<DataView> {
        match self.get(path)? {
            DataValue::View(view) => Some(view),
            _ => None,
        }
    }

    /// A view or map at `path` as a plain mapping, with nested views
    /// converted to maps.
    pub fn get_map(&self, path: impl Into<DataQuery>) -> Option<IndexMap<String, DataValue>> {
        match self.get(path)? {
            DataValue::View(view) => Some(view.to_map()),
            map @ DataValue::Map(_) => match value_to_mapping(map) {
                DataValue::Map(map) => Some(map),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn get_list(&self, path: impl Into<DataQuery>) -> Option<Vec<DataValue>> {
        self.get(path)?.list_items()
    }

    fn list_of<T>(&self, path: impl Into<DataQuery>, convert: impl Fn(&DataValue) -> Option<T>) -> Option<Vec<T>> {
        let items = self.get_list(path)?;
        Some(items.iter().filter_map(convert).collect())
    }

    pub fn get_boolean(&self, path: impl Into<DataQuery>) -> Option<bool> {
        coerce::as_boolean(&self.get(path)?)
    }

    pub fn get_byte(&self, path: impl Into<DataQuery>) -> Option<i8> {
        coerce::as_byte(&self.get(path)?)
    }

    pub fn get_short(&self, path: impl Into<DataQuery>) -> Option<i16> {
        coerce::as_short(&self.get(path)?)
    }

    pub fn get_int(&self, path: impl Into<DataQuery>) -> Option<i32> {
        coerce::as_int(&self.get(path)?)
    }

    pub fn get_long(&self, path: impl Into<DataQuery>) -> Option<i64> {
        coerce::as_long(&self.get(path)?)
    }

    pub fn get_float(&self, path: impl Into<DataQuery>) -> Option<f32> {
        coerce::as_float(&self.get(path)?)
    }

    pub fn get_double(&self, path: impl Into<DataQuery>) -> Option<f64> {
        coerce::as_double(&self.get(path)?)
    }

    pub fn get_char(&self, path: impl Into<DataQuery>) -> Option<char> {
        coerce::as_char(&self.get(path)?)
    }

    pub fn get_string(&self, path: impl Into<DataQuery>) -> Option<String> {
        coerce::as_string(&self.get(path)?)
    }

    pub fn get_string_list(&self, path: impl Into<DataQuery>) -> Option<Vec<String>> {
        self.list_of(path, coerce::as_string)
    }

    pub fn get_char_list(&self, path: impl Into<DataQuery>) -> Option<Vec<char>> {
        self.list_of(path, coerce::as_char)
    }

    pub fn get_boolean_list(&self, path: impl Into<DataQuery>) -> Option<Vec<bool>> {
        self.list_of(path, coerce::as_boolean)
    }

    pub fn get_byte_list(&self, path: impl Into<DataQuery>) -> Option<Vec<i8>> {
        self.list_of(path, coerce::as_byte)
    }

    pub fn get_short_list(&self, path: impl Into<DataQuery>) -> Option<Vec<i16>> {
        self.list_of(path, coerce::as_short)
    }

    pub fn get_int_list(&self, path: impl Into<DataQuery>) -> Option<Vec<i32>> {
        self.list_of(path, coerce::as_int)
    }

    pub fn get_long_list(&self, path: impl Into<DataQuery>) -> Option<Vec<i64>> {
        self.list_of(path, coerce::as_long)
    }

    pub fn get_float_list(&self, path: impl Into<DataQuery>) -> Option<Vec<f32>> {
        self.list_of(path, coerce::as_float)
    }

    pub fn get_double_list(&self, path: impl Into<DataQuery>) -> Option<Vec<f64>> {
        self.list_of(path, coerce::as_double)
    }

    /// The map elements of a list. Views in the list are skipped.
    pub fn get_map_list(&self, path: impl Into<DataQuery>) -> Option<Vec<IndexMap<String, DataValue>>> {
        self.list_of(path, |item| match item {
            DataValue::Map(map) => Some(map.clone()),
            _ => None,
        })
    }

    pub fn get_view_list(&self, path: impl Into<DataQuery>) -> Option<Vec<DataView>> {
        self.list_of(path, |item| item.as_view().cloned())
    }

    /// Rebuilds a `T` from the view at `path` with the builder registered
    /// for `T`.
    pub fn get_serializable<T: 'static>(&self, path: impl Into<DataQuery>) -> Option<T> {
        let path = path.into();
        let view = self.get_view(&path)?;
        let builder = found(self.context().builder::<T>(), "builder", &path)?;
        match builder.build(&view) {
            Ok(value) => value,
            Err(err) => {
                log::debug!("failed to build value at `{path}`: {err}");
                None
            }
        }
    }

    pub fn get_serializable_list<T: 'static>(&self, path: impl Into<DataQuery>) -> Option<Vec<T>> {
        let path = path.into();
        let views = self.get_view_list(&path)?;
        let builder = found(self.context().builder::<T>(), "builder", &path)?;
        Some(
            views
                .iter()
                .filter_map(|view| builder.build(view).ok().flatten())
                .collect(),
        )
    }

    /// Translates the view at `path` back into a `T` with the translator
    /// registered for `T`.
    pub fn get_object<T: 'static>(&self, path: impl Into<DataQuery>) -> Option<T> {
        let path = path.into();
        let view = self.get_view(&path)?;
        let translator = found(self.context().translator::<T>(), "translator", &path)?;
        match translator.translate_view(&view) {
            Ok(value) => Some(value),
            Err(err) => {
                log::debug!("failed to translate value at `{path}`: {err}");
                None
            }
        }
    }

    pub fn get_object_list<T: 'static>(&self, path: impl Into<DataQuery>) -> Option<Vec<T>> {
        let path = path.into();
        let views = self.get_view_list(&path)?;
        let translator = found(self.context().translator::<T>(), "translator", &path)?;
        Some(
            views
                .iter()
                .filter_map(|view| translator.translate_view(view).ok())
                .collect(),
        )
    }

    /// A string at `path` parsed with [`ResourceKey::resolve`].
    pub fn get_resource_key(&self, path: impl Into<DataQuery>) -> Option<ResourceKey> {
        ResourceKey::resolve(&self.get_string(path)?).ok()
    }

    pub fn get_resource_key_list(&self, path: impl Into<DataQuery>) -> Option<Vec<ResourceKey>> {
        let keys = self.get_string_list(path)?;
        Some(keys.iter().filter_map(|key| ResourceKey::resolve(key).ok()).collect())
    }

    /// The registry value whose key is stored at `path`.
    pub fn get_registry_value<T: Clone + 'static>(
        &self,
        path: impl Into<DataQuery>,
        registry_type: &RegistryType,
        registries: &dyn RegistryLookup,
    ) -> Option<T> {
        let key = self.get_resource_key(path)?;
        registries
            .find_value(registry_type, &key)?
            .downcast_ref::<T>()
            .cloned()
    }

    pub fn get_registry_value_list<T: Clone + 'static>(
        &self,
        path: impl Into<DataQuery>,
        registry_type: &RegistryType,
        registries: &dyn RegistryLookup,
    ) -> Option<Vec<T>> {
        let keys = self.get_resource_key_list(path)?;
        Some(
            keys.iter()
                .filter_map(|key| registries.find_value(registry_type, key)?.downcast_ref::<T>().cloned())
                .collect(),
        )
    }
}
