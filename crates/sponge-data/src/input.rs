//! Values accepted by [`DataView::set`](crate::DataView::set).

use std::any::{Any, TypeId};
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::registry::ResourceKey;
use crate::translate::DataSerializable;
use crate::value::{DataArray, DataValue};
use crate::view::{DataContainer, DataView};

/// An opaque Rust value that can only be stored through a collaborator:
/// either as its registry key or through a registered translator.
#[derive(Clone)]
pub struct DataObject {
    value: Rc<dyn Any>,
    type_id: TypeId,
    type_name: &'static str,
}

impl DataObject {
    pub fn new<T: Any>(value: T) -> Self {
        Self {
            value: Rc::new(value),
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn as_any(&self) -> &dyn Any {
        &*self.value
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

impl fmt::Debug for DataObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DataObject").field(&self.type_name).finish()
    }
}

/// Anything that can be written into a view.
///
/// `set` resolves the variant once and normalizes it; see
/// [`DataView::set`](crate::DataView::set) for the order in which
/// capabilities are tried.
#[derive(Clone)]
pub enum DataInput {
    View(DataView),
    Serializable(Rc<dyn DataSerializable>),
    Object(DataObject),
    ResourceKey(ResourceKey),
    List(Vec<DataInput>),
    /// Keys are taken verbatim as single path segments.
    Map(Vec<(String, DataInput)>),
    Value(DataValue),
}

impl DataInput {
    pub fn object<T: Any>(value: T) -> Self {
        DataInput::Object(DataObject::new(value))
    }

    pub fn serializable<T: DataSerializable + 'static>(value: T) -> Self {
        DataInput::Serializable(Rc::new(value))
    }

    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<DataInput>,
    {
        DataInput::List(items.into_iter().map(Into::into).collect())
    }

    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<DataInput>,
    {
        DataInput::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl fmt::Debug for DataInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataInput::View(view) => f.debug_tuple("View").field(view).finish(),
            DataInput::Serializable(_) => f.write_str("Serializable(..)"),
            DataInput::Object(object) => object.fmt(f),
            DataInput::ResourceKey(key) => f.debug_tuple("ResourceKey").field(key).finish(),
            DataInput::List(items) => f.debug_tuple("List").field(items).finish(),
            DataInput::Map(entries) => f.debug_tuple("Map").field(entries).finish(),
            DataInput::Value(value) => f.debug_tuple("Value").field(value).finish(),
        }
    }
}

macro_rules! impl_from_via_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for DataInput {
                fn from(v: $ty) -> Self {
                    DataInput::Value(DataValue::from(v))
                }
            }
        )*
    };
}

impl_from_via_value! {
    bool, i8, i16, i32, i64, f32, f64, char, String, &str,
    Vec<i8>, Vec<i16>, Vec<i32>, Vec<i64>, Vec<f32>, Vec<f64>, Vec<bool>,
    DataArray<i8>, DataArray<i16>, DataArray<i32>, DataArray<i64>,
    DataArray<f32>, DataArray<f64>, DataArray<bool>,
}

impl From<&String> for DataInput {
    fn from(v: &String) -> Self {
        DataInput::Value(DataValue::String(v.clone()))
    }
}

impl From<Vec<String>> for DataInput {
    fn from(items: Vec<String>) -> Self {
        DataInput::list(items)
    }
}

impl From<Vec<&str>> for DataInput {
    fn from(items: Vec<&str>) -> Self {
        DataInput::list(items)
    }
}

impl From<Vec<DataValue>> for DataInput {
    fn from(items: Vec<DataValue>) -> Self {
        DataInput::list(items)
    }
}

impl From<Vec<DataInput>> for DataInput {
    fn from(items: Vec<DataInput>) -> Self {
        DataInput::List(items)
    }
}

impl From<IndexMap<String, DataInput>> for DataInput {
    fn from(map: IndexMap<String, DataInput>) -> Self {
        DataInput::Map(map.into_iter().collect())
    }
}

impl From<DataValue> for DataInput {
    fn from(value: DataValue) -> Self {
        DataInput::Value(value)
    }
}

impl From<DataView> for DataInput {
    fn from(view: DataView) -> Self {
        DataInput::View(view)
    }
}

impl From<&DataView> for DataInput {
    fn from(view: &DataView) -> Self {
        DataInput::View(view.clone())
    }
}

impl From<DataContainer> for DataInput {
    fn from(container: DataContainer) -> Self {
        DataInput::View(container.into_view())
    }
}

impl From<&DataContainer> for DataInput {
    fn from(container: &DataContainer) -> Self {
        DataInput::View(container.as_view().clone())
    }
}

impl From<ResourceKey> for DataInput {
    fn from(key: ResourceKey) -> Self {
        DataInput::ResourceKey(key)
    }
}

impl From<DataObject> for DataInput {
    fn from(object: DataObject) -> Self {
        DataInput::Object(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Marker(u32);

    #[test]
    fn test_object_downcast() {
        let object = DataObject::new(Marker(7));
        assert_eq!(object.type_id(), TypeId::of::<Marker>());
        assert_eq!(object.downcast_ref::<Marker>(), Some(&Marker(7)));
        assert_eq!(object.downcast_ref::<u32>(), None);
        assert!(object.type_name().ends_with("Marker"));
    }

    #[test]
    fn test_string_vec_becomes_list() {
        match DataInput::from(vec!["a", "b"]) {
            DataInput::List(items) => assert_eq!(items.len(), 2),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_primitive_vec_becomes_array() {
        match DataInput::from(vec![1i64, 2]) {
            DataInput::Value(DataValue::LongArray(a)) => assert_eq!(a.to_vec(), vec![1, 2]),
            other => panic!("unexpected {other:?}"),
        }
    }
}
