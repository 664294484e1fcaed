//! Conversions between Rust values and data trees.
//!
//! Three capabilities exist:
//! - [`DataSerializable`]: a value that can describe itself as a tree.
//! - [`DataTranslator`]: an external two-way converter for a type.
//! - [`DataBuilder`]: reconstructs a value from a tree, used by
//!   `get_serializable`.
//!
//! Translators and builders are looked up by type in a [`DataManager`].

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::error::DataError;
use crate::input::DataObject;
use crate::view::{DataContainer, DataView};

pub trait DataSerializable {
    fn to_container(&self) -> DataContainer;
}

pub trait DataTranslator<T> {
    fn translate(&self, value: &T) -> DataContainer;

    fn translate_view(&self, view: &DataView) -> Result<T, DataError>;
}

pub trait DataBuilder<T> {
    /// `Ok(None)` when the view does not describe a `T`.
    fn build(&self, view: &DataView) -> Result<Option<T>, DataError>;
}

type ErasedTranslate = Box<dyn Fn(&dyn Any) -> Option<DataContainer>>;

struct TranslatorEntry {
    // Rc<dyn DataTranslator<T>>
    typed: Box<dyn Any>,
    erased: ErasedTranslate,
}

/// Type-indexed store of translators and builders.
#[derive(Default)]
pub struct DataManager {
    translators: HashMap<TypeId, TranslatorEntry>,
    // Rc<dyn DataBuilder<T>>
    builders: HashMap<TypeId, Box<dyn Any>>,
}

impl DataManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the translator for `T`, replacing any previous one.
    pub fn register_translator<T, D>(&mut self, translator: D) -> &mut Self
    where
        T: 'static,
        D: DataTranslator<T> + 'static,
    {
        let typed: Rc<dyn DataTranslator<T>> = Rc::new(translator);
        let for_erased = Rc::clone(&typed);
        let erased: ErasedTranslate = Box::new(move |value: &dyn Any| {
            value
                .downcast_ref::<T>()
                .map(|value| for_erased.translate(value))
        });
        self.translators.insert(
            TypeId::of::<T>(),
            TranslatorEntry {
                typed: Box::new(typed),
                erased,
            },
        );
        self
    }

    /// Registers the builder for `T`, replacing any previous one.
    pub fn register_builder<T, B>(&mut self, builder: B) -> &mut Self
    where
        T: 'static,
        B: DataBuilder<T> + 'static,
    {
        let typed: Rc<dyn DataBuilder<T>> = Rc::new(builder);
        self.builders.insert(TypeId::of::<T>(), Box::new(typed));
        self
    }

    pub fn translator<T: 'static>(&self) -> Option<Rc<dyn DataTranslator<T>>> {
        self.translators
            .get(&TypeId::of::<T>())?
            .typed
            .downcast_ref::<Rc<dyn DataTranslator<T>>>()
            .cloned()
    }

    pub fn builder<T: 'static>(&self) -> Option<Rc<dyn DataBuilder<T>>> {
        self.builders
            .get(&TypeId::of::<T>())?
            .downcast_ref::<Rc<dyn DataBuilder<T>>>()
            .cloned()
    }

    /// Translates an opaque object with the translator registered for its
    /// runtime type.
    pub fn translate_object(&self, object: &DataObject) -> Option<DataContainer> {
        let entry = self.translators.get(&object.type_id())?;
        (entry.erased)(object.as_any())
    }
}

impl fmt::Debug for DataManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataManager")
            .field("translators", &self.translators.len())
            .field("builders", &self.builders.len())
            .finish()
    }
}
