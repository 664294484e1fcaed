use std::fmt;
use std::rc::Rc;

use crate::input::DataObject;
use crate::registry::{RegistryLookup, ResourceKey};
use crate::translate::{DataBuilder, DataManager, DataTranslator};
use crate::view::DataContainer;

/// Outcome of asking a collaborator for something.
///
/// `Unavailable` means the collaborator itself is not configured, which is
/// kept apart from `Missing` (configured, but nothing registered).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    Missing,
    Unavailable,
}

impl<T> Lookup<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::Missing | Lookup::Unavailable => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Lookup::Unavailable)
    }
}

/// Collaborators shared by every view of one tree.
#[derive(Clone, Default)]
pub struct DataContext {
    manager: Option<Rc<DataManager>>,
    registries: Option<Rc<dyn RegistryLookup>>,
}

impl DataContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_manager(mut self, manager: impl Into<Rc<DataManager>>) -> Self {
        self.manager = Some(manager.into());
        self
    }

    pub fn with_registries(self, registries: impl RegistryLookup + 'static) -> Self {
        self.with_shared_registries(Rc::new(registries))
    }

    pub fn with_shared_registries(mut self, registries: Rc<dyn RegistryLookup>) -> Self {
        self.registries = Some(registries);
        self
    }

    pub fn manager(&self) -> Option<&DataManager> {
        self.manager.as_deref()
    }

    pub fn registries(&self) -> Option<&dyn RegistryLookup> {
        self.registries.as_deref()
    }

    /// The canonical key of a registry-backed object.
    pub fn registry_key(&self, object: &DataObject) -> Lookup<ResourceKey> {
        let Some(registries) = self.registries() else {
            return Lookup::Unavailable;
        };
        registries
            .registry_type_for(object.type_id())
            .and_then(|registry_type| registries.value_key(&registry_type, object.as_any()))
            .map_or(Lookup::Missing, Lookup::Found)
    }

    pub fn translate(&self, object: &DataObject) -> Lookup<DataContainer> {
        let Some(manager) = self.manager() else {
            return Lookup::Unavailable;
        };
        manager
            .translate_object(object)
            .map_or(Lookup::Missing, Lookup::Found)
    }

    pub fn translator<T: 'static>(&self) -> Lookup<Rc<dyn DataTranslator<T>>> {
        match self.manager() {
            None => Lookup::Unavailable,
            Some(manager) => manager.translator::<T>().map_or(Lookup::Missing, Lookup::Found),
        }
    }

    pub fn builder<T: 'static>(&self) -> Lookup<Rc<dyn DataBuilder<T>>> {
        match self.manager() {
            None => Lookup::Unavailable,
            Some(manager) => manager.builder::<T>().map_or(Lookup::Missing, Lookup::Found),
        }
    }
}

impl fmt::Debug for DataContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataContext")
            .field("manager", &self.manager)
            .field("registries", &self.registries.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{RegistryHolder, RegistryType};

    #[derive(Debug, PartialEq)]
    enum Color {
        Red,
        Blue,
    }

    fn colors() -> RegistryType {
        RegistryType::new(
            ResourceKey::sponge("root").unwrap(),
            ResourceKey::sponge("color").unwrap(),
        )
    }

    fn holder() -> RegistryHolder {
        let mut holder = RegistryHolder::new();
        holder
            .create_registry(colors(), [(ResourceKey::sponge("red").unwrap(), Color::Red)], false)
            .unwrap();
        holder
    }

    #[test]
    fn test_unconfigured_collaborators_are_unavailable() {
        let context = DataContext::new();
        let object = DataObject::new(Color::Red);
        assert!(context.registry_key(&object).is_unavailable());
        assert!(context.translate(&object).is_unavailable());
        assert!(context.translator::<Color>().is_unavailable());
        assert!(context.builder::<Color>().is_unavailable());
    }

    #[test]
    fn test_registry_key_lookup() {
        let context = DataContext::new().with_registries(holder());
        assert_eq!(
            context.registry_key(&DataObject::new(Color::Red)),
            Lookup::Found(ResourceKey::sponge("red").unwrap())
        );
        assert_eq!(context.registry_key(&DataObject::new(Color::Blue)), Lookup::Missing);
        assert_eq!(context.registry_key(&DataObject::new(1u8)), Lookup::Missing);
    }

    #[test]
    fn test_empty_manager_reports_missing() {
        let context = DataContext::new().with_manager(DataManager::new());
        assert_eq!(context.translate(&DataObject::new(Color::Red)).found(), None);
        assert!(!context.translate(&DataObject::new(Color::Red)).is_unavailable());
        assert!(matches!(context.translator::<Color>(), Lookup::Missing));
    }
}
