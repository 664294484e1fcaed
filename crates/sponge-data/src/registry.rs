//! Resource keys and registries.
//!
//! Registry-backed values are stored in a data tree by their canonical
//! [`ResourceKey`] rather than by their fields. [`RegistryLookup`] is the
//! collaborator a view consults for that; [`RegistryHolder`] is an in-memory
//! implementation.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

pub const MINECRAFT_NAMESPACE: &str = "minecraft";
pub const SPONGE_NAMESPACE: &str = "sponge";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResourceKeyError {
    #[error("resource key namespace is empty")]
    EmptyNamespace,
    #[error("resource key value is empty")]
    EmptyValue,
    #[error("invalid character {ch:?} in resource key `{key}`")]
    InvalidCharacter { key: String, ch: char },
}

/// A namespaced identifier, rendered as `namespace:value`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey {
    namespace: String,
    value: String,
}

fn check_chars(key: &str, part: &str, allow_slash: bool) -> Result<(), ResourceKeyError> {
    let bad = part.chars().find(|&c| {
        !(c.is_ascii_lowercase()
            || c.is_ascii_digit()
            || matches!(c, '_' | '-' | '.')
            || (allow_slash && c == '/'))
    });
    match bad {
        Some(ch) => Err(ResourceKeyError::InvalidCharacter {
            key: key.to_owned(),
            ch,
        }),
        None => Ok(()),
    }
}

impl ResourceKey {
    /// # Errors
    ///
    /// Fails if either part is empty or contains characters outside
    /// `[a-z0-9_.-]` (`/` is also allowed in the value).
    pub fn new(namespace: impl Into<String>, value: impl Into<String>) -> Result<Self, ResourceKeyError> {
        let namespace = namespace.into();
        let value = value.into();
        if namespace.is_empty() {
            return Err(ResourceKeyError::EmptyNamespace);
        }
        if value.is_empty() {
            return Err(ResourceKeyError::EmptyValue);
        }
        let rendered = format!("{namespace}:{value}");
        check_chars(&rendered, &namespace, false)?;
        check_chars(&rendered, &value, true)?;
        Ok(Self { namespace, value })
    }

    pub fn minecraft(value: impl Into<String>) -> Result<Self, ResourceKeyError> {
        Self::new(MINECRAFT_NAMESPACE, value)
    }

    pub fn sponge(value: impl Into<String>) -> Result<Self, ResourceKeyError> {
        Self::new(SPONGE_NAMESPACE, value)
    }

    /// Parses `namespace:value`; text without a colon lands in the
    /// `minecraft` namespace.
    ///
    /// ```
    /// use sponge_data::ResourceKey;
    ///
    /// assert_eq!(ResourceKey::resolve("stone").unwrap().to_string(), "minecraft:stone");
    /// assert_eq!(ResourceKey::resolve("sponge:void").unwrap().namespace(), "sponge");
    /// ```
    pub fn resolve(text: &str) -> Result<Self, ResourceKeyError> {
        match text.split_once(':') {
            Some((namespace, value)) => Self::new(namespace, value),
            None => Self::minecraft(text),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.value)
    }
}

impl FromStr for ResourceKey {
    type Err = ResourceKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::resolve(s)
    }
}

impl Serialize for ResourceKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ResourceKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Identifies a registry: the registry root plus its location under it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegistryType {
    pub root: ResourceKey,
    pub location: ResourceKey,
}

impl RegistryType {
    pub fn new(root: ResourceKey, location: ResourceKey) -> Self {
        Self { root, location }
    }
}

impl fmt::Display for RegistryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.root, self.location)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("registry {0} already exists")]
    DuplicateRegistry(RegistryType),
    #[error("key {key} is already registered in {registry}")]
    DuplicateKey { registry: RegistryType, key: ResourceKey },
    #[error("registry {0} is not dynamic")]
    NotDynamic(RegistryType),
}

/// An insertion-ordered mapping from resource keys to values of one type.
#[derive(Debug)]
pub struct Registry<T> {
    registry_type: RegistryType,
    entries: IndexMap<ResourceKey, T>,
    dynamic: bool,
}

impl<T: PartialEq> Registry<T> {
    fn new(registry_type: RegistryType, dynamic: bool) -> Self {
        Self {
            registry_type,
            entries: IndexMap::new(),
            dynamic,
        }
    }

    fn insert(&mut self, key: ResourceKey, value: T) -> Result<(), RegistryError> {
        if self.entries.contains_key(&key) {
            return Err(RegistryError::DuplicateKey {
                registry: self.registry_type.clone(),
                key,
            });
        }
        self.entries.insert(key, value);
        Ok(())
    }

    /// Adds an entry after creation. Only dynamic registries accept this.
    pub fn register(&mut self, key: ResourceKey, value: T) -> Result<(), RegistryError> {
        if !self.dynamic {
            return Err(RegistryError::NotDynamic(self.registry_type.clone()));
        }
        self.insert(key, value)
    }

    pub fn registry_type(&self) -> &RegistryType {
        &self.registry_type
    }

    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    pub fn find_value(&self, key: &ResourceKey) -> Option<&T> {
        self.entries.get(key)
    }

    /// Reverse lookup: the key under which `value` is registered.
    pub fn value_key(&self, value: &T) -> Option<&ResourceKey> {
        self.entries
            .iter()
            .find(|(_, candidate)| *candidate == value)
            .map(|(key, _)| key)
    }

    pub fn contains_key(&self, key: &ResourceKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ResourceKey, &T)> {
        self.entries.iter()
    }
}

/// The registry lookup collaborator.
pub trait RegistryLookup {
    /// The registry holding values of the given runtime type, if any.
    fn registry_type_for(&self, type_id: TypeId) -> Option<RegistryType>;

    /// The canonical key of `value` within `registry_type`.
    fn value_key(&self, registry_type: &RegistryType, value: &dyn Any) -> Option<ResourceKey>;

    /// The value registered under `key` within `registry_type`.
    fn find_value(&self, registry_type: &RegistryType, key: &ResourceKey) -> Option<&dyn Any>;
}

trait ErasedRegistry {
    fn value_key_any(&self, value: &dyn Any) -> Option<ResourceKey>;
    fn find_any(&self, key: &ResourceKey) -> Option<&dyn Any>;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: PartialEq + 'static> ErasedRegistry for Registry<T> {
    fn value_key_any(&self, value: &dyn Any) -> Option<ResourceKey> {
        value
            .downcast_ref::<T>()
            .and_then(|value| self.value_key(value))
            .cloned()
    }

    fn find_any(&self, key: &ResourceKey) -> Option<&dyn Any> {
        self.find_value(key).map(|value| value as &dyn Any)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// In-memory collection of typed registries.
///
/// The first registry created for a value type is the one
/// [`RegistryLookup::registry_type_for`] reports for that type.
#[derive(Default)]
pub struct RegistryHolder {
    registries: IndexMap<RegistryType, Box<dyn ErasedRegistry>>,
    by_value_type: HashMap<TypeId, RegistryType>,
}

impl RegistryHolder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry pre-populated with `defaults`.
    ///
    /// # Errors
    ///
    /// Fails if a registry of the same type exists or `defaults` repeats a
    /// key.
    pub fn create_registry<T, I>(
        &mut self,
        registry_type: RegistryType,
        defaults: I,
        dynamic: bool,
    ) -> Result<(), RegistryError>
    where
        T: PartialEq + 'static,
        I: IntoIterator<Item = (ResourceKey, T)>,
    {
        if self.registries.contains_key(&registry_type) {
            return Err(RegistryError::DuplicateRegistry(registry_type));
        }
        let mut registry = Registry::new(registry_type.clone(), dynamic);
        for (key, value) in defaults {
            registry.insert(key, value)?;
        }
        self.by_value_type
            .entry(TypeId::of::<T>())
            .or_insert_with(|| registry_type.clone());
        self.registries.insert(registry_type, Box::new(registry));
        Ok(())
    }

    pub fn find_registry<T: PartialEq + 'static>(&self, registry_type: &RegistryType) -> Option<&Registry<T>> {
        self.registries
            .get(registry_type)
            .and_then(|registry| registry.as_any().downcast_ref::<Registry<T>>())
    }

    pub fn find_registry_mut<T: PartialEq + 'static>(
        &mut self,
        registry_type: &RegistryType,
    ) -> Option<&mut Registry<T>> {
        self.registries
            .get_mut(registry_type)
            .and_then(|registry| registry.as_any_mut().downcast_mut::<Registry<T>>())
    }
}

impl RegistryLookup for RegistryHolder {
    fn registry_type_for(&self, type_id: TypeId) -> Option<RegistryType> {
        self.by_value_type.get(&type_id).cloned()
    }

    fn value_key(&self, registry_type: &RegistryType, value: &dyn Any) -> Option<ResourceKey> {
        self.registries.get(registry_type)?.value_key_any(value)
    }

    fn find_value(&self, registry_type: &RegistryType, key: &ResourceKey) -> Option<&dyn Any> {
        self.registries.get(registry_type)?.find_any(key)
    }
}

impl fmt::Debug for RegistryHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryHolder")
            .field("registries", &self.registries.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Biome {
        Plains,
        Desert,
    }

    fn biome_type() -> RegistryType {
        RegistryType::new(
            ResourceKey::minecraft("root").unwrap(),
            ResourceKey::minecraft("worldgen/biome").unwrap(),
        )
    }

    fn holder() -> RegistryHolder {
        let mut holder = RegistryHolder::new();
        holder
            .create_registry(
                biome_type(),
                [
                    (ResourceKey::minecraft("plains").unwrap(), Biome::Plains),
                    (ResourceKey::minecraft("desert").unwrap(), Biome::Desert),
                ],
                false,
            )
            .unwrap();
        holder
    }

    #[test]
    fn test_resource_key_parse() {
        let key: ResourceKey = "sponge:void".parse().unwrap();
        assert_eq!(key.namespace(), "sponge");
        assert_eq!(key.value(), "void");
        assert_eq!("stone".parse::<ResourceKey>().unwrap().namespace(), "minecraft");
        assert_eq!(":x".parse::<ResourceKey>(), Err(ResourceKeyError::EmptyNamespace));
        assert_eq!("a:".parse::<ResourceKey>(), Err(ResourceKeyError::EmptyValue));
        assert!(matches!(
            "Stone".parse::<ResourceKey>(),
            Err(ResourceKeyError::InvalidCharacter { ch: 'S', .. })
        ));
        assert!("minecraft:worldgen/biome".parse::<ResourceKey>().is_ok());
        assert!("mine/craft:x".parse::<ResourceKey>().is_err());
    }

    #[test]
    fn test_resource_key_serde() {
        let key = ResourceKey::sponge("void").unwrap();
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, "\"sponge:void\"");
        assert_eq!(serde_json::from_str::<ResourceKey>(&json).unwrap(), key);
    }

    #[test]
    fn test_value_key_reverse_lookup() {
        let holder = holder();
        let registry = holder.find_registry::<Biome>(&biome_type()).unwrap();
        assert_eq!(
            registry.value_key(&Biome::Desert),
            Some(&ResourceKey::minecraft("desert").unwrap())
        );
    }

    #[test]
    fn test_lookup_by_type() {
        let holder = holder();
        assert_eq!(holder.registry_type_for(TypeId::of::<Biome>()), Some(biome_type()));
        assert_eq!(holder.registry_type_for(TypeId::of::<String>()), None);
        let key = holder.value_key(&biome_type(), &Biome::Plains).unwrap();
        assert_eq!(key.to_string(), "minecraft:plains");
        let found = holder.find_value(&biome_type(), &key).unwrap();
        assert_eq!(found.downcast_ref::<Biome>(), Some(&Biome::Plains));
    }

    #[test]
    fn test_static_registry_rejects_registration() {
        let mut holder = holder();
        let registry = holder.find_registry_mut::<Biome>(&biome_type()).unwrap();
        assert_eq!(
            registry.register(ResourceKey::minecraft("ocean").unwrap(), Biome::Plains),
            Err(RegistryError::NotDynamic(biome_type()))
        );
    }

    #[test]
    fn test_duplicates_rejected() {
        let mut holder = holder();
        let dup = holder.create_registry::<Biome, _>(biome_type(), [], true);
        assert!(matches!(dup, Err(RegistryError::DuplicateRegistry(_))));

        let other = RegistryType::new(
            ResourceKey::sponge("root").unwrap(),
            ResourceKey::sponge("colors").unwrap(),
        );
        let key = ResourceKey::sponge("red").unwrap();
        let result = holder.create_registry(other, [(key.clone(), 1u8), (key, 2u8)], true);
        assert!(matches!(result, Err(RegistryError::DuplicateKey { .. })));
    }
}
