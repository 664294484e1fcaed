//! In-memory hierarchical data views.
//!
//! A [`DataContainer`] is the root of a mutable tree of [`DataView`]s
//! addressed by [`DataQuery`] paths. Values written with
//! [`DataView::set`] are normalized first: views are deep-copied, mappings
//! become child views, collections become immutable lists, and opaque
//! objects are stored through the registry and translator collaborators
//! carried by the tree's [`DataContext`]. Typed accessors such as
//! [`DataView::get_int`] coerce on read and return `None` instead of
//! failing.
//!
//! # Example
//!
//! ```
//! use sponge_data::{DataContainer, SafetyMode};
//!
//! let container = DataContainer::with_safety(SafetyMode::ClonedOnSet);
//! container
//!     .set("world.spawn", vec![0i32, 64, 0])?
//!     .set("world.name", "overworld")?;
//!
//! assert_eq!(container.get_int_list("world.spawn"), Some(vec![0, 64, 0]));
//! assert_eq!(container.get_string("world.name").as_deref(), Some("overworld"));
//!
//! let copy = container.copy();
//! assert_eq!(copy, container);
//! copy.remove("world.name");
//! assert!(container.contains("world.name"));
//! # Ok::<(), sponge_data::DataError>(())
//! ```

pub mod cli;
pub mod coerce;
pub mod context;
pub mod error;
pub mod input;
pub mod json;
pub mod registry;
pub mod safety;
pub mod translate;
pub mod value;
pub mod view;

pub use context::{DataContext, Lookup};
pub use error::{Collaborator, DataError};
pub use input::{DataInput, DataObject};
pub use json::to_json;
pub use registry::{
    Registry, RegistryError, RegistryHolder, RegistryLookup, RegistryType, ResourceKey, ResourceKeyError,
};
pub use safety::SafetyMode;
pub use sponge_data_query::{DataQuery, QueryError};
pub use translate::{DataBuilder, DataManager, DataSerializable, DataTranslator};
pub use value::{DataArray, DataValue};
pub use view::{DataContainer, DataView};
