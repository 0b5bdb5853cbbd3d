// nc_loader/src/registry.rs
// Maps logical collection names to their database handle and source file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{LoaderError, Result};
use crate::sink::DocumentSink;

#[derive(Debug, Clone,)]
pub struct CollectionTarget<S,> {
    pub handle: S,
    pub path:   PathBuf,
}

/// Populated once before any run; read-only afterwards.
#[derive(Debug, Clone,)]
pub struct CollectionRegistry<S,> {
    targets: BTreeMap<String, CollectionTarget<S,>,>,
}

impl<S,> Default for CollectionRegistry<S,> {
    fn default() -> Self {
        Self {
            targets: BTreeMap::new(),
        }
    }
}

impl<S: DocumentSink,> CollectionRegistry<S,> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from `(name, handle, path)` entries. Names must be unique.
    pub fn from_entries<I, P,>(entries: I,) -> Result<Self,>
    where
        I: IntoIterator<Item = (String, S, P,),>,
        P: Into<PathBuf,>,
    {
        let mut registry = Self::new();
        for (name, handle, path,) in entries {
            registry.register(name, handle, path,)?;
        }
        Ok(registry,)
    }

    pub fn register(
        &mut self,
        name: impl Into<String,>,
        handle: S,
        path: impl Into<PathBuf,>,
    ) -> Result<(),> {
        let name = name.into();
        if self.targets.contains_key(&name,) {
            return Err(LoaderError::ConfigurationError(format!(
                "collection '{}' is registered more than once",
                name
            ),),);
        }
        self.targets.insert(
            name,
            CollectionTarget {
                handle,
                path: path.into(),
            },
        );
        Ok((),)
    }

    pub fn resolve(&self, name: &str,) -> Result<(&S, &Path,),> {
        self.targets
            .get(name,)
            .map(|target| (&target.handle, target.path.as_path(),),)
            .ok_or_else(|| LoaderError::UnknownCollection {
                name: name.to_string(),
            },)
    }

    /// Empties the collection registered under `name`.
    pub async fn drop(&self, name: &str,) -> Result<(),> {
        let (handle, _,) = self.resolve(name,)?;
        handle.clear().await
    }
}
