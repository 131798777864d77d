use crate::constants::UNKNOWN_CATEGORY_NAME;
use crate::icons::descriptor::IconDescriptor;
use crate::prelude::HashMap;

/// Maps category ids to display names. Must not fail: unknown ids resolve
/// to a placeholder chosen by the implementation.
pub trait NameResolver: Send + Sync {
    fn category_name(&self, id: u64) -> String;
}

impl<F> NameResolver for F
where
    F: Fn(u64) -> String + Send + Sync,
{
    fn category_name(&self, id: u64) -> String {
        self(id)
    }
}

/// Category names backed by already loaded descriptors
#[derive(Debug, Clone)]
pub struct CategoryDirectory {
    names: HashMap<u64, String>,
    placeholder: String,
}

impl CategoryDirectory {
    pub fn new() -> Self {
        Self {
            names: HashMap::default(),
            placeholder: UNKNOWN_CATEGORY_NAME.to_string(),
        }
    }

    /// Indexes every descriptor with a numeric id and a name
    pub fn from_descriptors(descriptors: &[IconDescriptor]) -> Self {
        let mut directory = Self::new();
        for descriptor in descriptors {
            match (descriptor.id.as_number(), descriptor.name.as_deref()) {
                (Some(id), Some(name)) if !name.trim().is_empty() => {
                    directory.insert(id, name.trim());
                }
                _ => log::trace!("descriptor {} has no nameable id", descriptor.id),
            }
        }
        directory
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn insert(&mut self, id: u64, name: impl Into<String>) {
        self.names.insert(id, name.into());
    }

    pub fn get(&self, id: u64) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for CategoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl NameResolver for CategoryDirectory {
    fn category_name(&self, id: u64) -> String {
        self.get(id)
            .map(str::to_string)
            .unwrap_or_else(|| self.placeholder.clone())
    }
}
