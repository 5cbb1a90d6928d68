//! Depth-first directory traversal

use crate::root::TraversalRoot;
use core_types::{AccessError, AccessResult, ResourceHandle};
use services_settings::DEFAULT_UNKNOWN_NAME;
use services_storage::{NodeInfo, Storage, StorageNode};
use workspace_access::ScopeGuard;

/// One child as seen by a traversal transform
pub struct ChildVisit<'a> {
    pub node: &'a StorageNode,
    pub info: &'a NodeInfo,
    /// Leaf name (placeholder if undecodable)
    pub name: &'a str,
    /// Path from the traversal root
    pub relative_path: &'a str,
}

/// Recursive directory walker
pub struct DirectoryWalker<'s> {
    storage: &'s Storage,
    unknown_name: String,
}

impl<'s> DirectoryWalker<'s> {
    pub fn new(storage: &'s Storage) -> Self {
        Self {
            storage,
            unknown_name: DEFAULT_UNKNOWN_NAME.to_string(),
        }
    }

    /// Sets the name reported for entries without a decodable name
    pub fn with_unknown_name(mut self, name: impl Into<String>) -> Self {
        self.unknown_name = name.into();
        self
    }

    pub fn storage(&self) -> &'s Storage {
        self.storage
    }

    /// Walks the directory behind `handle`, turning each child into a `T`
    ///
    /// The handle's scope is held for the whole walk. The first error from
    /// storage or from `transform` aborts the walk and discards everything
    /// collected so far.
    pub fn walk<T, F>(
        &self,
        handle: &ResourceHandle,
        recursive: bool,
        mut transform: F,
    ) -> AccessResult<Vec<T>>
    where
        F: FnMut(&ChildVisit<'_>) -> AccessResult<T>,
    {
        let guard = ScopeGuard::acquire(self.storage, handle);
        guard.require()?;

        let node = self.storage.resolve(handle)?;
        if !self.storage.info(&node)?.is_directory {
            return Err(AccessError::NotFound(format!("Not a directory: {}", handle)));
        }

        let mut collected = Vec::new();
        self.visit(&TraversalRoot::top(node), recursive, &mut transform, &mut collected)?;
        Ok(collected)
    }

    fn visit<T, F>(
        &self,
        root: &TraversalRoot,
        recursive: bool,
        transform: &mut F,
        collected: &mut Vec<T>,
    ) -> AccessResult<()>
    where
        F: FnMut(&ChildVisit<'_>) -> AccessResult<T>,
    {
        for (child, info) in self.storage.children(root.node())? {
            let name = match info.name.as_deref() {
                Some(name) if !name.is_empty() => name.to_string(),
                _ => self.unknown_name.clone(),
            };
            let relative_path = root.child_path(&name);

            collected.push(transform(&ChildVisit {
                node: &child,
                info: &info,
                name: &name,
                relative_path: &relative_path,
            })?);

            if recursive && info.is_directory {
                self.visit(
                    &TraversalRoot::nested(child, relative_path),
                    recursive,
                    transform,
                    collected,
                )?;
            }
        }
        Ok(())
    }

    /// Relative paths of every child (and descendant, if `recursive`)
    pub fn list(&self, handle: &ResourceHandle, recursive: bool) -> AccessResult<Vec<String>> {
        self.walk(handle, recursive, |visit| Ok(visit.relative_path.to_string()))
    }
}
