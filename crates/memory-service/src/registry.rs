//! Registry of per-project indexes.
//!
//! The registry is owned by the host's composition root and passed by
//! reference to every collaborator. Each project gets one [`ProjectIndex`]
//! behind its own `RwLock`, so writes to a project are serialized while
//! searches run concurrently.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use tracing::{debug, info};

use memory_search::{SearchHits, SearchQuery};
use memory_types::{Document, Settings};

use crate::error::ServiceError;
use crate::project::{IndexStats, ProjectIndex};

/// Shared handle to one project's index.
pub type SharedProjectIndex = Arc<RwLock<ProjectIndex>>;

/// Maps project roots to their isolated index instances.
#[derive(Debug, Default)]
pub struct IndexRegistry {
    settings: Settings,
    instances: RwLock<HashMap<PathBuf, SharedProjectIndex>>,
}

/// Normalize a project root so `/a/b/`, `/a/./b`, `/a/c/../b` and `/a/b`
/// share one entry.
///
/// Existing roots are canonicalized (resolving `..` and symlinks); a root
/// that does not exist yet is only normalized component-wise.
fn registry_key(root: &Path) -> PathBuf {
    root.canonicalize().unwrap_or_else(|_| root.components().collect())
}

impl IndexRegistry {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            instances: RwLock::new(HashMap::new()),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Create (or reset) the index for a project, loading its snapshot.
    ///
    /// Calling this again for an initialized project reloads it from disk;
    /// handles obtained earlier keep pointing at the previous instance.
    pub fn initialize(&self, root: impl AsRef<Path>) -> Result<SharedProjectIndex, ServiceError> {
        let key = registry_key(root.as_ref());
        let project = Arc::new(RwLock::new(ProjectIndex::open(key.clone(), &self.settings)));

        let mut instances = self
            .instances
            .write()
            .map_err(|e| ServiceError::LockPoisoned(e.to_string()))?;
        let replaced = instances.insert(key.clone(), project.clone()).is_some();

        info!(project = ?key, replaced, "Initialized project index");
        Ok(project)
    }

    /// Handle for an initialized project.
    pub fn lookup(&self, root: impl AsRef<Path>) -> Result<SharedProjectIndex, ServiceError> {
        let key = registry_key(root.as_ref());
        let instances = self
            .instances
            .read()
            .map_err(|e| ServiceError::LockPoisoned(e.to_string()))?;
        instances
            .get(&key)
            .cloned()
            .ok_or(ServiceError::NotInitialized(key))
    }

    /// Drop the in-memory index for a project. The snapshot file is kept.
    pub fn clear(&self, root: impl AsRef<Path>) -> Result<bool, ServiceError> {
        let key = registry_key(root.as_ref());
        let mut instances = self
            .instances
            .write()
            .map_err(|e| ServiceError::LockPoisoned(e.to_string()))?;
        let removed = instances.remove(&key).is_some();
        debug!(project = ?key, removed, "Cleared project index");
        Ok(removed)
    }

    pub fn is_initialized(&self, root: impl AsRef<Path>) -> bool {
        let key = registry_key(root.as_ref());
        self.instances
            .read()
            .map(|instances| instances.contains_key(&key))
            .unwrap_or(false)
    }

    /// Initialized project roots, sorted.
    pub fn projects(&self) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = self
            .instances
            .read()
            .map(|instances| instances.keys().cloned().collect())
            .unwrap_or_default();
        roots.sort();
        roots
    }

    /// Run `f` with shared access to a project's index.
    pub fn with_project<T>(
        &self,
        root: impl AsRef<Path>,
        f: impl FnOnce(&ProjectIndex) -> Result<T, ServiceError>,
    ) -> Result<T, ServiceError> {
        let handle = self.lookup(root)?;
        let project = handle
            .read()
            .map_err(|e| ServiceError::LockPoisoned(e.to_string()))?;
        f(&project)
    }

    /// Run `f` with exclusive access to a project's index.
    pub fn with_project_mut<T>(
        &self,
        root: impl AsRef<Path>,
        f: impl FnOnce(&mut ProjectIndex) -> Result<T, ServiceError>,
    ) -> Result<T, ServiceError> {
        let handle = self.lookup(root)?;
        let mut project = handle
            .write()
            .map_err(|e| ServiceError::LockPoisoned(e.to_string()))?;
        f(&mut project)
    }

    pub fn insert(&self, root: impl AsRef<Path>, doc: Document) -> Result<(), ServiceError> {
        self.with_project_mut(root, |project| project.insert(doc))
    }

    pub fn update(&self, root: impl AsRef<Path>, doc: Document) -> Result<bool, ServiceError> {
        self.with_project_mut(root, |project| project.update(doc))
    }

    pub fn delete(&self, root: impl AsRef<Path>, id: &str) -> Result<bool, ServiceError> {
        self.with_project_mut(root, |project| project.delete(id))
    }

    pub fn rebuild(&self, root: impl AsRef<Path>) -> Result<usize, ServiceError> {
        self.with_project_mut(root, |project| project.rebuild())
    }

    pub fn get(&self, root: impl AsRef<Path>, id: &str) -> Result<Option<Document>, ServiceError> {
        self.with_project(root, |project| Ok(project.get(id).cloned()))
    }

    pub fn search(
        &self,
        root: impl AsRef<Path>,
        query: &SearchQuery,
    ) -> Result<SearchHits, ServiceError> {
        self.with_project(root, |project| Ok(project.search(query)))
    }

    pub fn stats(&self, root: impl AsRef<Path>) -> Result<IndexStats, ServiceError> {
        self.with_project(root, |project| Ok(project.stats()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use memory_types::DocType;
    use tempfile::TempDir;

    fn note(registry: &IndexRegistry, root: &Path, id: &str, content: &str) -> Document {
        let scope = registry
            .with_project(root, |project| Ok(project.scope().to_string()))
            .unwrap();
        Document::new(id, DocType::Note, Utc::now(), content, scope)
    }

    #[test]
    fn test_lookup_before_initialize_fails() {
        let dir = TempDir::new().unwrap();
        let registry = IndexRegistry::new(Settings::default());

        let err = registry.lookup(dir.path()).unwrap_err();
        assert!(err.is_not_initialized());
        assert!(registry.search(dir.path(), &SearchQuery::all()).is_err());
    }

    #[test]
    fn test_initialized_but_empty_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let registry = IndexRegistry::new(Settings::default());
        registry.initialize(dir.path()).unwrap();

        let hits = registry.search(dir.path(), &SearchQuery::all()).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_projects_are_isolated() {
        let a = TempDir::new().unwrap();
        let b = TempDir::new().unwrap();
        let registry = IndexRegistry::new(Settings::default());
        registry.initialize(a.path()).unwrap();
        registry.initialize(b.path()).unwrap();

        registry.insert(a.path(), note(&registry, a.path(), "x", "only in alpha")).unwrap();

        assert_eq!(registry.search(a.path(), &SearchQuery::new("alpha")).unwrap().len(), 1);
        assert!(registry.search(b.path(), &SearchQuery::new("alpha")).unwrap().is_empty());
        assert_eq!(registry.projects().len(), 2);
    }

    #[test]
    fn test_trailing_slash_shares_entry() {
        let dir = TempDir::new().unwrap();
        let registry = IndexRegistry::new(Settings::default());
        registry.initialize(dir.path()).unwrap();

        let with_slash = format!("{}/", dir.path().display());
        assert!(registry.is_initialized(&with_slash));
    }

    #[test]
    fn test_parent_dir_segments_share_entry() {
        let dir = TempDir::new().unwrap();
        let project = dir.path().join("project");
        std::fs::create_dir_all(&project).unwrap();
        std::fs::create_dir_all(dir.path().join("other")).unwrap();

        let registry = IndexRegistry::new(Settings::default());
        registry.initialize(&project).unwrap();

        let detour = dir.path().join("other").join("..").join("project");
        assert!(registry.is_initialized(&detour));
        registry
            .insert(&detour, note(&registry, &detour, "x", "reached via detour"))
            .unwrap();
        assert!(registry.get(&project, "x").unwrap().is_some());
        assert_eq!(registry.projects().len(), 1);
    }

    #[test]
    fn test_clear_drops_memory_but_keeps_snapshot() {
        let dir = TempDir::new().unwrap();
        let registry = IndexRegistry::new(Settings::default());
        let handle = registry.initialize(dir.path()).unwrap();
        registry.insert(dir.path(), note(&registry, dir.path(), "x", "survives clear")).unwrap();
        let snapshot = handle.read().unwrap().snapshot_path().to_path_buf();

        assert!(registry.clear(dir.path()).unwrap());
        assert!(!registry.clear(dir.path()).unwrap());
        assert!(!registry.is_initialized(dir.path()));
        assert!(snapshot.is_file());

        registry.initialize(dir.path()).unwrap();
        assert!(registry.get(dir.path(), "x").unwrap().is_some());
    }

    #[test]
    fn test_reinitialize_reloads_from_disk() {
        let dir = TempDir::new().unwrap();
        let registry = IndexRegistry::new(Settings::default());
        registry.initialize(dir.path()).unwrap();
        registry.insert(dir.path(), note(&registry, dir.path(), "x", "kept")).unwrap();

        let handle = registry.initialize(dir.path()).unwrap();
        assert_eq!(handle.read().unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_ids() {
        let dir = TempDir::new().unwrap();
        let registry = IndexRegistry::new(Settings::default());
        registry.initialize(dir.path()).unwrap();

        assert!(!registry.delete(dir.path(), "missing").unwrap());
        assert!(!registry
            .update(dir.path(), note(&registry, dir.path(), "missing", "text"))
            .unwrap());
        assert!(registry.get(dir.path(), "missing").unwrap().is_none());
    }
}
