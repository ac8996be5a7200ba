// SPDX-FileCopyrightText: 2025 Signalworks Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Classifier cache and loader
//!
//! Each (canonical artifact path, classification type) pair resolves to
//! exactly one long-lived classifier instance, shared across all callers for
//! the life of the process. The memoization table guarantees at most one
//! construction per key under concurrent first access; populated reads are
//! lock-free. There is no eviction and no TTL; capacity is bounded by the
//! number of distinct classification types in use.

use std::{
    hash::Hash,
    path::{Path, PathBuf},
    sync::Arc,
};

use dashmap::DashMap;
use shared_types::ClassificationType;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument};

use crate::{
    classifier::ComplaintClassifier,
    config::ReconcileOptions,
    error::{PredictorError, PredictorResult},
    lm::LanguageModel,
    reconcile,
};

/// Loads classifiers from artifacts and applies metadata reconciliation
#[derive(Debug)]
pub struct ClassifierLoader<L> {
    lm: Arc<L>,
    reconcile: ReconcileOptions,
}

impl<L: LanguageModel> ClassifierLoader<L> {
    /// Create a loader with an explicit reconciliation policy
    pub fn new(lm: Arc<L>, reconcile: ReconcileOptions) -> Self {
        Self { lm, reconcile }
    }

    /// Load a classifier from an artifact file
    ///
    /// Reconciliation runs as a best-effort side effect after a successful
    /// load; its outcome never affects the returned classifier.
    #[instrument(skip_all, fields(path = %path.display(), classification_type = %ty))]
    pub async fn load(
        &self,
        path: &Path,
        ty: ClassificationType,
    ) -> PredictorResult<Arc<ComplaintClassifier<L>>> {
        let classifier = ComplaintClassifier::from_artifact(path, ty, self.lm.clone()).await?;

        let outcome = reconcile::reconcile_model_metadata(path, &self.reconcile).await;
        debug!(outcome = %outcome, "artifact metadata reconciliation");

        info!(classification_type = %ty, "classifier loaded");
        Ok(Arc::new(classifier))
    }
}

/// Memoization table guaranteeing at-most-one-initialization-per-key under
/// concurrent first access
///
/// Not a general cache: no TTL, no eviction, no size bound. Failed
/// initializations leave the cell empty so a later call may retry.
#[derive(Debug)]
struct KeyedOnce<K: Eq + Hash, V> {
    cells: DashMap<K, Arc<OnceCell<V>>>,
}

impl<K, V> KeyedOnce<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn new() -> Self {
        Self {
            cells: DashMap::new(),
        }
    }

    fn len(&self) -> usize {
        self.cells.len()
    }

    async fn get_or_try_init<F, Fut>(&self, key: K, init: F) -> PredictorResult<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = PredictorResult<V>>,
    {
        // The shard lock is held only to fetch the cell; initialization
        // happens outside it, serialized per key by the OnceCell.
        let cell = self.cells.entry(key).or_default().clone();
        cell.get_or_try_init(init).await.map(Clone::clone)
    }
}

/// Process-wide classifier cache keyed by (canonical path, type)
#[derive(Debug)]
pub struct ClassifierCache<L> {
    entries: KeyedOnce<(PathBuf, ClassificationType), Arc<ComplaintClassifier<L>>>,
    loader: ClassifierLoader<L>,
}

impl<L: LanguageModel> ClassifierCache<L> {
    /// Create a cache around a loader
    pub fn new(loader: ClassifierLoader<L>) -> Self {
        Self {
            entries: KeyedOnce::new(),
            loader,
        }
    }

    /// Return the classifier for (path, type), loading it on first access
    ///
    /// Concurrent first-access callers for the same key trigger exactly one
    /// underlying load and all receive the same instance. Load failures are
    /// not cached.
    pub async fn get_or_load(
        &self,
        path: &Path,
        ty: ClassificationType,
    ) -> PredictorResult<Arc<ComplaintClassifier<L>>> {
        let canonical = canonicalize_artifact_path(path).await?;
        let key = (canonical.clone(), ty);

        self.entries
            .get_or_try_init(key, || async move { self.loader.load(&canonical, ty).await })
            .await
    }

    /// Number of keys the cache has seen
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.len() == 0
    }
}

/// Canonicalize an artifact path, mapping a missing file to
/// `ArtifactNotFound`
async fn canonicalize_artifact_path(path: &Path) -> PredictorResult<PathBuf> {
    match tokio::fs::canonicalize(path).await {
        Ok(canonical) => Ok(canonical),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(PredictorError::artifact_not_found(path))
        }
        Err(e) => Err(PredictorError::io(format!(
            "failed to canonicalize {}: {e}",
            path.display()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tempfile::TempDir;
    use tokio::sync::Barrier;

    use super::*;
    use crate::{
        artifact::{ArtifactDocument, ArtifactMetadata, CompiledProgram, artifact_path},
        lm::ChatMessage,
        taxonomy::classification_config,
    };

    #[derive(Debug)]
    struct StubLm;

    impl LanguageModel for StubLm {
        async fn complete(&self, _messages: Vec<ChatMessage>) -> PredictorResult<String> {
            Ok("Classification: Adverse Event\nJustification: stubbed".to_string())
        }
    }

    async fn write_artifact(dir: &Path, ty: ClassificationType) -> PathBuf {
        let path = artifact_path(dir, ty);
        let document = ArtifactDocument {
            program: CompiledProgram {
                instructions: "Classify the complaint.".to_string(),
                demos: Vec::new(),
            },
            metadata: ArtifactMetadata {
                model: Some("test/model".to_string()),
                classification_type: ty,
                classification_config: classification_config(ty).clone(),
                optimized_at: None,
            },
        };
        document.write(&path).await.unwrap();
        path
    }

    fn cache() -> Arc<ClassifierCache<StubLm>> {
        Arc::new(ClassifierCache::new(ClassifierLoader::new(
            Arc::new(StubLm),
            ReconcileOptions::disabled(),
        )))
    }

    #[tokio::test]
    async fn keyed_once_initializes_each_key_at_most_once() {
        const CALLERS: usize = 16;

        let table = Arc::new(KeyedOnce::<u32, u32>::new());
        let init_count = Arc::new(AtomicUsize::new(0));
        let barrier = Arc::new(Barrier::new(CALLERS));

        let mut handles = Vec::new();
        for _ in 0..CALLERS {
            let table = Arc::clone(&table);
            let init_count = Arc::clone(&init_count);
            let barrier = Arc::clone(&barrier);
            handles.push(tokio::spawn(async move {
                barrier.wait().await;
                table
                    .get_or_try_init(7, || async move {
                        init_count.fetch_add(1, Ordering::SeqCst);
                        // Widen the race window.
                        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
                        Ok(42)
                    })
                    .await
                    .unwrap()
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap(), 42);
        }
        assert_eq!(init_count.load(Ordering::SeqCst), 1);
        assert_eq!(table.len(), 1);
    }

    #[tokio::test]
    async fn failed_initialization_is_not_cached() {
        let table = KeyedOnce::<u32, u32>::new();

        let first: PredictorResult<u32> = table
            .get_or_try_init(1, || async { Err(PredictorError::io("transient")) })
            .await;
        assert!(first.is_err());

        let second = table.get_or_try_init(1, || async { Ok(5) }).await.unwrap();
        assert_eq!(second, 5);
    }

    #[tokio::test]
    async fn repeated_lookups_return_the_identical_instance() {
        let tmp = TempDir::new().unwrap();
        let path = write_artifact(tmp.path(), ClassificationType::AePc).await;
        let cache = cache();

        let first = cache
            .get_or_load(&path, ClassificationType::AePc)
            .await
            .unwrap();
        let second = cache
            .get_or_load(&path, ClassificationType::AePc)
            .await
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_first_access_shares_one_instance() {
        const CALLERS: usize = 8;

        let tmp = TempDir::new().unwrap();
        let path = write_artifact(tmp.path(), ClassificationType::AeCategory).await;
        let cache = cache();
        let barrier = Arc::new(Barrier::new(CALLERS));

        let mut handles = Vec::new();
        for _ in 0..CALLERS {
            let cache = Arc::clone(&cache);
            let path = path.clone();
            let barrier = Arc::clone(&barrier);
            handles.push(tokio::spawn(async move {
                barrier.wait().await;
                cache
                    .get_or_load(&path, ClassificationType::AeCategory)
                    .await
                    .unwrap()
            }));
        }

        let mut instances = Vec::new();
        for handle in handles {
            instances.push(handle.await.unwrap());
        }
        for instance in &instances[1..] {
            assert!(Arc::ptr_eq(&instances[0], instance));
        }
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn missing_artifact_is_not_found_and_does_not_poison_other_keys() {
        let tmp = TempDir::new().unwrap();
        let present = write_artifact(tmp.path(), ClassificationType::AePc).await;
        let absent = artifact_path(tmp.path(), ClassificationType::PcCategory);
        let cache = cache();

        let err = cache
            .get_or_load(&absent, ClassificationType::PcCategory)
            .await
            .unwrap_err();
        assert!(matches!(err, PredictorError::ArtifactNotFound { .. }));

        // The present type keeps working.
        let classifier = cache
            .get_or_load(&present, ClassificationType::AePc)
            .await
            .unwrap();
        assert_eq!(classifier.classification_type(), ClassificationType::AePc);
    }

    #[tokio::test]
    async fn symlinked_and_direct_paths_share_a_cache_entry() {
        let tmp = TempDir::new().unwrap();
        let path = write_artifact(tmp.path(), ClassificationType::AePc).await;
        // A relative spelling of the same file canonicalizes to one key.
        let dotted = tmp.path().join(".").join(
            path.file_name().expect("artifact path has a file name"),
        );
        let cache = cache();

        let first = cache
            .get_or_load(&path, ClassificationType::AePc)
            .await
            .unwrap();
        let second = cache
            .get_or_load(&dotted, ClassificationType::AePc)
            .await
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }
}
