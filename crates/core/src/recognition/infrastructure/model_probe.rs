use std::path::{Path, PathBuf};

use crate::recognition::domain::backend_selector::{EngineKind, EngineProbe};
use crate::shared::model_resolver::{self, ProgressFn};

/// Probes engines by looking for their model weights on disk.
///
/// Checks the bundled directory, then the model cache (the platform cache
/// directory unless overridden). With downloads enabled, a missing model is
/// fetched into the cache instead.
#[derive(Debug, Default)]
pub struct LocalModelProbe {
    bundled_dir: Option<PathBuf>,
    cache_dir: Option<PathBuf>,
    allow_download: bool,
    progress: Option<fn(u64, u64)>,
}

impl LocalModelProbe {
    pub fn new(bundled_dir: Option<&Path>) -> Self {
        Self {
            bundled_dir: bundled_dir.map(Path::to_path_buf),
            ..Self::default()
        }
    }

    /// Use `cache_dir` instead of the platform cache directory.
    pub fn with_cache_dir(mut self, cache_dir: Option<&Path>) -> Self {
        self.cache_dir = cache_dir.map(Path::to_path_buf);
        self
    }

    pub fn with_download(mut self, allow_download: bool) -> Self {
        self.allow_download = allow_download;
        self
    }

    /// Called with `(bytes_downloaded, total_bytes)` while a model downloads.
    pub fn with_progress(mut self, progress: fn(u64, u64)) -> Self {
        self.progress = Some(progress);
        self
    }
}

impl EngineProbe for LocalModelProbe {
    fn probe(&self, kind: EngineKind) -> Option<PathBuf> {
        let bundled = self.bundled_dir.as_deref();
        let cache = self.cache_dir.as_deref();
        if !self.allow_download {
            return model_resolver::locate(kind.model_name(), bundled, cache);
        }

        let progress = self.progress.map(|f| Box::new(f) as ProgressFn);
        match model_resolver::resolve(kind.model_name(), kind.model_url(), bundled, cache, progress)
        {
            Ok(path) => Some(path),
            Err(e) => {
                log::warn!("Could not fetch model for {kind}: {e}");
                None
            }
        }
    }

    fn install_hint(&self) -> String {
        let mut places = Vec::new();
        if let Some(dir) = &self.bundled_dir {
            places.push(dir.display().to_string());
        }
        match &self.cache_dir {
            Some(dir) => places.push(dir.display().to_string()),
            None => {
                if let Ok(dir) = model_resolver::model_cache_dir() {
                    places.push(dir.display().to_string());
                }
            }
        }
        format!(
            "download {} or {} into {}",
            EngineKind::Fast.model_url(),
            EngineKind::Reference.model_url(),
            places.join(" or ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognition::domain::backend_selector::{select_backend, BackendChoice};
    use std::fs;
    use tempfile::TempDir;

    struct ModelDirs {
        bundled: TempDir,
        cache: TempDir,
    }

    impl ModelDirs {
        fn new() -> Self {
            Self {
                bundled: TempDir::new().unwrap(),
                cache: TempDir::new().unwrap(),
            }
        }

        fn probe(&self) -> LocalModelProbe {
            LocalModelProbe::new(Some(self.bundled.path())).with_cache_dir(Some(self.cache.path()))
        }

        fn put(dir: &TempDir, kind: EngineKind) -> PathBuf {
            let path = dir.path().join(kind.model_name());
            fs::write(&path, b"weights").unwrap();
            path
        }
    }

    #[test]
    fn test_probe_finds_bundled_fast_model() {
        let dirs = ModelDirs::new();
        let model = ModelDirs::put(&dirs.bundled, EngineKind::Fast);
        assert_eq!(dirs.probe().probe(EngineKind::Fast), Some(model));
    }

    #[test]
    fn test_bundled_reference_model_only_selects_reference() {
        let dirs = ModelDirs::new();
        let model = ModelDirs::put(&dirs.bundled, EngineKind::Reference);
        assert_eq!(
            select_backend(&dirs.probe()),
            BackendChoice::Reference { model_path: model }
        );
    }

    #[test]
    fn test_cached_fast_model_beats_bundled_reference() {
        let dirs = ModelDirs::new();
        ModelDirs::put(&dirs.bundled, EngineKind::Reference);
        let fast = ModelDirs::put(&dirs.cache, EngineKind::Fast);
        assert_eq!(
            select_backend(&dirs.probe()),
            BackendChoice::Fast { model_path: fast }
        );
    }

    #[test]
    fn test_empty_dirs_select_no_engine() {
        let dirs = ModelDirs::new();
        assert_eq!(select_backend(&dirs.probe()), BackendChoice::NoEngine);
    }

    #[test]
    fn test_install_hint_names_models_and_dirs() {
        let dirs = ModelDirs::new();
        let hint = dirs.probe().install_hint();
        assert!(hint.contains(EngineKind::Fast.model_name()));
        assert!(hint.contains(EngineKind::Reference.model_name()));
        assert!(hint.contains(&dirs.bundled.path().display().to_string()));
        assert!(hint.contains(&dirs.cache.path().display().to_string()));
    }

    #[test]
    fn test_default_probe_has_no_overrides() {
        let probe = LocalModelProbe::default();
        assert!(probe.bundled_dir.is_none());
        assert!(probe.cache_dir.is_none());
        assert!(!probe.allow_download);
    }
}
