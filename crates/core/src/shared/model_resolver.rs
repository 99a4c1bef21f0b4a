use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("failed to create cache directory: {0}")]
    CacheDir(#[source] std::io::Error),
    #[error("download failed for {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to write model to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not determine cache directory")]
    NoCacheDir,
}

/// Progress callback: `(bytes_downloaded, total_bytes)`.
/// `total_bytes` is 0 if the server didn't provide Content-Length.
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send>;

/// Find a model file that is already on disk, without touching the network.
///
/// Lookup order:
/// 1. Bundled directory (models shipped next to the binary)
/// 2. `cache_dir`, or the platform cache directory when `None`
pub fn locate(name: &str, bundled_dir: Option<&Path>, cache_dir: Option<&Path>) -> Option<PathBuf> {
    if let Some(dir) = bundled_dir {
        let bundled_path = dir.join(name);
        if bundled_path.is_file() {
            return Some(bundled_path);
        }
    }

    let cached_path = cache_dir_or_default(cache_dir).ok()?.join(name);
    cached_path.is_file().then_some(cached_path)
}

/// Resolve a model file by name, downloading it into the cache if it is not
/// found locally.
pub fn resolve(
    name: &str,
    url: &str,
    bundled_dir: Option<&Path>,
    cache_dir: Option<&Path>,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    if let Some(path) = locate(name, bundled_dir, cache_dir) {
        return Ok(path);
    }

    let cache_dir = cache_dir_or_default(cache_dir)?;
    let cached_path = cache_dir.join(name);
    fs::create_dir_all(&cache_dir).map_err(ModelResolveError::CacheDir)?;
    log::info!("Downloading {name} into {}", cache_dir.display());
    download(url, &cached_path, progress)?;
    Ok(cached_path)
}

/// Platform-specific model cache directory.
///
/// - macOS: `~/Library/Application Support/voicelog/models/`
/// - Linux: `$XDG_CACHE_HOME/voicelog/models/` or `~/.cache/voicelog/models/`
/// - Windows: `%LOCALAPPDATA%/voicelog/models/`
pub fn model_cache_dir() -> Result<PathBuf, ModelResolveError> {
    #[cfg(target_os = "macos")]
    {
        dirs::data_dir()
            .map(|d| d.join("voicelog").join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
    #[cfg(not(target_os = "macos"))]
    {
        dirs::cache_dir()
            .map(|d| d.join("voicelog").join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
}

fn cache_dir_or_default(cache_dir: Option<&Path>) -> Result<PathBuf, ModelResolveError> {
    match cache_dir {
        Some(dir) => Ok(dir.to_path_buf()),
        None => model_cache_dir(),
    }
}

fn download(url: &str, dest: &Path, progress: Option<ProgressFn>) -> Result<(), ModelResolveError> {
    let response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(|e| ModelResolveError::Download {
            url: url.to_string(),
            source: e,
        })?;

    let total = response.content_length().unwrap_or(0);
    let mut downloaded: u64 = 0;

    let bytes = response.bytes().map_err(|e| ModelResolveError::Download {
        url: url.to_string(),
        source: e,
    })?;

    // Write to a temp file first, then rename for atomicity
    let temp_path = dest.with_extension("part");
    let mut file = fs::File::create(&temp_path).map_err(|e| ModelResolveError::Write {
        path: temp_path.clone(),
        source: e,
    })?;

    let chunk_size = 1024 * 1024;
    for chunk in bytes.chunks(chunk_size) {
        if let Err(e) = file.write_all(chunk) {
            let _ = fs::remove_file(&temp_path);
            return Err(ModelResolveError::Write {
                path: temp_path,
                source: e,
            });
        }
        downloaded += chunk.len() as u64;
        if let Some(ref cb) = progress {
            cb(downloaded, total);
        }
    }

    file.flush().map_err(|e| ModelResolveError::Write {
        path: temp_path.clone(),
        source: e,
    })?;
    drop(file);

    fs::rename(&temp_path, dest).map_err(|e| ModelResolveError::Write {
        path: dest.to_path_buf(),
        source: e,
    })?;

    Ok(())
}
