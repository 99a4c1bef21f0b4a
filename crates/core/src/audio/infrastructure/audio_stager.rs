use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::shared::constants::STAGED_AUDIO_SUFFIX;

/// Writes audio payloads to named temp files so file-based decoders can open
/// them.
///
/// The returned `NamedTempFile` deletes itself on drop, so a staged file
/// lives exactly as long as the handle held by the caller.
#[derive(Debug, Default)]
pub struct AudioStager {
    dir: Option<PathBuf>,
}

impl AudioStager {
    /// Stage into the system temp directory.
    pub fn new() -> Self {
        Self { dir: None }
    }

    /// Stage into `dir` instead of the system temp directory.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            dir: Some(dir.to_path_buf()),
        }
    }

    pub fn stage(&self, bytes: &[u8]) -> io::Result<NamedTempFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("voice-").suffix(STAGED_AUDIO_SUFFIX);
        let mut file = match &self.dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        file.write_all(bytes)?;
        file.flush()?;
        Ok(file)
    }
}
