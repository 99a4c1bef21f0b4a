use std::fmt;
use std::path::PathBuf;

use crate::shared::constants::{
    FAST_MODEL_NAME, FAST_MODEL_URL, REFERENCE_MODEL_NAME, REFERENCE_MODEL_URL,
};

/// Speech-recognition engines in priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineKind {
    /// Quantized model, greedy decoding. Lower latency on commodity CPUs.
    Fast,
    /// Full-precision model with tuned beam-search decoding.
    Reference,
}

impl EngineKind {
    pub const PRIORITY: [EngineKind; 2] = [EngineKind::Fast, EngineKind::Reference];

    pub fn model_name(&self) -> &'static str {
        match self {
            EngineKind::Fast => FAST_MODEL_NAME,
            EngineKind::Reference => REFERENCE_MODEL_NAME,
        }
    }

    pub fn model_url(&self) -> &'static str {
        match self {
            EngineKind::Fast => FAST_MODEL_URL,
            EngineKind::Reference => REFERENCE_MODEL_URL,
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineKind::Fast => write!(f, "fast quantized whisper ({FAST_MODEL_NAME})"),
            EngineKind::Reference => write!(f, "reference whisper ({REFERENCE_MODEL_NAME})"),
        }
    }
}

/// Backend resolved once at startup and handed to the pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendChoice {
    Fast { model_path: PathBuf },
    Reference { model_path: PathBuf },
    /// Nothing available; every request gets a fallback phrase.
    NoEngine,
}

/// Checks whether an engine can run here, returning its model path if so.
pub trait EngineProbe {
    fn probe(&self, kind: EngineKind) -> Option<PathBuf>;

    /// Where a missing model should be installed, for the diagnostic.
    fn install_hint(&self) -> String;
}

/// Pick the first available engine in [`EngineKind::PRIORITY`] order.
///
/// Logs exactly one line describing the outcome.
pub fn select_backend(probe: &dyn EngineProbe) -> BackendChoice {
    for kind in EngineKind::PRIORITY {
        if let Some(model_path) = probe.probe(kind) {
            log::info!("Using {kind} from {}", model_path.display());
            return match kind {
                EngineKind::Fast => BackendChoice::Fast { model_path },
                EngineKind::Reference => BackendChoice::Reference { model_path },
            };
        }
    }

    log::warn!(
        "No speech-recognition model installed ({FAST_MODEL_NAME} or {REFERENCE_MODEL_NAME}); \
         transcripts will be fallback phrases. Install a model: {}",
        probe.install_hint()
    );
    BackendChoice::NoEngine
}
