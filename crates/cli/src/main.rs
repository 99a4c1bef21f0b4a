use std::io::{self, BufRead, Read, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use env_logger::Env;

use voicelog_core::audio::infrastructure::audio_stager::AudioStager;
use voicelog_core::audio::infrastructure::ffmpeg_audio_reader::FfmpegAudioReader;
use voicelog_core::pipeline::transcribe_use_case::TranscribeUseCase;
use voicelog_core::pipeline::transcription_result::TranscriptionResult;
use voicelog_core::recognition::domain::backend_selector::select_backend;
use voicelog_core::recognition::infrastructure::model_probe::LocalModelProbe;
use voicelog_core::recognition::infrastructure::recognizer_factory::create_recognizer;
use voicelog_core::text::domain::fallback_generator::FallbackGenerator;

const NO_AUDIO_ERROR: &str = "No audio data provided";

/// Transcribes a base64-encoded Russian voice message read from stdin and
/// prints the result as JSON.
#[derive(Parser)]
#[command(name = "voicelog-transcribe")]
struct Cli {
    /// Directory with bundled whisper.cpp models, searched before the user cache.
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Model cache directory (default: platform cache dir under `voicelog/models`).
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// Download a missing model into the cache instead of skipping it.
    #[arg(long)]
    download_models: bool,

    /// Decoder threads (default: available cores, at most 4).
    #[arg(long)]
    threads: Option<usize>,

    /// Directory for staged audio files (default: system temp dir).
    #[arg(long)]
    temp_dir: Option<PathBuf>,

    /// Seed for fallback phrases, for reproducible output.
    #[arg(long)]
    seed: Option<u64>,

    /// Read one base64 message per line and print one JSON object per line.
    #[arg(long)]
    lines: bool,
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    match run() {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            let failure = TranscriptionResult::failure(format!("Transcription failed: {e}"));
            if let Err(e) = emit(&failure) {
                eprintln!("Error: {e}");
            }
            process::exit(1);
        }
    }
}

/// Returns `Ok(false)` when no audio was supplied.
fn run() -> Result<bool, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let mut use_case = build_use_case(&cli);

    if cli.lines {
        log::info!("Reading one request per stdin line");
        for line in io::stdin().lock().lines() {
            let line = line?;
            let input = line.trim();
            let result = if input.is_empty() {
                TranscriptionResult::failure(NO_AUDIO_ERROR)
            } else {
                use_case.transcribe(input)
            };
            emit(&result)?;
        }
        return Ok(true);
    }

    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;
    let input = input.trim();
    if input.is_empty() {
        emit(&TranscriptionResult::failure(NO_AUDIO_ERROR))?;
        return Ok(false);
    }

    emit(&use_case.transcribe(input))?;
    Ok(true)
}

fn build_use_case(cli: &Cli) -> TranscribeUseCase {
    let probe = LocalModelProbe::new(cli.model_dir.as_deref())
        .with_cache_dir(cli.cache_dir.as_deref())
        .with_download(cli.download_models)
        .with_progress(download_progress);
    let choice = select_backend(&probe);
    let recognizer = create_recognizer(&choice, cli.threads);

    let stager = match &cli.temp_dir {
        Some(dir) => AudioStager::in_dir(dir),
        None => AudioStager::new(),
    };
    let fallback = match cli.seed {
        Some(seed) => FallbackGenerator::with_seed(seed),
        None => FallbackGenerator::new(),
    };

    TranscribeUseCase::new(stager, Box::new(FfmpegAudioReader), recognizer, fallback)
}

fn emit(result: &TranscriptionResult) -> Result<(), Box<dyn std::error::Error>> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, result)?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(dir) = &cli.model_dir {
        if !dir.is_dir() {
            return Err(format!("Model directory not found: {}", dir.display()).into());
        }
    }
    if let Some(dir) = &cli.temp_dir {
        if !dir.is_dir() {
            return Err(format!("Temp directory not found: {}", dir.display()).into());
        }
    }
    if let Some(dir) = &cli.cache_dir {
        if dir.exists() && !dir.is_dir() {
            return Err(format!("Cache path is not a directory: {}", dir.display()).into());
        }
    }
    if cli.threads == Some(0) {
        return Err("Threads must be at least 1".into());
    }
    Ok(())
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading speech model... {pct}%");
        if downloaded >= total {
            eprintln!();
        }
    } else {
        eprint!("\rDownloading speech model... {downloaded} bytes");
    }
}
