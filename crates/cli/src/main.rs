use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use subvox_core::audio::domain::segmenter::Segmenter;
use subvox_core::audio::domain::signal_conditioner::SignalConditioner;
use subvox_core::media::infrastructure::ffmpeg_audio_extractor::FfmpegAudioExtractor;
use subvox_core::pipeline::generate_subtitles_use_case::GenerateSubtitlesUseCase;
use subvox_core::pipeline::infrastructure::worker_pool_executor::WorkerPoolExecutor;
use subvox_core::pipeline::job_record::InMemoryJobRecord;
use subvox_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use subvox_core::shared::constants::{
    DEFAULT_WORKER_COUNT, HTTP_REQUEST_TIMEOUT_SECS, SUBTITLE_EXTENSION,
};
use subvox_core::subtitle::infrastructure::fs_subtitle_writer::FsSubtitleWriter;
use subvox_core::transcription::domain::segment_recognizer::RetryPolicy;
use subvox_core::transcription::infrastructure::http_speech_recognizer::HttpSpeechRecognizer;

/// Speech recognition and subtitle generation for videos.
#[derive(Parser)]
#[command(name = "subvox")]
struct Cli {
    /// Input video file.
    input: PathBuf,

    /// Output subtitle file (defaults to the input path with an .srt extension).
    output: Option<PathBuf>,

    /// Base URL of the transcription service.
    #[arg(long, default_value = "https://api.openai.com/v1")]
    service_url: String,

    /// API key for the transcription service (falls back to SUBVOX_API_KEY).
    #[arg(long)]
    api_key: Option<String>,

    /// Model name sent to the transcription service.
    #[arg(long, default_value = "whisper-1")]
    model: String,

    /// Spoken language hint (pass an empty string to let the service guess).
    #[arg(long, default_value = "en")]
    language: String,

    /// Concurrent recognition requests.
    #[arg(long, default_value_t = DEFAULT_WORKER_COUNT)]
    workers: usize,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = HTTP_REQUEST_TIMEOUT_SECS)]
    request_timeout: u64,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| cli.input.with_extension(SUBTITLE_EXTENSION));

    let api_key = cli
        .api_key
        .clone()
        .or_else(|| std::env::var("SUBVOX_API_KEY").ok());
    let language = if cli.language.is_empty() {
        None
    } else {
        Some(cli.language.clone())
    };

    let recognizer = HttpSpeechRecognizer::new(
        &cli.service_url,
        api_key,
        &cli.model,
        language,
        Duration::from_secs(cli.request_timeout),
    )?;

    let progress: Box<dyn Fn(usize, usize) -> bool + Send> = Box::new(|current, total| {
        eprint!("\rRecognizing segment {current}/{total}");
        true
    });

    let use_case = GenerateSubtitlesUseCase::new(
        Box::new(FfmpegAudioExtractor::new()),
        SignalConditioner::new(),
        Segmenter::default(),
        Arc::new(recognizer),
        Box::new(WorkerPoolExecutor::new()),
        Box::new(FsSubtitleWriter::new()),
        RetryPolicy::default(),
        cli.workers,
        Some(progress),
        None,
    );

    let mut job = InMemoryJobRecord::new();
    let mut logger = StdoutPipelineLogger::new();
    let result = use_case.run(&cli.input, &output, &mut job, &mut logger);
    eprintln!();

    println!("Job {}", job.status());
    result?;
    log::info!("Output written to {}", output.display());
    Ok(())
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input.exists() {
        return Err(format!("Input file not found: {}", cli.input.display()).into());
    }
    if cli.workers == 0 {
        return Err("Workers must be at least 1".into());
    }
    if cli.request_timeout == 0 {
        return Err("Request timeout must be at least 1 second".into());
    }
    if !cli.service_url.starts_with("http://") && !cli.service_url.starts_with("https://") {
        return Err(format!(
            "Service URL must start with http:// or https://, got '{}'",
            cli.service_url
        )
        .into());
    }
    Ok(())
}
