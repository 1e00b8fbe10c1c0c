#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use log::{error, warn, info, debug, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::{Path, PathBuf};
use std::io::Write;
use clap::{Args, Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use subtrans::app_config::{self, Config, EmptyDocumentPolicy, TranslationProvider};
use subtrans::app_controller::Controller;
use subtrans::errors::AppError;
use subtrans::file_utils::{FileManager, FileType};
use subtrans::language_utils;
use subtrans::translation::TranslationService;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Ollama,
    Anthropic,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
            CliTranslationProvider::Anthropic => TranslationProvider::Anthropic,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// Options shared by every pipeline command
#[derive(Args, Debug, Clone)]
struct SharedArgs {
    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Source language code (e.g., 'en', 'es', 'fr')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'en', 'es', 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Fail instead of writing an empty output when the input has nothing to translate
    #[arg(long)]
    abort_on_empty: bool,

    /// Do not draw the progress bar
    #[arg(long)]
    no_progress: bool,
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// WebVTT caption file, or a directory to translate every .vtt file in
    #[arg(value_name = "SOURCE")]
    source: PathBuf,

    /// Output SRT path (defaults to <stem>-translated.srt next to the source)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Also burn the translated subtitles into this video
    #[arg(long, value_name = "VIDEO")]
    video: Option<PathBuf>,

    /// Output video path (defaults to <video stem>_subtitled.mp4)
    #[arg(long, requires = "video", value_name = "OUTPUT_VIDEO")]
    video_output: Option<PathBuf>,

    #[command(flatten)]
    shared: SharedArgs,
}

#[derive(Parser, Debug)]
struct BurnArgs {
    /// Video to burn the subtitles into
    #[arg(value_name = "VIDEO")]
    video: PathBuf,

    /// WebVTT captions to translate
    #[arg(value_name = "CAPTIONS")]
    captions: PathBuf,

    /// Output video path (defaults to <video stem>_subtitled.mp4)
    #[arg(short, long, value_name = "OUTPUT_VIDEO")]
    output: Option<PathBuf>,

    /// Output SRT path (defaults to <stem>-translated.srt next to the captions)
    #[arg(long, value_name = "SRT")]
    srt_output: Option<PathBuf>,

    #[command(flatten)]
    shared: SharedArgs,
}

#[derive(Parser, Debug)]
struct TextArgs {
    /// Plain-text file to translate
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Output path (defaults to <stem>-translated<ext> next to the file)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(flatten)]
    shared: SharedArgs,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate WebVTT captions into an SRT file
    Translate(TranslateArgs),

    /// Translate captions and burn them into a video with ffmpeg
    Burn(BurnArgs),

    /// Translate a plain-text file paragraph by paragraph
    Text(TextArgs),

    /// Generate shell completions for subtrans
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// subtrans - caption translation and subtitle burning
///
/// Translates WebVTT captions cue by cue with an AI provider, writes them as
/// SRT and optionally burns them into a video with ffmpeg.
#[derive(Parser, Debug)]
#[command(name = "subtrans")]
#[command(version)]
#[command(about = "Translate WebVTT captions to SRT and burn them into video")]
#[command(long_about = "subtrans translates WebVTT captions cue by cue and writes them as SRT subtitles.

EXAMPLES:
    subtrans translate talk.vtt                        # Writes talk-translated.srt
    subtrans translate -s es -t en talk.vtt            # Spanish to English
    subtrans translate -p anthropic talk.vtt           # Use the Anthropic API
    subtrans translate talk.vtt --video talk.mp4       # Also writes talk_subtitled.mp4
    subtrans translate /captions/ -f                   # Every .vtt file in a directory
    subtrans burn talk.mp4 talk.vtt -o out.mp4         # Translate and burn in one go
    subtrans text notes.txt                            # Writes notes-translated.txt
    subtrans completions bash > subtrans.bash          # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

EXIT STATUS:
    0  output written
    1  a stage failed (the log names it)
    2  nothing written because the output already exists (use -f)

SUPPORTED PROVIDERS:
    ollama    - Local Ollama server (default: llama3.2:3b)
    anthropic - Anthropic Claude API (requires API key)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

/// Exit status when a run wrote nothing because its output already exists
const EXIT_SKIPPED: i32 = 2;

/// How a command that did not fail ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Written,
    Skipped,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger::new(LevelFilter::Trace)))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI colour code for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let level = record.level();

            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                Self::get_color_for_level(level),
                now,
                Self::get_emoji_for_level(level),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info until the config is loaded
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    let result = match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "subtrans", &mut std::io::stdout());
            return Ok(());
        }
        Commands::Translate(args) => run_translate(args).await,
        Commands::Burn(args) => run_burn(args).await,
        Commands::Text(args) => run_text(args).await,
    };

    match result {
        Ok(Outcome::Written) => Ok(()),
        Ok(Outcome::Skipped) => {
            info!("Skipped: nothing was written");
            std::process::exit(EXIT_SKIPPED);
        }
        Err(e) => {
            error!("{} stage failed: {}", e.stage(), e);
            std::process::exit(1);
        }
    }
}

fn config_error(error: anyhow::Error) -> AppError {
    AppError::Config(format!("{:#}", error))
}

/// Load (or create) the configuration and apply command line overrides
fn load_config(options: &SharedArgs) -> Result<Config, AppError> {
    // A level given on the command line applies before anything is logged
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let config_path = Path::new(&options.config_path);
    let mut config = if config_path.exists() {
        Config::from_file(config_path).map_err(config_error)?
    } else {
        warn!("Config file not found at '{}', creating default config.", options.config_path);
        let config = Config::default();
        config.save(config_path).map_err(config_error)?;
        config
    };

    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }

    if let Some(model) = &options.model {
        config.translation.active_provider_config_mut().model = model.clone();
    }

    if let Some(source_lang) = &options.source_language {
        config.source_language = source_lang.clone();
    }

    if let Some(target_lang) = &options.target_language {
        config.target_language = target_lang.clone();
    }

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }

    if options.abort_on_empty {
        config.pipeline.empty_document = EmptyDocumentPolicy::Abort;
    }

    config.validate().map_err(config_error)?;

    if options.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    if language_utils::language_codes_match(&config.source_language, &config.target_language) {
        warn!(
            "Source and target language are the same ({}), captions will be translated into the same language",
            config.source_language
        );
    }

    Ok(config)
}

/// Build the provider-backed translator and check that it answers
async fn create_translator(config: &Config) -> Result<TranslationService, AppError> {
    let service = TranslationService::new(&config.translation, &config.source_language, &config.target_language)
        .map_err(config_error)?;

    info!(
        "Translating {} -> {} with {} ({})",
        config.source_language,
        config.target_language,
        service.provider_name(),
        service.model()
    );

    if let Err(e) = service.test_connection().await {
        warn!("{} connection test failed: {}", service.provider_name(), e);
    }

    Ok(service)
}

// @returns: true when the path may be written
fn check_overwrite(path: &Path, force_overwrite: bool) -> bool {
    if path.exists() && !force_overwrite {
        warn!("Output file already exists: {:?}. Use -f to force overwrite.", path);
        return false;
    }
    true
}

fn check_captions(path: &Path) -> Result<(), AppError> {
    let file_type = FileManager::detect_file_type(path)
        .map_err(|e| AppError::File(format!("{:#}", e)))?;
    if file_type != FileType::Captions {
        warn!("{:?} does not look like a WebVTT file ({:?}), parsing anyway", path, file_type);
    }
    Ok(())
}

async fn run_translate(args: TranslateArgs) -> Result<Outcome, AppError> {
    let config = load_config(&args.shared)?;

    if args.source.is_dir() {
        if args.output.is_some() || args.video.is_some() {
            warn!("--output and --video are ignored in folder mode");
        }
        let translator = create_translator(&config).await?;
        let controller = Controller::with_config(&config).show_progress(!args.shared.no_progress);

        let summary = controller.run_folder(&args.source, &translator, args.shared.force_overwrite).await?;
        if summary.failed > 0 {
            return Err(AppError::Unknown(format!(
                "{} of {} files failed",
                summary.failed,
                summary.processed + summary.failed
            )));
        }
        if summary.processed == 0 && summary.skipped > 0 {
            return Ok(Outcome::Skipped);
        }
        return Ok(Outcome::Written);
    }

    if !args.source.exists() {
        return Err(AppError::File(format!("Input path does not exist: {:?}", args.source)));
    }
    check_captions(&args.source)?;

    let destination = args.output.clone().unwrap_or_else(|| {
        FileManager::generate_output_path(&args.source, None, &config.pipeline.output_suffix, "srt")
    });

    let media = args.video.as_ref().map(|video| {
        let output = args.video_output.clone().unwrap_or_else(|| {
            FileManager::generate_output_path(video, None, &config.muxing.video_suffix, "mp4")
        });
        (video.clone(), output)
    });

    run_single(&config, &args.shared, &args.source, &destination, media).await
}

async fn run_burn(args: BurnArgs) -> Result<Outcome, AppError> {
    let config = load_config(&args.shared)?;

    for input in [&args.video, &args.captions] {
        if !input.is_file() {
            return Err(AppError::File(format!("Input file does not exist: {:?}", input)));
        }
    }
    check_captions(&args.captions)?;

    let video_type = FileManager::detect_file_type(&args.video)
        .map_err(|e| AppError::File(format!("{:#}", e)))?;
    if video_type != FileType::Video {
        warn!("{:?} does not have a known video extension, handing it to ffmpeg anyway", args.video);
    }

    let destination = args.srt_output.clone().unwrap_or_else(|| {
        FileManager::generate_output_path(&args.captions, None, &config.pipeline.output_suffix, "srt")
    });
    let video_output = args.output.clone().unwrap_or_else(|| {
        FileManager::generate_output_path(&args.video, None, &config.muxing.video_suffix, "mp4")
    });

    run_single(&config, &args.shared, &args.captions, &destination, Some((args.video.clone(), video_output))).await
}

async fn run_single(
    config: &Config,
    shared: &SharedArgs,
    source: &Path,
    destination: &Path,
    media: Option<(PathBuf, PathBuf)>,
) -> Result<Outcome, AppError> {
    if !check_overwrite(destination, shared.force_overwrite) {
        return Ok(Outcome::Skipped);
    }
    if let Some((_, video_output)) = &media {
        if !check_overwrite(video_output, shared.force_overwrite) {
            return Ok(Outcome::Skipped);
        }
    }

    let translator = create_translator(config).await?;

    let mut controller = Controller::with_config(config).show_progress(!shared.no_progress);
    if let Some((video, video_output)) = media {
        debug!("Burning into {:?} -> {:?}", video, video_output);
        controller = controller.with_media(video, video_output);
    }

    let summary = controller.run(source, &translator, destination).await?;

    info!(
        "Success: {:?} ({} cues in {})",
        summary.srt_path,
        summary.cue_count,
        Controller::format_duration(summary.elapsed)
    );
    if let Some(video_path) = &summary.video_path {
        info!("Success: {:?}", video_path);
    }

    Ok(Outcome::Written)
}

async fn run_text(args: TextArgs) -> Result<Outcome, AppError> {
    let config = load_config(&args.shared)?;

    if !args.file.is_file() {
        return Err(AppError::File(format!("Input file does not exist: {:?}", args.file)));
    }

    let destination = args.output.clone().unwrap_or_else(|| {
        let extension = args.file.extension()
            .map(|ext| ext.to_string_lossy().to_string())
            .unwrap_or_default();
        FileManager::generate_output_path(&args.file, None, &config.pipeline.output_suffix, &extension)
    });

    if !check_overwrite(&destination, args.shared.force_overwrite) {
        return Ok(Outcome::Skipped);
    }

    let translator = create_translator(&config).await?;
    let controller = Controller::with_config(&config).show_progress(!args.shared.no_progress);
    let summary = controller.run_text(&args.file, &translator, &destination).await?;

    info!(
        "Success: {:?} ({} paragraphs in {})",
        summary.output_path,
        summary.paragraph_count,
        Controller::format_duration(summary.elapsed)
    );

    Ok(Outcome::Written)
}
