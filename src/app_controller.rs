use log::{error, warn, info, debug};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use indicatif::{ProgressBar, ProgressStyle};

use crate::app_config::{Config, EmptyDocumentPolicy, PipelineConfig};
use crate::errors::{AppError, SubtitleError};
use crate::file_utils::FileManager;
use crate::muxing::{FfmpegMuxer, MediaMuxer};
use crate::subtitle_processor::{parse_webvtt, to_srt_string};
use crate::translation::{CueTranslator, ParagraphTranslator, TextTranslator};

// @module: Pipeline orchestration: read, parse, translate, serialize, write, burn

/// Video to burn the translated subtitles into
#[derive(Debug, Clone, PartialEq)]
pub struct MediaTarget {
    /// Source video
    pub video: PathBuf,
    /// Where the subtitled video is written
    pub output: PathBuf,
}

/// Outcome of one successful run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub cue_count: usize,
    pub srt_path: PathBuf,
    pub video_path: Option<PathBuf>,
    pub elapsed: Duration,
}

/// Outcome of one plain-text translation
#[derive(Debug, Clone)]
pub struct TextSummary {
    pub paragraph_count: usize,
    pub output_path: PathBuf,
    pub elapsed: Duration,
}

/// Outcome of a folder run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FolderSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Main application controller for caption translation
pub struct Controller {
    // @field: Pipeline options
    options: PipelineConfig,
    // @field: External muxer used when a media target is set
    muxer: Box<dyn MediaMuxer>,
    // @field: Optional burn step
    media: Option<MediaTarget>,
    // @field: Draw a progress bar while translating
    show_progress: bool,
}

fn file_error(error: anyhow::Error) -> AppError {
    AppError::File(format!("{:#}", error))
}

impl Controller {
    /// Controller with the given pipeline options and the default ffmpeg muxer
    pub fn new(options: PipelineConfig) -> Self {
        Self {
            options,
            muxer: Box::new(FfmpegMuxer::default()),
            media: None,
            show_progress: true,
        }
    }

    // @method: Create a new controller from the application configuration
    pub fn with_config(config: &Config) -> Self {
        Self::new(config.pipeline.clone())
            .with_muxer(FfmpegMuxer::from_config(&config.muxing))
    }

    /// Replace the muxer
    pub fn with_muxer(mut self, muxer: impl MediaMuxer + 'static) -> Self {
        self.muxer = Box::new(muxer);
        self
    }

    /// Burn the SRT into `video`, writing `output_video`, after each run
    pub fn with_media(mut self, video: impl Into<PathBuf>, output_video: impl Into<PathBuf>) -> Self {
        self.media = Some(MediaTarget {
            video: video.into(),
            output: output_video.into(),
        });
        self
    }

    pub fn show_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn options(&self) -> &PipelineConfig {
        &self.options
    }

    pub fn media(&self) -> Option<&MediaTarget> {
        self.media.as_ref()
    }

    /// Translate `source` into the SRT file `destination`, then burn it if a media target is set.
    ///
    /// Nothing is written to `destination` unless every cue was translated.
    /// A failed burn keeps the SRT.
    pub async fn run<T: TextTranslator + ?Sized>(
        &self,
        source: &Path,
        translator: &T,
        destination: &Path,
    ) -> Result<RunSummary, AppError> {
        self.run_pipeline(source, translator, destination, self.media.as_ref()).await
    }

    async fn run_pipeline<T: TextTranslator + ?Sized>(
        &self,
        source: &Path,
        translator: &T,
        destination: &Path,
        media: Option<&MediaTarget>,
    ) -> Result<RunSummary, AppError> {
        let start_time = Instant::now();

        debug!("Reading captions from {:?}", source);
        let document = FileManager::read_to_string(source).map_err(file_error)?;

        let cues = parse_webvtt(&document);
        if cues.is_empty() {
            match self.options.empty_document {
                EmptyDocumentPolicy::Abort => {
                    return Err(SubtitleError::NoCues(source.to_path_buf()).into());
                },
                EmptyDocumentPolicy::Proceed => {
                    warn!("No caption cues found in {:?}, writing an empty SRT", source);
                },
            }
        } else {
            info!("Parsed {} cues from {:?}", cues.len(), source);
        }

        let cue_count = cues.len();
        let progress = self.create_progress_bar(cue_count as u64, "cues");
        let translated = CueTranslator::translate_cues(cues, translator, Some(&progress)).await;
        progress.finish_and_clear();
        let translated = translated?;

        let srt = to_srt_string(&translated);
        FileManager::write_atomically(destination, &srt).map_err(file_error)?;
        info!("Wrote {} cues to {:?}", cue_count, destination);

        let video_path = match media {
            Some(media) => Some(self.burn(media, destination).await?),
            None => None,
        };

        Ok(RunSummary {
            cue_count,
            srt_path: destination.to_path_buf(),
            video_path,
            elapsed: start_time.elapsed(),
        })
    }

    /// Translate the plain-text file `source` into `destination`, paragraph by paragraph.
    ///
    /// Same guarantees as `run`: nothing is written unless every paragraph was
    /// translated. A file without text follows the empty-document policy.
    pub async fn run_text<T: TextTranslator + ?Sized>(
        &self,
        source: &Path,
        translator: &T,
        destination: &Path,
    ) -> Result<TextSummary, AppError> {
        let start_time = Instant::now();

        debug!("Reading text from {:?}", source);
        let document = FileManager::read_to_string(source).map_err(file_error)?;

        let paragraphs = ParagraphTranslator::split_paragraphs(&document);
        if paragraphs.is_empty() {
            match self.options.empty_document {
                EmptyDocumentPolicy::Abort => {
                    return Err(SubtitleError::NoText(source.to_path_buf()).into());
                },
                EmptyDocumentPolicy::Proceed => {
                    warn!("No text found in {:?}, writing an empty file", source);
                },
            }
        } else {
            info!("Read {} paragraphs from {:?}", paragraphs.len(), source);
        }

        let progress = self.create_progress_bar(paragraphs.len() as u64, "paragraphs");
        let translated = ParagraphTranslator::translate_paragraphs(&paragraphs, translator, Some(&progress)).await;
        progress.finish_and_clear();
        let translated = translated?;

        FileManager::write_atomically(destination, &translated).map_err(file_error)?;
        info!("Wrote {} paragraphs to {:?}", paragraphs.len(), destination);

        Ok(TextSummary {
            paragraph_count: paragraphs.len(),
            output_path: destination.to_path_buf(),
            elapsed: start_time.elapsed(),
        })
    }

    // @returns: Path of the subtitled video
    async fn burn(&self, media: &MediaTarget, srt: &Path) -> Result<PathBuf, AppError> {
        // The muxer writes to a placeholder that is only renamed on success
        let temp_path = FileManager::sibling_temp_file(&media.output)
            .map_err(file_error)?
            .into_temp_path();

        self.muxer.burn_subtitles(&media.video, srt, &temp_path).await?;

        temp_path.persist(&media.output)
            .map_err(|e| AppError::File(format!("Failed to move video into place {:?}: {}", media.output, e.error)))?;
        info!("Subtitled video saved as {:?}", media.output);
        Ok(media.output.clone())
    }

    /// Translate every `.vtt` file under `input_dir`.
    ///
    /// Each output goes next to its source. Existing outputs are skipped unless
    /// `force_overwrite`. A failing file is logged and counted, the rest continue.
    pub async fn run_folder<T: TextTranslator + ?Sized>(
        &self,
        input_dir: &Path,
        translator: &T,
        force_overwrite: bool,
    ) -> Result<FolderSummary, AppError> {
        let start_time = Instant::now();

        if self.media.is_some() {
            warn!("Burning into video is not supported in folder mode, only SRT files will be written");
        }

        let sources = FileManager::find_files(input_dir, "vtt").map_err(file_error)?;
        if sources.is_empty() {
            warn!("No .vtt files found in {:?}", input_dir);
        }

        let mut summary = FolderSummary::default();
        for source in &sources {
            let destination = FileManager::generate_output_path(source, None, &self.options.output_suffix, "srt");
            if destination.exists() && !force_overwrite {
                warn!("Skipping {:?}, output already exists (use -f to force overwrite)", source);
                summary.skipped += 1;
                continue;
            }

            match self.run_pipeline(source, translator, &destination, None).await {
                Ok(_) => summary.processed += 1,
                Err(e) => {
                    error!("{:?}: {} stage failed: {}", source, e.stage(), e);
                    summary.failed += 1;
                }
            }
        }

        info!(
            "Folder done in {}: {} translated, {} skipped, {} failed",
            Self::format_duration(start_time.elapsed()),
            summary.processed,
            summary.skipped,
            summary.failed
        );
        Ok(summary)
    }

    fn create_progress_bar(&self, total: u64, unit: &str) -> ProgressBar {
        if !self.show_progress || total == 0 {
            return ProgressBar::hidden();
        }

        let progress_bar = ProgressBar::new(total);
        let template = format!(
            "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} ({{percent}}%) {{eta}}",
            unit
        );
        let style = ProgressStyle::default_bar()
            .template(&template)
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar
    }

    /// Human-readable duration
    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
