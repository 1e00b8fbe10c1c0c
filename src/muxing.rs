/*!
 * Burning subtitles into video through an external muxer.
 *
 * The pipeline talks to the `MediaMuxer` trait; `FfmpegMuxer` is the
 * implementation used by the CLI. Video is re-encoded with the subtitle
 * track rendered into the picture, audio is copied as-is.
 */

use async_trait::async_trait;
use log::{debug, error, info};
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;

use crate::app_config::MuxingConfig;
use crate::errors::MuxingError;

/// External tool that renders a subtitle file onto a video
#[async_trait]
pub trait MediaMuxer: Send + Sync {
    /// Write `output` as `video` with `subtitles` burned in.
    ///
    /// `output` may already exist (as an empty placeholder) and must be overwritten.
    async fn burn_subtitles(&self, video: &Path, subtitles: &Path, output: &Path) -> Result<(), MuxingError>;
}

/// ffmpeg-backed muxer
#[derive(Debug, Clone)]
pub struct FfmpegMuxer {
    program: String,
    timeout: Option<Duration>,
}

impl FfmpegMuxer {
    pub fn new(program: impl Into<String>, timeout: Option<Duration>) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    pub fn from_config(config: &MuxingConfig) -> Self {
        Self::new(config.ffmpeg_path.clone(), config.timeout_secs.map(Duration::from_secs))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Command-line arguments for one burn
    pub fn build_args(video: &Path, subtitles: &Path, output: &Path) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-nostdin".to_string(),
            "-i".to_string(),
            video.to_string_lossy().to_string(),
            "-vf".to_string(),
            format!("subtitles={}", Self::escape_filter_path(subtitles)),
            "-c:a".to_string(),
            "copy".to_string(),
            output.to_string_lossy().to_string(),
        ]
    }

    /// Escape a path for use as a filtergraph option value.
    ///
    /// Two parsers read the value: the filter's option parser (where `\`, `:`
    /// and `'` are special) and, before it, the filtergraph parser, which gets
    /// the whole value single-quoted.
    pub fn escape_filter_path(path: &Path) -> String {
        let raw = path.to_string_lossy();
        let mut option_value = String::with_capacity(raw.len() + 8);
        for c in raw.chars() {
            if matches!(c, '\\' | ':' | '\'') {
                option_value.push('\\');
            }
            option_value.push(c);
        }
        format!("'{}'", option_value.replace('\'', "'\\''"))
    }

    /// Filter ffmpeg stderr down to meaningful error lines, stripping the
    /// version banner, build configuration and stream metadata noise.
    pub fn filter_stderr(stderr: &str) -> String {
        let noise_prefixes = [
            "ffmpeg version",
            "built with",
            "configuration:",
            "lib",
            "Input #",
            "Metadata:",
            "Duration:",
            "Chapter",
            "Stream #",
            "Output #",
            "Stream mapping:",
            "Press [q]",
            "frame=",
            "size=",
        ];

        let meaningful: Vec<&str> = stderr
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter(|line| !noise_prefixes.iter().any(|p| line.starts_with(p)))
            .collect();

        if meaningful.is_empty() {
            "unknown ffmpeg error (stderr was empty after filtering)".to_string()
        } else {
            // The tail holds the actual failure
            let start = meaningful.len().saturating_sub(10);
            meaningful[start..].join("\n")
        }
    }
}

impl Default for FfmpegMuxer {
    fn default() -> Self {
        Self::from_config(&MuxingConfig::default())
    }
}

#[async_trait]
impl MediaMuxer for FfmpegMuxer {
    async fn burn_subtitles(&self, video: &Path, subtitles: &Path, output: &Path) -> Result<(), MuxingError> {
        for input in [video, subtitles] {
            if !input.is_file() {
                return Err(MuxingError::MissingInput(input.to_path_buf()));
            }
        }

        let args = Self::build_args(video, subtitles, output);
        info!("Burning subtitles into {:?}", output);
        debug!("Running: {} {}", self.program, args.join(" "));

        let mut command = Command::new(&self.program);
        command.args(&args).kill_on_drop(true);
        let ffmpeg_future = command.output();

        let result = match self.timeout {
            Some(timeout) => tokio::select! {
                result = ffmpeg_future => result,
                _ = tokio::time::sleep(timeout) => {
                    error!("{} timed out after {}s", self.program, timeout.as_secs());
                    return Err(MuxingError::TimedOut {
                        program: self.program.clone(),
                        secs: timeout.as_secs(),
                    });
                }
            },
            None => ffmpeg_future.await,
        };

        let output_status = result.map_err(|e| MuxingError::Launch {
            program: self.program.clone(),
            message: e.to_string(),
        })?;

        if !output_status.status.success() {
            let stderr = String::from_utf8_lossy(&output_status.stderr);
            let filtered = Self::filter_stderr(&stderr);
            error!("{} failed: {}", self.program, filtered);
            return Err(MuxingError::Failed {
                program: self.program.clone(),
                status: output_status.status.to_string(),
                message: filtered,
            });
        }

        Ok(())
    }
}
