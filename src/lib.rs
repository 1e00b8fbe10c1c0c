/*!
 * # subtrans - caption translation and subtitle burning
 *
 * A Rust library that turns WebVTT captions into translated SRT subtitles,
 * and optionally burns them into a video.
 *
 * ## Features
 *
 * - Tolerant WebVTT parsing (headers, notes, identifiers, cue settings)
 * - Cue-by-cue translation through any `TextTranslator`:
 *   - plain functions via `FnTranslator`
 *   - Ollama (local LLM)
 *   - Anthropic API
 * - Byte-exact SRT serialization with timings preserved
 * - Paragraph-by-paragraph translation of plain-text files
 * - Atomic output writes
 * - Subtitle burning with ffmpeg
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `subtitle_processor`: Cue model, WebVTT parsing, SRT serialization
 * - `translation`: Translation capability and cue-by-cue translation:
 *   - `translation::core`: `TextTranslator`, `FnTranslator`, `TranslationService`
 *   - `translation::cues`: `CueTranslator`
 *   - `translation::paragraphs`: `ParagraphTranslator`
 * - `app_controller`: Pipeline orchestration (single file and folder)
 * - `muxing`: `MediaMuxer` and the ffmpeg implementation
 * - `app_config`: Configuration management
 * - `file_utils`: File system operations
 * - `language_utils`: ISO language code utilities
 * - `providers`: Client implementations for LLM providers:
 *   - `providers::ollama`: Ollama API client
 *   - `providers::anthropic`: Anthropic API client
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod file_utils;
pub mod subtitle_processor;
pub mod translation;
pub mod app_controller;
pub mod language_utils;
pub mod providers;
pub mod errors;
pub mod muxing;

// Re-export main types for easier usage
pub use app_config::{Config, EmptyDocumentPolicy};
pub use app_controller::{Controller, FolderSummary, RunSummary, TextSummary};
pub use subtitle_processor::{Cue, SrtBlock, parse_webvtt, to_srt_string};
pub use translation::{CueTranslator, FnTranslator, ParagraphTranslator, TextTranslator, TranslationService};
pub use muxing::{FfmpegMuxer, MediaMuxer};
pub use language_utils::{language_codes_match, normalize_to_part2t, get_language_name};
pub use errors::{AppError, MuxingError, ProviderError, SubtitleError, TranslationError};
