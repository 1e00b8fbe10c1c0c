/*!
 * Translation of caption cues and plain-text documents.
 *
 * - `core`: the `TextTranslator` capability and its implementations
 *   (`FnTranslator` for plain functions, `TranslationService` for LLM providers)
 * - `cues`: applies a capability to every cue of a document, in order
 * - `paragraphs`: the same for the paragraphs of a plain-text document
 */

pub use self::core::{FnTranslator, TextTranslator, TranslationService, normalize_translation};
pub use self::cues::CueTranslator;
pub use self::paragraphs::ParagraphTranslator;

pub mod core;
pub mod cues;
pub mod paragraphs;
