use indicatif::ProgressBar;
use log::{debug, error};

use crate::errors::TranslationError;
use super::core::{TextTranslator, normalize_translation};

/// Translates a plain-text document paragraph by paragraph.
///
/// A paragraph is a run of non-blank lines. Each one is sent to the
/// translator on its own, in order; the first failure aborts the document.
/// The result has one blank line between paragraphs and ends with a newline.
pub struct ParagraphTranslator;

impl ParagraphTranslator {
    /// Split `text` into paragraphs of trimmed lines
    pub fn split_paragraphs(text: &str) -> Vec<String> {
        let mut paragraphs = Vec::new();
        let mut current: Vec<&str> = Vec::new();

        for line in text.trim_start_matches('\u{feff}').lines() {
            let line = line.trim();
            if line.is_empty() {
                if !current.is_empty() {
                    paragraphs.push(current.join("\n"));
                    current.clear();
                }
            } else {
                current.push(line);
            }
        }
        if !current.is_empty() {
            paragraphs.push(current.join("\n"));
        }

        paragraphs
    }

    pub async fn translate_paragraphs<T: TextTranslator + ?Sized>(
        paragraphs: &[String],
        translator: &T,
        progress: Option<&ProgressBar>,
    ) -> Result<String, TranslationError> {
        let total = paragraphs.len();
        let mut translated = Vec::with_capacity(total);

        for (i, paragraph) in paragraphs.iter().enumerate() {
            let index = i + 1;

            let reply = translator.translate_text(paragraph).await;
            let text = match reply.and_then(|text| normalize_translation(&text)) {
                Ok(text) => text,
                Err(source) => {
                    error!("Translation failed at paragraph {}/{}: {}", index, total, source);
                    return Err(TranslationError::ParagraphFailed { index, source });
                }
            };

            debug!("Paragraph {}/{}: {} -> {} chars", index, total, paragraph.len(), text.len());
            translated.push(text);

            if let Some(pb) = progress {
                pb.inc(1);
            }
        }

        if translated.is_empty() {
            return Ok(String::new());
        }
        let mut document = translated.join("\n\n");
        document.push('\n');
        Ok(document)
    }
}
