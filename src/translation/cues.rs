use indicatif::ProgressBar;
use log::{debug, error};

use crate::errors::TranslationError;
use crate::subtitle_processor::Cue;
use super::core::{TextTranslator, normalize_translation};

// @module: Cue-by-cue translation

/// Applies a `TextTranslator` to each cue of a document.
///
/// Cues are translated one at a time, in order, each without context from its
/// neighbours. Timings are carried over unchanged. The first failure aborts
/// the whole run; a partially translated document is never returned.
pub struct CueTranslator;

impl CueTranslator {
    pub async fn translate_cues<T: TextTranslator + ?Sized>(
        cues: Vec<Cue>,
        translator: &T,
        progress: Option<&ProgressBar>,
    ) -> Result<Vec<Cue>, TranslationError> {
        let total = cues.len();
        let mut translated = Vec::with_capacity(total);

        for (i, cue) in cues.into_iter().enumerate() {
            let index = i + 1;

            // An empty cue text would break the SRT block structure
            let reply = translator.translate_text(cue.text()).await;
            let text = match reply.and_then(|text| normalize_translation(&text)) {
                Ok(text) => text,
                Err(source) => {
                    error!("Translation failed at cue {}/{}: {}", index, total, source);
                    return Err(TranslationError::CueFailed { index, source });
                }
            };

            debug!("Cue {}/{}: {:?} -> {:?}", index, total, cue.text(), text);
            translated.push(cue.with_text(text));

            if let Some(pb) = progress {
                pb.inc(1);
            }
        }

        Ok(translated)
    }
}
