/*!
 * End-to-end tests for the caption translation pipeline
 */

use std::fs;
use anyhow::Result;
use subtrans::app_config::{EmptyDocumentPolicy, PipelineConfig};
use subtrans::app_controller::{Controller, FolderSummary};
use subtrans::errors::{AppError, MuxingError, ProviderError, SubtitleError, TranslationError};
use subtrans::translation::FnTranslator;
use crate::common::{self, CopyingMuxer, DictionaryTranslator, FailingAtTranslator, FailingMuxer, SAMPLE_VTT};

fn quiet_controller(policy: EmptyDocumentPolicy) -> Controller {
    common::init_test_logging();
    let options = PipelineConfig {
        empty_document: policy,
        ..PipelineConfig::default()
    };
    Controller::new(options).show_progress(false)
}

#[tokio::test]
async fn test_run_withSpanishCaptions_shouldWriteExactSrt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(
        temp_dir.path(),
        "talk.vtt",
        "WEBVTT\n\n00:00:01.000 --> 00:00:04.000\nHola mundo\n\n00:00:05.000 --> 00:00:06.000\nAdiós\n",
    )?;
    let destination = temp_dir.path().join("talk-translated.srt");
    let translator = DictionaryTranslator::new(&[("Hola mundo", "Hello world"), ("Adiós", "Goodbye")]);

    let summary = quiet_controller(EmptyDocumentPolicy::Proceed)
        .run(&source, &translator, &destination)
        .await?;

    assert_eq!(
        fs::read_to_string(&destination)?,
        "1\n00:00:01,000 --> 00:00:04,000\nHello world\n\n2\n00:00:05,000 --> 00:00:06,000\nGoodbye\n\n"
    );
    assert_eq!(summary.cue_count, 2);
    assert_eq!(summary.srt_path, destination);
    assert!(summary.video_path.is_none());
    Ok(())
}

#[tokio::test]
async fn test_run_withFailureAtThirdOfFiveCues_shouldWriteNothing() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_numbered_vtt(temp_dir.path(), "five.vtt", 5)?;
    let destination = temp_dir.path().join("five-translated.srt");
    let translator = FailingAtTranslator::new(3);

    let err = quiet_controller(EmptyDocumentPolicy::Proceed)
        .run(&source, &translator, &destination)
        .await
        .unwrap_err();

    match &err {
        AppError::Translation(TranslationError::CueFailed { index, source }) => {
            assert_eq!(*index, 3);
            assert!(matches!(source, ProviderError::ConnectionError(_)));
        },
        other => panic!("expected CueFailed, got {}", other),
    }
    assert_eq!(err.stage(), "translate");
    assert!(!destination.exists());
    assert_eq!(common::list_file_names(temp_dir.path()), vec!["five.vtt"]);
    Ok(())
}

#[tokio::test]
async fn test_run_withFailure_shouldKeepPreviousDestination() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_numbered_vtt(temp_dir.path(), "five.vtt", 5)?;
    let destination = common::create_test_file(temp_dir.path(), "five-translated.srt", "previous run")?;

    let result = quiet_controller(EmptyDocumentPolicy::Proceed)
        .run(&source, &FailingAtTranslator::new(1), &destination)
        .await;

    assert!(result.is_err());
    assert_eq!(fs::read_to_string(&destination)?, "previous run");
    Ok(())
}

#[tokio::test]
async fn test_run_withEmptyDocumentAndProceed_shouldWriteEmptySrt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "empty.vtt", "WEBVTT\n\nNOTE nothing to see\n")?;
    let destination = temp_dir.path().join("empty.srt");
    let translator = FailingAtTranslator::new(1);

    let summary = quiet_controller(EmptyDocumentPolicy::Proceed)
        .run(&source, &translator, &destination)
        .await?;

    assert_eq!(summary.cue_count, 0);
    assert_eq!(fs::read_to_string(&destination)?, "");
    assert_eq!(translator.calls(), 0);
    Ok(())
}

#[tokio::test]
async fn test_run_withEmptyDocumentAndAbort_shouldFailWithoutWriting() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "empty.vtt", "WEBVTT\n")?;
    let destination = temp_dir.path().join("empty.srt");

    let err = quiet_controller(EmptyDocumentPolicy::Abort)
        .run(&source, &FailingAtTranslator::new(1), &destination)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Subtitle(SubtitleError::NoCues(ref path)) if *path == source));
    assert_eq!(err.stage(), "parse");
    assert!(!destination.exists());
    Ok(())
}

#[tokio::test]
async fn test_run_withMissingSource_shouldBeIoError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let translator = FnTranslator::new(|text: &str| Ok(text.to_string()));

    let err = quiet_controller(EmptyDocumentPolicy::Proceed)
        .run(&temp_dir.path().join("nope.vtt"), &translator, &temp_dir.path().join("nope.srt"))
        .await
        .unwrap_err();

    assert_eq!(err.stage(), "io");
    Ok(())
}

#[tokio::test]
async fn test_run_withMedia_shouldBurnTranslatedSrt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "talk.vtt", SAMPLE_VTT)?;
    let video = common::create_test_file(temp_dir.path(), "talk.mp4", "frames")?;
    let destination = temp_dir.path().join("talk-translated.srt");
    let video_output = temp_dir.path().join("talk_subtitled.mp4");
    let translator = FnTranslator::new(|text: &str| Ok(text.to_uppercase()));

    let summary = quiet_controller(EmptyDocumentPolicy::Proceed)
        .with_muxer(CopyingMuxer)
        .with_media(&video, &video_output)
        .run(&source, &translator, &destination)
        .await?;

    let srt = fs::read_to_string(&destination)?;
    assert!(srt.contains("HOLA MUNDO"));
    assert!(srt.contains("ADIÓS\nAMIGOS"));
    assert_eq!(fs::read_to_string(&video_output)?, format!("VIDEO+{}", srt));
    assert_eq!(summary.video_path.as_deref(), Some(video_output.as_path()));
    assert_eq!(
        common::list_file_names(temp_dir.path()),
        vec!["talk-translated.srt", "talk.mp4", "talk.vtt", "talk_subtitled.mp4"]
    );
    Ok(())
}

#[tokio::test]
async fn test_run_withFailingMuxer_shouldKeepSrtAndRemovePartialVideo() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let source = common::create_test_file(temp_dir.path(), "talk.vtt", SAMPLE_VTT)?;
    let video = common::create_test_file(temp_dir.path(), "talk.mp4", "frames")?;
    let destination = temp_dir.path().join("talk-translated.srt");
    let video_output = temp_dir.path().join("talk_subtitled.mp4");
    let translator = FnTranslator::new(|text: &str| Ok(text.to_string()));

    let err = quiet_controller(EmptyDocumentPolicy::Proceed)
        .with_muxer(FailingMuxer)
        .with_media(&video, &video_output)
        .run(&source, &translator, &destination)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Muxing(MuxingError::Failed { .. })));
    assert_eq!(err.stage(), "mux");
    assert!(destination.exists());
    assert!(!video_output.exists());
    assert_eq!(
        common::list_file_names(temp_dir.path()),
        vec!["talk-translated.srt", "talk.mp4", "talk.vtt"]
    );
    Ok(())
}

#[tokio::test]
async fn test_run_folder_shouldTranslateSkipAndCountFailures() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path();
    common::create_test_file(dir, "a.vtt", "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nHola\n")?;
    common::create_test_file(dir, "b.vtt", "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nDesconocido\n")?;
    common::create_test_file(dir, "c.vtt", "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\nHola\n")?;
    common::create_test_file(dir, "c-translated.srt", "already done")?;
    common::create_test_file(dir, "notes.txt", "ignored")?;
    let translator = DictionaryTranslator::new(&[("Hola", "Hello")]);
    let controller = quiet_controller(EmptyDocumentPolicy::Proceed);

    let summary = controller.run_folder(dir, &translator, false).await?;

    assert_eq!(summary, FolderSummary { processed: 1, skipped: 1, failed: 1 });
    assert_eq!(
        fs::read_to_string(dir.join("a-translated.srt"))?,
        "1\n00:00:01,000 --> 00:00:02,000\nHello\n\n"
    );
    assert!(!dir.join("b-translated.srt").exists());
    assert_eq!(fs::read_to_string(dir.join("c-translated.srt"))?, "already done");

    let forced = controller.run_folder(dir, &translator, true).await?;
    assert_eq!(forced, FolderSummary { processed: 2, skipped: 0, failed: 1 });
    assert_eq!(
        fs::read_to_string(dir.join("c-translated.srt"))?,
        "1\n00:00:01,000 --> 00:00:02,000\nHello\n\n"
    );
    Ok(())
}

#[test]
fn test_format_duration_shouldPickUnits() {
    use std::time::Duration;

    assert_eq!(Controller::format_duration(Duration::from_millis(1_250)), "1.250s");
    assert_eq!(Controller::format_duration(Duration::from_secs(125)), "2m 5s");
    assert_eq!(Controller::format_duration(Duration::from_secs(3_725)), "1h 2m 5s");
}
