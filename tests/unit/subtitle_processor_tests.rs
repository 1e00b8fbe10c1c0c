/*!
 * Tests for caption parsing and SRT serialization
 */

use subtrans::subtitle_processor::{
    Cue, SrtBlock, format_timestamp, parse_timestamp, parse_webvtt, to_srt_string,
};
use subtrans::errors::SubtitleError;
use crate::common::SAMPLE_VTT;

/// Test timestamp parsing and formatting
#[test]
fn test_timestamp_parsing_withValidTimestamp_shouldParseAndFormat() {
    let ts = "01:23:45,678";
    let ms = parse_timestamp(ts).unwrap();
    assert_eq!(ms, 5025678);

    let formatted = format_timestamp(ms);
    assert_eq!(formatted, ts);
}

#[test]
fn test_format_timestamp_withMoreThan99Hours_shouldKeepAllDigits() {
    let formatted = format_timestamp(100 * 3_600_000 + 1);
    assert_eq!(formatted, "100:00:00,001");
    assert_eq!(parse_timestamp(&formatted).unwrap(), 100 * 3_600_000 + 1);
}

#[test]
fn test_parse_timestamp_withInvalidInput_shouldFail() {
    for ts in ["", "00:00:01.000", "1:2:3,4", "00:60:00,000", "00:00:61,000", "abc"] {
        let result = parse_timestamp(ts);
        assert!(
            matches!(result, Err(SubtitleError::InvalidTimestamp(_))),
            "expected {:?} to be rejected",
            ts
        );
    }
}

#[test]
fn test_parse_webvtt_withSampleDocument_shouldExtractCuesInOrder() {
    let cues = parse_webvtt(SAMPLE_VTT);

    assert_eq!(cues.len(), 2);
    assert_eq!(cues[0], Cue::new("00:00:01,000", "00:00:02,500", "Hola mundo"));
    assert_eq!(cues[1], Cue::new("00:00:03,000", "00:00:04,000", "Adiós\namigos"));
}

#[test]
fn test_parse_webvtt_withEmptyOrHeaderOnlyInput_shouldReturnNoCues() {
    assert!(parse_webvtt("").is_empty());
    assert!(parse_webvtt("\n\n   \n").is_empty());
    assert!(parse_webvtt("WEBVTT\n\nNOTE nothing here\n").is_empty());
}

#[test]
fn test_parse_webvtt_withCueSettings_shouldDropThem() {
    let doc = "WEBVTT\n\n00:00:01.000 --> 00:00:02.000 align:start position:10%\nHello\n";
    let cues = parse_webvtt(doc);

    assert_eq!(cues.len(), 1);
    assert_eq!(cues[0].start(), "00:00:01,000");
    assert_eq!(cues[0].end(), "00:00:02,000");
}

#[test]
fn test_parse_webvtt_withShortTimestamps_shouldAddHours() {
    let doc = "WEBVTT\n\n01:02.500 --> 01:03.000\nShort\n";
    let cues = parse_webvtt(doc);

    assert_eq!(cues.len(), 1);
    assert_eq!(cues[0].start(), "00:01:02,500");
    assert_eq!(cues[0].end(), "00:01:03,000");
    assert_eq!(cues[0].start_ms().unwrap(), 62_500);
}

#[test]
fn test_parse_webvtt_withMalformedTimingLines_shouldSkipThem() {
    let doc = "WEBVTT

00:00:01.000 --> 00:00:02.000 --> 00:00:03.000
Two arrows

-->
No times

00:00:05.000 -->
Missing end

00:00:06.000 --> 00:00:07.000
Kept
";
    let cues = parse_webvtt(doc);

    assert_eq!(cues.len(), 1);
    assert_eq!(cues[0], Cue::new("00:00:06,000", "00:00:07,000", "Kept"));
}

#[test]
fn test_parse_webvtt_withBareArrowLine_shouldProduceNoCue() {
    let cues = parse_webvtt("WEBVTT\n\n-->\nOnly an arrow\n");
    assert!(cues.is_empty());
}

#[test]
fn test_parse_webvtt_withEmptyStartField_shouldProduceNoCue() {
    let cues = parse_webvtt("WEBVTT\n\n--> 00:00:02.000\nNo start\n\n00:00:03.000 --> 00:00:04.000\nKept\n");

    assert_eq!(cues, vec![Cue::new("00:00:03,000", "00:00:04,000", "Kept")]);
}

#[test]
fn test_parse_webvtt_withTimingLineWithoutText_shouldExcludeCue() {
    let doc = "WEBVTT\n\n00:00:01.000 --> 00:00:02.000\n\n00:00:03.000 --> 00:00:04.000\nSecond\n";
    let cues = parse_webvtt(doc);

    assert_eq!(cues.len(), 1);
    assert_eq!(cues[0].text(), "Second");
}

#[test]
fn test_parse_webvtt_withBomAndCrlf_shouldParseNormally() {
    let doc = "\u{feff}WEBVTT\r\n\r\n00:00:01.000 --> 00:00:02.000\r\n  Indented line  \r\nSecond line\r\n";
    let cues = parse_webvtt(doc);

    assert_eq!(cues.len(), 1);
    assert_eq!(cues[0].text(), "Indented line\nSecond line");
}

#[test]
fn test_parse_webvtt_withEndBeforeStart_shouldKeepCue() {
    let doc = "00:00:05.000 --> 00:00:01.000\nBackwards\n";
    let cues = parse_webvtt(doc);

    assert_eq!(cues.len(), 1);
    assert!(cues[0].end_ms().unwrap() < cues[0].start_ms().unwrap());
}

#[test]
fn test_cue_with_text_shouldKeepTimings() {
    let cue = Cue::new("00:00:01,000", "00:00:02,000", "Hola");
    let translated = cue.clone().with_text("Hello");

    assert_eq!(translated.start(), cue.start());
    assert_eq!(translated.end(), cue.end());
    assert_eq!(translated.text(), "Hello");
}

#[test]
fn test_srt_block_display_withValidCue_shouldFormatCorrectly() {
    let cue = Cue::new("00:00:05,000", "00:00:10,000", "Line one\nLine two");
    let block = SrtBlock { index: 7, cue: &cue };

    assert_eq!(block.to_string(), "7\n00:00:05,000 --> 00:00:10,000\nLine one\nLine two\n\n");
}

#[test]
fn test_to_srt_string_withNoCues_shouldBeEmpty() {
    assert_eq!(to_srt_string(&[]), "");
}

#[test]
fn test_to_srt_string_withCues_shouldNumberFromOne() {
    let cues = vec![
        Cue::new("00:00:01,000", "00:00:04,000", "Hello world"),
        Cue::new("00:00:05,000", "00:00:06,000", "Goodbye"),
    ];

    assert_eq!(
        to_srt_string(&cues),
        "1\n00:00:01,000 --> 00:00:04,000\nHello world\n\n2\n00:00:05,000 --> 00:00:06,000\nGoodbye\n\n"
    );
}

#[test]
fn test_to_srt_string_calledTwice_shouldBeIdentical() {
    let cues = parse_webvtt(SAMPLE_VTT);
    assert_eq!(to_srt_string(&cues), to_srt_string(&cues));
}

#[test]
fn test_parse_webvtt_onSerializedSrt_shouldReturnSameCues() {
    let cues = parse_webvtt(SAMPLE_VTT);
    let reparsed = parse_webvtt(&to_srt_string(&cues));

    assert_eq!(reparsed, cues);
}
