//! Tests for the synchronous import pipeline

use std::io::{self, Read};
use std::thread;
use std::time::{Duration, Instant};

use super::*;
use crate::app::models::IssueKind;
use crate::app::services::importer::Importer;
use crate::app::services::line_reader::tests::FailingSource;
use crate::app::services::record_assembler::RecordMode;
use crate::config::{DecodePolicy, ImportConfig, QuotePolicy, SchemaPolicy};
use crate::Error;

fn importer(config: ImportConfig) -> Importer {
    Importer::new(config).unwrap()
}

#[test]
fn test_header_mode_builds_keyed_records() {
    let outcome = importer(ImportConfig::default())
        .import(
            b"a,b,c\n1,2,3\n4,5,6",
            RecordMode::keyed(),
            &mut (),
            &CancellationToken::new(),
        )
        .unwrap();

    assert_eq!(
        outcome.header,
        Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
    );
    assert_eq!(outcome.records.len(), 2);
    assert_eq!(outcome.records[0]["a"], "1");
    assert_eq!(outcome.records[0]["b"], "2");
    assert_eq!(outcome.records[0]["c"], "3");
    assert_eq!(outcome.records[1]["a"], "4");
    assert_eq!(outcome.records[1]["b"], "5");
    assert_eq!(outcome.records[1]["c"], "6");
    assert_eq!(outcome.stats.lines_read, 3);
    assert_eq!(outcome.stats.records_produced, 2);
}

#[test]
fn test_plain_mode_maps_into_caller_type() {
    #[derive(Debug, PartialEq)]
    struct Point {
        x: i64,
        y: i64,
    }

    let outcome = importer(ImportConfig::default().with_field_delimiter(";"))
        .import(
            b"1;2\n-3;4\n",
            RecordMode::plain(|fields| Point {
                x: fields[0].parse().unwrap_or_default(),
                y: fields[1].parse().unwrap_or_default(),
            }),
            &mut (),
            &CancellationToken::new(),
        )
        .unwrap();

    assert_eq!(outcome.records, vec![Point { x: 1, y: 2 }, Point { x: -3, y: 4 }]);
    assert!(outcome.header.is_none());
}

/// Test the per-line callback sees every line, header included, in order
#[test]
fn test_observer_sees_every_line() {
    let mut observer = RecordingObserver::default();
    importer(ImportConfig::default())
        .import(
            b"h1,h2\n\"x,y\",z\n",
            RecordMode::keyed(),
            &mut observer,
            &CancellationToken::new(),
        )
        .unwrap();

    assert_eq!(
        observer.lines,
        vec![
            (1, vec!["h1".to_string(), "h2".to_string()]),
            (2, vec!["x,y".to_string(), "z".to_string()]),
        ]
    );
}

#[test]
fn test_decode_failure_is_reported_by_default() {
    let mut observer = RecordingObserver::default();
    let outcome = importer(ImportConfig::default())
        .import(
            b"ok,1\nbad\xff,2\nok,3",
            RecordMode::fields(),
            &mut observer,
            &CancellationToken::new(),
        )
        .unwrap();

    assert_eq!(outcome.records.len(), 2);
    assert_eq!(outcome.stats.lines_read, 3);
    assert_eq!(outcome.stats.lines_skipped, 1);
    assert_eq!(outcome.stats.count(IssueKind::Decode), 1);
    assert_eq!(observer.issues[0].line, 2);
}

#[test]
fn test_decode_failure_dropped_silently() {
    let outcome = importer(ImportConfig::default().with_decode_policy(DecodePolicy::Drop))
        .import(
            b"ok\n\xc3\x28\nok",
            RecordMode::fields(),
            &mut (),
            &CancellationToken::new(),
        )
        .unwrap();

    assert_eq!(outcome.records.len(), 2);
    assert_eq!(outcome.stats.lines_skipped, 1);
    assert!(outcome.stats.is_clean());
}

#[test]
fn test_decode_failure_aborts_when_configured() {
    let result = importer(ImportConfig::default().with_decode_policy(DecodePolicy::Abort)).import(
        b"ok\n\xff\nok",
        RecordMode::fields(),
        &mut (),
        &CancellationToken::new(),
    );
    assert!(matches!(result, Err(Error::Decode { line: 2, .. })));
}

#[test]
fn test_malformed_quote_warns_and_keeps_best_effort_split() {
    let mut observer = RecordingObserver::default();
    let outcome = importer(ImportConfig::default())
        .import(
            b"a,\"b,c\nd,e,f",
            RecordMode::fields(),
            &mut observer,
            &CancellationToken::new(),
        )
        .unwrap();

    assert_eq!(outcome.records[0], vec!["a", "b", "c"]);
    assert_eq!(outcome.records[1], vec!["d", "e", "f"]);
    assert_eq!(outcome.stats.count(IssueKind::MalformedQuote), 1);
    assert_eq!(observer.issues.len(), 1);
    assert_eq!(observer.issues[0].line, 1);
}

#[test]
fn test_malformed_quote_policies() {
    let tolerated = importer(ImportConfig::default().with_quote_policy(QuotePolicy::Tolerate))
        .import(b"\"open", RecordMode::fields(), &mut (), &CancellationToken::new())
        .unwrap();
    assert!(tolerated.stats.is_clean());
    assert_eq!(tolerated.records, vec![vec!["open".to_string()]]);

    let rejected = importer(ImportConfig::default().with_quote_policy(QuotePolicy::Reject)).import(
        b"fine\nx,\"open",
        RecordMode::fields(),
        &mut (),
        &CancellationToken::new(),
    );
    assert!(matches!(
        rejected,
        Err(Error::MalformedQuote { line: 2, field: 2 })
    ));
}

#[test]
fn test_schema_mismatch_aborts_by_default() {
    let result = importer(ImportConfig::default()).import(
        b"a,b\n1,2\n3\n",
        RecordMode::keyed(),
        &mut (),
        &CancellationToken::new(),
    );
    match result {
        Err(Error::SchemaMismatch {
            line,
            expected,
            found,
        }) => assert_eq!((line, expected, found), (3, 2, 1)),
        other => panic!("Expected schema mismatch, got {other:?}"),
    }
}

#[test]
fn test_schema_mismatch_skip_record() {
    let outcome = importer(ImportConfig::default().with_schema_policy(SchemaPolicy::SkipRecord))
        .import(
            b"a,b\n1,2\n3\n4,5\n",
            RecordMode::keyed(),
            &mut (),
            &CancellationToken::new(),
        )
        .unwrap();

    assert_eq!(outcome.records.len(), 2);
    assert_eq!(outcome.stats.lines_skipped, 1);
    assert_eq!(outcome.stats.warnings[0].kind, IssueKind::SchemaMismatch);
    assert_eq!(outcome.stats.warnings[0].line, 3);
}

/// Test a failing source is routed to failure instead of looking like end-of-input
#[test]
fn test_source_read_failure_fails_import() {
    let source = FailingSource::new(b"a,b\nc,d\n", io::ErrorKind::ConnectionReset);
    let result = importer(ImportConfig::default()).import_reader(
        source,
        None,
        RecordMode::fields(),
        &mut (),
        &CancellationToken::new(),
    );
    assert!(matches!(result, Err(Error::SourceRead { .. })));
}

#[test]
fn test_cancellation_stops_at_line_boundary() {
    let token = CancellationToken::new();
    let mut observer = RecordingObserver {
        cancel_after: Some((3, token.clone())),
        ..Default::default()
    };

    let result = importer(ImportConfig::default()).import(
        numbered_rows(50).as_bytes(),
        RecordMode::fields(),
        &mut observer,
        &token,
    );

    assert!(matches!(
        result,
        Err(Error::Cancelled { lines_processed: 3 })
    ));
    assert_eq!(observer.lines.len(), 3);
}

#[test]
fn test_already_cancelled_token_reads_nothing() {
    let token = CancellationToken::new();
    token.cancel();
    let result = importer(ImportConfig::default()).import(
        b"a\nb",
        RecordMode::fields(),
        &mut (),
        &token,
    );
    assert!(matches!(result, Err(Error::Cancelled { lines_processed: 0 })));
}

#[test]
fn test_zero_interval_reports_progress_per_line() {
    let input = numbered_rows(5);
    let mut observer = RecordingObserver::default();
    importer(ImportConfig::default().with_progress_interval(Duration::ZERO))
        .import(
            input.as_bytes(),
            RecordMode::fields(),
            &mut observer,
            &CancellationToken::new(),
        )
        .unwrap();

    let lines: Vec<usize> = observer
        .progress
        .iter()
        .map(|(_, p)| p.lines_processed)
        .collect();
    assert_eq!(lines, vec![1, 2, 3, 4, 5]);
    let last = observer.progress.last().unwrap().1;
    assert_eq!(last.total_bytes, Some(input.len()));
    assert_eq!(last.fraction(), Some(1.0));
}

/// Source that sleeps before every read to make a run take measurable time
struct SlowSource {
    inner: io::Cursor<Vec<u8>>,
    delay: Duration,
}

impl Read for SlowSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        thread::sleep(self.delay);
        self.inner.read(buf)
    }
}

/// Test progress is never delivered more than once per interval
#[test]
fn test_progress_is_throttled() {
    let input = numbered_rows(150);
    let source = SlowSource {
        inner: io::Cursor::new(input.into_bytes()),
        delay: Duration::from_millis(2),
    };

    let mut observer = RecordingObserver::default();
    let started = Instant::now();
    let outcome = importer(ImportConfig::default().with_chunk_size(8))
        .import_reader(
            source,
            None,
            RecordMode::fields(),
            &mut observer,
            &CancellationToken::new(),
        )
        .unwrap();
    let elapsed = started.elapsed();

    assert_eq!(outcome.records.len(), 150);
    let allowed = (elapsed.as_millis() / 100) as usize;
    assert!(
        observer.progress.len() <= allowed,
        "{} notifications in {:?}",
        observer.progress.len(),
        elapsed
    );
    assert!(!observer.progress.is_empty());
}

#[test]
fn test_empty_input_succeeds_with_no_records() {
    let outcome = importer(ImportConfig::default())
        .import(b"", RecordMode::keyed(), &mut (), &CancellationToken::new())
        .unwrap();
    assert!(outcome.records.is_empty());
    assert!(outcome.header.is_none());
    assert_eq!(outcome.stats.lines_read, 0);
}

#[test]
fn test_invalid_config_is_rejected_up_front() {
    assert!(matches!(
        Importer::new(ImportConfig::default().with_field_delimiter("")),
        Err(Error::Configuration { .. })
    ));
}

/// Test undecodable lines still advance progress notifications
#[test]
fn test_undecodable_lines_report_progress() {
    let mut source = Vec::new();
    for _ in 0..20 {
        source.extend_from_slice(b"bad\xff\n");
    }
    source.extend_from_slice(b"ok\n");

    for policy in [DecodePolicy::Drop, DecodePolicy::Report] {
        let config = ImportConfig::default()
            .with_decode_policy(policy)
            .with_progress_interval(Duration::ZERO);
        let mut observer = RecordingObserver::default();
        let outcome = importer(config)
            .import(&source, RecordMode::fields(), &mut observer, &CancellationToken::new())
            .unwrap();

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(observer.progress.len(), 21, "{policy:?}");
        let counts: Vec<usize> = observer.progress.iter().map(|(_, p)| p.lines_processed).collect();
        assert_eq!(counts, (1..=21).collect::<Vec<_>>());
    }
}

/// Test a dropped first line hands the header role to the next line and says so
#[test]
fn test_header_taken_from_later_line_is_logged() {
    let logs = CapturedLogs::default();
    let outcome = logs.capture(|| {
        importer(ImportConfig::default())
            .import(
                b"\xffbroken\na,b\n1,2\n",
                RecordMode::keyed(),
                &mut (),
                &CancellationToken::new(),
            )
            .unwrap()
    });

    assert_eq!(outcome.header, Some(vec!["a".to_string(), "b".to_string()]));
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0]["b"], "2");
    assert_eq!(outcome.stats.count(IssueKind::Decode), 1);
    assert!(
        logs.contents().contains("Header taken from line 2"),
        "{}",
        logs.contents()
    );
}

/// Test a header on line 1 produces no header warning
#[test]
fn test_header_on_first_line_is_not_logged() {
    let logs = CapturedLogs::default();
    logs.capture(|| {
        importer(ImportConfig::default())
            .import(b"a,b\n1,2\n", RecordMode::keyed(), &mut (), &CancellationToken::new())
            .unwrap()
    });
    assert!(!logs.contents().contains("Header taken from line"));
}
