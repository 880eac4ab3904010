//! Tests for IGC parsing and multi-file ingestion

use chrono::{NaiveDate, Timelike};
use glidetrax::igc::parse_igc;
use glidetrax::ingest::UNKNOWN_PILOT;
use glidetrax::synthetic::SyntheticFlight;
use glidetrax::{DEFAULT_PALETTE, IngestError, Ingestor, ReplayConfig};

const HEADER: &str = "AXXXABC\r\nHFDTE150723\r\nHFPLTPILOTINCHARGE:Max Muster\r\n";

fn igc_with(records: &[&str]) -> String {
    let mut igc = HEADER.to_string();
    for r in records {
        igc.push_str(r);
        igc.push_str("\r\n");
    }
    igc
}

fn ingestor() -> Ingestor {
    Ingestor::seeded(ReplayConfig::default(), 1234)
}

#[test]
fn test_synthetic_round_trip() {
    let flight = SyntheticFlight {
        samples: 200,
        sample_interval_secs: 4,
        ..SyntheticFlight::default()
    };
    let parsed = parse_igc(flight.to_igc().as_bytes(), false).unwrap();

    assert_eq!(parsed.pilot.as_deref(), Some("Jane Doe"));
    assert_eq!(parsed.date, NaiveDate::from_ymd_opt(2023, 7, 15).unwrap());
    assert_eq!(parsed.fixes.len(), 200);
    assert_eq!(parsed.skipped_records, 0);

    for (parsed, generated) in parsed.fixes.iter().zip(flight.fixes()) {
        assert_eq!(parsed.timestamp, generated.timestamp);
        assert!((parsed.latitude - generated.latitude).abs() < 1e-4);
        assert!((parsed.longitude - generated.longitude).abs() < 1e-4);
        assert_eq!(parsed.altitude, generated.altitude);
    }
}

#[test]
fn test_track_from_igc() {
    let igc = igc_with(&[
        "B1101355206343N00006198WA0058700558",
        "B1101365206350N00006210WA0058800560",
        "B1101455206400N00006300WA0059000565",
    ]);
    let track = ingestor().parse_file("flight.IGC", igc.as_bytes()).unwrap();

    assert_eq!(track.name, "flight.IGC");
    assert_eq!(track.pilot_name, "Max Muster");
    assert_eq!(track.len(), 3);
    assert_eq!(track.relative_ms(), &[0, 1000, 10_000]);
    assert_eq!(track.fixes()[0].altitude, 558.0);
    assert_eq!(track.fixes()[0].timestamp.hour(), 11);
}

#[test]
fn test_missing_pilot_header() {
    let igc = "HFDTE150723\r\nB1101355206343N00006198WA0058700558\r\n";
    let track = ingestor().parse_file("a.igc", igc.as_bytes()).unwrap();
    assert_eq!(track.pilot_name, UNKNOWN_PILOT);
}

#[test]
fn test_missing_date_header() {
    let igc = "HFPLTPILOT:Max\r\nB1101355206343N00006198WA0058700558\r\n";
    let result = ingestor().parse_file("a.igc", igc.as_bytes());
    assert!(matches!(result, Err(IngestError::MalformedInput { .. })));
}

#[test]
fn test_long_date_header() {
    let igc = "HFDTEDATE:020824,01\r\nB0000015206343N00006198WA0058700558\r\n";
    let parsed = parse_igc(igc.as_bytes(), true).unwrap();
    assert_eq!(parsed.date, NaiveDate::from_ymd_opt(2024, 8, 2).unwrap());
}

#[test]
fn test_no_valid_fixes() {
    // Void flag and zero coordinates are both dropped
    let igc = igc_with(&[
        "B1101355206343N00006198WV0058700558",
        "B1101360000000N00000000EA0058700558",
    ]);
    let result = ingestor().parse_file("a.igc", igc.as_bytes());
    assert!(matches!(result, Err(IngestError::NoValidFixes)));

    let result = ingestor().parse_file("b.igc", HEADER.as_bytes());
    assert!(matches!(result, Err(IngestError::NoValidFixes)));
}

#[test]
fn test_lenient_skips_malformed_records() {
    let igc = igc_with(&[
        "B1101355206343N00006198WA0058700558",
        "B11013",
        "B1101375206343N00006198WA0058700558",
    ]);

    let parsed = parse_igc(igc.as_bytes(), true).unwrap();
    assert_eq!(parsed.fixes.len(), 2);
    assert_eq!(parsed.skipped_records, 1);

    match parse_igc(igc.as_bytes(), false) {
        Err(IngestError::MalformedInput { line, .. }) => assert_eq!(line, 5),
        other => panic!("expected MalformedInput, got {:?}", other),
    }
}

#[test]
fn test_binary_content_rejected() {
    let mut bytes = HEADER.as_bytes().to_vec();
    bytes.extend_from_slice(&[0x00, 0xFF, 0x10]);
    assert!(matches!(
        parse_igc(&bytes, true),
        Err(IngestError::MalformedInput { .. })
    ));
}

#[test]
fn test_midnight_rollover() {
    let igc = igc_with(&[
        "B2359585206343N00006198WA0058700558",
        "B0000025206343N00006198WA0058700558",
    ]);
    let parsed = parse_igc(igc.as_bytes(), false).unwrap();

    assert_eq!(
        parsed.fixes[1].timestamp.date_naive(),
        NaiveDate::from_ymd_opt(2023, 7, 16).unwrap()
    );
    let gap = parsed.fixes[1].timestamp - parsed.fixes[0].timestamp;
    assert_eq!(gap.num_seconds(), 4);
}

#[test]
fn test_out_of_order_fix_clamped() {
    let igc = igc_with(&[
        "B1101355206343N00006198WA0058700558",
        "B1101405206343N00006198WA0058700558",
        "B1101385206343N00006198WA0058700558",
        "B1101455206343N00006198WA0058700558",
    ]);
    let track = ingestor().parse_file("a.igc", igc.as_bytes()).unwrap();
    assert_eq!(track.relative_ms(), &[0, 5000, 5000, 10_000]);
}

#[test]
fn test_extension_rejected() {
    let result = ingestor().parse_file("flight.gpx", b"<gpx/>");
    assert!(matches!(
        result,
        Err(IngestError::UnsupportedExtension { .. })
    ));
    assert!(Ingestor::<rand::rngs::StdRng>::accepts("A.Igc"));
    assert!(!Ingestor::<rand::rngs::StdRng>::accepts("igc"));
}

#[test]
fn test_batch_keeps_good_files() {
    let good = SyntheticFlight::default().to_igc();
    let files: Vec<(&str, Vec<u8>)> = vec![
        ("one.igc", good.clone().into_bytes()),
        ("broken.igc", b"HFDTE150723\r\n".to_vec()),
        ("notes.txt", b"hello".to_vec()),
        ("two.igc", good.into_bytes()),
    ];

    let report = ingestor().ingest(files);

    assert_eq!(report.tracks.len(), 2);
    assert_eq!(report.tracks[0].name, "one.igc");
    assert_eq!(report.tracks[1].name, "two.igc");
    assert_eq!(report.failures.len(), 2);
    assert_eq!(report.failures[0].file_name, "broken.igc");
    assert_eq!(
        report.failures[0].message(),
        "Failed to parse broken.igc: no valid track points found"
    );
}

#[test]
fn test_ids_and_colors() {
    let igc = SyntheticFlight {
        samples: 10,
        ..SyntheticFlight::default()
    }
    .to_igc();
    let mut ingestor = ingestor();
    let report = ingestor.ingest((0..20).map(|i| (format!("f{}.igc", i), igc.as_bytes())));

    let mut ids = std::collections::HashSet::new();
    for track in &report.tracks {
        let suffix = track.id.strip_prefix("track_").unwrap();
        assert_eq!(suffix.len(), 9);
        assert!(suffix.bytes().all(|b| b.is_ascii_digit() || b.is_ascii_lowercase()));
        assert!(ids.insert(track.id.clone()), "duplicate id {}", track.id);
        assert!(DEFAULT_PALETTE.contains(&track.color.as_str()));
    }
    assert_eq!(ids.len(), 20);
}

#[test]
fn test_seeded_ingestor_is_reproducible() {
    let igc = SyntheticFlight::default().to_igc();
    let a = ingestor().parse_file("a.igc", igc.as_bytes()).unwrap();
    let b = ingestor().parse_file("a.igc", igc.as_bytes()).unwrap();
    assert_eq!(a.id, b.id);
    assert_eq!(a.color, b.color);
}

#[test]
fn test_custom_palette() {
    let config = ReplayConfig {
        palette: vec!["#000000".to_string()],
        ..ReplayConfig::default()
    };
    let igc = SyntheticFlight::default().to_igc();
    let track = Ingestor::seeded(config, 9)
        .parse_file("a.igc", igc.as_bytes())
        .unwrap();
    assert_eq!(track.color, "#000000");
}
