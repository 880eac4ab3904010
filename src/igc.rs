//! IGC flight log parsing.
//!
//! Only the records needed for replay are read:
//! - `HFDTE` flight date (`HFDTEDDMMYY` or `HFDTEDATE:DDMMYY,NN`)
//! - `HxPLT` pilot in charge
//! - `B` position fixes: `BHHMMSSDDMMmmmNDDDMMmmmEVPPPPPGGGGG`
//!
//! B record times are UTC time-of-day; the date comes from the header and
//! advances when a fix's time wraps past midnight.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use log::{debug, warn};

use crate::Fix;
use crate::error::IngestError;

/// Shortest B record that carries both altitudes.
const B_RECORD_LEN: usize = 35;

/// A backwards time step larger than this is read as a midnight rollover.
const ROLLOVER_THRESHOLD_SECS: i64 = 12 * 3600;

/// Result of parsing an IGC file.
#[derive(Debug, Clone)]
pub struct IgcFlight {
    /// Pilot from the `PLT` header, if present and non-empty
    pub pilot: Option<String>,
    /// Flight date from the `DTE` header
    pub date: NaiveDate,
    /// Valid fixes in file order
    pub fixes: Vec<Fix>,
    /// B records dropped as malformed (lenient mode) or flagged invalid
    pub skipped_records: usize,
}

/// A decoded B record, before date resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
struct BRecord {
    time: NaiveTime,
    latitude: f64,
    longitude: f64,
    valid: bool,
    pressure_altitude: i32,
    gps_altitude: i32,
}

impl BRecord {
    /// GPS altitude, falling back to pressure altitude, then 0.
    fn altitude(&self) -> f64 {
        if self.gps_altitude != 0 {
            self.gps_altitude as f64
        } else {
            self.pressure_altitude as f64
        }
    }

    /// Usable for replay: 3D fix with non-zero coordinates.
    fn is_usable(&self) -> bool {
        self.valid && self.latitude != 0.0 && self.longitude != 0.0
    }
}

/// Parse an IGC file.
///
/// With `lenient` set, malformed B records are skipped and counted; without
/// it, the first malformed B record fails the file.
///
/// # Errors
/// - `MalformedInput` for binary content, a missing or invalid date header,
///   or (strict mode) a malformed B record
/// - `NoValidFixes` when no usable fix remains
pub fn parse_igc(bytes: &[u8], lenient: bool) -> Result<IgcFlight, IngestError> {
    if bytes.contains(&0) {
        return Err(IngestError::MalformedInput {
            line: 0,
            reason: "binary content".to_string(),
        });
    }
    let text = String::from_utf8_lossy(bytes);

    let mut pilot: Option<String> = None;
    let mut date: Option<NaiveDate> = None;
    let mut records: Vec<(usize, BRecord)> = Vec::new();
    let mut skipped = 0usize;

    for (i, raw) in text.lines().enumerate() {
        let line_no = i + 1;
        let line = raw.trim_end();

        if let Some(rest) = header_value(line, "DTE") {
            date = Some(parse_date(rest).ok_or_else(|| IngestError::MalformedInput {
                line: line_no,
                reason: format!("invalid date header: {}", line),
            })?);
        } else if let Some(rest) = header_value(line, "PLT") {
            let name = pilot_name(rest);
            if !name.is_empty() {
                pilot = Some(name.to_string());
            }
        } else if line.starts_with('B') {
            match parse_b_record(line) {
                Ok(record) => records.push((line_no, record)),
                Err(reason) if lenient => {
                    debug!("[Igc] skipping line {}: {}", line_no, reason);
                    skipped += 1;
                }
                Err(reason) => {
                    return Err(IngestError::MalformedInput {
                        line: line_no,
                        reason,
                    });
                }
            }
        }
    }

    let date = date.ok_or_else(|| IngestError::MalformedInput {
        line: 0,
        reason: "missing HFDTE date header".to_string(),
    })?;

    let mut fixes = Vec::with_capacity(records.len());
    let mut day = date;
    let mut previous: Option<NaiveTime> = None;

    for (line_no, record) in records {
        if let Some(prev) = previous {
            let step = (record.time - prev).num_seconds();
            if step < -ROLLOVER_THRESHOLD_SECS {
                day = day.succ_opt().ok_or_else(|| IngestError::MalformedInput {
                    line: line_no,
                    reason: "date overflow".to_string(),
                })?;
            }
        }
        previous = Some(record.time);

        if !record.is_usable() {
            skipped += 1;
            continue;
        }

        let timestamp: DateTime<Utc> = day.and_time(record.time).and_utc();
        fixes.push(Fix::new(
            timestamp,
            record.latitude,
            record.longitude,
            record.altitude(),
        ));
    }

    if fixes.is_empty() {
        return Err(IngestError::NoValidFixes);
    }

    if skipped > 0 {
        warn!(
            "[Igc] kept {} fixes, skipped {} B records",
            fixes.len(),
            skipped
        );
    }

    Ok(IgcFlight {
        pilot,
        date,
        fixes,
        skipped_records: skipped,
    })
}

/// Value of an `H` record with the given three-letter subtype.
///
/// The second character is the data source (`F`, `O` or `P`) and is ignored.
fn header_value<'a>(line: &'a str, subtype: &str) -> Option<&'a str> {
    let rest = line.strip_prefix('H')?;
    let mut chars = rest.chars();
    chars.next()?;
    chars.as_str().strip_prefix(subtype)
}

/// Accepts `DDMMYY`, `DDMMYY,NN` and `DATE:DDMMYY,NN`.
fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.strip_prefix("DATE:").unwrap_or(value).trim_start();
    let digits = value.get(0..6)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let day: u32 = digits[0..2].parse().ok()?;
    let month: u32 = digits[2..4].parse().ok()?;
    let yy: i32 = digits[4..6].parse().ok()?;
    let year = if yy < 80 { 2000 + yy } else { 1900 + yy };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// `PILOTINCHARGE:Name`, `PILOT:Name` or a bare name after the subtype.
fn pilot_name(value: &str) -> &str {
    match value.split_once(':') {
        Some((_, name)) => name.trim(),
        None => value.trim(),
    }
}

fn parse_b_record(line: &str) -> Result<BRecord, String> {
    if line.len() < B_RECORD_LEN {
        return Err(format!("B record too short ({} chars)", line.len()));
    }
    let field = |range: std::ops::Range<usize>| {
        line.get(range.clone())
            .filter(|s| s.is_ascii())
            .ok_or_else(|| format!("non-ASCII data in columns {:?}", range))
    };

    let time = {
        let t = field(1..7)?;
        let h = parse_digits(&t[0..2])?;
        let m = parse_digits(&t[2..4])?;
        let s = parse_digits(&t[4..6])?;
        NaiveTime::from_hms_opt(h, m, s).ok_or_else(|| format!("invalid time {}", t))?
    };

    let latitude = parse_angle(field(7..14)?, 2, field(14..15)?, 'N', 'S', 90.0)?;
    let longitude = parse_angle(field(15..23)?, 3, field(23..24)?, 'E', 'W', 180.0)?;

    let valid = match field(24..25)? {
        "A" => true,
        "V" => false,
        other => return Err(format!("invalid validity flag {:?}", other)),
    };

    let pressure_altitude = parse_altitude(field(25..30)?)?;
    let gps_altitude = parse_altitude(field(30..35)?)?;

    Ok(BRecord {
        time,
        latitude,
        longitude,
        valid,
        pressure_altitude,
        gps_altitude,
    })
}

fn parse_digits(s: &str) -> Result<u32, String> {
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("expected digits, found {:?}", s));
    }
    s.parse().map_err(|_| format!("expected digits, found {:?}", s))
}

/// Degrees followed by minutes in thousandths: `DDMMmmm` or `DDDMMmmm`.
fn parse_angle(
    digits: &str,
    degree_width: usize,
    hemisphere: &str,
    positive: char,
    negative: char,
    limit: f64,
) -> Result<f64, String> {
    let degrees = parse_digits(&digits[..degree_width])? as f64;
    let milli_minutes = parse_digits(&digits[degree_width..])? as f64;
    let value = degrees + milli_minutes / 60_000.0;
    if value > limit {
        return Err(format!("coordinate {} out of range", value));
    }
    match hemisphere.chars().next() {
        Some(c) if c == positive => Ok(value),
        Some(c) if c == negative => Ok(-value),
        _ => Err(format!("invalid hemisphere {:?}", hemisphere)),
    }
}

/// Five-character altitude in meters, possibly with a leading minus sign.
fn parse_altitude(s: &str) -> Result<i32, String> {
    s.trim_start_matches(' ')
        .parse::<i32>()
        .map_err(|_| format!("invalid altitude {:?}", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_b_record() {
        let record = parse_b_record("B1101355206343N00006198WA0058700558").unwrap();
        assert_eq!(record.time, NaiveTime::from_hms_opt(11, 1, 35).unwrap());
        assert!((record.latitude - (52.0 + 6.343 / 60.0)).abs() < 1e-9);
        assert!((record.longitude + (0.0 + 6.198 / 60.0)).abs() < 1e-9);
        assert!(record.valid);
        assert_eq!(record.pressure_altitude, 587);
        assert_eq!(record.gps_altitude, 558);
    }

    #[test]
    fn test_negative_pressure_altitude() {
        let record = parse_b_record("B1101355206343N00006198WA-001200558").unwrap();
        assert_eq!(record.pressure_altitude, -12);
    }

    #[test]
    fn test_altitude_falls_back_to_pressure() {
        let record = parse_b_record("B1101355206343N00006198WA0058700000").unwrap();
        assert_eq!(record.altitude(), 587.0);
    }

    #[test]
    fn test_rejects_bad_hemisphere() {
        assert!(parse_b_record("B1101355206343X00006198WA0058700558").is_err());
    }

    #[test]
    fn test_header_date_formats() {
        assert_eq!(parse_date("150723"), NaiveDate::from_ymd_opt(2023, 7, 15));
        assert_eq!(
            parse_date("DATE:150723,01"),
            NaiveDate::from_ymd_opt(2023, 7, 15)
        );
        assert_eq!(parse_date("311299"), NaiveDate::from_ymd_opt(1999, 12, 31));
        assert_eq!(parse_date("DATE:xx"), None);
    }

    #[test]
    fn test_pilot_header_variants() {
        assert_eq!(header_value("HFPLTPILOTINCHARGE:Jane Doe", "PLT").map(pilot_name), Some("Jane Doe"));
        assert_eq!(header_value("HOPLTPILOT: Max ", "PLT").map(pilot_name), Some("Max"));
        assert_eq!(header_value("HFGTYGLIDERTYPE:LS8", "PLT"), None);
    }
}
