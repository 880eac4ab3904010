//! Multi-file ingestion.
//!
//! Turns dropped files into tracks. Each file is handled on its own: a bad
//! file is recorded as a failure and never stops its siblings from loading.

use std::collections::HashSet;

use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::ReplayConfig;
use crate::error::IngestError;
use crate::igc::parse_igc;
use crate::track::{DEFAULT_PALETTE, Track};

/// Pilot name used when the log has no `PLT` header.
pub const UNKNOWN_PILOT: &str = "Unknown Pilot";

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const ID_SUFFIX_LEN: usize = 9;

/// A file that could not be ingested.
#[derive(Debug)]
pub struct IngestFailure {
    pub file_name: String,
    pub error: IngestError,
}

impl IngestFailure {
    /// User-facing message, e.g. `Failed to parse a.igc: no valid track points found`.
    pub fn message(&self) -> String {
        format!("Failed to parse {}: {}", self.file_name, self.error)
    }
}

/// Outcome of ingesting a batch of files.
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Successfully parsed tracks, in input order
    pub tracks: Vec<Track>,
    /// Files that failed, in input order
    pub failures: Vec<IngestFailure>,
}

/// Parses flight logs into tracks, assigning ids and colours.
pub struct Ingestor<R: Rng = StdRng> {
    config: ReplayConfig,
    rng: R,
    issued_ids: HashSet<String>,
}

impl Ingestor<StdRng> {
    /// Ingestor with an entropy-seeded generator.
    pub fn new(config: ReplayConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Ingestor with reproducible ids and colours.
    pub fn seeded(config: ReplayConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Ingestor<R> {
    pub fn with_rng(config: ReplayConfig, rng: R) -> Self {
        Self {
            config,
            rng,
            issued_ids: HashSet::new(),
        }
    }

    /// Whether a file name has the `.igc` extension (case-insensitive).
    pub fn accepts(file_name: &str) -> bool {
        file_name.to_ascii_lowercase().ends_with(".igc")
    }

    /// Parse a single file into a track.
    pub fn parse_file(&mut self, file_name: &str, bytes: &[u8]) -> Result<Track, IngestError> {
        if !Self::accepts(file_name) {
            return Err(IngestError::UnsupportedExtension {
                file_name: file_name.to_string(),
            });
        }

        let flight = parse_igc(bytes, self.config.lenient)?;
        let pilot = flight.pilot.unwrap_or_else(|| UNKNOWN_PILOT.to_string());
        let id = self.next_id();
        let color = self.pick_color();

        Track::new(id, file_name, pilot, color, flight.fixes)
    }

    /// Parse a batch of `(file name, contents)` pairs.
    pub fn ingest<I, N, B>(&mut self, files: I) -> IngestReport
    where
        I: IntoIterator<Item = (N, B)>,
        N: AsRef<str>,
        B: AsRef<[u8]>,
    {
        let mut report = IngestReport::default();

        for (name, bytes) in files {
            let name = name.as_ref();
            match self.parse_file(name, bytes.as_ref()) {
                Ok(track) => {
                    info!(
                        "[Ingest] {}: {} fixes, pilot {}, {} ms",
                        name,
                        track.len(),
                        track.pilot_name,
                        track.duration_ms()
                    );
                    report.tracks.push(track);
                }
                Err(error) => {
                    warn!("[Ingest] Failed to parse {}: {}", name, error);
                    report.failures.push(IngestFailure {
                        file_name: name.to_string(),
                        error,
                    });
                }
            }
        }

        info!(
            "[Ingest] {} tracks loaded, {} files failed",
            report.tracks.len(),
            report.failures.len()
        );
        report
    }

    /// `track_` followed by nine base-36 characters, unique per ingestor.
    fn next_id(&mut self) -> String {
        loop {
            let suffix: String = (0..ID_SUFFIX_LEN)
                .map(|_| ID_ALPHABET[self.rng.gen_range(0..ID_ALPHABET.len())] as char)
                .collect();
            let id = format!("track_{}", suffix);
            if self.issued_ids.insert(id.clone()) {
                return id;
            }
        }
    }

    fn pick_color(&mut self) -> String {
        if self.config.palette.is_empty() {
            return DEFAULT_PALETTE[self.rng.gen_range(0..DEFAULT_PALETTE.len())].to_string();
        }
        let i = self.rng.gen_range(0..self.config.palette.len());
        self.config.palette[i].clone()
    }
}
