//! Reference payload generation.
//!
//! One payload is generated per run and reused by every case. A file that
//! already has the expected size is left alone, so repeated runs do not churn
//! through fresh random data.
//!
//! # Formats
//!
//! - Binary: `packet_count * packet_size` random bytes
//! - ASCII: `packet_count` lines of `packet_size - 1` random hex digits plus
//!   `\n`, so every line is exactly `packet_size` bytes

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use roundtrip_core::HarnessError;

/// Packet count used when none is configured.
pub const DEFAULT_PACKET_COUNT: u64 = 10_000;

/// Packet size used when none is configured.
pub const DEFAULT_PACKET_SIZE: u64 = 1498;

/// Chunk size for streaming random bytes to disk.
const WRITE_CHUNK: usize = 64 * 1024;

/// Payload encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadFormat {
    /// Raw random bytes.
    #[default]
    Binary,
    /// Newline-terminated random hex records.
    Ascii,
}

/// Shape and content source of the reference payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadSpec {
    /// Number of packets.
    pub packet_count: u64,
    /// Bytes per packet (per line in ASCII mode, newline included).
    pub packet_size: u64,
    /// Encoding.
    pub format: PayloadFormat,
    /// Seed for reproducible content; OS entropy when `None`.
    pub seed: Option<u64>,
}

impl Default for PayloadSpec {
    fn default() -> Self {
        Self {
            packet_count: DEFAULT_PACKET_COUNT,
            packet_size: DEFAULT_PACKET_SIZE,
            format: PayloadFormat::Binary,
            seed: None,
        }
    }
}

impl PayloadSpec {
    /// Total payload size in bytes.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPayload` if the size overflows `u64`.
    pub fn total_len(&self) -> Result<u64, HarnessError> {
        self.packet_count.checked_mul(self.packet_size).ok_or_else(|| {
            HarnessError::InvalidPayload {
                reason: format!("{} x {} bytes overflows", self.packet_count, self.packet_size),
            }
        })
    }

    fn validate(&self) -> Result<u64, HarnessError> {
        if self.format == PayloadFormat::Ascii && self.packet_size == 0 {
            return Err(HarnessError::InvalidPayload {
                reason: "ASCII packets need at least one byte for the newline".to_string(),
            });
        }
        self.total_len()
    }
}

/// Make sure a payload matching `spec` exists at `path`.
///
/// Returns the path unchanged if a file of the expected size is already
/// there; otherwise (re)generates it.
///
/// # Errors
///
/// Returns `InvalidPayload` for impossible specs and `Io` for any
/// filesystem failure. Both are fatal: no case can run without a payload.
pub fn ensure_payload(path: &Path, spec: &PayloadSpec) -> Result<PathBuf, HarnessError> {
    let expected = spec.validate()?;

    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() && meta.len() == expected => {
            tracing::debug!(path = %path.display(), bytes = expected, "Reusing existing payload");
            return Ok(path.to_path_buf());
        },
        Ok(meta) => {
            tracing::info!(
                path = %path.display(),
                found = meta.len(),
                expected,
                "Payload has wrong size, regenerating"
            );
        },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {},
        Err(e) => {
            return Err(HarnessError::io(format!("inspecting payload {}", path.display()), e));
        },
    }

    tracing::info!(
        path = %path.display(),
        packets = spec.packet_count,
        packet_size = spec.packet_size,
        format = ?spec.format,
        "Generating payload"
    );

    let mut rng = payload_rng(spec.seed)?;
    let file = File::create(path)
        .map_err(|e| HarnessError::io(format!("creating payload {}", path.display()), e))?;
    let mut writer = BufWriter::new(file);

    let written = match spec.format {
        PayloadFormat::Binary => write_binary(&mut writer, &mut rng, expected),
        PayloadFormat::Ascii => write_ascii(&mut writer, &mut rng, spec),
    };
    written
        .and_then(|()| writer.flush())
        .map_err(|e| HarnessError::io(format!("writing payload {}", path.display()), e))?;

    Ok(path.to_path_buf())
}

fn payload_rng(seed: Option<u64>) -> Result<ChaCha20Rng, HarnessError> {
    if let Some(seed) = seed {
        return Ok(ChaCha20Rng::seed_from_u64(seed));
    }

    let mut key = [0u8; 32];
    getrandom::fill(&mut key).map_err(|e| {
        HarnessError::io("reading OS entropy for payload", std::io::Error::other(e.to_string()))
    })?;
    Ok(ChaCha20Rng::from_seed(key))
}

fn write_binary(out: &mut impl Write, rng: &mut impl RngCore, len: u64) -> std::io::Result<()> {
    let mut chunk = vec![0u8; WRITE_CHUNK];
    let mut remaining = len;

    while remaining > 0 {
        let n = usize::try_from(remaining).map_or(WRITE_CHUNK, |r| r.min(WRITE_CHUNK));
        rng.fill_bytes(&mut chunk[..n]);
        out.write_all(&chunk[..n])?;
        remaining -= n as u64;
    }

    Ok(())
}

fn write_ascii(
    out: &mut impl Write,
    rng: &mut impl RngCore,
    spec: &PayloadSpec,
) -> std::io::Result<()> {
    let digits = usize::try_from(spec.packet_size - 1).map_err(std::io::Error::other)?;
    let mut raw = vec![0u8; digits.div_ceil(2)];

    for _ in 0..spec.packet_count {
        rng.fill_bytes(&mut raw);
        let line = hex::encode(&raw);
        out.write_all(&line.as_bytes()[..digits])?;
        out.write_all(b"\n")?;
    }

    Ok(())
}
