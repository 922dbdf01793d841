//! Byte-exact comparison of payload and simulator output.

use std::path::Path;

use roundtrip_core::{HarnessError, Mismatch, Verification};
use tokio::{
    fs::File,
    io::{AsyncReadExt, BufReader},
};

const COMPARE_CHUNK: usize = 64 * 1024;

/// Compare two files as opaque byte sequences.
///
/// Any difference, including a length difference, is reported as
/// `Verification::Differs` with the offset of the first differing byte.
///
/// # Errors
///
/// Returns `Io` if either file cannot be opened or read.
pub async fn compare_files(expected: &Path, actual: &Path) -> Result<Verification, HarnessError> {
    let expected_file = open(expected).await?;
    let actual_file = open(actual).await?;

    let expected_len = file_len(&expected_file, expected).await?;
    let actual_len = file_len(&actual_file, actual).await?;

    let mut left = BufReader::new(expected_file);
    let mut right = BufReader::new(actual_file);
    let mut left_buf = vec![0u8; COMPARE_CHUNK];
    let mut right_buf = vec![0u8; COMPARE_CHUNK];
    let mut offset = 0u64;

    loop {
        let n = read_full(&mut left, &mut left_buf, expected).await?;
        let m = read_full(&mut right, &mut right_buf, actual).await?;

        let common = n.min(m);
        let diverged = left_buf[..common]
            .iter()
            .zip(&right_buf[..common])
            .position(|(a, b)| a != b)
            .or((n != m).then_some(common));

        if let Some(pos) = diverged {
            let first_difference = offset + pos as u64;
            let mismatch = Mismatch { expected_len, actual_len, first_difference };
            return Ok(Verification::Differs(mismatch));
        }

        if n == 0 {
            return Ok(Verification::Identical);
        }

        offset += n as u64;
    }
}

async fn open(path: &Path) -> Result<File, HarnessError> {
    File::open(path).await.map_err(|e| HarnessError::io(format!("opening {}", path.display()), e))
}

async fn file_len(file: &File, path: &Path) -> Result<u64, HarnessError> {
    file.metadata()
        .await
        .map(|m| m.len())
        .map_err(|e| HarnessError::io(format!("inspecting {}", path.display()), e))
}

/// Fill `buf` as far as the reader allows; short only at end of file.
async fn read_full(
    reader: &mut BufReader<File>,
    buf: &mut [u8],
    path: &Path,
) -> Result<usize, HarnessError> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader
            .read(&mut buf[filled..])
            .await
            .map_err(|e| HarnessError::io(format!("reading {}", path.display()), e))?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
