use anyhow::Result;
use heatsweep_core::SweepError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

const CHUNK: usize = 64 * 1024;

/// Outcome of a byte-for-byte file comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Comparison {
    Identical,
    Different,
    Missing { path: PathBuf },
}

/// Compares two files byte for byte, streaming both. A file that does not
/// exist is reported, not raised; other I/O errors propagate.
pub fn compare_files(left: &Path, right: &Path) -> Result<Comparison> {
    let Some(mut left_file) = open_optional(left)? else {
        return Ok(Comparison::Missing {
            path: left.to_path_buf(),
        });
    };
    let Some(mut right_file) = open_optional(right)? else {
        return Ok(Comparison::Missing {
            path: right.to_path_buf(),
        });
    };

    let left_len = left_file
        .metadata()
        .map_err(|err| SweepError::io("stat", left, err))?
        .len();
    let right_len = right_file
        .metadata()
        .map_err(|err| SweepError::io("stat", right, err))?
        .len();
    if left_len != right_len {
        return Ok(Comparison::Different);
    }

    let mut left_buf = vec![0_u8; CHUNK];
    let mut right_buf = vec![0_u8; CHUNK];
    loop {
        let n = read_full(&mut left_file, &mut left_buf).map_err(|e| SweepError::io("read", left, e))?;
        let m =
            read_full(&mut right_file, &mut right_buf).map_err(|e| SweepError::io("read", right, e))?;
        if n != m || left_buf[..n] != right_buf[..m] {
            return Ok(Comparison::Different);
        }
        if n == 0 {
            return Ok(Comparison::Identical);
        }
    }
}

fn open_optional(path: &Path) -> Result<Option<File>> {
    match File::open(path) {
        Ok(file) => Ok(Some(file)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(SweepError::io("open", path, err).into()),
    }
}

/// Fills `buf` unless EOF comes first; returns the number of bytes read.
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}
