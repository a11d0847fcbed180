// File: outmask-core/src/headless.rs

//! `headless.rs`
//! Convenience wrappers for redacting data that is already fully in memory.
//! They run the same streaming [`Redactor`] as a live job, over a single chunk.

use std::io::{self, Read, Write};

use crate::redactor::Redactor;
use crate::report::RedactionStats;

/// Redacts `input` in one shot and returns the result.
///
/// # Arguments
///
/// * `needles` - The literal secret values.
/// * `replacement` - Text substituted for every match.
/// * `input` - The bytes to redact.
pub fn redact_bytes<I, N>(needles: I, replacement: &str, input: &[u8]) -> io::Result<Vec<u8>>
where
    I: IntoIterator<Item = N>,
    N: AsRef<[u8]>,
{
    let mut redactor = Redactor::new(Vec::with_capacity(input.len()), replacement, needles);
    redactor.write_chunk(input)?;
    redactor.into_inner()
}

/// Pumps `reader` through `redactor` in chunks of `chunk_size` bytes until EOF,
/// then finishes the stream. Returns the redactor's final statistics.
///
/// The sink is flushed after every chunk so progress lines show up as soon as
/// they are settled.
pub fn redact_reader<R, W>(
    mut reader: R,
    redactor: &mut Redactor<W>,
    chunk_size: usize,
) -> io::Result<RedactionStats>
where
    R: Read,
    W: Write,
{
    let mut buf = vec![0u8; chunk_size.max(1)];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        redactor.write_chunk(&buf[..n])?;
        redactor.flush()?;
    }
    redactor.finish()?;
    Ok(redactor.stats().clone())
}
