//! redactor.rs - The streaming secret redactor.
//!
//! A [`Redactor`] sits between a byte producer (usually a child process's output
//! pipe) and a sink. Every chunk handed to [`Redactor::write_chunk`] is scanned with
//! the compiled [`SkipTable`], matches are replaced, and everything that can no
//! longer be part of a match is forwarded to the sink in the same call. Only the
//! last `max_len - 1` bytes at most are held back, so that a secret split across
//! two writes is still caught. Completed lines are never held back.
//!
//! [`Redactor::finish`] must be called once at end-of-stream, otherwise the retained
//! tail is lost.
//!
//! License: MIT OR APACHE 2.0

use std::io::{self, Write};
use std::sync::Arc;

use log::{debug, trace};

use crate::report::RedactionStats;
use crate::sanitizers::compiler::SkipTable;

/// Linux pipes buffer up to 64 KiB, so that is the chunk size most writes arrive in.
pub const PIPE_BUFFER_SIZE: usize = 65536;

/// Where a confirmed match begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchStart {
    /// At this index of the current chunk.
    Chunk(usize),
    /// This many bytes before the end of the retained tail.
    Tail(usize),
}

/// A write-sink decorator that replaces every occurrence of a set of literal
/// secret values with a fixed replacement.
///
/// Not meant to be shared between producers: drive one instance per stream, or
/// serialize access externally.
#[derive(Debug)]
pub struct Redactor<W: Write> {
    table: Arc<SkipTable>,
    // Where the next call's scan cursor starts, relative to the start of its chunk.
    offset: usize,
    // Staged output during a call; between calls, the retained tail.
    outbuf: Vec<u8>,
    // The last `max_len - 1` raw bytes seen, for candidates that start before
    // the current chunk. Independent of what has already been staged.
    history: Vec<u8>,
    sink: W,
    stats: RedactionStats,
}

impl<W: Write> Redactor<W> {
    /// Compiles `needles` and wraps `sink`.
    ///
    /// An empty needle set gives a pass-through and an empty `replacement` deletes
    /// matches. Neither is an error.
    pub fn new<I, N>(sink: W, replacement: impl Into<Vec<u8>>, needles: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: AsRef<[u8]>,
    {
        Self::with_table(sink, Arc::new(SkipTable::compile(needles, replacement)))
    }

    /// Wraps `sink` using an already compiled table, e.g. one shared by the stdout
    /// and stderr redactors of the same job.
    pub fn with_table(sink: W, table: Arc<SkipTable>) -> Self {
        let stats = RedactionStats::new(table.needles().len());
        Self {
            offset: initial_offset(&table),
            outbuf: Vec::with_capacity(PIPE_BUFFER_SIZE + table.max_len()),
            history: Vec::with_capacity(table.max_len()),
            table,
            sink,
            stats,
        }
    }

    /// Redacts `chunk` and forwards every confirmed byte to the sink.
    ///
    /// Always consumes the whole chunk. If the sink fails, the chunk has still been
    /// absorbed into the redactor's state and the sink's error is returned as is.
    pub fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<usize> {
        self.stats.bytes_in += chunk.len() as u64;

        if self.table.is_empty() {
            self.sink.write_all(chunk)?;
            self.stats.bytes_out += chunk.len() as u64;
            return Ok(chunk.len());
        }

        let table = &*self.table;
        let outbuf = &mut self.outbuf;
        let history = self.history.as_slice();
        let len = chunk.len();
        let min_len = table.min_len();
        let max_len = table.max_len();

        let mut cursor = self.offset;
        // Bytes of `chunk` below this index are already staged into `outbuf`.
        let mut done_to = 0usize;

        while cursor < len {
            let entry = table.entry(chunk[cursor]);

            if entry.skip > 0 {
                cursor += entry.skip;
                let settled = settled_before(cursor, max_len).min(len);
                if settled > done_to {
                    outbuf.extend_from_slice(&chunk[done_to..settled]);
                    done_to = settled;
                }
                continue;
            }

            // Step past the byte first so `cursor` is the exclusive end of any candidate.
            cursor += 1;
            let hit = entry.candidates.iter().find_map(|&index| {
                locate(table.needle(index), chunk, cursor, history).map(|start| (index, start))
            });

            let Some((index, start)) = hit else {
                continue;
            };

            match start {
                // `outbuf` still holds only the unconfirmed tail. Whatever of it lies
                // at or after the match start belongs to the match.
                MatchStart::Tail(from_tail) if done_to == 0 => {
                    let keep = outbuf.len().saturating_sub(from_tail);
                    outbuf.truncate(keep);
                }
                MatchStart::Chunk(start) if start >= done_to => {
                    outbuf.extend_from_slice(&chunk[done_to..start]);
                }
                // Starts inside the previous redaction, so no clear bytes lie between.
                _ => {}
            }
            outbuf.extend_from_slice(table.replacement());
            trace!("Redacted needle #{} ending at chunk offset {}.", index, cursor);
            self.stats.occurrences[index] += 1;
            done_to = cursor;
            cursor += min_len - 1;
        }

        // Push completed lines (and carriage-return progress updates) through now
        // instead of holding them back with the tail.
        if let Some(pos) = chunk[done_to..]
            .iter()
            .rposition(|&b| b == b'\n' || b == b'\r')
        {
            let end = done_to + pos + 1;
            outbuf.extend_from_slice(&chunk[done_to..end]);
            done_to = end;
        }

        let settled = settled_before(cursor, max_len).min(len);
        if settled > done_to {
            outbuf.extend_from_slice(&chunk[done_to..settled]);
            done_to = settled;
        }

        let written = if done_to > 0 {
            let result = self.sink.write_all(outbuf);
            self.stats.bytes_out += outbuf.len() as u64;
            outbuf.clear();
            outbuf.extend_from_slice(&chunk[done_to..]);
            result
        } else {
            // Nothing of this chunk is confirmed yet, but the oldest retained bytes
            // may have fallen out of reach of any match.
            let settled_tail = (outbuf.len() + cursor + 1)
                .saturating_sub(max_len)
                .min(outbuf.len());
            let result = if settled_tail > 0 {
                let result = self.sink.write_all(&outbuf[..settled_tail]);
                self.stats.bytes_out += settled_tail as u64;
                outbuf.drain(..settled_tail);
                result
            } else {
                Ok(())
            };
            outbuf.extend_from_slice(chunk);
            result
        };

        remember(&mut self.history, chunk, max_len - 1);

        // The scan always ends at or past the end of the chunk.
        self.offset = cursor - len;

        written.map(|()| len)
    }

    /// Writes the retained tail to the sink unchanged and flushes the sink.
    ///
    /// Call exactly once after the last write. The tail is cleared even if the
    /// sink fails, so a second call writes nothing.
    pub fn finish(&mut self) -> io::Result<()> {
        if !self.outbuf.is_empty() {
            debug!("Releasing {} retained byte(s) at end of stream.", self.outbuf.len());
        }
        let result = self.sink.write_all(&self.outbuf);
        self.stats.bytes_out += self.outbuf.len() as u64;
        self.outbuf.clear();
        self.history.clear();
        self.offset = initial_offset(&self.table);
        result?;
        self.sink.flush()
    }

    /// Finishes the stream and hands back the sink.
    pub fn into_inner(mut self) -> io::Result<W> {
        self.finish()?;
        Ok(self.sink)
    }

    /// Number of bytes currently held back pending confirmation.
    pub fn retained_len(&self) -> usize {
        self.outbuf.len()
    }

    /// Byte and per-needle counts since construction.
    pub fn stats(&self) -> &RedactionStats {
        &self.stats
    }

    /// The compiled table this redactor matches with.
    pub fn table(&self) -> &Arc<SkipTable> {
        &self.table
    }

    /// The wrapped sink.
    pub fn get_ref(&self) -> &W {
        &self.sink
    }
}

impl<W: Write> Write for Redactor<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_chunk(buf)
    }

    /// Flushes the sink only. The retained tail stays put until [`Redactor::finish`].
    fn flush(&mut self) -> io::Result<()> {
        self.sink.flush()
    }
}

/// No match can end before the shortest needle fits.
fn initial_offset(table: &SkipTable) -> usize {
    table.min_len().saturating_sub(1)
}

/// With `cursor` as the next position to examine, any future match starts at or
/// after the returned chunk index, so everything before it is final.
fn settled_before(cursor: usize, max_len: usize) -> usize {
    (cursor + 1).saturating_sub(max_len)
}

/// Checks whether `needle` ends right before `cursor`, reading the bytes of the
/// previous chunks from `history` when the needle starts before this chunk.
fn locate(needle: &[u8], chunk: &[u8], cursor: usize, history: &[u8]) -> Option<MatchStart> {
    if let Some(start) = cursor.checked_sub(needle.len()) {
        return (chunk[start..cursor] == *needle).then_some(MatchStart::Chunk(start));
    }

    let from_tail = needle.len() - cursor;
    if from_tail > history.len() {
        return None;
    }
    let (head, rest) = needle.split_at(from_tail);
    let tail = &history[history.len() - from_tail..];
    (tail == head && chunk[..cursor] == *rest).then_some(MatchStart::Tail(from_tail))
}

/// Keeps the last `keep` bytes of the raw stream in `history`.
fn remember(history: &mut Vec<u8>, chunk: &[u8], keep: usize) {
    if chunk.len() >= keep {
        history.clear();
        history.extend_from_slice(&chunk[chunk.len() - keep..]);
    } else {
        history.extend_from_slice(chunk);
        let excess = history.len().saturating_sub(keep);
        history.drain(..excess);
    }
}
