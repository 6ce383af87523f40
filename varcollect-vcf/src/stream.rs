use std::collections::VecDeque;
use std::io::{self, Read};

use flate2::read::MultiGzDecoder;

use crate::error::{Result, VcfError};

const DECODE_BUF_SIZE: usize = 8 * 1024;

/// `Read` adapter over a finite sequence of binary chunks.
struct ChunkReader<I> {
    chunks: I,
    current: Vec<u8>,
    offset: usize,
}

impl<I> ChunkReader<I> {
    fn new(chunks: I) -> Self {
        ChunkReader {
            chunks,
            current: Vec::new(),
            offset: 0,
        }
    }
}

impl<I> Read for ChunkReader<I>
where
    I: Iterator<Item = io::Result<Vec<u8>>>,
{
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.offset >= self.current.len() {
            match self.chunks.next() {
                Some(chunk) => {
                    self.current = chunk?;
                    self.offset = 0;
                }
                None => return Ok(0),
            }
        }
        let available = &self.current[self.offset..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.offset += n;
        Ok(n)
    }
}

///
/// Lazily turn a stream of gzip-compressed chunks into decoded text lines.
///
/// Chunks are decompressed as they arrive; a partial line split across chunk
/// boundaries is carried over until its newline shows up. After the input is
/// exhausted the final fragment is yielded exactly once, even when it is
/// empty, so a trailing unterminated line is never lost. Corrupt compressed
/// data surfaces as [`VcfError::Decompression`]; a failing chunk source
/// keeps its [`VcfError::Io`] identity.
///
pub struct GzipLines<I>
where
    I: Iterator<Item = io::Result<Vec<u8>>>,
{
    decoder: MultiGzDecoder<ChunkReader<I>>,
    bytes: Vec<u8>,
    previous: String,
    ready: VecDeque<String>,
    finished: bool,
}

impl<I> GzipLines<I>
where
    I: Iterator<Item = io::Result<Vec<u8>>>,
{
    fn fill(&mut self) -> Result<()> {
        let mut buf = [0u8; DECODE_BUF_SIZE];
        loop {
            // Corrupt compressed data surfaces from the decoder as
            // InvalidInput/InvalidData; anything else is the chunk source
            // failing (e.g. a dropped connection) and stays an IO error.
            let n = self.decoder.read(&mut buf).map_err(|e| match e.kind() {
                io::ErrorKind::InvalidInput | io::ErrorKind::InvalidData => {
                    VcfError::Decompression(e.to_string())
                }
                _ => VcfError::Io(e),
            })?;
            if n == 0 {
                self.finished = true;
                if !self.bytes.is_empty() {
                    return Err(VcfError::Decompression(
                        "stream ends inside a UTF-8 sequence".to_string(),
                    ));
                }
                // Trailing fragment, yielded even when empty.
                self.ready.push_back(std::mem::take(&mut self.previous));
                return Ok(());
            }

            self.bytes.extend_from_slice(&buf[..n]);
            let valid_len = match std::str::from_utf8(&self.bytes) {
                Ok(_) => self.bytes.len(),
                // A codepoint split across reads is completed by the next one.
                Err(e) if e.error_len().is_none() => e.valid_up_to(),
                Err(e) => return Err(VcfError::Decompression(e.to_string())),
            };
            let decoded: Vec<u8> = self.bytes.drain(..valid_len).collect();
            let text = String::from_utf8(decoded)
                .map_err(|e| VcfError::Decompression(e.to_string()))?;

            self.previous.push_str(&text);
            while let Some(newline) = self.previous.find('\n') {
                let rest = self.previous.split_off(newline + 1);
                self.previous.pop();
                self.ready
                    .push_back(std::mem::replace(&mut self.previous, rest));
            }
            if !self.ready.is_empty() {
                return Ok(());
            }
        }
    }
}

impl<I> Iterator for GzipLines<I>
where
    I: Iterator<Item = io::Result<Vec<u8>>>,
{
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.ready.is_empty() {
            if self.finished {
                return None;
            }
            if let Err(e) = self.fill() {
                self.finished = true;
                return Some(Err(e));
            }
        }
        self.ready.pop_front().map(Ok)
    }
}

///
/// Uncompress a gzip chunk stream into lines of text.
///
/// # Arguments
/// - chunks: finite, non-restartable sequence of compressed binary chunks
///
pub fn stream_gzip_decompress_lines<I>(chunks: I) -> GzipLines<I>
where
    I: Iterator<Item = io::Result<Vec<u8>>>,
{
    GzipLines {
        decoder: MultiGzDecoder::new(ChunkReader::new(chunks)),
        bytes: Vec::new(),
        previous: String::new(),
        ready: VecDeque::new(),
        finished: false,
    }
}
