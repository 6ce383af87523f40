#[cfg(feature = "http")]
use std::io::{self, BufReader, Read};
use std::path::Path;

#[cfg(feature = "http")]
use ureq::{Error as UreqError, get};

use crate::error::{Result, VcfError};
use crate::reader::VcfReader;
#[cfg(feature = "http")]
use crate::stream::stream_gzip_decompress_lines;

#[cfg(feature = "http")]
const FETCH_CHUNK_SIZE: usize = 64 * 1024;

/// Where variant records come from: a path/URL, or a reader someone already
/// opened.
pub enum VcfSource {
    Path(String),
    Reader(VcfReader),
}

impl From<&str> for VcfSource {
    fn from(value: &str) -> Self {
        VcfSource::Path(value.to_string())
    }
}

impl From<String> for VcfSource {
    fn from(value: String) -> Self {
        VcfSource::Path(value)
    }
}

impl From<&Path> for VcfSource {
    fn from(value: &Path) -> Self {
        VcfSource::Path(value.display().to_string())
    }
}

impl From<VcfReader> for VcfSource {
    fn from(value: VcfReader) -> Self {
        VcfSource::Reader(value)
    }
}

///
/// A resolved record source: header metadata, a record iterator and the
/// path label it was opened from.
///
/// Local files, `http(s)`/`ftp` URLs (plain or gzip-compressed) and
/// pre-opened readers all resolve to the same shape. A network connection
/// opened here is owned by the reader's line source, so dropping the handle
/// releases it on every exit path; [`VcfHandle::close`] makes that explicit
/// and is a no-op for local sources.
///
pub struct VcfHandle {
    /// Path or URL the source was opened from, if there was one.
    pub path: Option<String>,
    pub reader: VcfReader,
}

impl VcfHandle {
    pub fn open(source: impl Into<VcfSource>) -> Result<Self> {
        match source.into() {
            VcfSource::Reader(reader) => Ok(VcfHandle { path: None, reader }),
            VcfSource::Path(path) => {
                let reader = match split_scheme(&path) {
                    None => VcfReader::from_path(Path::new(&path))?,
                    Some((scheme, rest)) => match scheme.as_str() {
                        "file" => VcfReader::from_path(Path::new(file_url_path(rest)))?,
                        "http" | "https" | "ftp" => open_url(&path, &scheme)?,
                        _ => return Err(VcfError::UnsupportedScheme(scheme)),
                    },
                };
                Ok(VcfHandle {
                    path: Some(path),
                    reader,
                })
            }
        }
    }

    /// Release the source. No-op unless a network resource was opened.
    pub fn close(self) {}
}

/// Split `scheme://rest`, lowercasing the scheme. Plain paths return `None`.
pub(crate) fn split_scheme(path: &str) -> Option<(String, &str)> {
    let (scheme, rest) = path.split_once("://")?;
    if scheme.is_empty() || !scheme.chars().all(|c| c.is_ascii_alphanumeric() || c == '+') {
        return None;
    }
    Some((scheme.to_lowercase(), rest))
}

/// Path component of a `file://` URL (the part after any host).
pub(crate) fn file_url_path(rest: &str) -> &str {
    match rest.find('/') {
        Some(slash) => &rest[slash..],
        None => rest,
    }
}

#[cfg(feature = "http")]
fn open_url(url: &str, scheme: &str) -> Result<VcfReader> {
    let mut url_str = url.to_string();
    if scheme == "ftp" {
        log::warn!("ftp is not fully implemented, fetching over http instead");
        url_str = url_str.replacen("ftp://", "http://", 1);
    }

    let response = match get(&url_str).call() {
        Ok(resp) => resp,
        Err(UreqError::StatusCode(code)) => {
            return Err(VcfError::Fetch {
                url: url.to_string(),
                status: code,
            });
        }
        Err(e) => {
            return Err(VcfError::Request {
                url: url.to_string(),
                msg: e.to_string(),
            });
        }
    };
    let body = response.into_body().into_reader();

    if url_str.ends_with(".gz") {
        VcfReader::from_lines(stream_gzip_decompress_lines(byte_chunks(body)))
    } else {
        VcfReader::from_reader(BufReader::new(body))
    }
}

#[cfg(not(feature = "http"))]
fn open_url(url: &str, _scheme: &str) -> Result<VcfReader> {
    Err(VcfError::HttpFeatureDisabled(url.to_string()))
}

/// Turn a streaming body into the chunk sequence the line decoder consumes.
#[cfg(feature = "http")]
fn byte_chunks<R: Read + 'static>(reader: R) -> impl Iterator<Item = io::Result<Vec<u8>>> {
    struct ByteChunks<R> {
        reader: R,
        done: bool,
    }

    impl<R: Read> Iterator for ByteChunks<R> {
        type Item = io::Result<Vec<u8>>;

        fn next(&mut self) -> Option<Self::Item> {
            if self.done {
                return None;
            }
            let mut buf = vec![0u8; FETCH_CHUNK_SIZE];
            match self.reader.read(&mut buf) {
                Ok(0) => {
                    self.done = true;
                    None
                }
                Ok(n) => {
                    buf.truncate(n);
                    Some(Ok(buf))
                }
                Err(e) => {
                    self.done = true;
                    Some(Err(e))
                }
            }
        }
    }

    ByteChunks {
        reader,
        done: false,
    }
}
