//! Multipart/form-data writer
//!
//! The writer records an ordered list of deferred part operations and
//! replays them against a streaming part encoder only when the payload is
//! serialized. Writers are pooled and single-use: serialization drains
//! the operation list, and dropping the writer returns its core to the
//! pool.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use rand::RngCore;

use crate::pool::{Pool, Reuse};

/// Characters that force the boundary token to be quoted in the
/// `multipart/form-data` content type, per the media-type grammar.
const TSPECIALS: &str = "()<>@,;:\\\"/[]?= ";

static WRITER_POOL: Pool<WriterCore> = Pool::new();

/// One recorded part operation, replayed at serialization time.
enum PartOp {
    FieldValue {
        name: String,
        value: String,
    },
    FieldReader {
        name: String,
        reader: Box<dyn Read + Send>,
    },
    FilePath {
        name: String,
        path: PathBuf,
    },
    RawPart {
        headers: Vec<(String, String)>,
        reader: Box<dyn Read + Send>,
    },
}

#[derive(Default)]
struct WriterCore {
    boundary: String,
    ops: Vec<PartOp>,
}

impl Reuse for WriterCore {
    fn reset(&mut self) {
        self.boundary.clear();
        self.ops.clear();
    }
}

/// Builder for a `multipart/form-data` payload.
///
/// Part operations are recorded in call order and perform no I/O until the
/// payload is serialized by the multipart codec; file parts open their
/// file only at that point. Each writer serializes at most once.
pub struct MultipartWriter {
    core: Option<WriterCore>,
}

impl MultipartWriter {
    /// Acquire a writer with a fresh random boundary.
    pub fn new() -> Self {
        let mut core = WRITER_POOL.acquire();
        core.boundary = random_boundary();
        MultipartWriter { core: Some(core) }
    }

    pub fn boundary(&self) -> &str {
        &self.core().boundary
    }

    /// Override the boundary token.
    ///
    /// Tokens must be 1 to 70 characters from the multipart boundary
    /// grammar and must not end with a space. Invalid tokens are rejected
    /// and the current boundary is kept.
    pub fn set_boundary(mut self, boundary: impl Into<String>) -> Self {
        let boundary = boundary.into();
        if valid_boundary(&boundary) {
            self.core_mut().boundary = boundary;
        } else {
            tracing::warn!(boundary = %boundary, "rejecting invalid multipart boundary");
        }
        self
    }

    /// The `Content-Type` value for this writer's payload, quoting the
    /// boundary only when it contains reserved characters or spaces.
    pub fn form_data_content_type(&self) -> String {
        let boundary = self.boundary();
        if boundary.chars().any(|c| TSPECIALS.contains(c)) {
            format!("multipart/form-data; boundary=\"{boundary}\"")
        } else {
            format!("multipart/form-data; boundary={boundary}")
        }
    }

    /// Record a field with a literal value.
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.core_mut().ops.push(PartOp::FieldValue {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Record a field whose value is read from `reader` at serialization
    /// time.
    pub fn field(mut self, name: impl Into<String>, reader: impl Read + Send + 'static) -> Self {
        self.core_mut().ops.push(PartOp::FieldReader {
            name: name.into(),
            reader: Box::new(reader),
        });
        self
    }

    /// Record a file part; the part's filename is the path's base name and
    /// the file is opened at serialization time.
    pub fn file(mut self, name: impl Into<String>, path: impl AsRef<Path>) -> Self {
        self.core_mut().ops.push(PartOp::FilePath {
            name: name.into(),
            path: path.as_ref().to_path_buf(),
        });
        self
    }

    /// Record a part with caller-supplied headers and a raw content stream.
    pub fn part(
        mut self,
        headers: Vec<(String, String)>,
        reader: impl Read + Send + 'static,
    ) -> Self {
        self.core_mut().ops.push(PartOp::RawPart {
            headers,
            reader: Box::new(reader),
        });
        self
    }

    /// Replay the recorded operations in order into `buf` and write the
    /// closing delimiter. The first failing operation aborts the payload.
    pub(crate) fn write_to(&mut self, buf: &mut Vec<u8>) -> io::Result<()> {
        let core = self
            .core
            .as_mut()
            .expect("MultipartWriter is not reusable");
        let boundary = std::mem::take(&mut core.boundary);
        let result = replay(&mut core.ops, &boundary, buf);
        core.boundary = boundary;
        result
    }

    fn core(&self) -> &WriterCore {
        self.core.as_ref().expect("MultipartWriter is not reusable")
    }

    fn core_mut(&mut self) -> &mut WriterCore {
        self.core.as_mut().expect("MultipartWriter is not reusable")
    }
}

impl Default for MultipartWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MultipartWriter {
    fn drop(&mut self) {
        if let Some(core) = self.core.take() {
            WRITER_POOL.release(core);
        }
    }
}

impl fmt::Debug for MultipartWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultipartWriter")
            .field("boundary", &self.core().boundary)
            .field("parts", &self.core().ops.len())
            .finish()
    }
}

fn replay(ops: &mut Vec<PartOp>, boundary: &str, buf: &mut Vec<u8>) -> io::Result<()> {
    let mut encoder = PartEncoder::new(buf, boundary);
    for op in ops.drain(..) {
        match op {
            PartOp::FieldValue { name, value } => {
                encoder.begin_field(&name);
                encoder.content(value.as_bytes());
            }
            PartOp::FieldReader { name, mut reader } => {
                encoder.begin_field(&name);
                encoder.stream(&mut reader)?;
            }
            PartOp::FilePath { name, path } => {
                let filename = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                encoder.begin_file(&name, &filename);
                let mut file = File::open(&path)?;
                encoder.stream(&mut file)?;
            }
            PartOp::RawPart {
                headers,
                mut reader,
            } => {
                encoder.begin_raw(&headers);
                encoder.stream(&mut reader)?;
            }
        }
    }
    encoder.finish();
    Ok(())
}

/// Streaming encoder for one boundary-delimited payload.
///
/// Layout matches the common multipart wire shape: `--b` before the first
/// part, `\r\n--b` between parts, `\r\n--b--` to close.
struct PartEncoder<'a> {
    buf: &'a mut Vec<u8>,
    boundary: &'a str,
    started: bool,
}

impl<'a> PartEncoder<'a> {
    fn new(buf: &'a mut Vec<u8>, boundary: &'a str) -> Self {
        PartEncoder {
            buf,
            boundary,
            started: false,
        }
    }

    fn begin_field(&mut self, name: &str) {
        let disposition = format!("form-data; name=\"{}\"", escape_quotes(name));
        self.begin_raw(&[("Content-Disposition".to_string(), disposition)]);
    }

    fn begin_file(&mut self, name: &str, filename: &str) {
        let disposition = format!(
            "form-data; name=\"{}\"; filename=\"{}\"",
            escape_quotes(name),
            escape_quotes(filename)
        );
        self.begin_raw(&[
            ("Content-Disposition".to_string(), disposition),
            ("Content-Type".to_string(), "application/octet-stream".to_string()),
        ]);
    }

    fn begin_raw(&mut self, headers: &[(String, String)]) {
        if self.started {
            self.buf.extend_from_slice(b"\r\n");
        }
        self.started = true;
        self.buf.extend_from_slice(b"--");
        self.buf.extend_from_slice(self.boundary.as_bytes());
        self.buf.extend_from_slice(b"\r\n");
        for (name, value) in headers {
            self.buf.extend_from_slice(name.as_bytes());
            self.buf.extend_from_slice(b": ");
            self.buf.extend_from_slice(value.as_bytes());
            self.buf.extend_from_slice(b"\r\n");
        }
        self.buf.extend_from_slice(b"\r\n");
    }

    fn content(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    fn stream(&mut self, reader: &mut dyn Read) -> io::Result<()> {
        reader.read_to_end(self.buf)?;
        Ok(())
    }

    fn finish(self) {
        if self.started {
            self.buf.extend_from_slice(b"\r\n");
        }
        self.buf.extend_from_slice(b"--");
        self.buf.extend_from_slice(self.boundary.as_bytes());
        self.buf.extend_from_slice(b"--\r\n");
    }
}

fn escape_quotes(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn random_boundary() -> String {
    let mut bytes = [0u8; 30];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn valid_boundary(boundary: &str) -> bool {
    if boundary.is_empty() || boundary.len() > 70 {
        return false;
    }
    let last = boundary.len() - 1;
    boundary.char_indices().all(|(i, c)| match c {
        'A'..='Z' | 'a'..='z' | '0'..='9' => true,
        '\'' | '(' | ')' | '+' | '_' | ',' | '-' | '.' | '/' | ':' | '=' | '?' => true,
        ' ' => i != last,
        _ => false,
    })
}
