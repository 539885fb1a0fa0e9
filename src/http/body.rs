//! Response bodies
//!
//! `FileStream` reads a file window in fixed 8 KiB chunks as hyper polls for
//! data. hyper stops polling and drops the body as soon as a write to the
//! client fails, which closes the file. A read error or premature end of file
//! ends the body early; the status line has already gone out by then, so the
//! only trace is a log line.

use crate::logger::{self, PendingAccessLog};
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full};
use hyper::body::{Body, Bytes, Frame, SizeHint};
use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncSeekExt, ReadBuf};

/// Bytes read from the file per poll
pub const CHUNK_SIZE: usize = 8 * 1024;

/// Body type of every response the server produces
pub type ResponseBody = UnsyncBoxBody<Bytes, io::Error>;

/// Empty body (HEAD, 204, 416)
pub fn empty_body() -> ResponseBody {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// In-memory body
pub fn full_body(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Streams `length` bytes of a file starting at a fixed offset
#[derive(Debug)]
pub struct FileStream {
    file: File,
    path: PathBuf,
    buffer: Box<[u8]>,
    length: u64,
    sent: u64,
    finished: bool,
    access: Option<PendingAccessLog>,
}

impl FileStream {
    /// Open `path` and position it at `start`.
    ///
    /// The handle lives exactly as long as the returned stream.
    pub async fn open(path: &Path, start: u64, length: u64) -> io::Result<Self> {
        let mut file = File::open(path).await?;
        if start > 0 {
            file.seek(SeekFrom::Start(start)).await?;
        }

        Ok(Self {
            file,
            path: path.to_path_buf(),
            buffer: vec![0; CHUNK_SIZE].into_boxed_slice(),
            length,
            sent: 0,
            finished: length == 0,
            access: None,
        })
    }

    /// Attach the access log record written when the stream ends
    #[must_use]
    pub fn with_access_log(mut self, access: Option<PendingAccessLog>) -> Self {
        self.access = access;
        self
    }

    /// Bytes handed to hyper so far
    pub const fn bytes_sent(&self) -> u64 {
        self.sent
    }

    const fn remaining(&self) -> u64 {
        self.length - self.sent
    }

    pub fn into_body(self) -> ResponseBody {
        self.boxed_unsync()
    }
}

impl Body for FileStream {
    type Data = Bytes;
    type Error = io::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, io::Error>>> {
        let this = self.get_mut();
        if this.finished {
            return Poll::Ready(None);
        }

        let want = usize::try_from(this.remaining()).map_or(CHUNK_SIZE, |r| r.min(CHUNK_SIZE));
        let mut read_buf = ReadBuf::new(&mut this.buffer[..want]);

        match Pin::new(&mut this.file).poll_read(cx, &mut read_buf) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Err(e)) => {
                this.finished = true;
                logger::log_error(&format!(
                    "Read failed on '{}' after {} bytes: {e}",
                    this.path.display(),
                    this.sent
                ));
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(Ok(())) => {
                let filled = read_buf.filled();
                if filled.is_empty() {
                    // File shrank underneath us
                    this.finished = true;
                    return Poll::Ready(None);
                }

                let chunk = Bytes::copy_from_slice(filled);
                this.sent += chunk.len() as u64;
                if this.remaining() == 0 {
                    this.finished = true;
                }
                Poll::Ready(Some(Ok(Frame::data(chunk))))
            }
        }
    }

    fn is_end_stream(&self) -> bool {
        self.finished
    }

    fn size_hint(&self) -> SizeHint {
        SizeHint::with_exact(self.remaining())
    }
}

impl Drop for FileStream {
    fn drop(&mut self) {
        if self.sent < self.length {
            logger::log_warning(&format!(
                "Stream interrupted for '{}': sent {} of {} bytes",
                self.path.display(),
                self.sent,
                self.length
            ));
        }
        if let Some(access) = self.access.take() {
            access.finish(self.sent);
        }
    }
}
