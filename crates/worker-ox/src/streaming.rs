use std::{
    pin::Pin,
    task::{Context, Poll},
};

use bytes::Bytes;
use futures_util::{Stream, StreamExt, stream::BoxStream};
use serde::Deserialize;

use crate::{error::WorkerRequestError, response::StreamChunk};

/// Header the worker uses to report which model produced a stream.
pub const MODEL_USED_HEADER: &str = "x-model-used";

type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>;

/// Splits a response body into newline-delimited lines as chunks arrive.
///
/// Lines are yielded without their terminator (`\n` or `\r\n`). Empty lines are
/// yielded too; callers decide whether they matter.
pub struct LineReader {
    byte_stream: ByteStream,
    buffer: Vec<u8>,
    done: bool,
}

impl LineReader {
    pub fn new(response: reqwest::Response) -> Self {
        Self::from_stream(response.bytes_stream())
    }

    pub fn from_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static,
    {
        Self {
            byte_stream: Box::pin(stream),
            buffer: Vec::new(),
            done: false,
        }
    }

    /// Next complete line, or `None` once the body is exhausted.
    pub async fn next_line(&mut self) -> Result<Option<Bytes>, WorkerRequestError> {
        loop {
            if let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
                let mut line = self.buffer.drain(..=pos).collect::<Vec<u8>>();
                line.pop();
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                return Ok(Some(Bytes::from(line)));
            }

            if self.done {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                // Body ended without a trailing newline
                let mut line = std::mem::take(&mut self.buffer);
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                return Ok(Some(Bytes::from(line)));
            }

            match self.byte_stream.next().await {
                Some(chunk) => self.buffer.extend_from_slice(&chunk?),
                None => self.done = true,
            }
        }
    }

    pub fn into_stream(self) -> BoxStream<'static, Result<Bytes, WorkerRequestError>> {
        let mut reader = self;

        Box::pin(async_stream::try_stream! {
            while let Some(line) = reader.next_line().await? {
                yield line;
            }
        })
    }
}

/// Incremental decoder for server-sent events carried one line at a time.
pub struct SseDecoder {
    data_lines: Vec<String>,
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SseDecoder {
    pub fn new() -> Self {
        Self {
            data_lines: Vec::new(),
        }
    }

    /// Feed one line; returns an event when the line completes one.
    pub fn push_line<T: for<'de> Deserialize<'de>>(
        &mut self,
        line: &str,
    ) -> Result<Option<T>, WorkerRequestError> {
        let trimmed = line.trim_end();

        if trimmed.is_empty() {
            return self.finish();
        }

        if trimmed.starts_with(':') {
            return Ok(None);
        }

        if let Some(rest) = trimmed.strip_prefix("data:") {
            let data = rest.trim_start();

            if data == "[DONE]" {
                self.data_lines.clear();
            } else if !data.is_empty() {
                self.data_lines.push(data.to_string());
            }
        }

        // event:, id:, retry: carry nothing we use
        Ok(None)
    }

    /// Flush pending data lines as a final event.
    pub fn finish<T: for<'de> Deserialize<'de>>(&mut self) -> Result<Option<T>, WorkerRequestError> {
        if self.data_lines.is_empty() {
            return Ok(None);
        }

        let payload = self.data_lines.join("\n");
        self.data_lines.clear();

        let event = serde_json::from_str(&payload).map_err(|e| {
            WorkerRequestError::InvalidEventData(format!("JSON parse error: {e}"))
        })?;

        Ok(Some(event))
    }
}

/// Decode a line as UTF-8 text.
pub fn line_to_str(line: &[u8]) -> Result<&str, WorkerRequestError> {
    std::str::from_utf8(line)
        .map_err(|e| WorkerRequestError::InvalidEventData(format!("line is not UTF-8: {e}")))
}

/// Streaming reply: raw body lines plus the model the worker reported.
pub struct WorkerStream {
    model_used: Option<String>,
    lines: BoxStream<'static, Result<Bytes, WorkerRequestError>>,
}

impl WorkerStream {
    pub(crate) fn new(response: reqwest::Response) -> Self {
        let model_used = response
            .headers()
            .get(MODEL_USED_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        Self {
            model_used,
            lines: LineReader::new(response).into_stream(),
        }
    }

    pub fn model_used(&self) -> Option<&str> {
        self.model_used.as_deref()
    }

    /// Parse the lines as SSE and yield the token chunks.
    pub fn events(self) -> BoxStream<'static, Result<StreamChunk, WorkerRequestError>> {
        let mut lines = self.lines;

        Box::pin(async_stream::try_stream! {
            let mut decoder = SseDecoder::new();

            while let Some(line) = lines.next().await {
                let line = line?;
                if let Some(chunk) = decoder.push_line::<StreamChunk>(line_to_str(&line)?)? {
                    yield chunk;
                }
            }

            if let Some(chunk) = decoder.finish::<StreamChunk>()? {
                yield chunk;
            }
        })
    }
}

impl Stream for WorkerStream {
    type Item = Result<Bytes, WorkerRequestError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.lines.poll_next_unpin(cx)
    }
}

impl std::fmt::Debug for WorkerStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerStream")
            .field("model_used", &self.model_used)
            .finish_non_exhaustive()
    }
}
