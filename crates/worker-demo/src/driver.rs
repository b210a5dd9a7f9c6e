use std::{
    fmt,
    io::{self, Write},
    path::{Path, PathBuf},
};

use futures_util::{Stream, StreamExt};
use thiserror::Error;
use worker_ox::{
    Worker, WorkerRequest, WorkerRequestError, WorkerResponse, data_uri, streaming::line_to_str,
};

use crate::config::DriverConfig;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("could not read image {}: {source}", .path.display())]
    ReadImage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not write image {}: {source}", .path.display())]
    WriteImage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Worker(#[from] WorkerRequestError),

    #[error("could not write output: {0}")]
    Output(#[source] io::Error),
}

/// What a successful run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Printed this many non-empty stream lines.
    Streamed { lines: usize },
    /// Printed a text reply.
    Text,
    /// Printed the reply and wrote the image it carried.
    ImageSaved(PathBuf),
}

/// Assemble the request body, reading and encoding the image if one is configured.
pub fn build_request(config: &DriverConfig) -> Result<WorkerRequest, DriverError> {
    let image = config
        .image_path
        .as_deref()
        .map(|path| {
            data_uri::jpeg_from_path(path).map_err(|source| DriverError::ReadImage {
                path: path.to_path_buf(),
                source,
            })
        })
        .transpose()?;

    Ok(WorkerRequest::builder()
        .prompt(config.prompt.as_str())
        .system_prompt(config.system_prompt.as_str())
        .stream(config.stream)
        .maybe_image(image)
        .build())
}

/// Send one request and print or save whatever comes back.
pub async fn run<W: Write>(config: &DriverConfig, out: &mut W) -> Result<Outcome, DriverError> {
    let request = build_request(config)?;
    let worker = Worker::new(config.api_url.as_str(), config.api_key.as_str());

    log::info!(
        "sending prompt to {} (stream: {}, image: {})",
        worker.base_url(),
        request.stream,
        request.has_image()
    );

    if config.stream {
        let stream = worker.stream(&request).await?;
        if let Some(model) = stream.model_used() {
            log::info!("streaming from {model}");
        }
        let lines = print_stream(stream, out).await?;
        Ok(Outcome::Streamed { lines })
    } else {
        let response = worker.send(&request).await?;
        handle_response(&response, &config.output_path, out)
    }
}

/// Print each non-empty line as soon as it arrives.
pub async fn print_stream<S, L, W>(mut lines: S, out: &mut W) -> Result<usize, DriverError>
where
    S: Stream<Item = Result<L, WorkerRequestError>> + Unpin,
    L: AsRef<[u8]>,
    W: Write,
{
    emit(out, format_args!("Streaming output:"))?;

    let mut printed = 0;
    while let Some(line) = lines.next().await {
        let line = line?;
        if line.as_ref().is_empty() {
            continue;
        }
        emit(out, format_args!("{}", line_to_str(line.as_ref())?))?;
        printed += 1;
    }

    log::debug!("stream closed after {printed} lines");
    Ok(printed)
}

/// Print the reply text and write out any image it carries.
pub fn handle_response<W: Write>(
    response: &WorkerResponse,
    output_path: &Path,
    out: &mut W,
) -> Result<Outcome, DriverError> {
    let text = response.text();
    emit(
        out,
        format_args!("AI Response: {}", text.as_deref().unwrap_or("null")),
    )?;

    let Some(image) = response.decode_image() else {
        return Ok(Outcome::Text);
    };
    let bytes = image.map_err(WorkerRequestError::from)?;

    std::fs::write(output_path, &bytes).map_err(|source| DriverError::WriteImage {
        path: output_path.to_path_buf(),
        source,
    })?;
    log::info!("wrote {} bytes to {}", bytes.len(), output_path.display());

    emit(
        out,
        format_args!("✅ Image saved as {}", output_path.display()),
    )?;
    Ok(Outcome::ImageSaved(output_path.to_path_buf()))
}

/// Print a failure the way the run reports it; never fails the process.
pub fn report<W: Write>(err: &DriverError, out: &mut W) -> io::Result<()> {
    match err {
        DriverError::Worker(WorkerRequestError::Api { error, details, .. }) => writeln!(
            out,
            "Error: {} - {}",
            error.as_deref().unwrap_or("None"),
            details.as_deref().unwrap_or("None")
        ),
        DriverError::Worker(WorkerRequestError::Http { source, .. }) => {
            writeln!(out, "HTTP Error: {source}")
        }
        other => writeln!(out, "Failed: {other}"),
    }?;
    out.flush()
}

fn emit<W: Write>(out: &mut W, line: fmt::Arguments<'_>) -> Result<(), DriverError> {
    writeln!(out, "{line}")
        .and_then(|()| out.flush())
        .map_err(DriverError::Output)
}
