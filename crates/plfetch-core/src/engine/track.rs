//! Streaming one track to disk.

use std::io::{ErrorKind, Read, Write};
use std::path::Path;
use std::time::Instant;

use super::{DownloadEngine, EngineEvent, SkipReason, TrackOutcome, CHUNK_SIZE};
use crate::error::FetchError;
use crate::progress::ThroughputWindow;
use crate::transport::TransportError;

/// Why the chunk loop stopped.
enum LoopEnd {
    /// Stream reported no more data (or failed to read).
    Drained,
    WriteFailed,
    Cancelled,
}

impl DownloadEngine {
    /// Fetch `url` into `dest`.
    ///
    /// Outer error: the run must stop. Inner error: the track was skipped.
    pub(super) fn fetch_track(
        &self,
        url: &str,
        dest: &Path,
    ) -> Result<Result<TrackOutcome, SkipReason>, FetchError> {
        self.reporter.report(EngineEvent::TrackStarted {
            url: url.to_string(),
            dest: dest.to_path_buf(),
        });

        let mut stream = match self.transport.open(url) {
            Ok(s) => s,
            Err(TransportError::Aborted) if self.cancel.is_cancelled() => {
                return Err(self.interrupted());
            }
            Err(source) => {
                let err = FetchError::Address {
                    url: url.to_string(),
                    source,
                };
                tracing::warn!("{}", err);
                return Ok(Err(SkipReason::Unreachable(err.to_string())));
            }
        };

        let declared = stream.declared_length().filter(|n| *n > 0);
        if declared.is_none() {
            self.reporter.report(EngineEvent::SizeUnknown {
                dest: dest.to_path_buf(),
            });
        }

        let _in_flight = self.current.begin(dest);
        let mut file = (self.open_output)(dest).map_err(|source| {
            tracing::warn!("cannot create {}: {}", dest.display(), source);
            FetchError::OutputCreate {
                path: dest.to_path_buf(),
                source,
            }
        })?;

        let (bytes, end) = self.pump(stream.as_mut(), file.as_mut(), dest, declared);
        drop(file);
        drop(stream);

        let incomplete = match end {
            LoopEnd::Cancelled => return Err(self.interrupted()),
            LoopEnd::WriteFailed => true,
            LoopEnd::Drained => matches!(declared, Some(total) if bytes < total),
        };

        if incomplete {
            tracing::warn!(
                "incomplete download of {} ({} of {:?} bytes), removing",
                dest.display(),
                bytes,
                declared
            );
            if let Err(e) = std::fs::remove_file(dest) {
                tracing::warn!("could not remove {}: {}", dest.display(), e);
            }
            return Ok(Ok(TrackOutcome::Incomplete { bytes, declared }));
        }

        tracing::debug!("completed {} ({} bytes)", dest.display(), bytes);
        Ok(Ok(TrackOutcome::Completed { bytes }))
    }

    /// Copy `stream` into `out` chunk by chunk, reporting status every `progress_every` chunks.
    fn pump<R: Read + ?Sized, W: Write + ?Sized>(
        &self,
        stream: &mut R,
        out: &mut W,
        dest: &Path,
        declared: Option<u64>,
    ) -> (u64, LoopEnd) {
        let mut window = ThroughputWindow::new();
        let mut buf = [0u8; CHUNK_SIZE];
        let mut total: u64 = 0;
        let mut chunk_index: u64 = 0;

        loop {
            if self.cancel.is_cancelled() {
                return (total, LoopEnd::Cancelled);
            }

            let started = Instant::now();
            let n = match stream.read(&mut buf) {
                Ok(0) => return (total, LoopEnd::Drained),
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    if self.cancel.is_cancelled() {
                        return (total, LoopEnd::Cancelled);
                    }
                    tracing::warn!("read failed for {}: {}", dest.display(), e);
                    return (total, LoopEnd::Drained);
                }
            };
            window.record_sample(started.elapsed(), n);

            if let Err(e) = out.write_all(&buf[..n]) {
                let err = FetchError::Write(e);
                tracing::warn!("{} ({})", err, dest.display());
                self.reporter.report(EngineEvent::WriteFailed {
                    dest: dest.to_path_buf(),
                    message: err.to_string(),
                });
                return (total, LoopEnd::WriteFailed);
            }
            total += n as u64;

            if chunk_index % self.progress_every == 0 {
                self.reporter
                    .report(EngineEvent::Progress(window.current_status(total, declared)));
            }
            chunk_index += 1;
        }
    }
}
