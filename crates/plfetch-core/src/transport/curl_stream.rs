//! libcurl-backed streaming GET.
//!
//! libcurl pushes body data through a write callback, while the engine pulls
//! fixed-size chunks. Each transfer runs on its own thread and forwards
//! headers and body blocks over a bounded channel; [`CurlStream`] turns the
//! channel back into a `Read`.

use std::cell::Cell;
use std::io::{self, Read};
use std::str;
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::thread;
use std::time::Duration;

use super::{TrackStream, Transport, TransportError};
use crate::config::FetchConfig;
use crate::control::CancelToken;

/// Body blocks buffered between the curl thread and the reader.
const CHANNEL_DEPTH: usize = 16;

enum Message {
    /// Final response headers are in; carries `Content-Length` if sent.
    Headers(Option<u64>),
    Data(Vec<u8>),
    Done(Result<(), TransportError>),
}

/// Options copied out of [`FetchConfig`] for each transfer thread.
#[derive(Debug, Clone)]
struct CurlOptions {
    connect_timeout: Duration,
    max_redirections: u32,
    low_speed: Option<(u32, Duration)>,
    user_agent: Option<String>,
}

/// Transport that fetches http(s), ftp, file and other libcurl-supported URLs.
#[derive(Debug, Clone)]
pub struct CurlTransport {
    opts: CurlOptions,
    cancel: CancelToken,
}

impl CurlTransport {
    /// Transfers in flight abort as soon as `cancel` is set.
    pub fn new(cfg: &FetchConfig, cancel: CancelToken) -> Self {
        Self {
            opts: CurlOptions {
                connect_timeout: Duration::from_secs(cfg.connect_timeout_secs),
                max_redirections: cfg.max_redirections,
                low_speed: cfg
                    .low_speed_limit_bytes
                    .map(|limit| (limit, Duration::from_secs(cfg.low_speed_time_secs))),
                user_agent: cfg.user_agent.clone(),
            },
            cancel,
        }
    }
}

impl Transport for CurlTransport {
    fn open(&self, url: &str) -> Result<Box<dyn TrackStream>, TransportError> {
        if url::Url::parse(url).is_err() {
            return Err(TransportError::UnsupportedUrl(url.to_string()));
        }

        let (tx, rx) = mpsc::sync_channel(CHANNEL_DEPTH);
        let url_owned = url.to_string();
        let opts = self.opts.clone();
        let cancel = self.cancel.clone();
        thread::Builder::new()
            .name("plfetch-curl".into())
            .spawn(move || {
                let result = perform(&url_owned, &opts, &cancel, &tx);
                let _ = tx.send(Message::Done(result));
            })?;

        // Wait for either the headers of the final response or an early failure.
        loop {
            match rx.recv() {
                Ok(Message::Headers(declared)) => {
                    return Ok(Box::new(CurlStream {
                        rx,
                        declared,
                        buf: Vec::new(),
                        pos: 0,
                        finished: false,
                    }));
                }
                Ok(Message::Done(Err(e))) => return Err(e),
                Ok(Message::Done(Ok(()))) | Err(_) => {
                    return Ok(Box::new(CurlStream {
                        rx,
                        declared: None,
                        buf: Vec::new(),
                        pos: 0,
                        finished: true,
                    }));
                }
                Ok(Message::Data(_)) => {
                    // perform() always announces headers before the first body block.
                    tracing::warn!("body data before headers for {}", url);
                }
            }
        }
    }
}

/// Runs one GET on the current thread, forwarding everything to `tx`.
fn perform(
    url: &str,
    opts: &CurlOptions,
    cancel: &CancelToken,
    tx: &SyncSender<Message>,
) -> Result<(), TransportError> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(opts.max_redirections)?;
    easy.connect_timeout(opts.connect_timeout)?;
    easy.fail_on_error(true)?;
    easy.progress(true)?;
    if let Some((limit, time)) = opts.low_speed {
        easy.low_speed_limit(limit)?;
        easy.low_speed_time(time)?;
    }
    if let Some(agent) = &opts.user_agent {
        easy.useragent(agent)?;
    }

    let content_length: Cell<Option<u64>> = Cell::new(None);
    let announced = Cell::new(false);

    let result = {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(line) = str::from_utf8(data) {
                let line = line.trim();
                // Each redirect hop starts a new header block.
                if line.starts_with("HTTP/") {
                    content_length.set(None);
                } else if let Some((name, value)) = line.split_once(':') {
                    if name.trim().eq_ignore_ascii_case("content-length") {
                        content_length.set(value.trim().parse::<u64>().ok());
                    }
                }
            }
            true
        })?;
        transfer.write_function(|data| {
            if !announced.replace(true) && tx.send(Message::Headers(content_length.get())).is_err() {
                return Ok(0);
            }
            match tx.send(Message::Data(data.to_vec())) {
                Ok(()) => Ok(data.len()),
                // Reader dropped the stream: abort the transfer.
                Err(_) => Ok(0),
            }
        })?;
        transfer.progress_function(|_, _, _, _| !cancel.is_cancelled())?;
        transfer.perform()
    };

    if let Err(e) = result {
        if e.is_aborted_by_callback() {
            return Err(TransportError::Aborted);
        }
        if e.is_unsupported_protocol() || e.is_url_malformed() {
            return Err(TransportError::UnsupportedUrl(url.to_string()));
        }
        if e.is_http_returned_error() {
            let code = easy.response_code().unwrap_or(0);
            return Err(TransportError::Http(code));
        }
        return Err(TransportError::Curl(e));
    }

    if !announced.get() {
        // Empty body: headers were never announced from the write callback.
        let declared = content_length
            .get()
            .or_else(|| easy.content_length_download().ok().filter(|n| *n >= 0.0).map(|n| n as u64));
        let _ = tx.send(Message::Headers(declared));
    }
    Ok(())
}

/// Reader half of a curl transfer.
struct CurlStream {
    rx: Receiver<Message>,
    declared: Option<u64>,
    buf: Vec<u8>,
    pos: usize,
    finished: bool,
}

impl Read for CurlStream {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        loop {
            if self.pos < self.buf.len() {
                let n = out.len().min(self.buf.len() - self.pos);
                out[..n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
                self.pos += n;
                return Ok(n);
            }
            if self.finished {
                return Ok(0);
            }
            match self.rx.recv() {
                Ok(Message::Data(block)) => {
                    self.buf = block;
                    self.pos = 0;
                }
                Ok(Message::Headers(_)) => {}
                Ok(Message::Done(Ok(()))) | Err(_) => self.finished = true,
                Ok(Message::Done(Err(e))) => {
                    self.finished = true;
                    return Err(io::Error::other(e));
                }
            }
        }
    }
}

impl TrackStream for CurlStream {
    fn declared_length(&self) -> Option<u64> {
        self.declared
    }
}
