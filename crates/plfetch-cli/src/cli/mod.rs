//! CLI for the plfetch playlist downloader.

mod console;

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use plfetch_core::config;
use plfetch_core::transport::CurlTransport;
use plfetch_core::{CancelToken, DownloadEngine, FetchError, PlaylistKind, PlaylistSource};

use console::ConsoleReporter;

/// Top-level CLI: exactly one playlist source plus an optional name filter.
#[derive(Debug, Parser)]
#[command(name = "plfetch", version)]
#[command(about = "Download every track of an XSPF or M3U playlist", long_about = None)]
#[command(group(
    ArgGroup::new("playlist")
        .required(true)
        .args(["xspf_playlist", "m3u_playlist"])
))]
pub struct Cli {
    /// XSPF playlist file or URL.
    #[arg(short = 'x', long, value_name = "PATH|URL")]
    pub xspf_playlist: Option<String>,

    /// M3U playlist file or URL.
    #[arg(short = 'm', long, value_name = "PATH|URL")]
    pub m3u_playlist: Option<String>,

    /// Only download tracks whose output path contains this substring.
    #[arg(short = 's', long, value_name = "TEXT")]
    pub file_name_substring: Option<String>,
}

impl Cli {
    /// The playlist selected on the command line.
    pub fn source(&self) -> Option<PlaylistSource> {
        match (&self.xspf_playlist, &self.m3u_playlist) {
            (Some(x), _) => Some(PlaylistSource::new(PlaylistKind::Xspf, x.as_str())),
            (None, Some(m)) => Some(PlaylistSource::new(PlaylistKind::M3u, m.as_str())),
            (None, None) => None,
        }
    }

    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        // The arg group makes one source mandatory; clap has already exited otherwise.
        let source = cli.source().context("no playlist given")?;

        let cancel = CancelToken::new();
        let on_interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupt received");
                on_interrupt.cancel();
            }
        });

        let transport = CurlTransport::new(&cfg, cancel.clone());
        let engine = DownloadEngine::new(Box::new(transport), cancel)
            .with_config(&cfg)
            .with_name_filter(cli.file_name_substring)
            .with_reporter(Box::new(ConsoleReporter));

        let result = tokio::task::spawn_blocking(move || engine.run(&source))
            .await
            .context("download task failed")?;

        match result {
            Ok(summary) => {
                tracing::info!(
                    "'{}': {} of {} track(s) downloaded",
                    summary.title,
                    summary.completed,
                    summary.urls_found
                );
                Ok(())
            }
            Err(err @ FetchError::Interrupted { .. }) => {
                // Finish the in-place progress line before the error is printed.
                println!();
                Err(err.into())
            }
            Err(err) => Err(err.into()),
        }
    }
}
