//! Run coordination
//!
//! The [`Coordinator`] is the context object of one invocation. It owns the
//! compiled settings, the fetcher and probe, the link cache and the run state,
//! drives the crawl phase and the validation phase, and turns whatever state
//! was reached into a [`RunReport`], also when the run was cut short.

use crate::config::RunSettings;
use crate::crawler::fetcher::{build_http_client, HttpPageFetcher, PageFetcher};
use crate::crawler::parser::{extractor_for, ContentExtractor};
use crate::crawler::probe::{HttpLinkProbe, LinkProbe};
use crate::crawler::site::SiteCrawler;
use crate::output::{Counters, IssueRecord, ReportSink, Severity};
use crate::state::{Breadcrumbs, ExternalLinkCache, RunState};
use crate::validator::LinkValidator;
use crate::CheckError;
use chrono::{DateTime, Utc};
use futures::FutureExt;
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};

/// How a run ended
#[derive(Debug)]
pub enum RunOutcome {
    /// Both phases ran to the end
    Completed,

    /// A fatal condition stopped the run (no sitemap, nothing in scope)
    Aborted(CheckError),

    /// Interrupted by the user
    Interrupted,

    /// The overall run timeout elapsed
    TimedOut,

    /// The run panicked
    Failed(String),
}

impl RunOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, RunOutcome::Completed)
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Completed => write!(f, "completed"),
            RunOutcome::Aborted(e) => write!(f, "aborted: {}", e),
            RunOutcome::Interrupted => write!(f, "interrupted"),
            RunOutcome::TimedOut => write!(f, "timed out"),
            RunOutcome::Failed(message) => write!(f, "failed: {}", message),
        }
    }
}

/// Everything a finished (or stopped) run produced
#[derive(Debug)]
pub struct RunReport {
    pub counters: Counters,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,

    /// Distinct normal links with a resolved outcome
    pub unique_links: usize,

    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
    pub issues: Vec<IssueRecord>,
    pub trail: Breadcrumbs,
    pub outcome: RunOutcome,

    /// Process exit status: 0 on success, 1 otherwise
    pub exit_code: u8,
}

/// Owns and drives one run
pub struct Coordinator<F, P> {
    settings: RunSettings,
    fetcher: F,
    probe: P,
    extractor: Box<dyn ContentExtractor>,
    cache: ExternalLinkCache,
    state: RunState,
    started_at: DateTime<Utc>,
    start_time: Instant,
}

impl Coordinator<HttpPageFetcher, HttpLinkProbe> {
    /// Creates a coordinator that talks HTTP
    ///
    /// One client is shared by the page fetcher and the link probe.
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(CheckError)` - The HTTP client could not be built
    pub fn from_settings(settings: RunSettings) -> Result<Self, CheckError> {
        let client = build_http_client(&settings.network)?;
        let fetcher = HttpPageFetcher::new(client.clone(), settings.page_timeout());
        let probe = HttpLinkProbe::new(client, settings.probe_timeout(), settings.sitemap_timeout());
        Ok(Self::new(settings, fetcher, probe))
    }
}

impl<F: PageFetcher, P: LinkProbe> Coordinator<F, P> {
    /// Creates a coordinator whose issue log is printed as it is recorded
    pub fn new(settings: RunSettings, fetcher: F, probe: P) -> Self {
        let sink = ReportSink::new(settings.severity.clone(), settings.quiet);
        Self::with_sink(settings, fetcher, probe, sink)
    }

    /// Creates a coordinator that records issues without printing them
    pub fn silent(settings: RunSettings, fetcher: F, probe: P) -> Self {
        let sink = ReportSink::silent(settings.severity.clone(), settings.quiet);
        Self::with_sink(settings, fetcher, probe, sink)
    }

    fn with_sink(settings: RunSettings, fetcher: F, probe: P, sink: ReportSink) -> Self {
        Self {
            extractor: extractor_for(settings.extractor),
            settings,
            fetcher,
            probe,
            cache: ExternalLinkCache::new(),
            state: RunState::new(sink),
            started_at: Utc::now(),
            start_time: Instant::now(),
        }
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    /// State reached so far
    pub fn state(&self) -> &RunState {
        &self.state
    }

    /// Runs the crawl phase and then the validation phase
    ///
    /// A fatal sitemap condition is recorded as a run-level issue and
    /// returned. Page and link problems never end the run; they are recorded
    /// as issues.
    pub async fn run(&mut self) -> Result<(), CheckError> {
        self.started_at = Utc::now();
        self.start_time = Instant::now();
        tracing::info!(
            "Checking {} (sitemap: {})",
            self.settings.scope.path(),
            self.settings.sitemap_url
        );

        let crawler = SiteCrawler::new(
            &self.settings,
            &self.fetcher,
            &self.probe,
            self.extractor.as_ref(),
        );
        if let Err(e) = crawler.build(&mut self.state).await {
            tracing::error!("{}", e);
            if let Some(kind) = e.issue_kind() {
                let link = match &e {
                    CheckError::SitemapUnavailable { url, .. } => url.clone(),
                    _ => self.settings.scope.path(),
                };
                self.state.sink.report_run_level(kind, &link, Some(e.to_string()));
            }
            return Err(e);
        }

        let mut validator = LinkValidator::new(
            &self.settings,
            &self.fetcher,
            &self.probe,
            self.extractor.as_ref(),
            &self.cache,
        );
        validator.validate(&mut self.state).await;

        Ok(())
    }

    /// Runs to completion, the run timeout, or a panic, whichever comes first
    pub async fn execute(&mut self) -> RunOutcome {
        let run_timeout = self.settings.run_timeout();
        let run = AssertUnwindSafe(self.run()).catch_unwind();

        let deadline = async {
            match run_timeout {
                Some(timeout) => tokio::time::sleep(timeout).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            result = run => match result {
                Ok(Ok(())) => RunOutcome::Completed,
                Ok(Err(e)) => RunOutcome::Aborted(e),
                Err(panic) => RunOutcome::Failed(panic_message(panic.as_ref())),
            },
            _ = deadline => RunOutcome::TimedOut,
        }
    }

    /// Turns the state reached into a report
    pub fn finish(mut self, outcome: RunOutcome) -> RunReport {
        if !outcome.is_completed() {
            tracing::warn!("Run {}", outcome);
            self.state.sink.mark_aborted();
        }

        let sink = &self.state.sink;
        RunReport {
            counters: self.state.counters.clone(),
            started_at: self.started_at,
            elapsed: self.start_time.elapsed(),
            unique_links: self.cache.len(),
            errors: sink.count(Severity::Error),
            warnings: sink.count(Severity::Warning),
            infos: sink.count(Severity::Info),
            issues: sink.issues().to_vec(),
            trail: self.state.trail.clone(),
            exit_code: sink.exit_code(),
            outcome,
        }
    }
}

/// Extracts the message of a caught panic
fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
