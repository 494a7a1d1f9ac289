//! Crawl coordinator: the LIST → DETAIL state machine and the worker pool
//!
//! Every seed URL enters the frontier as a LIST item at page 1. List
//! handlers produce detail work and the next listing page; detail handlers
//! produce records. The run ends when the quota is met or the frontier is
//! exhausted; items still in flight when the quota lands become no-ops.

use crate::config::Config;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::frontier::{Frontier, Role, WorkItem};
use crate::document::Document;
use crate::extract::{extract, extract_detail_links, finalize, find_next_page, posting_age_days};
use crate::output::{JobRecord, RecordSink};
use crate::state::CrawlState;
use crate::{HarvestError, Result};
use chrono::Utc;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use url::Url;

/// Orchestrates one harvest run. Cheap to clone; every field is shared.
#[derive(Clone)]
pub struct Coordinator {
    config: Arc<Config>,
    state: Arc<CrawlState>,
    frontier: Arc<Frontier>,
    fetcher: Arc<Fetcher>,
    sink: Arc<dyn RecordSink>,
}

impl Coordinator {
    /// Creates a coordinator and seeds the frontier.
    ///
    /// Each seed URL enters as a LIST item at page 1.
    pub fn new(config: Config, sink: Arc<dyn RecordSink>) -> Result<Self> {
        let state = Arc::new(CrawlState::new(
            config.crawl.results_wanted,
            config.crawl.dedupe,
        ));
        let fetcher = Arc::new(Fetcher::new(&config.http)?);
        let frontier = Arc::new(Frontier::new());

        for seed in config.seed_urls() {
            let url = Url::parse(&seed)?;
            frontier.push(WorkItem::list(url, 1));
        }

        Ok(Self {
            config: Arc::new(config),
            state,
            frontier,
            fetcher,
            sink,
        })
    }

    /// Shared crawl state, exposed for inspection after (or during) a run
    pub fn state(&self) -> &CrawlState {
        &self.state
    }

    /// Runs the worker pool until the frontier is exhausted or the quota is
    /// met, returning the number of records saved.
    pub async fn run(&self) -> Result<usize> {
        tracing::info!(
            quota = self.config.crawl.results_wanted,
            max_pages = self.config.crawl.max_pages,
            concurrency = self.config.crawl.max_concurrency,
            "starting harvest"
        );

        let mut workers = JoinSet::new();
        for worker_id in 0..self.config.crawl.max_concurrency {
            let coordinator = self.clone();
            workers.spawn(async move { coordinator.worker_loop(worker_id).await });
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "worker panicked");
            }
        }

        let saved = self.state.saved();
        tracing::info!(saved, "harvest finished");
        Ok(saved)
    }

    async fn worker_loop(&self, worker_id: usize) {
        // Each taken item releases its in-flight accounting on drop
        while let Some(item) = self.frontier.next().await {
            if let Err(e) = self.handle_item(&item).await {
                // Per-item failures are isolated; the item is abandoned and
                // the frontier keeps going.
                tracing::warn!(worker_id, url = %item.url, error = %e, "work item abandoned");
            }
        }
        tracing::debug!(worker_id, "worker done, frontier exhausted");
    }

    async fn handle_item(&self, item: &WorkItem) -> Result<()> {
        match item.role {
            Role::List { page } => self.handle_list(&item.url, page).await,
            Role::Detail => self.handle_detail(&item.url).await,
        }
    }

    /// LIST state: harvest detail links, then chase pagination
    async fn handle_list(&self, url: &Url, page: u32) -> Result<()> {
        if self.state.quota_reached() {
            return Ok(());
        }

        let crawl = &self.config.crawl;
        sleep_jitter(crawl.list_delay_ms_min, crawl.list_delay_ms_max).await;

        let body = self.fetcher.fetch(url, Role::List { page }).await?;

        // Parse and query inside one scope; the parsed tree is not Send and
        // must not live across an await.
        let (links, next_page) = {
            let doc = Document::parse(&body);
            let links = extract_detail_links(&doc, url, &self.state);
            let next_page = if page < crawl.max_pages {
                find_next_page(&doc, url, page)
            } else {
                None
            };
            (links, next_page)
        };

        let to_take = links.len().min(self.state.remaining());
        tracing::info!(
            page,
            found = links.len(),
            taking = to_take,
            saved = self.state.saved(),
            quota = self.state.quota(),
            "LIST page processed"
        );

        if links.is_empty() {
            tracing::info!(page, url = %url, "no detail links on listing page");
        }

        if crawl.collect_details {
            for link in links.into_iter().take(to_take) {
                self.frontier.push(WorkItem::detail(link));
            }
        } else {
            // Link-only mode: synthesize stub records directly
            for link in links.into_iter().take(to_take) {
                self.claim_and_emit(&JobRecord::stub(link.as_str()))?;
            }
        }

        if !self.state.quota_reached() && page < crawl.max_pages {
            match next_page {
                Some((next_url, stage)) => {
                    tracing::debug!(page = page + 1, %stage, "following pagination");
                    self.frontier.push(WorkItem::list(next_url, page + 1));
                }
                None => {
                    tracing::info!(page, "no next page detected, branch terminates");
                }
            }
        }

        Ok(())
    }

    /// DETAIL state: extract, normalize, age-filter, emit
    async fn handle_detail(&self, url: &Url) -> Result<()> {
        // Quota met while this item sat in the frontier; the primary
        // termination signal, not an error.
        if self.state.quota_reached() {
            return Ok(());
        }

        let crawl = &self.config.crawl;
        sleep_jitter(crawl.detail_delay_ms_min, crawl.detail_delay_ms_max).await;

        let body = self.fetcher.fetch(url, Role::Detail).await?;

        let record = {
            let doc = Document::parse(&body);
            finalize(extract(&doc), url)
        };

        if let Some(max_age) = self.config.search.max_age_days {
            if let Some(posted) = record.date_posted.as_deref() {
                if let Some(age) = posting_age_days(posted, Utc::now().date_naive()) {
                    if age > i64::from(max_age) {
                        tracing::info!(
                            url = %url,
                            age_days = age,
                            title = record.title.as_deref().unwrap_or(""),
                            "skipping old posting"
                        );
                        return Ok(());
                    }
                }
            }
        }

        if self.claim_and_emit(&record)? {
            tracing::info!(
                saved = self.state.saved(),
                quota = self.state.quota(),
                title = record.title.as_deref().unwrap_or(""),
                "DETAIL saved"
            );
        }

        Ok(())
    }

    /// Claims a quota slot and emits the record under it.
    ///
    /// Returns false when the quota is already met. A sink failure returns
    /// the claimed slot before propagating, so `saved` only ever counts
    /// records actually written.
    fn claim_and_emit(&self, record: &JobRecord) -> Result<bool> {
        if !self.state.try_claim() {
            return Ok(false);
        }
        match self.sink.push(record) {
            Ok(()) => Ok(true),
            Err(e) => {
                self.state.release_claim();
                Err(HarvestError::Sink(e.to_string()))
            }
        }
    }
}

/// Sleeps a uniform random duration drawn from the given bounds; the
/// humane-cadence delay applied before every request
async fn sleep_jitter(min_ms: u64, max_ms: u64) {
    let ms = {
        let mut rng = rand::thread_rng();
        rng.gen_range(min_ms..=max_ms.max(min_ms))
    };
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}
