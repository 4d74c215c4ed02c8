//! The long-running loop: walk every query, keep what is new, append it to the log.

use log::{error, info, warn};

use crate::browser::BrowserLauncher;
use crate::config::{MonitorConfig, PacingConfig};
use crate::delay_manager;
use crate::ledger::{Classification, SeenLedger};
use crate::record::JobRecord;
use crate::search_query::SearchQuery;
use crate::sink::RecordSink;
use crate::walker::{PageWalker, StopReason};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    Completed { found: usize, new: usize, stop: StopReason },
    /// The walk failed; counts as zero new results for this cycle.
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct QueryReport {
    pub label: String,
    pub outcome: QueryOutcome,
}

#[derive(Debug, Clone)]
pub struct CycleSummary {
    pub cycle: u64,
    pub queries: Vec<QueryReport>,
}

impl CycleSummary {
    pub fn new_records(&self) -> usize {
        self.queries
            .iter()
            .map(|q| match q.outcome {
                QueryOutcome::Completed { new, .. } => new,
                QueryOutcome::Failed(_) => 0,
            })
            .sum()
    }

    pub fn failures(&self) -> usize {
        self.queries
            .iter()
            .filter(|q| matches!(q.outcome, QueryOutcome::Failed(_)))
            .count()
    }
}

pub struct Monitor<L: BrowserLauncher, S: RecordSink> {
    walker: PageWalker<L>,
    ledger: SeenLedger,
    sink: S,
    pacing: PacingConfig,
    target_count: usize,
    max_cycles: Option<u64>,
}

impl<L: BrowserLauncher, S: RecordSink> Monitor<L, S> {
    pub fn new(launcher: L, sink: S, config: &MonitorConfig) -> Self {
        Monitor {
            walker: PageWalker::new(launcher, config),
            ledger: SeenLedger::new(),
            sink,
            pacing: config.pacing.clone(),
            target_count: config.target_count,
            max_cycles: config.max_cycles,
        }
    }

    pub fn ledger(&self) -> &SeenLedger {
        &self.ledger
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn walker(&self) -> &PageWalker<L> {
        &self.walker
    }

    /// Monitors `queries` cycle after cycle. Without `max_cycles` this only ends
    /// with the process.
    pub async fn run(&mut self, queries: &[SearchQuery]) {
        let mut cycle = 0;
        loop {
            cycle += 1;
            let summary = self.run_cycle(cycle, queries).await;
            info!(
                "Cycle {} finished: {} new postings, {} failed searches, {} postings known",
                summary.cycle,
                summary.new_records(),
                summary.failures(),
                self.ledger.len()
            );

            if self.max_cycles.is_some_and(|max| cycle >= max) {
                info!("Completed {} monitoring cycles.", cycle);
                return;
            }
            info!("Next cycle in {} seconds.", self.pacing.cycle_interval.as_secs());
            delay_manager::pause(self.pacing.cycle_interval, "cycle interval").await;
        }
    }

    /// One pass over every query, in order. A failing query never stops the pass.
    pub async fn run_cycle(&mut self, cycle: u64, queries: &[SearchQuery]) -> CycleSummary {
        info!("=== Starting monitoring cycle {} ===", cycle);
        let mut reports = Vec::with_capacity(queries.len());

        for query in queries {
            info!("Searching: {}", query.label);
            let outcome = match self.walker.walk(query, self.target_count).await {
                Ok(walk) => {
                    let new = self.record_new(&walk.records);
                    info!("Found {} new postings in this search ({} read).", new, walk.records.len());
                    QueryOutcome::Completed {
                        found: walk.records.len(),
                        new,
                        stop: walk.stop,
                    }
                }
                Err(e) => {
                    warn!("Search {} failed: {}", query.label, e);
                    QueryOutcome::Failed(e.to_string())
                }
            };
            reports.push(QueryReport {
                label: query.label.clone(),
                outcome,
            });

            delay_manager::random_pause(self.pacing.inter_query, "between searches").await;
        }

        CycleSummary { cycle, queries: reports }
    }

    /// Appends each new record as soon as it is classified, so a crash loses
    /// at most the record in flight.
    fn record_new(&mut self, records: &[JobRecord]) -> usize {
        let mut new = 0;
        for record in records {
            if self.ledger.classify(record) == Classification::Seen {
                continue;
            }
            new += 1;
            if let Err(e) = self.sink.append(record) {
                error!("Failed to write record for '{}' ({}): {}", record.title, record.company, e);
            }
        }
        new
    }
}
