// src/matching/manager.rs
// Row orchestration: chunked dispatch over a bounded worker pool, the
// two-branch matching policy per row, and order-preserving output.

use anyhow::Result;
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::io::Write;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::config::MatcherConfig;
use crate::models::matching::MatchMap;
use crate::models::records::{output_rows_for, InputRecord, OutputRecord, RowSchema};
use crate::ror::RorClient;
use crate::utils::csv_io::append_output_rows;

use super::aggregate::merge_matches;
use super::name::match_names;
use super::url::match_url;
use super::verify::verify_with_registry_links;

/// Which branch of the matching policy a row takes after the name phase.
/// URL-substring search is only ever attempted when name search found
/// nothing; otherwise the URL evidence is used to confirm, not to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    NameAttempted,
    UrlFallback,
}

pub fn select_strategy(name_matches: &MatchMap) -> MatchStrategy {
    if name_matches.is_empty() {
        MatchStrategy::UrlFallback
    } else {
        MatchStrategy::NameAttempted
    }
}

#[derive(Debug, Default)]
pub struct PipelineStats {
    pub total_rows: usize,
    pub matched_rows: usize,
    pub unmatched_rows: usize,
    pub output_rows: usize,
    pub row_failures: usize,
    pub chunks_processed: usize,
}

/// Match one row end to end: parse its variants, run the name phase across
/// all name variants, then either cross-validate or fall back to URL search.
pub async fn process_row(
    row: &InputRecord,
    schema: &RowSchema,
    client: &RorClient,
    threshold: u8,
) -> Vec<OutputRecord> {
    let names = row.name_variants(schema);
    let urls = row.url_variants(schema);

    let mut name_matches = MatchMap::new();
    for name in &names {
        let partial = match_names(client, name, threshold).await;
        merge_matches(&mut name_matches, partial);
    }

    let final_matches = match select_strategy(&name_matches) {
        MatchStrategy::NameAttempted => {
            let mut matches = name_matches;
            verify_with_registry_links(client, &mut matches, &urls).await;
            matches
        }
        MatchStrategy::UrlFallback => {
            let mut matches = MatchMap::new();
            for url in &urls {
                let partial = match_url(client, url).await;
                merge_matches(&mut matches, partial);
            }
            matches
        }
    };

    output_rows_for(row, &final_matches)
}

/// Run the whole batch: rows are grouped into fixed-size chunks, each row is
/// dispatched to the worker pool, and a chunk is fully drained before any of
/// its output is written, so output preserves input row order. A row whose
/// task fails is logged and echoed unmatched rather than aborting the batch.
pub async fn run_matching_pipeline<W: Write>(
    rows: Vec<InputRecord>,
    schema: Arc<RowSchema>,
    client: Arc<RorClient>,
    config: &MatcherConfig,
    writer: &mut csv::Writer<W>,
) -> Result<PipelineStats> {
    let mut stats = PipelineStats {
        total_rows: rows.len(),
        ..Default::default()
    };
    let total_chunks = rows.len().div_ceil(config.chunk_size).max(1);
    let semaphore = Arc::new(Semaphore::new(config.max_parallel_requests));

    let progress = ProgressBar::new(rows.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("█▉▊▋▌▍▎▏  "),
    );
    progress.set_message("Matching rows...");

    let threshold = config.name_match_threshold;

    for (chunk_index, chunk) in rows.chunks(config.chunk_size).enumerate() {
        info!("Processing chunk {} of {}", chunk_index + 1, total_chunks);

        let mut tasks: Vec<JoinHandle<Vec<OutputRecord>>> = Vec::with_capacity(chunk.len());
        for row in chunk {
            let row = row.clone();
            let schema = Arc::clone(&schema);
            let client = Arc::clone(&client);
            let semaphore = Arc::clone(&semaphore);
            tasks.push(tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("worker semaphore closed");
                process_row(&row, &schema, &client, threshold).await
            }));
        }

        // Chunk barrier: join_all yields results in spawn order, so writes
        // below preserve input row order within the chunk.
        let results = join_all(tasks).await;
        for (row, result) in chunk.iter().zip(results) {
            let output = match result {
                Ok(output) => output,
                Err(e) => {
                    warn!("Row matching task failed ({}), emitting echo row", e);
                    stats.row_failures += 1;
                    vec![OutputRecord::echo(row)]
                }
            };

            if output.first().map_or(false, |r| !r.matched_ror_id.is_empty()) {
                stats.matched_rows += 1;
            } else {
                stats.unmatched_rows += 1;
            }
            stats.output_rows += output.len();
            append_output_rows(writer, &output)?;
            progress.inc(1);
        }
        writer.flush()?;
        stats.chunks_processed += 1;
    }

    progress.finish_with_message(format!(
        "{} rows matched, {} unmatched",
        stats.matched_rows, stats.unmatched_rows
    ));
    Ok(stats)
}
