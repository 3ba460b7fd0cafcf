//! Batch processing of newline-delimited JSON transactions.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{error, info, warn};

use commission_types::{
    CountryResolver, RateResolver, Transaction, TransactionRecord, ValidationError,
};

use crate::CommissionService;

/// Outcome counts of one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Lines that produced a commission.
    pub processed: usize,
    /// Lines rejected by validation.
    pub skipped: usize,
    /// Valid lines whose calculation failed.
    pub failed: usize,
}

/// Drives a [`CommissionService`] over a stream of input lines.
///
/// A bad line never aborts the batch: invalid records are skipped and failed
/// calculations are logged, then processing moves on to the next line.
pub struct BatchProcessor<C: CountryResolver, R: RateResolver> {
    service: CommissionService<C, R>,
}

impl<C: CountryResolver, R: RateResolver> BatchProcessor<C, R> {
    pub fn new(service: CommissionService<C, R>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &CommissionService<C, R> {
        &self.service
    }

    /// Processes every line of `input`, writing one commission per line to
    /// `output`.
    ///
    /// Only IO errors on `input` or `output` are returned.
    pub async fn run<I, O>(&self, input: I, output: &mut O) -> std::io::Result<BatchSummary>
    where
        I: AsyncBufRead + Unpin,
        O: AsyncWrite + Unpin,
    {
        let mut summary = BatchSummary::default();
        let mut lines = input.lines();
        let mut line_no = 0usize;

        while let Some(line) = lines.next_line().await? {
            line_no += 1;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let tx = match parse_line(line) {
                Ok(tx) => tx,
                Err(e) => {
                    warn!(line = line_no, error = %e, "skipping invalid record");
                    summary.skipped += 1;
                    continue;
                }
            };

            match self.service.calculate_commission(&tx).await {
                Ok(commission) => {
                    output
                        .write_all(format!("{}\n", commission).as_bytes())
                        .await?;
                    summary.processed += 1;
                }
                Err(e) => {
                    error!(
                        line = line_no,
                        kind = %e.kind(),
                        error = %e,
                        "commission calculation failed"
                    );
                    summary.failed += 1;
                }
            }
        }

        output.flush().await?;
        info!(
            processed = summary.processed,
            skipped = summary.skipped,
            failed = summary.failed,
            "batch complete"
        );
        Ok(summary)
    }
}

fn parse_line(line: &str) -> Result<Transaction, ValidationError> {
    TransactionRecord::from_json(line).and_then(Transaction::try_from)
}
