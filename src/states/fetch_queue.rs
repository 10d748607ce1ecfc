//! Fetch Queue
//!
//! Generation bookkeeping for paged fetches. Every issued fetch gets a new
//! generation; only a response for the latest generation may touch the cursor
//! or reach the renderer. Superseded requests are not aborted, their responses
//! are dropped on arrival.

use crate::domain::tree::Page;
use crate::error::Error;
use crate::states::paging::{PagingState, RequestParams, build_request_params};

/// Monotonic fetch counter
#[derive(Clone, Copy, Debug, Default, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct Generation(u64);

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A fetch that has been issued and is waiting for its response
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchTicket {
    generation: Generation,
    params: RequestParams,
}

impl FetchTicket {
    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn params(&self) -> &RequestParams {
        &self.params
    }
}

/// What became of a fetch response
#[derive(Debug)]
pub enum FetchOutcome<T> {
    /// Current response: total applied, items ready to enqueue
    Applied { items: Vec<T>, total: u64 },
    /// Superseded response, dropped untouched
    Stale { generation: Generation },
    /// Current response failed; the cursor is unchanged
    Failed { error: Error },
}

/// Serializes paged fetches of one tree view by generation
#[derive(Debug, Default)]
pub struct FetchQueue {
    latest: Generation,
    in_flight: Option<Generation>,
}

impl FetchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fetch for the cursor as it is now, superseding any outstanding one
    pub fn issue(&mut self, paging: &PagingState) -> FetchTicket {
        self.latest = Generation(self.latest.0 + 1);

        if let Some(previous) = self.in_flight.replace(self.latest) {
            tracing::debug!("Fetch {} superseded by {}", previous, self.latest);
        }

        let params = build_request_params(paging);
        tracing::debug!(
            "Issuing fetch {} (page {}, page_size {}, search {:?})",
            self.latest,
            params.page,
            params.page_size,
            params.search_value
        );

        FetchTicket {
            generation: self.latest,
            params,
        }
    }

    /// Whether `generation` is the latest issued fetch
    pub fn is_current(&self, generation: Generation) -> bool {
        generation == self.latest
    }

    /// Whether the latest fetch is still waiting for its response
    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Resolve a response against the ticket it answers
    ///
    /// Only a current response mutates `paging`, and only its total.
    pub fn accept<T>(
        &mut self,
        ticket: &FetchTicket,
        response: crate::error::Result<Page<T>>,
        paging: &mut PagingState,
    ) -> FetchOutcome<T> {
        if !self.is_current(ticket.generation) {
            tracing::debug!(
                "Discarding stale response {} (latest {})",
                ticket.generation,
                self.latest
            );
            return FetchOutcome::Stale {
                generation: ticket.generation,
            };
        }

        self.in_flight = None;

        match response {
            Ok(page) => {
                paging.set_total(page.total);
                FetchOutcome::Applied {
                    items: page.items,
                    total: page.total,
                }
            }
            Err(error) => {
                tracing::warn!("Fetch {} failed: {}", ticket.generation, error);
                FetchOutcome::Failed { error }
            }
        }
    }
}
