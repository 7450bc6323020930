//! List-then-act operations with isolated per-item failures
//!
//! A listing call produces items, then a fallible action runs for each item
//! in listing order. Only a failed listing aborts the run; item failures are
//! collected and handed back to the caller.

use crate::error::Result;
use crate::types::{FindResults, FoundCredential};
use serde::Serialize;
use std::future::Future;
use tracing::{debug, warn};

/// One failed per-item action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkItemFailure {
    /// Identifier of the item the action ran for
    pub name: String,
    /// Display text of the action's error
    pub error: String,
}

/// Failure entry produced by delete-by-path
pub type DeleteFailure = BulkItemFailure;

/// Something a bulk action can be applied to
pub trait BulkItem {
    fn identifier(&self) -> &str;
}

impl BulkItem for FoundCredential {
    fn identifier(&self) -> &str {
        &self.name
    }
}

impl BulkItem for String {
    fn identifier(&self) -> &str {
        self
    }
}

impl IntoIterator for FindResults {
    type Item = FoundCredential;
    type IntoIter = std::vec::IntoIter<FoundCredential>;

    fn into_iter(self) -> Self::IntoIter {
        self.credentials.into_iter()
    }
}

/// Run `action` for every item the listing returns, strictly in sequence
///
/// Returns the listing error unchanged if the listing fails, in which case no
/// action runs. Otherwise returns the (possibly empty) failures in listing
/// order; `on_success` fires once per successful item.
pub async fn apply_to_each<L, I, A, Fut, S>(
    listing: L,
    mut action: A,
    mut on_success: S,
) -> Result<Vec<BulkItemFailure>>
where
    L: Future<Output = Result<I>>,
    I: IntoIterator,
    I::Item: BulkItem,
    A: FnMut(String) -> Fut,
    Fut: Future<Output = Result<()>>,
    S: FnMut(&str),
{
    let items = listing.await?;
    let mut failures = Vec::new();

    for item in items {
        let name = item.identifier().to_string();
        match action(name.clone()).await {
            Ok(()) => {
                debug!("Bulk action succeeded for {}", name);
                on_success(&name);
            }
            Err(e) => {
                warn!("Bulk action failed for {}: {}", name, e);
                failures.push(BulkItemFailure {
                    name,
                    error: e.to_string(),
                });
            }
        }
    }

    Ok(failures)
}
