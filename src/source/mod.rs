//! Source client
//!
//! Fetches the four per-competition documents from the data provider:
//!
//! - `competitions/{code}/teams`
//! - `competitions/{code}/matches`
//! - `competitions/{code}/standings`
//! - `competitions/{code}/scorers`
//!
//! Every request carries the API credential. A request that fails (transport
//! error, timeout, non-2xx status, undecodable body) is a `SourceUnavailable`
//! error for that resource; nothing is retried.

mod client;

pub use client::HttpSourceClient;

use crate::error::Result;
use crate::session::Extracted;
use crate::types::{JsonValue, ResourceKind};
use async_trait::async_trait;
use tracing::info;

/// A provider of raw competition documents
#[async_trait]
pub trait SourceClient: Send + Sync {
    /// Fetch one resource document for a competition
    async fn fetch(&self, resource: ResourceKind, competition: &str) -> Result<JsonValue>;
}

/// Fetch all four documents of a competition, in fixed order.
///
/// Stops at the first failing resource.
pub async fn extract_competition<S>(source: &S, competition: &str) -> Result<Extracted>
where
    S: SourceClient + ?Sized,
{
    info!("Extracting data for competition: {competition}");

    let teams = source.fetch(ResourceKind::Teams, competition).await?;
    let matches = source.fetch(ResourceKind::Matches, competition).await?;
    let standings = source.fetch(ResourceKind::Standings, competition).await?;
    let scorers = source.fetch(ResourceKind::Scorers, competition).await?;

    Ok(Extracted {
        teams,
        matches,
        standings,
        scorers,
    })
}
