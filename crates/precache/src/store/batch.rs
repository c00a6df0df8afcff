//! All-or-nothing batch population (`add_all`).

use std::collections::HashSet;

use futures::future::try_join_all;
use tracing::{debug, warn};

use crate::client::Fetcher;
use crate::error::{PrecacheError, PrecacheResult};
use crate::types::{Request, RequestKey, Response};

use super::{evict, put, read, Cache};

pub(crate) async fn add_all_impl(
    cache: &Cache,
    fetcher: &dyn Fetcher,
    requests: &[Request],
) -> PrecacheResult<usize> {
    let mut seen = HashSet::new();
    let unique: Vec<&Request> = requests
        .iter()
        .filter(|r| seen.insert(RequestKey::from_request(r)))
        .collect();

    if let Some(request) = unique
        .iter()
        .find(|r| !RequestKey::from_request(r).is_cacheable())
    {
        return Err(PrecacheError::Install {
            url: request.url.to_string(),
            reason: format!("only GET requests can be pre-cached, got {}", request.method),
        });
    }

    // Nothing is written until every fetch has come back usable.
    let fetched = try_join_all(unique.into_iter().map(|r| fetch_checked(fetcher, r))).await?;

    commit_impl(cache, fetched).await
}

async fn fetch_checked(
    fetcher: &dyn Fetcher,
    request: &Request,
) -> PrecacheResult<(RequestKey, Response)> {
    let key = RequestKey::from_request(request);

    let response = fetcher
        .fetch(request)
        .await
        .map_err(|e| PrecacheError::Install {
            url: key.url.clone(),
            reason: e.to_string(),
        })?;

    if !response.is_success() {
        return Err(PrecacheError::Install {
            url: key.url,
            reason: format!("HTTP {}", response.status),
        });
    }

    Ok((key, response))
}

async fn commit_impl(cache: &Cache, entries: Vec<(RequestKey, Response)>) -> PrecacheResult<usize> {
    let mut committed: Vec<(RequestKey, Option<Response>)> = Vec::with_capacity(entries.len());

    for (key, response) in &entries {
        let previous = match read::get_impl(cache, key).await {
            Ok(previous) => previous,
            Err(e) => {
                warn!(
                    cache = %cache.name,
                    url = %key.url,
                    error = %e,
                    "existing entry unreadable, rollback will remove it"
                );
                None
            }
        };
        let written = put::put_impl(cache, key, response).await;
        committed.push((key.clone(), previous));

        if let Err(e) = written {
            warn!(cache = %cache.name, url = %key.url, error = %e, "batch write failed, rolling back");
            rollback(cache, committed).await;
            return Err(e);
        }
    }

    debug!(cache = %cache.name, entries = entries.len(), "batch committed");
    Ok(entries.len())
}

async fn rollback(cache: &Cache, committed: Vec<(RequestKey, Option<Response>)>) {
    for (key, previous) in committed.into_iter().rev() {
        let restored = match previous {
            Some(response) => put::put_impl(cache, &key, &response).await,
            None => evict::delete_impl(cache, &key).await.map(|_| ()),
        };

        if let Err(e) = restored {
            warn!(cache = %cache.name, url = %key.url, error = %e, "rollback failed");
        }
    }
}
