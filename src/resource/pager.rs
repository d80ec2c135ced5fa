//! Resource Pager
//!
//! Lists a collection as a lazy stream. Pages are fetched only as the
//! consumer polls; items are yielded in server order, without reordering or
//! dedup. A stream is single-use: listing again issues fresh requests.

use super::base::decode;
use super::registry::ResourceDef;
use super::Query;
use crate::error::{Error, Result};
use crate::openstack::client::Session;
use futures::stream::{self, Stream, StreamExt, TryStreamExt};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::pin::Pin;
use url::Url;

/// Lazy, finite stream of decoded list items
pub type ResourceStream<T> = Pin<Box<dyn Stream<Item = Result<T>> + Send>>;

/// One fetched page
#[derive(Debug)]
pub struct Page {
    pub items: Vec<Value>,
    /// Query for the following page, if any
    pub next: Option<Query>,
}

struct ListState {
    session: Session,
    def: ResourceDef,
    url: String,
    pending: Option<Query>,
}

/// List a collection
///
/// The query is validated against the definition before anything is sent.
pub fn list<T>(session: &Session, def: &ResourceDef, query: Query) -> Result<ResourceStream<T>>
where
    T: DeserializeOwned + Send + 'static,
{
    def.validate_query(&query)?;
    let url = session.url(def.scope, &def.render_path(&[])?);

    let state = ListState {
        session: session.clone(),
        def: *def,
        url,
        pending: Some(query),
    };

    let pages = stream::try_unfold(state, |mut state| async move {
        let Some(query) = state.pending.take() else {
            return Ok::<_, Error>(None);
        };
        let page = fetch_page(&state.session, &state.def, &state.url, &query).await?;
        tracing::debug!(
            "{}: fetched page of {} items (more: {})",
            state.def.name,
            page.items.len(),
            page.next.is_some()
        );
        state.pending = page.next;
        Ok(Some((page.items, state)))
    });

    let items = pages
        .map_ok(|items| stream::iter(items.into_iter().map(decode::<T>)))
        .try_flatten();

    Ok(items.boxed())
}

/// Fetch one page of a collection
pub async fn fetch_page(
    session: &Session,
    def: &ResourceDef,
    url: &str,
    query: &Query,
) -> Result<Page> {
    let body = session.get(url, query).await?;

    let link_query = if def.paginated {
        next_link_query(&body, def)?
    } else {
        None
    };
    let items = extract_items(body, def);
    let next = if def.paginated {
        next_query(query, link_query, &items)
    } else {
        None
    };

    Ok(Page { items, next })
}

/// Extract list items from a response body
///
/// Falls back to a lone singular envelope, then to a bare array.
fn extract_items(body: Value, def: &ResourceDef) -> Vec<Value> {
    let mut map = match body {
        Value::Object(map) => map,
        Value::Array(items) => return items,
        _ => return vec![],
    };

    if let Some(key) = def.resources_key {
        if let Some(Value::Array(items)) = map.remove(key) {
            return items;
        }
    }

    if let Some(key) = def.resource_key {
        if let Some(item @ Value::Object(_)) = map.remove(key) {
            return vec![item];
        }
    }

    vec![]
}

/// Query carried by a `rel: "next"` entry in `{resources_key}_links`
fn next_link_query(body: &Value, def: &ResourceDef) -> Result<Option<Query>> {
    let Some(resources_key) = def.resources_key else {
        return Ok(None);
    };

    let href = body
        .get(format!("{}_links", resources_key))
        .and_then(|v| v.as_array())
        .and_then(|links| {
            links
                .iter()
                .find(|link| link.get("rel").and_then(|r| r.as_str()) == Some("next"))
        })
        .and_then(|link| link.get("href"))
        .and_then(|href| href.as_str());

    let Some(href) = href else {
        return Ok(None);
    };

    let url = match Url::parse(href) {
        Ok(url) => url,
        Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse("http://localhost/")?.join(href)?,
        Err(err) => return Err(err.into()),
    };

    Ok(Some(url.query_pairs().collect()))
}

/// Decide the query for the following page
///
/// A next link wins; otherwise a full page under an explicit `limit`
/// continues from the last item's id. An empty page always ends the listing,
/// as does a continuation identical to the current query.
fn next_query(current: &Query, link_query: Option<Query>, items: &[Value]) -> Option<Query> {
    if items.is_empty() {
        return None;
    }

    let next = match link_query {
        Some(link) => current.merged(&link),
        None => {
            let limit = current.get("limit")?.parse::<usize>().ok()?;
            if limit == 0 || items.len() < limit {
                return None;
            }
            let marker = items.last()?.get("id")?.as_str()?;
            current.clone().with("marker", marker)
        }
    };

    if next == *current {
        return None;
    }
    Some(next)
}
