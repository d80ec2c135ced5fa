//! Generic resource requests
//!
//! Request construction and response translation shared by every resource
//! kind. Responses are unwrapped from the definition's `resource_key` when
//! present and decoded into the caller's record type; undeclared fields end
//! up in the record's flattened `extra` map.

use super::registry::{join_path, ResourceDef};
use super::Query;
use crate::error::{Error, Result};
use crate::openstack::client::Session;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// Fail fast on an empty identifier
pub(crate) fn require(what: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::invalid(format!("{} is required", what)));
    }
    Ok(())
}

/// Strip the singular envelope (`{"volume": {...}}` -> `{...}`) if present
pub fn unwrap_envelope(body: Value, key: Option<&str>) -> Value {
    match (key, body) {
        (Some(key), Value::Object(mut map)) if map.contains_key(key) => {
            map.remove(key).unwrap_or(Value::Null)
        }
        (_, body) => body,
    }
}

/// Decode a JSON value into a record; an empty body decodes as `{}`
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    let value = if value.is_null() {
        Value::Object(Map::new())
    } else {
        value
    };
    Ok(serde_json::from_value(value)?)
}

/// Translate a singular response body for `def`
pub fn translate<T: DeserializeOwned>(def: &ResourceDef, body: Value) -> Result<T> {
    decode(unwrap_envelope(body, def.resource_key))
}

/// Build a request body, wrapped in the resource key when the definition has one
pub fn request_body<B: Serialize + ?Sized>(def: &ResourceDef, attrs: &B) -> Result<Value> {
    let attrs = serde_json::to_value(attrs)?;
    match def.resource_key {
        Some(key) => {
            let mut wrapped = Map::new();
            wrapped.insert(key.to_string(), attrs);
            Ok(Value::Object(wrapped))
        }
        None => Ok(attrs),
    }
}

fn item_url(session: &Session, def: &ResourceDef, id: &str) -> Result<String> {
    require(&format!("{} id", def.display_name), id)?;
    let path = join_path(&def.render_path(&[])?, &[id]);
    Ok(session.url(def.scope, &path))
}

/// GET `{base_path}/{id}`
pub async fn get<T: DeserializeOwned>(session: &Session, def: &ResourceDef, id: &str) -> Result<T> {
    let url = item_url(session, def, id)?;
    let body = session.get(&url, &Query::default()).await?;
    translate(def, body)
}

/// GET a resource addressed only by URI parameters (e.g. a tenant's quota set)
pub async fn get_by_params<T: DeserializeOwned>(
    session: &Session,
    def: &ResourceDef,
    uri_params: &[(&str, &str)],
) -> Result<T> {
    let path = def.render_path(uri_params)?;
    let url = session.url(def.scope, &path);
    let body = session.get(&url, &Query::default()).await?;
    translate(def, body)
}

/// POST `{base_path}` with `{resource_key: attrs}`
pub async fn create<T, B>(session: &Session, def: &ResourceDef, attrs: &B) -> Result<T>
where
    T: DeserializeOwned,
    B: Serialize + ?Sized,
{
    let url = session.url(def.scope, &def.render_path(&[])?);
    let body = request_body(def, attrs)?;
    tracing::info!("create {}", def.name);

    let response = session.post(&url, Some(&body)).await?;
    translate(def, response)
}

/// PUT `{base_path}/{id}` with `{resource_key: attrs}`
pub async fn update<T, B>(
    session: &Session,
    def: &ResourceDef,
    id: &str,
    attrs: &B,
) -> Result<T>
where
    T: DeserializeOwned,
    B: Serialize + ?Sized,
{
    let url = item_url(session, def, id)?;
    let body = request_body(def, attrs)?;
    tracing::info!("update {} {}", def.name, id);

    let response = session.put(&url, Some(&body)).await?;
    translate(def, response)
}

/// DELETE `{base_path}/{id}`
///
/// With `ignore_missing` a 404 is treated as success.
pub async fn delete(
    session: &Session,
    def: &ResourceDef,
    id: &str,
    ignore_missing: bool,
) -> Result<()> {
    let url = item_url(session, def, id)?;
    tracing::info!("delete {} {}", def.name, id);

    match session.delete(&url).await {
        Ok(_) => Ok(()),
        Err(err) if ignore_missing && err.is_not_found() => {
            tracing::debug!("{} {} already gone", def.name, id);
            Ok(())
        }
        Err(err) => Err(err),
    }
}

/// POST to `{base_path}/{id}/{segment}` (command-style endpoints)
///
/// Returns the raw response body, `Value::Null` when the server sends none.
pub async fn post_action<B: Serialize + ?Sized>(
    session: &Session,
    def: &ResourceDef,
    id: &str,
    segment: &str,
    body: &B,
) -> Result<Value> {
    require(&format!("{} id", def.display_name), id)?;
    let path = join_path(&def.render_path(&[])?, &[id, segment]);
    let url = session.url(def.scope, &path);
    let body = serde_json::to_value(body)?;
    tracing::info!("{} {} on {}", def.name, segment, id);

    session.post(&url, Some(&body)).await
}
