//! CRUD handlers shared by every resource collection.

use log::info;

use crate::api::models::{RecordBody, Resource};
use crate::parser::HttpRequest;
use crate::server::{Error, HttpResponse, StatusCode};
use crate::store::Store;

fn path_id(request: &HttpRequest) -> Result<&str, Error> {
    request
        .path_param("id")
        .ok_or_else(|| Error::InternalError(format!("route for {} has no {{id}} segment", request.path)))
}

/// `GET /{collection}`: every record, in insertion order.
pub fn list<T: Resource>(store: &Store<T>) -> Result<HttpResponse, Error> {
    HttpResponse::new(StatusCode::Ok).with_json(&store.list())
}

/// `POST /{collection}`: store the body under a new id.
pub fn create<T: Resource>(store: &Store<T>, request: &HttpRequest) -> Result<HttpResponse, Error> {
    let body: RecordBody = request.json()?;
    let record = store.insert(body.into_fields::<T>()?);
    info!("Created {kind} {id}", kind = T::KIND, id = record.id);

    HttpResponse::new(StatusCode::Created).with_json(&record)
}

/// `PUT /{collection}/{id}`: replace the fields of an existing record.
///
/// A body `id`, when present, must equal the path id.
pub fn update<T: Resource>(store: &Store<T>, request: &HttpRequest) -> Result<HttpResponse, Error> {
    let id = path_id(request)?;
    let body: RecordBody = request.json()?;

    if let Some(body_id) = body.id.as_deref() {
        if body_id != id {
            return Err(Error::BadRequest(format!(
                "Request path id ({id}) and request body id ({body_id}) must match"
            )));
        }
    }

    let record = store.update(id, body.into_fields::<T>()?)?;
    info!("Updated {kind} {id}", kind = T::KIND);

    HttpResponse::new(StatusCode::Ok).with_json(&record)
}

/// `DELETE /{collection}/{id}`.
pub fn remove<T: Resource>(store: &Store<T>, request: &HttpRequest) -> Result<HttpResponse, Error> {
    let id = path_id(request)?;
    store.remove(id)?;
    info!("Deleted {kind} {id}", kind = T::KIND);

    Ok(HttpResponse::new(StatusCode::NoContent))
}
