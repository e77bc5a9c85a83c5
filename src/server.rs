//! HTTP surface: route filters, multipart extraction, and the request
//! boundary where taxonomy errors become structured failure responses.

use crate::error::{Error, Result};
use crate::service::VettingService;
use bytes::BufMut;
use futures::TryStreamExt;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use warp::http::header::{HeaderValue, CONTENT_DISPOSITION, CONTENT_TYPE};
use warp::http::StatusCode;
use warp::multipart::FormData;
use warp::{Filter, Rejection, Reply};

const MAX_UPLOAD_BYTES: u64 = 32 * 1024 * 1024;
const MAX_RECORD_BYTES: u64 = 64 * 1024;

/// Carries a taxonomy error through warp's rejection machinery to the
/// recovery handler.
#[derive(Debug)]
struct ServiceFailure(Error);

impl warp::reject::Reject for ServiceFailure {}

fn reject(error: Error) -> Rejection {
    warp::reject::custom(ServiceFailure(error))
}

#[derive(Debug, Serialize)]
struct FailureBody {
    error: String,
    detail: String,
}

#[derive(Debug, Deserialize)]
struct DownloadQuery {
    id: String,
}

/// All routes of the vetting service.
pub fn routes(
    service: Arc<VettingService>,
) -> impl Filter<Extract = impl Reply, Error = Rejection> + Clone {
    let banner = warp::path::end()
        .and(warp::get())
        .map(|| "exovet transit-candidate vetting service");

    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_service(service.clone()))
        .map(|service: Arc<VettingService>| warp::reply::json(&service.health()));

    let batch = warp::path!("predictions" / "exoplanet_or_not")
        .and(warp::post())
        .and(warp::multipart::form().max_length(MAX_UPLOAD_BYTES))
        .and(with_service(service.clone()))
        .and_then(handle_batch);

    let single = warp::path!("predictions" / "simplified_exoplanet_or_not")
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_RECORD_BYTES))
        .and(warp::body::json())
        .and(with_service(service.clone()))
        .and_then(handle_single);

    let download = warp::path!("predictions" / "download")
        .and(warp::get())
        .and(warp::query::<DownloadQuery>())
        .and(with_service(service))
        .and_then(handle_download);

    banner
        .or(health)
        .or(batch)
        .or(single)
        .or(download)
        .recover(handle_rejection)
}

/// Binds the listener and serves until the future is dropped.
pub async fn serve(service: Arc<VettingService>, addr: SocketAddr) -> Result<()> {
    let (bound, run) = warp::serve(routes(service))
        .try_bind_ephemeral(addr)
        .map_err(|e| Error::Config(format!("cannot bind {}: {}", addr, e)))?;
    info!("Listening on {}", bound);
    run.await;
    Ok(())
}

fn with_service(
    service: Arc<VettingService>,
) -> impl Filter<Extract = (Arc<VettingService>,), Error = Infallible> + Clone {
    warp::any().map(move || service.clone())
}

async fn handle_batch(
    form: FormData,
    service: Arc<VettingService>,
) -> std::result::Result<impl Reply, Rejection> {
    let bytes = read_file_part(form).await.map_err(reject)?;
    match service.classify_upload(&bytes) {
        Ok(summary) => Ok(warp::reply::json(&summary)),
        Err(e) => Err(reject(e)),
    }
}

async fn handle_single(
    payload: serde_json::Value,
    service: Arc<VettingService>,
) -> std::result::Result<impl Reply, Rejection> {
    match service.classify_record(&payload) {
        Ok(summary) => Ok(warp::reply::json(&summary)),
        Err(e) => Err(reject(e)),
    }
}

async fn handle_download(
    query: DownloadQuery,
    service: Arc<VettingService>,
) -> std::result::Result<impl Reply, Rejection> {
    let bytes = service.download(&query.id).map_err(reject)?;

    let mut response = warp::http::Response::new(warp::hyper::Body::from(bytes));
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/csv"));
    response.headers_mut().insert(
        CONTENT_DISPOSITION,
        HeaderValue::from_static("attachment; filename=\"predictions\""),
    );
    Ok(response)
}

/// Drains the `file` part of a multipart upload into memory.
async fn read_file_part(mut form: FormData) -> Result<Vec<u8>> {
    // multer requires each Part to be dropped before the next field is
    // polled, so parts must be processed sequentially rather than collected.
    while let Some(part) = form.try_next().await.map_err(|e| Error::MalformedInput {
        reason: format!("multipart form: {}", e),
    })? {
        if part.name() != "file" {
            continue;
        }
        let bytes = part
            .stream()
            .try_fold(Vec::new(), |mut acc, data| {
                acc.put(data);
                async move { Ok(acc) }
            })
            .await
            .map_err(|e| Error::MalformedInput {
                reason: format!("multipart read: {}", e),
            })?;
        return Ok(bytes);
    }
    Err(Error::MalformedInput {
        reason: "missing multipart field: file".to_string(),
    })
}

/// Turns every rejection into the structured failure payload. Taxonomy
/// errors keep their kind and status; warp's own rejections are folded into
/// the closest kind.
async fn handle_rejection(rejection: Rejection) -> std::result::Result<impl Reply, Rejection> {
    let (status, body) = if let Some(ServiceFailure(error)) = rejection.find() {
        warn!("Request failed ({}): {}", error.kind(), error);
        (
            StatusCode::from_u16(error.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            FailureBody {
                error: error.kind().to_string(),
                detail: error.to_string(),
            },
        )
    } else if rejection.is_not_found() {
        (
            StatusCode::NOT_FOUND,
            FailureBody {
                error: "not_found".to_string(),
                detail: "no such route".to_string(),
            },
        )
    } else if let Some(e) = rejection.find::<warp::body::BodyDeserializeError>() {
        (
            StatusCode::BAD_REQUEST,
            FailureBody {
                error: "malformed_input".to_string(),
                detail: e.to_string(),
            },
        )
    } else if let Some(e) = rejection.find::<warp::reject::InvalidQuery>() {
        (
            StatusCode::BAD_REQUEST,
            FailureBody {
                error: "malformed_input".to_string(),
                detail: e.to_string(),
            },
        )
    } else if rejection.find::<warp::reject::PayloadTooLarge>().is_some() {
        (
            StatusCode::PAYLOAD_TOO_LARGE,
            FailureBody {
                error: "malformed_input".to_string(),
                detail: "payload too large".to_string(),
            },
        )
    } else if rejection
        .find::<warp::reject::MethodNotAllowed>()
        .is_some()
    {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            FailureBody {
                error: "method_not_allowed".to_string(),
                detail: "method not allowed on this route".to_string(),
            },
        )
    } else {
        warn!("Unhandled rejection: {:?}", rejection);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            FailureBody {
                error: "internal".to_string(),
                detail: "unhandled rejection".to_string(),
            },
        )
    };

    Ok(warp::reply::with_status(warp::reply::json(&body), status))
}
