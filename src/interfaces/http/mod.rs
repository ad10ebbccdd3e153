mod teapot;

use actix_cors::Cors;
use actix_web::dev::Server;
use actix_web::http::StatusCode;
use actix_web::middleware::from_fn;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer, ResponseError};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, info, warn};

use crate::application::{CollectionService, CountyLookupUseCase};
use crate::domain::collection::Collection;
use crate::domain::error::LookupError;

pub use teapot::teapot_guard;

pub struct HttpState {
    pub lookup: CountyLookupUseCase,
    pub collections: CollectionService,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

pub(crate) fn json_error(status: StatusCode, message: &str) -> HttpResponse {
    HttpResponse::build(status).json(ErrorBody { error: message })
}

impl ResponseError for LookupError {
    fn status_code(&self) -> StatusCode {
        match self {
            LookupError::InvalidBody | LookupError::MissingField | LookupError::InvalidZip => {
                StatusCode::BAD_REQUEST
            }
            LookupError::UnknownMeasure
            | LookupError::NotFound
            | LookupError::StorageUnavailable => StatusCode::NOT_FOUND,
            LookupError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        json_error(self.status_code(), &self.to_string())
    }
}

async fn county_data(
    data: web::Data<HttpState>,
    body: web::Bytes,
) -> Result<HttpResponse, LookupError> {
    let value: Value = serde_json::from_slice(&body).map_err(|_| LookupError::InvalidBody)?;

    match data.lookup.execute_json(&value).await {
        Ok(rows) => Ok(HttpResponse::Ok().json(rows)),
        Err(err) => {
            match &err {
                LookupError::Storage(detail) => {
                    error!(error = %detail, "County lookup failed");
                }
                LookupError::StorageUnavailable => {
                    warn!("County lookup requested but the database file is missing");
                }
                _ => {}
            }
            Err(err)
        }
    }
}

async fn post_required() -> HttpResponse {
    json_error(StatusCode::BAD_REQUEST, "POST required")
}

async fn serve_collection(req: HttpRequest, data: web::Data<HttpState>) -> HttpResponse {
    let Some(collection) = Collection::from_path(req.path()) else {
        return not_found().await;
    };

    match data.collections.load(collection).await {
        Some(items) => HttpResponse::Ok().json(items),
        None => {
            warn!(collection = collection.name(), "Collection file missing");
            not_found().await
        }
    }
}

async fn method_not_allowed() -> HttpResponse {
    json_error(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

async fn not_found() -> HttpResponse {
    json_error(StatusCode::NOT_FOUND, "Not found")
}

/// Registers every route. The teapot guard is not part of this; wrap the
/// `App` with [`teapot_guard`] so it also sees unmatched paths.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource(vec!["/county_data", "/api/county_data"])
            .route(web::post().to(county_data))
            .default_service(web::to(post_required)),
    );

    for collection in Collection::ALL {
        cfg.service(
            web::resource(collection.route_paths().to_vec())
                .route(web::get().to(serve_collection))
                .route(web::post().to(serve_collection))
                .default_service(web::to(method_not_allowed)),
        );
    }

    cfg.default_service(web::to(not_found));
}

pub fn start_server(state: HttpState, bind_addr: (String, u16)) -> std::io::Result<Server> {
    let state = web::Data::new(state);
    let (host, port) = bind_addr;

    let server = HttpServer::new(move || {
        let cors = Cors::permissive(); // Browser dashboards call the API cross-origin

        App::new()
            .wrap(cors)
            .wrap(from_fn(teapot_guard))
            .app_data(state.clone())
            .configure(configure_routes)
    })
    .bind((host.as_str(), port))?
    .run();

    info!(host = %host, port, "HTTP server listening");

    Ok(server)
}
