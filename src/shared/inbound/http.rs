// HTTP adapter shared by every versioned resource.
//
// Responsibilities
// - Map application errors onto status codes and `{code, message}` bodies.
// - Provide the create, list, show, update and delete handlers over a RecordService.
//
// Boundaries
// - Handlers only extract and translate. Every rule lives in the service and the policies.

use crate::shared::application::errors::ApplicationError;
use crate::shared::application::record_service::{DEFAULT_PAGE_SIZE, RecordService};
use crate::shared::core::record::VersionedRecord;
use crate::shared::infrastructure::entity_repository::EntityRepository;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ApiErrorResponse,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ApiErrorResponse {
                code,
                message: message.into(),
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.body.code
    }
}

impl From<ApplicationError> for ApiError {
    fn from(error: ApplicationError) -> Self {
        let message = error.to_string();
        match error {
            ApplicationError::VersionRequired => {
                Self::new(StatusCode::BAD_REQUEST, "VERSION_REQUIRED", message)
            }
            ApplicationError::Invalid(_) => {
                Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
            }
            ApplicationError::NotFound { .. } => {
                Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
            }
            ApplicationError::VersionConflict { .. } => {
                Self::new(StatusCode::CONFLICT, "VERSION_CONFLICT", message)
            }
            ApplicationError::TimedOut(_) | ApplicationError::Repository(_) => {
                tracing::error!(error = %message, "request failed");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "internal server error",
                )
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "MALFORMED_BODY",
            rejection.body_text(),
        )
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "INVALID_PARAMETERS",
            rejection.body_text(),
        )
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "INVALID_PARAMETERS",
            rejection.body_text(),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

/// Update body: the claimed version next to the fields to change.
#[derive(Debug, Deserialize)]
pub struct UpdateBody<P> {
    pub version: Option<u64>,
    #[serde(flatten)]
    pub patch: P,
}

type Service<R, TRepository> = Arc<RecordService<R, TRepository>>;

pub fn resource_router<R, TRepository>(service: Service<R, TRepository>) -> Router
where
    R: VersionedRecord,
    TRepository: EntityRepository<R> + 'static,
{
    Router::new()
        .route(
            "/",
            get(list::<R, TRepository>).post(create::<R, TRepository>),
        )
        .route(
            "/{id}",
            get(show::<R, TRepository>)
                .patch(update::<R, TRepository>)
                .delete(remove::<R, TRepository>),
        )
        .with_state(service)
}

async fn create<R, TRepository>(
    State(service): State<Service<R, TRepository>>,
    body: Result<Json<R::Draft>, JsonRejection>,
) -> Result<(StatusCode, Json<R>), ApiError>
where
    R: VersionedRecord,
    TRepository: EntityRepository<R> + 'static,
{
    let Json(draft) = body?;
    let record = service.create(draft).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn list<R, TRepository>(
    State(service): State<Service<R, TRepository>>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<R>>, ApiError>
where
    R: VersionedRecord,
    TRepository: EntityRepository<R> + 'static,
{
    let Query(params) = params?;
    let records = service
        .list(
            params.offset.unwrap_or(0),
            params.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        )
        .await?;
    Ok(Json(records))
}

async fn show<R, TRepository>(
    State(service): State<Service<R, TRepository>>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<R>, ApiError>
where
    R: VersionedRecord,
    TRepository: EntityRepository<R> + 'static,
{
    let Path(id) = id?;
    Ok(Json(service.get(&id).await?))
}

async fn update<R, TRepository>(
    State(service): State<Service<R, TRepository>>,
    id: Result<Path<String>, PathRejection>,
    body: Result<Json<UpdateBody<R::Patch>>, JsonRejection>,
) -> Result<Json<R>, ApiError>
where
    R: VersionedRecord,
    TRepository: EntityRepository<R> + 'static,
{
    let Path(id) = id?;
    let Json(UpdateBody { version, patch }) = body?;
    Ok(Json(service.update(&id, version, patch).await?))
}

async fn remove<R, TRepository>(
    State(service): State<Service<R, TRepository>>,
    id: Result<Path<String>, PathRejection>,
) -> Result<StatusCode, ApiError>
where
    R: VersionedRecord,
    TRepository: EntityRepository<R> + 'static,
{
    let Path(id) = id?;
    service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
