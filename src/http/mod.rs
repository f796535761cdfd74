//! HTTP surface: router, request decoding and shared handler helpers.
//!
//! Routes per resource follow one shape:
//!
//! | Method | Path | Handler |
//! |---|---|---|
//! | GET | `/<resource>` | cursor-paginated list |
//! | POST | `/<resource>` | create |
//! | GET | `/<resource>/{key}` | show by slug |
//! | PATCH | `/<resource>/{key}` | partial update by public id |

mod error;
mod houses;
mod note_groups;
mod notes;
mod perfumers;
mod perfumes;

pub use error::ApiError;

use axum::extract::FromRequest;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::context::Context;
use crate::error::AppError;
use crate::models::january_first;
use crate::pagination::{Page, PageRequest};

/// JSON request body whose decoding failures render as 400 "Invalid request body.".
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// Builds the application router.
pub fn router(ctx: Context) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/houses", get(houses::list).post(houses::create))
        .route("/houses/{key}", get(houses::show).patch(houses::update))
        .route(
            "/note-groups",
            get(note_groups::list).post(note_groups::create),
        )
        .route(
            "/note-groups/{key}",
            get(note_groups::show).patch(note_groups::update),
        )
        .route("/notes", get(notes::list).post(notes::create))
        .route("/notes/{key}", get(notes::show).patch(notes::update))
        .route("/perfumers", get(perfumers::list).post(perfumers::create))
        .route(
            "/perfumers/{key}",
            get(perfumers::show).patch(perfumers::update),
        )
        .route("/perfumes", get(perfumes::list).post(perfumes::create))
        .route(
            "/perfumes/{key}",
            get(perfumes::show).patch(perfumes::update),
        )
        .with_state(ctx)
}

#[derive(Debug, Serialize)]
struct Home {
    status: u16,
    server_time: String,
    message: &'static str,
}

async fn home() -> Json<Home> {
    Json(Home {
        status: 200,
        server_time: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        message: "Perfume DB API",
    })
}

/// Wraps a fetched page, minting the next cursor from internal ids.
fn paginate<T>(
    ctx: &Context,
    data: Vec<T>,
    request: PageRequest,
    internal_id: impl Fn(&T) -> i64,
) -> Result<Json<Page<T>>, ApiError> {
    let page = Page::build(data, request, internal_id, &ctx.cursors).map_err(AppError::from)?;
    Ok(Json(page))
}

/// Year as the text the `year` rule validates.
fn year_text(year: Option<i32>) -> Option<String> {
    year.map(|y| y.to_string())
}

/// January 1st of an already validated year.
fn to_year(year: i32) -> Result<NaiveDate, AppError> {
    january_first(year).ok_or_else(|| AppError::Internal(format!("year out of range: {}", year)))
}

/// Deserializes a nullable field so that absent (`None`), `null`
/// (`Some(None)`) and a value (`Some(Some(v))`) stay distinct.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
pub(crate) mod testing {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::config::{Config, IdConfig, PaginationConfig, PostgresConfig, ServerConfig};
    use crate::context::Context;

    /// Router over a context whose database is unreachable.
    ///
    /// The pool connects lazily, so requests that never touch storage
    /// (validation, decoding) behave normally and the rest fail with 500.
    pub async fn offline_app() -> Router {
        let config = Config {
            postgres: PostgresConfig {
                uri: "postgresql://postgres@127.0.0.1:1/perfume_db".into(),
                pool_size: 2,
                pool_timeout_secs: 1,
            },
            server: ServerConfig::default(),
            pagination: PaginationConfig {
                encryption_key: "0123456789abcdef".into(),
            },
            ids: IdConfig::default(),
        };
        super::router(Context::from_config(config).await.unwrap())
    }

    pub async fn send(app: Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if body.is_some() {
            request = request.header("content-type", "application/json");
        }
        let request = request
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }
}
