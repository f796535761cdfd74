//! `/perfumers` handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;

use super::{paginate, ApiError, JsonBody};
use crate::context::Context;
use crate::error::AppError;
use crate::models::{create_slug, Perfumer};
use crate::pagination::{ListQuery, Page, PageRequest};
use crate::repositories::PerfumerRepository;
use crate::validation::Validator;

#[derive(Debug, Deserialize)]
pub struct CreatePerfumer {
    name: Option<String>,
    nationality: Option<String>,
    image_url: Option<String>,
    /// `YYYY-MM-DD`.
    birth_date: Option<String>,
}

impl CreatePerfumer {
    fn validate(&self) -> Result<(), AppError> {
        let mut v = Validator::new();
        v.field("name", self.name.as_deref(), &["required"]);
        v.field("nationality", self.nationality.as_deref(), &["required"]);
        v.field("image_url", self.image_url.as_deref(), &["required", "url"]);
        v.field("birth_date", self.birth_date.as_deref(), &["required", "ymd_date"]);
        v.finish()
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdatePerfumer {
    name: Option<String>,
    nationality: Option<String>,
    image_url: Option<String>,
    birth_date: Option<String>,
}

impl UpdatePerfumer {
    fn validate(&self) -> Result<(), AppError> {
        let mut v = Validator::new();
        v.present("name", self.name.as_deref(), &[]);
        v.present("nationality", self.nationality.as_deref(), &[]);
        v.present("image_url", self.image_url.as_deref(), &["url"]);
        v.present("birth_date", self.birth_date.as_deref(), &["ymd_date"]);
        v.finish()
    }

    fn apply_to(self, perfumer: &mut Perfumer) -> Result<(), AppError> {
        if let Some(name) = self.name {
            perfumer.slug = create_slug(&name);
            perfumer.name = name;
        }
        if let Some(nationality) = self.nationality {
            perfumer.nationality = nationality;
        }
        if let Some(image_url) = self.image_url {
            perfumer.image_url = image_url;
        }
        if let Some(birth_date) = self.birth_date {
            perfumer.birth_date = parse_date(&birth_date)?;
        }
        Ok(())
    }
}

/// Parses an already validated `YYYY-MM-DD` date.
fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| AppError::Internal(format!("unparseable date '{}': {}", value, e)))
}

pub async fn list(
    State(ctx): State<Context>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<Perfumer>>, ApiError> {
    let request = PageRequest::resolve(&query, &ctx.cursors);
    let perfumers = ctx.resolve::<PerfumerRepository>().list(request).await?;
    paginate(&ctx, perfumers, request, |p| p.id)
}

pub async fn create(
    State(ctx): State<Context>,
    JsonBody(req): JsonBody<CreatePerfumer>,
) -> Result<StatusCode, ApiError> {
    req.validate()?;

    let mut perfumer = ctx.factory.new_perfumer(
        req.name.as_deref().unwrap_or_default(),
        req.nationality.as_deref().unwrap_or_default(),
        req.image_url.as_deref().unwrap_or_default(),
        parse_date(req.birth_date.as_deref().unwrap_or_default())?,
    )?;
    ctx.resolve::<PerfumerRepository>().save(&mut perfumer).await?;

    Ok(StatusCode::CREATED)
}

pub async fn show(
    State(ctx): State<Context>,
    Path(slug): Path<String>,
) -> Result<Json<Perfumer>, ApiError> {
    let perfumer = ctx.resolve::<PerfumerRepository>().find_by_slug(&slug).await?;
    Ok(Json(perfumer))
}

pub async fn update(
    State(ctx): State<Context>,
    Path(public_id): Path<String>,
    JsonBody(req): JsonBody<UpdatePerfumer>,
) -> Result<StatusCode, ApiError> {
    req.validate()?;

    let repo = ctx.resolve::<PerfumerRepository>();
    let mut perfumer = repo.find(&public_id).await?;
    req.apply_to(&mut perfumer)?;
    repo.save(&mut perfumer).await?;

    Ok(StatusCode::OK)
}
