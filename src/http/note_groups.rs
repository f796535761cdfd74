//! `/note-groups` handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::{paginate, ApiError, JsonBody};
use crate::context::Context;
use crate::error::AppError;
use crate::models::{create_slug, NoteGroup};
use crate::pagination::{ListQuery, Page, PageRequest};
use crate::repositories::NoteGroupRepository;
use crate::validation::Validator;

#[derive(Debug, Deserialize)]
pub struct CreateNoteGroup {
    name: Option<String>,
    description: Option<String>,
    #[serde(alias = "photo_url")]
    image_url: Option<String>,
}

impl CreateNoteGroup {
    fn validate(&self) -> Result<(), AppError> {
        let mut v = Validator::new();
        v.field("name", self.name.as_deref(), &["required"]);
        v.field("description", self.description.as_deref(), &["required"]);
        v.field("image_url", self.image_url.as_deref(), &["url"]);
        v.finish()
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateNoteGroup {
    name: Option<String>,
    description: Option<String>,
    /// `""` clears the image.
    #[serde(alias = "photo_url")]
    image_url: Option<String>,
}

impl UpdateNoteGroup {
    fn validate(&self) -> Result<(), AppError> {
        let mut v = Validator::new();
        v.present("name", self.name.as_deref(), &[]);
        v.present("description", self.description.as_deref(), &[]);
        v.field("image_url", self.image_url.as_deref(), &["url"]);
        v.finish()
    }

    fn apply_to(self, group: &mut NoteGroup) {
        if let Some(name) = self.name {
            group.slug = create_slug(&name);
            group.name = name;
        }
        if let Some(description) = self.description {
            group.description = description;
        }
        if let Some(image_url) = self.image_url {
            group.image_url = image_url;
        }
    }
}

pub async fn list(
    State(ctx): State<Context>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<NoteGroup>>, ApiError> {
    let request = PageRequest::resolve(&query, &ctx.cursors);
    let groups = ctx.resolve::<NoteGroupRepository>().list(request).await?;
    paginate(&ctx, groups, request, |g| g.id)
}

pub async fn create(
    State(ctx): State<Context>,
    JsonBody(req): JsonBody<CreateNoteGroup>,
) -> Result<StatusCode, ApiError> {
    req.validate()?;

    let mut group = ctx.factory.new_note_group(
        req.name.as_deref().unwrap_or_default(),
        req.description.as_deref().unwrap_or_default(),
        req.image_url.as_deref().unwrap_or_default(),
    )?;
    ctx.resolve::<NoteGroupRepository>().save(&mut group).await?;

    Ok(StatusCode::CREATED)
}

pub async fn show(
    State(ctx): State<Context>,
    Path(slug): Path<String>,
) -> Result<Json<NoteGroup>, ApiError> {
    let group = ctx
        .resolve::<NoteGroupRepository>()
        .find_by_slug(&slug)
        .await?;
    Ok(Json(group))
}

pub async fn update(
    State(ctx): State<Context>,
    Path(public_id): Path<String>,
    JsonBody(req): JsonBody<UpdateNoteGroup>,
) -> Result<StatusCode, ApiError> {
    req.validate()?;

    let repo = ctx.resolve::<NoteGroupRepository>();
    let mut group = repo.find(&public_id).await?;
    req.apply_to(&mut group);
    repo.save(&mut group).await?;

    Ok(StatusCode::OK)
}
