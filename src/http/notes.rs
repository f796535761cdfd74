//! `/notes` handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::{paginate, ApiError, JsonBody};
use crate::context::Context;
use crate::error::AppError;
use crate::models::{create_slug, Note};
use crate::pagination::{ListQuery, Page, PageRequest};
use crate::repositories::NoteRepository;
use crate::validation::Validator;

#[derive(Debug, Deserialize)]
pub struct CreateNote {
    name: Option<String>,
    description: Option<String>,
    image_url: Option<String>,
    note_group_id: Option<String>,
}

impl CreateNote {
    fn validate(&self) -> Result<(), AppError> {
        let mut v = Validator::new();
        v.field("name", self.name.as_deref(), &["required"]);
        v.field("description", self.description.as_deref(), &["required"]);
        v.field("image_url", self.image_url.as_deref(), &["url"]);
        v.field("note_group_id", self.note_group_id.as_deref(), &["required"]);
        v.finish()
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateNote {
    name: Option<String>,
    description: Option<String>,
    image_url: Option<String>,
    note_group_id: Option<String>,
}

impl UpdateNote {
    fn validate(&self) -> Result<(), AppError> {
        let mut v = Validator::new();
        v.present("name", self.name.as_deref(), &[]);
        v.present("description", self.description.as_deref(), &[]);
        v.field("image_url", self.image_url.as_deref(), &["url"]);
        v.present("note_group_id", self.note_group_id.as_deref(), &[]);
        v.finish()
    }

    fn apply_to(self, note: &mut Note) {
        if let Some(name) = self.name {
            note.slug = create_slug(&name);
            note.name = name;
        }
        if let Some(description) = self.description {
            note.description = description;
        }
        if let Some(image_url) = self.image_url {
            note.image_url = image_url;
        }
        if let Some(group) = self.note_group_id {
            note.note_group_id = group;
        }
    }
}

pub async fn list(
    State(ctx): State<Context>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<Note>>, ApiError> {
    let request = PageRequest::resolve(&query, &ctx.cursors);
    let notes = ctx.resolve::<NoteRepository>().list(request).await?;
    paginate(&ctx, notes, request, |n| n.id)
}

pub async fn create(
    State(ctx): State<Context>,
    JsonBody(req): JsonBody<CreateNote>,
) -> Result<StatusCode, ApiError> {
    req.validate()?;

    let mut note = ctx.factory.new_note(
        req.name.as_deref().unwrap_or_default(),
        req.description.as_deref().unwrap_or_default(),
        req.image_url.as_deref().unwrap_or_default(),
        req.note_group_id.as_deref().unwrap_or_default(),
    )?;
    ctx.resolve::<NoteRepository>().save(&mut note).await?;

    Ok(StatusCode::CREATED)
}

pub async fn show(
    State(ctx): State<Context>,
    Path(slug): Path<String>,
) -> Result<Json<Note>, ApiError> {
    let note = ctx.resolve::<NoteRepository>().find_by_slug(&slug).await?;
    Ok(Json(note))
}

pub async fn update(
    State(ctx): State<Context>,
    Path(public_id): Path<String>,
    JsonBody(req): JsonBody<UpdateNote>,
) -> Result<StatusCode, ApiError> {
    req.validate()?;

    let repo = ctx.resolve::<NoteRepository>();
    let mut note = repo.find(&public_id).await?;
    req.apply_to(&mut note);
    repo.save(&mut note).await?;

    Ok(StatusCode::OK)
}
