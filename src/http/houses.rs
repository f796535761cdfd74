//! `/houses` handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::{paginate, to_year, year_text, ApiError, JsonBody};
use crate::context::Context;
use crate::error::AppError;
use crate::models::{create_slug, House};
use crate::pagination::{ListQuery, Page, PageRequest};
use crate::repositories::HouseRepository;
use crate::validation::Validator;

#[derive(Debug, Deserialize)]
pub struct CreateHouse {
    name: Option<String>,
    country: Option<String>,
    description: Option<String>,
    year_founded: Option<i32>,
}

impl CreateHouse {
    fn validate(&self) -> Result<(), AppError> {
        let mut v = Validator::new();
        v.field("name", self.name.as_deref(), &["required"]);
        v.field("country", self.country.as_deref(), &["required"]);
        v.field("description", self.description.as_deref(), &["required"]);
        v.field(
            "year_founded",
            year_text(self.year_founded).as_deref(),
            &["required", "year"],
        );
        v.finish()
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateHouse {
    name: Option<String>,
    country: Option<String>,
    description: Option<String>,
    year_founded: Option<i32>,
}

impl UpdateHouse {
    fn validate(&self) -> Result<(), AppError> {
        let mut v = Validator::new();
        v.present("name", self.name.as_deref(), &[]);
        v.present("country", self.country.as_deref(), &[]);
        v.present("description", self.description.as_deref(), &[]);
        v.present("year_founded", year_text(self.year_founded).as_deref(), &["year"]);
        v.finish()
    }

    fn apply_to(self, house: &mut House) -> Result<(), AppError> {
        if let Some(name) = self.name {
            house.slug = create_slug(&name);
            house.name = name;
        }
        if let Some(country) = self.country {
            house.country = country;
        }
        if let Some(description) = self.description {
            house.description = description;
        }
        if let Some(year) = self.year_founded {
            house.year_founded = to_year(year)?;
        }
        Ok(())
    }
}

pub async fn list(
    State(ctx): State<Context>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<House>>, ApiError> {
    let request = PageRequest::resolve(&query, &ctx.cursors);
    let houses = ctx.resolve::<HouseRepository>().list(request).await?;
    paginate(&ctx, houses, request, |h| h.id)
}

pub async fn create(
    State(ctx): State<Context>,
    JsonBody(req): JsonBody<CreateHouse>,
) -> Result<StatusCode, ApiError> {
    req.validate()?;

    let mut house = ctx.factory.new_house(
        req.name.as_deref().unwrap_or_default(),
        req.country.as_deref().unwrap_or_default(),
        req.description.as_deref().unwrap_or_default(),
        to_year(req.year_founded.unwrap_or_default())?,
    )?;
    ctx.resolve::<HouseRepository>().save(&mut house).await?;

    Ok(StatusCode::CREATED)
}

pub async fn show(
    State(ctx): State<Context>,
    Path(slug): Path<String>,
) -> Result<Json<House>, ApiError> {
    let house = ctx.resolve::<HouseRepository>().find_by_slug(&slug).await?;
    Ok(Json(house))
}

pub async fn update(
    State(ctx): State<Context>,
    Path(public_id): Path<String>,
    JsonBody(req): JsonBody<UpdateHouse>,
) -> Result<StatusCode, ApiError> {
    req.validate()?;

    let repo = ctx.resolve::<HouseRepository>();
    let mut house = repo.find(&public_id).await?;
    req.apply_to(&mut house)?;
    repo.save(&mut house).await?;

    Ok(StatusCode::OK)
}
