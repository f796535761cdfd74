//! `/perfumes` handlers.
//!
//! Creates and updates resolve every referenced house, perfumer and note
//! before touching the perfume, so an unknown reference fails with 422 and
//! nothing is written. Both return the saved aggregate.

use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use super::{double_option, paginate, to_year, year_text, ApiError, JsonBody};
use crate::context::Context;
use crate::error::{AppError, Resource};
use crate::models::{
    Concentration, House, NoteCategory, NotesByCategory, Perfume, PerfumeDraft, Perfumer,
};
use crate::pagination::{ListQuery, Page, PageRequest};
use crate::repositories::{
    HouseRepository, NoteRepository, PerfumeRepository, PerfumerRepository,
};
use crate::validation::Validator;

/// Note ids keyed by category name, as sent by clients.
type NoteIds = BTreeMap<String, Vec<String>>;

#[derive(Debug, Deserialize)]
pub struct CreatePerfume {
    name: Option<String>,
    description: Option<String>,
    concentration: Option<String>,
    image_url: Option<String>,
    year_released: Option<i32>,
    /// `0` or absent: still in production.
    year_discontinued: Option<i32>,
    house_id: Option<String>,
    perfumers: Option<Vec<String>>,
    notes: Option<NoteIds>,
}

impl CreatePerfume {
    fn validate(&self) -> Result<(), AppError> {
        let mut v = Validator::new();
        v.field("name", self.name.as_deref(), &["required"]);
        v.field(
            "concentration",
            self.concentration.as_deref(),
            &["required", "concentration"],
        );
        v.field("image_url", self.image_url.as_deref(), &["url"]);
        v.field(
            "year_released",
            year_text(self.year_released).as_deref(),
            &["required", "year"],
        );
        v.field(
            "year_discontinued",
            year_text(self.year_discontinued.filter(|y| *y != 0)).as_deref(),
            &["year"],
        );
        v.field("house_id", self.house_id.as_deref(), &["required"]);

        if self.perfumers.as_ref().map_or(true, Vec::is_empty) {
            v.fail("perfumers", "is required.");
        }

        match &self.notes {
            Some(notes) if notes.values().any(|ids| !ids.is_empty()) => {
                check_categories(&mut v, notes);
            }
            _ => {
                v.fail("notes", "must contain at least one note.");
            }
        }
        v.finish()
    }

    /// Scalar fields as a draft; references are resolved separately.
    fn scalars(&self) -> Result<PerfumeDraft, AppError> {
        Ok(PerfumeDraft {
            name: self.name.clone(),
            description: Some(self.description.clone().unwrap_or_default()),
            concentration: Some(parse_concentration(
                self.concentration.as_deref().unwrap_or_default(),
            )?),
            image_url: Some(self.image_url.clone().unwrap_or_default()),
            year_released: Some(to_year(self.year_released.unwrap_or_default())?),
            year_discontinued: Some(discontinued(self.year_discontinued)?),
            ..Default::default()
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdatePerfume {
    name: Option<String>,
    description: Option<String>,
    concentration: Option<String>,
    image_url: Option<String>,
    year_released: Option<i32>,
    /// Absent keeps the current value; `null` or `0` clears it.
    #[serde(default, deserialize_with = "double_option")]
    year_discontinued: Option<Option<i32>>,
    house_id: Option<String>,
    perfumers: Option<Vec<String>>,
    /// Only the supplied categories are replaced.
    notes: Option<NoteIds>,
}

impl UpdatePerfume {
    fn validate(&self) -> Result<(), AppError> {
        let mut v = Validator::new();
        v.present("name", self.name.as_deref(), &[]);
        v.present("description", self.description.as_deref(), &[]);
        v.present("concentration", self.concentration.as_deref(), &["concentration"]);
        v.field("image_url", self.image_url.as_deref(), &["url"]);
        v.present("year_released", year_text(self.year_released).as_deref(), &["year"]);
        v.field(
            "year_discontinued",
            year_text(self.year_discontinued.flatten().filter(|y| *y != 0)).as_deref(),
            &["year"],
        );
        v.present("house_id", self.house_id.as_deref(), &[]);

        if self.perfumers.as_ref().is_some_and(Vec::is_empty) {
            v.fail("perfumers", "must contain at least one perfumer.");
        }
        if let Some(notes) = &self.notes {
            check_categories(&mut v, notes);
        }
        v.finish()
    }

    fn scalars(&self) -> Result<PerfumeDraft, AppError> {
        Ok(PerfumeDraft {
            name: self.name.clone(),
            description: self.description.clone(),
            concentration: self
                .concentration
                .as_deref()
                .map(parse_concentration)
                .transpose()?,
            image_url: self.image_url.clone(),
            year_released: self.year_released.map(to_year).transpose()?,
            year_discontinued: self.year_discontinued.map(discontinued).transpose()?,
            ..Default::default()
        })
    }
}

/// Every note key must name a category.
fn check_categories(v: &mut Validator, notes: &NoteIds) {
    for key in notes.keys() {
        if key.trim().is_empty() {
            v.fail("notes", "contains an invalid note category ''.");
        } else {
            v.field("notes", Some(key.as_str()), &["note_category"]);
        }
    }
}

fn parse_concentration(value: &str) -> Result<Concentration, AppError> {
    value.parse().map_err(AppError::Internal)
}

fn discontinued(year: Option<i32>) -> Result<Option<chrono::NaiveDate>, AppError> {
    match year {
        None | Some(0) => Ok(None),
        Some(y) => to_year(y).map(Some),
    }
}

/// Houses, perfumers and notes loaded for a draft.
#[derive(Debug, Default)]
struct References {
    house: Option<House>,
    perfumers: Option<Vec<Perfumer>>,
    notes: Option<NotesByCategory>,
}

impl References {
    async fn load(
        ctx: &Context,
        house_id: Option<&str>,
        perfumers: Option<&[String]>,
        notes: Option<&NoteIds>,
    ) -> Result<Self, AppError> {
        let mut refs = Self::default();

        if let Some(house_id) = house_id {
            let house = ctx
                .resolve::<HouseRepository>()
                .find(house_id)
                .await
                .map_err(|err| match err {
                    AppError::NotFound { key, .. } => AppError::ReferenceNotFound {
                        field: "house_id",
                        resource: Resource::House,
                        ids: vec![key],
                    },
                    other => other,
                })?;
            refs.house = Some(house);
        }

        if let Some(ids) = perfumers {
            refs.perfumers = Some(ctx.resolve::<PerfumerRepository>().find_many(ids).await?);
        }

        if let Some(notes) = notes {
            let repo = ctx.resolve::<NoteRepository>();
            let mut resolved = NotesByCategory::new();
            for (key, ids) in notes {
                let category: NoteCategory = key.parse().map_err(AppError::Internal)?;
                resolved.insert(category, repo.find_many(ids).await?);
            }
            refs.notes = Some(resolved);
        }

        Ok(refs)
    }

    fn fill(self, mut draft: PerfumeDraft) -> PerfumeDraft {
        draft.house = self.house;
        draft.perfumers = self.perfumers;
        draft.notes = self.notes;
        draft
    }
}

pub async fn list(
    State(ctx): State<Context>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<Perfume>>, ApiError> {
    let request = PageRequest::resolve(&query, &ctx.cursors);
    let perfumes = ctx.resolve::<PerfumeRepository>().list(request).await?;
    paginate(&ctx, perfumes, request, |p| p.id)
}

pub async fn create(
    State(ctx): State<Context>,
    JsonBody(req): JsonBody<CreatePerfume>,
) -> Result<Json<Perfume>, ApiError> {
    req.validate()?;

    let refs = References::load(
        &ctx,
        req.house_id.as_deref(),
        req.perfumers.as_deref(),
        req.notes.as_ref(),
    )
    .await?;
    let mut perfume = ctx.factory.new_perfume(refs.fill(req.scalars()?))?;
    ctx.resolve::<PerfumeRepository>().save(&mut perfume).await?;

    tracing::info!(public_id = %perfume.public_id, slug = %perfume.slug, "Created perfume");
    Ok(Json(perfume))
}

pub async fn show(
    State(ctx): State<Context>,
    Path(slug): Path<String>,
) -> Result<Json<Perfume>, ApiError> {
    let perfume = ctx.resolve::<PerfumeRepository>().find_by_slug(&slug).await?;
    Ok(Json(perfume))
}

pub async fn update(
    State(ctx): State<Context>,
    Path(public_id): Path<String>,
    JsonBody(req): JsonBody<UpdatePerfume>,
) -> Result<Json<Perfume>, ApiError> {
    req.validate()?;

    let repo = ctx.resolve::<PerfumeRepository>();
    let mut perfume = repo.find(&public_id).await?;

    let refs = References::load(
        &ctx,
        req.house_id.as_deref(),
        req.perfumers.as_deref(),
        req.notes.as_ref(),
    )
    .await?;
    refs.fill(req.scalars()?).apply_to(&mut perfume);
    repo.save(&mut perfume).await?;

    Ok(Json(perfume))
}

#[cfg(test)]
mod tests {
    use super::super::testing::{offline_app, send};
    use super::*;
    use crate::models::january_first;
    use crate::models::testing::perfume;
    use axum::http::StatusCode;
    use serde_json::json;

    fn create(body: serde_json::Value) -> CreatePerfume {
        serde_json::from_value(body).unwrap()
    }

    fn valid_create() -> serde_json::Value {
        json!({
            "name": "Noir",
            "concentration": "Eau De Parfum",
            "year_released": 2020,
            "house_id": "h1",
            "perfumers": ["pf1"],
            "notes": {"top": ["n1"]}
        })
    }

    #[tokio::test]
    async fn test_create_reports_every_missing_field() {
        let (status, body) = send(offline_app().await, "POST", "/perfumes", Some("{}")).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let errors = &body["errors"];
        assert_eq!(errors["name"], json!(["The name field is required."]));
        assert_eq!(errors["concentration"], json!(["The concentration field is required."]));
        assert_eq!(errors["house_id"], json!(["The house id field is required."]));
        assert_eq!(errors["perfumers"], json!(["The perfumers field is required."]));
        assert_eq!(
            errors["notes"],
            json!(["The notes field must contain at least one note."])
        );
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_enumerations() {
        let mut body = valid_create();
        body["concentration"] = json!("Body Mist");
        body["notes"] = json!({"heart": ["n1"]});

        let (status, body) = send(
            offline_app().await,
            "POST",
            "/perfumes",
            Some(&body.to_string()),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body["errors"]["concentration"],
            json!(["The concentration field must be a valid concentration."])
        );
        assert_eq!(
            body["errors"]["notes"],
            json!(["The notes field contains an invalid note category 'heart'."])
        );
    }

    #[tokio::test]
    async fn test_valid_create_reaches_storage() {
        let (status, _) = send(
            offline_app().await,
            "POST",
            "/perfumes",
            Some(&valid_create().to_string()),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_zero_year_discontinued_means_in_production() {
        let mut body = valid_create();
        body["year_discontinued"] = json!(0);
        let req = create(body);

        assert!(req.validate().is_ok());
        let draft = req.scalars().unwrap();
        assert_eq!(draft.year_discontinued, Some(None));
        assert_eq!(draft.concentration, Some(Concentration::EauDeParfum));
        assert_eq!(draft.description.as_deref(), Some(""));
    }

    #[test]
    fn test_create_rejects_empty_note_lists() {
        let mut body = valid_create();
        body["notes"] = json!({"top": []});
        assert!(matches!(create(body).validate(), Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_rejects_empty_perfumers() {
        let (status, body) = send(
            offline_app().await,
            "PATCH",
            "/perfumes/p1",
            Some(r#"{"perfumers": []}"#),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            body["errors"]["perfumers"],
            json!(["The perfumers field must contain at least one perfumer."])
        );
    }

    #[test]
    fn test_update_year_discontinued_tri_state() {
        let mut p = perfume("p1", "Noir");
        p.year_discontinued = january_first(2015);

        let absent: UpdatePerfume = serde_json::from_value(json!({})).unwrap();
        absent.scalars().unwrap().apply_to(&mut p);
        assert_eq!(p.year_discontinued, january_first(2015));

        let set: UpdatePerfume = serde_json::from_value(json!({"year_discontinued": 2018})).unwrap();
        set.scalars().unwrap().apply_to(&mut p);
        assert_eq!(p.year_discontinued, january_first(2018));

        for clear in [json!({"year_discontinued": null}), json!({"year_discontinued": 0})] {
            p.year_discontinued = january_first(2018);
            let req: UpdatePerfume = serde_json::from_value(clear).unwrap();
            assert!(req.validate().is_ok());
            req.scalars().unwrap().apply_to(&mut p);
            assert_eq!(p.year_discontinued, None);
        }
    }

    #[test]
    fn test_update_concentration_reslugs() {
        let mut p = perfume("p1", "Noir");
        let req: UpdatePerfume =
            serde_json::from_value(json!({"concentration": "Extrait De Parfum"})).unwrap();
        req.scalars().unwrap().apply_to(&mut p);

        assert_eq!(p.concentration, Concentration::ExtraitDeParfum);
        assert_eq!(p.slug, "noir-extrait-de-parfum");
        assert_eq!(p.description, "A dark oriental");
    }
}
