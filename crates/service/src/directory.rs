use models::{category, comment, umkm};
use sea_orm::sea_query::{extension::postgres::PgExpr, Expr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use tracing::{info, instrument};

use crate::errors::ServiceError;
use crate::pagination::Pagination;

/// How many comments ride along on a detail response.
const RECENT_COMMENTS: u64 = 5;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortKey {
    Rating,
    #[default]
    Recommendation,
}

impl SortKey {
    /// `rating` sorts by rating alone; everything else is the default
    /// recommendation order (rating, then review count as tie-break).
    pub fn parse(input: Option<&str>) -> SortKey {
        match input {
            Some("rating") => SortKey::Rating,
            _ => SortKey::Recommendation,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ListFilter {
    pub q: Option<String>,
    pub location: Option<String>,
    pub category_id: Option<i32>,
    pub sort: SortKey,
}

#[derive(Clone, Debug)]
pub struct PagedUmkm {
    pub rows: Vec<umkm::Model>,
    pub total: u64,
}

/// A detail view: the row itself, its category, and the latest comments.
#[derive(Clone, Debug)]
pub struct UmkmDetail {
    pub umkm: umkm::Model,
    pub category: category::Model,
    pub recent_comments: Vec<comment::Model>,
}

/// Input for a user-submitted listing.
#[derive(Clone, Debug)]
pub struct NewListing {
    pub name: String,
    pub location: String,
    pub description: String,
    pub category_id: i32,
    pub photo: Option<String>,
}

/// Active listings, filtered and paginated, with the filtered total.
pub async fn list_active(
    db: &DatabaseConnection,
    filter: &ListFilter,
    pagination: Pagination,
) -> Result<PagedUmkm, ServiceError> {
    let mut query = umkm::Entity::find().filter(umkm::Column::IsActive.eq(true));
    if let Some(q) = filter.q.as_deref().filter(|s| !s.is_empty()) {
        query = query.filter(Expr::col(umkm::Column::Name).ilike(format!("%{q}%")));
    }
    if let Some(location) = filter.location.as_deref().filter(|s| !s.is_empty()) {
        query = query.filter(Expr::col(umkm::Column::Location).ilike(format!("%{location}%")));
    }
    if let Some(category_id) = filter.category_id {
        query = query.filter(umkm::Column::CategoryId.eq(category_id));
    }
    query = match filter.sort {
        SortKey::Rating => query.order_by_desc(umkm::Column::Rating),
        SortKey::Recommendation => query
            .order_by_desc(umkm::Column::Rating)
            .order_by_desc(umkm::Column::TotalRating),
    };

    let (page_idx, per_page) = pagination.normalize();
    let paginator = query.paginate(db, per_page);
    let total = paginator.num_items().await.map_err(ServiceError::db)?;
    let rows = paginator.fetch_page(page_idx).await.map_err(ServiceError::db)?;
    Ok(PagedUmkm { rows, total })
}

/// One listing plus its category and recent comments.
///
/// The category and comment lookups are independent store calls and run
/// concurrently.
pub async fn detail(db: &DatabaseConnection, id: i32) -> Result<Option<UmkmDetail>, ServiceError> {
    let Some(found) = umkm::Entity::find_by_id(id).one(db).await.map_err(ServiceError::db)? else {
        return Ok(None);
    };

    let (category_res, comments_res) = tokio::join!(
        category::Entity::find_by_id(found.category_id).one(db),
        comment::Entity::find()
            .filter(comment::Column::UmkmId.eq(id))
            .order_by_desc(comment::Column::Id)
            .limit(RECENT_COMMENTS)
            .all(db)
    );

    let category = category_res
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::Db(format!("category {} missing for umkm {}", found.category_id, id)))?;
    let recent_comments = comments_res.map_err(ServiceError::db)?;
    Ok(Some(UmkmDetail { umkm: found, category, recent_comments }))
}

/// Create an inactive listing owned by the caller; the referenced category
/// must exist.
#[instrument(skip(db, input), fields(name = %input.name))]
pub async fn submit(
    db: &DatabaseConnection,
    input: &NewListing,
    owner_id: i32,
) -> Result<umkm::Model, ServiceError> {
    if input.category_id <= 0 {
        return Err(ServiceError::Validation("categories must be a positive integer".into()));
    }
    let exists = category::Entity::find_by_id(input.category_id)
        .one(db)
        .await
        .map_err(ServiceError::db)?;
    if exists.is_none() {
        return Err(ServiceError::Validation("Invalid categories: not found".into()));
    }

    let created = umkm::create(
        db,
        &input.name,
        &input.location,
        &input.description,
        input.category_id,
        input.photo.clone(),
        owner_id,
    )
    .await?;
    info!(umkm_id = created.id, owner_id, "umkm_submitted");
    Ok(created)
}

/// All inactive listings awaiting approval, oldest first.
pub async fn pending(db: &DatabaseConnection) -> Result<Vec<umkm::Model>, ServiceError> {
    umkm::Entity::find()
        .filter(umkm::Column::IsActive.eq(false))
        .order_by_asc(umkm::Column::Id)
        .all(db)
        .await
        .map_err(ServiceError::db)
}

/// Flip a listing active and return the updated row. A missing id is classed
/// with other store failures, matching the admin tooling's error contract.
#[instrument(skip(db))]
pub async fn activate(db: &DatabaseConnection, id: i32) -> Result<umkm::Model, ServiceError> {
    let found = umkm::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::Db(format!("umkm {id} not found")))?;
    let mut am: umkm::ActiveModel = found.into();
    am.is_active = Set(true);
    let updated = am.update(db).await.map_err(ServiceError::db)?;
    info!(umkm_id = updated.id, "umkm_activated");
    Ok(updated)
}
