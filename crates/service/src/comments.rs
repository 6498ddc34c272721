use models::{comment, umkm};
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use tracing::{info, instrument, warn};

use crate::errors::ServiceError;

/// Outcome of a comment submission. The comment row is the primary write;
/// the rating aggregate on the business row is best-effort.
#[derive(Clone, Debug)]
pub struct CreatedComment {
    pub comment: comment::Model,
    pub aggregate_applied: bool,
}

/// Comments for one business, newest first.
pub async fn list_for_umkm(
    db: &DatabaseConnection,
    umkm_id: i32,
) -> Result<Vec<comment::Model>, ServiceError> {
    comment::Entity::find()
        .filter(comment::Column::UmkmId.eq(umkm_id))
        .order_by_desc(comment::Column::Id)
        .all(db)
        .await
        .map_err(ServiceError::db)
}

/// Insert a comment, then fold its rating into the business row.
///
/// The aggregate is one UPDATE whose arithmetic runs in the store, so
/// concurrent submissions serialize there and no increment is lost. If the
/// update fails or matches no row after the comment insert succeeded, the
/// creation still counts and `aggregate_applied` reports the miss.
#[instrument(skip(db, content))]
pub async fn create(
    db: &DatabaseConnection,
    user_id: i32,
    umkm_id: i32,
    content: &str,
    rating: f64,
) -> Result<CreatedComment, ServiceError> {
    let created = comment::create(db, user_id, umkm_id, content, rating).await?;

    let applied = umkm::Entity::update_many()
        .col_expr(
            umkm::Column::Rating,
            Expr::cust_with_values("(rating * total_rating + ?) / (total_rating + 1)", [rating]),
        )
        .col_expr(
            umkm::Column::TotalRating,
            Expr::col(umkm::Column::TotalRating).add(1),
        )
        .filter(umkm::Column::Id.eq(umkm_id))
        .exec(db)
        .await;

    let aggregate_applied = match applied {
        Ok(res) => res.rows_affected > 0,
        Err(e) => {
            warn!(umkm_id, error = %e, "rating aggregate update failed");
            false
        }
    };
    info!(comment_id = created.id, umkm_id, aggregate_applied, "comment_created");
    Ok(CreatedComment { comment: created, aggregate_applied })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{self, NewListing};
    use crate::test_support::get_db;
    use models::role::Role;
    use models::{category, user};
    use uuid::Uuid;

    async fn seed_business(
        db: &sea_orm::DatabaseConnection,
        tag: &str,
    ) -> Result<(user::Model, category::Model, umkm::Model), anyhow::Error> {
        let owner = user::create(
            db,
            &format!("rater_{tag}"),
            "Rater",
            &format!("rater_{tag}@example.com"),
            "argon2-hash",
            Role::User,
        )
        .await?;
        let cat = category::create(db, &format!("Cat {tag}")).await?;
        let listing = NewListing {
            name: format!("Kopi {tag}"),
            location: "Bandung".into(),
            description: String::new(),
            category_id: cat.id,
            photo: None,
        };
        let created = directory::submit(db, &listing, owner.id).await?;
        Ok((owner, cat, created))
    }

    #[tokio::test]
    async fn sequential_ratings_converge_to_the_mean() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else {
            return Ok(());
        };
        let tag = Uuid::new_v4().simple().to_string()[..8].to_string();
        let (owner, cat, business) = seed_business(&db, &tag).await?;

        let ratings = [5.0, 3.0, 4.0, 4.0];
        for r in ratings {
            let created = create(&db, owner.id, business.id, "mantap", r).await?;
            assert!(created.aggregate_applied);
        }

        let reloaded = umkm::Entity::find_by_id(business.id).one(&db).await?.unwrap();
        assert_eq!(reloaded.total_rating, ratings.len() as i32);
        let mean: f64 = ratings.iter().sum::<f64>() / ratings.len() as f64;
        assert!((reloaded.rating - mean).abs() < 1e-9);

        user::Entity::delete_by_id(owner.id).exec(&db).await?;
        category::Entity::delete_by_id(cat.id).exec(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn listing_is_newest_first_and_detail_carries_five() -> Result<(), anyhow::Error> {
        let Some(db) = get_db().await else {
            return Ok(());
        };
        let tag = Uuid::new_v4().simple().to_string()[..8].to_string();
        let (owner, cat, business) = seed_business(&db, &tag).await?;

        for i in 0..7 {
            create(&db, owner.id, business.id, &format!("komentar {i}"), 4.0).await?;
        }

        let listed = list_for_umkm(&db, business.id).await?;
        assert_eq!(listed.len(), 7);
        assert!(listed.windows(2).all(|w| w[0].id > w[1].id));

        let detail = directory::detail(&db, business.id).await?.unwrap();
        assert_eq!(detail.recent_comments.len(), 5);
        assert_eq!(detail.recent_comments[0].id, listed[0].id);
        assert_eq!(detail.category.id, cat.id);

        user::Entity::delete_by_id(owner.id).exec(&db).await?;
        category::Entity::delete_by_id(cat.id).exec(&db).await?;
        Ok(())
    }
}
