use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Category, EngineError, ResultEngine, TransactionKind, categories,
    util::{normalize_display_name, normalize_name_key},
};

use super::{Engine, normalize_optional_text, with_tx};

impl Engine {
    /// Lists the owner's categories, name ascending.
    pub async fn list_categories(&self, owner_id: &str) -> ResultEngine<Vec<Category>> {
        let models = categories::Entity::find()
            .filter(categories::Column::OwnerId.eq(owner_id))
            .order_by_asc(categories::Column::Name)
            .all(&self.database)
            .await?;

        models.into_iter().map(Category::try_from).collect()
    }

    /// Creates a category for the owner.
    ///
    /// Uniqueness is enforced per owner on the normalized name and, when
    /// present, on the short code.
    pub async fn create_category(
        &self,
        owner_id: &str,
        name: &str,
        kind: TransactionKind,
        code: Option<&str>,
    ) -> ResultEngine<Category> {
        let display = normalize_display_name(name, "category")?;
        let name_norm = normalize_name_key(&display);
        let code = normalize_optional_text(code);

        with_tx!(self, |db_tx| {
            if categories::Entity::find()
                .filter(categories::Column::OwnerId.eq(owner_id))
                .filter(categories::Column::NameNorm.eq(name_norm.clone()))
                .one(&db_tx)
                .await?
                .is_some()
            {
                return Err(EngineError::ExistingKey(display));
            }

            if let Some(code) = code.as_deref()
                && categories::Entity::find()
                    .filter(categories::Column::OwnerId.eq(owner_id))
                    .filter(categories::Column::Code.eq(code))
                    .one(&db_tx)
                    .await?
                    .is_some()
            {
                return Err(EngineError::ExistingKey(code.to_string()));
            }

            let category = Category {
                id: Uuid::new_v4(),
                owner_id: owner_id.to_string(),
                name: display.clone(),
                code: code.clone(),
                kind,
                created_at: Utc::now(),
            };

            let active = categories::ActiveModel {
                id: ActiveValue::Set(category.id),
                owner_id: ActiveValue::Set(category.owner_id.clone()),
                name: ActiveValue::Set(category.name.clone()),
                name_norm: ActiveValue::Set(name_norm.clone()),
                code: ActiveValue::Set(category.code.clone()),
                kind: ActiveValue::Set(category.kind.as_str().to_string()),
                created_at: ActiveValue::Set(category.created_at),
            };
            active.insert(&db_tx).await?;

            Ok(category)
        })
    }

    /// Loads a category by id, scoped to the owner.
    pub(super) async fn require_category<C: ConnectionTrait>(
        db: &C,
        owner_id: &str,
        category_id: Uuid,
    ) -> ResultEngine<categories::Model> {
        categories::Entity::find_by_id(category_id)
            .filter(categories::Column::OwnerId.eq(owner_id))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("category not exists".to_string()))
    }
}
