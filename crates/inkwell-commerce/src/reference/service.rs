//! Generic CRUD over reference entities.

use std::marker::PhantomData;

use inkwell_db::{Db, Filter};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ReferenceEntity, UsageCheck};
use crate::error::CommerceError;
use crate::page::{Page, PageSettings};

const SORTABLE: &[(&str, &str)] = &[("name", "name")];

/// List query for reference entities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameQuery {
    /// Case-insensitive name substring.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub page: PageSettings,
}

impl NameQuery {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// CRUD service for one reference entity type.
pub struct ReferenceService<'a, E> {
    db: &'a Db,
    _entity: PhantomData<E>,
}

impl<'a, E: ReferenceEntity> ReferenceService<'a, E> {
    pub fn new(db: &'a Db) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }

    /// One page of entities, optionally filtered by name.
    pub fn list(&self, query: &NameQuery) -> Result<Page<E>, CommerceError> {
        let filter = match query.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Filter::text("name", name),
            _ => Filter::All,
        };
        let options = query.page.find_options(SORTABLE, "name")?;
        let total = self.db.count::<E>(&filter)?;
        let items = self.db.find::<E>(&filter, &options)?;
        Ok(Page::new(items, total, &query.page))
    }

    /// Every entity, ordered by name.
    pub fn all(&self) -> Result<Vec<E>, CommerceError> {
        let options = inkwell_db::FindOptions::new().sort_by("name", Default::default());
        Ok(self.db.find::<E>(&Filter::All, &options)?)
    }

    pub fn get(&self, id: &str) -> Result<E, CommerceError> {
        self.db
            .get::<E>(id)?
            .ok_or_else(|| CommerceError::not_found(E::KIND.entity, id))
    }

    pub fn create(&self, input: E::Input) -> Result<E, CommerceError> {
        let mut entity = E::from_input(input);
        self.check(&mut entity)?;
        self.db.insert(&entity)?;
        tracing::info!(
            entity = E::KIND.entity,
            id = entity.id(),
            name = entity.name(),
            "created reference entity"
        );
        Ok(entity)
    }

    pub fn update(&self, id: &str, input: E::Input) -> Result<E, CommerceError> {
        let mut entity = self.get(id)?;
        entity.apply(input);
        self.check(&mut entity)?;
        self.db.replace(&entity)?;
        tracing::info!(entity = E::KIND.entity, id, "updated reference entity");
        Ok(entity)
    }

    /// Delete an entity that nothing references.
    pub fn delete(&self, id: &str) -> Result<E, CommerceError> {
        let entity = self.get(id)?;
        if let Some((check, count)) = self.usage(id)? {
            return Err(CommerceError::InUse {
                entity: E::KIND.entity,
                id: id.to_string(),
                by: check.label,
                count,
            });
        }
        self.db.delete::<E>(id)?;
        tracing::info!(entity = E::KIND.entity, id, "deleted reference entity");
        Ok(entity)
    }

    /// The first usage check that finds references to `id`, with the count.
    pub fn usage(&self, id: &str) -> Result<Option<(UsageCheck, usize)>, CommerceError> {
        for check in E::KIND.usage {
            let filter = if check.many {
                Filter::contains(check.field, id)
            } else {
                Filter::eq(check.field, id)
            };
            let count = self.db.count_in(check.collection, &filter)?;
            if count > 0 {
                return Ok(Some((*check, count)));
            }
        }
        Ok(None)
    }

    /// Normalize and validate a candidate before it is written.
    fn check(&self, entity: &mut E) -> Result<(), CommerceError> {
        let trimmed = entity.name().trim().to_string();
        if trimmed.is_empty() {
            return Err(CommerceError::InvalidData(format!(
                "{} name must not be empty",
                E::KIND.entity
            )));
        }
        *entity.name_mut() = trimmed;
        entity.validate()?;

        for (kind, parent_id) in entity.parents() {
            if !self.db.contains_in(kind.collection, &parent_id)? {
                return Err(CommerceError::not_found(kind.entity, parent_id));
            }
        }

        self.ensure_unique(entity)
    }

    fn ensure_unique(&self, entity: &E) -> Result<(), CommerceError> {
        let mut filter = Filter::TextEquals {
            field: "name".to_string(),
            value: entity.name().to_string(),
            case_sensitive: E::KIND.uniqueness.is_case_sensitive(),
        }
        .and(Filter::Not(Box::new(Filter::eq(
            "id",
            Value::String(entity.id().to_string()),
        ))));
        if let Some((field, value)) = entity.scope() {
            filter = filter.and(Filter::eq(field, value));
        }

        if self.db.count::<E>(&filter)? > 0 {
            return Err(CommerceError::Duplicate {
                entity: E::KIND.entity,
                name: entity.name().to_string(),
            });
        }
        Ok(())
    }
}
