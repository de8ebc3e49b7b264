//! Entry point bundling the database with shop settings.

use std::sync::Arc;

use inkwell_db::{Db, Filter};
use serde::{Deserialize, Serialize};

use crate::basket::BasketService;
use crate::catalog::CatalogService;
use crate::error::CommerceError;
use crate::group_discount::GroupDiscountService;
use crate::order::OrderService;
use crate::reference::{ReferenceEntity, ReferenceService, REFERENCE_KINDS};
use crate::settings::ShopSettings;
use crate::user::UserService;

/// Document counts per collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopStats {
    pub collections: Vec<(String, usize)>,
}

impl ShopStats {
    pub fn count(&self, collection: &str) -> usize {
        self.collections
            .iter()
            .find(|(name, _)| name == collection)
            .map_or(0, |(_, count)| *count)
    }
}

/// The bookstore: database plus settings, handing out services.
///
/// Cheap to share behind an `Arc`; services borrow from it per call.
#[derive(Debug)]
pub struct Shop {
    db: Arc<Db>,
    settings: ShopSettings,
}

impl Shop {
    pub fn new(db: Arc<Db>, settings: ShopSettings) -> Self {
        Self { db, settings }
    }

    /// A shop over an empty in-memory database.
    pub fn in_memory(settings: ShopSettings) -> Self {
        Self::new(Arc::new(Db::in_memory()), settings)
    }

    pub fn db(&self) -> &Db {
        &self.db
    }

    pub fn settings(&self) -> &ShopSettings {
        &self.settings
    }

    pub fn catalog(&self) -> CatalogService<'_> {
        CatalogService::new(&self.db)
    }

    pub fn references<E: ReferenceEntity>(&self) -> ReferenceService<'_, E> {
        ReferenceService::new(&self.db)
    }

    pub fn group_discounts(&self) -> GroupDiscountService<'_> {
        GroupDiscountService::new(&self.db)
    }

    pub fn baskets(&self) -> BasketService<'_> {
        BasketService::new(&self.db, &self.settings)
    }

    pub fn orders(&self) -> OrderService<'_> {
        OrderService::new(&self.db, &self.settings)
    }

    pub fn users(&self) -> UserService<'_> {
        UserService::new(&self.db, &self.settings)
    }

    /// Write the database snapshot, if it is file-backed.
    pub fn persist(&self) -> Result<(), CommerceError> {
        if self.db.path().is_some() {
            self.db.persist()?;
        }
        Ok(())
    }

    pub fn stats(&self) -> Result<ShopStats, CommerceError> {
        let mut names: Vec<&str> = vec!["books", "groupDiscounts", "users", "orders"];
        names.extend(REFERENCE_KINDS.iter().map(|k| k.collection));

        let mut collections = Vec::with_capacity(names.len());
        for name in names {
            collections.push((name.to_string(), self.db.count_in(name, &Filter::All)?));
        }
        Ok(ShopStats { collections })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{Language, NameInput};

    #[test]
    fn test_services_share_the_database() {
        let shop = Shop::in_memory(ShopSettings::default());
        shop.references::<Language>()
            .create(NameInput::new("Ukrainian"))
            .unwrap();
        let stats = shop.stats().unwrap();
        assert_eq!(stats.count("languages"), 1);
        assert_eq!(stats.count("books"), 0);
        assert!(shop.persist().is_ok());
    }
}
