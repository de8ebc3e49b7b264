//! Users: profile, basket storage, likes and recently viewed books.

use inkwell_db::{Db, Document, Filter};
use serde::{Deserialize, Serialize};

use crate::basket::Basket;
use crate::catalog::{Book, BookView};
use crate::error::CommerceError;
use crate::ids::{BookId, UserId};
use crate::page::{Page, PageSettings};
use crate::settings::ShopSettings;

const SORTABLE: &[(&str, &str)] = &[
    ("email", "email"),
    ("lastName", "lastName"),
    ("createdAt", "createdAt"),
];

/// Role of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Customer,
    Admin,
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(flatten)]
    pub basket: Basket,
    #[serde(default)]
    pub liked_book_ids: Vec<BookId>,
    /// Most recent first, no duplicates.
    #[serde(default)]
    pub recently_viewed_book_ids: Vec<BookId>,
    pub created_at: i64,
}

impl Document for User {
    const COLLECTION: &'static str = "users";

    fn id(&self) -> &str {
        self.id.as_str()
    }
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Drop every trace of a deleted book. Returns whether anything changed.
    pub fn forget_book(&mut self, book_id: &BookId) -> bool {
        let in_basket = self.basket.forget_book(book_id);
        let before = self.liked_book_ids.len() + self.recently_viewed_book_ids.len();
        self.liked_book_ids.retain(|id| id != book_id);
        self.recently_viewed_book_ids.retain(|id| id != book_id);
        let after = self.liked_book_ids.len() + self.recently_viewed_book_ids.len();
        in_basket || before != after
    }

    /// Move a book to the front of the recently viewed list.
    pub fn record_view(&mut self, book_id: &BookId, limit: usize) {
        self.recently_viewed_book_ids.retain(|id| id != book_id);
        self.recently_viewed_book_ids.insert(0, book_id.clone());
        self.recently_viewed_book_ids.truncate(limit);
    }
}

/// Registration / profile payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInput {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Role,
}

/// Admin user list query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    /// Case-insensitive email substring.
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(flatten)]
    pub page: PageSettings,
}

/// User operations.
pub struct UserService<'a> {
    db: &'a Db,
    settings: &'a ShopSettings,
}

impl<'a> UserService<'a> {
    pub fn new(db: &'a Db, settings: &'a ShopSettings) -> Self {
        Self { db, settings }
    }

    pub fn create(&self, input: UserInput) -> Result<User, CommerceError> {
        let email = input.email.trim().to_string();
        if !email.contains('@') {
            return Err(CommerceError::InvalidData(format!(
                "\"{}\" is not an email address",
                email
            )));
        }
        if self.find_by_email(&email)?.is_some() {
            return Err(CommerceError::Duplicate {
                entity: "User",
                name: email,
            });
        }

        let user = User {
            id: UserId::generate(),
            email,
            first_name: input.first_name.trim().to_string(),
            last_name: input.last_name.trim().to_string(),
            phone: input.phone,
            role: input.role,
            basket: Basket::default(),
            liked_book_ids: Vec::new(),
            recently_viewed_book_ids: Vec::new(),
            created_at: crate::current_timestamp(),
        };
        self.db.insert(&user)?;
        tracing::info!(id = %user.id, role = ?user.role, "created user");
        Ok(user)
    }

    pub fn get(&self, id: &str) -> Result<User, CommerceError> {
        self.db
            .get::<User>(id)?
            .ok_or_else(|| CommerceError::not_found("User", id))
    }

    /// Resolve the calling user. Missing or unknown ids are `InvalidToken`.
    pub fn authenticate(&self, id: Option<&str>) -> Result<User, CommerceError> {
        let id = id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(CommerceError::InvalidToken)?;
        self.db.get::<User>(id)?.ok_or(CommerceError::InvalidToken)
    }

    /// Like [`authenticate`](Self::authenticate), additionally requiring the admin role.
    pub fn authenticate_admin(&self, id: Option<&str>) -> Result<User, CommerceError> {
        let user = self.authenticate(id)?;
        if !user.is_admin() {
            return Err(CommerceError::InvalidToken);
        }
        Ok(user)
    }

    pub fn find_by_email(&self, email: &str) -> Result<Option<User>, CommerceError> {
        let filter = Filter::TextEquals {
            field: "email".to_string(),
            value: email.trim().to_string(),
            case_sensitive: false,
        };
        Ok(self.db.find_one::<User>(&filter)?)
    }

    pub fn list(&self, query: &UserQuery) -> Result<Page<User>, CommerceError> {
        let mut filter = Filter::All;
        if let Some(email) = query.email.as_deref().filter(|e| !e.trim().is_empty()) {
            filter = filter.and(Filter::text("email", email.trim()));
        }
        if let Some(role) = query.role {
            filter = filter.and(Filter::eq("role", serde_json::to_value(role)?));
        }
        let options = query.page.find_options(SORTABLE, "createdAt")?;
        let total = self.db.count::<User>(&filter)?;
        let items = self.db.find::<User>(&filter, &options)?;
        Ok(Page::new(items, total, &query.page))
    }

    /// Update name and phone. Email and role stay as they are.
    pub fn update_profile(&self, id: &str, input: UserInput) -> Result<User, CommerceError> {
        let mut user = self.get(id)?;
        user.first_name = input.first_name.trim().to_string();
        user.last_name = input.last_name.trim().to_string();
        user.phone = input.phone;
        self.db.replace(&user)?;
        Ok(user)
    }

    pub fn like_book(&self, id: &str, book_id: &BookId) -> Result<User, CommerceError> {
        self.require_book(book_id)?;
        let mut user = self.get(id)?;
        if !user.liked_book_ids.contains(book_id) {
            user.liked_book_ids.push(book_id.clone());
            self.db.replace(&user)?;
        }
        Ok(user)
    }

    pub fn unlike_book(&self, id: &str, book_id: &BookId) -> Result<User, CommerceError> {
        let mut user = self.get(id)?;
        let before = user.liked_book_ids.len();
        user.liked_book_ids.retain(|b| b != book_id);
        if user.liked_book_ids.len() != before {
            self.db.replace(&user)?;
        }
        Ok(user)
    }

    pub fn record_view(&self, id: &str, book_id: &BookId) -> Result<User, CommerceError> {
        self.require_book(book_id)?;
        let mut user = self.get(id)?;
        user.record_view(book_id, self.settings.recently_viewed_limit);
        self.db.replace(&user)?;
        Ok(user)
    }

    pub fn liked_books(&self, id: &str) -> Result<Vec<BookView>, CommerceError> {
        let user = self.get(id)?;
        self.views(&user.liked_book_ids)
    }

    pub fn recently_viewed_books(&self, id: &str) -> Result<Vec<BookView>, CommerceError> {
        let user = self.get(id)?;
        self.views(&user.recently_viewed_book_ids)
    }

    fn views(&self, ids: &[BookId]) -> Result<Vec<BookView>, CommerceError> {
        let mut views = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(book) = self.db.get::<Book>(id.as_str())? {
                views.push(BookView::resolve(self.db, book)?);
            }
        }
        Ok(views)
    }

    fn require_book(&self, id: &BookId) -> Result<(), CommerceError> {
        if self.db.get::<Book>(id.as_str())?.is_none() {
            return Err(CommerceError::not_found("Book", id.as_str()));
        }
        Ok(())
    }
}
