//! Document ids, one type per collection.
//!
//! Stored as 32-char simple UUIDs; anything a client sends is accepted
//! as-is and checked when the document is looked up.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($name:ident) => {
        /// Id of a stored document.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Fresh id for a document about to be inserted.
            pub fn generate() -> Self {
                Self(uuid::Uuid::new_v4().simple().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl From<&$name> for serde_json::Value {
            fn from(id: &$name) -> Self {
                serde_json::Value::String(id.0.clone())
            }
        }
    };
}

define_id!(BookId);
define_id!(AuthorId);
define_id!(BookTypeId);
define_id!(CoverTypeId);
define_id!(LanguageId);
define_id!(PageTypeId);
define_id!(PublishingHouseId);
define_id!(BookSeriesId);
define_id!(DeliveryId);
define_id!(GroupDiscountId);
define_id!(OrderId);
define_id!(UserId);
define_id!(ImageId);
