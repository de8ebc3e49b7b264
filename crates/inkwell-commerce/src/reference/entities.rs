//! Reference entity documents.

use inkwell_db::Document;
use serde::{Deserialize, Serialize};

use super::kind::{
    ReferenceKind, AUTHOR, BOOK_SERIES, BOOK_TYPE, COVER_TYPE, DELIVERY, LANGUAGE, PAGE_TYPE,
    PUBLISHING_HOUSE,
};
use super::ReferenceEntity;
use crate::error::CommerceError;
use crate::ids::{
    AuthorId, BookSeriesId, BookTypeId, CoverTypeId, DeliveryId, ImageId, LanguageId, PageTypeId,
    PublishingHouseId,
};

/// Placeholder replaced by the tracking number in a delivery tracking URL.
pub const TRACKING_NUMBER_PLACEHOLDER: &str = "{number}";

macro_rules! impl_document {
    ($ty:ident, $kind:ident) => {
        impl Document for $ty {
            const COLLECTION: &'static str = $kind.collection;

            fn id(&self) -> &str {
                self.id.as_str()
            }
        }
    };
}

/// Input for entities that only carry a name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameInput {
    pub name: String,
}

impl NameInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

macro_rules! name_only_entity {
    ($(#[$meta:meta])* $ty:ident, $id:ident, $kind:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub struct $ty {
            pub id: $id,
            pub name: String,
        }

        impl_document!($ty, $kind);

        impl ReferenceEntity for $ty {
            const KIND: ReferenceKind = $kind;
            type Input = NameInput;

            fn from_input(input: NameInput) -> Self {
                Self {
                    id: $id::generate(),
                    name: input.name,
                }
            }

            fn apply(&mut self, input: NameInput) {
                self.name = input.name;
            }

            fn name(&self) -> &str {
                &self.name
            }

            fn name_mut(&mut self) -> &mut String {
                &mut self.name
            }
        }
    };
}

name_only_entity!(
    /// Hardcover edition, e-book, audiobook and so on.
    BookType,
    BookTypeId,
    BOOK_TYPE
);
name_only_entity!(CoverType, CoverTypeId, COVER_TYPE);
name_only_entity!(Language, LanguageId, LANGUAGE);
name_only_entity!(
    /// Paper kind (offset, newsprint, coated).
    PageType,
    PageTypeId,
    PAGE_TYPE
);

/// A book author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: AuthorId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl_document!(Author, AUTHOR);

impl ReferenceEntity for Author {
    const KIND: ReferenceKind = AUTHOR;
    type Input = AuthorInput;

    fn from_input(input: AuthorInput) -> Self {
        Self {
            id: AuthorId::generate(),
            name: input.name,
            description: input.description,
        }
    }

    fn apply(&mut self, input: AuthorInput) {
        self.name = input.name;
        self.description = input.description;
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn name_mut(&mut self) -> &mut String {
        &mut self.name
    }
}

/// A publisher. Tags are free-form labels used by the storefront.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishingHouse {
    pub id: PublishingHouseId,
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishingHouseInput {
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl_document!(PublishingHouse, PUBLISHING_HOUSE);

impl ReferenceEntity for PublishingHouse {
    const KIND: ReferenceKind = PUBLISHING_HOUSE;
    type Input = PublishingHouseInput;

    fn from_input(input: PublishingHouseInput) -> Self {
        Self {
            id: PublishingHouseId::generate(),
            name: input.name,
            tags: input.tags,
        }
    }

    fn apply(&mut self, input: PublishingHouseInput) {
        self.name = input.name;
        self.tags = input.tags;
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn name_mut(&mut self) -> &mut String {
        &mut self.name
    }

    fn validate(&self) -> Result<(), CommerceError> {
        if self.tags.iter().any(|t| t.trim().is_empty()) {
            return Err(CommerceError::InvalidData("tags must not be empty".into()));
        }
        Ok(())
    }
}

/// A series of books within one publishing house.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSeries {
    pub id: BookSeriesId,
    pub name: String,
    pub publishing_house: PublishingHouseId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookSeriesInput {
    pub name: String,
    pub publishing_house: PublishingHouseId,
    #[serde(default)]
    pub description: Option<String>,
}

impl_document!(BookSeries, BOOK_SERIES);

impl ReferenceEntity for BookSeries {
    const KIND: ReferenceKind = BOOK_SERIES;
    type Input = BookSeriesInput;

    fn from_input(input: BookSeriesInput) -> Self {
        Self {
            id: BookSeriesId::generate(),
            name: input.name,
            publishing_house: input.publishing_house,
            description: input.description,
        }
    }

    fn apply(&mut self, input: BookSeriesInput) {
        self.name = input.name;
        self.publishing_house = input.publishing_house;
        self.description = input.description;
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn name_mut(&mut self) -> &mut String {
        &mut self.name
    }

    fn scope(&self) -> Option<(&'static str, &str)> {
        Some(("publishingHouse", self.publishing_house.as_str()))
    }

    fn parents(&self) -> Vec<(ReferenceKind, String)> {
        vec![(PUBLISHING_HOUSE, self.publishing_house.to_string())]
    }
}

/// A delivery method.
///
/// `tracking_url` is a template containing [`TRACKING_NUMBER_PLACEHOLDER`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delivery {
    pub id: DeliveryId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_id: Option<ImageId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryInput {
    pub name: String,
    #[serde(default)]
    pub image_id: Option<ImageId>,
    #[serde(default)]
    pub tracking_url: Option<String>,
}

impl Delivery {
    /// Carrier link for a tracking number, if the delivery has a template.
    pub fn tracking_link(&self, tracking_number: &str) -> Option<String> {
        self.tracking_url
            .as_ref()
            .map(|url| url.replace(TRACKING_NUMBER_PLACEHOLDER, tracking_number))
    }
}

impl_document!(Delivery, DELIVERY);

impl ReferenceEntity for Delivery {
    const KIND: ReferenceKind = DELIVERY;
    type Input = DeliveryInput;

    fn from_input(input: DeliveryInput) -> Self {
        Self {
            id: DeliveryId::generate(),
            name: input.name,
            image_id: input.image_id,
            tracking_url: input.tracking_url,
        }
    }

    fn apply(&mut self, input: DeliveryInput) {
        self.name = input.name;
        self.image_id = input.image_id;
        self.tracking_url = input.tracking_url;
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn name_mut(&mut self) -> &mut String {
        &mut self.name
    }

    fn validate(&self) -> Result<(), CommerceError> {
        match &self.tracking_url {
            Some(url) if !url.contains(TRACKING_NUMBER_PLACEHOLDER) => {
                Err(CommerceError::InvalidData(format!(
                    "tracking url must contain {}",
                    TRACKING_NUMBER_PLACEHOLDER
                )))
            }
            _ => Ok(()),
        }
    }
}
