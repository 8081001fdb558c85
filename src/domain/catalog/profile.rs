//! Creator profiles and the catalog that holds them.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::foundation::{Cents, Percentage, ProfileId, ValidationError, VideoId};

use super::ContentItem;

/// A creator profile with its content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    pub display_name: String,
    /// Monthly membership price. `None` or zero means a free ("follow") profile.
    #[serde(default)]
    pub membership_price: Option<Cents>,
    /// Discount applied to paid items while a member's promotion is running.
    #[serde(default)]
    pub promotion_percentage: Option<Percentage>,
    #[serde(default)]
    pub items: Vec<ContentItem>,
}

impl Profile {
    /// Checks catalog-level invariants: unique item ids.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut seen = HashSet::new();
        for item in &self.items {
            if !seen.insert(&item.id) {
                return Err(ValidationError::invalid_format(
                    "items",
                    format!("duplicate item id '{}' in profile '{}'", item.id, self.id),
                ));
            }
        }
        Ok(())
    }

    /// True when joining costs nothing.
    pub fn is_free(&self) -> bool {
        self.membership_price.map_or(true, |p| p.is_zero())
    }

    /// Promotion discount, treating an absent value as zero.
    pub fn promotion_discount(&self) -> Percentage {
        self.promotion_percentage.unwrap_or(Percentage::ZERO)
    }

    pub fn find_item(&self, id: &VideoId) -> Option<&ContentItem> {
        self.items.iter().find(|item| &item.id == id)
    }
}

/// All profiles known to the storefront.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub profiles: Vec<Profile>,
}

impl Catalog {
    pub fn new(profiles: Vec<Profile>) -> Result<Self, ValidationError> {
        let catalog = Self { profiles };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Checks every profile plus uniqueness of profile ids.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut seen = HashSet::new();
        for profile in &self.profiles {
            if !seen.insert(&profile.id) {
                return Err(ValidationError::invalid_format(
                    "profiles",
                    format!("duplicate profile id '{}'", profile.id),
                ));
            }
            profile.validate()?;
        }
        Ok(())
    }

    pub fn profile(&self, id: &ProfileId) -> Option<&Profile> {
        self.profiles.iter().find(|p| &p.id == id)
    }
}
