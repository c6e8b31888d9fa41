//! Accommodation tiers and meal preferences.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three accommodation packages offered at the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
pub enum PackageType {
    #[serde(rename = "Normal Tent")]
    NormalTent,
    #[serde(rename = "Cottage")]
    Cottage,
    #[serde(rename = "Luxury Cottage")]
    LuxuryCottage,
}

impl PackageType {
    /// Declaration order; also the tie-break order for popularity rankings.
    pub const ALL: [PackageType; 3] = [
        PackageType::NormalTent,
        PackageType::Cottage,
        PackageType::LuxuryCottage,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            PackageType::NormalTent => "Normal Tent",
            PackageType::Cottage => "Cottage",
            PackageType::LuxuryCottage => "Luxury Cottage",
        }
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Legacy single-value meal summary. Only ever read from older rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
pub enum FoodPreference {
    #[serde(rename = "Veg")]
    Veg,
    #[serde(rename = "Non-Veg")]
    NonVeg,
}
