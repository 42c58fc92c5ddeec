//! Known service categories and their display metadata.
//!
//! Service names arrive as free text from the data store. They are mapped
//! onto a closed set of categories here; anything unknown lands on
//! [`ServiceCategory::Unrecognized`] and gets the generic icon.

use serde::{Deserialize, Serialize};

/// Icon shown for services outside the known categories.
pub const FALLBACK_ICON: &str = "🛠️";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceCategory {
    ClothesSelling,
    ShoesAndSneakers,
    LaptopRepair,
    BubuGownAndAnkara,
    LashFixing,
    HairStyling,
    MakeupServices,
    PhoneRepair,
    Unrecognized,
}

/// Every recognized category, in catalogue order.
pub const KNOWN_CATEGORIES: [ServiceCategory; 8] = [
    ServiceCategory::ClothesSelling,
    ServiceCategory::ShoesAndSneakers,
    ServiceCategory::LaptopRepair,
    ServiceCategory::BubuGownAndAnkara,
    ServiceCategory::LashFixing,
    ServiceCategory::HairStyling,
    ServiceCategory::MakeupServices,
    ServiceCategory::PhoneRepair,
];

impl ServiceCategory {
    /// Resolve a catalogue service name. Matching ignores case and
    /// surrounding whitespace.
    pub fn from_name(name: &str) -> Self {
        let needle = name.trim();
        KNOWN_CATEGORIES
            .into_iter()
            .find(|category| category.display_name().eq_ignore_ascii_case(needle))
            .unwrap_or(Self::Unrecognized)
    }

    /// Catalogue name as shown to customers.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::ClothesSelling => "Clothes Selling",
            Self::ShoesAndSneakers => "Shoes & Sneakers",
            Self::LaptopRepair => "Laptop Repair",
            Self::BubuGownAndAnkara => "Bubu Gown & Ankara",
            Self::LashFixing => "Lash Fixing",
            Self::HairStyling => "Hair Styling",
            Self::MakeupServices => "Makeup Services",
            Self::PhoneRepair => "Phone Repair",
            Self::Unrecognized => "Service",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::ClothesSelling => "👕",
            Self::ShoesAndSneakers => "👟",
            Self::LaptopRepair => "💻",
            Self::BubuGownAndAnkara => "✨",
            Self::LashFixing => "👁️",
            Self::HairStyling => "💇",
            Self::MakeupServices => "💄",
            Self::PhoneRepair => "📱",
            Self::Unrecognized => FALLBACK_ICON,
        }
    }

    pub fn is_recognized(self) -> bool {
        self != Self::Unrecognized
    }
}
