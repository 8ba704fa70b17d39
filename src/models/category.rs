//! Question categories.
//!
//! The set is closed: the database stores the short code, API responses
//! carry the human-readable label.

use serde::{Deserialize, Serialize};

/// Question category (game format).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Брейн-ринг")]
    BrainRing,
    #[serde(rename = "Брейн-ринг (резерв)")]
    BrainRingReserve,
    #[serde(rename = "Брейн-ринг (детский)")]
    BrainRingKids,
    #[serde(rename = "Вопросы из интернета")]
    Internet,
    #[serde(rename = "Бескрылка")]
    Beskrylka,
    #[serde(rename = "Что-где-когда")]
    WhatWhereWhen,
    #[serde(rename = "Что-где-когда (тренировки)")]
    WhatWhereWhenTraining,
    #[serde(rename = "Что-где-когда (детский)")]
    WhatWhereWhenKids,
    #[serde(rename = "Эрудитка")]
    Erudite,
    #[serde(rename = "Своя игра")]
    OwnGame,
}

impl Category {
    /// Every category, in code order.
    pub const ALL: [Category; 10] = [
        Self::BrainRing,
        Self::BrainRingReserve,
        Self::BrainRingKids,
        Self::Internet,
        Self::Beskrylka,
        Self::WhatWhereWhen,
        Self::WhatWhereWhenTraining,
        Self::WhatWhereWhenKids,
        Self::Erudite,
        Self::OwnGame,
    ];

    /// Categories shown on the public question pages.
    pub const PAGES: [Category; 3] = [Self::WhatWhereWhen, Self::BrainRing, Self::OwnGame];

    /// Short code stored in the database.
    pub fn code(&self) -> &'static str {
        match self {
            Self::BrainRing => "Б",
            Self::BrainRingReserve => "БД",
            Self::BrainRingKids => "ДБ",
            Self::Internet => "И",
            Self::Beskrylka => "Л",
            Self::WhatWhereWhen => "Ч",
            Self::WhatWhereWhenTraining => "ЧБ",
            Self::WhatWhereWhenKids => "ЧД",
            Self::Erudite => "Э",
            Self::OwnGame => "Я",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::BrainRing => "Брейн-ринг",
            Self::BrainRingReserve => "Брейн-ринг (резерв)",
            Self::BrainRingKids => "Брейн-ринг (детский)",
            Self::Internet => "Вопросы из интернета",
            Self::Beskrylka => "Бескрылка",
            Self::WhatWhereWhen => "Что-где-когда",
            Self::WhatWhereWhenTraining => "Что-где-когда (тренировки)",
            Self::WhatWhereWhenKids => "Что-где-когда (детский)",
            Self::Erudite => "Эрудитка",
            Self::OwnGame => "Своя игра",
        }
    }

    /// Parse a stored code.
    pub fn from_code(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == s)
    }

    /// Parse either a code or a label, as accepted from callers.
    pub fn from_str(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::from_code(s).or_else(|| Self::ALL.into_iter().find(|c| c.label() == s))
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_unique() {
        let mut codes: Vec<_> = Category::ALL.iter().map(|c| c.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), Category::ALL.len());
    }

    #[test]
    fn test_parse_code_and_label() {
        assert_eq!(Category::from_str("Ч"), Some(Category::WhatWhereWhen));
        assert_eq!(Category::from_str("Своя игра"), Some(Category::OwnGame));
        assert_eq!(Category::from_str(" ДБ "), Some(Category::BrainRingKids));
        assert_eq!(Category::from_str("Q"), None);
        assert_eq!(Category::from_code("Своя игра"), None);
    }

    #[test]
    fn test_serializes_as_label() {
        let json = serde_json::to_string(&Category::BrainRing).unwrap();
        assert_eq!(json, "\"Брейн-ринг\"");
    }
}
