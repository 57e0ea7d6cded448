use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CategoryId {
    #[serde(rename = "c_univ")]
    Univ,
    #[serde(rename = "c_intern")]
    Intern,
    #[serde(rename = "c_toeic")]
    Toeic,
    #[serde(rename = "c_learning")]
    Learning,
    #[serde(rename = "c_phone")]
    Phone,
    #[serde(rename = "c_fun")]
    Fun,
    #[serde(rename = "c_meal")]
    Meal,
    #[serde(rename = "c_prep")]
    Prep,
    #[serde(rename = "c_move")]
    Move,
    #[serde(rename = "c_sleep")]
    Sleep,
    #[serde(rename = "c_other")]
    Other,
}

impl CategoryId {
    pub const ALL: [CategoryId; 11] = [
        CategoryId::Univ,
        CategoryId::Intern,
        CategoryId::Toeic,
        CategoryId::Learning,
        CategoryId::Phone,
        CategoryId::Fun,
        CategoryId::Meal,
        CategoryId::Prep,
        CategoryId::Move,
        CategoryId::Sleep,
        CategoryId::Other,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            CategoryId::Univ => "c_univ",
            CategoryId::Intern => "c_intern",
            CategoryId::Toeic => "c_toeic",
            CategoryId::Learning => "c_learning",
            CategoryId::Phone => "c_phone",
            CategoryId::Fun => "c_fun",
            CategoryId::Meal => "c_meal",
            CategoryId::Prep => "c_prep",
            CategoryId::Move => "c_move",
            CategoryId::Sleep => "c_sleep",
            CategoryId::Other => "c_other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CategoryId::Univ => "University",
            CategoryId::Intern => "Internship",
            CategoryId::Toeic => "TOEIC",
            CategoryId::Learning => "Learning",
            CategoryId::Phone => "Phone",
            CategoryId::Fun => "Fun",
            CategoryId::Meal => "Meal",
            CategoryId::Prep => "Preparation",
            CategoryId::Move => "Commute",
            CategoryId::Sleep => "Sleep",
            CategoryId::Other => "Other",
        }
    }

    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        self.code()
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        CategoryId::ALL.into_iter().find(|c| c.code() == s)
    }

    /// Helper: accept user input with or without the `c_` prefix, any case.
    pub fn from_code(code: &str) -> Option<Self> {
        let lower = code.trim().to_lowercase();
        let full = if lower.starts_with("c_") {
            lower
        } else {
            format!("c_{lower}")
        };
        CategoryId::from_db_str(&full)
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Category row as mirrored in the local cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub order: u32,
}

impl Category {
    /// Built-in categories in display order.
    pub fn builtin() -> Vec<Category> {
        CategoryId::ALL
            .iter()
            .enumerate()
            .map(|(i, id)| Category {
                id: *id,
                name: id.label().to_string(),
                order: i as u32,
            })
            .collect()
    }
}
