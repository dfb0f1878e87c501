#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Fashion,
    Household,
    Tech,
    Retail,
    Other,
}

pub const ALL: [Category; 5] = [
    Category::Fashion,
    Category::Household,
    Category::Tech,
    Category::Retail,
    Category::Other,
];

pub const DEFAULT_CATEGORY_ID: &str = "fashion";

impl Category {
    pub fn from_id(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fashion" => Some(Self::Fashion),
            "household" => Some(Self::Household),
            "tech" => Some(Self::Tech),
            "retail" => Some(Self::Retail),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn id(self) -> &'static str {
        match self {
            Category::Fashion => "fashion",
            Category::Household => "household",
            Category::Tech => "tech",
            Category::Retail => "retail",
            Category::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Fashion => "Хувцас загвар",
            Category::Household => "Гэр ахуй",
            Category::Tech => "Технологи",
            Category::Retail => "Худалдаа",
            Category::Other => "Бусад",
        }
    }

    pub fn position(self) -> usize {
        ALL.iter().position(|c| *c == self).unwrap_or(0)
    }
}

/// Display label for a category id. Ids outside the fixed set are their own label.
pub fn category_label(id: &str) -> String {
    Category::from_id(id)
        .map(|c| c.label().to_string())
        .unwrap_or_else(|| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_ids_resolve_to_mongolian_labels() {
        assert_eq!(category_label("fashion"), "Хувцас загвар");
        assert_eq!(category_label(" Tech "), "Технологи");
    }

    #[test]
    fn unknown_ids_pass_through() {
        assert_eq!(Category::from_id("agri"), None);
        assert_eq!(category_label("agri"), "agri");
    }

    #[test]
    fn ids_round_trip_through_from_id() {
        for cat in ALL {
            assert_eq!(Category::from_id(cat.id()), Some(cat));
        }
    }
}
