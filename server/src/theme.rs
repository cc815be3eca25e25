#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Default,
    Dark,
    Radical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeColors {
    pub title: &'static str,
    pub text: &'static str,
    pub icon: &'static str,
    pub bg: &'static str,
    pub border: &'static str,
    pub footer: &'static str,
}

/// Marker color of languages missing from [`language_color`].
pub const FALLBACK_LANGUAGE_COLOR: &str = "#858585";

impl Theme {
    /// Unknown or missing names resolve to [`Theme::Default`].
    pub fn from_name(name: Option<&str>) -> Self {
        match name {
            Some("dark") => Self::Dark,
            Some("radical") => Self::Radical,
            _ => Self::Default,
        }
    }

    pub const fn colors(self) -> ThemeColors {
        match self {
            Self::Default => ThemeColors {
                title: "#2f80ed",
                text: "#434d58",
                icon: "#4c71f2",
                bg: "#fffefe",
                border: "#e4e2e2",
                footer: "#888",
            },
            Self::Dark => ThemeColors {
                title: "#3fb950",
                text: "#c9d1d9",
                icon: "#58a6ff",
                bg: "#0d1117",
                border: "#30363d",
                footer: "#7d8590",
            },
            Self::Radical => ThemeColors {
                title: "#fe428e",
                text: "#a9fef7",
                icon: "#f8d847",
                bg: "#141321",
                border: "#382f45",
                footer: "#a9fef7",
            },
        }
    }
}

pub fn language_color(language: &str) -> &'static str {
    match language {
        "JavaScript" => "#f1e05a",
        "TypeScript" => "#2b7489",
        "Python" => "#3572A5",
        "Java" => "#b07219",
        "Go" => "#00ADD8",
        "Rust" => "#dea584",
        "Ruby" => "#701516",
        "PHP" => "#4F5D95",
        "C++" => "#f34b7d",
        "C" => "#555555",
        "C#" => "#178600",
        "Swift" => "#ffac45",
        "Kotlin" => "#F18E33",
        "Shell" => "#89e051",
        "HTML" => "#e34c26",
        "CSS" => "#563d7c",
        _ => FALLBACK_LANGUAGE_COLOR,
    }
}
