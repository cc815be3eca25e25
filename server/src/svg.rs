use num_format::{Locale, ToFormattedString};
use shared::{LanguageBreakdown, Stats};

use crate::theme::{language_color, Theme, ThemeColors};

const STATS_TEMPLATE: &str = include_str!("../public/templates/stats_card.svg");
const LANGUAGES_TEMPLATE: &str = include_str!("../public/templates/languages_card.svg");
const LANGUAGE_ROW_TEMPLATE: &str = include_str!("../public/templates/language_row.svg");
const ERROR_TEMPLATE: &str = include_str!("../public/templates/error_card.svg");

pub const CARD_WIDTH: u32 = 495;
pub const STATS_CARD_HEIGHT: u32 = 195;
pub const LANGUAGES_CARD_BASE_HEIGHT: u32 = 80;
pub const LANGUAGE_ROW_HEIGHT: u32 = 25;

// User supplied text is substituted last so that it can't contain placeholders of its own.

pub fn stats_card(stats: &Stats, theme: Theme) -> String {
    apply_theme(STATS_TEMPLATE, theme.colors())
        .replace(
            "{total-stars}",
            &stats.total_stars.to_formatted_string(&Locale::en),
        )
        .replace(
            "{total-forks}",
            &stats.total_forks.to_formatted_string(&Locale::en),
        )
        .replace("{total-repos}", &stats.total_repos.to_string())
        .replace("{followers}", &stats.followers.to_string())
        .replace("{following}", &stats.following.to_string())
        .replace("{name}", &escape_xml(&stats.display_name))
        .trim_end()
        .to_string()
}

/// Height grows by [`LANGUAGE_ROW_HEIGHT`] per language; an empty breakdown keeps the base height.
pub fn languages_card(languages: &LanguageBreakdown, theme: Theme) -> String {
    let height = languages_card_height(languages.len());
    let rows: String = languages
        .entries()
        .iter()
        .enumerate()
        .map(|(i, language)| {
            LANGUAGE_ROW_TEMPLATE
                .trim_end()
                .replace("{offset}", &(i as u32 * LANGUAGE_ROW_HEIGHT).to_string())
                .replace("{color}", language_color(&language.name))
                .replace("{percentage}", &escape_xml(&language.percentage))
                .replace("{language}", &escape_xml(&language.name))
        })
        .collect();

    apply_theme(LANGUAGES_TEMPLATE, theme.colors())
        .replace("{height}", &height.to_string())
        .replace("{rows}", &rows)
        .trim_end()
        .to_string()
}

pub fn error_card(message: &str) -> String {
    ERROR_TEMPLATE
        .replace("{message}", &escape_xml(message))
        .trim_end()
        .to_string()
}

pub fn languages_card_height(entries: usize) -> u32 {
    LANGUAGES_CARD_BASE_HEIGHT + entries as u32 * LANGUAGE_ROW_HEIGHT
}

fn apply_theme(svg: &str, colors: ThemeColors) -> String {
    svg.replace("{title-color}", colors.title)
        .replace("{text-color}", colors.text)
        .replace("{icon-color}", colors.icon)
        .replace("{bg-color}", colors.bg)
        .replace("{border-color}", colors.border)
        .replace("{footer-color}", colors.footer)
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
