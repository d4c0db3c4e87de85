use std::path::PathBuf;

use clap::Parser;

use crate::data::filter::FilterMode;

pub const DEFAULT_CURRENT_FILE: &str = "FP.xlsx";
pub const DEFAULT_PREVIOUS_FILE: &str = "FP_previous.xlsx";

/// Qualifying totals viewer. Log output is controlled with `RUST_LOG`.
#[derive(Debug, Clone, Parser)]
#[command(version, about)]
pub struct AppConfig {
    /// Workbook or CSV with the current period's qualifying totals.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CURRENT_FILE)]
    pub current: PathBuf,

    /// Optional workbook or CSV with the previous period's totals.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_PREVIOUS_FILE)]
    pub previous: PathBuf,

    /// Do not look for a previous-period file.
    #[arg(long)]
    pub no_previous: bool,

    /// Start with free-text search overriding all other filters.
    #[arg(long)]
    pub search_mode: bool,
}

impl AppConfig {
    pub fn previous_source(&self) -> Option<&PathBuf> {
        (!self.no_previous).then_some(&self.previous)
    }

    pub fn filter_mode(&self) -> FilterMode {
        if self.search_mode {
            FilterMode::SearchOverride
        } else {
            FilterMode::SexPartitioned
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            current: PathBuf::from(DEFAULT_CURRENT_FILE),
            previous: PathBuf::from(DEFAULT_PREVIOUS_FILE),
            no_previous: false,
            search_mode: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_period_files() {
        let config = AppConfig::try_parse_from(["qualifying-totals"]).unwrap();
        assert_eq!(config.current, PathBuf::from("FP.xlsx"));
        assert_eq!(config.previous_source(), Some(&PathBuf::from("FP_previous.xlsx")));
        assert_eq!(config.filter_mode(), FilterMode::SexPartitioned);
    }

    #[test]
    fn flags_override_defaults() {
        let config = AppConfig::try_parse_from([
            "qualifying-totals",
            "--current",
            "totals.csv",
            "--no-previous",
            "--search-mode",
        ])
        .unwrap();
        assert_eq!(config.current, PathBuf::from("totals.csv"));
        assert_eq!(config.previous_source(), None);
        assert_eq!(config.filter_mode(), FilterMode::SearchOverride);
    }
}
