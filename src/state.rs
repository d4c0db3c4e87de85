use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::AppConfig;
use crate::data::filter::{FilterMode, FilterOptions, FilterState};
use crate::data::loader::{load_table, Source};
use crate::data::model::TidyTable;
use crate::data::view::{Segment, TableView};

// ---------------------------------------------------------------------------
// Secondary (previous period) table
// ---------------------------------------------------------------------------

/// Outcome of looking for the optional previous-period file.
#[derive(Debug, Clone, PartialEq)]
pub enum PreviousTable {
    /// Disabled in the configuration.
    NotRequested,
    /// No file at the configured path.
    Unavailable(PathBuf),
    /// The file exists but could not be loaded.
    Failed(String),
    Loaded(TidyTable),
}

impl PreviousTable {
    pub fn table(&self) -> Option<&TidyTable> {
        match self {
            PreviousTable::Loaded(t) => Some(t),
            _ => None,
        }
    }
}

/// Which multiselect a value toggle applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Sex,
    AgeCategory,
    MaleWeightClass,
    FemaleWeightClass,
    Equipment,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Current period table (None until a file loads successfully).
    pub current: Option<TidyTable>,

    /// Name of the source `current` came from.
    pub current_name: Option<String>,

    pub previous: PreviousTable,

    /// Per-session selections.
    pub filters: FilterState,

    pub mode: FilterMode,

    /// Choices for the filter widgets (cached).
    pub options: FilterOptions,

    /// One view per available segment (cached).
    pub views: Vec<TableView>,

    /// Tab on display.
    pub active: Segment,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            current: None,
            current_name: None,
            previous: PreviousTable::NotRequested,
            filters: FilterState::default(),
            mode: FilterMode::default(),
            options: FilterOptions::default(),
            views: Vec::new(),
            active: Segment::FullPower,
            status_message: None,
        }
    }
}

impl AppState {
    /// Load the configured sources once, at startup.
    pub fn from_config(config: &AppConfig) -> Self {
        let mut state = AppState {
            mode: config.filter_mode(),
            ..Default::default()
        };
        if let Some(path) = config.previous_source() {
            state.load_previous(path);
        }
        state.open_current(&Source::path(&config.current));
        state
    }

    /// Load the primary table, replacing the current one on success.
    pub fn load_current(&mut self, source: &Source) -> Result<()> {
        let name = source.name();
        let table = load_table(source)
            .with_context(|| format!("Could not read {name}. Please check the format"))?;
        self.current = Some(table);
        self.current_name = Some(name);
        self.status_message = None;
        self.rebuild_options();
        self.refilter();
        Ok(())
    }

    /// [`load_current`](Self::load_current), reporting failure in the status line.
    pub fn open_current(&mut self, source: &Source) {
        if let Err(e) = self.load_current(source) {
            log::error!("Failed to load file: {e:#}");
            self.status_message = Some(format!("Error: {e:#}"));
        }
    }

    /// Look for the previous-period file. Never fatal.
    pub fn load_previous(&mut self, path: &Path) {
        self.previous = if !path.exists() {
            log::info!("No previous-period file at {}", path.display());
            PreviousTable::Unavailable(path.to_path_buf())
        } else {
            match load_table(&Source::path(path)) {
                Ok(table) => PreviousTable::Loaded(table),
                Err(e) => {
                    log::warn!("Previous-period file {} unusable: {e}", path.display());
                    PreviousTable::Failed(e.to_string())
                }
            }
        };
        self.rebuild_options();
        self.refilter();
    }

    /// Recompute option lists from every loaded table.
    pub fn rebuild_options(&mut self) {
        let tables: Vec<&TidyTable> = self
            .current
            .iter()
            .chain(self.previous.table())
            .collect();
        self.options = FilterOptions::from_tables(&tables);
    }

    /// Recompute `views` after a filter, mode or data change.
    pub fn refilter(&mut self) {
        let mut views = Vec::new();
        if let Some(current) = &self.current {
            for segment in [Segment::FullPower, Segment::SingleLifts] {
                views.push(TableView::build(segment, current, &self.filters, self.mode));
            }
            if let Some(previous) = self.previous.table() {
                views.push(TableView::build(
                    Segment::PreviousPeriod,
                    previous,
                    &self.filters,
                    self.mode,
                ));
            }
        }
        if !views.iter().any(|v| v.segment == self.active) {
            self.active = Segment::FullPower;
        }
        self.views = views;
    }

    pub fn view(&self, segment: Segment) -> Option<&TableView> {
        self.views.iter().find(|v| v.segment == segment)
    }

    pub fn set_mode(&mut self, mode: FilterMode) {
        self.mode = mode;
        self.refilter();
    }

    /// Clear every filter.
    pub fn reset_filters(&mut self) {
        self.filters.reset();
        self.refilter();
    }

    pub fn selection(&self, selection: Selection) -> &BTreeSet<String> {
        match selection {
            Selection::Sex => &self.filters.sexes,
            Selection::AgeCategory => &self.filters.age_categories,
            Selection::MaleWeightClass => &self.filters.male_weight_classes,
            Selection::FemaleWeightClass => &self.filters.female_weight_classes,
            Selection::Equipment => &self.filters.equipment,
        }
    }

    pub fn selection_mut(&mut self, selection: Selection) -> &mut BTreeSet<String> {
        match selection {
            Selection::Sex => &mut self.filters.sexes,
            Selection::AgeCategory => &mut self.filters.age_categories,
            Selection::MaleWeightClass => &mut self.filters.male_weight_classes,
            Selection::FemaleWeightClass => &mut self.filters.female_weight_classes,
            Selection::Equipment => &mut self.filters.equipment,
        }
    }

    /// Toggle a single value in one of the multiselects.
    pub fn toggle_filter_value(&mut self, selection: Selection, value: &str) {
        let selected = self.selection_mut(selection);
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        self.refilter();
    }

    /// Whether a label is chosen in either weight-class set.
    pub fn weight_class_selected(&self, label: &str) -> bool {
        self.filters.male_weight_classes.contains(label)
            || self.filters.female_weight_classes.contains(label)
    }

    /// Toggle for the single weight-class selector of search mode, where
    /// the male and female sets act as one.
    pub fn toggle_any_weight_class(&mut self, label: &str) {
        if self.weight_class_selected(label) {
            self.filters.male_weight_classes.remove(label);
            self.filters.female_weight_classes.remove(label);
        } else {
            self.filters.male_weight_classes.insert(label.to_string());
        }
        self.refilter();
    }

    /// Deselect all values in a multiselect (no constraint).
    pub fn select_none(&mut self, selection: Selection) {
        self.selection_mut(selection).clear();
        self.refilter();
    }

    /// Write one view as CSV.
    pub fn export_view(&self, segment: Segment, path: &Path) -> Result<()> {
        let view = self
            .view(segment)
            .with_context(|| format!("{} is not available", segment.title()))?;
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        view.write_csv(BufWriter::new(file))
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!("Exported {} rows to {}", view.summary.rows, path.display());
        Ok(())
    }
}
