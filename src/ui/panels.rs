use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use qualifying_totals::data::filter::{FilterMode, TestedFilter, FEMALE, MALE};
use qualifying_totals::data::loader::Source;
use qualifying_totals::state::{AppState, PreviousTable, Selection};

use super::table::export_file_dialog;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    if state.current.is_none() {
        ui.label("No table loaded.");
        return;
    }

    // Clone what we need so we can mutate state inside the widgets.
    let options = state.options.clone();
    let sexes = [MALE.to_string(), FEMALE.to_string()];

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            if state.mode == FilterMode::SearchOverride {
                ui.strong("Search (overrides filters)");
                let edit = egui::TextEdit::singleline(&mut state.filters.search)
                    .hint_text("e.g., 24-39, SBD, Tested, 90, Female");
                if ui.add(edit).changed() {
                    state.refilter();
                }
                ui.separator();
            }

            multiselect(ui, state, "Sex", Selection::Sex, &sexes);
            multiselect(ui, state, "Age Category", Selection::AgeCategory, &options.age_categories);

            match state.mode {
                FilterMode::SexPartitioned => {
                    multiselect(
                        ui,
                        state,
                        "Weight Class (Kg) – Men",
                        Selection::MaleWeightClass,
                        &options.male_weight_classes,
                    );
                    multiselect(
                        ui,
                        state,
                        "Weight Class (Kg) – Women",
                        Selection::FemaleWeightClass,
                        &options.female_weight_classes,
                    );
                }
                FilterMode::SearchOverride => {
                    unified_weight_classes(ui, state, &options.weight_classes);
                }
            }

            multiselect(ui, state, "Equipment", Selection::Equipment, &options.equipment);

            ui.separator();
            ui.strong("Tested");
            let mut tested = state.filters.tested;
            egui::ComboBox::from_id_salt("tested_state")
                .selected_text(tested.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for choice in TestedFilter::ALL {
                        ui.selectable_value(&mut tested, choice, choice.label());
                    }
                });
            if tested != state.filters.tested {
                state.filters.tested = tested;
                state.refilter();
            }

            ui.separator();
            if ui.button("Reset").clicked() {
                state.reset_filters();
            }
        });
}

/// Collapsible checkbox list bound to one selection set.
fn multiselect(
    ui: &mut Ui,
    state: &mut AppState,
    title: &str,
    selection: Selection,
    values: &[String],
) {
    let n_selected = state.selection(selection).len();
    let header_text = format!("{title}  ({n_selected}/{})", values.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(title)
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            if ui.small_button("Clear").clicked() {
                state.select_none(selection);
            }
            for value in values {
                let mut checked = state.selection(selection).contains(value);
                if ui.checkbox(&mut checked, value.as_str()).changed() {
                    state.toggle_filter_value(selection, value);
                }
            }
        });
}

fn unified_weight_classes(ui: &mut Ui, state: &mut AppState, values: &[String]) {
    let n_selected = values.iter().filter(|v| state.weight_class_selected(v)).count();
    let header_text = format!("Weight Class (Kg)  ({n_selected}/{})", values.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt("weight_classes")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            for value in values {
                let mut checked = state.weight_class_selected(value);
                if ui.checkbox(&mut checked, value.as_str()).changed() {
                    state.toggle_any_weight_class(value);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.view(state.active).is_some(), egui::Button::new("Export CSV…"))
                .clicked()
            {
                let active = state.active;
                export_file_dialog(state, active);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(name), Some(table)) = (&state.current_name, &state.current) {
            ui.label(format!("{name}: {} rows", table.len()));
        }

        ui.separator();

        let search_mode = state.mode == FilterMode::SearchOverride;
        if ui
            .selectable_label(search_mode, "Search overrides filters")
            .clicked()
        {
            state.set_mode(if search_mode {
                FilterMode::SexPartitioned
            } else {
                FilterMode::SearchOverride
            });
        }

        ui.separator();

        match &state.previous {
            PreviousTable::NotRequested | PreviousTable::Loaded(_) => {}
            PreviousTable::Unavailable(path) => {
                ui.label(format!("No previous-period file ({})", path.display()));
            }
            PreviousTable::Failed(msg) => {
                ui.label(
                    RichText::new(format!("Previous period unavailable: {msg}"))
                        .color(Color32::YELLOW),
                );
            }
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open qualifying totals")
        .add_filter("Supported files", &["xlsx", "xlsm", "xlsb", "xls", "csv"])
        .add_filter("Excel", &["xlsx", "xlsm", "xlsb", "xls"])
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.open_current(&Source::path(path));
    }
}
