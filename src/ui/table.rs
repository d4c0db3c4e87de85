use eframe::egui::{self, Align, Layout, Ui};
use egui_extras::{Column, TableBuilder};

use qualifying_totals::data::model::{Field, TOTAL_HEADER};
use qualifying_totals::data::view::Segment;
use qualifying_totals::state::AppState;

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

/// One tab per available segment.
pub fn segment_tabs(ui: &mut Ui, state: &mut AppState) {
    let available: Vec<Segment> = state.views.iter().map(|v| v.segment).collect();
    ui.horizontal(|ui: &mut Ui| {
        for segment in available {
            if ui
                .selectable_label(state.active == segment, segment.title())
                .clicked()
            {
                state.active = segment;
            }
        }
    });
}

// ---------------------------------------------------------------------------
// Table (central panel)
// ---------------------------------------------------------------------------

/// Render the active segment: metrics, download button, rows.
pub fn table_view(ui: &mut Ui, state: &mut AppState) {
    let Some(view) = state.view(state.active) else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a qualifying totals workbook  (File → Open…)");
        });
        return;
    };

    let segment = view.segment;
    let summary = view.summary;
    ui.heading(segment.title());

    let mut download = false;
    ui.horizontal(|ui: &mut Ui| {
        ui.label(format!("Rows: {}", summary.rows));
        ui.separator();
        ui.label(format!("Weight classes: {}", summary.weight_classes));
        ui.separator();
        ui.label(format!("Age groups: {}", summary.age_groups));
        ui.separator();
        download = ui
            .button(format!("Download {} (CSV)", segment.title()))
            .clicked();
    });
    ui.separator();

    let records = &view.table.records;
    let headers: Vec<&str> = Field::SORT_ORDER
        .iter()
        .map(|f| f.header())
        .chain([TOTAL_HEADER])
        .collect();

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .cell_layout(Layout::left_to_right(Align::Center))
        .columns(Column::auto().at_least(70.0), headers.len())
        .header(20.0, |mut header| {
            for title in &headers {
                header.col(|ui| {
                    ui.strong(*title);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, records.len(), |mut row| {
                let record = &records[row.index()];
                for field in Field::SORT_ORDER {
                    row.col(|ui| {
                        ui.label(record.get(field));
                    });
                }
                row.col(|ui| {
                    ui.label(record.qualifying_total_kg.to_string());
                });
            });
        });

    if download {
        export_file_dialog(state, segment);
    }
}

// ---------------------------------------------------------------------------
// Export dialog
// ---------------------------------------------------------------------------

pub fn export_file_dialog(state: &mut AppState, segment: Segment) {
    let file = rfd::FileDialog::new()
        .set_title("Save table as CSV")
        .set_file_name(segment.export_file_name())
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        if let Err(e) = state.export_view(segment, &path) {
            log::error!("Export failed: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
