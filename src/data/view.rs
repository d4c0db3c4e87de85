use std::io::Write;

use super::filter::{resolve, FilterMode, FilterState};
use super::model::{Field, TidyRecord, TidyTable};

// ---------------------------------------------------------------------------
// Segments – one tab each
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    FullPower,
    SingleLifts,
    /// The whole secondary (previous period) table, every event.
    PreviousPeriod,
}

impl Segment {
    pub const ALL: [Segment; 3] = [
        Segment::FullPower,
        Segment::SingleLifts,
        Segment::PreviousPeriod,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Segment::FullPower => "Full Power (SBD)",
            Segment::SingleLifts => "Single Lifts (B & D)",
            Segment::PreviousPeriod => "Previous Period",
        }
    }

    /// Events shown in this segment; `None` means all of them.
    pub fn events(self) -> Option<&'static [&'static str]> {
        match self {
            Segment::FullPower => Some(&["SBD"][..]),
            Segment::SingleLifts => Some(&["B", "D"][..]),
            Segment::PreviousPeriod => None,
        }
    }

    /// Suggested download name, e.g. `qualifying_totals_full_power_(sbd).csv`.
    pub fn export_file_name(self) -> String {
        format!(
            "qualifying_totals_{}.csv",
            self.title().replace(' ', "_").to_lowercase()
        )
    }
}

// ---------------------------------------------------------------------------
// TableView – what a tab displays
// ---------------------------------------------------------------------------

/// Headline numbers shown under a table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewSummary {
    pub rows: usize,
    pub weight_classes: usize,
    pub age_groups: usize,
}

impl ViewSummary {
    pub fn of(table: &TidyTable) -> Self {
        ViewSummary {
            rows: table.len(),
            weight_classes: table.distinct(Field::WeightClassKg).len(),
            age_groups: table.distinct(Field::AgeCategory).len(),
        }
    }
}

/// Filtered, sorted rows of one segment.
#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub segment: Segment,
    pub table: TidyTable,
    pub summary: ViewSummary,
}

impl TableView {
    /// Event subset → filter → stable display sort.
    pub fn build(
        segment: Segment,
        source: &TidyTable,
        state: &FilterState,
        mode: FilterMode,
    ) -> Self {
        let subset = match segment.events() {
            Some(events) => source.with_events(events),
            None => source.clone(),
        };
        let mut table = resolve(&subset, state, mode);
        sort_for_display(&mut table.records);
        let summary = ViewSummary::of(&table);
        TableView {
            segment,
            table,
            summary,
        }
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> csv::Result<()> {
        write_csv(&self.table.records, writer)
    }
}

/// Stable sort by Sex, Age Category, Event, Tested, Equipment, WeightClassKg.
pub fn sort_for_display(records: &mut [TidyRecord]) {
    records.sort_by(TidyRecord::display_cmp);
}

/// Write records as UTF-8 CSV with the export header.
///
/// The header is written even when there are no rows.
pub fn write_csv<W: Write>(records: &[TidyRecord], writer: W) -> csv::Result<()> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    let mut header: Vec<&str> = Field::SORT_ORDER.iter().map(|f| f.header()).collect();
    header.push(super::model::TOTAL_HEADER);
    writer.write_record(&header)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::QualifyingTotal;

    fn rec(sex: &str, age: &str, event: &str, wc: &str, total: f64) -> TidyRecord {
        TidyRecord {
            sex: sex.into(),
            age_category: age.into(),
            event: event.into(),
            tested: "Tested".into(),
            equipment: "Raw".into(),
            weight_class_kg: wc.into(),
            qualifying_total_kg: QualifyingTotal::Kg(total),
        }
    }

    fn sample() -> TidyTable {
        vec![
            rec("Male", "24-39", "SBD", "90", 500.0),
            rec("Female", "24-39", "B", "63", 90.0),
            rec("Male", "24-39", "SBD", "100", 520.0),
            rec("Female", "24-39", "SBD", "63", 300.0),
            rec("Male", "24-39", "D", "90", 230.0),
            // duplicate key, different total: order must survive the sort
            rec("Male", "24-39", "SBD", "90", 505.0),
        ]
        .into_iter()
        .collect()
    }

    fn unfiltered(segment: Segment) -> TableView {
        TableView::build(
            segment,
            &sample(),
            &FilterState::default(),
            FilterMode::default(),
        )
    }

    #[test]
    fn full_power_segment_sorts_stably() {
        let view = unfiltered(Segment::FullPower);
        let totals: Vec<String> = view
            .table
            .records
            .iter()
            .map(|r| format!("{} {} {}", r.sex, r.weight_class_kg, r.qualifying_total_kg))
            .collect();
        assert_eq!(
            totals,
            vec!["Female 63 300", "Male 100 520", "Male 90 500", "Male 90 505"]
        );
        assert_eq!(
            view.summary,
            ViewSummary {
                rows: 4,
                weight_classes: 3,
                age_groups: 1,
            }
        );
    }

    #[test]
    fn single_lifts_segment_keeps_bench_and_deadlift() {
        let view = unfiltered(Segment::SingleLifts);
        let events: Vec<&str> = view.table.records.iter().map(|r| r.event.as_str()).collect();
        assert_eq!(events, vec!["B", "D"]);
    }

    #[test]
    fn previous_period_segment_keeps_every_event() {
        let view = unfiltered(Segment::PreviousPeriod);
        assert_eq!(view.summary.rows, 6);
    }

    #[test]
    fn csv_export_has_fixed_header_and_display_order() {
        let view = unfiltered(Segment::SingleLifts);
        let mut out = Vec::new();
        view.write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "Sex,Age Category,Event,Tested,Equipment,WeightClassKg,QualifyingTotalKg\n\
             Female,24-39,B,Tested,Raw,63,90\n\
             Male,24-39,D,Tested,Raw,90,230\n"
        );
    }

    #[test]
    fn empty_export_still_has_header() {
        let mut out = Vec::new();
        write_csv(&[], &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Sex,Age Category,Event,Tested,Equipment,WeightClassKg,QualifyingTotalKg\n"
        );
    }

    #[test]
    fn export_file_names_follow_titles() {
        assert_eq!(
            Segment::FullPower.export_file_name(),
            "qualifying_totals_full_power_(sbd).csv"
        );
        assert_eq!(
            Segment::SingleLifts.export_file_name(),
            "qualifying_totals_single_lifts_(b_&_d).csv"
        );
    }
}
