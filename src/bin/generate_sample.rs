//! Writes `FP.xlsx` and `FP_previous.xlsx` with made-up qualifying totals.
//!
//! ```text
//! cargo run --bin generate_sample [OUT_DIR]
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

const HEADERS: [&str; 5] = ["Age Category", "Sex", "Event", "Tested", "Equipment"];
const EVENTS: [(&str, f64); 3] = [("SBD", 1.0), ("B", 0.27), ("D", 0.38)];
const TESTED: [&str; 2] = ["Yes", "No"];
const EQUIPMENT: [(&str, f64); 2] = [("Raw", 1.0), ("Single-ply", 1.12)];

struct SheetLayout {
    name: &'static str,
    sex: &'static str,
    /// (label, bodyweight used for the total)
    classes: &'static [(&'static str, f64)],
    /// Full-power total at 100 kg bodyweight, open age.
    base: f64,
}

const MEN: SheetLayout = SheetLayout {
    name: "Men",
    sex: "Male",
    classes: &[
        ("52", 52.0),
        ("56", 56.0),
        ("60", 60.0),
        ("67.5", 67.5),
        ("75", 75.0),
        ("82.5", 82.5),
        ("90", 90.0),
        ("100", 100.0),
        ("110", 110.0),
        ("125", 125.0),
        ("140", 140.0),
        ("140+", 150.0),
    ],
    base: 560.0,
};

const WOMEN: SheetLayout = SheetLayout {
    name: "Women",
    sex: "Female",
    classes: &[
        ("44", 44.0),
        ("48", 48.0),
        ("52", 52.0),
        ("56", 56.0),
        ("60", 60.0),
        ("67.5", 67.5),
        ("75", 75.0),
        ("82.5", 82.5),
        ("90", 90.0),
        ("90+", 100.0),
    ],
    base: 330.0,
};

/// (label, multiplier); single-ply is not offered below 19.
const AGES: [(&str, f64); 6] = [
    ("14-18", 0.82),
    ("19-23", 0.92),
    ("24-39", 1.0),
    ("40-44", 0.95),
    ("45-49", 0.9),
    ("50-54", 0.85),
];

/// Totals scale roughly with bodyweight^(2/3), rounded to the 2.5 kg plate step.
fn qualifying_total(base: f64, bodyweight: f64, factor: f64) -> f64 {
    let raw = base * (bodyweight / 100.0).powf(2.0 / 3.0) * factor;
    (raw / 2.5).round() * 2.5
}

fn write_sheet(sheet: &mut Worksheet, layout: &SheetLayout, period_factor: f64) -> Result<()> {
    sheet.set_name(layout.name)?;
    for (col, header) in HEADERS.iter().enumerate() {
        sheet.write_string(0, col as u16, *header)?;
    }
    for (i, (label, _)) in layout.classes.iter().enumerate() {
        sheet.write_string(0, (HEADERS.len() + i) as u16, *label)?;
    }

    let mut row: u32 = 1;
    for (age, age_factor) in AGES {
        for (event, event_factor) in EVENTS {
            for tested in TESTED {
                for (equipment, equipment_factor) in EQUIPMENT {
                    if age == "14-18" && equipment != "Raw" {
                        continue;
                    }
                    let values = [age, layout.sex, event, tested, equipment];
                    for (col, value) in values.iter().enumerate() {
                        sheet.write_string(row, col as u16, *value)?;
                    }
                    // untested lifters qualify slightly higher
                    let tested_factor = if tested == "No" { 1.05 } else { 1.0 };
                    let factor = age_factor
                        * event_factor
                        * equipment_factor
                        * tested_factor
                        * period_factor;
                    for (i, (_, bodyweight)) in layout.classes.iter().enumerate() {
                        let total = qualifying_total(layout.base, *bodyweight, factor);
                        sheet.write_number(row, (HEADERS.len() + i) as u16, total)?;
                    }
                    row += 1;
                }
            }
        }
    }
    Ok(())
}

fn write_workbook(path: &Path, period_factor: f64) -> Result<()> {
    let mut workbook = Workbook::new();
    for layout in [&MEN, &WOMEN] {
        let sheet = workbook.add_worksheet();
        write_sheet(sheet, layout, period_factor)?;
    }
    workbook
        .save(path)
        .with_context(|| format!("saving {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    let out_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    write_workbook(&out_dir.join("FP.xlsx"), 1.0)?;
    write_workbook(&out_dir.join("FP_previous.xlsx"), 0.96)?;
    Ok(())
}
