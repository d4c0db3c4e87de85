//! Qualifying-total tables: load a wide spreadsheet, reshape it into a tidy
//! table and filter it for display.

pub mod config;
pub mod data;
pub mod state;
