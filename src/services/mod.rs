// Service exports
pub mod roster_file;
pub mod spreadsheet;

pub use roster_file::{load_roster, parse_roster, RosterError, RosterFormat};
pub use spreadsheet::{
    build_workbook, export_to_buffer, export_to_file, ExportError, GIVES_TO_SHEET, RECEIVES_FROM_SHEET,
};
