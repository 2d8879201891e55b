use crate::report::AssignmentReport;
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::path::Path;
use thiserror::Error;

pub const GIVES_TO_SHEET: &str = "Gives To";
pub const RECEIVES_FROM_SHEET: &str = "Receives From";

/// Errors that can occur when exporting a workbook
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] XlsxError),
}

/// Build the two-sheet workbook for `report`
///
/// "Gives To" has one row per giver with the children and adults they give
/// to; "Receives From" has one sentence per receiver.
pub fn build_workbook(report: &AssignmentReport) -> Result<Workbook, ExportError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let gives = workbook.add_worksheet();
    gives.set_name(GIVES_TO_SHEET)?;
    gives.write_string_with_format(0, 0, "This person gives", &header)?;
    gives.write_string_with_format(0, 1, "to this child", &header)?;
    gives.write_string_with_format(0, 2, "to this adult", &header)?;
    gives.set_column_width(0, 22)?;
    gives.set_column_width(1, 30)?;
    gives.set_column_width(2, 30)?;

    for (i, summary) in report.givers.iter().enumerate() {
        let row = (i + 1) as u32;
        gives.write_string(row, 0, &summary.giver)?;
        gives.write_string(row, 1, summary.children.join(", "))?;
        gives.write_string(row, 2, summary.adults.join(", "))?;
    }

    let receives = workbook.add_worksheet();
    receives.set_name(RECEIVES_FROM_SHEET)?;
    receives.write_string_with_format(0, 0, "This person receives from", &header)?;
    receives.set_column_width(0, 40)?;

    for (i, summary) in report.receivers.iter().enumerate() {
        let row = (i + 1) as u32;
        receives.write_string(row, 0, crate::report::receiver_line(summary))?;
    }

    Ok(workbook)
}

/// Write the workbook to `path`
pub fn export_to_file<P: AsRef<Path>>(report: &AssignmentReport, path: P) -> Result<(), ExportError> {
    let mut workbook = build_workbook(report)?;
    workbook.save(path.as_ref())?;
    tracing::info!("Results exported to {}", path.as_ref().display());
    Ok(())
}

/// Serialize the workbook into memory
pub fn export_to_buffer(report: &AssignmentReport) -> Result<Vec<u8>, ExportError> {
    let mut workbook = build_workbook(report)?;
    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{GiverSummary, ReceiverSummary};
    use calamine::{open_workbook_from_rs, Reader, Xlsx};
    use std::io::Cursor;

    fn read_sheet(bytes: &[u8], name: &str) -> Vec<Vec<String>> {
        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes.to_vec())).unwrap();
        let range = workbook.worksheet_range(name).unwrap();
        range
            .rows()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect()
    }

    fn sample_report() -> AssignmentReport {
        AssignmentReport {
            givers: vec![GiverSummary {
                giver: "Lea".into(),
                children: vec!["Emma".into()],
                adults: vec!["Jonas".into()],
            }],
            receivers: vec![
                ReceiverSummary { receiver: "Emma".into(), giver: "Lea".into() },
                ReceiverSummary { receiver: "Jonas".into(), giver: "Lea".into() },
            ],
        }
    }

    #[test]
    fn test_buffer_is_zip_container() {
        let bytes = export_to_buffer(&sample_report()).unwrap();
        assert!(bytes.len() > 4);
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_workbook_sheets_and_rows() {
        let bytes = export_to_buffer(&sample_report()).unwrap();

        let workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes.clone())).unwrap();
        assert_eq!(workbook.sheet_names(), vec![GIVES_TO_SHEET, RECEIVES_FROM_SHEET]);

        let gives = read_sheet(&bytes, GIVES_TO_SHEET);
        assert_eq!(gives[0], vec!["This person gives", "to this child", "to this adult"]);
        assert_eq!(gives[1], vec!["Lea", "Emma", "Jonas"]);
        assert_eq!(gives.len(), 2);

        let receives = read_sheet(&bytes, RECEIVES_FROM_SHEET);
        assert_eq!(receives[0], vec!["This person receives from"]);
        assert_eq!(receives[1], vec!["Emma receives from Lea"]);
        assert_eq!(receives[2], vec!["Jonas receives from Lea"]);
    }

    #[test]
    fn test_export_empty_report() {
        let bytes = export_to_buffer(&AssignmentReport::default()).unwrap();
        assert_eq!(&bytes[..2], b"PK");

        let gives = read_sheet(&bytes, GIVES_TO_SHEET);
        assert_eq!(gives.len(), 1);
    }

    #[test]
    fn test_export_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result.xlsx");

        export_to_file(&sample_report(), &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let receives = read_sheet(&bytes, RECEIVES_FROM_SHEET);
        assert_eq!(receives.len(), 3);
    }
}
