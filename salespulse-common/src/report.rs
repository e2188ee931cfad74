//! CSV export of every submission for managers

use crate::db::models::Feedback;
use crate::Result;
use chrono::NaiveDate;

/// Byte-order mark so spreadsheet tools detect UTF-8
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub const REPORT_HEADER: [&str; 7] = [
    "ID",
    "Salesperson",
    "Feedback",
    "Time",
    "Status",
    "Lead Score",
    "Lead Label",
];

/// Serialize rows (already ordered by the caller) into a BOM-prefixed CSV
pub fn feedback_csv(rows: &[Feedback]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(UTF8_BOM.to_vec());
    writer.write_record(REPORT_HEADER)?;

    for row in rows {
        let score = row
            .lead_score
            .map(|s| format!("{:.2}", s))
            .unwrap_or_else(|| "N/A".to_string());
        let label = row.lead_label.map(|l| l.as_str()).unwrap_or("N/A");

        writer.write_record([
            row.id.to_string().as_str(),
            row.salesperson.as_str(),
            row.text.as_str(),
            row.timestamp.format("%Y-%m-%d %H:%M:%S").to_string().as_str(),
            row.status.as_str(),
            score.as_str(),
            label,
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| crate::Error::Internal(format!("CSV flush failed: {}", e)))
}

/// Attachment name for a report generated on `date`
pub fn report_filename(date: NaiveDate) -> String {
    format!("sales_report_{}.csv", date.format("%Y-%m-%d"))
}
