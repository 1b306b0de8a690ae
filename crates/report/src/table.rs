use std::io::Write;
use std::path::Path;

use stockwise_ai::Recommendation;

use crate::ReportError;

/// Write recommendations as CSV with a header row, preserving order.
pub fn write_table<W: Write>(writer: W, recommendations: &[Recommendation]) -> Result<(), ReportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for rec in recommendations {
        csv_writer.serialize(rec)?;
    }
    if recommendations.is_empty() {
        csv_writer.write_record(HEADER)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Header used when there are no rows to derive it from.
const HEADER: [&str; 8] = [
    "InventoryId",
    "Description",
    "Current_Stock",
    "Predicted_Demand",
    "Safety_Stock",
    "Reorder_Point",
    "Status",
    "Action",
];

pub fn write_table_file(path: &Path, recommendations: &[Recommendation]) -> Result<(), ReportError> {
    let file = std::fs::File::create(path)?;
    write_table(std::io::BufWriter::new(file), recommendations)
}
