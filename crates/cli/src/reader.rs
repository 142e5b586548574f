use std::io::Read;

use hindsight_core::log::RawRow;

/// A comma-delimited table: its header and its data rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<RawRow>,
}

/// Reads a comma-delimited table with a header row.
///
/// Surrounding whitespace is trimmed from headers and fields. Values are left
/// as text for the log loader to validate, and the header is kept so it can
/// be validated even when there are no data rows.
///
/// # Errors
///
/// Returns a [`csv::Error`] if the input is not valid CSV or a record has a
/// different number of fields than the header.
pub fn read_table<R: Read>(reader: R) -> Result<Table, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = reader.headers()?.clone();

    let rows = reader
        .records()
        .map(|record| -> Result<RawRow, csv::Error> {
            let record = record?;
            Ok(headers.iter().zip(record.iter()).collect())
        })
        .collect::<Result<_, _>>()?;

    Ok(Table {
        columns: headers.iter().map(str::to_owned).collect(),
        rows,
    })
}
