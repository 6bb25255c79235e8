//! An in-memory CSV table with string cells.

use csv::{ReaderBuilder, Terminator, WriterBuilder};

use crate::Error;

/// A CSV document held in memory as a header row and rows of string cells.
///
/// Every row has exactly as many cells as there are headers. Missing values
/// are represented by empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Create a table from headers and rows.
    ///
    /// Rows shorter than the header are padded with empty cells.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidCSV] if a row has more cells than there are headers.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, Error> {
        let mut table = Self {
            headers,
            rows: Vec::with_capacity(rows.len()),
        };

        for (row_number, row) in rows.into_iter().enumerate() {
            table.push_row(row, row_number + 1)?;
        }

        Ok(table)
    }

    /// Parse CSV text where the first record is the header row.
    ///
    /// Blank lines are skipped and a leading UTF-8 byte order mark is ignored.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidCSV] if `bytes` is not valid UTF-8 CSV, has no
    /// header row, or contains a record with more fields than the header.
    pub fn from_csv(bytes: &[u8]) -> Result<Self, Error> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|error| Error::InvalidCSV(error.to_string()))?
            .iter()
            .map(str::to_owned)
            .collect();

        if headers.is_empty() {
            return Err(Error::InvalidCSV("no columns to parse".to_owned()));
        }

        let mut table = Self {
            headers,
            rows: Vec::new(),
        };

        for record in reader.records() {
            let record = record.map_err(|error| Error::InvalidCSV(error.to_string()))?;
            let line = record
                .position()
                .and_then(|position| usize::try_from(position.line()).ok())
                .unwrap_or(table.rows.len() + 2);

            table.push_row(record.iter().map(str::to_owned).collect(), line)?;
        }

        Ok(table)
    }

    /// Write the table as UTF-8 CSV with `\n` line endings and no index column.
    ///
    /// # Errors
    ///
    /// Returns [Error::CsvWriteError] if a record could not be written.
    pub fn to_csv(&self) -> Result<Vec<u8>, Error> {
        let mut writer = WriterBuilder::new()
            .terminator(Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        writer
            .write_record(&self.headers)
            .map_err(|error| Error::CsvWriteError(error.to_string()))?;

        for row in &self.rows {
            writer
                .write_record(row)
                .map_err(|error| Error::CsvWriteError(error.to_string()))?;
        }

        writer
            .into_inner()
            .map_err(|error| Error::CsvWriteError(error.to_string()))
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// The position of the first column named `name`, if any.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    /// The cells of the column at `index`, top to bottom.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows.iter().map(move |row| row[index].as_str())
    }

    /// Remove every column whose header does not satisfy `keep`.
    pub fn retain_columns(&mut self, keep: impl Fn(&str) -> bool) {
        let kept: Vec<bool> = self.headers.iter().map(|header| keep(header)).collect();

        if kept.iter().all(|&is_kept| is_kept) {
            return;
        }

        let filter = |cells: &mut Vec<String>| {
            let mut index = 0;
            cells.retain(|_| {
                let is_kept = kept[index];
                index += 1;
                is_kept
            });
        };

        filter(&mut self.headers);
        self.rows.iter_mut().for_each(filter);
    }

    /// Remove every row that does not satisfy `keep`, preserving the order of the rest.
    pub fn retain_rows(&mut self, keep: impl FnMut(&[String]) -> bool) {
        let mut keep = keep;
        self.rows.retain(|row| keep(row));
    }

    /// Replace every cell in the column at `index` with `transform(cell)`.
    pub fn map_column(&mut self, index: usize, transform: impl Fn(&str) -> String) {
        for row in &mut self.rows {
            row[index] = transform(&row[index]);
        }
    }

    pub fn rename_column(&mut self, index: usize, name: &str) {
        self.headers[index] = name.to_owned();
    }

    /// Append a column to the right of the table.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidCSV] if `values` does not have one cell per row.
    pub fn push_column(&mut self, name: &str, values: Vec<String>) -> Result<(), Error> {
        if values.len() != self.rows.len() {
            return Err(Error::InvalidCSV(format!(
                "column \"{name}\" has {} values but the table has {} rows",
                values.len(),
                self.rows.len()
            )));
        }

        self.headers.push(name.to_owned());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }

        Ok(())
    }

    fn push_row(&mut self, mut row: Vec<String>, line: usize) -> Result<(), Error> {
        if row.len() > self.headers.len() {
            return Err(Error::InvalidCSV(format!(
                "expected {} fields in line {line}, saw {}",
                self.headers.len(),
                row.len()
            )));
        }

        row.resize(self.headers.len(), String::new());
        self.rows.push(row);

        Ok(())
    }
}

#[cfg(test)]
mod table_tests {
    use crate::{Error, table::Table};

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn parses_headers_and_rows() {
        let table = Table::from_csv(b"Name,Amount\nAlice,10\nBob,20\n").unwrap();

        assert_eq!(table.headers(), strings(&["Name", "Amount"]));
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows()[1], strings(&["Bob", "20"]));
    }

    #[test]
    fn pads_short_rows_with_empty_cells() {
        let table = Table::from_csv(b"A,B,C\n1,2\n").unwrap();

        assert_eq!(table.rows()[0], strings(&["1", "2", ""]));
    }

    #[test]
    fn rejects_rows_longer_than_header() {
        let result = Table::from_csv(b"A,B\n1,2,3\n");

        assert!(
            matches!(result, Err(Error::InvalidCSV(ref message)) if message.contains("line 2")),
            "got {result:?}"
        );
    }

    #[test]
    fn long_row_error_counts_lines_inside_quoted_fields() {
        let result = Table::from_csv(b"A,B\n\"x\ny\",1\n1,2,3\n");

        assert!(
            matches!(result, Err(Error::InvalidCSV(ref message)) if message.contains("line 4")),
            "got {result:?}"
        );
    }

    #[test]
    fn rejects_empty_input() {
        let result = Table::from_csv(b"");

        assert_eq!(result, Err(Error::InvalidCSV("no columns to parse".to_owned())));
    }

    #[test]
    fn rejects_invalid_utf8() {
        let result = Table::from_csv(b"A,B\n\xff\xfe,2\n");

        assert!(matches!(result, Err(Error::InvalidCSV(_))), "got {result:?}");
    }

    #[test]
    fn ignores_byte_order_mark() {
        let table = Table::from_csv(b"\xef\xbb\xbfCampaign Date,Amount\n2024-01-01,5\n").unwrap();

        assert_eq!(table.column_index("Campaign Date"), Some(0));
    }

    #[test]
    fn quoted_fields_keep_commas_and_newlines() {
        let table = Table::from_csv(b"Name,Note\n\"Smith, J\",\"line one\nline two\"\n").unwrap();

        assert_eq!(
            table.rows()[0],
            strings(&["Smith, J", "line one\nline two"])
        );
    }

    #[test]
    fn writes_csv_with_quoting_where_needed() {
        let table = Table::new(
            strings(&["Name", "Reference"]),
            vec![strings(&["Smith, J", "smith 42"]), strings(&["Doe", ""])],
        )
        .unwrap();

        let csv = String::from_utf8(table.to_csv().unwrap()).unwrap();

        assert_eq!(csv, "Name,Reference\n\"Smith, J\",smith 42\nDoe,\n");
    }

    #[test]
    fn retain_columns_drops_cells_in_every_row() {
        let mut table = Table::from_csv(b",Name,Unnamed: 2,Amount\n0,Alice,x,10\n1,Bob,y,20\n").unwrap();

        table.retain_columns(|header| !header.is_empty() && !header.starts_with("Unnamed"));

        assert_eq!(table.headers(), strings(&["Name", "Amount"]));
        assert_eq!(table.rows()[1], strings(&["Bob", "20"]));
    }

    #[test]
    fn retain_rows_preserves_order() {
        let mut table = Table::from_csv(b"Type\nFIM\nDON\nPFIM\n").unwrap();

        table.retain_rows(|row| row[0] != "DON");

        assert_eq!(table.rows(), [strings(&["FIM"]), strings(&["PFIM"])]);
    }

    #[test]
    fn push_column_requires_one_value_per_row() {
        let mut table = Table::from_csv(b"A\n1\n2\n").unwrap();

        let result = table.push_column("B", strings(&["x"]));

        assert!(matches!(result, Err(Error::InvalidCSV(_))), "got {result:?}");
        assert_eq!(table.headers(), strings(&["A"]));
    }
}
