//! Tabular output handed to a spreadsheet format. A [Workbook] is an ordered list of named sheets,
//! each made of rows that share the same columns.

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::{bail, Result};
use clap::ValueEnum;
use rust_xlsxwriter::Workbook as XlsxBook;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

pub type Row = Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Row>,
}

impl Sheet {
    /// Builds a sheet out of structs. Column order is the field order of `T`.
    pub fn from_rows<T: Serialize>(name: impl Into<String>, rows: &[T]) -> Result<Self> {
        let name = name.into();
        let rows = rows
            .iter()
            .map(|row| -> Result<Row> {
                match serde_json::to_value(row)? {
                    Value::Object(map) => Ok(map),
                    other => bail!("Rows of sheet {name:?} must be objects, got {other}"),
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { name, rows })
    }

    pub fn columns(&self) -> Vec<&str> {
        self.rows
            .first()
            .map(|row| row.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn push(&mut self, sheet: Sheet) {
        self.sheets.push(sheet);
    }

    #[cfg(test)]
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|v| v.name == name)
    }
}

/// Serializes a [Workbook] into a downloadable document.
pub trait SpreadsheetWriter {
    /// Appended to the export file name.
    fn extension(&self) -> &'static str;

    fn write(&self, workbook: &Workbook, path: &Path) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WorkbookFormat {
    Xlsx,
    Json,
    Tsv,
}

impl WorkbookFormat {
    pub fn writer(self) -> Box<dyn SpreadsheetWriter> {
        match self {
            WorkbookFormat::Xlsx => Box::new(XlsxWorkbookWriter),
            WorkbookFormat::Json => Box::new(JsonWorkbookWriter),
            WorkbookFormat::Tsv => Box::new(TsvWorkbookWriter),
        }
    }
}

/// Excel workbook with one worksheet per sheet. The first row of each worksheet holds the column
/// names.
pub struct XlsxWorkbookWriter;

impl XlsxWorkbookWriter {
    pub fn build(workbook: &Workbook) -> Result<XlsxBook> {
        let mut book = XlsxBook::new();
        for sheet in &workbook.sheets {
            let worksheet = book.add_worksheet();
            worksheet.set_name(&sheet.name)?;

            let columns = sheet.columns();
            for (col, name) in columns.iter().enumerate() {
                worksheet.write_string(0, u16::try_from(col)?, *name)?;
            }
            for (index, row) in sheet.rows.iter().enumerate() {
                let row_num = u32::try_from(index + 1)?;
                for (col, name) in columns.iter().enumerate() {
                    let col = u16::try_from(col)?;
                    match row.get(*name) {
                        None | Some(Value::Null) => {}
                        Some(Value::Number(number)) => match number.as_f64() {
                            Some(number) => {
                                worksheet.write_number(row_num, col, number)?;
                            }
                            None => {
                                worksheet.write_string(row_num, col, number.to_string())?;
                            }
                        },
                        Some(Value::Bool(value)) => {
                            worksheet.write_boolean(row_num, col, *value)?;
                        }
                        Some(Value::String(text)) => {
                            worksheet.write_string(row_num, col, text)?;
                        }
                        Some(other) => {
                            worksheet.write_string(row_num, col, other.to_string())?;
                        }
                    }
                }
            }
        }
        Ok(book)
    }
}

impl SpreadsheetWriter for XlsxWorkbookWriter {
    fn extension(&self) -> &'static str {
        "xlsx"
    }

    fn write(&self, workbook: &Workbook, path: &Path) -> Result<()> {
        Self::build(workbook)?.save(path)?;
        debug!("Wrote {} worksheets to {path:?}", workbook.sheets.len());
        Ok(())
    }
}

/// One JSON document mapping sheet names to their rows.
pub struct JsonWorkbookWriter;

impl SpreadsheetWriter for JsonWorkbookWriter {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn write(&self, workbook: &Workbook, path: &Path) -> Result<()> {
        let document = workbook
            .sheets
            .iter()
            .map(|sheet| (sheet.name.clone(), Value::from(sheet.rows.clone())))
            .collect::<Map<_, _>>();

        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, &document)?;
        writer.flush()?;
        debug!("Wrote workbook to {path:?}");
        Ok(())
    }
}

/// A directory with one tab separated file per sheet.
pub struct TsvWorkbookWriter;

impl TsvWorkbookWriter {
    pub fn sheet_path(dir: &Path, sheet: &Sheet) -> PathBuf {
        dir.join(format!("{}.tsv", sheet.name))
    }
}

impl SpreadsheetWriter for TsvWorkbookWriter {
    fn extension(&self) -> &'static str {
        "tsv"
    }

    fn write(&self, workbook: &Workbook, path: &Path) -> Result<()> {
        fs::create_dir_all(path)?;
        for sheet in &workbook.sheets {
            let mut writer = BufWriter::new(File::create(Self::sheet_path(path, sheet))?);
            let columns = sheet.columns();
            writeln!(writer, "{}", columns.join("\t"))?;
            for row in &sheet.rows {
                let cells = columns
                    .iter()
                    .map(|column| row.get(*column).map(tsv_cell).unwrap_or_default())
                    .collect::<Vec<_>>();
                writeln!(writer, "{}", cells.join("\t"))?;
            }
            writer.flush()?;
        }
        debug!("Wrote {} sheets into {path:?}", workbook.sheets.len());
        Ok(())
    }
}

fn tsv_cell(value: &Value) -> String {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    };
    text.replace(['\t', '\n', '\r'], " ")
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use serde::Serialize;
    use tempfile::tempdir;

    use super::{
        JsonWorkbookWriter, Sheet, SpreadsheetWriter, TsvWorkbookWriter, Workbook,
        XlsxWorkbookWriter,
    };

    #[derive(Serialize)]
    struct Person {
        #[serde(rename = "Name")]
        name: &'static str,
        #[serde(rename = "Visits")]
        visits: u32,
    }

    fn workbook() -> Result<Workbook> {
        let mut workbook = Workbook::default();
        workbook.push(Sheet::from_rows(
            "People",
            &[
                Person {
                    name: "Ana",
                    visits: 3,
                },
                Person {
                    name: "Tab\tName",
                    visits: 0,
                },
            ],
        )?);
        workbook.push(Sheet::from_rows("Empty", &Vec::<Person>::new())?);
        Ok(workbook)
    }

    #[test]
    fn test_sheet_keeps_field_order() -> Result<()> {
        let workbook = workbook()?;
        let sheet = workbook.sheet("People").unwrap();
        assert_eq!(sheet.columns(), vec!["Name", "Visits"]);
        assert!(workbook.sheet("Empty").unwrap().columns().is_empty());
        Ok(())
    }

    #[test]
    fn test_non_object_rows_are_rejected() {
        assert!(Sheet::from_rows("Numbers", &[1, 2, 3]).is_err());
    }

    #[test]
    fn test_json_writer() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("book.json");
        JsonWorkbookWriter.write(&workbook()?, &path)?;

        let written: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
        assert_eq!(written["People"][0]["Name"], "Ana");
        assert_eq!(written["People"][1]["Visits"], 0);
        assert_eq!(written["Empty"], serde_json::json!([]));
        Ok(())
    }

    #[test]
    fn test_xlsx_writer() -> Result<()> {
        let workbook = workbook()?;
        let mut book = XlsxWorkbookWriter::build(&workbook)?;
        assert_eq!(book.worksheet_from_index(0)?.name(), "People");
        assert_eq!(book.worksheet_from_index(1)?.name(), "Empty");
        assert!(book.worksheet_from_index(2).is_err());

        let dir = tempdir()?;
        let path = dir.path().join("book.xlsx");
        XlsxWorkbookWriter.write(&workbook, &path)?;
        let bytes = std::fs::read(&path)?;
        assert!(bytes.starts_with(b"PK"));
        Ok(())
    }

    #[test]
    fn test_tsv_writer() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("book");
        let workbook = workbook()?;
        TsvWorkbookWriter.write(&workbook, &path)?;

        let people =
            std::fs::read_to_string(TsvWorkbookWriter::sheet_path(&path, &workbook.sheets[0]))?;
        assert_eq!(people, "Name\tVisits\nAna\t3\nTab Name\t0\n");
        let empty =
            std::fs::read_to_string(TsvWorkbookWriter::sheet_path(&path, &workbook.sheets[1]))?;
        assert_eq!(empty, "\n");
        Ok(())
    }
}
