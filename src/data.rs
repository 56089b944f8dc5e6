//! Conversions between API item lists and CSV, spreadsheets, JSON text and tables.

use std::fs::File;
use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};
use rust_xlsxwriter::Workbook;
use serde_json::{Map, Value};
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::error::Result;

/// Pretty-print JSON with sorted keys and two-space indentation.
pub fn pretty_json(value: &Value) -> String {
    // Without `preserve_order`, serde_json maps iterate in key order.
    serde_json::to_string_pretty(value).unwrap_or_default()
}

/// Print JSON to stdout in a readable form.
pub fn jprint(value: &Value) {
    println!("{}", pretty_json(value));
}

/// Collect the `id` field of every item that has one.
pub fn list_ids(items: &[Value]) -> Vec<Value> {
    items.iter().filter_map(|item| item.get("id").cloned()).collect()
}

/// Column names: union of object keys, in first-seen order.
fn columns(items: &[Value]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for item in items {
        match item {
            Value::Object(map) => {
                for key in map.keys() {
                    if !columns.iter().any(|c| c == key) {
                        columns.push(key.clone());
                    }
                }
            }
            _ => {
                if !columns.iter().any(|c| c == "value") {
                    columns.push("value".to_string());
                }
            }
        }
    }
    columns
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
    }
}

fn row(item: &Value, columns: &[String]) -> Vec<String> {
    match item {
        Value::Object(map) => columns.iter().map(|c| cell(map.get(c))).collect(),
        other => columns
            .iter()
            .map(|c| if c == "value" { cell(Some(other)) } else { String::new() })
            .collect(),
    }
}

/// Interpret a CSV field: numbers and booleans become typed, empty becomes null.
fn typed(field: &str) -> Value {
    if field.is_empty() {
        return Value::Null;
    }
    match serde_json::from_str::<Value>(field) {
        Ok(v @ (Value::Number(_) | Value::Bool(_))) => v,
        _ => Value::String(field.to_string()),
    }
}

/// Parse CSV text with a header row into JSON objects.
pub fn from_csv_reader<R: std::io::Read>(reader: R) -> Result<Vec<Value>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);
    let headers = reader.headers()?.clone();

    let mut items = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut object = Map::new();
        for (name, field) in headers.iter().zip(record.iter()) {
            if !name.is_empty() {
                object.insert(name.to_string(), typed(field));
            }
        }
        items.push(Value::Object(object));
    }
    Ok(items)
}

/// Read a CSV file into JSON objects, one per row.
pub fn read_csv(path: impl AsRef<Path>) -> Result<Vec<Value>> {
    from_csv_reader(File::open(path)?)
}

/// Write items as CSV to any writer.
pub fn to_csv_writer<W: std::io::Write>(items: &[Value], writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    if items.is_empty() {
        writer.flush()?;
        return Ok(());
    }
    let columns = columns(items);
    writer.write_record(&columns)?;
    for item in items {
        writer.write_record(row(item, &columns))?;
    }
    writer.flush()?;
    Ok(())
}

/// Render items as CSV text.
pub fn to_csv_string(items: &[Value]) -> Result<String> {
    let mut out = Vec::new();
    to_csv_writer(items, &mut out)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Write items to a CSV file, one row per item.
pub fn write_csv(items: &[Value], path: impl AsRef<Path>) -> Result<()> {
    to_csv_writer(items, File::create(path)?)
}

fn xlsx_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(s) => typed(s),
        Data::Int(i) => Value::from(*i),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => Value::from(*f as i64),
        Data::Float(f) => serde_json::Number::from_f64(*f).map_or(Value::Null, Value::Number),
        Data::Bool(b) => Value::Bool(*b),
        other => Value::String(other.to_string()),
    }
}

/// Read the first worksheet of an xlsx file into JSON objects, one per row
/// below the header row.
pub fn read_xlsx(path: impl AsRef<Path>) -> Result<Vec<Value>> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let Some(range) = workbook.worksheet_range_at(0) else {
        return Ok(Vec::new());
    };
    let range = range?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<String> = header.iter().map(|c| c.to_string()).collect();

    let items = rows
        .map(|cells| {
            let object: Map<String, Value> = headers
                .iter()
                .zip(cells)
                .filter(|(name, _)| !name.is_empty())
                .map(|(name, cell)| (name.clone(), xlsx_value(cell)))
                .collect();
            Value::Object(object)
        })
        .collect();
    Ok(items)
}

/// Write items to an xlsx file with the same layout as [`write_csv`].
pub fn write_xlsx(items: &[Value], path: impl AsRef<Path>) -> Result<()> {
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        let columns = columns(items);
        for (col, name) in columns.iter().enumerate() {
            sheet.write_string(0, col as u16, name.as_str())?;
        }
        for (r, item) in items.iter().enumerate() {
            let r = r as u32 + 1;
            for (col, field) in row(item, &columns).iter().enumerate() {
                let col = col as u16;
                match typed(field) {
                    Value::Null => {}
                    Value::Bool(b) => {
                        sheet.write_boolean(r, col, b)?;
                    }
                    Value::Number(n) => {
                        sheet.write_number(r, col, n.as_f64().unwrap_or_default())?;
                    }
                    _ => {
                        sheet.write_string(r, col, field.as_str())?;
                    }
                }
            }
        }
    }
    workbook.save(path.as_ref())?;
    Ok(())
}

/// Render items as a text table.
pub fn render_table(items: &[Value]) -> String {
    let columns = columns(items);
    let mut builder = Builder::default();
    builder.push_record(columns.clone());
    for item in items {
        builder.push_record(row(item, &columns));
    }
    let mut table = builder.build();
    table.with(Style::psql());
    table.to_string()
}

/// Print items as a table to stdout.
pub fn print_table(items: &[Value]) {
    println!("{}", render_table(items));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MistError;
    use serde_json::json;

    #[test]
    fn test_list_ids() {
        let items = vec![json!({"id": "a"}), json!({"name": "x"}), json!({"id": 2})];
        assert_eq!(list_ids(&items), vec![json!("a"), json!(2)]);
    }

    #[test]
    fn test_pretty_json_sorts_keys() {
        let text = pretty_json(&json!({"b": 1, "a": {"d": 2, "c": 3}}));
        assert_eq!(
            text,
            "{\n  \"a\": {\n    \"c\": 3,\n    \"d\": 2\n  },\n  \"b\": 1\n}"
        );
    }

    #[test]
    fn test_to_csv_union_of_keys() {
        let items = vec![
            json!({"name": "ap1", "model": "AP43"}),
            json!({"name": "ap2", "serial": "X1", "tags": ["a"]}),
        ];
        let csv = to_csv_string(&items).unwrap();
        assert_eq!(csv, "model,name,serial,tags\nAP43,ap1,,\n,ap2,X1,\"[\"\"a\"\"]\"\n");
    }

    #[test]
    fn test_to_csv_empty() {
        assert_eq!(to_csv_string(&[]).unwrap(), "");
    }

    #[test]
    fn test_from_csv_types_values() {
        let items = from_csv_reader("name,vlan,enabled,notes\nguest,10,true,\nstaff,20,false,x\n".as_bytes())
            .unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[0],
            json!({"name": "guest", "vlan": 10, "enabled": true, "notes": null})
        );
        assert_eq!(items[1]["notes"], "x");
    }

    #[test]
    fn test_csv_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sites.csv");
        let items = vec![json!({"id": "s1", "count": 3}), json!({"id": "s2", "count": 5})];
        write_csv(&items, &path).unwrap();
        assert_eq!(read_csv(&path).unwrap(), items);
    }

    #[test]
    fn test_xlsx_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("devices.xlsx");
        let items = vec![
            json!({"name": "ap1", "port": 1, "enabled": true}),
            json!({"name": "ap2", "port": 2, "enabled": false, "notes": "spare"}),
            json!({"name": "ap3", "ratio": 0.5, "tags": ["a"]}),
        ];
        write_xlsx(&items, &path).unwrap();

        let read = read_xlsx(&path).unwrap();
        assert_eq!(read.len(), 3);
        assert_eq!(
            read[0],
            json!({"name": "ap1", "port": 1, "enabled": true, "notes": null, "ratio": null, "tags": null})
        );
        assert_eq!(read[1]["enabled"], false);
        assert_eq!(read[1]["notes"], "spare");
        assert_eq!(read[2]["ratio"], 0.5);
        assert_eq!(read[2]["tags"], "[\"a\"]");
    }

    #[test]
    fn test_xlsx_empty_items() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.xlsx");
        write_xlsx(&[], &path).unwrap();
        assert!(read_xlsx(&path).unwrap().is_empty());
    }

    #[test]
    fn test_read_xlsx_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_xlsx(dir.path().join("nope.xlsx")).unwrap_err();
        assert!(matches!(err, MistError::XlsxRead(_)));
    }

    #[test]
    fn test_render_table() {
        let items = vec![json!({"name": "ap1", "port": 1}), json!({"name": "ap2"})];
        let table = render_table(&items);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("name"));
        assert!(lines[0].contains("port"));
        assert!(lines[2].contains("ap1"));
        assert!(lines[3].contains("ap2"));
    }
}
