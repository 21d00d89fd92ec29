//! Union schema artifact I/O
//!
//! The artifact is a CSV with the twelve [`UnionSchemaRow::COLUMNS`], written
//! as UTF-8 with a byte order mark and read back with the encoding fallback.

use crate::reader::CsvReader;
use crate::writer::CsvWriter;
use crate::{CsvError, CsvResult};
use partcode_schema::{StringTable, UnionSchema, UnionSchemaRow};
use std::path::Path;
use tracing::info;

/// Columns an artifact cannot do without; the rest default to empty
pub const REQUIRED_UNION_COLUMNS: [&str; 4] = ["pair_id", "ik_part_type", "ok_part_type", "key"];

/// Load a union schema artifact as an immutable value
pub fn read_union_schema(reader: &CsvReader, path: &Path) -> CsvResult<UnionSchema> {
    let (text, encoding) = reader.read_text(path)?;
    let schema = parse_union_schema(reader, &text)?;
    info!(
        path = %path.display(),
        %encoding,
        rows = schema.len(),
        pairs = schema.pairs().len(),
        "Loaded union schema"
    );
    Ok(schema)
}

/// Parse artifact text. Boolean columns accept `TRUE/FALSE/1/0` in any case
/// and empty; any other token fails with its line.
pub fn parse_union_schema(reader: &CsvReader, text: &str) -> CsvResult<UnionSchema> {
    let mut csv_reader = reader.config().reader_builder().from_reader(text.as_bytes());
    let headers = csv_reader.headers().map_err(|e| CsvError::from_csv(&e))?.clone();

    let present = StringTable::new("union_schema", headers.iter());
    present.require_columns(&REQUIRED_UNION_COLUMNS)?;

    let mut rows = Vec::new();
    for result in csv_reader.deserialize::<UnionSchemaRow>() {
        let row = result.map_err(|e| deserialize_error(&e, &headers))?;
        rows.push(row);
    }
    Ok(UnionSchema::new(rows))
}

/// Persist a union schema artifact
pub fn write_union_schema(writer: &CsvWriter, path: &Path, schema: &UnionSchema) -> CsvResult<()> {
    let bytes = union_schema_bytes(writer, schema)?;
    writer.replace_file(path, &bytes)?;
    info!(path = %path.display(), rows = schema.len(), "Wrote union schema");
    Ok(())
}

/// Artifact bytes as [`write_union_schema`] would write them. An empty
/// schema still gets its header row.
pub fn union_schema_bytes(writer: &CsvWriter, schema: &UnionSchema) -> CsvResult<Vec<u8>> {
    let mut buffer = Vec::new();
    if schema.is_empty() {
        writer.write_records(&mut buffer, &UnionSchemaRow::COLUMNS, &[])?;
    } else {
        writer.write_serialized(&mut buffer, schema.rows())?;
    }
    Ok(buffer)
}

fn deserialize_error(error: &csv::Error, headers: &csv::StringRecord) -> CsvError {
    let line = error
        .position()
        .and_then(|p| usize::try_from(p.line()).ok())
        .unwrap_or(0);
    match error.kind() {
        csv::ErrorKind::Deserialize { err, .. } => {
            let column = err
                .field()
                .and_then(|index| headers.get(usize::try_from(index).ok()?))
                .unwrap_or("?");
            CsvError::conversion(line, column, err.to_string())
        }
        _ => CsvError::from_csv(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "pair_id,ik_part_type,ok_part_type,key,dtype,lookup,required_ik,required_ok,ik_slot,ik_codec,ok_slot,ok_codec\n";

    #[test]
    fn test_parse_flags_case_insensitively() {
        let text = format!(
            "{HEADER}V111_2655,V111,2655,material_code,lookup,material_lookup,true,1,5-5,lookup:code,5-6,lookup:code\n\
             V111_2655,V111,2655,nominal,int,,True,,6-6,\"int:width=1,pad=0\",,\n"
        );
        let schema = parse_union_schema(&CsvReader::new(), &text).unwrap();
        let rows = schema.rows();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].required_ik && rows[0].required_ok);
        assert!(rows[1].required_ik && !rows[1].required_ok);
        assert_eq!(rows[1].ik_codec, "int:width=1,pad=0");
    }

    #[test]
    fn test_unknown_flag_token_names_the_line() {
        let text = format!("{HEADER}V111_2655,V111,2655,nominal,int,,yes,0,6-6,,,\n");
        let err = parse_union_schema(&CsvReader::new(), &text).unwrap_err();
        assert_eq!(err.line_number(), Some(2));
        assert!(err.to_string().contains("yes"), "{err}");
    }

    #[test]
    fn test_missing_required_column() {
        let text = "pair_id,key\nV111_2655,material_code\n";
        let err = parse_union_schema(&CsvReader::new(), text).unwrap_err();
        assert!(matches!(
            err,
            CsvError::Schema(partcode_schema::Error::MissingColumns { .. })
        ));
    }

    #[test]
    fn test_write_read_preserves_labels_and_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("union_schema.csv");
        let schema = UnionSchema::new(vec![UnionSchemaRow {
            pair_id: "V111_2655".into(),
            ik_part_type: "V111".into(),
            ok_part_type: "2655".into(),
            key: "재질".into(),
            dtype: "lookup".into(),
            lookup: "material_lookup".into(),
            required_ik: true,
            required_ok: false,
            ik_slot: "5-5".into(),
            ik_codec: "lookup:code".into(),
            ok_slot: String::new(),
            ok_codec: String::new(),
        }]);

        write_union_schema(&CsvWriter::new(), &path, &schema).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"\xEF\xBB\xBF"));
        assert!(String::from_utf8_lossy(&bytes).contains("TRUE,FALSE"));

        let loaded = read_union_schema(&CsvReader::new(), &path).unwrap();
        assert_eq!(loaded, schema);
    }
}
