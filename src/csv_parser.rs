use base64::Engine;

use crate::data::{
    validate_key,
    NvsData,
    Value,
};
use crate::error::Error;

#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    key: String,
    #[serde(rename = "type")]
    row_type: String,
    encoding: String,
    value: String,
}

/// Parse NVS CSV content into an [`NvsData`] map.
///
/// The format is the four-column `key,type,encoding,value` layout used by
/// the ESP-IDF partition generator: `namespace` rows switch the current
/// namespace for the `data` rows that follow.
pub fn parse_csv(content: &str) -> Result<NvsData, Error> {
    let mut data = NvsData::new();
    let mut reader = csv::Reader::from_reader(content.as_bytes());
    let mut current_namespace: Option<String> = None;

    for result in reader.deserialize() {
        let row: CsvRow = result?;

        match row.row_type.as_str() {
            "namespace" => {
                validate_key(&row.key)?;
                if !row.encoding.is_empty() || !row.value.is_empty() {
                    return Err(Error::InvalidValue(
                        "namespace rows must have empty encoding and value".to_string(),
                    ));
                }
                current_namespace = Some(row.key);
            }
            "data" => {
                let namespace = current_namespace.clone().ok_or(Error::MissingNamespace)?;
                validate_key(&row.key)?;
                let value = parse_value(&row.value, &row.encoding)?;
                data.insert(&namespace, &row.key, value);
            }
            other => return Err(Error::InvalidType(other.to_string())),
        }
    }

    Ok(data)
}

macro_rules! parse_numeric {
    ($value:expr, $ty:ty, $variant:ident) => {
        $value
            .parse::<$ty>()
            .map(Value::$variant)
            .map_err(|e| Error::InvalidValue(format!("invalid {} value: {}", stringify!($ty), e)))
    };
}

fn parse_value(value: &str, encoding: &str) -> Result<Value, Error> {
    match encoding {
        "u8" => parse_numeric!(value, u8, U8),
        "i8" => parse_numeric!(value, i8, I8),
        "u16" => parse_numeric!(value, u16, U16),
        "i16" => parse_numeric!(value, i16, I16),
        "u32" => parse_numeric!(value, u32, U32),
        "i32" => parse_numeric!(value, i32, I32),
        "string" => Ok(Value::Str(value.to_string())),
        "hex2bin" => Ok(Value::Blob(hex::decode(value.trim())?)),
        "base64" => Ok(Value::Blob(
            base64::engine::general_purpose::STANDARD.decode(value.trim())?,
        )),
        _ => Err(Error::InvalidEncoding(encoding.to_string())),
    }
}
