use std::path::Path;

use csv::Writer;

use crate::data::NvsData;
use crate::error::Error;

/// Serialize NVS data to CSV and return the content as a `String`.
///
/// A namespace row precedes each namespace's data rows; namespaces and
/// keys keep their insertion order. Blob values are rendered as base64,
/// matching the ESP-IDF `nvs_partition_tool` convention.
pub fn write_csv(data: &NvsData) -> Result<String, Error> {
    let mut wtr = Writer::from_writer(Vec::new());
    write_records(&mut wtr, data)?;
    let bytes = wtr.into_inner().map_err(|e| Error::Io(e.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|e| Error::InvalidValue(format!("CSV output is not valid UTF-8: {e}")))
}

/// Serialize NVS data to a CSV file at `path`.
///
/// See [`write_csv`] for details on ordering and encoding behavior.
pub(crate) fn write_csv_file<P: AsRef<Path>>(data: &NvsData, path: P) -> Result<(), Error> {
    let mut wtr = Writer::from_path(path)?;
    write_records(&mut wtr, data)
}

fn write_records<W: std::io::Write>(wtr: &mut Writer<W>, data: &NvsData) -> Result<(), Error> {
    wtr.write_record(["key", "type", "encoding", "value"])?;

    for ns in &data.namespaces {
        if ns.entries.is_empty() {
            continue;
        }
        wtr.write_record([ns.name.as_str(), "namespace", "", ""])?;

        for (key, value) in &ns.entries {
            let value_str = value.to_string();
            wtr.write_record([key.as_str(), "data", value.encoding_str(), value_str.as_str()])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
