use crate::cleaning::format_timestamp;
use crate::config::InputConfig;
use crate::model::{RawRecord, Series};
use anyhow::{Context, Result};
use csv::StringRecord;
use std::{fs::File, path::Path};

fn column_index(headers: &StringRecord, name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h.trim() == name)
        .with_context(|| format!("missing column {name:?} in CSV header"))
}

/// Read the timestamp and kWh columns of a CSV file.
///
/// Timestamps are kept as text; an unparsable kWh cell is an error.
pub fn read_raw_records<P: AsRef<Path>>(file: P, input: &InputConfig) -> Result<Vec<RawRecord>> {
    let file = file.as_ref();
    let reader = File::open(file).with_context(|| format!("failed to open {file:?}"))?;
    let mut rdr = csv::Reader::from_reader(reader);

    let headers = rdr.headers().context("failed to read CSV headers")?.clone();
    let ts_idx = column_index(&headers, &input.datetime_column)?;
    let kwh_idx = column_index(&headers, &input.value_column)?;

    let mut records = Vec::new();
    for (i_rec, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("failed to read CSV record {i_rec}"))?;

        let timestamp = record.get(ts_idx).unwrap_or("").trim().to_string();
        let kwh_str = record.get(kwh_idx).unwrap_or("").trim();
        let kwh: f64 = kwh_str
            .parse()
            .with_context(|| format!("invalid kwh {kwh_str:?} in CSV record {i_rec}"))?;

        records.push(RawRecord::new(timestamp, kwh));
    }
    log::debug!("read {} records from {file:?}", records.len());

    Ok(records)
}

/// Write a series with the same column names and timestamp layout as the input.
pub fn write_series<P: AsRef<Path>>(file: P, series: &Series, input: &InputConfig) -> Result<()> {
    let file = file.as_ref();
    let mut wtr =
        csv::Writer::from_path(file).with_context(|| format!("failed to create {file:?}"))?;

    wtr.write_record([input.datetime_column.as_str(), input.value_column.as_str()])
        .context("failed to write CSV header")?;
    for r in series.readings() {
        wtr.write_record([format_timestamp(&r.timestamp), r.kwh.to_string()])
            .context("failed to write CSV record")?;
    }

    wtr.flush().context("failed to flush writer stream")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaning::{OutlierFilter, clean};
    use std::{env, fs, path::PathBuf};

    fn scratch_file(name: &str, contents: &str) -> PathBuf {
        let path = env::temp_dir().join(format!("kwh-eda-{}-{name}", std::process::id()));
        fs::write(&path, contents).expect("failed to write scratch file");
        path
    }

    #[test]
    fn reads_columns_by_name() {
        let path = scratch_file(
            "by-name.csv",
            "meter,kwh,Datetime\nm1, 0.25 ,06-01-2020 10:00\nm1,0.5,06-01-2020 10:10\n",
        );

        let records = read_raw_records(&path, &InputConfig::default()).unwrap();

        assert_eq!(
            records,
            vec![
                RawRecord::new("06-01-2020 10:00", 0.25),
                RawRecord::new("06-01-2020 10:10", 0.5),
            ]
        );
        fs::remove_file(path).ok();
    }

    #[test]
    fn missing_column_and_bad_value_are_errors() {
        let no_kwh = scratch_file("no-kwh.csv", "Datetime,energy\n06-01-2020 10:00,0.1\n");
        assert!(read_raw_records(&no_kwh, &InputConfig::default()).is_err());
        fs::remove_file(no_kwh).ok();

        let bad_kwh = scratch_file("bad-kwh.csv", "Datetime,kwh\n06-01-2020 10:00,lots\n");
        let err = read_raw_records(&bad_kwh, &InputConfig::default()).unwrap_err();
        assert!(format!("{err:#}").contains("lots"));
        fs::remove_file(bad_kwh).ok();
    }

    #[test]
    fn written_series_reads_back_unchanged() {
        let input = InputConfig::default();
        let series = clean(
            &[
                RawRecord::new("07-01-2020 00:00", 0.3),
                RawRecord::new("06-01-2020 23:50", 0.125),
            ],
            OutlierFilter::NONE,
        )
        .unwrap();
        let path = env::temp_dir().join(format!("kwh-eda-{}-written.csv", std::process::id()));

        write_series(&path, &series, &input).unwrap();
        let records = read_raw_records(&path, &input).unwrap();

        assert_eq!(clean(&records, OutlierFilter::NONE).unwrap(), series);
        fs::remove_file(path).ok();
    }
}
