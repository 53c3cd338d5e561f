//! Reading the two source CSV files and joining them.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use crate::logging::{self, Stage};
use crate::model::{AccidentInfo, AccidentRecord, PipelineError, VehicleInfo};

/// Decodes ISO-8859-1 bytes. Every byte maps to the code point of the same
/// value, so this cannot fail.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

fn ensure_exists(path: &Path) -> Result<(), PipelineError> {
    if path.exists() {
        Ok(())
    } else {
        Err(PipelineError::MissingFile(path.display().to_string()))
    }
}

/// Parses `Accident_Information.csv` content.
pub fn parse_accidents<R: Read>(reader: R) -> Result<Vec<AccidentInfo>, PipelineError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        rows.push(result?);
    }
    Ok(rows)
}

/// Parses `Vehicle_Information.csv` content (already decoded).
pub fn parse_vehicles<R: Read>(reader: R) -> Result<Vec<VehicleInfo>, PipelineError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        rows.push(result?);
    }
    Ok(rows)
}

pub fn read_accidents(path: &Path) -> Result<Vec<AccidentInfo>, PipelineError> {
    ensure_exists(path)?;
    logging::info(Stage::Merge, None, &format!("Reading file {}", path.display()));
    parse_accidents(File::open(path)?)
}

/// Reads the vehicle file, which is ISO-8859-1 rather than UTF-8.
pub fn read_vehicles(path: &Path) -> Result<Vec<VehicleInfo>, PipelineError> {
    ensure_exists(path)?;
    logging::info(Stage::Merge, None, &format!("Reading file {}", path.display()));
    let text = decode_latin1(&fs::read(path)?);
    parse_vehicles(text.as_bytes())
}

/// Inner join on (`Accident_Index`, `Year`). Output follows accident order;
/// an accident with several vehicles yields one record per vehicle, in
/// vehicle-file order.
pub fn merge(accidents: &[AccidentInfo], vehicles: &[VehicleInfo]) -> Vec<AccidentRecord> {
    let mut by_key: HashMap<(&str, i32), Vec<&VehicleInfo>> = HashMap::new();
    for vehicle in vehicles {
        by_key
            .entry((vehicle.accident_index.as_str(), vehicle.year))
            .or_default()
            .push(vehicle);
    }

    let mut merged = Vec::with_capacity(vehicles.len());
    for accident in accidents {
        if let Some(matches) = by_key.get(&(accident.accident_index.as_str(), accident.year)) {
            merged.extend(
                matches
                    .iter()
                    .map(|vehicle| AccidentRecord::from_parts(accident, vehicle)),
            );
        }
    }
    merged
}

/// Reads merged records back from a CSV written by `write_records`.
pub fn read_records(path: &Path) -> Result<Vec<AccidentRecord>, PipelineError> {
    ensure_exists(path)?;
    let mut rdr = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for result in rdr.deserialize() {
        records.push(result?);
    }
    Ok(records)
}

pub fn write_records(path: &Path, records: &[AccidentRecord]) -> Result<(), PipelineError> {
    let mut wtr = csv::Writer::from_path(path)?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const ACCIDENTS: &str = "\
Accident_Index,1st_Road_Class,Accident_Severity,Date,Day_of_Week,Time,Weather_Conditions,Year
A1,A,Serious,2005-01-04,Tuesday,17:42,Raining no high winds,2005
A2,B,Slight,2005-01-05,Wednesday,,Fine no high winds,2005
A3,A,Fatal,2006-02-01,Wednesday,08:10,Fine no high winds,2006
";

    const VEHICLES: &str = "\
Accident_Index,Age_Band_of_Driver,Age_of_Vehicle,Driver_Home_Area_Type,Journey_Purpose_of_Driver,Sex_of_Driver,Vehicle_Manoeuvre,Year
A1,26 - 35,3.0,Urban area,Commuting to/from work,Male,Going ahead other,2005
A1,36 - 45,,Rural,Other,Female,Turning right,2005
A3,66 - 75,12.0,Small town,Other,Male,Overtaking,2005
";

    #[test]
    fn test_parse_accidents_ignores_extra_columns() {
        let rows = parse_accidents(ACCIDENTS.as_bytes()).expect("fixture should parse");
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2005, 1, 4).unwrap());
        assert_eq!(rows[1].time, None, "empty time should be None");
    }

    #[test]
    fn test_parse_vehicles_handles_missing_age() {
        let rows = parse_vehicles(VEHICLES.as_bytes()).expect("fixture should parse");
        assert_eq!(rows[0].age_of_vehicle, Some(3.0));
        assert_eq!(rows[1].age_of_vehicle, None);
    }

    #[test]
    fn test_merge_is_inner_join_on_index_and_year() {
        let accidents = parse_accidents(ACCIDENTS.as_bytes()).unwrap();
        let vehicles = parse_vehicles(VEHICLES.as_bytes()).unwrap();
        let merged = merge(&accidents, &vehicles);

        // A1 has two vehicles, A2 none, and A3's vehicle row has a different year.
        assert_eq!(merged.len(), 2);
        assert!(merged.iter().all(|r| r.accident_index == "A1"));
        assert_eq!(merged[0].sex_of_driver, "Male");
        assert_eq!(merged[1].sex_of_driver, "Female");
    }

    #[test]
    fn test_latin1_decoding() {
        assert_eq!(decode_latin1(b"Caf\xe9"), "Café");
        assert_eq!(decode_latin1(b"plain"), "plain");
    }

    #[test]
    fn test_records_round_trip_through_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merged.csv");
        let accidents = parse_accidents(ACCIDENTS.as_bytes()).unwrap();
        let vehicles = parse_vehicles(VEHICLES.as_bytes()).unwrap();
        let merged = merge(&accidents, &vehicles);

        write_records(&path, &merged).expect("write should succeed");
        let header = fs::read_to_string(&path).unwrap();
        assert!(header.starts_with("Accident_Index,Year,Accident_date,"), "got '{}'", header);
        assert_eq!(read_records(&path).unwrap(), merged);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = read_accidents(Path::new("/nonexistent/Accident_Information.csv")).unwrap_err();
        assert_eq!(err.to_string(), "/nonexistent/Accident_Information.csv does not exist.");
    }
}
