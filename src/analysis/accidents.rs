//! Aggregations over the merged accident-vehicle records.
//!
//! Every chart in the visualize pipeline is fed by exactly one function in
//! this module. The functions are pure: they take a slice of derived
//! `Accident`s, apply column exclusions in the same pass, and return one of
//! the shapes in `analysis::tables`.
//!
//! Ordering rules follow the grouping semantics the charts rely on:
//! grouped keys come out sorted ascending, value counts come out by
//! descending count with ties broken by ascending value.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{Datelike, Duration, NaiveDate};

use crate::analysis::bands::{DaytimeBand, VehicleAgeBand};
use crate::analysis::tables::{ColumnCounts, CrossTab, PairValue};
use crate::model::AccidentRecord;

// ---------------------------------------------------------------------------
// Derived record
// ---------------------------------------------------------------------------

/// A merged record with its derived columns attached.
#[derive(Debug, Clone, PartialEq)]
pub struct Accident {
    pub record: AccidentRecord,
    pub hour: u32,
    pub daytime: DaytimeBand,
    pub vehicle_age_band: VehicleAgeBand,
}

/// Categorical columns that can be grouped, filtered, or counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Time,
    DayOfWeek,
    AccidentSeverity,
    WeatherConditions,
    AgeBandOfDriver,
    SexOfDriver,
    AgeBandOfVehicle,
    DriverHomeAreaType,
    JourneyPurposeOfDriver,
    VehicleManoeuvre,
    Daytime,
}

impl Field {
    /// The value of this column for one accident. Missing times read as "".
    pub fn value(self, accident: &Accident) -> &str {
        let r = &accident.record;
        match self {
            Field::Time => r.time.as_deref().unwrap_or(""),
            Field::DayOfWeek => &r.day_of_week,
            Field::AccidentSeverity => &r.accident_severity,
            Field::WeatherConditions => &r.weather_conditions,
            Field::AgeBandOfDriver => &r.age_band_of_driver,
            Field::SexOfDriver => &r.sex_of_driver,
            Field::AgeBandOfVehicle => accident.vehicle_age_band.label(),
            Field::DriverHomeAreaType => &r.driver_home_area_type,
            Field::JourneyPurposeOfDriver => &r.journey_purpose_of_driver,
            Field::VehicleManoeuvre => &r.vehicle_manoeuvre,
            Field::Daytime => accident.daytime.label(),
        }
    }

    /// Column header, as it appears in the merged CSV.
    pub fn column_name(self) -> &'static str {
        match self {
            Field::Time => "Time",
            Field::DayOfWeek => "Day_of_Week",
            Field::AccidentSeverity => "Accident_Severity",
            Field::WeatherConditions => "Weather_Conditions",
            Field::AgeBandOfDriver => "Age_Band_of_Driver",
            Field::SexOfDriver => "Sex_of_Driver",
            Field::AgeBandOfVehicle => "Age_band_of_vehicule",
            Field::DriverHomeAreaType => "Driver_Home_Area_Type",
            Field::JourneyPurposeOfDriver => "Journey_Purpose_of_Driver",
            Field::VehicleManoeuvre => "Vehicle_Manoeuvre",
            Field::Daytime => "Daytime",
        }
    }
}

/// Values to drop, per column.
pub type Exclusions<'a> = &'a [(Field, &'a [&'a str])];

/// True if the accident carries an excluded value in one of `fields`.
/// Exclusions on columns outside `fields` are ignored.
fn excluded_on(accident: &Accident, fields: &[Field], exclusions: Exclusions<'_>) -> bool {
    exclusions
        .iter()
        .filter(|(field, _)| fields.contains(field))
        .any(|(field, values)| values.contains(&field.value(accident)))
}

fn by_count_desc(counts: HashMap<&str, usize>) -> Vec<(String, usize)> {
    let mut entries: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(value, count)| (value.to_string(), count))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    entries
}

// ---------------------------------------------------------------------------
// Transform and filter
// ---------------------------------------------------------------------------

/// Hour of day from the first two characters of an "HH:MM" time.
pub fn parse_hour(time: &str) -> Option<u32> {
    time.get(..2)?.trim().parse().ok()
}

/// Derives the hour, daytime band and vehicle-age band of every record.
/// Records without a usable hour are dropped.
pub fn transform(records: Vec<AccidentRecord>) -> Vec<Accident> {
    records
        .into_iter()
        .filter_map(|record| {
            let hour = record.time.as_deref().and_then(parse_hour)?;
            let vehicle_age_band = VehicleAgeBand::from_age(record.age_of_vehicle);
            Some(Accident {
                record,
                hour,
                daytime: DaytimeBand::from_hour(hour),
                vehicle_age_band,
            })
        })
        .collect()
}

/// Drops accidents whose `field` value is one of `exclude`.
pub fn filter_data(data: Vec<Accident>, field: Field, exclude: &[&str]) -> Vec<Accident> {
    if exclude.is_empty() {
        return data;
    }
    data.into_iter()
        .filter(|a| !exclude.contains(&field.value(a)))
        .collect()
}

/// Accidents of a single severity, e.g. "Fatal".
pub fn with_severity(data: &[Accident], severity: &str) -> Vec<Accident> {
    data.iter()
        .filter(|a| a.record.accident_severity == severity)
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Single-column counts
// ---------------------------------------------------------------------------

/// Value counts of `field` after dropping `exclude`, as parallel
/// `(counts, values)` lists, largest count first.
pub fn list_values_by_column(
    data: &[Accident],
    field: Field,
    exclude: &[&str],
) -> (Vec<usize>, Vec<String>) {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for accident in data {
        let value = field.value(accident);
        if !exclude.contains(&value) {
            *counts.entry(value).or_default() += 1;
        }
    }
    by_count_desc(counts).into_iter().map(|(v, c)| (c, v)).unzip()
}

/// Group counts of `field`, largest first, keeping only counts strictly
/// greater than `min_value`.
pub fn count_by_column(
    data: &[Accident],
    field: Field,
    min_value: usize,
    exclude: &[&str],
) -> ColumnCounts {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for accident in data {
        let value = field.value(accident);
        if !exclude.contains(&value) {
            *counts.entry(value).or_default() += 1;
        }
    }

    let entries: Vec<(String, usize)> = by_count_desc(counts)
        .into_iter()
        .filter(|(_, count)| *count > min_value)
        .collect();
    let labels = entries
        .iter()
        .map(|(value, count)| format!("{}\n ({})", value, count))
        .collect();
    let sizes = entries.iter().map(|(_, count)| *count).collect();

    ColumnCounts { entries, labels, sizes }
}

/// Accidents per calendar year, most recent year first.
pub fn per_year(data: &[Accident]) -> Vec<(i32, usize)> {
    let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
    for accident in data {
        *counts.entry(accident.record.accident_date.year()).or_default() += 1;
    }
    counts.into_iter().rev().collect()
}

/// Accidents per hour of day, latest hour first.
pub fn per_hour(data: &[Accident]) -> Vec<(u32, usize)> {
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for accident in data {
        *counts.entry(accident.hour).or_default() += 1;
    }
    counts.into_iter().rev().collect()
}

/// Accidents per daytime band, sorted by band label descending.
pub fn per_daytime(data: &[Accident]) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for accident in data {
        *counts.entry(accident.daytime.label()).or_default() += 1;
    }
    counts
        .into_iter()
        .rev()
        .map(|(label, count)| (label.to_string(), count))
        .collect()
}

// ---------------------------------------------------------------------------
// Two-column tables
// ---------------------------------------------------------------------------

fn pair_counts<'a>(
    data: &'a [Accident],
    first: Field,
    second: Field,
    exclusions: Exclusions<'_>,
) -> BTreeMap<(&'a str, &'a str), usize> {
    let fields = [first, second];
    let mut counts = BTreeMap::new();
    for accident in data {
        if excluded_on(accident, &fields, exclusions) {
            continue;
        }
        *counts
            .entry((first.value(accident), second.value(accident)))
            .or_default() += 1;
    }
    counts
}

/// Cross-tab of `rows` × `columns` where each cell is its share of the row
/// total (0..=1). Rows and columns are sorted ascending; combinations that
/// never occur are `None`.
pub fn share_count(
    data: &[Accident],
    rows: Field,
    columns: Field,
    exclusions: Exclusions<'_>,
) -> CrossTab {
    let counts = pair_counts(data, rows, columns, exclusions);

    let row_labels: BTreeSet<&str> = counts.keys().map(|(r, _)| *r).collect();
    let column_labels: BTreeSet<&str> = counts.keys().map(|(_, c)| *c).collect();

    let cells = row_labels
        .iter()
        .map(|row| {
            let total: usize = column_labels
                .iter()
                .filter_map(|col| counts.get(&(*row, *col)))
                .sum();
            column_labels
                .iter()
                .map(|col| {
                    counts
                        .get(&(*row, *col))
                        .map(|count| *count as f64 / total as f64)
                })
                .collect()
        })
        .collect();

    CrossTab {
        row_labels: row_labels.into_iter().map(String::from).collect(),
        column_labels: column_labels.into_iter().map(String::from).collect(),
        cells,
    }
}

/// Long-form `(first, second, count)` table sorted by key.
pub fn counts_by_two_columns(
    data: &[Accident],
    first: Field,
    second: Field,
    exclusions: Exclusions<'_>,
) -> Vec<PairValue> {
    pair_counts(data, first, second, exclusions)
        .into_iter()
        .map(|((a, b), count)| PairValue {
            first: a.to_string(),
            second: b.to_string(),
            value: count as f64,
        })
        .collect()
}

/// Each value divided by the grand total of `pairs`.
pub fn share_of_total(pairs: &[PairValue]) -> Vec<PairValue> {
    let total: f64 = pairs.iter().map(|p| p.value).sum();
    pairs
        .iter()
        .map(|p| PairValue {
            value: if total > 0.0 { p.value / total } else { 0.0 },
            ..p.clone()
        })
        .collect()
}

/// Year × weekday accident counts, columns in `days` order. Years come out
/// ascending; weekdays without accidents in a year are `None`.
pub fn per_weekday_and_year(data: &[Accident], days: &[&str]) -> CrossTab {
    let mut counts: BTreeMap<i32, HashMap<String, usize>> = BTreeMap::new();
    for accident in data {
        let date = accident.record.accident_date;
        *counts
            .entry(date.year())
            .or_default()
            .entry(date.format("%A").to_string())
            .or_default() += 1;
    }

    let cells = counts
        .values()
        .map(|by_day| {
            days.iter()
                .map(|day| by_day.get(*day).map(|count| *count as f64))
                .collect()
        })
        .collect();

    CrossTab {
        row_labels: counts.keys().map(|year| year.to_string()).collect(),
        column_labels: days.iter().map(|day| day.to_string()).collect(),
        cells,
    }
}

// ---------------------------------------------------------------------------
// Time series
// ---------------------------------------------------------------------------

/// Resampling period for date series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    /// Weeks ending on Sunday.
    Week,
    /// Calendar months, labelled by their last day.
    Month,
}

fn month_end(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.pred_opt())
        .unwrap_or(date)
}

impl Period {
    /// Label of the bin containing `date`: the bin's last day.
    pub fn bin_end(self, date: NaiveDate) -> NaiveDate {
        match self {
            Period::Week => {
                let to_sunday = (7 - date.weekday().num_days_from_sunday()) % 7;
                date + Duration::days(i64::from(to_sunday))
            }
            Period::Month => month_end(date),
        }
    }

    fn next_bin_end(self, end: NaiveDate) -> NaiveDate {
        match self {
            Period::Week => end + Duration::days(7),
            Period::Month => month_end(end + Duration::days(1)),
        }
    }
}

/// Accident counts per period from the first to the last populated bin.
/// Empty bins in between are reported as zero.
pub fn count_per_period(data: &[Accident], period: Period) -> Vec<(NaiveDate, usize)> {
    let mut bins: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for accident in data {
        *bins
            .entry(period.bin_end(accident.record.accident_date))
            .or_default() += 1;
    }

    let (Some(&first), Some(&last)) = (bins.keys().next(), bins.keys().next_back()) else {
        return Vec::new();
    };

    let mut series = Vec::new();
    let mut end = first;
    while end <= last {
        series.push((end, bins.get(&end).copied().unwrap_or(0)));
        end = period.next_bin_end(end);
    }
    series
}

/// Period × severity table where each cell is that severity's share of the
/// period's accidents. Only populated periods appear, ascending; severities
/// absent from a period are `None`.
pub fn severity_share_per_period(data: &[Accident], period: Period) -> CrossTab {
    let mut counts: BTreeMap<NaiveDate, HashMap<&str, usize>> = BTreeMap::new();
    let mut severities: BTreeSet<&str> = BTreeSet::new();
    for accident in data {
        let severity = accident.record.accident_severity.as_str();
        severities.insert(severity);
        *counts
            .entry(period.bin_end(accident.record.accident_date))
            .or_default()
            .entry(severity)
            .or_default() += 1;
    }

    let cells = counts
        .values()
        .map(|by_severity| {
            let total: usize = by_severity.values().sum();
            severities
                .iter()
                .map(|s| by_severity.get(s).map(|count| *count as f64 / total as f64))
                .collect()
        })
        .collect();

    CrossTab {
        row_labels: counts.keys().map(|end| end.format("%Y-%m-%d").to_string()).collect(),
        column_labels: severities.into_iter().map(String::from).collect(),
        cells,
    }
}

/// Mean accidents per day for each weekday in `days`, over every calendar
/// day between the first and last accident (days without accidents count
/// as zero). Weekdays the range never covers are `None`.
pub fn average_per_weekday(data: &[Accident], days: &[&str]) -> Vec<(String, Option<f64>)> {
    let mut daily: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for accident in data {
        *daily.entry(accident.record.accident_date).or_default() += 1;
    }

    let mut totals: HashMap<String, (usize, usize)> = HashMap::new();
    if let (Some(&first), Some(&last)) = (daily.keys().next(), daily.keys().next_back()) {
        for day in first.iter_days().take_while(|d| *d <= last) {
            let entry = totals.entry(day.format("%A").to_string()).or_default();
            entry.0 += daily.get(&day).copied().unwrap_or(0);
            entry.1 += 1;
        }
    }

    days.iter()
        .map(|day| {
            let mean = totals
                .get(*day)
                .map(|(sum, n)| *sum as f64 / *n as f64);
            (day.to_string(), mean)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, time: &str, age: Option<f64>) -> AccidentRecord {
        AccidentRecord {
            accident_index: format!("IDX-{}-{}", date, time),
            year: date[..4].parse().unwrap(),
            accident_date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            time: if time.is_empty() { None } else { Some(time.to_string()) },
            day_of_week: String::new(),
            accident_severity: "Slight".to_string(),
            weather_conditions: "Fine no high winds".to_string(),
            age_band_of_driver: "26 - 35".to_string(),
            sex_of_driver: "Male".to_string(),
            age_of_vehicle: age,
            driver_home_area_type: "Urban area".to_string(),
            journey_purpose_of_driver: "Other".to_string(),
            vehicle_manoeuvre: "Going ahead other".to_string(),
        }
    }

    /// The two-row fixture used across most tests: a Sunday afternoon in
    /// 2020 and a Tuesday morning in 2019.
    fn sample() -> Vec<Accident> {
        transform(vec![
            record("2020-10-11", "17:00", Some(1.0)),
            record("2019-09-10", "10:00", Some(6.0)),
        ])
    }

    fn with(mut accident: Accident, edit: impl FnOnce(&mut AccidentRecord)) -> Accident {
        edit(&mut accident.record);
        accident
    }

    // --- transform / filter --------------------------------------------------

    #[test]
    fn test_transform_derives_hour_and_bands() {
        let data = sample();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0].hour, 17);
        assert_eq!(data[0].daytime.label(), "afternoon rush (15-19)");
        assert_eq!(data[0].vehicle_age_band.label(), "0-4");
        assert_eq!(data[1].hour, 10);
        assert_eq!(data[1].daytime.label(), "office hours (10-15)");
        assert_eq!(data[1].vehicle_age_band.label(), "5-9");
    }

    #[test]
    fn test_transform_drops_rows_without_numeric_hour() {
        let data = transform(vec![
            record("2020-10-11", "", None),
            record("2020-10-11", "xx:00", None),
            record("2020-10-11", "08:30", None),
        ]);
        assert_eq!(data.len(), 1, "only the row with a parseable hour should remain");
        assert_eq!(data[0].hour, 8);
        assert_eq!(data[0].vehicle_age_band, VehicleAgeBand::Missing);
    }

    #[test]
    fn test_filter_data_drops_single_value() {
        let result = filter_data(sample(), Field::Time, &["17:00"]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].record.time.as_deref(), Some("10:00"));
    }

    #[test]
    fn test_filter_data_without_conditions_keeps_everything() {
        assert_eq!(filter_data(sample(), Field::Time, &[]).len(), 2);
    }

    #[test]
    fn test_with_severity_selects_fatalities() {
        let mut data = sample();
        data[1] = with(data[1].clone(), |r| r.accident_severity = "Fatal".to_string());
        let fatal = with_severity(&data, "Fatal");
        assert_eq!(fatal.len(), 1);
        assert_eq!(fatal[0].hour, 10);
    }

    // --- single-column counts -----------------------------------------------

    #[test]
    fn test_list_values_by_column_with_exclusion() {
        let (counts, values) = list_values_by_column(&sample(), Field::Time, &["17:00"]);
        assert_eq!(counts, vec![1]);
        assert_eq!(values, vec!["10:00"]);
    }

    #[test]
    fn test_list_values_by_column_orders_by_count() {
        let mut data = sample();
        data.push(data[1].clone());
        let (counts, values) = list_values_by_column(&data, Field::Time, &[]);
        assert_eq!(counts, vec![2, 1]);
        assert_eq!(values, vec!["10:00", "17:00"]);
    }

    #[test]
    fn test_count_by_column_labels_and_sizes() {
        let result = count_by_column(&sample(), Field::Time, 0, &["15:00"]);
        assert_eq!(
            result.entries,
            vec![("10:00".to_string(), 1), ("17:00".to_string(), 1)],
            "equal counts should be ordered by value"
        );
        assert_eq!(result.labels, vec!["10:00\n (1)", "17:00\n (1)"]);
        assert_eq!(result.sizes, vec![1, 1]);
    }

    #[test]
    fn test_count_by_column_min_value_is_strict() {
        let mut data = sample();
        data.push(data[1].clone());
        let result = count_by_column(&data, Field::Time, 1, &[]);
        assert_eq!(result.entries, vec![("10:00".to_string(), 2)]);
    }

    #[test]
    fn test_per_year_most_recent_first() {
        assert_eq!(per_year(&sample()), vec![(2020, 1), (2019, 1)]);
    }

    #[test]
    fn test_per_hour_latest_first() {
        assert_eq!(per_hour(&sample()), vec![(17, 1), (10, 1)]);
    }

    #[test]
    fn test_per_daytime_sorted_by_label_descending() {
        let result = per_daytime(&sample());
        assert_eq!(
            result,
            vec![
                ("office hours (10-15)".to_string(), 1),
                ("afternoon rush (15-19)".to_string(), 1),
            ]
        );
    }

    // --- two-column tables --------------------------------------------------

    #[test]
    fn test_share_count_with_exclusion() {
        let exclusions: Exclusions = &[(Field::Time, &["17:00"])];
        let result = share_count(&sample(), Field::AccidentSeverity, Field::Time, exclusions);
        assert_eq!(result.row_labels, vec!["Slight"]);
        assert_eq!(result.column_labels, vec!["10:00"]);
        assert_eq!(result.get("Slight", "10:00"), Some(1.0));
    }

    #[test]
    fn test_share_count_rows_sum_to_one_and_absent_cells_are_none() {
        let mut data = sample();
        data.push(with(data[0].clone(), |r| r.accident_severity = "Fatal".to_string()));
        data.push(data[1].clone());
        let result = share_count(&data, Field::Daytime, Field::AccidentSeverity, &[]);

        for (r, row) in result.cells.iter().enumerate() {
            let sum: f64 = row.iter().flatten().sum();
            assert!(
                (sum - 1.0).abs() < 1e-9,
                "row '{}' shares should sum to 1, got {}",
                result.row_labels[r],
                sum
            );
        }
        assert_eq!(result.get("afternoon rush (15-19)", "Fatal"), Some(0.5));
        assert_eq!(result.get("office hours (10-15)", "Fatal"), None);
        assert_eq!(result.get("office hours (10-15)", "Slight"), Some(1.0));
    }

    #[test]
    fn test_share_count_ignores_exclusions_on_other_columns() {
        let exclusions: Exclusions = &[(Field::SexOfDriver, &["Male"])];
        let result = share_count(&sample(), Field::Daytime, Field::AccidentSeverity, exclusions);
        assert_eq!(result.row_labels.len(), 2);
    }

    #[test]
    fn test_counts_by_two_columns_with_exclusion() {
        let exclusions: Exclusions = &[(Field::Time, &["17:00"])];
        let result = counts_by_two_columns(&sample(), Field::Daytime, Field::Time, exclusions);
        assert_eq!(
            result,
            vec![PairValue {
                first: "office hours (10-15)".to_string(),
                second: "10:00".to_string(),
                value: 1.0,
            }]
        );
    }

    #[test]
    fn test_share_of_total() {
        let mut data = sample();
        data.push(data[1].clone());
        data.push(data[1].clone());
        let counts = counts_by_two_columns(&data, Field::AgeBandOfDriver, Field::AgeBandOfVehicle, &[]);
        let shares = share_of_total(&counts);
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].second, "0-4");
        assert_eq!(shares[0].value, 0.25);
        assert_eq!(shares[1].second, "5-9");
        assert_eq!(shares[1].value, 0.75);
    }

    #[test]
    fn test_share_of_total_of_empty_table() {
        assert!(share_of_total(&[]).is_empty());
    }

    #[test]
    fn test_per_weekday_and_year() {
        let result = per_weekday_and_year(&sample(), &["Sunday", "Tuesday"]);
        assert_eq!(result.row_labels, vec!["2019", "2020"]);
        assert_eq!(result.column_labels, vec!["Sunday", "Tuesday"]);
        assert_eq!(result.get("2019", "Sunday"), None);
        assert_eq!(result.get("2019", "Tuesday"), Some(1.0));
        assert_eq!(result.get("2020", "Sunday"), Some(1.0));
        assert_eq!(result.get("2020", "Tuesday"), None);
    }

    // --- time series --------------------------------------------------------

    #[test]
    fn test_week_bins_end_on_sunday() {
        let tuesday = NaiveDate::from_ymd_opt(2019, 9, 10).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2019, 9, 15).unwrap();
        assert_eq!(Period::Week.bin_end(tuesday), sunday);
        assert_eq!(Period::Week.bin_end(sunday), sunday);
    }

    #[test]
    fn test_month_bins_end_on_last_day() {
        let d = NaiveDate::from_ymd_opt(2020, 2, 3).unwrap();
        assert_eq!(Period::Month.bin_end(d), NaiveDate::from_ymd_opt(2020, 2, 29).unwrap());
        let d = NaiveDate::from_ymd_opt(2019, 12, 31).unwrap();
        assert_eq!(Period::Month.bin_end(d), d);
    }

    #[test]
    fn test_count_per_month_fills_empty_months() {
        let data = transform(vec![
            record("2020-01-05", "10:00", None),
            record("2020-01-20", "11:00", None),
            record("2020-03-02", "12:00", None),
        ]);
        let series = count_per_period(&data, Period::Month);
        let counts: Vec<usize> = series.iter().map(|(_, c)| *c).collect();
        assert_eq!(counts, vec![2, 0, 1]);
        assert_eq!(series[1].0, NaiveDate::from_ymd_opt(2020, 2, 29).unwrap());
    }

    #[test]
    fn test_count_per_period_of_empty_data() {
        assert!(count_per_period(&[], Period::Week).is_empty());
    }

    #[test]
    fn test_severity_shares_per_week_sum_to_one() {
        // Week ending 2019-09-08: two slight, one fatal, one serious.
        // Week ending 2019-09-22: one slight. The week in between is empty.
        let severity = |date: &str, time: &str, s: &str| {
            let mut r = record(date, time, None);
            r.accident_severity = s.to_string();
            r
        };
        let data = transform(vec![
            severity("2019-09-02", "10:00", "Slight"),
            severity("2019-09-03", "10:00", "Slight"),
            severity("2019-09-04", "10:00", "Fatal"),
            severity("2019-09-08", "10:00", "Serious"),
            severity("2019-09-16", "10:00", "Slight"),
        ]);
        let table = severity_share_per_period(&data, Period::Week);

        assert_eq!(table.row_labels, vec!["2019-09-08", "2019-09-22"]);
        assert_eq!(table.column_labels, vec!["Fatal", "Serious", "Slight"]);
        for row in &table.cells {
            let sum: f64 = row.iter().flatten().sum();
            assert!((sum - 1.0).abs() < 1e-9, "week shares sum to {}", sum);
        }
        assert_eq!(table.get("2019-09-08", "Slight"), Some(0.5));
        assert_eq!(table.get("2019-09-22", "Fatal"), None);
        assert_eq!(table.get("2019-09-22", "Slight"), Some(1.0));
    }

    #[test]
    fn test_severity_shares_of_empty_data() {
        assert!(severity_share_per_period(&[], Period::Week).is_empty());
    }

    #[test]
    fn test_average_per_weekday_counts_quiet_days_as_zero() {
        // Two weeks, Monday 2019-09-02 to Sunday 2019-09-15, with three
        // accidents on the first Monday and none on the second.
        let data = transform(vec![
            record("2019-09-02", "10:00", None),
            record("2019-09-02", "11:00", None),
            record("2019-09-02", "12:00", None),
            record("2019-09-15", "12:00", None),
        ]);
        let result = average_per_weekday(&data, &["Monday", "Sunday", "Friday"]);
        assert_eq!(result[0], ("Monday".to_string(), Some(1.5)));
        assert_eq!(result[1], ("Sunday".to_string(), Some(0.5)));
        assert_eq!(result[2], ("Friday".to_string(), Some(0.0)));
    }

    #[test]
    fn test_average_per_weekday_outside_range_is_none() {
        let result = average_per_weekday(&sample()[..1], &["Sunday", "Monday"]);
        assert_eq!(result[0].1, Some(1.0));
        assert_eq!(result[1].1, None);
    }
}
