//! Fixed-boundary categorical bands derived once per record.
//!
//! The label strings are part of the output: they appear verbatim in chart
//! legends and axis ticks, so they must not change.

use std::fmt;

// ---------------------------------------------------------------------------
// Time of day
// ---------------------------------------------------------------------------

/// Time-of-day band of an accident, from its hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DaytimeBand {
    MorningRush,
    OfficeHours,
    AfternoonRush,
    Evening,
    Night,
}

impl DaytimeBand {
    /// Band for an hour of the day. Anything outside 5..23, including
    /// out-of-range hours, is night.
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=9 => DaytimeBand::MorningRush,
            10..=14 => DaytimeBand::OfficeHours,
            15..=18 => DaytimeBand::AfternoonRush,
            19..=22 => DaytimeBand::Evening,
            _ => DaytimeBand::Night,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DaytimeBand::MorningRush => "morning rush (5-10)",
            DaytimeBand::OfficeHours => "office hours (10-15)",
            DaytimeBand::AfternoonRush => "afternoon rush (15-19)",
            DaytimeBand::Evening => "evening (19-23)",
            DaytimeBand::Night => "night (23-5)",
        }
    }
}

impl fmt::Display for DaytimeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Chart order for daytime bands, top to bottom.
pub const DAYTIME_ORDER: [&str; 5] = [
    "night (23-5)",
    "evening (19-23)",
    "afternoon rush (15-19)",
    "office hours (10-15)",
    "morning rush (5-10)",
];

// ---------------------------------------------------------------------------
// Vehicle age
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VehicleAgeBand {
    UpToFour,
    FiveToNine,
    TenToFourteen,
    FifteenOrMore,
    Missing,
}

impl VehicleAgeBand {
    /// Band for a vehicle age in years. `None` and NaN are "Data missing".
    pub fn from_age(age: Option<f64>) -> Self {
        match age {
            Some(a) if a < 5.0 => VehicleAgeBand::UpToFour,
            Some(a) if a < 10.0 => VehicleAgeBand::FiveToNine,
            Some(a) if a < 15.0 => VehicleAgeBand::TenToFourteen,
            Some(a) if a >= 15.0 => VehicleAgeBand::FifteenOrMore,
            _ => VehicleAgeBand::Missing,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VehicleAgeBand::UpToFour => "0-4",
            VehicleAgeBand::FiveToNine => "5-9",
            VehicleAgeBand::TenToFourteen => "10-14",
            VehicleAgeBand::FifteenOrMore => ">=15",
            VehicleAgeBand::Missing => "Data missing",
        }
    }
}

impl fmt::Display for VehicleAgeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Chart order for vehicle age bands, top to bottom. "Data missing" is
/// never charted.
pub const VEHICLE_AGE_ORDER: [&str; 4] = [">=15", "10-14", "5-9", "0-4"];

// ---------------------------------------------------------------------------
// Weekdays
// ---------------------------------------------------------------------------

/// Weekday columns of the weekday charts, in reverse calendar order.
pub const WEEKDAY_ORDER: [&str; 7] = [
    "Sunday",
    "Saturday",
    "Friday",
    "Thursday",
    "Wednesday",
    "Tuesday",
    "Monday",
];
