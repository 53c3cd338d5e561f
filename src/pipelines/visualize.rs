//! Renders every accident chart from the merged CSV.

use std::fs;
use std::path::PathBuf;

use clap::Args;

use crate::analysis::accidents::{self, Accident, Field, Period};
use crate::analysis::bands::{DAYTIME_ORDER, VEHICLE_AGE_ORDER, WEEKDAY_ORDER};
use crate::charts::{AxisLabels, Chart, DataLabels};
use crate::ingest::datasets;
use crate::logging::{self, Stage};
use crate::model::{MERGED_FILE, PipelineError};

const MISSING_OR_OUT_OF_RANGE: &str = "Data missing or out of range";
const MANOEUVRE_MIN_COUNT: usize = 80_000;
const SEVERITY_COLORS: [(&str, &str); 3] = [("Fatal", "red"), ("Serious", "orange"), ("Slight", "green")];

#[derive(Debug, Clone, Args)]
pub struct VisualizeArgs {
    #[arg(long, default_value = "data")]
    pub input_folder: PathBuf,
    /// Merged accident-vehicle CSV
    #[arg(long, default_value = MERGED_FILE)]
    pub filename: String,
    /// Folder for the chart HTML files (created if missing)
    #[arg(long, default_value = "plots")]
    pub output_folder: PathBuf,
}

/// Outcome of one chart: rendered, or skipped for lack of data. Any other
/// error aborts the run.
fn render(name: &str, result: Result<PathBuf, PipelineError>) -> Result<bool, PipelineError> {
    match result {
        Ok(_) => Ok(true),
        Err(PipelineError::Chart(reason)) => {
            logging::warn(Stage::Visualize, Some(name), &format!("Skipped: {}", reason));
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

/// Draws the full chart set for `data` into `chart`'s folder and writes
/// the index. Returns the number of charts rendered.
pub fn visualize(data: &[Accident], chart: &mut Chart) -> Result<usize, PipelineError> {
    let mut attempted = 0;
    let mut rendered = 0;
    let mut tally = |ok: bool| {
        attempted += 1;
        if ok {
            rendered += 1;
        }
    };

    // Severity share
    let (counts, severities) = accidents::list_values_by_column(data, Field::AccidentSeverity, &[]);
    let names: Vec<String> = severities.iter().map(|v| format!("{} Accidents", v)).collect();
    tally(render(
        "Accidents_severity_share",
        chart.pie_share_chart(&counts, &names, "Accident Severity: Share in % (2005-2017)", "Accidents_severity_share"),
    )?);

    // Weather share
    let (counts, weather) = accidents::list_values_by_column(
        data,
        Field::WeatherConditions,
        &["Unknown", MISSING_OR_OUT_OF_RANGE],
    );
    let names: Vec<String> = weather.iter().map(|v| format!("{} weather", v)).collect();
    tally(render(
        "Accidents_weather_conditions_share",
        chart.pie_share_chart(
            &counts,
            &names,
            "Accidents weather conditions: Share in % (2005-2017)",
            "Accidents_weather_conditions_share",
        ),
    )?);

    // Monthly totals
    tally(render(
        "Accidents_per_months",
        chart.total_count_per_date_line_chart(
            &accidents::count_per_period(data, Period::Month),
            "Accidents per Month",
            "Total per Month",
            "Date per Month",
            "Accidents_per_months",
        ),
    )?);

    // Driver age and sex
    let driver_exclusions: &[(Field, &[&str])] = &[
        (Field::AgeBandOfDriver, &[MISSING_OR_OUT_OF_RANGE]),
        (Field::SexOfDriver, &["Not known", MISSING_OR_OUT_OF_RANGE]),
    ];
    let by_age_and_sex =
        accidents::counts_by_two_columns(data, Field::AgeBandOfDriver, Field::SexOfDriver, driver_exclusions);
    tally(render(
        "accidents_by_age_and_sex",
        chart.grouped_bar_chart(
            &by_age_and_sex,
            &AxisLabels {
                title: "Accidents by drivers age and sex",
                x_label: "Total",
                y_label: "Age Band of Driver",
                legend_title: None,
            },
            "accidents_by_age_and_sex",
            Some(DataLabels { decimals: 0, round_number: 0, is_percentage: false }),
        ),
    )?);

    // Yearly totals
    tally(render(
        "accidents_per_year",
        chart.bar_chart(&accidents::per_year(data), "Accidents per Year", "Total values", "accidents_per_year"),
    )?);

    // Vehicle age bands by driver age
    let vehicle_driver_exclusions: &[(Field, &[&str])] = &[
        (Field::AgeBandOfVehicle, &["Data missing"]),
        (Field::AgeBandOfDriver, &[MISSING_OR_OUT_OF_RANGE]),
    ];
    let vehicle_age_share = accidents::share_count(
        data,
        Field::AgeBandOfVehicle,
        Field::AgeBandOfDriver,
        vehicle_driver_exclusions,
    );
    tally(render(
        "vehicules_age_bands_accidents_by_drivers_age",
        chart.stacked_bar_chart(
            &vehicle_age_share,
            &VEHICLE_AGE_ORDER,
            &AxisLabels {
                title: "Vehicule's age bands accidents by Driver's age",
                x_label: "Percentage",
                y_label: "Vehicule's age bands",
                legend_title: Some("Driver's age bands"),
            },
            "vehicules_age_bands_accidents_by_drivers_age",
        ),
    )?);

    // Driver age and vehicle age, as shares of all accidents
    let by_driver_and_vehicle = accidents::share_of_total(&accidents::counts_by_two_columns(
        data,
        Field::AgeBandOfDriver,
        Field::AgeBandOfVehicle,
        vehicle_driver_exclusions,
    ));
    tally(render(
        "accidents_by_drivers_age_and_vehicles_age",
        chart.grouped_bar_chart(
            &by_driver_and_vehicle,
            &AxisLabels {
                title: "Accidents by driver's age and vehicle's age",
                x_label: "Percentage",
                y_label: "Age Band of Driver",
                legend_title: None,
            },
            "accidents_by_drivers_age_and_vehicles_age",
            Some(DataLabels { decimals: 3, round_number: 3, is_percentage: true }),
        ),
    )?);

    // Weekday x year heatmap
    tally(render(
        "accidents_per_weekday_and_year",
        chart.heatmap_chart(
            &accidents::per_weekday_and_year(data, &WEEKDAY_ORDER),
            "Accidents by weekdays and years",
            "accidents_per_weekday_and_year",
        ),
    )?);

    // Average per weekday
    let averages = accidents::average_per_weekday(data, &WEEKDAY_ORDER);
    let busiest = averages
        .iter()
        .filter_map(|(day, avg)| avg.map(|a| (day.as_str(), a)))
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(day, _)| day.to_string())
        .unwrap_or_default();
    tally(render(
        "Accidents_per_weekdays",
        chart.highlight_barh_chart(
            &averages,
            &busiest,
            "Average Accidents per Weekday",
            "Average Number",
            "Accidents_per_weekdays",
        ),
    )?);

    // Weekly fatalities
    let fatalities = accidents::with_severity(data, "Fatal");
    tally(render(
        "fatalities_over_weeks",
        chart.total_count_per_date_line_chart(
            &accidents::count_per_period(&fatalities, Period::Week),
            "Fatalities",
            "Total fatalities per week",
            "",
            "fatalities_over_weeks",
        ),
    )?);

    // Weekly severity proportions
    tally(render(
        "fatalities_variation_over_years",
        chart.multi_line_chart(
            &accidents::severity_share_per_period(data, Period::Week),
            &SEVERITY_COLORS,
            "Proportion of Accidents Severity",
            "Share on all Accidents",
            "fatalities_variation_over_years",
        ),
    )?);

    // Hourly and daytime totals
    tally(render(
        "accidents_per_Hour",
        chart.bar_chart(&accidents::per_hour(data), "Accidents per Hour", "Total values", "accidents_per_Hour"),
    )?);
    tally(render(
        "accidents_per_daytime",
        chart.bar_chart(
            &accidents::per_daytime(data),
            "Accidents per daytime",
            "Total values",
            "accidents_per_daytime",
        ),
    )?);

    // Severity by daytime
    tally(render(
        "daytime_accidents_by_severity",
        chart.stacked_bar_chart(
            &accidents::share_count(data, Field::Daytime, Field::AccidentSeverity, &[]),
            &DAYTIME_ORDER,
            &AxisLabels {
                title: "Daytime accidents by severity",
                x_label: "Percentage",
                y_label: "Daytime",
                legend_title: Some("Accident severity"),
            },
            "daytime_accidents_by_severity",
        ),
    )?);

    // Treemaps
    for (field, min_value, title, filename) in [
        (Field::DriverHomeAreaType, 0, "Accidents by driver's home area", "accidents_by_home_area"),
        (Field::JourneyPurposeOfDriver, 0, "Accidents by journey purpose", "accidents_by_journey_purpose"),
        (Field::VehicleManoeuvre, MANOEUVRE_MIN_COUNT, "Treemap of Vehicle Manoeuvre", "accidents_by_manoeuver"),
    ] {
        let counts = accidents::count_by_column(data, field, min_value, &[]);
        logging::debug(
            Stage::Visualize,
            Some(filename),
            &format!("{} distinct {} values above {}", counts.entries.len(), field.column_name(), min_value),
        );
        tally(render(filename, chart.treemap_chart(&counts.labels, &counts.sizes, title, filename))?);
    }

    logging::log_stage_summary(Stage::Visualize, "Charts", attempted, rendered);
    chart.write_index("UK road accidents")?;
    Ok(rendered)
}

pub fn run(args: &VisualizeArgs) -> Result<usize, PipelineError> {
    let input = args.input_folder.join(&args.filename);
    if !input.exists() {
        return Err(PipelineError::MissingFile(args.filename.clone()));
    }
    fs::create_dir_all(&args.output_folder)?;

    let records = datasets::read_records(&input)?;
    let total = records.len();
    let data = accidents::transform(records);
    if data.len() < total {
        logging::info(
            Stage::Visualize,
            Some(args.filename.as_str()),
            &format!("Dropped {} rows without a usable time", total - data.len()),
        );
    }

    let mut chart = Chart::new(&args.output_folder);
    visualize(&data, &mut chart)
}
