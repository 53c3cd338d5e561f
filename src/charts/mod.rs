//! Chart rendering.
//!
//! Every chart is written as a standalone plotly HTML file in the output
//! folder and remembered so `write_index` can link them all.
//!
//! Submodules:
//! - `labels`  - data-label formatting shared by the bar charts.
//! - `treemap` - squarified rectangle layout.
//! - `report`  - the maud index page.

pub mod labels;
pub mod report;
pub mod treemap;

use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use plotly::common::{DashType, Fill, Line, Marker, Mode, Orientation, TextPosition, Title};
use plotly::common::{ColorScale, ColorScalePalette};
use plotly::layout::{Axis, BarMode, Legend};
use plotly::{Bar, HeatMap, Layout, Pie, Plot, Scatter};

use crate::analysis::tables::{CrossTab, PairValue};
use crate::logging::{self, Stage};
use crate::model::PipelineError;

pub use labels::DataLabels;
pub use report::RenderedChart;

/// Matplotlib's "Set3" qualitative palette.
pub const SET3: [&str; 12] = [
    "#8dd3c7", "#ffffb3", "#bebada", "#fb8072", "#80b1d3", "#fdb462",
    "#b3de69", "#fccde5", "#d9d9d9", "#bc80bd", "#ccebc5", "#ffed6f",
];

const HIGHLIGHT: &str = "red";
const MUTED: &str = "grey";

/// Titles for a chart with two axes and a legend.
#[derive(Debug, Clone, Default)]
pub struct AxisLabels<'a> {
    pub title: &'a str,
    pub x_label: &'a str,
    pub y_label: &'a str,
    pub legend_title: Option<&'a str>,
}

fn palette(i: usize) -> &'static str {
    SET3[i % SET3.len()]
}

fn no_data(filename: &str) -> PipelineError {
    PipelineError::Chart(format!("no data to plot for {}", filename))
}

fn axis(label: &str) -> Axis {
    Axis::new().title(Title::with_text(label)).show_grid(false)
}

pub struct Chart {
    output_folder: PathBuf,
    rendered: Vec<RenderedChart>,
}

impl Chart {
    pub fn new(output_folder: &Path) -> Self {
        Self {
            output_folder: output_folder.to_path_buf(),
            rendered: Vec::new(),
        }
    }

    pub fn rendered(&self) -> &[RenderedChart] {
        &self.rendered
    }

    fn save(&mut self, plot: Plot, title: &str, filename: &str) -> Result<PathBuf, PipelineError> {
        let file = format!("{}.html", filename);
        let path = self.output_folder.join(&file);
        fs::write(&path, plot.to_html())?;
        logging::debug(Stage::Visualize, Some(file.as_str()), &format!("Wrote {}", path.display()));
        self.rendered.push(RenderedChart { title: title.to_string(), file });
        Ok(path)
    }

    /// Pie of `values`, each slice labelled with its name and its share of
    /// the total to two decimals.
    pub fn pie_share_chart(
        &mut self,
        values: &[usize],
        names: &[String],
        title: &str,
        filename: &str,
    ) -> Result<PathBuf, PipelineError> {
        if values.is_empty() {
            return Err(no_data(filename));
        }
        if values.len() != names.len() {
            return Err(PipelineError::Chart(format!(
                "{} values but {} names for {}",
                values.len(),
                names.len(),
                filename
            )));
        }

        let shares = labels::percent_labels(values);
        let slice_labels: Vec<String> = names
            .iter()
            .zip(&shares)
            .map(|(name, share)| format!("{}<br>{}", labels::html_text(name), share))
            .collect();

        let trace = Pie::new(values.to_vec())
            .labels(slice_labels)
            .text_info("label");

        let mut plot = Plot::new();
        plot.add_trace(trace);
        plot.set_layout(Layout::new().title(Title::with_text(title)).width(800).height(800));
        self.save(plot, title, filename)
    }

    /// Line of counts per date bin.
    pub fn total_count_per_date_line_chart(
        &mut self,
        series: &[(NaiveDate, usize)],
        title: &str,
        legend: &str,
        x_label: &str,
        filename: &str,
    ) -> Result<PathBuf, PipelineError> {
        if series.is_empty() {
            return Err(no_data(filename));
        }
        let dates: Vec<String> = series.iter().map(|(d, _)| d.format("%Y-%m-%d").to_string()).collect();
        let counts: Vec<usize> = series.iter().map(|(_, c)| *c).collect();

        let trace = Scatter::new(dates, counts)
            .mode(Mode::Lines)
            .name(legend)
            .line(Line::new().color("lightgrey"));

        let layout = Layout::new()
            .title(Title::with_text(title))
            .x_axis(axis(x_label))
            .y_axis(axis("Total Count"))
            .show_legend(true)
            .width(1500)
            .height(600);

        let mut plot = Plot::new();
        plot.add_trace(trace);
        plot.set_layout(layout);
        self.save(plot, title, filename)
    }

    /// One line per column of `table` across its rows, for each
    /// `(column, color)` in `series`. Columns missing from the table are
    /// left out; gaps in a line stay gaps.
    pub fn multi_line_chart(
        &mut self,
        table: &CrossTab,
        series: &[(&str, &str)],
        title: &str,
        y_label: &str,
        filename: &str,
    ) -> Result<PathBuf, PipelineError> {
        let present: Vec<&(&str, &str)> = series
            .iter()
            .filter(|(column, _)| table.column_labels.iter().any(|l| l == column))
            .collect();
        if table.is_empty() || present.is_empty() {
            return Err(no_data(filename));
        }

        let mut plot = Plot::new();
        for (column, color) in present {
            let name = format!("{} Accidents", column);
            let trace = Scatter::new(table.row_labels.clone(), table.column(column))
                .mode(Mode::Lines)
                .name(&name)
                .line(Line::new().color(color.to_string()));
            plot.add_trace(trace);
        }

        plot.set_layout(
            Layout::new()
                .title(Title::with_text(title))
                .y_axis(axis(y_label))
                .show_legend(true)
                .width(1400)
                .height(600),
        );
        self.save(plot, title, filename)
    }

    /// Horizontal 100% stacked bars: one bar per row of `table` (in
    /// `row_order`), one segment per column. Cells are shares of the row.
    pub fn stacked_bar_chart(
        &mut self,
        table: &CrossTab,
        row_order: &[&str],
        axes: &AxisLabels<'_>,
        filename: &str,
    ) -> Result<PathBuf, PipelineError> {
        if table.is_empty() {
            return Err(no_data(filename));
        }
        let table = table.reindex_rows(row_order);

        let mut plot = Plot::new();
        for (i, column) in table.column_labels.iter().enumerate() {
            let shares = table.column(column);
            let percent: Vec<Option<f64>> = shares.iter().map(|s| s.map(|v| v * 100.0)).collect();
            let text: Vec<String> = shares
                .iter()
                .map(|s| s.map(labels::share_label).unwrap_or_default())
                .collect();

            let trace = Bar::new(percent, table.row_labels.clone())
                .name(column)
                .orientation(Orientation::Horizontal)
                .marker(Marker::new().color(palette(i)))
                .text_array(text)
                .text_position(TextPosition::Inside);
            plot.add_trace(trace);
        }

        plot.set_layout(
            Layout::new()
                .title(Title::with_text(axes.title))
                .bar_mode(BarMode::Stack)
                .x_axis(axis(axes.x_label))
                .y_axis(axis(axes.y_label))
                .legend(Legend::new().title(Title::with_text(axes.legend_title.unwrap_or(""))))
                .width(2000)
                .height(1000),
        );
        self.save(plot, axes.title, filename)
    }

    /// Horizontal bars grouped by `first`, one series per `second` value.
    pub fn grouped_bar_chart(
        &mut self,
        data: &[PairValue],
        axes: &AxisLabels<'_>,
        filename: &str,
        data_labels: Option<DataLabels>,
    ) -> Result<PathBuf, PipelineError> {
        if data.is_empty() {
            return Err(no_data(filename));
        }

        let mut hues: Vec<&str> = data.iter().map(|p| p.second.as_str()).collect();
        hues.sort_unstable();
        hues.dedup();

        let mut plot = Plot::new();
        for (i, hue) in hues.iter().enumerate() {
            let group: Vec<&PairValue> = data.iter().filter(|p| p.second == *hue).collect();
            let values: Vec<f64> = group.iter().map(|p| p.value).collect();
            let categories: Vec<String> = group.iter().map(|p| p.first.clone()).collect();

            let mut trace = Bar::new(values.clone(), categories)
                .name(hue)
                .orientation(Orientation::Horizontal)
                .marker(Marker::new().color(palette(i)));
            if let Some(params) = &data_labels {
                let text: Vec<String> = values.iter().map(|v| labels::data_label(*v, params)).collect();
                trace = trace.text_array(text).text_position(TextPosition::Outside);
            }
            plot.add_trace(trace);
        }

        let mut layout = Layout::new()
            .title(Title::with_text(axes.title))
            .bar_mode(BarMode::Group)
            .x_axis(axis(axes.x_label))
            .y_axis(axis(axes.y_label))
            .width(1600)
            .height(900);
        if let Some(legend) = axes.legend_title {
            layout = layout.legend(Legend::new().title(Title::with_text(legend)));
        }
        plot.set_layout(layout);
        self.save(plot, axes.title, filename)
    }

    /// Vertical bars in the given order. The largest bar is red, the others
    /// grey, with a dashed line through the bar tops.
    pub fn bar_chart<K: Display>(
        &mut self,
        data: &[(K, usize)],
        title: &str,
        y_label: &str,
        filename: &str,
    ) -> Result<PathBuf, PipelineError> {
        let Some(max) = data.iter().map(|(_, c)| *c).max() else {
            return Err(no_data(filename));
        };
        let keys: Vec<String> = data.iter().map(|(k, _)| k.to_string()).collect();
        let counts: Vec<usize> = data.iter().map(|(_, c)| *c).collect();
        let colors: Vec<&str> = counts
            .iter()
            .map(|c| if *c == max { HIGHLIGHT } else { MUTED })
            .collect();

        let bars = Bar::new(keys.clone(), counts.clone())
            .marker(Marker::new().color_array(colors))
            .show_legend(false);
        let line = Scatter::new(keys, counts)
            .mode(Mode::Lines)
            .line(Line::new().color("black").dash(DashType::Dash))
            .show_legend(false);

        let mut plot = Plot::new();
        plot.add_trace(bars);
        plot.add_trace(line);
        plot.set_layout(
            Layout::new()
                .title(Title::with_text(title))
                .x_axis(Axis::new().type_(plotly::layout::AxisType::Category))
                .y_axis(axis(y_label))
                .width(1200)
                .height(500),
        );
        self.save(plot, title, filename)
    }

    /// Horizontal bars with `highlight` drawn dark and the rest light.
    /// Entries without a value are drawn as gaps.
    pub fn highlight_barh_chart(
        &mut self,
        data: &[(String, Option<f64>)],
        highlight: &str,
        title: &str,
        x_label: &str,
        filename: &str,
    ) -> Result<PathBuf, PipelineError> {
        if data.iter().all(|(_, v)| v.is_none()) {
            return Err(no_data(filename));
        }
        let names: Vec<String> = data.iter().map(|(n, _)| n.clone()).collect();
        let values: Vec<Option<f64>> = data.iter().map(|(_, v)| *v).collect();
        let colors: Vec<&str> = names
            .iter()
            .map(|n| if n == highlight { "navy" } else { "lightsteelblue" })
            .collect();

        let trace = Bar::new(values, names)
            .orientation(Orientation::Horizontal)
            .marker(Marker::new().color_array(colors))
            .show_legend(false);

        let mut plot = Plot::new();
        plot.add_trace(trace);
        plot.set_layout(
            Layout::new()
                .title(Title::with_text(title))
                .x_axis(axis(x_label))
                .width(1000)
                .height(500),
        );
        self.save(plot, title, filename)
    }

    /// Greyscale heatmap of a count table; darker cells hold more.
    pub fn heatmap_chart(
        &mut self,
        table: &CrossTab,
        title: &str,
        filename: &str,
    ) -> Result<PathBuf, PipelineError> {
        if table.is_empty() {
            return Err(no_data(filename));
        }
        let trace = HeatMap::new(
            table.column_labels.clone(),
            table.row_labels.clone(),
            table.cells.clone(),
        )
        .color_scale(ColorScale::Palette(ColorScalePalette::Greys))
        .reverse_scale(true);

        let mut plot = Plot::new();
        plot.add_trace(trace);
        plot.set_layout(
            Layout::new()
                .title(Title::with_text(title))
                .y_axis(Axis::new().type_(plotly::layout::AxisType::Category))
                .width(1000)
                .height(600),
        );
        self.save(plot, title, filename)
    }

    /// Treemap of `sizes`: squarified rectangles on a 100 x 100 canvas,
    /// each labelled at its center.
    pub fn treemap_chart(
        &mut self,
        tile_labels: &[String],
        sizes: &[usize],
        title: &str,
        filename: &str,
    ) -> Result<PathBuf, PipelineError> {
        let tiles: Vec<(&String, f64)> = tile_labels
            .iter()
            .zip(sizes)
            .filter(|(_, s)| **s > 0)
            .map(|(l, s)| (l, *s as f64))
            .collect();
        if tiles.is_empty() {
            return Err(no_data(filename));
        }

        let canvas = treemap::Rect { x: 0.0, y: 0.0, dx: 100.0, dy: 100.0 };
        let raw: Vec<f64> = tiles.iter().map(|(_, s)| *s).collect();
        let rects = treemap::squarify(&treemap::normalize_sizes(&raw, canvas.dx, canvas.dy), canvas);

        let mut plot = Plot::new();
        for (i, rect) in rects.iter().enumerate() {
            let (xs, ys) = rect.outline();
            let tile = Scatter::new(xs, ys)
                .mode(Mode::Lines)
                .fill(Fill::ToSelf)
                .fill_color(palette(i))
                .line(Line::new().color("white").width(2.0))
                .show_legend(false);
            plot.add_trace(tile);
        }

        let (cx, cy): (Vec<f64>, Vec<f64>) = rects.iter().map(|r| r.center()).unzip();
        let text: Vec<String> = tiles.iter().map(|(l, _)| labels::html_text(l)).collect();
        plot.add_trace(
            Scatter::new(cx, cy)
                .mode(Mode::Text)
                .text_array(text)
                .show_legend(false),
        );

        let hidden = || {
            Axis::new()
                .show_grid(false)
                .zero_line(false)
                .show_tick_labels(false)
                .range(vec![0.0, 100.0])
        };
        plot.set_layout(
            Layout::new()
                .title(Title::with_text(title))
                .x_axis(hidden())
                .y_axis(hidden())
                .width(800)
                .height(600),
        );
        self.save(plot, title, filename)
    }

    /// Writes `index.html` linking every chart rendered so far.
    pub fn write_index(&self, title: &str) -> Result<PathBuf, PipelineError> {
        let path = self.output_folder.join("index.html");
        fs::write(&path, report::render_index(title, &self.rendered).into_string())?;
        logging::info(
            Stage::Visualize,
            Some("index.html"),
            &format!("Index of {} charts written to {}", self.rendered.len(), path.display()),
        );
        Ok(path)
    }
}
