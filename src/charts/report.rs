use chrono::Local;
use maud::{html, Markup, PreEscaped, DOCTYPE};

/// One rendered chart as listed on the index page.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedChart {
    pub title: String,
    /// File name relative to the output folder.
    pub file: String,
}

/// Index page linking every chart of a run, each embedded in an iframe.
pub fn render_index(title: &str, charts: &[RenderedChart]) -> Markup {
    let generated = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { (title) }
                style {
                    (PreEscaped("
                        body { font-family: Arial, sans-serif; margin: 20px; }
                        .timestamp { color: #666; }
                        nav ul { columns: 2; }
                        section { margin-top: 30px; }
                        iframe { width: 100%; height: 560px; border: none; }
                    "))
                }
            }
            body {
                h1 { (title) }
                p class="timestamp" { "Generated on: " (generated) }
                @if charts.is_empty() {
                    p { "No charts were rendered." }
                } @else {
                    nav {
                        ul {
                            @for chart in charts {
                                li { a href=(chart.file) { (chart.title) } }
                            }
                        }
                    }
                    @for chart in charts {
                        section {
                            h2 { (chart.title) }
                            iframe src=(chart.file) title=(chart.title) {}
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_links_every_chart() {
        let charts = vec![
            RenderedChart { title: "Accidents per Year".into(), file: "accidents_per_year.html".into() },
            RenderedChart { title: "Fatalities".into(), file: "fatalities_over_weeks.html".into() },
        ];
        let page = render_index("Road accidents", &charts).into_string();
        assert!(page.contains("href=\"accidents_per_year.html\""));
        assert!(page.contains("src=\"fatalities_over_weeks.html\""));
        assert!(page.starts_with("<!DOCTYPE html>"));
    }

    #[test]
    fn test_titles_are_escaped() {
        let charts = vec![RenderedChart { title: "<b>x</b>".into(), file: "x.html".into() }];
        let page = render_index("t", &charts).into_string();
        assert!(page.contains("&lt;b&gt;x&lt;/b&gt;"));
    }

    #[test]
    fn test_empty_index_says_so() {
        let page = render_index("t", &[]).into_string();
        assert!(page.contains("No charts were rendered."));
    }
}
