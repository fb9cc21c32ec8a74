//! The single upload page.

use crate::pipeline::ChartUrls;

const HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Review Sentiment Analysis</title>
  <style>
    body { font-family: sans-serif; max-width: 1280px; margin: 2rem auto; padding: 0 1rem; }
    form { margin-bottom: 2rem; }
    figure { margin: 0 0 2rem 0; }
    img { max-width: 100%; border: 1px solid #ddd; }
  </style>
</head>
<body>
  <h1>Review Sentiment Analysis</h1>
  <form method="post" action="/" enctype="multipart/form-data">
    <input type="file" name="file" accept=".csv">
    <button type="submit">Analyze</button>
  </form>
"#;

const TAIL: &str = "</body>\n</html>\n";

/// Renders the upload form, followed by the charts when there are any.
pub fn render_index(charts: Option<&ChartUrls>) -> String {
    let mut html = String::from(HEAD);
    if let Some(charts) = charts {
        for (caption, url) in [
            ("Sentiment distribution", &charts.bar),
            ("Sentiment share", &charts.pie),
            ("Most common words", &charts.word_frequency),
        ] {
            html.push_str(&format!(
                "  <figure>\n    <img src=\"{}\" alt=\"{}\">\n    <figcaption>{}</figcaption>\n  </figure>\n",
                escape(url),
                caption,
                caption
            ));
        }
    }
    html.push_str(TAIL);
    html
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
