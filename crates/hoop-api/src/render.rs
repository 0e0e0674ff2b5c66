//! HTML pages.
//!
//! Pages are plain `format!` templates. Every dynamic value goes through
//! `htmlescape` before it is interpolated.

use axum::http::StatusCode;
use htmlescape::encode_minimal;

use hoop_models::AnalysisReport;

const BASE_STYLE: &str = "body { font-family: Arial, sans-serif; margin: 40px; background: #111; color: white; }
h1, h2 { text-align: center; }
a { color: #ff7733; }";

/// Upload form served at `/`.
pub fn index_page() -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>Hoop Vision AI</title>
<style>
{base}
.container {{ max-width: 600px; margin: auto; padding: 20px; background: #222; border-radius: 10px; }}
input {{ margin-top: 10px; }}
button {{ margin-top: 20px; padding: 10px; width: 100%; background: #ff5500; color: white; border: none; font-size: 18px; cursor: pointer; }}
button:hover {{ background: #ff7733; }}
</style>
</head>
<body>
<div class="container">
<h1>🏀 Hoop Vision AI</h1>
<p>Upload a basketball game clip to auto-generate stats, breakdowns, and highlights.</p>
<form action="/analyze" method="POST" enctype="multipart/form-data">
<input type="file" name="video" accept="video/*" required />
<button type="submit">Analyze Game</button>
</form>
</div>
</body>
</html>
"#,
        base = BASE_STYLE,
    )
}

/// Results page for one analysis.
pub fn results_page(report: &AnalysisReport) -> String {
    let stats = report
        .stats
        .rows()
        .iter()
        .map(|(label, value)| format!("<p><b>{}:</b> {}</p>\n", label, value))
        .collect::<String>();

    let highlights = report
        .highlights
        .iter()
        .map(|h| format!("<p>{}</p>\n", encode_minimal(&h.to_string())))
        .collect::<String>();

    let frames = report
        .frame_urls()
        .map(|url| {
            format!(
                "<img src=\"{}\" width=\"200\" alt=\"frame\" style=\"margin:5px;border-radius:5px;\">\n",
                encode_minimal(&url)
            )
        })
        .collect::<String>();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>Hoop Vision AI – Results</title>
<style>
{base}
.container {{ max-width: 700px; margin: auto; padding: 20px; background: #222; border-radius: 10px; }}
.stat-box {{ background: #333; padding: 15px; border-radius: 10px; margin: 10px 0; }}
.meta {{ color: #999; font-size: 14px; text-align: center; }}
</style>
</head>
<body>
<div class="container">
<h1>🏀 Hoop Vision AI Results</h1>
<p class="meta">{file} · {total} frames extracted</p>

<h2>📊 Game Stats</h2>
<div class="stat-box" id="stats">
{stats}</div>

<h2>🔥 Highlights Detected</h2>
<div class="stat-box" id="highlights">
{highlights}</div>

<h2>🖼 Extracted Frames</h2>
<p>Here are a few frames captured from your video:</p>
<div id="frames">
{frames}</div>
<p><a href="/">Analyze another clip</a></p>
</div>
</body>
</html>
"#,
        base = BASE_STYLE,
        file = encode_minimal(report.upload.display_name()),
        total = report.total_frames,
        stats = stats,
        highlights = highlights,
        frames = frames,
    )
}

/// Error page used by every failed request.
pub fn error_page(status: StatusCode, detail: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>Hoop Vision AI – Error</title>
<style>
{base}
.container {{ max-width: 600px; margin: auto; padding: 20px; background: #222; border-radius: 10px; text-align: center; }}
</style>
</head>
<body>
<div class="container">
<h1>{code} {reason}</h1>
<p>{detail}</p>
<p><a href="/">Back to upload</a></p>
</div>
</body>
</html>
"#,
        base = BASE_STYLE,
        code = status.as_u16(),
        reason = status.canonical_reason().unwrap_or("Error"),
        detail = encode_minimal(detail),
    )
}
