//! Debug payload dumps for investigating source-data anomalies.

use anyhow::{Context, Result};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Persist one fetch's raw response (url, latency, status, headers, body)
/// to `<dir>/<name>.txt`. Bodies that parse as JSON are pretty-printed.
pub fn write_payload(
    dir: &Path,
    name: &str,
    url: &str,
    elapsed: Duration,
    status: StatusCode,
    headers: &HeaderMap,
    body: &str,
) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("creating dump dir {}", dir.display()))?;

    let mut out = String::new();
    writeln!(out, "{url}")?;
    writeln!(out, "{status} in {elapsed:?}")?;
    for (key, value) in headers {
        writeln!(out, "{}: {}", key, value.to_str().unwrap_or("<binary>"))?;
    }
    writeln!(out)?;
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(parsed) => writeln!(out, "{}", serde_json::to_string_pretty(&parsed)?)?,
        Err(_) => writeln!(out, "{body}")?,
    }

    let path = dir.join(format!("{name}.txt"));
    fs::write(&path, out).with_context(|| format!("writing dump {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_url_status_headers_and_pretty_body() {
        let dir = tempfile::tempdir().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("content-type", "application/json".parse().unwrap());

        write_payload(
            dir.path(),
            "probing",
            "https://source.example/incidents/probing",
            Duration::from_millis(120),
            StatusCode::OK,
            &headers,
            r#"{"results":[{"ip":"10.0.0.5"}]}"#,
        )
        .unwrap();

        let text = fs::read_to_string(dir.path().join("probing.txt")).unwrap();
        assert!(text.contains("https://source.example/incidents/probing"));
        assert!(text.contains("200 OK"));
        assert!(text.contains("content-type: application/json"));
        // Pretty-printed, not the single-line original.
        assert!(text.contains("\"results\": ["));
    }
}
