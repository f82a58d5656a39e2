use url::Url;

/// Validate that the assessment backend endpoint is a usable http(s) URL.
pub(super) fn validate_assessment_url(raw: &str) -> Result<(), String> {
    let url =
        Url::parse(raw).map_err(|e| format!("ASSESSMENT_URL is not a valid URL: {e}"))?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!(
            "ASSESSMENT_URL must use http or https, got '{other}'"
        )),
    }
}

/// Validate the utterance inactivity window.
///
/// A zero window would finalize an utterance on every fragment, so it is
/// rejected outright rather than silently clamped.
pub(super) fn validate_silence_window(window_ms: u64) -> Result<(), String> {
    if window_ms == 0 {
        return Err("SILENCE_WINDOW_MS must be greater than zero".to_string());
    }
    Ok(())
}
