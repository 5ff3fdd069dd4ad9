//! Path segment encoding for values spliced into request URLs

use ravenfleet_domain::{FleetError, Result};
use url::Url;

/// Percent-encode `raw` as a single URL path segment.
///
/// Spaces become `%20` and `/` becomes `%2F`, so the value can never add or
/// split segments.
pub fn encode_path_segment(raw: &str) -> Result<String> {
    let mut scratch = Url::parse("http://segment.invalid/")
        .map_err(|e| FleetError::internal(format!("segment encoder: {e}")))?;
    scratch
        .path_segments_mut()
        .map_err(|()| FleetError::internal("segment encoder has no path"))?
        .clear()
        .push(raw);
    Ok(scratch.path().trim_start_matches('/').to_string())
}
