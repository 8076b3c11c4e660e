// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Text spoken after a successful diagnosis.

use crate::proto::DiagnosticResult;

/// Compose the announcement for a diagnostic result.
///
/// Quality is rendered as a whole percentage (ties to even), landmarks are joined in the
/// order the diagnostician returned them, and the diagnosis comes last.
///
/// ```
/// use sono_triage::engine::announcement::compose_announcement;
/// use sono_triage::proto::DiagnosticResult;
///
/// let result = DiagnosticResult {
///     diagnosis: "No abnormal findings".to_string(),
///     image_quality: 0.72,
///     landmarks: vec!["liver".to_string(), "kidney".to_string()],
/// };
///
/// assert_eq!(
///     compose_announcement(&result),
///     "Image quality is 72%. Identified liver, kidney. No abnormal findings."
/// );
/// ```
pub fn compose_announcement(result: &DiagnosticResult) -> String {
    // `{:.0}` rounds exact halves to even: 12.5 renders as 12.
    let quality = result.image_quality * 100.0;
    let landmarks = if result.landmarks.is_empty() {
        "no landmarks".to_string()
    } else {
        result.landmarks.join(", ")
    };

    let mut text = format!("Image quality is {:.0}%. Identified {}.", quality, landmarks);

    let diagnosis = result.diagnosis.trim();
    if !diagnosis.is_empty() {
        text.push(' ');
        text.push_str(diagnosis);
        if !diagnosis.ends_with(&['.', '!', '?'][..]) {
            text.push('.');
        }
    }
    text
}
