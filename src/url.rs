use crate::error::RowError;
use percent_encoding::percent_decode_str;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetailTab {
    #[default]
    Pipeline,
    Changes,
    Tests,
    Artifacts,
}

impl DetailTab {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pipeline => "pipeline",
            Self::Changes => "changes",
            Self::Tests => "tests",
            Self::Artifacts => "artifacts",
        }
    }
}

impl fmt::Display for DetailTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strict percent-decoding of a run's `pipeline` token.
///
/// `percent_decode_str` passes stray `%` signs through untouched, so escapes
/// are validated first: every `%` must be followed by two hex digits, and the
/// decoded bytes must be UTF-8.
pub fn decode_pipeline_token(raw: &str) -> Result<String, RowError> {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes
                .get(i + 1..i + 3)
                .is_some_and(|pair| pair.iter().all(u8::is_ascii_hexdigit));
            if !valid {
                return Err(RowError::Encoding {
                    token: raw.to_string(),
                    reason: format!("malformed escape at byte {i}"),
                });
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    percent_decode_str(raw)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|e| RowError::Encoding {
            token: raw.to_string(),
            reason: e.to_string(),
        })
}

/// Path of a run's detail view:
/// `/organizations/{org}/{fullName}/detail/{token}/{runId}/{tab}`.
///
/// Segments are used verbatim. A missing organization or full name leaves
/// an empty segment.
pub fn build_run_details_url(
    organization: Option<&str>,
    full_name: Option<&str>,
    decoded_token: &str,
    run_id: &str,
    tab: DetailTab,
) -> String {
    format!(
        "/organizations/{}/{}/detail/{}/{}/{}",
        organization.unwrap_or_default(),
        full_name.unwrap_or_default(),
        decoded_token,
        run_id,
        tab
    )
}
