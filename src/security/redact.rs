use std::borrow::Cow;

const MAX_API_ERROR_CHARS: usize = 200;
const REDACTED: &str = "[REDACTED]";

fn is_secret_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':' | '+' | '/' | '=')
}

fn token_end(input: &str, from: usize) -> usize {
    let mut end = from;
    for (i, c) in input[from..].char_indices() {
        if is_secret_char(c) {
            end = from + i + c.len_utf8();
        } else {
            break;
        }
    }
    end
}

fn scrub_after_marker(scrubbed: &mut String, marker: &str) {
    let mut search_from = 0;
    while let Some(rel) = scrubbed[search_from..].find(marker) {
        let start = search_from + rel;
        let content_start = start + marker.len();
        let end = token_end(scrubbed, content_start);

        // Bare marker with nothing after it.
        if end == content_start {
            search_from = content_start;
            continue;
        }

        scrubbed.replace_range(start..end, REDACTED);
        search_from = start + REDACTED.len();
    }
}

const PREFIX_PATTERNS: [&str; 6] = ["sk-", "shpat_", "shpss_", "shpca_", "shppa_", "shpua_"];

const MARKER_PATTERNS: [&str; 10] = [
    "Authorization: Bearer ",
    "authorization: bearer ",
    "\"authorization\":\"Bearer ",
    "X-Shopify-Access-Token: ",
    "x-shopify-access-token: ",
    "api_key=",
    "access_token=",
    "\"api_key\":\"",
    "\"access_token\":\"",
    "\"token\":\"",
];

/// Scrub key-like tokens from upstream error strings.
///
/// Covers OpenAI-style `sk-` keys, Shopify token prefixes and the usual
/// header/query/json markers.
pub fn scrub_secret_patterns(input: &str) -> Cow<'_, str> {
    let needs_scrubbing = PREFIX_PATTERNS
        .iter()
        .chain(MARKER_PATTERNS.iter())
        .any(|pattern| input.contains(pattern));
    if !needs_scrubbing {
        return Cow::Borrowed(input);
    }

    let mut scrubbed = input.to_string();
    for pattern in PREFIX_PATTERNS {
        scrub_after_marker(&mut scrubbed, pattern);
    }
    for marker in MARKER_PATTERNS {
        scrub_after_marker(&mut scrubbed, marker);
    }
    Cow::Owned(scrubbed)
}

/// Scrub secrets and cap the length of an upstream error body.
pub fn sanitize_api_error(input: &str) -> String {
    let scrubbed = scrub_secret_patterns(input);
    crate::utils::text::truncate_with_ellipsis(&scrubbed, MAX_API_ERROR_CHARS)
}

/// Show a configured secret without revealing it: `shps…(38 chars)`.
pub fn redact_secret(value: Option<&str>) -> String {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => "<unset>".to_string(),
        Some(v) => {
            let len = v.chars().count();
            if len <= 8 {
                format!("****({len} chars)")
            } else {
                let head: String = v.chars().take(4).collect();
                format!("{head}…({len} chars)")
            }
        }
    }
}

/// Headers whose values never appear in debug output.
pub fn is_sensitive_header(name: &str) -> bool {
    const SENSITIVE: [&str; 7] = [
        "authorization",
        "cookie",
        "set-cookie",
        "x-shopify-hmac-sha256",
        "x-shopify-access-token",
        "x-debug-key",
        "proxy-authorization",
    ];
    SENSITIVE
        .iter()
        .any(|sensitive| name.eq_ignore_ascii_case(sensitive))
}
