//! Helpers for turning request targets into absolute URLs.

use url::{form_urlencoded, ParseError, Url};

/// Resolve a request target against a base URL.
///
/// Absolute targets are returned as-is; paths are joined onto `base`.
pub fn resolve(base: &Url, target: &str) -> Result<Url, ParseError> {
    match Url::parse(target) {
        Ok(url) => Ok(url),
        Err(ParseError::RelativeUrlWithoutBase) => base.join(target),
        Err(err) => Err(err),
    }
}

/// Append form-encoded query pairs to a path. Pairs with empty values are skipped.
pub fn with_query<'a, I>(path: &str, pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    let mut any = false;
    for (name, value) in pairs {
        if value.is_empty() {
            continue;
        }
        serializer.append_pair(name, value);
        any = true;
    }

    if !any {
        return path.to_string();
    }

    let separator = if path.contains('?') { '&' } else { '?' };
    format!("{}{}{}", path, separator, serializer.finish())
}

/// Form-encode name/value pairs, keeping empty values.
pub fn encode_form<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

/// Form-encode a single component so it can sit between separators unambiguously.
pub fn encode_component(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}
