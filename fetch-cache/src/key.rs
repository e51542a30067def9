use crate::request::Request;
use sha2::{Digest, Sha256};
use std::fmt;
use utils::url_path::encode_component;

/// Header values that identify a user. They partition the key space but only their
/// digest ends up in the key.
const CREDENTIAL_HEADERS: [&str; 3] = ["authorization", "cookie", "proxy-authorization"];

/// Canonical identity of a request for deduplication and caching.
///
/// Layout: `METHOD target[?sorted query]` followed by `|name=value` for every header in
/// name order and `|#body=sha256:<hex>` when a body is present. Header names and values
/// are form-encoded and a `|` in the target is escaped, so `|`, `=` and `#` only ever
/// appear as separators. The target stays readable so invalidation can match on path
/// fragments.
#[derive(Hash, Eq, PartialEq, Clone, Debug, PartialOrd, Ord)]
pub struct RequestKey(String);

impl RequestKey {
    pub fn from_request(request: &Request) -> Self {
        let options = request.options();
        let mut key = format!("{} {}", options.method(), canonical_target(request.target()));

        for (name, value) in options.headers() {
            key.push('|');
            key.push_str(&encode_component(name));
            key.push('=');
            if CREDENTIAL_HEADERS.contains(&name.as_str()) {
                key.push_str("sha256:");
                key.push_str(&digest(value.as_bytes()));
            } else {
                key.push_str(&encode_component(value));
            }
        }

        if let Some(body) = options.body() {
            key.push_str("|#body=sha256:");
            key.push_str(&digest(body));
        }

        RequestKey(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn contains(&self, pattern: &str) -> bool {
        self.0.contains(pattern)
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sorts query parameters by name. The sort is stable, so repeated parameters keep
/// their relative order.
fn canonical_target(target: &str) -> String {
    let target = target.trim().replace('|', "%7C");
    let Some((path, query)) = target.split_once('?') else {
        return target.clone();
    };

    let mut pairs: Vec<&str> = query.split('&').filter(|pair| !pair.is_empty()).collect();
    if pairs.is_empty() {
        return path.to_string();
    }
    pairs.sort_by(|a, b| query_name(a).cmp(query_name(b)));
    format!("{}?{}", path, pairs.join("&"))
}

fn query_name(pair: &str) -> &str {
    pair.split_once('=').map_or(pair, |(name, _)| name)
}

fn digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
