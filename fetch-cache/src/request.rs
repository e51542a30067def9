use bytes::Bytes;
use getset::Getters;
use serde::Serialize;
use std::collections::BTreeMap;

/// HTTP method of an outgoing request.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::AsRefStr,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Method {
    #[default]
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Safe methods are the only ones eligible for deduplication and caching.
    pub fn is_safe(&self) -> bool {
        matches!(self, Method::Get | Method::Head)
    }
}

/// Everything about a request besides its target.
///
/// Header names are stored lowercased in a sorted map, so two option values built
/// independently with the same content compare (and key) equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Getters)]
#[get = "pub"]
pub struct RequestOptions {
    method: Method,
    headers: BTreeMap<String, String>,
    body: Option<Bytes>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().trim().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_bearer_token(self, token: impl AsRef<str>) -> Self {
        self.with_header("authorization", format!("Bearer {}", token.as_ref()))
    }

    pub fn with_body(self, content_type: impl Into<String>, body: impl Into<Bytes>) -> Self {
        let mut options = self.with_header("content-type", content_type);
        options.body = Some(body.into());
        options
    }

    pub fn with_json<B: Serialize>(self, body: &B) -> Result<Self, serde_json::Error> {
        let bytes = serde_json::to_vec(body)?;
        Ok(self.with_body("application/json", bytes))
    }

    /// Form-encoded body from name/value pairs.
    pub fn with_form<'a, I>(self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let encoded = utils::url_path::encode_form(pairs);
        self.with_body("application/x-www-form-urlencoded", encoded)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// A request target paired with its options.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
#[get = "pub"]
pub struct Request {
    target: String,
    options: RequestOptions,
}

impl Request {
    pub fn new(target: impl Into<String>, options: RequestOptions) -> Self {
        Self {
            target: target.into(),
            options,
        }
    }

    pub fn method(&self) -> Method {
        self.options.method
    }
}
