use crate::error::BodyError;
use bytes::Bytes;
use getset::{CopyGetters, Getters};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// Immutable capture of a completed response.
///
/// Shared behind an `Arc` between the cache and every caller; each caller reads it through
/// its own [`Response`] view.
#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters)]
pub struct ResponseSnapshot {
    #[getset(get_copy = "pub")]
    status: u16,
    #[getset(get = "pub")]
    headers: Vec<(String, String)>,
    #[getset(get = "pub")]
    body: Bytes,
}

impl ResponseSnapshot {
    pub fn new(status: u16, headers: Vec<(String, String)>, body: impl Into<Bytes>) -> Self {
        let headers = headers
            .into_iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value))
            .collect();

        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(header, _)| header.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// A caller's view of a response. The body can be read once.
#[derive(Debug)]
pub struct Response {
    snapshot: Arc<ResponseSnapshot>,
    body_used: bool,
}

impl Response {
    pub fn new(snapshot: Arc<ResponseSnapshot>) -> Self {
        Self {
            snapshot,
            body_used: false,
        }
    }

    pub fn status(&self) -> u16 {
        self.snapshot.status
    }

    pub fn ok(&self) -> bool {
        self.snapshot.is_success()
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.snapshot.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.snapshot.header(name)
    }

    pub fn body_used(&self) -> bool {
        self.body_used
    }

    pub fn bytes(&mut self) -> Result<Bytes, BodyError> {
        if self.body_used {
            return Err(BodyError::AlreadyRead);
        }
        self.body_used = true;
        Ok(self.snapshot.body.clone())
    }

    pub fn text(&mut self) -> Result<String, BodyError> {
        let bytes = self.bytes()?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }

    pub fn json<T: DeserializeOwned>(&mut self) -> Result<T, BodyError> {
        let bytes = self.bytes()?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

impl From<ResponseSnapshot> for Response {
    fn from(snapshot: ResponseSnapshot) -> Self {
        Self::new(Arc::new(snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_can_be_read_once() {
        let mut response = Response::from(ResponseSnapshot::new(200, vec![], "hello"));

        assert!(!response.body_used());
        assert_eq!(response.text().unwrap(), "hello");
        assert!(response.body_used());
        assert!(matches!(response.bytes(), Err(BodyError::AlreadyRead)));
    }

    #[test]
    fn test_views_share_snapshot_independently() {
        let snapshot = Arc::new(ResponseSnapshot::new(
            200,
            vec![("Content-Type".to_string(), "application/json".to_string())],
            r#"{"ok":true}"#,
        ));
        let mut first = Response::new(snapshot.clone());
        let mut second = Response::new(snapshot);

        let value: serde_json::Value = first.json().unwrap();
        assert_eq!(value["ok"], true);
        assert_eq!(second.text().unwrap(), r#"{"ok":true}"#);
        assert_eq!(second.header("content-type"), Some("application/json"));
    }

    #[test]
    fn test_success_range() {
        assert!(ResponseSnapshot::new(204, vec![], "").is_success());
        assert!(!ResponseSnapshot::new(304, vec![], "").is_success());
        assert!(!ResponseSnapshot::new(500, vec![], "").is_success());
    }
}
