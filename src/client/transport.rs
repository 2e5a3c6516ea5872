use std::time::Duration;

use bytes::Bytes;

use crate::error::FetchError;

/// Status code the service uses for "nothing here".
pub const NOT_FOUND: u16 = 404;

/// Raw HTTP response: status code and body.
#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self { status, body: body.into() }
    }

    #[inline] pub fn is_success(&self) -> bool { (200..300).contains(&self.status) }

    #[inline] pub fn is_not_found(&self) -> bool { self.status == NOT_FOUND }
}

/// Issues GET requests. Only failures that produce no response at all are errors;
/// status handling belongs to the caller.
pub trait Transport {
    fn get(&self, url: &str, query: &[(&str, String)], timeout: Duration) -> Result<Response, FetchError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn get(&self, url: &str, query: &[(&str, String)], timeout: Duration) -> Result<Response, FetchError> {
        (**self).get(url, query, timeout)
    }
}

/// Blocking `reqwest` transport.
#[cfg(feature = "download")]
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

#[cfg(feature = "download")]
impl HttpTransport {
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("terrageo/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Transport { url: String::new(), source: Box::new(e) })?;
        Ok(Self { client })
    }
}

#[cfg(feature = "download")]
impl Transport for HttpTransport {
    fn get(&self, url: &str, query: &[(&str, String)], timeout: Duration) -> Result<Response, FetchError> {
        let transport_error = |e: reqwest::Error| FetchError::Transport { url: url.to_string(), source: Box::new(e) };

        let resp = self.client.get(url)
            .query(query)
            .timeout(timeout)
            .send()
            .map_err(transport_error)?;

        let status = resp.status().as_u16();
        let body = resp.bytes().map_err(transport_error)?;
        Ok(Response { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_status_codes() {
        assert!(Response::new(200, "{}").is_success());
        assert!(!Response::new(500, "").is_success());
        assert!(Response::new(404, "").is_not_found());
        assert!(!Response::new(404, "").is_success());
    }
}
