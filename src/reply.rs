use http::StatusCode;
use serde::Serialize;

use crate::error::Error;

/// The raw value returned by a handler.
///
/// `NotFound` means "this route does not match". It is neither an error nor
/// a response and is normalized to a `404` with an empty body.
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    /// A plain text body with a `200 OK` status.
    Text(String),

    /// A record where unspecified fields fall back to `200` and `""`.
    Record {
        status: Option<u16>,
        body: Option<String>,
    },

    /// No route matched the request.
    NotFound,
}

/// The canonical response produced by [`Reply::normalize`].
///
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResponseSpec {
    status: StatusCode,
    body: String,
}

impl Reply {
    #[inline]
    pub fn not_found() -> Self {
        Self::NotFound
    }

    /// Returns a record with the provided status code and no body.
    ///
    pub fn status(status: u16) -> Self {
        Self::Record {
            status: Some(status),
            body: None,
        }
    }

    /// Serializes `value` as JSON and returns it as a text reply.
    ///
    /// A [`ResponseSpec`] is a status and a body with no headers, so the
    /// serialized value is indistinguishable from any other text reply once
    /// normalized. [`Server`](crate::Server) sends every non-empty body as
    /// `text/plain; charset=utf-8`. Clients that need `application/json`
    /// should be served by a transport that sets its own content type.
    ///
    pub fn json<T: Serialize>(value: &T) -> Result<Self, Error> {
        Ok(Self::Text(serde_json::to_string(value)?))
    }

    /// Returns a record with the body replaced. The status code of `self` is
    /// preserved if it has one.
    ///
    pub fn with_body(self, body: impl Into<String>) -> Self {
        let status = match self {
            Self::Record { status, .. } => status,
            Self::Text(_) | Self::NotFound => None,
        };

        Self::Record {
            status,
            body: Some(body.into()),
        }
    }

    /// Returns a record with the status code replaced. The body of `self` is
    /// preserved if it has one.
    ///
    pub fn with_status(self, status: u16) -> Self {
        let body = match self {
            Self::Text(body) => Some(body),
            Self::Record { body, .. } => body,
            Self::NotFound => None,
        };

        Self::Record {
            status: Some(status),
            body,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// Converts the reply into a [`ResponseSpec`].
    ///
    /// # Errors
    ///
    /// A record with a status code outside of `100..=999` is a contract
    /// violation.
    ///
    pub fn normalize(self) -> Result<ResponseSpec, Error> {
        match self {
            Self::NotFound => Ok(ResponseSpec::not_found()),
            Self::Text(body) => Ok(ResponseSpec::new(StatusCode::OK, body)),
            Self::Record { status, body } => {
                let status = match status {
                    None => StatusCode::OK,
                    Some(code) => StatusCode::from_u16(code).map_err(|_| {
                        Error::contract_violation(format!("invalid status code: {}", code))
                    })?,
                };

                Ok(ResponseSpec::new(status, body.unwrap_or_default()))
            }
        }
    }
}

impl From<&str> for Reply {
    fn from(body: &str) -> Self {
        Self::Text(body.to_owned())
    }
}

impl From<String> for Reply {
    fn from(body: String) -> Self {
        Self::Text(body)
    }
}

impl From<StatusCode> for Reply {
    fn from(status: StatusCode) -> Self {
        Self::status(status.as_u16())
    }
}

impl ResponseSpec {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "")
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn into_parts(self) -> (StatusCode, String) {
        (self.status, self.body)
    }
}

impl Default for ResponseSpec {
    fn default() -> Self {
        Self::new(StatusCode::OK, "")
    }
}

impl From<ResponseSpec> for http::Response<String> {
    fn from(spec: ResponseSpec) -> Self {
        let mut response = http::Response::new(spec.body);

        *response.status_mut() = spec.status;
        response
    }
}
