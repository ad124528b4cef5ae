// Copyright 2026 Dmitry Tantsur <dtantsur@protonmail.com>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error and result implementations.

use std::fmt;

use reqwest::StatusCode;

/// Kind of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// No endpoint in the service catalog matches the query.
    EndpointNotFound,

    /// The requested endpoint availability (interface) is not recognized.
    InvalidAvailability,

    /// A microversion string is not in the `X.Y` format.
    MicroversionParse,

    /// The requested microversion is outside of the advertised range.
    MicroversionUnsupported,

    /// The service does not advertise a microversion range.
    MicroversionsNotAdvertised,

    /// An unversioned endpoint lists more than one API version.
    MultiVersionUnversionedEndpoint,

    /// A page of results cannot be decoded.
    PageDecode,

    /// The operation was cancelled by the caller.
    Cancelled,

    /// Authentication failure.
    ///
    /// Maps to HTTP 401.
    AuthenticationFailed,

    /// Access denied.
    ///
    /// Maps to HTTP 403.
    AccessDenied,

    /// Requested resource was not found.
    ///
    /// Roughly maps to HTTP 404 and 410.
    ResourceNotFound,

    /// Request returned a conflict.
    ///
    /// Maps to HTTP 409.
    Conflict,

    /// Invalid value passed to one of paremeters.
    ///
    /// May be result of HTTP 400.
    InvalidInput,

    /// Invalid or unexpected response from the server.
    InvalidResponse,

    /// Invalid configuration.
    InvalidConfig,

    /// None of the requested API versions is available.
    IncompatibleApiVersion,

    /// Operation has reached the specified time out.
    ///
    /// Maps to HTTP 408 and 504 or a client-side timeout.
    OperationTimedOut,

    /// Internal server error.
    ///
    /// Maps to HTTP 5xx codes, except for 501 and 504.
    InternalServerError,

    /// Generic protocol error (transport or unexpected HTTP status).
    ProtocolError,
}

/// Error from an OpenStack call.
#[derive(Debug, Clone)]
pub struct Error {
    kind: ErrorKind,
    message: Option<String>,
    status: Option<StatusCode>,
}

impl ErrorKind {
    /// Short description of the error kind.
    pub fn description(self) -> &'static str {
        match self {
            ErrorKind::EndpointNotFound => "Requested endpoint was not found",
            ErrorKind::InvalidAvailability => "Unexpected availability in endpoint query",
            ErrorKind::MicroversionParse => "Invalid microversion format",
            ErrorKind::MicroversionUnsupported => "Microversion not supported",
            ErrorKind::MicroversionsNotAdvertised => "Microversions not supported by endpoint",
            ErrorKind::MultiVersionUnversionedEndpoint => {
                "Unversioned endpoint with multiple alternatives not supported"
            }
            ErrorKind::PageDecode => "Cannot decode a page of results",
            ErrorKind::Cancelled => "Operation was cancelled",
            ErrorKind::AuthenticationFailed => "Failed to authenticate",
            ErrorKind::AccessDenied => "Access to the resource is denied",
            ErrorKind::ResourceNotFound => "Requested resource was not found",
            ErrorKind::Conflict => "Requested operation conflicts with an existing resource",
            ErrorKind::InvalidInput => "Input value(s) are invalid or missing",
            ErrorKind::InvalidResponse => "Received invalid response",
            ErrorKind::InvalidConfig => "Invalid configuration",
            ErrorKind::IncompatibleApiVersion => "Incompatible or unsupported API version",
            ErrorKind::OperationTimedOut => "Time out reached while waiting for the operation",
            ErrorKind::InternalServerError => "Internal server error or bad gateway",
            ErrorKind::ProtocolError => "Error when accessing the server",
        }
    }
}

impl Error {
    /// Create a new error of the provided kind.
    #[inline]
    pub fn new<S: Into<String>>(kind: ErrorKind, message: S) -> Error {
        Error {
            kind,
            message: Some(message.into()),
            status: None,
        }
    }

    /// Create an error without a message.
    #[inline]
    pub fn from_kind(kind: ErrorKind) -> Error {
        Error {
            kind,
            message: None,
            status: None,
        }
    }

    /// Add an HTTP status code to the error.
    #[inline]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    /// Prefix the message with the name of a resource or operation.
    ///
    /// The error kind and status are not changed.
    pub fn with_context<S: AsRef<str>>(mut self, context: S) -> Self {
        let message = match self.message.take() {
            Some(msg) => format!("{}: {}", context.as_ref(), msg),
            None => format!("{}: {}", context.as_ref(), self.kind.description()),
        };
        self.message = Some(message);
        self
    }

    /// Error kind.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Error message (if any).
    #[inline]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// HTTP status code (if any).
    #[inline]
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    #[inline]
    pub(crate) fn new_endpoint_not_found<D: fmt::Display>(service_type: D) -> Error {
        Error::new(
            ErrorKind::EndpointNotFound,
            format!("Endpoint for service {} was not found", service_type),
        )
    }

    #[inline]
    pub(crate) fn new_page_decode<D: fmt::Display>(url: &url::Url, error: D) -> Error {
        Error::new(
            ErrorKind::PageDecode,
            format!("Cannot decode page from {}: {}", url, error),
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.description())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(ref msg) = self.message {
            write!(f, "{}: {}", self.kind, msg)
        } else {
            fmt::Display::fmt(&self.kind, f)
        }
    }
}

impl std::error::Error for Error {}

impl From<ErrorKind> for Error {
    fn from(value: ErrorKind) -> Error {
        Error::from_kind(value)
    }
}

impl From<StatusCode> for ErrorKind {
    fn from(value: StatusCode) -> ErrorKind {
        match value {
            StatusCode::UNAUTHORIZED => ErrorKind::AuthenticationFailed,
            StatusCode::FORBIDDEN => ErrorKind::AccessDenied,
            StatusCode::NOT_FOUND | StatusCode::GONE => ErrorKind::ResourceNotFound,
            StatusCode::CONFLICT => ErrorKind::Conflict,
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
                ErrorKind::OperationTimedOut
            }
            StatusCode::NOT_IMPLEMENTED => ErrorKind::IncompatibleApiVersion,
            c if c.is_client_error() => ErrorKind::InvalidInput,
            c if c.is_server_error() => ErrorKind::InternalServerError,
            _ => ErrorKind::ProtocolError,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Error {
        let msg = value.to_string();
        let kind = if value.is_timeout() {
            ErrorKind::OperationTimedOut
        } else if value.is_decode() {
            ErrorKind::InvalidResponse
        } else if value.is_builder() {
            ErrorKind::InvalidInput
        } else if let Some(status) = value.status() {
            status.into()
        } else {
            ErrorKind::ProtocolError
        };

        let error = Error::new(kind, msg);
        if let Some(status) = value.status() {
            error.with_status(status)
        } else {
            error
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(value: url::ParseError) -> Error {
        Error::new(ErrorKind::InvalidInput, value.to_string())
    }
}

#[cfg(test)]
pub mod test {
    use reqwest::StatusCode;

    use super::{Error, ErrorKind};

    #[test]
    fn test_error_display() {
        let error = Error::new(ErrorKind::InvalidAvailability, "wat");
        assert_eq!(
            error.to_string(),
            "Unexpected availability in endpoint query: wat"
        );
        let error = Error::from_kind(ErrorKind::Cancelled);
        assert_eq!(error.to_string(), "Operation was cancelled");
    }

    #[test]
    fn test_error_with_context() {
        let error = Error::new(ErrorKind::PageDecode, "expected an array")
            .with_status(StatusCode::OK)
            .with_context("servers");
        assert_eq!(error.kind(), ErrorKind::PageDecode);
        assert_eq!(error.status(), Some(StatusCode::OK));
        assert_eq!(error.message(), Some("servers: expected an array"));

        let error = Error::from_kind(ErrorKind::EndpointNotFound).with_context("volumes");
        assert_eq!(
            error.message(),
            Some("volumes: Requested endpoint was not found")
        );
    }

    #[test]
    fn test_error_kind_from_status() {
        assert_eq!(
            ErrorKind::from(StatusCode::UNAUTHORIZED),
            ErrorKind::AuthenticationFailed
        );
        assert_eq!(
            ErrorKind::from(StatusCode::NOT_FOUND),
            ErrorKind::ResourceNotFound
        );
        assert_eq!(
            ErrorKind::from(StatusCode::BAD_REQUEST),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            ErrorKind::from(StatusCode::SERVICE_UNAVAILABLE),
            ErrorKind::InternalServerError
        );
        assert_eq!(
            ErrorKind::from(StatusCode::GATEWAY_TIMEOUT),
            ErrorKind::OperationTimedOut
        );
    }
}
