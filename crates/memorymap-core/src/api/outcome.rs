use serde::{Deserialize, Serialize};

use crate::error::{MemoryMapError, Result};

/// Error text a cancelled outcome reports and serializes with.
pub const CANCELLED_MESSAGE: &str = "request cancelled";

/// Normalized result of every API call.
///
/// Serializes as `{"success":true,"data":...}` or
/// `{"success":false,"error":"..."}`. The error string is never empty.
/// `Cancelled` goes over the wire as a failure; it is only told apart
/// in-process.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiOutcome<T> {
    Success { data: T },
    Failure { error: String },
    /// The request's cancellation token fired before a response arrived.
    Cancelled,
}

impl<T> ApiOutcome<T> {
    pub fn success(data: T) -> Self {
        Self::Success { data }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        let error = error.into();
        let error = if error.trim().is_empty() {
            "Unknown error".to_string()
        } else {
            error
        };
        Self::Failure { error }
    }

    pub fn cancelled() -> Self {
        Self::Cancelled
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// True for outcomes produced by a fired cancellation token. Callers
    /// must not apply these to view state.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success { data } => Some(data),
            Self::Failure { .. } | Self::Cancelled => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error } => Some(error),
            Self::Cancelled => Some(CANCELLED_MESSAGE),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiOutcome<U> {
        match self {
            Self::Success { data } => ApiOutcome::Success { data: f(data) },
            Self::Failure { error } => ApiOutcome::Failure { error },
            Self::Cancelled => ApiOutcome::Cancelled,
        }
    }

    pub fn into_result(self) -> std::result::Result<T, String> {
        match self {
            Self::Success { data } => Ok(data),
            Self::Failure { error } => Err(error),
            Self::Cancelled => Err(CANCELLED_MESSAGE.to_string()),
        }
    }
}

impl<T> From<MemoryMapError> for ApiOutcome<T> {
    fn from(e: MemoryMapError) -> Self {
        match e {
            MemoryMapError::Cancelled => Self::cancelled(),
            MemoryMapError::InvalidInput(msg) => Self::failure(msg),
            MemoryMapError::Api { message, .. } => Self::failure(message),
            other => Self::failure(other.to_string()),
        }
    }
}

impl<T> From<Result<T>> for ApiOutcome<T> {
    fn from(r: Result<T>) -> Self {
        match r {
            Ok(data) => Self::success(data),
            Err(e) => e.into(),
        }
    }
}

#[derive(Deserialize)]
struct Wire<T> {
    success: bool,
    data: Option<T>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Serialize)]
struct WireRef<'a, T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

impl<T: Serialize> Serialize for ApiOutcome<T> {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        let wire = match self {
            Self::Success { data } => WireRef {
                success: true,
                data: Some(data),
                error: None,
            },
            Self::Failure { .. } | Self::Cancelled => WireRef {
                success: false,
                data: None,
                error: self.error(),
            },
        };
        wire.serialize(s)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for ApiOutcome<T> {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let wire = Wire::<T>::deserialize(d)?;
        match (wire.success, wire.data) {
            (true, Some(data)) => Ok(Self::Success { data }),
            (true, None) => Err(serde::de::Error::missing_field("data")),
            (false, _) => Ok(Self::failure(wire.error.unwrap_or_default())),
        }
    }
}
