use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{FailureKind, ServiceError};

/// Uniform result of a controller operation.
///
/// Serializes as `{"status": "success", "message": ...}`,
/// `{"status": "success", "data": ...}` or
/// `{"status": "failure", "error": ...}`. The failure kind stays in-process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply<T = ()> {
    Message(String),
    Data(T),
    Failure { kind: FailureKind, error: String },
}

impl<T> Reply<T> {
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    pub fn failure(err: &ServiceError) -> Self {
        Self::Failure {
            kind: err.kind(),
            error: err.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failure { .. })
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Failure { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Data(data) => Some(data),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn into_data(self) -> Option<T> {
        match self {
            Self::Data(data) => Some(data),
            _ => None,
        }
    }
}

impl<T: Serialize> Serialize for Reply<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        match self {
            Self::Message(message) => {
                map.serialize_entry("status", "success")?;
                map.serialize_entry("message", message)?;
            }
            Self::Data(data) => {
                map.serialize_entry("status", "success")?;
                map.serialize_entry("data", data)?;
            }
            Self::Failure { error, .. } => {
                map.serialize_entry("status", "failure")?;
                map.serialize_entry("error", error)?;
            }
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn message_shape() {
        let reply: Reply = Reply::message("Vote created");
        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            json!({"status": "success", "message": "Vote created"})
        );
    }

    #[test]
    fn data_shape() {
        let reply = Reply::Data(vec![1, 2]);
        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            json!({"status": "success", "data": [1, 2]})
        );
    }

    #[test]
    fn failure_shape_hides_kind() {
        let reply: Reply = Reply::failure(&ServiceError::not_found("Vote 9 not found"));
        assert_eq!(reply.failure_kind(), Some(FailureKind::NotFound));
        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            json!({"status": "failure", "error": "Vote 9 not found"})
        );
    }
}
