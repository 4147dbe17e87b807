use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::logging::Severity;

/// A single message bound for the remote backend.
#[derive(Debug, Clone)]
pub struct Event {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub level: Severity,
    pub logger: String,
    pub message: String,
}

impl Event {
    pub fn new(level: Severity, logger: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            level,
            logger: logger.into(),
            message: message.into(),
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "event_id": self.id.as_simple().to_string(),
            "timestamp": self.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
            "level": self.level.as_str(),
            "logger": self.logger,
            "platform": "other",
            "message": { "formatted": self.message },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_carries_backend_level() {
        for severity in Severity::ALL {
            let event = Event::new(severity, "svc", "disk full");
            let payload = event.to_json();

            assert_eq!(payload["level"], severity.as_str());
            assert_eq!(payload["logger"], "svc");
            assert_eq!(payload["message"]["formatted"], "disk full");
            assert_eq!(payload["event_id"].as_str().unwrap().len(), 32);
            assert!(payload["timestamp"].as_str().unwrap().ends_with('Z'));
        }
    }
}
