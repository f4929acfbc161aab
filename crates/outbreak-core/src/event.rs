//! Events pushed to live endpoints.

use serde::{Deserialize, Serialize};

use crate::model::{Report, ReportId};

/// A message delivered over a recipient's live channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FeedEvent {
    /// A report was just persisted. Sent to operators only.
    NewReport { report: Report },
    /// A geofenced alert from an operator broadcast.
    Alert {
        message: String,
        #[serde(rename = "reportId")]
        report_id: ReportId,
    },
}

impl FeedEvent {
    /// Event name used on named transports such as SSE.
    pub fn event_name(&self) -> &'static str {
        match self {
            FeedEvent::NewReport { .. } => "new-report",
            FeedEvent::Alert { .. } => "new-alert",
        }
    }

    /// Report this event refers to.
    pub fn report_id(&self) -> ReportId {
        match self {
            FeedEvent::NewReport { report } => report.id,
            FeedEvent::Alert { report_id, .. } => *report_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_wire_format() {
        let event = FeedEvent::Alert {
            message: "Evacuate".to_string(),
            report_id: ReportId(7),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "Alert", "message": "Evacuate", "reportId": 7})
        );
        assert_eq!(event.event_name(), "new-alert");
        assert_eq!(event.report_id(), ReportId(7));
    }
}
