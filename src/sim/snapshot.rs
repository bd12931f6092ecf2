//! Per-step exported state
//!
//! Poses are in logical units. Queued score events ride along on exactly one
//! snapshot and are then gone.

use serde::{Deserialize, Serialize};

/// Position and orientation of a body
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
}

/// Why a point was scored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreReason {
    #[serde(rename = "TOUCHED_FLOOR")]
    TouchedFloor,
}

impl ScoreReason {
    pub fn description(&self) -> &'static str {
        match self {
            ScoreReason::TouchedFloor => "The ball touched the floor.",
        }
    }
}

/// A scored point, with the score as it stood right after it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEvent {
    pub score: [u32; 2],
    pub reason: ScoreReason,
}

/// What the transport layer sends to clients each step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub paddles: [Pose; 2],
    pub ball: Pose,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<Vec<ScoreEvent>>,
}

impl Snapshot {
    /// Events carried by this snapshot (empty when none)
    pub fn events(&self) -> &[ScoreEvent] {
        self.event.as_deref().unwrap_or(&[])
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Build a snapshot, draining `queue` into it
pub fn encode(paddles: [Pose; 2], ball: Pose, queue: &mut Vec<ScoreEvent>) -> Snapshot {
    let event = if queue.is_empty() {
        None
    } else {
        Some(std::mem::take(queue))
    };
    Snapshot {
        paddles,
        ball,
        event,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pose(x: f32, y: f32) -> Pose {
        Pose { x, y, angle: 0.0 }
    }

    #[test]
    fn test_encode_without_events_omits_field() {
        let mut queue = Vec::new();
        let snap = encode([pose(1.0, 2.0), pose(3.0, 4.0)], pose(5.0, 6.0), &mut queue);
        assert!(snap.event.is_none());
        assert!(snap.events().is_empty());

        let json = snap.to_json().unwrap();
        assert!(!json.contains("event"));
    }

    #[test]
    fn test_encode_drains_queue_once() {
        let mut queue = vec![
            ScoreEvent {
                score: [1, 0],
                reason: ScoreReason::TouchedFloor,
            },
            ScoreEvent {
                score: [1, 1],
                reason: ScoreReason::TouchedFloor,
            },
        ];
        let first = encode([Pose::default(); 2], Pose::default(), &mut queue);
        assert_eq!(first.events().len(), 2);
        assert_eq!(first.events()[1].score, [1, 1]);
        assert!(queue.is_empty());

        let second = encode([Pose::default(); 2], Pose::default(), &mut queue);
        assert!(second.event.is_none());
    }

    #[test]
    fn test_wire_format() {
        let mut queue = vec![ScoreEvent {
            score: [0, 1],
            reason: ScoreReason::TouchedFloor,
        }];
        let snap = encode([pose(1.0, 2.0), pose(3.0, 4.0)], pose(5.0, 6.0), &mut queue);
        let value: serde_json::Value = serde_json::from_str(&snap.to_json().unwrap()).unwrap();
        assert_eq!(value["paddles"][1]["x"], 3.0);
        assert_eq!(value["ball"]["y"], 6.0);
        assert_eq!(value["event"][0]["score"], serde_json::json!([0, 1]));
        assert_eq!(value["event"][0]["reason"], "TOUCHED_FLOOR");
    }
}
