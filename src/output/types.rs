use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

pub const SCHEMA_VERSION: &str = "herb.v1";

#[derive(Debug, Clone, Serialize, Default)]
pub struct Meta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u128>,
}

/// One stdout line per command under `--json`: either what would be sent
/// (`plan`, `apply: false`) or what happened (`result`, `apply: true`).
#[derive(Debug, Clone, Serialize)]
pub struct Envelope {
    pub schema_version: &'static str,
    pub time: DateTime<Utc>,
    pub request_id: Uuid,
    pub op: &'static str,
    pub apply: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl Envelope {
    fn new(op: &'static str, apply: bool, payload: Value, meta: Option<Meta>) -> Self {
        let (plan, result) = if apply { (None, Some(payload)) } else { (Some(payload), None) };
        Envelope {
            schema_version: SCHEMA_VERSION,
            time: Utc::now(),
            request_id: Uuid::new_v4(),
            op,
            apply,
            plan,
            result,
            meta,
        }
    }

    pub fn plan<T: Serialize>(op: &'static str, plan: &T, meta: Option<Meta>) -> Result<Self, serde_json::Error> {
        Ok(Self::new(op, false, serde_json::to_value(plan)?, meta))
    }

    pub fn result<T: Serialize>(op: &'static str, result: &T, meta: Option<Meta>) -> Result<Self, serde_json::Error> {
        Ok(Self::new(op, true, serde_json::to_value(result)?, meta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plan_envelope_carries_schema_and_op() {
        let env = Envelope::plan("inventory", &json!({"updates": 2}), None).unwrap();
        let v = serde_json::to_value(&env).unwrap();
        assert_eq!(v["schema_version"], "herb.v1");
        assert_eq!(v["op"], "inventory");
        assert_eq!(v["apply"], false);
        assert_eq!(v["plan"]["updates"], 2);
        assert!(v.get("result").is_none());
        assert!(v.get("meta").is_none());
    }

    #[test]
    fn result_envelope_marks_apply() {
        let meta = Meta { duration_ms: Some(12) };
        let env = Envelope::result("log", &json!({"pages": 3}), Some(meta)).unwrap();
        let v = serde_json::to_value(&env).unwrap();
        assert_eq!(v["apply"], true);
        assert_eq!(v["result"]["pages"], 3);
        assert_eq!(v["meta"]["duration_ms"], 12);
        assert!(v.get("plan").is_none());
    }
}
