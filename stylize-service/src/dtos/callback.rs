//! Task completion notifications posted by KIE.AI to `/api/kie-callback`.

use crate::models::TaskOutcome;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct KieCallback {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub data: Option<KieCallbackData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KieCallbackData {
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    /// JSON-encoded string, e.g. `{"resultUrls":["https://..."]}`.
    #[serde(default)]
    pub result_json: Option<String>,
    #[serde(default)]
    pub fail_msg: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResultJson {
    #[serde(default)]
    result_urls: Vec<String>,
}

impl KieCallback {
    pub fn task_id(&self) -> Option<&str> {
        self.data
            .as_ref()
            .and_then(|data| data.task_id.as_deref())
            .filter(|id| !id.is_empty())
    }

    /// The final outcome, or `None` while the task is still running.
    pub fn outcome(&self) -> Option<TaskOutcome> {
        let data = self.data.as_ref()?;
        let state = data.state.as_deref().unwrap_or_default();
        let code_ok = self.code.map_or(true, |code| code == 200);

        if state == "success" && code_ok {
            let parsed = data
                .result_json
                .as_deref()
                .map(serde_json::from_str::<ResultJson>);

            return Some(match parsed {
                Some(Ok(result)) if !result.result_urls.is_empty() => TaskOutcome::Succeeded {
                    result_urls: result.result_urls,
                },
                _ => TaskOutcome::Failed {
                    message: "Provider reported success without result URLs".to_string(),
                },
            });
        }

        if state == "fail" || !code_ok {
            let message = data
                .fail_msg
                .clone()
                .filter(|m| !m.is_empty())
                .or_else(|| self.msg.clone())
                .unwrap_or_else(|| "Generation failed".to_string());
            return Some(TaskOutcome::Failed { message });
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn callback(value: serde_json::Value) -> KieCallback {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn success_extracts_result_urls() {
        let cb = callback(json!({
            "code": 200,
            "msg": "Playground task completed successfully.",
            "data": {
                "taskId": "task-1",
                "state": "success",
                "resultJson": "{\"resultUrls\":[\"https://cdn/out.png\"]}"
            }
        }));

        assert_eq!(cb.task_id(), Some("task-1"));
        assert_eq!(
            cb.outcome(),
            Some(TaskOutcome::Succeeded {
                result_urls: vec!["https://cdn/out.png".to_string()]
            })
        );
    }

    #[test]
    fn fail_prefers_fail_msg() {
        let cb = callback(json!({
            "code": 501,
            "msg": "Playground task failed.",
            "data": { "taskId": "task-1", "state": "fail", "failMsg": "content policy" }
        }));

        assert_eq!(
            cb.outcome(),
            Some(TaskOutcome::Failed {
                message: "content policy".to_string()
            })
        );
    }

    #[test]
    fn running_task_has_no_outcome() {
        let cb = callback(json!({
            "code": 200,
            "data": { "taskId": "task-1", "state": "generating" }
        }));

        assert_eq!(cb.outcome(), None);
    }

    #[test]
    fn unreadable_result_is_a_failure() {
        let cb = callback(json!({
            "code": 200,
            "data": { "taskId": "task-1", "state": "success", "resultJson": "not json" }
        }));

        assert!(matches!(cb.outcome(), Some(TaskOutcome::Failed { .. })));
    }
}
