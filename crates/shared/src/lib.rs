pub mod domain;
pub mod error;
pub mod protocol;

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{
        domain::{ColumnId, Priority},
        protocol::TaskRecord,
    };

    #[test]
    fn task_record_keeps_unmodelled_attributes() {
        let raw = json!({
            "id": "t-1",
            "status": "on_hold",
            "title": "Quarterly filing",
            "priority": "high",
            "client_name": "Acme",
            "tags": ["tax"]
        });

        let task: TaskRecord = serde_json::from_value(raw).expect("decode");
        assert_eq!(task.status, ColumnId::on_hold());
        assert_eq!(task.priority, Some(Priority::High));
        assert_eq!(task.extra.get("client_name"), Some(&json!("Acme")));

        let back = serde_json::to_value(&task).expect("encode");
        assert_eq!(back["tags"], json!(["tax"]));
    }

    #[test]
    fn unknown_status_still_decodes() {
        let task: TaskRecord =
            serde_json::from_value(json!({"id": "t-2", "status": "archived"})).expect("decode");
        assert_eq!(task.status.as_str(), "archived");
        assert!(task.title.is_empty());
    }

    #[test]
    fn priority_parses_case_insensitively() {
        assert_eq!("URGENT".parse::<Priority>(), Ok(Priority::Urgent));
        assert!("someday".parse::<Priority>().is_err());
    }
}
