// ABOUTME: Task commands
// ABOUTME: Creates, reads, updates, completes and deletes tasks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::Context;
use crate::helpers::input::JsonInput;
use clap::Subcommand;
use podio_cli::client::ApiRequest;
use podio_cli::errors::{AppError, AppResult};
use serde_json::{json, Map, Value};

#[non_exhaustive]
#[derive(Debug, Subcommand)]
pub enum TaskCommand {
    /// Show a task
    Get {
        /// Task id
        task_id: u64,
    },
    /// Create a task from flags or a JSON body
    Create {
        /// Task text
        #[arg(long)]
        text: Option<String>,

        /// Type of the object the task is attached to, e.g. `item`
        #[arg(long, requires = "ref_id")]
        ref_type: Option<String>,

        /// Id of the object the task is attached to
        #[arg(long, requires = "ref_type")]
        ref_id: Option<u64>,

        /// Due date, `YYYY-MM-DD`
        #[arg(long)]
        due_date: Option<String>,

        /// Only visible to the creator and the responsible user
        #[arg(long)]
        private: bool,

        #[command(flatten)]
        input: JsonInput,
    },
    /// Mark a task as completed
    Complete {
        /// Task id
        task_id: u64,
    },
    /// Delete a task
    Delete {
        /// Task id
        task_id: u64,
    },
    /// Update a task from flags or a JSON body
    Update {
        /// Task id
        task_id: u64,

        /// New task text
        #[arg(long)]
        text: Option<String>,

        /// New due date, `YYYY-MM-DD`
        #[arg(long)]
        due_date: Option<String>,

        #[command(flatten)]
        input: JsonInput,
    },
}

pub async fn run(ctx: &Context, action: TaskCommand) -> AppResult<()> {
    match action {
        TaskCommand::Get { task_id } => {
            ctx.execute(ApiRequest::get(format!("/task/{task_id}")))
                .await
        }
        TaskCommand::Create {
            text,
            ref_type,
            ref_id,
            due_date,
            private,
            input,
        } => {
            let mut fields = Map::new();
            if let Some(text) = text {
                fields.insert("text".into(), json!(text));
                fields.insert("private".into(), json!(private));
            }
            insert_opt(&mut fields, "ref_type", ref_type.map(Value::from));
            insert_opt(&mut fields, "ref_id", ref_id.map(Value::from));
            insert_opt(&mut fields, "due_date", due_date.map(Value::from));

            let body = input.merge(fields)?;
            if body.get("text").is_none() {
                return Err(AppError::validation(
                    "Either --text or a JSON body with 'text' is required",
                ));
            }
            ctx.execute_reporting(create_request(body), "Task created").await
        }
        TaskCommand::Complete { task_id } => {
            ctx.execute_reporting(
                ApiRequest::post(format!("/task/{task_id}/complete")),
                &format!("Task {task_id} completed"),
            )
            .await
        }
        TaskCommand::Delete { task_id } => {
            ctx.acknowledge(
                ApiRequest::delete(format!("/task/{task_id}")),
                &format!("Task {task_id} deleted"),
                json!({"task_id": task_id, "deleted": true}),
            )
            .await
        }
        TaskCommand::Update {
            task_id,
            text,
            due_date,
            input,
        } => {
            let mut fields = Map::new();
            insert_opt(&mut fields, "text", text.map(Value::from));
            insert_opt(&mut fields, "due_date", due_date.map(Value::from));
            let body = input.merge(fields)?;
            if body.as_object().is_some_and(Map::is_empty) {
                return Err(AppError::validation(
                    "Nothing to update: pass --text, --due-date or a JSON body",
                ));
            }
            ctx.execute_reporting(
                ApiRequest::put(format!("/task/{task_id}")).json(body),
                &format!("Task {task_id} updated"),
            )
            .await
        }
    }
}

fn insert_opt(fields: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    if let Some(value) = value {
        fields.insert(key.to_owned(), value);
    }
}

/// Tasks with a reference are created on the referenced object
fn create_request(mut body: Value) -> ApiRequest {
    let reference = body.as_object_mut().and_then(|map| {
        let ref_type = map.get("ref_type")?.as_str()?.to_owned();
        let ref_id = map.get("ref_id")?.as_u64()?;
        map.remove("ref_type");
        map.remove("ref_id");
        Some((ref_type, ref_id))
    });
    let path = reference.map_or_else(
        || "/task/".to_owned(),
        |(ref_type, ref_id)| format!("/task/{ref_type}/{ref_id}/"),
    );
    ApiRequest::post(path).json(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_on_reference() {
        let request =
            create_request(json!({"text": "Follow up", "ref_type": "item", "ref_id": 12}));
        assert_eq!(request.path, "/task/item/12/");
        assert_eq!(request.body, Some(json!({"text": "Follow up"})));
    }

    #[test]
    fn test_create_without_reference() {
        let request = create_request(json!({"text": "Standalone"}));
        assert_eq!(request.path, "/task/");
    }
}
