use onetwodo_core::datetime::format_timestamp;
use onetwodo_core::error::AppError;
use onetwodo_core::model::{DisplayedTask, Task, TaskFilter};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use time::PrimitiveDateTime;

const EMPTY_CELL: &str = "-";

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "#")]
    index: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Start")]
    start: String,
    #[tabled(rename = "End")]
    end: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Tags")]
    tags: String,
    #[tabled(rename = "Done")]
    done: String,
}

impl TaskRow {
    fn from_displayed(shown: &DisplayedTask<'_>) -> Result<Self, AppError> {
        let task = shown.task;
        Ok(Self {
            index: shown.index.to_string(),
            name: task.name().to_string(),
            start: timestamp_cell(task.start())?,
            end: timestamp_cell(task.end())?,
            priority: task
                .priority()
                .map(|priority| priority.label().to_string())
                .unwrap_or_else(|| EMPTY_CELL.to_string()),
            description: if task.description().is_empty() {
                EMPTY_CELL.to_string()
            } else {
                task.description().to_string()
            },
            tags: task.tags().iter().map(ToString::to_string).collect(),
            done: if task.is_done() { "yes" } else { "" }.to_string(),
        })
    }
}

fn timestamp_cell(value: Option<PrimitiveDateTime>) -> Result<String, AppError> {
    match value {
        Some(value) => format_timestamp(value),
        None => Ok(EMPTY_CELL.to_string()),
    }
}

fn filter_caption(filter: &TaskFilter) -> String {
    if filter.keywords.is_empty() {
        format!("Showing {} tasks", filter.status.label())
    } else {
        format!(
            "Showing {} tasks matching: {}",
            filter.status.label(),
            filter.keywords.join(" ")
        )
    }
}

pub fn render_table(shown: &[DisplayedTask<'_>], filter: &TaskFilter) -> Result<String, AppError> {
    let caption = filter_caption(filter);
    if shown.is_empty() {
        return Ok(format!("{caption}\nNo tasks to show."));
    }

    let rows = shown
        .iter()
        .map(TaskRow::from_displayed)
        .collect::<Result<Vec<_>, _>>()?;
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    Ok(format!("{caption}\n{table}"))
}

fn task_json(index: String, task: &Task) -> Result<serde_json::Value, AppError> {
    Ok(serde_json::json!({
        "index": index,
        "type": task.task_type().label(),
        "name": task.name().as_str(),
        "start": task.start().map(format_timestamp).transpose()?,
        "end": task.end().map(format_timestamp).transpose()?,
        "priority": task.priority().map(|priority| priority.label()),
        "description": task.description().as_str(),
        "tags": task.tags().iter().map(|tag| tag.as_str()).collect::<Vec<_>>(),
        "done": task.is_done(),
    }))
}

pub fn render_json(
    feedback: Option<&str>,
    shown: &[DisplayedTask<'_>],
    filter: &TaskFilter,
) -> Result<String, AppError> {
    let tasks = shown
        .iter()
        .map(|entry| task_json(entry.index.to_string(), entry.task))
        .collect::<Result<Vec<_>, _>>()?;
    let payload = serde_json::json!({
        "feedback": feedback,
        "filter": {
            "status": filter.status.label(),
            "keywords": filter.keywords,
        },
        "tasks": tasks,
    });
    Ok(payload.to_string())
}

pub fn render_error_json(err: &AppError) -> String {
    serde_json::json!({
        "error": {
            "code": err.code(),
            "message": err.message(),
        }
    })
    .to_string()
}
