use crate::datetime::{format_timestamp, parse_timestamp};
use crate::error::AppError;
use crate::model::{Description, Name, Priority, Tag, Task, ToDoList};
use crate::storage::sample_data;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const SCHEMA_VERSION: u32 = 1;
pub const STORE_ENV_VAR: &str = "ONETWODO_STORE_PATH";
const STORE_FILE_NAME: &str = "tasks.json";

#[derive(Debug, Serialize, Deserialize)]
struct StoredList {
    schema_version: u32,
    tasks: Vec<StoredTask>,
}

/// Serialized form of a [`Task`]. Everything is kept as text and goes back
/// through the validators on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct StoredTask {
    name: String,
    #[serde(default)]
    start: Option<String>,
    #[serde(default)]
    end: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    priority: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    done: bool,
}

impl StoredTask {
    fn from_task(task: &Task) -> Result<Self, AppError> {
        Ok(Self {
            name: task.name().to_string(),
            start: task.start().map(format_timestamp).transpose()?,
            end: task.end().map(format_timestamp).transpose()?,
            description: task.description().to_string(),
            priority: task.priority().map(|priority| priority.label().to_string()),
            tags: task.tags().iter().map(|tag| tag.as_str().to_string()).collect(),
            done: task.is_done(),
        })
    }

    fn into_task(self) -> Result<Task, AppError> {
        let context = |err: AppError| {
            AppError::invalid_data(format!("stored task '{}': {}", self.name, err.message()))
        };
        let name = Name::parse(&self.name).map_err(context)?;
        let start = self.start.as_deref().map(parse_timestamp).transpose().map_err(context)?;
        let end = self.end.as_deref().map(parse_timestamp).transpose().map_err(context)?;
        let priority =
            Priority::parse(self.priority.as_deref().unwrap_or_default()).map_err(context)?;
        let tags = self
            .tags
            .iter()
            .map(|tag| Tag::parse(tag))
            .collect::<Result<_, _>>()
            .map_err(context)?;
        let mut task = Task::new(
            name,
            start,
            end,
            Description::new(&self.description),
            priority,
            tags,
        )
        .map_err(context)?;
        task.set_done(self.done);
        Ok(task)
    }
}

/// Default data file: `$HOME/.config/onetwodo/tasks.json`, or
/// `%APPDATA%\onetwodo\tasks.json` on Windows. `ONETWODO_STORE_PATH` wins.
pub fn default_store_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(STORE_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    Ok(crate::config::app_dir()?.join(STORE_FILE_NAME))
}

/// `Ok(None)` when the file does not exist.
pub fn load(path: &Path) -> Result<Option<ToDoList>, AppError> {
    if !path.exists() {
        return Ok(None);
    }

    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let stored: StoredList = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;

    if stored.schema_version != SCHEMA_VERSION {
        return Err(AppError::invalid_data(format!(
            "{}: unsupported schema_version {}",
            path.display(),
            stored.schema_version
        )));
    }

    let tasks = stored
        .tasks
        .into_iter()
        .map(StoredTask::into_task)
        .collect::<Result<Vec<_>, _>>()?;
    let list = ToDoList::from_tasks(tasks).map_err(|err| {
        AppError::invalid_data(format!("{}: {}", path.display(), err.message()))
    })?;
    info!(
        "event=store_load status=ok path={} tasks={}",
        path.display(),
        list.len()
    );
    Ok(Some(list))
}

/// Loads the list, falling back to the sample tasks when there is no file
/// yet. A file that exists but cannot be read is an error, never replaced.
pub fn load_or_sample(path: &Path) -> Result<ToDoList, AppError> {
    match load(path)? {
        Some(list) => Ok(list),
        None => {
            warn!(
                "event=store_load status=missing path={} fallback=sample_data",
                path.display()
            );
            sample_data::sample_list()
        }
    }
}

pub fn save(path: &Path, list: &ToDoList) -> Result<(), AppError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|err| AppError::io(err.to_string()))?;
    }

    let stored = StoredList {
        schema_version: SCHEMA_VERSION,
        tasks: list
            .tasks()
            .iter()
            .map(StoredTask::from_task)
            .collect::<Result<_, _>>()?,
    };
    let content = serde_json::to_string_pretty(&stored)
        .map_err(|err| AppError::invalid_data(err.to_string()))?;
    std::fs::write(path, content).map_err(|err| AppError::io(err.to_string()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, permissions).map_err(|err| AppError::io(err.to_string()))?;
    }

    info!(
        "event=store_save status=ok path={} tasks={}",
        path.display(),
        list.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{SCHEMA_VERSION, load, load_or_sample, save};
    use crate::model::{Description, Name, Priority, Tag, Task, ToDoList};
    use crate::storage::sample_data;
    use proptest::prelude::*;
    use std::collections::BTreeSet;
    use std::fs;
    use time::macros::datetime;
    use time::{Duration, PrimitiveDateTime};

    fn full_task() -> Task {
        Task::new(
            Name::parse("Team offsite").unwrap(),
            Some(datetime!(2026-11-02 09:00)),
            Some(datetime!(2026-11-03 17:30)),
            Description::new("bring laptop"),
            Some(Priority::Medium),
            [Tag::parse("work").unwrap()].into_iter().collect(),
        )
        .unwrap()
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tasks.json");
        let mut done = Task::new(
            Name::parse("Renew passport").unwrap(),
            None,
            None,
            Description::default(),
            None,
            BTreeSet::new(),
        )
        .unwrap();
        done.set_done(true);
        let list = ToDoList::from_tasks(vec![full_task(), done]).unwrap();

        save(&path, &list).unwrap();
        let loaded = load(&path).unwrap();

        assert_eq!(loaded, Some(list));
    }

    #[test]
    fn missing_file_is_none_and_falls_back_to_sample_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");

        assert_eq!(load(&path).unwrap(), None);
        assert_eq!(
            load_or_sample(&path).unwrap(),
            sample_data::sample_list().unwrap()
        );
        assert!(!path.exists());
    }

    #[test]
    fn malformed_json_is_invalid_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let err = load_or_sample(&path).unwrap_err();
        assert_eq!(err.code(), "invalid_data");
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
    }

    #[test]
    fn invalid_stored_field_is_invalid_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad-priority.json");
        let content = serde_json::json!({
            "schema_version": SCHEMA_VERSION,
            "tasks": [{ "name": "demo", "priority": "urgent" }]
        });
        fs::write(&path, content.to_string()).unwrap();

        let err = load(&path).unwrap_err();
        assert_eq!(err.code(), "invalid_data");
        assert!(err.message().contains("stored task 'demo'"));
    }

    #[test]
    fn duplicate_stored_tasks_are_invalid_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dupes.json");
        let content = serde_json::json!({
            "schema_version": SCHEMA_VERSION,
            "tasks": [{ "name": "demo" }, { "name": "demo", "done": true }]
        });
        fs::write(&path, content.to_string()).unwrap();

        assert_eq!(load(&path).unwrap_err().code(), "invalid_data");
    }

    #[test]
    fn optional_fields_default_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("minimal.json");
        let content = serde_json::json!({
            "schema_version": SCHEMA_VERSION,
            "tasks": [{ "name": "demo", "end": "2026-10-20 18:00" }]
        });
        fs::write(&path, content.to_string()).unwrap();

        let list = load(&path).unwrap().unwrap();
        let task = &list.tasks()[0];
        assert_eq!(task.end(), Some(datetime!(2026-10-20 18:00)));
        assert_eq!(task.priority(), None);
        assert!(task.tags().is_empty());
        assert!(!task.is_done());
    }

    #[test]
    fn schema_version_must_match() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("future.json");
        let content = serde_json::json!({ "schema_version": SCHEMA_VERSION + 1, "tasks": [] });
        fs::write(&path, content.to_string()).unwrap();

        assert_eq!(load(&path).unwrap_err().code(), "invalid_data");
    }

    fn arb_task() -> impl Strategy<Value = Task> {
        (
            "[A-Za-z][A-Za-z0-9 ]{0,15}",
            prop::option::of((0i64..2000, 0i64..600)),
            "[a-z ]{0,20}",
            prop::option::of(prop_oneof![
                Just(Priority::High),
                Just(Priority::Medium),
                Just(Priority::Low)
            ]),
            prop::collection::btree_set("[a-z0-9]{1,8}", 0..3),
            any::<bool>(),
        )
            .prop_map(|(name, dates, description, priority, tags, done)| {
                let base: PrimitiveDateTime = datetime!(2026-01-01 00:00);
                let (start, end) = match dates {
                    Some((offset, length)) => {
                        let start = base + Duration::hours(offset);
                        let end = start + Duration::minutes(length);
                        if offset % 2 == 0 { (Some(start), Some(end)) } else { (None, Some(end)) }
                    }
                    None => (None, None),
                };
                let tags: BTreeSet<Tag> = tags.iter().map(|tag| Tag::parse(tag).unwrap()).collect();
                let mut task = Task::new(
                    Name::parse(&name).unwrap(),
                    start,
                    end,
                    Description::new(&description),
                    priority,
                    tags,
                )
                .unwrap();
                task.set_done(done);
                task
            })
    }

    proptest! {
        /// Saving then loading gives back an equal list.
        #[test]
        fn store_round_trip(tasks in prop::collection::vec(arb_task(), 0..8)) {
            let mut list = ToDoList::new();
            for task in tasks {
                let _ = list.add(task);
            }
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("tasks.json");

            save(&path, &list).unwrap();
            let loaded = load(&path).unwrap().unwrap();

            prop_assert_eq!(loaded.len(), list.len());
            for (left, right) in loaded.tasks().iter().zip(list.tasks()) {
                prop_assert!(left.is_same_task_as(right));
            }
            prop_assert_eq!(loaded, list);
        }
    }
}
