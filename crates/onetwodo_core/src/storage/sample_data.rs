use crate::error::AppError;
use crate::model::{Description, Name, Priority, Tag, Task, ToDoList};
use std::collections::BTreeSet;
use time::PrimitiveDateTime;
use time::macros::datetime;

struct Sample {
    name: &'static str,
    start: Option<PrimitiveDateTime>,
    end: Option<PrimitiveDateTime>,
    description: &'static str,
    priority: Option<Priority>,
    tags: &'static [&'static str],
}

const SAMPLES: [Sample; 6] = [
    Sample {
        name: "Project kickoff meeting",
        start: Some(datetime!(2026-11-02 10:00)),
        end: Some(datetime!(2026-11-02 11:30)),
        description: "Room 3, bring the draft plan",
        priority: Some(Priority::High),
        tags: &["work"],
    },
    Sample {
        name: "Family dinner",
        start: Some(datetime!(2026-11-07 18:30)),
        end: Some(datetime!(2026-11-07 21:00)),
        description: "",
        priority: None,
        tags: &["family"],
    },
    Sample {
        name: "Submit tax return",
        start: None,
        end: Some(datetime!(2026-11-30 23:59)),
        description: "Receipts are in the blue folder",
        priority: Some(Priority::High),
        tags: &["admin"],
    },
    Sample {
        name: "Return library books",
        start: None,
        end: Some(datetime!(2026-11-12 17:00)),
        description: "",
        priority: Some(Priority::Low),
        tags: &[],
    },
    Sample {
        name: "Buy groceries",
        start: None,
        end: None,
        description: "Milk, eggs, bread",
        priority: Some(Priority::Medium),
        tags: &["errand", "home"],
    },
    Sample {
        name: "Learn Rust",
        start: None,
        end: None,
        description: "",
        priority: None,
        tags: &["personal"],
    },
];

/// Tasks shown on first start, before any data file exists.
pub fn sample_list() -> Result<ToDoList, AppError> {
    let tasks = SAMPLES
        .iter()
        .map(|sample| {
            let tags = sample
                .tags
                .iter()
                .map(|tag| Tag::parse(tag))
                .collect::<Result<BTreeSet<_>, _>>()?;
            Task::new(
                Name::parse(sample.name)?,
                sample.start,
                sample.end,
                Description::new(sample.description),
                sample.priority,
                tags,
            )
        })
        .collect::<Result<Vec<_>, _>>()?;
    ToDoList::from_tasks(tasks)
}
