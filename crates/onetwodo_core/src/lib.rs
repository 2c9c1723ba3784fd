pub mod config;
pub mod datetime;
pub mod error;
pub mod history;
pub mod logging;
pub mod logic;
pub mod model;
pub mod storage;

#[cfg(test)]
mod tests {
    use crate::error::AppError;
    use crate::logic::{FixedClock, Logic};
    use crate::model::ToDoList;
    use time::macros::datetime;

    #[test]
    fn logic_runs_a_command_end_to_end() {
        let mut logic = Logic::new(ToDoList::new())
            .with_clock(Box::new(FixedClock(datetime!(2026-10-19 10:15))));

        let result = logic.execute("add demo p/high").unwrap();

        assert!(result.changed);
        assert_eq!(logic.to_do_list().len(), 1);
        assert_eq!(logic.displayed_tasks()[0].index.to_string(), "t1");
    }

    #[test]
    fn app_error_exposes_code() {
        let err = AppError::validation("blank name");
        assert_eq!(err.code(), "validation_error");
        assert_eq!(err.to_string(), "validation_error - blank name");
    }
}
