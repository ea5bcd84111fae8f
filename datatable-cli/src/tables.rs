//! The demo tables

use datatable_lib::model::Row;
use datatable_lib::table::Alignment;
use datatable_lib::table::Column;
use datatable_lib::table::ExpandableConfig;
use datatable_lib::table::PaginationConfig;
use datatable_lib::table::SearchConfig;
use datatable_lib::table::TableConfig;
use datatable_server::data::Task;
use datatable_server::data::User;
use datatable_server::data::UserWithTasks;
use serde_json::Value;

fn user_columns<R: Row>() -> Vec<Column<R>> {
    vec![
        Column::new("username", "Username"),
        Column::new("name", "Full Name"),
        Column::new("email", "Email"),
        Column::new("totalTasks", "Total Tasks")
            .align(Alignment::Center)
            .render(|value: &Value, _row: &R| format!("{} tasks", value.as_u64().unwrap_or(0))),
    ]
}

fn user_actions<R>(_row: &R) -> Vec<String> {
    vec!["View".into(), "Edit".into(), "Delete".into()]
}

/// Users with actions, no expansion.
pub fn parent_only() -> TableConfig<User> {
    TableConfig::new("/api/users", user_columns())
        .title("Users Data (With Actions)")
        .actions(user_actions)
        .pagination(
            PaginationConfig::default()
                .with_page_size(10)
                .with_page_size_options([5, 10, 15, 20]),
        )
        .search(SearchConfig::enabled().with_placeholder("Search users..."))
        .striped(true)
}

/// Users whose tasks arrive embedded in the list response.
pub fn with_tasks() -> TableConfig<UserWithTasks, Vec<Task>> {
    TableConfig::new("/api/users/with-tasks", user_columns())
        .title("Users with Tasks (Pre-loaded)")
        .expandable(
            ExpandableConfig::preloaded(|row: &UserWithTasks| Some(row.tasks.clone()))
                .condition(|row| row.user.total_tasks > 0),
        )
        .actions(user_actions)
        .pagination(PaginationConfig::default().with_page_size(10))
        .search(SearchConfig::enabled().with_placeholder("Search users with tasks..."))
        .striped(true)
}

/// Users whose tasks are fetched the first time a row is expanded.
pub fn on_demand() -> TableConfig<User, Vec<Task>> {
    TableConfig::new("/api/users", user_columns())
        .title("Users (On-Demand Tasks)")
        .expandable(
            ExpandableConfig::on_demand(|user: &User| format!("/api/users/{}/tasks", user.id))
                .condition(|user| user.total_tasks > 0)
                .cache_key(|user| format!("user-{}-tasks", user.id)),
        )
        .actions(user_actions)
        .pagination(
            PaginationConfig::default()
                .with_page_size(10)
                .with_page_size_options([5, 10, 15, 20]),
        )
        .search(SearchConfig::enabled().with_placeholder("Search users..."))
        .striped(true)
        .loading_rows(8)
}

/// One line per task.
pub fn task_lines(tasks: &[Task]) -> Vec<String> {
    if tasks.is_empty() {
        return vec!["No tasks".to_string()];
    }
    tasks
        .iter()
        .map(|task| {
            format!(
                "#{} {} [{}, {} priority]",
                task.id,
                task.title,
                task.status.label(),
                task.priority.label()
            )
        })
        .collect()
}
