use std::sync::Arc;
use std::time::Duration;

use datatable_lib::JsonProvider;
use datatable_lib::ListClient;
use datatable_lib::ListProvider;
use datatable_lib::ListRequest;
use datatable_lib::PageResult;
use datatable_lib::table::Column;
use datatable_lib::table::DataTable;
use datatable_lib::table::ExpandableConfig;
use datatable_lib::table::PaginationConfig;
use datatable_lib::table::TableBody;
use datatable_lib::table::TableConfig;
use datatable_server::MockServer;
use datatable_server::ServerConfig;
use datatable_server::data::Task;
use datatable_server::data::User;
use datatable_server::data::UserWithTasks;
use tokio_util::sync::CancellationToken;

struct Running {
    client: ListClient,
    shutdown: CancellationToken,
}

impl Drop for Running {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn start(config: ServerConfig) -> Running {
    let config = config
        .with_addr("127.0.0.1:0".parse().unwrap())
        .with_latency(Duration::ZERO);
    let server = MockServer::bind(config).await.unwrap();
    let addr = server.local_addr().unwrap();

    let shutdown = CancellationToken::new();
    tokio::spawn(server.run_until(shutdown.clone()));

    let client = ListClient::builder()
        .url(format!("http://{}", addr))
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    Running { client, shutdown }
}

async fn list_users(client: &ListClient, request: ListRequest) -> PageResult<User> {
    ListProvider::<User>::list(client, &request).await.unwrap()
}

#[tokio::test]
async fn test_fifteen_users_by_ten() {
    let server = start(ServerConfig::default().with_dataset_size(15)).await;

    let first = list_users(&server.client, ListRequest::new("/api/users", 10)).await;
    let meta = first.meta.unwrap();
    assert_eq!(first.len(), 10);
    assert_eq!(meta.total, 15);
    assert_eq!(meta.total_pages, 2);
    assert!(meta.has_next_page);
    assert!(!meta.has_prev_page);

    let second = list_users(&server.client, ListRequest::new("/api/users", 10).page(2)).await;
    let meta = second.meta.unwrap();
    assert_eq!(second.len(), 5);
    assert!(!meta.has_next_page);
    assert!(meta.has_prev_page);
    assert_eq!(second.items[0].id, 11);
}

#[tokio::test]
async fn test_search_filters_users() {
    let server = start(ServerConfig::default()).await;

    let page = list_users(&server.client, ListRequest::new("/api/users", 15).search("doe")).await;
    assert!(!page.is_empty());
    assert!(page.items.iter().any(|user| user.name == "Jane Doe"));
    assert!(page.items.iter().all(|user| user.matches("doe")));
    assert_eq!(page.meta.unwrap().total, page.len());
}

#[tokio::test]
async fn test_with_tasks_embeds_tasks() {
    let server = start(ServerConfig::default()).await;

    let request = ListRequest::new("/api/users/with-tasks", 10);
    let page = ListProvider::<UserWithTasks>::list(&server.client, &request)
        .await
        .unwrap();
    assert_eq!(page.len(), 10);
    for row in &page.items {
        assert_eq!(row.tasks.len() as u64, row.user.total_tasks);
    }
}

#[tokio::test]
async fn test_invalid_limit_is_rejected() {
    let server = start(ServerConfig::default()).await;

    let request = ListRequest::new("/api/users", 0);
    let error = ListProvider::<User>::list(&server.client, &request)
        .await
        .unwrap_err();
    assert_eq!(error.status_code(), Some(400));
    assert!(error.to_string().contains("Invalid limit parameter"));
}

#[tokio::test]
async fn test_tasks_endpoint_errors() {
    let server = start(ServerConfig::default().with_failing_tasks([4])).await;

    let tasks = server.client.get_json("/api/users/1/tasks").await.unwrap();
    assert!(tasks.is_array());

    let failed = server.client.get_json("/api/users/4/tasks").await.unwrap_err();
    assert_eq!(failed.status_code(), Some(500));
    assert_eq!(failed.to_string(), "HTTP 500: Failed to fetch tasks");

    let missing = server.client.get_json("/api/users/999/tasks").await.unwrap_err();
    assert_eq!(missing.status_code(), Some(404));
}

#[tokio::test]
async fn test_table_isolates_failed_expansion() {
    let server = start(ServerConfig::default().with_failing_tasks([2])).await;

    let columns = vec![
        Column::new("username", "Username"),
        Column::new("name", "Full Name"),
        Column::new("totalTasks", "Total Tasks")
            .render(|value, _user: &User| format!("{} tasks", value)),
    ];
    let config: TableConfig<User, Vec<Task>> = TableConfig::new("/api/users", columns)
        .pagination(PaginationConfig::default().with_page_size(10))
        .expandable(
            ExpandableConfig::on_demand(|user: &User| format!("/api/users/{}/tasks", user.id))
                .condition(|user| user.total_tasks > 0)
                .cache_key(|user| format!("user-{}-tasks", user.id)),
        );

    let client = Arc::new(server.client.clone());
    let table = DataTable::mount_with_sub_data(config, client.clone(), client);
    table.settled().await;
    assert_eq!(table.state().data.len(), 10);

    assert_eq!(table.toggle_row("user-1-tasks"), Some(true));
    assert_eq!(table.toggle_row("user-2-tasks"), Some(true));
    // Every fifth user has no tasks.
    assert_eq!(table.toggle_row("user-5-tasks"), None);
    table.settled().await;

    let ok = table.expansion_entry("user-1-tasks");
    let tasks = ok.sub_data.unwrap();
    assert!(!tasks.is_empty());
    assert!(tasks.iter().all(|task| task.user_id == 1));

    let failed = table.expansion_entry("user-2-tasks");
    assert!(failed.sub_data.is_none());
    assert_eq!(failed.error.as_deref(), Some("HTTP 500: Failed to fetch tasks"));

    let view = table.view();
    let TableBody::Rows(rows) = &view.body else {
        panic!("expected rows, got {:?}", view.body);
    };
    assert_eq!(rows.len(), 10);
    assert_eq!(rows[4].toggle, None);
    assert_eq!(rows[0].cells[2].content, format!("{} tasks", rows_total(&table, 0)));
}

fn rows_total(table: &DataTable<User, Vec<Task>>, index: usize) -> u64 {
    table.state().data[index].total_tasks
}
