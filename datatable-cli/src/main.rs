mod print;
mod tables;

use std::fs::File;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use clap::ValueEnum;
use datatable_lib::ListClient;
use datatable_lib::model::Row;
use datatable_lib::table::DataTable;
use datatable_lib::table::TableConfig;
use simplelog::Config;
use simplelog::LevelFilter;
use simplelog::WriteLogger;

/// Which demo table to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Users with actions, no expansion.
    ParentOnly,
    /// Users with tasks embedded in the list response.
    WithTasks,
    /// Users whose tasks are fetched on expansion.
    OnDemand,
}

/// Print the demo user tables from a running mock API.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Base URL of the API server.
    #[arg(long, default_value = "http://127.0.0.1:3000")]
    server: String,

    #[arg(long, value_enum, default_value_t = Mode::ParentOnly)]
    mode: Mode,

    /// Search term, typed into the search box.
    #[arg(long)]
    search: Option<String>,

    /// Rows per page.
    #[arg(long)]
    page_size: Option<usize>,

    /// Page to show.
    #[arg(long)]
    page: Option<usize>,

    /// Expand the row of this user id. Repeatable.
    #[arg(long = "expand", value_name = "ID")]
    expand: Vec<u64>,

    /// Request timeout in seconds.
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    /// Where to write the debug log.
    #[arg(long, default_value = "datatable-cli.log")]
    log_file: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    match File::create(&args.log_file) {
        Ok(log_file) => {
            if let Err(e) = WriteLogger::init(LevelFilter::Debug, Config::default(), log_file) {
                eprintln!("Failed to initialize logger: {}", e);
            }
        }
        Err(e) => eprintln!("Failed to create log file {}: {}", args.log_file, e),
    }

    let client = match ListClient::builder()
        .url(args.server.clone())
        .timeout(Duration::from_secs(args.timeout))
        .build()
    {
        Ok(client) => Arc::new(client),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let output = match args.mode {
        Mode::ParentOnly => {
            let table = DataTable::mount(tables::parent_only(), client);
            drive(&table, &args).await;
            print::format_view(&table.view(), |_: &()| Vec::new())
        }
        Mode::WithTasks => {
            let table = DataTable::mount(tables::with_tasks(), client);
            drive(&table, &args).await;
            print::format_view(&table.view(), |tasks| tables::task_lines(tasks))
        }
        Mode::OnDemand => {
            let table = DataTable::mount_with_sub_data(tables::on_demand(), client.clone(), client);
            drive(&table, &args).await;
            print::format_view(&table.view(), |tasks| tables::task_lines(tasks))
        }
    };
    print!("{}", output);
}

/// Replays the requested interactions and waits for every fetch to land.
async fn drive<R, S>(table: &DataTable<R, S>, args: &Args)
where
    R: Row,
    S: Clone + Send + Sync + 'static,
{
    table.settled().await;

    if let Some(search) = &args.search {
        table.set_search_input(search.clone());
        table.settled().await;
    }
    if let Some(page_size) = args.page_size {
        table.set_page_size(page_size);
        table.settled().await;
    }
    if let Some(page) = args.page {
        table.set_page(page);
        table.settled().await;
    }

    for id in &args.expand {
        match row_key(table.config(), &table.state().data, *id) {
            Some(key) => {
                if table.toggle_row(&key).is_none() {
                    log::info!("user {} cannot be expanded", id);
                }
            }
            None => log::info!("user {} is not on this page", id),
        }
    }
    table.settled().await;
}

fn row_key<R: Row, S>(config: &TableConfig<R, S>, rows: &[R], id: u64) -> Option<String> {
    let id = id.to_string();
    rows.iter()
        .enumerate()
        .find(|(_, row)| row.id().as_deref() == Some(id.as_str()))
        .map(|(index, row)| config.row_key(row, index))
}
