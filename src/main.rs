use std::io::stdout;

use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

use orderlens::catalog::Catalog;
use orderlens::cli::{Backend, Cli, OutputFormat};
use orderlens::config::RemoteConfig;
use orderlens::export;
use orderlens::report::{run_page, SectionResult};
use orderlens::store::{MemoryStore, PostgresStore, QueryStore};
use orderlens::table::{ResultTable, Value};
use orderlens::tui::{app::App, input::handle_events, ui::draw};
use orderlens::{logging, Page};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse_args();

    let catalog = match &cli.catalog {
        Some(path) => Catalog::from_toml_file(path)?,
        None => Catalog::builtin(),
    };

    if let Some(page_title) = &cli.page {
        logging::init_stderr_logging();
        let store = open_store(&cli)?;
        let page = catalog.page(page_title)?;
        run_report(store.as_ref(), page, cli.format);
    } else {
        logging::init_file_logging();
        let store = open_store(&cli)?;
        run_tui(store, catalog, &cli)?;
    }

    Ok(())
}

fn open_store(cli: &Cli) -> Result<Box<dyn QueryStore>, Box<dyn std::error::Error>> {
    match cli.backend {
        Backend::Memory => Ok(Box::new(MemoryStore::load(&cli.orders, &cli.products)?)),
        Backend::Postgres => Ok(Box::new(PostgresStore::new(RemoteConfig::from_env())?)),
    }
}

fn run_report(store: &dyn QueryStore, page: &Page, format: OutputFormat) {
    for section in run_page(store, page) {
        print_section(&section, format);
    }
}

fn print_section(section: &SectionResult, format: OutputFormat) {
    println!("== {} ==", section.description);
    println!("{}", section.sql);
    println!();

    match &section.outcome {
        Err(error) => println!("Error: {}", error),
        Ok(table) if table.is_empty() => println!("(no results)"),
        Ok(table) => match format {
            OutputFormat::Table => print_table(table),
            OutputFormat::Csv => print!("{}", export::csv_string(table)),
            OutputFormat::Json => print_json(table),
        },
    }
    println!();
}

fn print_table(table: &ResultTable) {
    let widths: Vec<usize> = table
        .schema
        .columns
        .iter()
        .enumerate()
        .map(|(i, col)| {
            let header_width = col.name.len();
            let max_value_width = table
                .rows
                .iter()
                .map(|row| row.get(i).map(|v| v.to_string().len()).unwrap_or(0))
                .max()
                .unwrap_or(0);
            header_width.max(max_value_width)
        })
        .collect();

    let header: Vec<String> = table
        .schema
        .columns
        .iter()
        .enumerate()
        .map(|(i, col)| format!("{:width$}", col.name, width = widths[i]))
        .collect();
    println!("{}", header.join(" | "));

    let sep: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep.join("-+-"));

    for row in &table.rows {
        let values: Vec<String> = row
            .values
            .iter()
            .enumerate()
            .map(|(i, v)| format!("{:width$}", v, width = widths[i]))
            .collect();
        println!("{}", values.join(" | "));
    }

    println!("({} rows)", table.row_count());
}

fn print_json(table: &ResultTable) {
    print!("[");
    for (i, row) in table.rows.iter().enumerate() {
        if i > 0 {
            print!(",");
        }
        print!("{{");
        for (j, (col, val)) in table
            .schema
            .columns
            .iter()
            .zip(row.values.iter())
            .enumerate()
        {
            if j > 0 {
                print!(",");
            }
            let rendered = match val {
                Value::String(s) => format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\"")),
                Value::Null => "null".to_string(),
                _ => val.to_string(),
            };
            print!("\"{}\":{}", col.name, rendered);
        }
        print!("}}");
    }
    println!("]");
}

fn run_tui(
    store: Box<dyn QueryStore>,
    catalog: Catalog,
    cli: &Cli,
) -> Result<(), Box<dyn std::error::Error>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(store, catalog, cli.export_dir.clone());

    loop {
        terminal.draw(|frame| draw(frame, &app))?;

        if handle_events(&mut app)? {
            break;
        }
    }

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}
