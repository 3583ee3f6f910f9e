use crate::cli::main_types::{BrowseArgs, ConfigCommands, HousesArgs, OutputFormat};
use got_core::api::models::House;
use got_core::core::services::config_service::ConfigService;
use got_core::core::services::{HouseService, HousesStatus, PagedFeed};
use got_core::display::TableDisplay;
use got_core::error::{AppError, CliError};
use got_core::networking::{Call, ConnectivityMonitor, ProbeNetwork, RequestStatus};
use got_core::storage::config::Config;
use got_core::utils::logging::print_verbose;
use got_core::utils::validation::validate_page;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};

/// Turns a failed status into the error the process exits with.
fn fetch_failed(status: &HousesStatus) -> AppError {
    let message = status
        .user_message()
        .unwrap_or_else(|| format!("Unexpected status: {}", status.kind()));
    AppError::Cli(CliError::FetchFailed { message })
}

fn print_json(houses: &[House]) -> Result<(), AppError> {
    match serde_json::to_string_pretty(houses) {
        Ok(json_output) => {
            println!("{}", json_output);
            Ok(())
        }
        Err(e) => Err(AppError::Cli(CliError::InvalidArguments(format!(
            "Failed to serialize houses to JSON: {}",
            e
        )))),
    }
}

#[derive(Default)]
pub struct ConfigHandler;

impl ConfigHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle(
        &self,
        command: ConfigCommands,
        config_service: &mut ConfigService,
        config_path: Option<PathBuf>,
        verbose: bool,
    ) -> Result<(), AppError> {
        match command {
            ConfigCommands::Show => {
                print_verbose(verbose, "Showing effective configuration");

                println!("Current Configuration:");
                println!("=====================");
                let path = match &config_path {
                    Some(path) => Some(path.clone()),
                    None => Config::config_file_path().ok(),
                };
                if let Some(path) = path {
                    println!("Config file: {}", path.display());
                }
                for (key, value) in config_service.entries() {
                    println!("  {:<22} {}", key, value);
                }

                if let Err(e) = config_service.config().validate() {
                    println!("\n⚠️  {}", e);
                }
                Ok(())
            }
            ConfigCommands::Set { key, value } => {
                print_verbose(verbose, &format!("Setting {} = {}", key, value));

                config_service.set_value(&key, &value)?;
                config_service.save_config(config_path)?;
                println!("✅ Set {} to: {}", key, value);
                println!("Configuration saved successfully.");
                Ok(())
            }
        }
    }
}

#[derive(Default)]
pub struct HousesHandler;

impl HousesHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle(
        &self,
        args: HousesArgs,
        service: HouseService,
        display: &TableDisplay,
        verbose: bool,
    ) -> Result<(), AppError> {
        validate_page(args.page)?;
        print_verbose(
            verbose,
            &format!(
                "Fetching houses - Page: {}, Page size: {}, Format: {:?}",
                args.page,
                service.page_size(),
                args.format
            ),
        );

        let call = service.houses_call(args.page)?;
        print_verbose(verbose, &call.describe());

        let outcome = tokio::select! {
            status = call.enqueue() => status,
            _ = tokio::signal::ctrl_c() => {
                call.cancel();
                None
            }
        };

        let Some(status) = outcome else {
            eprintln!("Request canceled");
            return Ok(());
        };

        let total = status.data().and_then(|page| page.total_count());
        let status = status.map(|page| page.into_items());
        match status {
            RequestStatus::Success { data, .. } | RequestStatus::Cached { data } => {
                match args.format {
                    OutputFormat::Json => print_json(&data),
                    OutputFormat::Table => {
                        println!(
                            "{}",
                            display.render_page_header(
                                args.page,
                                service.page_size(),
                                data.len(),
                                total
                            )
                        );
                        if args.detail {
                            for house in &data {
                                println!("{}", display.render_house_detail(house));
                            }
                        } else if !data.is_empty() {
                            println!("{}", display.render_house_list(&data));
                        }
                        Ok(())
                    }
                }
            }
            other => Err(fetch_failed(&other)),
        }
    }
}

#[derive(Default)]
pub struct BrowseHandler;

impl BrowseHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle(
        &self,
        args: BrowseArgs,
        service: HouseService,
        display: &TableDisplay,
        verbose: bool,
    ) -> Result<(), AppError> {
        let page_size = service.page_size();
        let feed = Arc::new(PagedFeed::new(Arc::new(service)));
        let mut updates = feed.subscribe();

        let mut collected: Vec<House> = Vec::new();
        let mut pages_done = 0u32;

        loop {
            if args.pages.is_some_and(|limit| pages_done >= limit) {
                print_verbose(verbose, "Page limit reached");
                break;
            }
            if feed.pagination().reached_last_page {
                print_verbose(verbose, "Last page reached");
                break;
            }

            let page = feed.pagination().current_page;
            let task = feed.spawn_fetch(false);

            let outcome = tokio::select! {
                status = next_terminal(&mut updates, &feed, verbose) => status,
                _ = tokio::signal::ctrl_c() => {
                    feed.cancel();
                    None
                }
            };

            // The cursor moves after the status goes out
            if let Err(e) = task.await {
                log::error!("Fetch task failed: {}", e);
            }

            let Some(status) = outcome else {
                eprintln!("Browsing canceled");
                break;
            };

            match status {
                RequestStatus::Success { data, .. } | RequestStatus::Cached { data } => {
                    pages_done += 1;
                    if data.is_empty() {
                        continue;
                    }
                    match args.format {
                        OutputFormat::Json => collected.extend(data),
                        OutputFormat::Table => {
                            println!(
                                "{}",
                                display.render_page_header(page, page_size, data.len(), None)
                            );
                            println!("{}", display.render_house_list(&data));
                        }
                    }
                }
                other => return Err(fetch_failed(&other)),
            }
        }

        if args.format == OutputFormat::Json {
            print_json(&collected)?;
        }
        Ok(())
    }
}

/// Waits past `Loading` for the status that ends the current fetch.
/// `None` if the feed went away.
async fn next_terminal(
    updates: &mut broadcast::Receiver<HousesStatus>,
    feed: &PagedFeed<HouseService>,
    verbose: bool,
) -> Option<HousesStatus> {
    loop {
        match updates.recv().await {
            Ok(RequestStatus::Loading) => {
                let pagination = feed.pagination();
                if pagination.loading_first_time {
                    print_verbose(verbose, "First load, starting a fresh list");
                }
                eprintln!("Loading page {}...", pagination.current_page);
            }
            Ok(status) => return Some(status),
            Err(RecvError::Lagged(skipped)) => {
                log::warn!("Missed {} feed updates", skipped);
            }
            Err(RecvError::Closed) => return None,
        }
    }
}

#[derive(Default)]
pub struct StatusHandler;

impl StatusHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle(
        &self,
        probe: Arc<ProbeNetwork>,
        monitor: ConnectivityMonitor,
        service: HouseService,
        verbose: bool,
    ) -> Result<(), AppError> {
        print_verbose(verbose, &format!("Probing {}", probe.address()));
        let reachable = probe.probe().await;

        println!("Connectivity Status:");
        println!("===================");
        if reachable && monitor.is_connected() {
            println!("Network: ✅ Reachable ({})", probe.address());
        } else {
            println!("Network: ❌ Unreachable ({})", probe.address());
        }

        match service.get_houses(1).await {
            Some(RequestStatus::Success { status_code, .. }) => {
                println!("API: ✅ Responding (HTTP {})", status_code);
                Ok(())
            }
            Some(status) => {
                println!("API: ❌ {}", status.kind());
                Err(fetch_failed(&status))
            }
            None => {
                println!("API: request canceled");
                Ok(())
            }
        }
    }
}
