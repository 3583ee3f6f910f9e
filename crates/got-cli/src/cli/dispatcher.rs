use crate::cli::command_handlers::{BrowseHandler, ConfigHandler, HousesHandler, StatusHandler};
use crate::cli::main_types::Commands;
use got_core::api::client::IceAndFireClient;
use got_core::core::services::HouseService;
use got_core::core::services::config_service::ConfigService;
use got_core::display::TableDisplay;
use got_core::error::AppError;
use got_core::networking::{ConnectivityMonitor, ProbeNetwork};
use got_core::storage::config::Config;
use got_core::utils::logging::print_verbose;
use got_core::utils::validation::{validate_page_size, validate_url};
use std::path::PathBuf;
use std::sync::Arc;

pub struct Dispatcher {
    config: Config,
    config_path: Option<PathBuf>,
    verbose: bool,
    url: Option<String>,
    display: TableDisplay,
}

impl Dispatcher {
    fn log_verbose(&self, msg: &str) {
        print_verbose(self.verbose, msg);
    }

    pub fn new(
        config: Config,
        config_path: Option<PathBuf>,
        verbose: bool,
        url: Option<String>,
    ) -> Self {
        Self {
            config,
            config_path,
            verbose,
            url,
            display: TableDisplay::new(),
        }
    }

    pub fn with_display(mut self, display: TableDisplay) -> Self {
        self.display = display;
        self
    }

    /// Validated config for a fetching command. `--url` stays outside the
    /// config so it outranks `GOT_API_URL`.
    fn effective_config(&self) -> Result<Config, AppError> {
        if let Some(url) = &self.url {
            validate_url(url)?;
        }
        self.config.validate_with(self.url.as_deref())?;
        Ok(self.config.clone())
    }

    /// Probe that has already measured once, so the first fetch does not run
    /// on an assumed-reachable network.
    async fn create_probe(&self, config: &Config) -> Arc<ProbeNetwork> {
        self.log_verbose(&format!(
            "Probing connectivity via {} every {}s",
            config.connectivity_probe(),
            config.probe_interval().as_secs()
        ));
        Arc::new(
            ProbeNetwork::new(config.connectivity_probe(), config.probe_interval())
                .primed()
                .await,
        )
    }

    fn create_client(
        &self,
        config: &Config,
        monitor: ConnectivityMonitor,
    ) -> Result<IceAndFireClient, AppError> {
        let settings = config.client_settings(self.url.as_deref());
        self.log_verbose(&format!("Using API at {}", settings.base_url));
        Ok(IceAndFireClient::new(&settings, Some(monitor))?)
    }

    fn create_house_service(
        &self,
        config: &Config,
        monitor: ConnectivityMonitor,
        page_size: Option<u32>,
    ) -> Result<HouseService, AppError> {
        let page_size = page_size.unwrap_or_else(|| config.page_size());
        validate_page_size(page_size)?;
        let client = self.create_client(config, monitor)?;
        Ok(HouseService::new(client, page_size))
    }

    pub async fn dispatch(&self, command: Commands) -> Result<(), AppError> {
        match command {
            Commands::Config { command } => {
                // Config commands must work even when the stored values are invalid
                let handler = ConfigHandler::new();
                let mut config_service = ConfigService::new(self.config.clone());
                handler
                    .handle(
                        command,
                        &mut config_service,
                        self.config_path.clone(),
                        self.verbose,
                    )
                    .await
            }
            Commands::Houses(args) => {
                let config = self.effective_config()?;
                let monitor = ConnectivityMonitor::new(self.create_probe(&config).await);
                // Holding a subscription keeps the probe running for the whole command
                let _watch = monitor.subscribe();
                let service = self.create_house_service(&config, monitor, args.page_size)?;
                HousesHandler::new()
                    .handle(args, service, &self.display, self.verbose)
                    .await
            }
            Commands::Browse(args) => {
                let config = self.effective_config()?;
                let monitor = ConnectivityMonitor::new(self.create_probe(&config).await);
                let _watch = monitor.subscribe();
                let service = self.create_house_service(&config, monitor, args.page_size)?;
                BrowseHandler::new()
                    .handle(args, service, &self.display, self.verbose)
                    .await
            }
            Commands::Status => {
                let config = self.effective_config()?;
                let probe = self.create_probe(&config).await;
                let monitor = ConnectivityMonitor::new(probe.clone());
                let service = self.create_house_service(&config, monitor.clone(), Some(1))?;
                StatusHandler::new()
                    .handle(probe, monitor, service, self.verbose)
                    .await
            }
        }
    }
}
