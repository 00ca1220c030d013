//! # Operator Console - Command Dispatch Loop
//!
//! The thinnest possible presentation layer: a stdin reader task feeds
//! parsed commands over an `mpsc` channel into a dispatch loop that
//! drives the session manager and the lifecycle controller. Commands are
//! operator-initiated and handled one at a time, so lifecycle operations
//! are serialized by construction.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::core::api_client::AirdropApi;
use crate::form::AirdropForm;
use crate::lifecycle::LifecycleController;
use crate::session::SessionManager;
use crate::view::{StatusDisplay, WinnersDisplay};
use crate::wallet::WalletProvider;

/// Commands sent from the stdin reader to the dispatch loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Connect,
    Logout,
    Create(String),
    DrawOne(String),
    DrawAll(String),
    Status(String),
    Help,
    Quit,
}

impl ConsoleCommand {
    /// Parses one input line. Unknown or malformed lines yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let verb = parts.next()?;
        let argument = parts.next().map(str::to_string);
        match (verb, argument) {
            ("connect", None) => Some(Self::Connect),
            ("logout", None) => Some(Self::Logout),
            ("create", Some(path)) => Some(Self::Create(path)),
            ("drawone", Some(id)) => Some(Self::DrawOne(id)),
            ("drawall", Some(id)) => Some(Self::DrawAll(id)),
            ("status", Some(id)) => Some(Self::Status(id)),
            // Reach the controller's own event-id guard instead of
            // failing to parse.
            ("drawone", None) => Some(Self::DrawOne(String::new())),
            ("drawall", None) => Some(Self::DrawAll(String::new())),
            ("status", None) => Some(Self::Status(String::new())),
            ("help", None) => Some(Self::Help),
            ("quit" | "exit", None) => Some(Self::Quit),
            _ => None,
        }
    }
}

const USAGE: &str = "commands: connect | logout | create <definition.toml> | \
                     drawone <event-id> | drawall <event-id> | status <event-id> | quit";

/// Spawns the stdin reader task.
pub fn spawn_command_reader(command_tx: mpsc::Sender<ConsoleCommand>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match ConsoleCommand::parse(line) {
                Some(command) => {
                    let quit = command == ConsoleCommand::Quit;
                    if command_tx.send(command).await.is_err() || quit {
                        break;
                    }
                }
                None => warn!("Unrecognized command '{}'. {}", line, USAGE),
            }
        }
    })
}

/// The dispatch loop tying the console together.
pub struct Console<A: AirdropApi, W: WalletProvider> {
    wallet: Arc<W>,
    session: Arc<SessionManager<A, W>>,
    controller: Arc<LifecycleController<A, W>>,
    command_rx: mpsc::Receiver<ConsoleCommand>,
}

impl<A: AirdropApi, W: WalletProvider> Console<A, W> {
    pub fn new(
        wallet: Arc<W>,
        session: Arc<SessionManager<A, W>>,
        controller: Arc<LifecycleController<A, W>>,
        command_rx: mpsc::Receiver<ConsoleCommand>,
    ) -> Self {
        Self {
            wallet,
            session,
            controller,
            command_rx,
        }
    }

    /// Runs until the operator quits or stdin closes.
    pub async fn run(mut self) {
        info!("{}", USAGE);
        while let Some(command) = self.command_rx.recv().await {
            match command {
                ConsoleCommand::Connect => self.handle_connect().await,
                ConsoleCommand::Logout => self.session.sign_out(true).await,
                ConsoleCommand::Create(path) => self.handle_create(&path).await,
                ConsoleCommand::DrawOne(id) => {
                    self.report_action(self.controller.draw_one(&id).await)
                }
                ConsoleCommand::DrawAll(id) => {
                    self.report_action(self.controller.draw_all(&id).await)
                }
                ConsoleCommand::Status(id) => self.handle_status(&id).await,
                ConsoleCommand::Help => info!("{}", USAGE),
                ConsoleCommand::Quit => break,
            }
        }
    }

    async fn handle_connect(&self) {
        let address = match self.wallet.current_address() {
            Some(address) => address,
            None => match self.wallet.connect() {
                Ok(address) => address,
                Err(e) => {
                    error!("Wallet connection failed: {}", e);
                    return;
                }
            },
        };
        // Sign-in fires only if this is a new address.
        if let Err(e) = self.session.observe_address(Some(address)).await {
            error!("Sign-in failed: {}", e);
        }
    }

    async fn handle_create(&self, path: &str) {
        if self.session.session().is_none() {
            warn!("No active session; attempting anyway (the server will decide).");
        }
        let form = match AirdropForm::load(path) {
            Ok(form) => form,
            Err(e) => {
                error!("{:#}", e);
                return;
            }
        };
        match form.validate() {
            Ok(definition) => match self.controller.create(&definition).await {
                Ok(outcome) => {
                    info!("Success: {}. Event ID: {}", outcome.message, outcome.event_id)
                }
                Err(e) => {
                    error!("Create failed: {}", e);
                    for staged in self.controller.form_errors() {
                        warn!("  server: {}", staged);
                    }
                }
            },
            Err(issues) => {
                error!("Definition rejected before submission:");
                for issue in issues {
                    warn!("  {}", issue);
                }
            }
        }
    }

    async fn handle_status(&self, event_id: &str) {
        match self.controller.check_status(event_id).await {
            Ok(status) => {
                let status_display = StatusDisplay::project(&status);
                info!("Status: {}", status_display.status_label);
                match status_display.winners {
                    WinnersDisplay::NoneYet => info!("No winners yet"),
                    WinnersDisplay::Rows(rows) => {
                        for row in rows {
                            info!("  {}", row);
                        }
                    }
                }
            }
            Err(e) => self.report_failure(e),
        }
    }

    fn report_action(&self, result: Result<String, crate::error::ClientError>) {
        match result {
            Ok(message) => info!("{}", message),
            Err(e) => self.report_failure(e),
        }
    }

    fn report_failure(&self, error: crate::error::ClientError) {
        error!("{}", error);
        if let Some(staged) = self.controller.action_error() {
            warn!("  server: {}", staged);
        }
    }
}
