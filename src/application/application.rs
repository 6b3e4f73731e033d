use std::io::{self, BufRead, Write};

use snafu::Snafu;
use snafu::prelude::*;
use tracing::{debug, info, warn};

use crate::application::RuntimeConfig;
use crate::filesystem::FileSystem;
use crate::persistence::{StateStore, StateStoreError};
use crate::shell::{DEMO_SCRIPT, Session, SessionError};

pub struct Application;

impl Application {
    pub async fn run(app_config: impl Into<RuntimeConfig>) -> Result<(), ApplicationError> {
        let app_config: RuntimeConfig = app_config.into();
        debug!("Runtime config: {:?}", app_config);
        colored::control::set_override(app_config.color);

        let store = app_config.state_file.clone().map(StateStore::new);
        let (filesystem, startup_message) =
            Self::initial_filesystem(store.as_ref(), app_config.load_saved).await;

        let stdout = io::stdout();
        let session = Session::new(filesystem, stdout.lock(), app_config.color);
        Self::run_session(
            session,
            startup_message,
            app_config.demo,
            io::stdin().lock(),
            store.as_ref(),
        )
        .await
    }

    /// Drives the session, then saves whatever the tree holds even if the
    /// terminal failed part way through.
    async fn run_session<W: Write>(
        mut session: Session<W>,
        startup_message: Option<String>,
        demo: bool,
        input: impl BufRead,
        store: Option<&StateStore>,
    ) -> Result<(), ApplicationError> {
        let outcome = Self::interact(&mut session, startup_message, demo, input);
        if let Err(error) = &outcome {
            warn!("Session stopped early: {:?}", error);
        }

        if let Some(store) = store {
            store.save(session.filesystem()).await.context(SaveSnafu)?;
            session
                .print_message("File system saved")
                .context(SessionSnafu)?;
        }

        outcome.context(SessionSnafu)
    }

    fn interact<W: Write>(
        session: &mut Session<W>,
        startup_message: Option<String>,
        demo: bool,
        input: impl BufRead,
    ) -> Result<(), SessionError> {
        if let Some(message) = startup_message {
            session.print_message(&message)?;
        }

        if demo {
            info!("Running demo sequence");
            session.run_script(DEMO_SCRIPT.iter().copied())?;
        }

        session.run(input)
    }

    /// Restores the saved tree or falls back to an empty one, with the line to show the user.
    async fn initial_filesystem(
        store: Option<&StateStore>,
        load_saved: bool,
    ) -> (FileSystem, Option<String>) {
        let Some(store) = store else {
            debug!("Persistence disabled, starting with an empty tree");
            return (FileSystem::new(), None);
        };

        if !load_saved {
            info!("Ignoring saved state at {}", store.path().display());
            return (
                FileSystem::new(),
                Some("Creating a new file system: saved state ignored".to_string()),
            );
        }

        match store.load().await {
            Ok(filesystem) => (filesystem, Some("File System loaded".to_string())),
            Err(error) => {
                warn!("Could not restore saved state: {:?}", error);
                (
                    FileSystem::new(),
                    Some(format!("Creating a new file system: {error}")),
                )
            }
        }
    }
}

#[derive(Debug, Snafu)]
pub enum ApplicationError {
    #[snafu(display("Terminal I/O failed during the session"))]
    SessionError { source: SessionError },
    #[snafu(display("Failed to save the file system"))]
    SaveError { source: StateStoreError },
}
