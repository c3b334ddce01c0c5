use std::{
    path::{Path, PathBuf},
    sync::{mpsc, Arc, Mutex},
    thread::{self, JoinHandle},
    time::Duration,
};

use anyhow::{anyhow, Context, Result};
use rusqlite::Connection;
use tokio::sync::oneshot;

use crate::db::migrations::run_migrations;
use crate::{log_error, log_info};

const ENABLE_LOGS: bool = true;

/// How long a statement waits on a locked store before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

type StoreTask = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

enum StoreCommand {
    Run(StoreTask),
    Close,
}

/// Open the observation store at `path`, tune it and migrate it.
fn open_store(path: &Path) -> Result<Connection> {
    let mut conn = Connection::open(path)
        .with_context(|| format!("failed to open observation store {}", path.display()))?;

    conn.busy_timeout(BUSY_TIMEOUT)
        .context("failed to set busy timeout")?;
    if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
        log_error!("Failed to enable WAL mode: {err}");
    }
    conn.pragma_update(None, "synchronous", "NORMAL")
        .context("failed to set synchronous pragma")?;

    run_migrations(&mut conn).context("failed to migrate observation store")?;
    Ok(conn)
}

fn serve(mut conn: Connection, commands: mpsc::Receiver<StoreCommand>) {
    while let Ok(command) = commands.recv() {
        match command {
            StoreCommand::Run(task) => task(&mut conn),
            StoreCommand::Close => break,
        }
    }
    log_info!("Observation store thread shutting down");
}

struct Worker {
    commands: mpsc::Sender<StoreCommand>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for Worker {
    fn drop(&mut self) {
        let handle = match self.handle.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        let Some(handle) = handle else {
            return;
        };

        if let Err(err) = self.commands.send(StoreCommand::Close) {
            log_error!("Failed to close observation store thread: {err}");
        }
        if let Err(join_err) = handle.join() {
            log_error!("Observation store thread panicked: {join_err:?}");
        }
    }
}

/// Handle to the observation store. All SQLite access runs on one worker
/// thread; clones share it.
#[derive(Clone)]
pub struct Database {
    worker: Arc<Worker>,
    db_path: Arc<PathBuf>,
}

impl Database {
    pub fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }

        let (command_tx, command_rx) = mpsc::channel::<StoreCommand>();
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<()>>(1);
        let path_for_thread = db_path.clone();

        let handle = thread::Builder::new()
            .name("tidewell-db".into())
            .spawn(move || match open_store(&path_for_thread) {
                Ok(conn) => {
                    if ready_tx.send(Ok(())).is_ok() {
                        serve(conn, command_rx);
                    }
                }
                Err(err) => {
                    let _ = ready_tx.send(Err(err));
                }
            })
            .context("failed to spawn observation store thread")?;

        ready_rx
            .recv()
            .context("observation store thread exited before signaling readiness")??;

        log_info!("Observation store ready at {}", db_path.display());

        Ok(Self {
            worker: Arc::new(Worker {
                commands: command_tx,
                handle: Mutex::new(Some(handle)),
            }),
            db_path: Arc::new(db_path),
        })
    }

    pub fn path(&self) -> &Path {
        self.db_path.as_path()
    }

    /// Run `task` on the worker thread and await its result.
    pub async fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();

        let command = StoreCommand::Run(Box::new(move |conn| {
            if reply_tx.send(task(conn)).is_err() {
                log_error!("Observation store caller went away before its reply");
            }
        }));

        self.worker
            .commands
            .send(command)
            .map_err(|err| anyhow!("observation store thread is gone: {err}"))?;

        reply_rx
            .await
            .map_err(|_| anyhow!("observation store thread stopped mid-request"))?
    }

    pub async fn schema_version(&self) -> Result<i32> {
        self.execute(|conn| {
            let version = conn
                .pragma_query_value(None, "user_version", |row| row.get(0))
                .context("failed to read user_version pragma")?;
            Ok(version)
        })
        .await
    }
}
