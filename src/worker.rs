//! Background worker handling remote API calls.

use std::path::PathBuf;
use tokio::{fs, sync::mpsc};
use uuid::Uuid;

use crate::{
    api::{
        auth,
        client::ApiClient,
        session::{self, SessionStore},
        stores, upload,
    },
    models::{Order, Store, ValidationError},
};

/// Commands sent from the UI to the worker.
#[derive(Debug)]
pub enum WorkerCmd {
    /// Authenticate and persist the session token.
    Login { email: String, password: String },
    /// Clear the session token (memory and disk).
    Logout,
    /// Fetch the list of destination stores.
    LoadStores,
    /// Upload one admitted file to the selected store.
    Upload {
        task_id: Uuid,
        path: PathBuf,
        store_id: String,
    },
}

/// Events emitted by the worker for UI updates.
#[derive(Clone, Debug)]
pub enum WorkerEvent {
    /// Login succeeded; the token is installed and persisted.
    LoginOk,
    /// Login failed with a user-visible reason.
    LoginFailed(String),
    /// Logout finished; the session is gone.
    LoggedOut,
    /// Store list loaded.
    StoresLoaded(Vec<Store>),
    /// Store list fetch failed.
    StoresFailed(String),
    /// An upload operation started; the task is now in flight.
    UploadStarted { task_id: Uuid },
    /// Transfer progress report for one task, in [0,100].
    UploadProgress { task_id: Uuid, progress: u8 },
    /// Upload succeeded with the created order.
    UploadDone { task_id: Uuid, order: Box<Order> },
    /// Upload failed; the error is always populated.
    UploadFailed {
        task_id: Uuid,
        error: ValidationError,
    },
    /// Informational log message.
    Log(String),
}

/// Main worker loop: handle commands sequentially, but spawn uploads as
/// independent tasks so several files transfer concurrently while the
/// loop keeps serving.
pub async fn run(
    mut rx: mpsc::Receiver<WorkerCmd>,
    tx: mpsc::Sender<WorkerEvent>,
    client: ApiClient,
    session: impl SessionStore,
) {
    tracing::info!("worker started");

    while let Some(cmd) = rx.recv().await {
        match cmd {
            WorkerCmd::Login { email, password } => {
                tracing::info!("login requested for {email}");
                match auth::login(&client, &email, &password).await {
                    Ok(token) => {
                        tracing::info!("login ok (token {})", session::fingerprint(&token));
                        if let Err(e) = session.save(&token).await {
                            // Auth still works for this run; only persistence failed.
                            tracing::error!("session save failed: {e}");
                            let _ = tx
                                .send(WorkerEvent::Log(format!("session not persisted: {e}")))
                                .await;
                        }
                        client.set_token(token);
                        let _ = tx.send(WorkerEvent::LoginOk).await;
                    }
                    Err(e) => {
                        tracing::warn!("login failed: {e}");
                        let _ = tx.send(WorkerEvent::LoginFailed(e.to_string())).await;
                    }
                }
            }

            WorkerCmd::Logout => {
                tracing::info!("logout requested");
                if let Err(e) = session.clear().await {
                    tracing::error!("session clear failed: {e}");
                }
                client.clear_token();
                let _ = tx.send(WorkerEvent::LoggedOut).await;
            }

            WorkerCmd::LoadStores => {
                tracing::info!("store list requested");
                if !client.has_token() {
                    tracing::warn!("no session token held; store list will likely be rejected");
                }
                match stores::list_stores(&client).await {
                    Ok(stores) => {
                        let _ = tx.send(WorkerEvent::StoresLoaded(stores)).await;
                    }
                    Err(e) => {
                        tracing::error!("store list failed: {e}");
                        let _ = tx.send(WorkerEvent::StoresFailed(e.to_string())).await;
                    }
                }
            }

            WorkerCmd::Upload {
                task_id,
                path,
                store_id,
            } => {
                // Detach so uploads run concurrently with no cap; each
                // one reports back over the event channel on its own.
                let tx = tx.clone();
                let client = client.clone();
                tokio::spawn(run_upload(tx, client, task_id, path, store_id));
            }
        }
    }
}

/// One independent upload: read the file, stream it up, report the
/// terminal outcome. Progress ticks use `try_send` so a momentarily full
/// channel drops a tick instead of stalling the transfer.
async fn run_upload(
    tx: mpsc::Sender<WorkerEvent>,
    client: ApiClient,
    task_id: Uuid,
    path: PathBuf,
    store_id: String,
) {
    let _ = tx.send(WorkerEvent::UploadStarted { task_id }).await;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());

    let bytes = match fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::error!("read failed: {}: {e}", path.display());
            let _ = tx
                .send(WorkerEvent::UploadFailed {
                    task_id,
                    error: ValidationError::from_message(format!(
                        "could not read {}: {e}",
                        path.display()
                    )),
                })
                .await;
            return;
        }
    };

    let progress_tx = tx.clone();
    let result = upload::upload_file(&client, &file_name, bytes, &store_id, move |progress| {
        let _ = progress_tx.try_send(WorkerEvent::UploadProgress { task_id, progress });
    })
    .await;

    match result {
        Ok(order) => {
            let _ = tx
                .send(WorkerEvent::UploadDone {
                    task_id,
                    order: Box::new(order),
                })
                .await;
        }
        Err(e) => {
            tracing::warn!("upload failed: {file_name}: {e}");
            let _ = tx
                .send(WorkerEvent::UploadFailed {
                    task_id,
                    error: e.into_validation(),
                })
                .await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::session::FileSession;

    fn temp_session() -> FileSession {
        let path = std::env::temp_dir().join(format!("asn_worker_{}.json", Uuid::new_v4()));
        FileSession::new(path)
    }

    #[tokio::test]
    async fn logout_clears_token_and_session() {
        let session = temp_session();
        session.save("tok").await.unwrap();
        let client = ApiClient::new("https://api.invalid", Some("tok".into()));

        let (tx_cmd, rx_cmd) = mpsc::channel(8);
        let (tx_ev, mut rx_ev) = mpsc::channel(8);
        let handle = tokio::spawn(run(rx_cmd, tx_ev, client.clone(), session.clone()));

        tx_cmd.send(WorkerCmd::Logout).await.unwrap();
        match rx_ev.recv().await {
            Some(WorkerEvent::LoggedOut) => {}
            other => panic!("expected LoggedOut, got {other:?}"),
        }
        assert!(!client.has_token());
        assert_eq!(session.load().await.unwrap(), None);

        // Dropping the command channel ends the loop.
        drop(tx_cmd);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn unreadable_file_fails_with_populated_error() {
        let session = temp_session();
        let client = ApiClient::new("https://api.invalid", None);

        let (tx_cmd, rx_cmd) = mpsc::channel(8);
        let (tx_ev, mut rx_ev) = mpsc::channel(8);
        tokio::spawn(run(rx_cmd, tx_ev, client, session));

        let task_id = Uuid::new_v4();
        tx_cmd
            .send(WorkerCmd::Upload {
                task_id,
                path: PathBuf::from("/nonexistent/shipment.csv"),
                store_id: "1".into(),
            })
            .await
            .unwrap();

        match rx_ev.recv().await {
            Some(WorkerEvent::UploadStarted { task_id: id }) => assert_eq!(id, task_id),
            other => panic!("expected UploadStarted, got {other:?}"),
        }
        match rx_ev.recv().await {
            Some(WorkerEvent::UploadFailed { task_id: id, error }) => {
                assert_eq!(id, task_id);
                // Even without a server payload the error carries a message.
                assert!(error.message.contains("shipment.csv"));
            }
            other => panic!("expected UploadFailed, got {other:?}"),
        }
    }
}
