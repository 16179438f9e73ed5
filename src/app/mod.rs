//! TUIのイベントループ、入力処理、状態管理。

mod handlers;
mod render;

use anyhow::Result;
use crossterm::event::{self, Event};
use std::{path::PathBuf, time::Duration};
use tokio::sync::mpsc;

use crate::{
    api::{client::ApiClient, session::{FileSession, SessionStore}},
    config::Config,
    events::{Screen, UiState},
    input::InputBoxState,
    selector::StoreSelector,
    shortcuts::Shortcuts,
    tasks,
    tracker::UploadTracker,
    ui::Tui,
    worker::{self, WorkerCmd, WorkerEvent},
};

use handlers::{handle_key, is_ctrl_c};
use render::draw;

/// ファイル選択画面の1エントリ。
#[derive(Clone, Debug)]
pub struct PickEntry {
    /// 対象ファイルのパス。
    pub path: PathBuf,
    /// アップロード対象としてマークされているか。
    pub marked: bool,
}

/// 入力処理と描画で共有するアプリ状態。
pub struct App {
    /// 永続化された設定ファイルのパス。
    pub cfg_path: PathBuf,
    /// メモリ上の現在設定。
    pub cfg: Config,
    /// 選択位置やステータスなどUI固有の状態。
    pub ui: UiState,
    /// アップロードタスクの追跡コア。
    pub tracker: UploadTracker,
    /// アップロード先ストアの選択状態。
    pub selector: StoreSelector,
    /// Workerへのコマンド送信チャネル。
    pub worker_tx: mpsc::Sender<WorkerCmd>,
    /// Workerからのイベント受信チャネル。
    pub worker_rx: mpsc::Receiver<WorkerEvent>,

    /// ログイン済みかどうか。
    pub authenticated: bool,
    /// ログイン画面で編集中のメールアドレス。
    pub login_email: String,
    /// ログイン画面で編集中のパスワード。
    pub login_password: String,

    /// 設定画面で編集するAPIベースURL。
    pub base_url: String,
    /// 設定画面で編集する入力ディレクトリ。
    pub input_dir: String,
    /// 設定画面で編集するメールアドレス。
    pub email: String,

    /// ファイル選択画面の一覧。
    pub pick_entries: Vec<PickEntry>,

    /// 入力ボックスの状態（入力中はSome）。
    pub input_box: Option<InputBoxState>,

    /// ショートカットキー設定。
    pub shortcuts: Shortcuts,
}

/// ユーザーが終了するまでメインTUIループを回す。
pub async fn run_app(terminal: &mut Tui) -> Result<()> {
    // 設定ファイルを読み込む（初回はデフォルトを生成）。
    let cfg_path = PathBuf::from("config.toml");
    let cfg = Config::load_or_default(&cfg_path)?;

    // ショートカット設定を読み込む（無ければデフォルト）。
    let shortcuts_path = PathBuf::from("shortcut.toml");
    let shortcuts = Shortcuts::load_or_default(&shortcuts_path)?;

    // 保存済みセッションを読み込んで初期認証状態を決める。
    let session = FileSession::new(&cfg.api.session_file);
    let token = session.load().await?;
    let authenticated = token.is_some();

    // 復元したトークン込みでAPIクライアントを構築する。
    let client = ApiClient::new(&cfg.api.base_url, token);

    // Worker通信用のコマンド/イベントチャネルを作る。
    let (tx_cmd, rx_cmd) = mpsc::channel::<WorkerCmd>(64);
    let (tx_ev, rx_ev) = mpsc::channel::<WorkerEvent>(256);

    // APIクライアントとセッションストアを渡してWorkerを起動する。
    tokio::spawn(worker::run(rx_cmd, tx_ev, client, session));

    // 認証状態に応じて初期画面を決める。
    let initial_screen = if authenticated {
        Screen::Main
    } else {
        Screen::Login
    };

    // アプリ状態を初期化する。
    let mut app = App {
        cfg_path,
        cfg: cfg.clone(),
        ui: UiState::new(initial_screen.clone()),
        tracker: UploadTracker::new(),
        selector: StoreSelector::new(),
        worker_tx: tx_cmd,
        worker_rx: rx_ev,
        authenticated,
        login_email: cfg.user.email.clone(),
        login_password: String::new(),
        base_url: cfg.api.base_url.clone(),
        input_dir: cfg.upload.input_dir.clone(),
        email: cfg.user.email.clone(),
        pick_entries: vec![],
        input_box: None,
        shortcuts,
    };

    // ログイン済みなら起動時にストア一覧を取得する。
    if initial_screen == Screen::Main {
        request_stores(&mut app).await?;
    }

    loop {
        // 現在の状態を描画する。
        terminal.draw(|f| draw(f, &app))?;

        // 入力処理の前にWorkerイベントを消化する。
        while let Ok(ev) = app.worker_rx.try_recv() {
            handle_worker_event(&mut app, ev)?;
        }

        // UIの応答性確保のため短いタイムアウトで入力をポーリングする。
        if event::poll(Duration::from_millis(50))?
            && let Event::Key(k) = event::read()?
        {
            // どのフェーズでもCtrl+Cで終了できるようにする。
            if is_ctrl_c(&k) {
                break;
            }
            if handle_key(&mut app, k).await? {
                break;
            }
        }
    }
    Ok(())
}

/// WorkerイベントをUI状態へ反映する。
///
/// タスク・ストアの全更新はこの関数（単一スレッド）からのみ行う。
fn handle_worker_event(app: &mut App, ev: WorkerEvent) -> Result<()> {
    match ev {
        WorkerEvent::LoginOk => {
            // メイン画面へ移り、続けてストア一覧を要求する。
            app.authenticated = true;
            app.login_password.clear();
            app.ui.error = None;
            app.ui.screen = Screen::Main;
            app.ui.status = "Logged in".into();
            let _ = app.worker_tx.try_send(WorkerCmd::LoadStores);
        }
        WorkerEvent::LoginFailed(msg) => {
            // ログイン画面に留まりエラーを表示する。
            app.ui.error = Some(msg);
            app.ui.status = "Login failed".into();
        }
        WorkerEvent::LoggedOut => {
            // 認証状態を落としてログイン画面へ戻る。
            app.authenticated = false;
            app.ui.screen = Screen::Login;
            app.ui.status = "Logged out".into();
        }
        WorkerEvent::StoresLoaded(stores) => {
            // 一覧を差し替える（先頭がデフォルト選択になる）。
            app.ui.status = format!("Loaded {} stores", stores.len());
            app.selector.set_stores(stores);
            app.ui.error = None;
        }
        WorkerEvent::StoresFailed(msg) => {
            // 選択不能のままアップロードをブロックする。
            app.ui.error = Some(format!("Failed to load stores: {msg}"));
        }
        WorkerEvent::UploadStarted { task_id } => {
            // タスクを転送中へ遷移させる。
            app.tracker.mark_uploading(task_id);
        }
        WorkerEvent::UploadProgress { task_id, progress } => {
            // 対象タスクの進捗のみ更新する。
            app.tracker.set_progress(task_id, progress);
        }
        WorkerEvent::UploadDone { task_id, order } => {
            // タスクを完了へ遷移させ、結果一覧にも反映する。
            app.tracker.complete(task_id, *order);
            app.ui.status = format!(
                "Uploads: {} done / {} total",
                app.tracker.done_count(),
                app.tracker.tasks().len()
            );
        }
        WorkerEvent::UploadFailed { task_id, error } => {
            // タスクを失敗へ遷移させる。エラー内容は詳細画面で見られる。
            app.tracker.fail(task_id, error);
        }
        WorkerEvent::Log(s) => {
            // ログを追加する。
            app.ui.log.push(s);
        }
    }
    Ok(())
}

/// Workerへストア一覧の取得を要求する。
pub async fn request_stores(app: &mut App) -> Result<()> {
    tracing::info!("store refresh requested");
    app.worker_tx.send(WorkerCmd::LoadStores).await?;
    app.ui.status = "Loading stores...".into();
    Ok(())
}

/// 入力ディレクトリを走査してファイル選択画面の一覧を作る。
pub fn scan_input_dir(app: &mut App) -> Result<Vec<PickEntry>> {
    let dir = PathBuf::from(&app.cfg.upload.input_dir);
    let mut entries = vec![];
    for entry in std::fs::read_dir(&dir)? {
        let entry = entry?;
        let path = entry.path();
        // 受理対象の拡張子のみを一覧に載せる。
        if path.is_file() && tasks::is_asn_file(&path) {
            entries.push(PickEntry { path, marked: true });
        }
    }
    // 表示順を安定させるため名前順に並べる。
    entries.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(entries)
}

/// 選択されたファイル群を受理し、アップロードを開始する。
///
/// タスクは必ず先に追加する。ストア未選択のときは一括でPendingのまま
/// 残し、バナーで選択を促す（Errorへは遷移させない）。
pub async fn admit_files(app: &mut App, paths: Vec<PathBuf>) -> Result<()> {
    if paths.is_empty() {
        app.ui.status = "No files selected".into();
        return Ok(());
    }

    // 拡張子フィルタを受理前に適用する。
    let (accepted, rejected): (Vec<_>, Vec<_>) =
        paths.into_iter().partition(|p| tasks::is_asn_file(p));
    if !rejected.is_empty() {
        app.ui
            .log
            .push(format!("{} file(s) skipped (not CSV/XLS/XLSX)", rejected.len()));
    }
    if accepted.is_empty() {
        app.ui.status = "No uploadable files (CSV/XLS/XLSX only)".into();
        return Ok(());
    }

    let ids = app.tracker.admit(accepted);

    // 前提条件：有効なストアが選択されていること。
    let Some(store_id) = app.selector.selected_id() else {
        app.ui.error = Some("Please select a valid store".into());
        tracing::warn!("upload blocked: no valid store selected");
        return Ok(());
    };

    // 1ファイルにつき1アップロードを独立に起動する。
    for &id in &ids {
        // admitで追加した直後なので必ず見つかる。
        if let Some(task) = app.tracker.task(id) {
            app.worker_tx
                .send(WorkerCmd::Upload {
                    task_id: id,
                    path: task.path.clone(),
                    store_id: store_id.clone(),
                })
                .await?;
        }
    }
    app.ui.status = format!("Uploading {} file(s) to store {}", ids.len(), store_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Store;
    use crate::tasks::TaskStatus;

    /// テスト用のApp状態とWorkerコマンド受信側を組み立てる。
    fn test_app() -> (App, mpsc::Receiver<WorkerCmd>) {
        let (tx_cmd, rx_cmd) = mpsc::channel::<WorkerCmd>(8);
        let (_tx_ev, rx_ev) = mpsc::channel::<WorkerEvent>(8);
        let cfg = Config::default();
        let app = App {
            cfg_path: PathBuf::from("config.toml"),
            cfg: cfg.clone(),
            ui: UiState::new(Screen::Main),
            tracker: UploadTracker::new(),
            selector: StoreSelector::new(),
            worker_tx: tx_cmd,
            worker_rx: rx_ev,
            authenticated: true,
            login_email: String::new(),
            login_password: String::new(),
            base_url: cfg.api.base_url.clone(),
            input_dir: cfg.upload.input_dir.clone(),
            email: String::new(),
            pick_entries: vec![],
            input_box: None,
            shortcuts: Shortcuts::default(),
        };
        (app, rx_cmd)
    }

    #[tokio::test]
    async fn test_admit_without_store_keeps_batch_pending() {
        let (mut app, mut rx_cmd) = test_app();

        // ストア未選択のまま2ファイルを受理する。
        admit_files(
            &mut app,
            vec![PathBuf::from("a.csv"), PathBuf::from("b.xlsx")],
        )
        .await
        .unwrap();

        // 受理自体は行われ、全タスクがPendingのまま残る。
        assert_eq!(app.tracker.tasks().len(), 2);
        assert!(
            app.tracker
                .tasks()
                .iter()
                .all(|t| t.status == TaskStatus::Pending)
        );
        // バナーで選択を促し、Workerへは何も送らない。
        assert_eq!(app.ui.error.as_deref(), Some("Please select a valid store"));
        assert!(rx_cmd.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_admit_filters_unsupported_extensions() {
        let (mut app, mut rx_cmd) = test_app();
        app.selector.set_stores(vec![Store {
            id: 5,
            name: "Main".into(),
        }]);

        admit_files(
            &mut app,
            vec![PathBuf::from("report.pdf"), PathBuf::from("goods.csv")],
        )
        .await
        .unwrap();

        // PDFはタスクにならず、CSVだけが受理・起動される。
        assert_eq!(app.tracker.tasks().len(), 1);
        assert_eq!(app.tracker.tasks()[0].display_name, "goods.csv");
        assert!(matches!(
            rx_cmd.try_recv(),
            Ok(WorkerCmd::Upload { ref store_id, .. }) if store_id == "5"
        ));
        assert!(rx_cmd.try_recv().is_err());
        assert!(app.ui.log.last().is_some_and(|l| l.contains("skipped")));
    }

    #[tokio::test]
    async fn test_admit_rejecting_everything_creates_no_tasks() {
        let (mut app, mut rx_cmd) = test_app();
        app.selector.set_stores(vec![Store {
            id: 5,
            name: "Main".into(),
        }]);

        admit_files(&mut app, vec![PathBuf::from("report.pdf")])
            .await
            .unwrap();

        assert!(app.tracker.tasks().is_empty());
        assert!(rx_cmd.try_recv().is_err());
    }
}
