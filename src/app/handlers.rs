//! キー入力ハンドラー関数。

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::{
    events::Screen,
    input::{InputBoxState, InputCallbackId},
    shortcuts,
    worker::WorkerCmd,
};

use super::{App, admit_files, request_stores, scan_input_dir};

/// キー入力を1件処理し、終了すべきならtrueを返す。
pub async fn handle_key(app: &mut App, k: KeyEvent) -> Result<bool> {
    // 入力ボックスが開いていれば最優先で処理する。
    if app.input_box.is_some() {
        return handle_input_box_key(app, k).await;
    }

    // 画面ごとのハンドラへ委譲する。
    match app.ui.screen {
        Screen::Login => handle_login_key(app, k).await,
        Screen::Main => handle_main_key(app, k).await,
        Screen::PickFiles => handle_pick_files_key(app, k).await,
        Screen::Detail => handle_detail_key(app, k).await,
        Screen::Settings => handle_settings_key(app, k).await,
    }
}

/// Ctrl+Cかどうかを判定する。
pub fn is_ctrl_c(k: &KeyEvent) -> bool {
    k.modifiers.contains(KeyModifiers::CONTROL) && k.code == KeyCode::Char('c')
}

/// ログイン画面のキー処理。
async fn handle_login_key(app: &mut App, k: KeyEvent) -> Result<bool> {
    let sc = &app.shortcuts.login;

    if shortcuts::matches_shortcut(&k, &sc.quit) {
        return Ok(true);
    } else if shortcuts::matches_shortcut(&k, &sc.email) {
        // メールアドレスの入力ボックスを開く。
        app.input_box = Some(InputBoxState::new(
            "Email:",
            app.login_email.clone(),
            InputCallbackId::LoginEmail,
        ));
    } else if shortcuts::matches_shortcut(&k, &sc.password) {
        // パスワードは伏せ字入力にする。
        app.input_box = Some(InputBoxState::masked(
            "Password:",
            InputCallbackId::LoginPassword,
        ));
    } else if shortcuts::matches_shortcut(&k, &sc.submit) {
        // 両方入力済みならログインを要求する。
        if app.login_email.is_empty() || app.login_password.is_empty() {
            app.ui.error = Some("Enter email and password first".into());
        } else {
            app.ui.error = None;
            app.ui.status = "Logging in...".into();
            app.worker_tx
                .send(WorkerCmd::Login {
                    email: app.login_email.clone(),
                    password: app.login_password.clone(),
                })
                .await?;
        }
    }

    Ok(false)
}

/// メイン画面のキー処理。
async fn handle_main_key(app: &mut App, k: KeyEvent) -> Result<bool> {
    let sc = &app.shortcuts.main;

    if shortcuts::matches_shortcut(&k, &sc.quit) {
        return Ok(true);
    } else if shortcuts::matches_shortcut(&k, &sc.pick_files) {
        // 入力ディレクトリを走査してファイル選択画面へ移る。
        match scan_input_dir(app) {
            Ok(entries) if entries.is_empty() => {
                app.ui.status = format!("No ASN files in {}", app.cfg.upload.input_dir);
            }
            Ok(entries) => {
                app.pick_entries = entries;
                app.ui.file_selected = 0;
                app.ui.screen = Screen::PickFiles;
                app.ui.status = "Select files to upload".into();
            }
            Err(e) => {
                app.ui.error = Some(format!("Cannot read {}: {e}", app.cfg.upload.input_dir));
            }
        }
    } else if shortcuts::matches_shortcut(&k, &sc.reload_stores) {
        // ストア一覧の再取得を依頼する。
        request_stores(app).await?;
    } else if shortcuts::matches_shortcut(&k, &sc.next_store) {
        // 次のストアを選択する。
        app.selector.select_next();
    } else if shortcuts::matches_shortcut(&k, &sc.prev_store) {
        // 前のストアを選択する。
        app.selector.select_prev();
    } else if shortcuts::matches_shortcut(&k, &sc.settings) {
        // 設定画面へ遷移し、編集バッファを更新する。
        reload_settings_buffers(app);
        app.ui.screen = Screen::Settings;
        app.ui.status = "Settings".into();
    } else if shortcuts::matches_shortcut(&k, &sc.logout) {
        // ログアウトを要求する（完了イベントで画面が切り替わる）。
        app.worker_tx.send(WorkerCmd::Logout).await?;
    } else if shortcuts::matches_shortcut(&k, &sc.down) {
        // 次の行へ移動する。
        if app.ui.selected + 1 < app.tracker.tasks().len() {
            app.ui.selected += 1;
        }
    } else if shortcuts::matches_shortcut(&k, &sc.up) {
        // 前の行へ移動する。
        if app.ui.selected > 0 {
            app.ui.selected -= 1;
        }
    } else if shortcuts::matches_shortcut(&k, &sc.detail)
        && app.tracker.tasks().get(app.ui.selected).is_some()
    {
        // 選択タスクの詳細画面へ遷移する。
        app.ui.screen = Screen::Detail;
    }

    Ok(false)
}

/// ファイル選択画面のキー処理。
async fn handle_pick_files_key(app: &mut App, k: KeyEvent) -> Result<bool> {
    let sc = &app.shortcuts.pick_files;

    if shortcuts::matches_shortcut(&k, &sc.cancel) {
        // 選択をやめてメイン画面へ戻る。
        app.ui.screen = Screen::Main;
        app.ui.status = "Ready".into();
    } else if shortcuts::matches_shortcut(&k, &sc.toggle) {
        // 現在行のマークを反転する。
        if let Some(entry) = app.pick_entries.get_mut(app.ui.file_selected) {
            entry.marked = !entry.marked;
        }
    } else if shortcuts::matches_shortcut(&k, &sc.toggle_all) {
        // 全マークを反転する（1つでも未マークがあれば全マーク）。
        let all_marked = app.pick_entries.iter().all(|e| e.marked);
        for entry in &mut app.pick_entries {
            entry.marked = !all_marked;
        }
    } else if shortcuts::matches_shortcut(&k, &sc.upload) {
        // マーク済みファイルを受理してアップロードを開始する。
        let paths: Vec<_> = app
            .pick_entries
            .iter()
            .filter(|e| e.marked)
            .map(|e| e.path.clone())
            .collect();
        app.ui.screen = Screen::Main;
        admit_files(app, paths).await?;
    } else if shortcuts::matches_shortcut(&k, &sc.down) {
        // 次の行へ移動する。
        if app.ui.file_selected + 1 < app.pick_entries.len() {
            app.ui.file_selected += 1;
        }
    } else if shortcuts::matches_shortcut(&k, &sc.up) {
        // 前の行へ移動する。
        if app.ui.file_selected > 0 {
            app.ui.file_selected -= 1;
        }
    }

    Ok(false)
}

/// 詳細画面のキー処理。
async fn handle_detail_key(app: &mut App, k: KeyEvent) -> Result<bool> {
    let sc = &app.shortcuts.detail;

    if shortcuts::matches_shortcut(&k, &sc.back) {
        // メイン画面へ戻る。
        app.ui.screen = Screen::Main;
    }

    Ok(false)
}

/// 設定画面のキー処理。
async fn handle_settings_key(app: &mut App, k: KeyEvent) -> Result<bool> {
    let sc = &app.shortcuts.settings;

    if shortcuts::matches_shortcut(&k, &sc.cancel) {
        // 変更を破棄してメイン画面へ戻る。
        reload_settings_buffers(app);
        app.ui.screen = Screen::Main;
    } else if shortcuts::matches_shortcut(&k, &sc.save) {
        // 編集バッファを設定へ反映する。
        app.cfg.api.base_url = app.base_url.clone();
        app.cfg.upload.input_dir = app.input_dir.clone();
        app.cfg.user.email = app.email.clone();
        // 設定ファイルを保存する。
        app.cfg.save(&app.cfg_path)?;

        // APIクライアントは起動時に構築されるため、URL変更は次回起動から。
        app.ui.screen = Screen::Main;
        app.ui.status = "Saved settings (base URL applies on restart)".into();
    } else if shortcuts::matches_shortcut(&k, &sc.base_url) {
        // ベースURLの入力ボックスを開く。
        app.input_box = Some(InputBoxState::new(
            "API base URL:",
            app.base_url.clone(),
            InputCallbackId::SettingsBaseUrl,
        ));
    } else if shortcuts::matches_shortcut(&k, &sc.input_dir) {
        // 入力ディレクトリの入力ボックスを開く。
        app.input_box = Some(InputBoxState::new(
            "ASN files directory:",
            app.input_dir.clone(),
            InputCallbackId::SettingsInputDir,
        ));
    } else if shortcuts::matches_shortcut(&k, &sc.email) {
        // メールアドレスの入力ボックスを開く。
        app.input_box = Some(InputBoxState::new(
            "Email:",
            app.email.clone(),
            InputCallbackId::SettingsEmail,
        ));
    }

    Ok(false)
}

/// 入力ボックスのキー処理。
async fn handle_input_box_key(app: &mut App, k: KeyEvent) -> Result<bool> {
    // 入力ボックスが無ければ何もしない。
    let Some(input_state) = &mut app.input_box else {
        return Ok(false);
    };

    let sc = &app.shortcuts.input_box;

    // 入力ボックス中でもCtrl+Cで終了できるようにする。
    if is_ctrl_c(&k) {
        return Ok(true);
    }

    if shortcuts::matches_shortcut(&k, &sc.confirm) {
        // 入力ボックスを閉じる前に値とコールバック種別を保存する。
        let value = input_state.value.clone();
        let callback_id = input_state.callback_id.clone();
        app.input_box = None;

        // コールバック種別に応じて値を反映する。
        apply_input_callback(app, callback_id, value);
    } else if shortcuts::matches_shortcut(&k, &sc.cancel) {
        // 入力を破棄して入力ボックスを閉じる。
        app.input_box = None;
    } else if shortcuts::matches_shortcut(&k, &sc.backspace) {
        input_state.backspace();
    } else if shortcuts::matches_shortcut(&k, &sc.delete) {
        input_state.delete();
    } else if shortcuts::matches_shortcut(&k, &sc.left) {
        input_state.move_left();
    } else if shortcuts::matches_shortcut(&k, &sc.right) {
        input_state.move_right();
    } else if shortcuts::matches_shortcut(&k, &sc.home) {
        input_state.move_home();
    } else if shortcuts::matches_shortcut(&k, &sc.end) {
        input_state.move_end();
    } else if shortcuts::matches_shortcut(&k, &sc.clear_line) {
        input_state.clear_line();
    } else if let KeyCode::Char(c) = k.code {
        // コントロールキーでない通常の文字入力のみ挿入する。
        if !k.modifiers.contains(KeyModifiers::CONTROL) {
            input_state.insert_char(c);
        }
    }

    Ok(false)
}

/// 入力ボックスのコールバックを適用する。
fn apply_input_callback(app: &mut App, callback_id: InputCallbackId, value: String) {
    match callback_id {
        InputCallbackId::LoginEmail => app.login_email = value,
        InputCallbackId::LoginPassword => app.login_password = value,
        InputCallbackId::SettingsBaseUrl => app.base_url = value,
        InputCallbackId::SettingsInputDir => app.input_dir = value,
        InputCallbackId::SettingsEmail => app.email = value,
    }
}

/// 設定画面用の編集バッファを設定値から再読み込みする。
fn reload_settings_buffers(app: &mut App) {
    app.base_url = app.cfg.api.base_url.clone();
    app.input_dir = app.cfg.upload.input_dir.clone();
    app.email = app.cfg.user.email.clone();
}
