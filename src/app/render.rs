//! TUI描画関連の関数。

use ratatui::{
    Frame,
    prelude::*,
    widgets::{Block, Borders, Paragraph, Row, Table, Wrap},
};

use crate::{
    events::Screen,
    input, layout,
    shortcuts::Shortcuts,
    tasks::{TaskStatus, UploadTask},
};

use super::App;

/// 画面全体のレイアウトを描画する。
pub fn draw(f: &mut Frame, app: &App) {
    match app.ui.screen {
        Screen::Login => draw_login_screen(f, app),
        Screen::Detail => draw_detail_screen(f, app),
        Screen::PickFiles => draw_pick_files_screen(f, app),
        Screen::Main | Screen::Settings => draw_main_screen(f, app),
    }

    // 入力ボックスが開いていれば重ねて描画する。
    if let Some(input_state) = &app.input_box {
        input::render_input_box(f, input_state);
    }
}

/// メイン/設定画面を描画する。
fn draw_main_screen(f: &mut Frame, app: &App) {
    // メインレイアウト（Body + HELP + STATUS）を作る。
    let main_layout = layout::create_main_layout(f.area());
    let body_layout = layout::create_body_layout(main_layout.body);

    // タスク一覧からテーブル行を組み立てる。
    let rows = app.tracker.tasks().iter().enumerate().map(|(i, t)| {
        Row::new(vec![
            format!("{}", i + 1),
            t.display_name.clone(),
            status_str(t),
            progress_str(t),
        ])
    });

    // タスクテーブルのウィジェットを構築する。
    let table = Table::new(
        rows,
        [
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(10),
            Constraint::Length(18),
        ],
    )
    .block(Block::default().borders(Borders::ALL).title("UPLOADS"))
    .header(Row::new(vec!["#", "file", "status", "progress"]).bold())
    .row_highlight_style(
        Style::default()
            .bg(Color::Rgb(29, 136, 255)) // 青色の背景
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD),
    );

    // 選択中の行をハイライトする。
    let mut table_state = ratatui::widgets::TableState::default();
    if !app.tracker.tasks().is_empty() {
        table_state.select(Some(app.ui.selected));
    }
    f.render_stateful_widget(table, body_layout.tasks_table, &mut table_state);

    // 右パネル：設定画面では編集バッファ、通常はストア/ログ情報。
    let info_text = if app.ui.screen == Screen::Settings {
        build_settings_info_text(app)
    } else {
        build_main_info_text(app)
    };

    let info_panel = Paragraph::new(info_text)
        .block(Block::default().borders(Borders::ALL).title("INFO"))
        .wrap(Wrap { trim: true });
    f.render_widget(info_panel, body_layout.info_panel);

    // HELPバー（画面ごとのショートカット）を描画する。
    let help_text = get_help_text(&app.ui.screen, &app.shortcuts);
    let help_bar = Paragraph::new(help_text)
        .block(Block::default().borders(Borders::ALL).title("HELP"))
        .wrap(Wrap { trim: true });
    f.render_widget(help_bar, main_layout.help_bar);

    // STATUSバー（画面名・タスク情報・エラー）を描画する。
    let status_bar = build_status_bar(app);
    f.render_widget(status_bar, main_layout.status_bar);
}

/// ログイン画面を描画する。
fn draw_login_screen(f: &mut Frame, app: &App) {
    // 余白込みで縦方向に3分割する。
    let outer_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(25), // 上部マージン
            Constraint::Min(10),        // 本文領域
            Constraint::Percentage(25), // 下部マージン
        ])
        .split(f.area());

    // パスワードは文字数だけ伏せ字で示す。
    let masked: String = "*".repeat(app.login_password.chars().count());
    let content_text = format!(
        "=== ASN Upload — Sign in ===\n\nEmail:    {}\nPassword: {}\n\nPress 'e' to edit email, 'p' to edit password,\nEnter to sign in, 'q' to quit.",
        if app.login_email.is_empty() {
            "(not set)"
        } else {
            &app.login_email
        },
        if masked.is_empty() { "(not set)" } else { &masked },
    );

    let content = Paragraph::new(content_text)
        .block(Block::default().borders(Borders::ALL).title("Login"))
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });
    f.render_widget(content, outer_layout[1]);

    // エラーがあれば下部に表示する。
    if let Some(err) = &app.ui.error {
        let error_layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(3)])
            .split(f.area());

        let error_text = Paragraph::new(format!("ERROR: {}", err))
            .block(Block::default().borders(Borders::ALL).title("Error"))
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true });
        f.render_widget(error_text, error_layout[1]);
    }
}

/// ファイル選択画面を描画する。
fn draw_pick_files_screen(f: &mut Frame, app: &App) {
    let main_layout = layout::create_main_layout(f.area());

    // マーク状態付きでファイル一覧の行を作る。
    let rows = app.pick_entries.iter().enumerate().map(|(i, e)| {
        let mark = if e.marked { "[x]" } else { "[ ]" };
        Row::new(vec![
            format!("{}", i + 1),
            mark.to_string(),
            e.path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| e.path.to_string_lossy().into_owned()),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(10),
        ],
    )
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("FILES ({})", app.cfg.upload.input_dir)),
    )
    .header(Row::new(vec!["#", "sel", "file"]).bold())
    .row_highlight_style(
        Style::default()
            .bg(Color::Rgb(29, 136, 255))
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD),
    );

    let mut table_state = ratatui::widgets::TableState::default();
    if !app.pick_entries.is_empty() {
        table_state.select(Some(app.ui.file_selected));
    }
    f.render_stateful_widget(table, main_layout.body, &mut table_state);

    let help_text = get_help_text(&app.ui.screen, &app.shortcuts);
    let help_bar = Paragraph::new(help_text)
        .block(Block::default().borders(Borders::ALL).title("HELP"))
        .wrap(Wrap { trim: true });
    f.render_widget(help_bar, main_layout.help_bar);

    f.render_widget(build_status_bar(app), main_layout.status_bar);
}

/// 詳細画面（結果またはエラー）を描画する。
fn draw_detail_screen(f: &mut Frame, app: &App) {
    let main_layout = layout::create_main_layout(f.area());

    let Some(task) = app.tracker.tasks().get(app.ui.selected) else {
        let empty = Paragraph::new("No task selected")
            .block(Block::default().borders(Borders::ALL).title("DETAIL"));
        f.render_widget(empty, main_layout.body);
        return;
    };

    match (&task.result, &task.error) {
        (Some(order), _) => {
            // 結果の概要と明細テーブルを縦に並べる。
            let detail_layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(8), Constraint::Min(3)])
                .split(main_layout.body);

            let summary = format!(
                "File: {}\nASN: {}  Status: {}\nStore: {}  Cases: {}  Quantity: {}\nCost: {}  Paid: {}\nCreated: {}",
                task.display_name,
                order.asn_id,
                order.status,
                order.store_id,
                order.cases,
                order.quantity,
                order.cost,
                order.paid,
                fmt_timestamp(&order.created_at),
            );
            let summary_panel = Paragraph::new(summary)
                .block(Block::default().borders(Borders::ALL).title("ORDER"))
                .wrap(Wrap { trim: true });
            f.render_widget(summary_panel, detail_layout[0]);

            // 明細行（SKU・数量・金額など）を組み立てる。
            let rows = order.items.iter().map(|item| {
                Row::new(vec![
                    item.sku.clone(),
                    item.name.clone(),
                    item.brand.clone(),
                    item.quantity.to_string(),
                    format!("${:.2}", item.price),
                    format!("${:.2}", item.sub_total),
                    item.batch_lot.clone(),
                ])
            });
            let items_table = Table::new(
                rows,
                [
                    Constraint::Length(12),
                    Constraint::Min(10),
                    Constraint::Length(12),
                    Constraint::Length(5),
                    Constraint::Length(9),
                    Constraint::Length(10),
                    Constraint::Length(10),
                ],
            )
            .block(Block::default().borders(Borders::ALL).title("ITEMS"))
            .header(
                Row::new(vec!["sku", "name", "brand", "qty", "price", "subtotal", "batch"]).bold(),
            );
            f.render_widget(items_table, detail_layout[1]);
        }
        (None, Some(error)) => {
            // 検証エラーの内容を列挙する。
            let mut lines = vec![
                format!("Error in {}", task.display_name),
                String::new(),
                error.message.clone(),
            ];
            if !error.details.is_empty() {
                lines.push(String::new());
                lines.push("Validation details:".into());
                for d in &error.details {
                    lines.push(format!("  {}: {}", d.field, d.description));
                }
            }
            let error_panel = Paragraph::new(lines.join("\n"))
                .block(Block::default().borders(Borders::ALL).title("ERROR"))
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true });
            f.render_widget(error_panel, main_layout.body);
        }
        (None, None) => {
            // まだ終端状態に達していないタスク。
            let text = format!(
                "{}\n\nStatus: {}  Progress: {}%",
                task.display_name,
                status_str(task),
                task.progress
            );
            let pending_panel = Paragraph::new(text)
                .block(Block::default().borders(Borders::ALL).title("DETAIL"))
                .wrap(Wrap { trim: true });
            f.render_widget(pending_panel, main_layout.body);
        }
    }

    let help_text = get_help_text(&app.ui.screen, &app.shortcuts);
    let help_bar = Paragraph::new(help_text)
        .block(Block::default().borders(Borders::ALL).title("HELP"))
        .wrap(Wrap { trim: true });
    f.render_widget(help_bar, main_layout.help_bar);

    f.render_widget(build_status_bar(app), main_layout.status_bar);
}

/// メイン画面用の情報テキストを構築する。
fn build_main_info_text(app: &App) -> String {
    // ストア一覧に選択マークを付ける。
    let mut lines = vec!["Stores:".to_string()];
    if app.selector.stores().is_empty() {
        lines.push("  (none loaded)".into());
    } else {
        for (i, store) in app.selector.stores().iter().enumerate() {
            let marker = if Some(i) == app.selector.selected_index() {
                "→"
            } else {
                " "
            };
            lines.push(format!("{} [{}] {}", marker, store.id, store.name));
        }
    }

    lines.push(String::new());
    lines.push(format!("ASN dir: {}", app.cfg.upload.input_dir));
    lines.push(format!("API: {}", app.cfg.api.base_url));
    lines.push(String::new());

    // 直近に作成されたオーダーを載せる。
    lines.push(format!("Orders created: {}", app.tracker.results().len()));
    for order in app.tracker.results().iter().rev().take(4).rev() {
        lines.push(format!("  {} ({})", order.asn_id, order.status));
    }
    lines.push(String::new());

    // 直近のログを数行だけ表示する。
    lines.push("Log:".into());
    for entry in app.ui.log.iter().rev().take(8).rev() {
        lines.push(entry.clone());
    }
    lines.join("\n")
}

/// 設定画面用の情報テキストを構築する。
fn build_settings_info_text(app: &App) -> String {
    format!(
        "Settings (unsaved edits shown)\n\n[b] Base URL: {}\n[i] ASN dir:  {}\n[e] Email:    {}\n\nEnter=save  Esc=cancel",
        app.base_url, app.input_dir, app.email
    )
}

/// ステータスバーを構築する。
fn build_status_bar(app: &App) -> Paragraph<'static> {
    let screen_name = match app.ui.screen {
        Screen::Login => "Login",
        Screen::Main => "Main",
        Screen::PickFiles => "Files",
        Screen::Detail => "Detail",
        Screen::Settings => "Settings",
    };

    // タスク件数と完了数を集計する。
    let task_info = format!(
        "Tasks: {} total, {} done, {} active",
        app.tracker.tasks().len(),
        app.tracker.done_count(),
        app.tracker.active_count(),
    );

    // エラーの有無でステータス文字列を切り替える。
    let status_text = if let Some(err) = &app.ui.error {
        format!("[{}] {} | ERROR: {}", screen_name, task_info, err)
    } else {
        format!("[{}] {} | {}", screen_name, task_info, app.ui.status)
    };

    let mut status_bar = Paragraph::new(status_text)
        .block(Block::default().borders(Borders::ALL).title("STATUS"))
        .wrap(Wrap { trim: true });

    // エラー時は赤色で強調表示する。
    if app.ui.error.is_some() {
        status_bar = status_bar.style(Style::default().fg(Color::Red));
    }

    status_bar
}

/// 現在画面に応じたヘルプ文字列を返す。
fn get_help_text(screen: &Screen, shortcuts: &Shortcuts) -> String {
    match screen {
        Screen::Login => format!(
            "{}: email | {}: password | {}: sign in | {}: quit",
            format_keys(&shortcuts.login.email),
            format_keys(&shortcuts.login.password),
            format_keys(&shortcuts.login.submit),
            format_keys(&shortcuts.login.quit)
        ),
        Screen::Main => format!(
            "{}: upload files | {}: reload stores | {}/{}: store | {}: detail | {}: settings | {}: logout | {}: quit",
            format_keys(&shortcuts.main.pick_files),
            format_keys(&shortcuts.main.reload_stores),
            format_keys(&shortcuts.main.next_store),
            format_keys(&shortcuts.main.prev_store),
            format_keys(&shortcuts.main.detail),
            format_keys(&shortcuts.main.settings),
            format_keys(&shortcuts.main.logout),
            format_keys(&shortcuts.main.quit)
        ),
        Screen::PickFiles => format!(
            "{}: toggle | {}: toggle all | {}: upload | {}: cancel",
            format_keys(&shortcuts.pick_files.toggle),
            format_keys(&shortcuts.pick_files.toggle_all),
            format_keys(&shortcuts.pick_files.upload),
            format_keys(&shortcuts.pick_files.cancel)
        ),
        Screen::Detail => format!("{}: back", format_keys(&shortcuts.detail.back)),
        Screen::Settings => format!(
            "{}: base URL | {}: ASN dir | {}: email | {}: save | {}: cancel",
            format_keys(&shortcuts.settings.base_url),
            format_keys(&shortcuts.settings.input_dir),
            format_keys(&shortcuts.settings.email),
            format_keys(&shortcuts.settings.save),
            format_keys(&shortcuts.settings.cancel)
        ),
    }
}

/// ショートカットキーの配列を表示用文字列に変換する。
fn format_keys(keys: &[String]) -> String {
    keys.join("/")
}

/// タスク状態を一覧表示用の短いラベルへ変換する。
fn status_str(t: &UploadTask) -> String {
    match t.status {
        TaskStatus::Pending => "Pending".into(),
        TaskStatus::Uploading => "Uploading".into(),
        TaskStatus::Done => "Done".into(),
        TaskStatus::Error => "Error".into(),
    }
}

/// 進捗セルの表示文字列を作る。
fn progress_str(t: &UploadTask) -> String {
    match t.status {
        TaskStatus::Done => "100% ✅".into(),
        TaskStatus::Error => format!("{}% ❌", t.progress),
        _ => format!("{}%", t.progress),
    }
}

/// サーバーのタイムスタンプを表示用に整形する。
fn fmt_timestamp(raw: &str) -> String {
    match chrono::DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        // パースできない形式はそのまま表示する。
        Err(_) => raw.to_string(),
    }
}
