//! レイアウト計算のヘルパー関数

use ratatui::prelude::*;

/// メイン画面の縦方向3領域
pub struct MainLayout {
    /// タスクテーブル + INFOパネルの領域
    pub body: Rect,
    /// HELPバーの領域
    pub help_bar: Rect,
    /// STATUSバーの領域
    pub status_bar: Rect,
}

/// ボディ部の2領域（タスクテーブル + INFOパネル）
pub struct BodyLayout {
    /// タスクテーブルの領域
    pub tasks_table: Rect,
    /// INFOパネルの領域
    pub info_panel: Rect,
}

/// メイン画面を3領域に分割（Body + HELP + STATUS）
pub fn create_main_layout(area: Rect) -> MainLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // Body（タスクテーブル + INFOパネル）
            Constraint::Length(3), // HELPバー
            Constraint::Length(3), // STATUSバー
        ])
        .split(area);

    MainLayout {
        body: chunks[0],
        help_bar: chunks[1],
        status_bar: chunks[2],
    }
}

/// Body領域を2分割（タスクテーブル 60% + INFOパネル 40%）
pub fn create_body_layout(area: Rect) -> BodyLayout {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(60), // タスクテーブル
            Constraint::Percentage(40), // INFOパネル
        ])
        .split(area);

    BodyLayout {
        tasks_table: chunks[0],
        info_panel: chunks[1],
    }
}
