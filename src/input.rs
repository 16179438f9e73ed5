//! TUI内での文字列入力コンポーネント（InputBox）。

use ratatui::{
    layout::Alignment,
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph},
};

/// InputBox入力状態
#[derive(Clone, Debug)]
pub struct InputBoxState {
    /// プロンプトメッセージ
    pub prompt: String,
    /// 現在の入力値
    pub value: String,
    /// カーソル位置（文字単位）
    pub cursor: usize,
    /// パスワード等の伏せ字表示
    pub mask: bool,
    /// 入力完了時のコールバック識別子
    pub callback_id: InputCallbackId,
}

/// 入力完了時のコールバック識別子
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputCallbackId {
    // Login画面用
    LoginEmail,
    LoginPassword,

    // Settings画面用
    SettingsBaseUrl,
    SettingsInputDir,
    SettingsEmail,
}

impl InputBoxState {
    /// 通常の入力ボックスを作る。
    pub fn new(prompt: impl Into<String>, value: impl Into<String>, id: InputCallbackId) -> Self {
        let value = value.into();
        let cursor = value.chars().count();
        Self {
            prompt: prompt.into(),
            value,
            cursor,
            mask: false,
            callback_id: id,
        }
    }

    /// 伏せ字表示の入力ボックスを作る（パスワード用）。
    pub fn masked(prompt: impl Into<String>, id: InputCallbackId) -> Self {
        Self {
            prompt: prompt.into(),
            value: String::new(),
            cursor: 0,
            mask: true,
            callback_id: id,
        }
    }

    /// 文字を挿入
    pub fn insert_char(&mut self, c: char) {
        // カーソル位置に文字を挿入して再構成する。
        let chars: Vec<char> = self.value.chars().collect();
        let mut new_chars = chars[..self.cursor].to_vec();
        new_chars.push(c);
        new_chars.extend_from_slice(&chars[self.cursor..]);
        self.value = new_chars.iter().collect();
        self.cursor += 1;
    }

    /// Backspace（カーソル前の文字を削除）
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            let chars: Vec<char> = self.value.chars().collect();
            self.value = chars
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != self.cursor - 1)
                .map(|(_, c)| c)
                .collect();
            self.cursor -= 1;
        }
    }

    /// Delete（カーソル位置の文字を削除）
    pub fn delete(&mut self) {
        let char_count = self.value.chars().count();
        if self.cursor < char_count {
            let chars: Vec<char> = self.value.chars().collect();
            self.value = chars
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != self.cursor)
                .map(|(_, c)| c)
                .collect();
        }
    }

    /// カーソルを左に移動
    pub fn move_left(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    /// カーソルを右に移動
    pub fn move_right(&mut self) {
        let char_count = self.value.chars().count();
        if self.cursor < char_count {
            self.cursor += 1;
        }
    }

    /// カーソルを先頭に移動
    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    /// カーソルを末尾に移動
    pub fn move_end(&mut self) {
        self.cursor = self.value.chars().count();
    }

    /// 行全体をクリア
    pub fn clear_line(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// 表示用の文字列（伏せ字なら*で置き換える）。
    fn display_value(&self) -> String {
        if self.mask {
            "*".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }
}

/// InputBoxをポップアップとして描画
pub fn render_input_box(f: &mut Frame, state: &InputBoxState) {
    // 中央に配置されたポップアップ領域を計算する。
    let popup_area = centered_popup(f.area(), 70, 7);

    // 既存の描画を消してポップアップ用の背景にする。
    f.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Input")
        .style(Style::default().bg(Color::DarkGray));
    f.render_widget(block, popup_area);

    // 内部レイアウト（プロンプト + 入力フィールド + ヘルプ）。
    let inner_layout = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1), // プロンプト
            Constraint::Length(1), // 入力フィールド
            Constraint::Length(1), // 空行
            Constraint::Length(1), // ヘルプ
        ])
        .split(popup_area);

    let prompt_widget = Paragraph::new(state.prompt.clone()).style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    );
    f.render_widget(prompt_widget, inner_layout[0]);

    // 横スクロール量を算出する（カーソルが表示幅を超えた場合）。
    let display_width = inner_layout[1].width as usize;
    let scroll_offset = if state.cursor > display_width.saturating_sub(2) {
        state.cursor.saturating_sub(display_width - 2)
    } else {
        0
    };

    // 表示値（伏せ字考慮）を可視範囲に切り出す。
    let display = state.display_value();
    let chars: Vec<char> = display.chars().collect();
    let visible_text: String = chars
        .iter()
        .skip(scroll_offset)
        .take(display_width)
        .collect();

    // カーソル位置を|で可視化する。
    let cursor_pos_in_visible = state.cursor.saturating_sub(scroll_offset);
    let visible_with_cursor = if cursor_pos_in_visible <= visible_text.chars().count() {
        let visible_chars: Vec<char> = visible_text.chars().collect();
        let before: String = visible_chars[..cursor_pos_in_visible.min(visible_chars.len())]
            .iter()
            .collect();
        let after: String = visible_chars[cursor_pos_in_visible.min(visible_chars.len())..]
            .iter()
            .collect();
        format!("{}|{}", before, after)
    } else {
        format!("{}|", visible_text)
    };

    let input_widget = Paragraph::new(visible_with_cursor).style(Style::default().fg(Color::Green));
    f.render_widget(input_widget, inner_layout[1]);

    let help = Paragraph::new("Enter=確定 | ESC=キャンセル | Ctrl+U=クリア")
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center);
    f.render_widget(help, inner_layout[3]);
}

/// 中央配置のポップアップ領域を計算
fn centered_popup(area: Rect, width_percent: u16, height: u16) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((area.height.saturating_sub(height)) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - width_percent) / 2),
            Constraint::Percentage(width_percent),
            Constraint::Percentage((100 - width_percent) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_backspace() {
        // 挿入と削除でカーソルが追従することを検証する。
        let mut s = InputBoxState::new("Email:", "", InputCallbackId::LoginEmail);
        s.insert_char('a');
        s.insert_char('b');
        assert_eq!(s.value, "ab");
        assert_eq!(s.cursor, 2);
        s.backspace();
        assert_eq!(s.value, "a");
        assert_eq!(s.cursor, 1);
    }

    #[test]
    fn test_masked_display_hides_value() {
        // 伏せ字の表示値は*のみで構成される。
        let mut s = InputBoxState::masked("Password:", InputCallbackId::LoginPassword);
        for c in "secret".chars() {
            s.insert_char(c);
        }
        assert_eq!(s.value, "secret");
        assert_eq!(s.display_value(), "******");
    }
}
