//! ショートカット設定の管理。

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// ショートカット設定の全体。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shortcuts {
    pub login: LoginShortcuts,
    pub main: MainShortcuts,
    pub pick_files: PickFilesShortcuts,
    pub detail: DetailShortcuts,
    pub settings: SettingsShortcuts,
    pub input_box: InputBoxShortcuts,
}

/// ログイン画面のショートカット。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginShortcuts {
    pub quit: Vec<String>,
    pub email: Vec<String>,
    pub password: Vec<String>,
    pub submit: Vec<String>,
}

/// メイン画面のショートカット。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MainShortcuts {
    pub quit: Vec<String>,
    pub pick_files: Vec<String>,
    pub reload_stores: Vec<String>,
    pub next_store: Vec<String>,
    pub prev_store: Vec<String>,
    pub detail: Vec<String>,
    pub settings: Vec<String>,
    pub logout: Vec<String>,
    pub down: Vec<String>,
    pub up: Vec<String>,
}

/// ファイル選択画面のショートカット。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickFilesShortcuts {
    pub cancel: Vec<String>,
    pub toggle: Vec<String>,
    pub toggle_all: Vec<String>,
    pub upload: Vec<String>,
    pub down: Vec<String>,
    pub up: Vec<String>,
}

/// 詳細画面のショートカット。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailShortcuts {
    pub back: Vec<String>,
}

/// 設定画面のショートカット。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsShortcuts {
    pub cancel: Vec<String>,
    pub save: Vec<String>,
    pub base_url: Vec<String>,
    pub input_dir: Vec<String>,
    pub email: Vec<String>,
}

/// InputBoxのショートカット。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputBoxShortcuts {
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
    pub backspace: Vec<String>,
    pub delete: Vec<String>,
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub home: Vec<String>,
    pub end: Vec<String>,
    pub clear_line: Vec<String>,
}

impl Shortcuts {
    /// TOMLから読み込み、無ければデフォルトを返す。
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            // 既存ファイルを読み込んでパースする。
            let content = std::fs::read_to_string(path)?;
            let shortcuts: Shortcuts = toml::from_str(&content)?;
            Ok(shortcuts)
        } else {
            // 未作成の場合は既定値を利用する。
            Ok(Self::default())
        }
    }

    /// TOMLとして保存する。
    #[allow(dead_code)]
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl Default for Shortcuts {
    fn default() -> Self {
        Self {
            login: LoginShortcuts {
                quit: vec!["q".into()],
                email: vec!["e".into()],
                password: vec!["p".into()],
                submit: vec!["Enter".into()],
            },
            main: MainShortcuts {
                quit: vec!["q".into()],
                pick_files: vec!["u".into()],
                reload_stores: vec!["r".into()],
                next_store: vec!["s".into(), "Right".into()],
                prev_store: vec!["S".into(), "Left".into()],
                detail: vec!["Enter".into()],
                settings: vec!["t".into()],
                logout: vec!["L".into()],
                down: vec!["Down".into(), "j".into()],
                up: vec!["Up".into(), "k".into()],
            },
            pick_files: PickFilesShortcuts {
                cancel: vec!["Esc".into()],
                toggle: vec!["Space".into()],
                toggle_all: vec!["a".into()],
                upload: vec!["Enter".into()],
                down: vec!["Down".into(), "j".into()],
                up: vec!["Up".into(), "k".into()],
            },
            detail: DetailShortcuts {
                back: vec!["Esc".into(), "q".into()],
            },
            settings: SettingsShortcuts {
                cancel: vec!["Esc".into()],
                save: vec!["Enter".into()],
                base_url: vec!["b".into()],
                input_dir: vec!["i".into()],
                email: vec!["e".into()],
            },
            input_box: InputBoxShortcuts {
                confirm: vec!["Enter".into()],
                cancel: vec!["Esc".into()],
                backspace: vec!["Backspace".into()],
                delete: vec!["Delete".into()],
                left: vec!["Left".into()],
                right: vec!["Right".into()],
                home: vec!["Home".into()],
                end: vec!["End".into()],
                clear_line: vec!["Ctrl+u".into()],
            },
        }
    }
}

/// KeyEventがいずれかのショートカット文字列と一致するか判定する。
pub fn matches_shortcut(key: &KeyEvent, shortcuts: &[String]) -> bool {
    shortcuts.iter().any(|s| matches_single_shortcut(key, s))
}

/// KeyEventが単一のショートカット文字列と一致するか判定する。
fn matches_single_shortcut(key: &KeyEvent, shortcut: &str) -> bool {
    // ショートカット文字列を分解する（例: "Ctrl+u", "a", "Enter"）。
    let parts: Vec<&str> = shortcut.split('+').collect();

    let (modifiers_str, key_str) = if parts.len() > 1 {
        (&parts[0..parts.len() - 1], parts[parts.len() - 1])
    } else {
        (&[][..], parts[0])
    };

    // 修飾キーを解析して期待値を作る。
    let mut expected_modifiers = KeyModifiers::empty();
    for modifier in modifiers_str {
        match *modifier {
            "Ctrl" | "ctrl" => expected_modifiers |= KeyModifiers::CONTROL,
            "Alt" | "alt" => expected_modifiers |= KeyModifiers::ALT,
            "Shift" | "shift" => expected_modifiers |= KeyModifiers::SHIFT,
            _ => return false,
        }
    }

    // 大文字1文字のショートカットはShift入力で届くため修飾を無視する。
    let single_upper =
        key_str.len() == 1 && key_str.chars().next().is_some_and(|c| c.is_uppercase());
    if !single_upper && key.modifiers != expected_modifiers {
        return false;
    }

    // キーコードの種別ごとに一致判定を行う。
    match key_str {
        "Enter" | "enter" => key.code == KeyCode::Enter,
        "Esc" | "esc" => key.code == KeyCode::Esc,
        "Tab" | "tab" => key.code == KeyCode::Tab,
        "Space" | "space" => key.code == KeyCode::Char(' '),
        "Backspace" | "backspace" => key.code == KeyCode::Backspace,
        "Delete" | "delete" => key.code == KeyCode::Delete,
        "Up" | "up" => key.code == KeyCode::Up,
        "Down" | "down" => key.code == KeyCode::Down,
        "Left" | "left" => key.code == KeyCode::Left,
        "Right" | "right" => key.code == KeyCode::Right,
        "Home" | "home" => key.code == KeyCode::Home,
        "End" | "end" => key.code == KeyCode::End,
        s if s.len() == 1 => {
            if let Some(c) = s.chars().next() {
                key.code == KeyCode::Char(c)
            } else {
                false
            }
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_shortcut_simple_char() {
        // 単一文字の一致判定を検証する。
        let key = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::empty());
        assert!(matches_shortcut(&key, &[String::from("q")]));
        assert!(!matches_shortcut(&key, &[String::from("w")]));
    }

    #[test]
    fn test_matches_shortcut_special_key() {
        // 特殊キーの一致判定を検証する。
        let key = KeyEvent::new(KeyCode::Enter, KeyModifiers::empty());
        assert!(matches_shortcut(&key, &[String::from("Enter")]));
        assert!(!matches_shortcut(&key, &[String::from("Esc")]));
    }

    #[test]
    fn test_matches_shortcut_with_modifier() {
        // 修飾キー付きの一致判定を検証する。
        let key = KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL);
        assert!(matches_shortcut(&key, &[String::from("Ctrl+u")]));
        assert!(!matches_shortcut(&key, &[String::from("u")]));
    }

    #[test]
    fn test_matches_shortcut_space_key() {
        // スペースキーの一致判定を検証する。
        let key = KeyEvent::new(KeyCode::Char(' '), KeyModifiers::empty());
        assert!(matches_shortcut(&key, &[String::from("Space")]));
    }

    #[test]
    fn test_matches_shortcut_uppercase_char() {
        // 大文字ショートカットはShift修飾が付いていても一致する。
        let key = KeyEvent::new(KeyCode::Char('L'), KeyModifiers::SHIFT);
        assert!(matches_shortcut(&key, &[String::from("L")]));
    }

    #[test]
    fn test_matches_shortcut_multiple_keys() {
        // 複数キーバインドの一致判定を検証する。
        let key_up = KeyEvent::new(KeyCode::Up, KeyModifiers::empty());
        let key_k = KeyEvent::new(KeyCode::Char('k'), KeyModifiers::empty());
        let shortcuts = vec![String::from("Up"), String::from("k")];

        assert!(matches_shortcut(&key_up, &shortcuts));
        assert!(matches_shortcut(&key_k, &shortcuts));

        let key_j = KeyEvent::new(KeyCode::Char('j'), KeyModifiers::empty());
        assert!(!matches_shortcut(&key_j, &shortcuts));
    }
}
