//! 画面遷移用のUI状態と画面種別。

/// TUIで現在表示中の画面。
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Screen {
    /// ログイン画面。
    Login,
    /// メインのタスク一覧画面。
    Main,
    /// 入力ディレクトリのファイル選択画面。
    PickFiles,
    /// 選択タスクの結果/エラー詳細画面。
    Detail,
    /// 設定編集画面。
    Settings,
}

/// 描画側と共有するUI状態。
#[derive(Clone, Debug)]
pub struct UiState {
    /// 現在の画面。
    pub screen: Screen,
    /// タスク一覧の選択行。
    pub selected: usize,
    /// ファイル選択画面の選択行。
    pub file_selected: usize,
    /// 右側パネルに表示するログ。
    pub log: Vec<String>,
    /// 画面下部のステータス文言。
    pub status: String,
    /// エラーメッセージ（強調表示用）。
    pub error: Option<String>,
}

impl UiState {
    /// 初期画面を指定してUI状態を作る。
    pub fn new(screen: Screen) -> Self {
        Self {
            screen,
            selected: 0,
            file_selected: 0,
            log: vec![],
            status: "Ready".into(),
            error: None,
        }
    }
}
