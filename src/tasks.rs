//! アップロードタスクのモデルと受理前フィルタ。

use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::models::{Order, ValidationError};

/// タスクのライフサイクル状態。
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TaskStatus {
    /// 受理済みで送信開始待ち。
    Pending,
    /// サーバーへ転送中。
    Uploading,
    /// 正常完了（終端状態）。
    Done,
    /// 失敗（終端状態）。
    Error,
}

impl TaskStatus {
    /// 終端状態かどうかを返す。
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Done | TaskStatus::Error)
    }
}

/// ファイル1件分のアップロード追跡レコード。
#[derive(Clone, Debug)]
pub struct UploadTask {
    /// 受理時に発行する安定ID。非同期更新のキーとして使う。
    pub id: Uuid,
    /// 送信元ファイルのパス。
    pub path: PathBuf,
    /// 一覧表示用のファイル名（受理時に固定）。
    pub display_name: String,
    /// 転送進捗（0〜100）。Uploading中のみ更新される。
    pub progress: u8,
    /// 現在の状態。
    pub status: TaskStatus,
    /// Doneのときのみ設定されるサーバー応答。
    pub result: Option<Order>,
    /// Errorのときのみ設定される失敗内容。
    pub error: Option<ValidationError>,
}

impl UploadTask {
    /// 受理直後（Pending・進捗0）のタスクを作る。
    pub fn new(path: PathBuf) -> Self {
        // ファイル名を表示用に取り出す。パス全体は送信時に使う。
        let display_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self {
            id: Uuid::new_v4(),
            path,
            display_name,
            progress: 0,
            status: TaskStatus::Pending,
            result: None,
            error: None,
        }
    }
}

/// 受理対象の拡張子かどうかを判定する。
///
/// サーバーが受け付けるのはCSV/XLS/XLSXのみ。拡張子が合わないものは
/// 受理前に弾き、無駄な送信を避ける。
pub fn is_asn_file(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => {
            let ext = ext.to_ascii_lowercase();
            ext == "csv" || ext == "xls" || ext == "xlsx"
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_task_starts_pending() {
        // 受理直後の初期状態を検証する。
        let t = UploadTask::new(PathBuf::from("/tmp/asn_plan.csv"));
        assert_eq!(t.status, TaskStatus::Pending);
        assert_eq!(t.progress, 0);
        assert_eq!(t.display_name, "asn_plan.csv");
        assert!(t.result.is_none());
        assert!(t.error.is_none());
    }

    #[test]
    fn test_is_asn_file_accepts_spreadsheets() {
        // 対象拡張子（大文字小文字問わず）を受理する。
        assert!(is_asn_file(Path::new("shipment.csv")));
        assert!(is_asn_file(Path::new("shipment.xls")));
        assert!(is_asn_file(Path::new("SHIPMENT.XLSX")));
    }

    #[test]
    fn test_is_asn_file_rejects_other_types() {
        // PDFや拡張子なしは受理しない。
        assert!(!is_asn_file(Path::new("shipment.pdf")));
        assert!(!is_asn_file(Path::new("shipment.txt")));
        assert!(!is_asn_file(Path::new("shipment")));
    }
}
