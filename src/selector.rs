//! アップロード先ストアの一覧と選択状態。

use crate::models::Store;

/// 取得済みストア一覧と現在の選択。
#[derive(Debug, Default)]
pub struct StoreSelector {
    /// サーバーから取得した一覧（初期化時のみ更新）。
    stores: Vec<Store>,
    /// 選択中のインデックス。未選択ならNone。
    selected: Option<usize>,
}

impl StoreSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// 一覧を差し替える。空でなければ先頭をデフォルト選択にする。
    pub fn set_stores(&mut self, stores: Vec<Store>) {
        self.selected = if stores.is_empty() { None } else { Some(0) };
        self.stores = stores;
    }

    /// 次のストアへ循環的に移動する。
    pub fn select_next(&mut self) {
        if let Some(i) = self.selected {
            self.selected = Some((i + 1) % self.stores.len());
        }
    }

    /// 前のストアへ循環的に移動する。
    pub fn select_prev(&mut self) {
        if let Some(i) = self.selected {
            self.selected = Some((i + self.stores.len() - 1) % self.stores.len());
        }
    }

    /// 選択中のストアを返す。
    pub fn current(&self) -> Option<&Store> {
        self.selected.and_then(|i| self.stores.get(i))
    }

    /// アップロードAPIに渡す文字列型のストアID。
    ///
    /// 有効な選択が無ければNoneを返し、アップロード開始の前提条件を
    /// 満たさない。
    pub fn selected_id(&self) -> Option<String> {
        self.current().map(|s| s.id.to_string())
    }

    pub fn stores(&self) -> &[Store] {
        &self.stores
    }

    /// 選択中のインデックス（描画用）。
    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_stores() -> Vec<Store> {
        vec![
            Store {
                id: 1,
                name: "A".into(),
            },
            Store {
                id: 2,
                name: "B".into(),
            },
        ]
    }

    #[test]
    fn test_first_store_selected_by_default() {
        // 一覧取得直後は先頭ストアが選択される。
        let mut sel = StoreSelector::new();
        sel.set_stores(two_stores());
        assert_eq!(sel.current().map(|s| s.name.as_str()), Some("A"));
        // アップロードAPIへは文字列型IDで渡る。
        assert_eq!(sel.selected_id().as_deref(), Some("1"));
    }

    #[test]
    fn test_empty_list_blocks_selection() {
        // 一覧が空なら選択IDは得られず、アップロードは前提条件で止まる。
        let mut sel = StoreSelector::new();
        sel.set_stores(vec![]);
        assert!(sel.current().is_none());
        assert!(sel.selected_id().is_none());
    }

    #[test]
    fn test_cycling_wraps_around() {
        // next/prevは端で循環する。
        let mut sel = StoreSelector::new();
        sel.set_stores(two_stores());
        sel.select_next();
        assert_eq!(sel.selected_id().as_deref(), Some("2"));
        sel.select_next();
        assert_eq!(sel.selected_id().as_deref(), Some("1"));
        sel.select_prev();
        assert_eq!(sel.selected_id().as_deref(), Some("2"));
    }
}
