//! service.rs：
//! - 存檔服務。狀態以 JSON 字串存在鍵值儲存的 `state` 鍵下。
//! - 讀檔時先解析再驗證，任何錯誤都回報為存檔錯誤，不會回傳半成品。
use crate::board::Board;
use crate::error::{Error, Result};
use crate::state::GameState;
use std::collections::HashMap;
use std::path::PathBuf;

/// 存檔使用的鍵
pub const STATE_KEY: &str = "state";

/// 字串鍵值儲存
pub trait Storage {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<()>;
}

/// 只存在記憶體中的儲存，測試與單次執行使用
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    items: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// 每個鍵存成目錄下的 `<key>.json`
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

pub struct GameStateService<S: Storage> {
    storage: S,
}

impl<S: Storage> GameStateService<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn save(&mut self, state: &GameState) -> Result<()> {
        let json = serde_json::to_string(state)?;
        self.storage.set_item(STATE_KEY, &json)?;
        tracing::info!(level = state.current_level, "game saved");
        Ok(())
    }

    /// 讀取並驗證存檔
    pub fn load(&self, board: &Board) -> Result<GameState> {
        let json = self
            .storage
            .get_item(STATE_KEY)?
            .ok_or(Error::NoSavedState)?;
        let state: GameState = serde_json::from_str(&json)?;
        state.validate(board)?;
        tracing::info!(level = state.current_level, "game loaded");
        Ok(state)
    }
}
