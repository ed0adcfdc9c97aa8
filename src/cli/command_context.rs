// コマンド共通コンテキスト
//
// 設定ファイルのパス解決とセクション読み込みをCLI層で集約する。

use crate::core::naming::CONFIG_FILE;
use crate::services::config_loader::{ConfigLoader, ConfigSection};
use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};

/// CLIコマンド共通の実行コンテキスト
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub config_path: PathBuf,
    pub section_name: String,
    pub section: ConfigSection,
}

impl CommandContext {
    /// 設定ファイルのパスを解決する（未指定ならカレントディレクトリの既定ファイル）
    pub fn resolve_config_path(working_dir: &Path, config_path: Option<&Path>) -> PathBuf {
        match config_path {
            Some(path) if path.is_absolute() => path.to_path_buf(),
            Some(path) => working_dir.join(path),
            None => working_dir.join(CONFIG_FILE),
        }
    }

    /// 設定ファイルから指定セクションを読み込んでコンテキストを作成
    pub fn load(config_path: PathBuf, section_name: &str) -> Result<Self> {
        if !config_path.exists() {
            return Err(anyhow!(
                "Config file not found: {:?}. Pass --config to point at a configuration file.",
                config_path
            ));
        }

        let section = ConfigLoader::load_section(&config_path, section_name)
            .with_context(|| "Failed to read config file")?;

        Ok(Self {
            config_path,
            section_name: section_name.to_string(),
            section,
        })
    }
}
