// dbconfライブラリのエントリーポイント
//
// モジュール構造:
// - cli: CLIレイヤー（ユーザー入力の受付とコマンドルーティング）
// - core: コアドメインロジック（URL解析、設定値の型変換、エンジンオプション検証）
// - services: 設定ファイルの読み込みとエンジン設定の解決

pub mod cli;
pub mod core;
pub mod services;

pub use crate::core::coerce::{coerce_config, ConfigMap, ConfigValue};
pub use crate::core::engine_options::EngineOptions;
pub use crate::core::error::{ConfigValueError, EngineConfigError, MalformedUrlError};
pub use crate::core::url::Url;
pub use crate::services::engine_config::engine_from_config;
