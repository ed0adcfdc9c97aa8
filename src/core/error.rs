// エラー型定義
//
// ライブラリ全体で使用されるカスタムエラー型を提供します。
// thiserrorを使用して、MalformedUrlError, ConfigValueError, EngineConfigError を定義します。

use thiserror::Error;

/// 接続URLの解析エラー
///
/// 文字列が `scheme://[user[:password]@][host][:port]/[database][?query]`
/// の文法に一致しない場合に発生します。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Could not parse database URL from string '{input}': {reason}")]
pub struct MalformedUrlError {
    /// 解析対象の文字列
    pub input: String,
    /// 失敗理由
    pub reason: String,
}

impl MalformedUrlError {
    /// 新しい解析エラーを作成
    pub fn new(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

/// 設定値の期待型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedType {
    /// 整数
    Integer,
    /// 真偽値
    Boolean,
}

impl std::fmt::Display for ExpectedType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExpectedType::Integer => write!(f, "integer"),
            ExpectedType::Boolean => write!(f, "boolean"),
        }
    }
}

/// 設定値の変換エラー
///
/// スキーマで型が宣言されたキーの値を変換できない場合に発生します。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid value '{value}' for config key '{key}': expected {expected}")]
pub struct ConfigValueError {
    /// 設定キー（プレフィックス除去後）
    pub key: String,
    /// 変換できなかった値
    pub value: String,
    /// 期待される型
    pub expected: ExpectedType,
}

impl ConfigValueError {
    /// 新しい変換エラーを作成
    pub fn new(key: impl Into<String>, value: impl Into<String>, expected: ExpectedType) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            expected,
        }
    }
}

/// エンジン設定エラー
///
/// 型付き設定からエンジンオプションを構築する際の検証エラーを表現します。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineConfigError {
    /// Missing url
    #[error("Config key '{key}' is required")]
    MissingUrl {
        /// 期待されたキー（プレフィックス込み）
        key: String,
    },

    /// Malformed url
    #[error(transparent)]
    Url(#[from] MalformedUrlError),

    /// Invalid typed value
    #[error(transparent)]
    Value(#[from] ConfigValueError),

    /// Unknown dialect
    #[error("Can't load dialect for scheme '{scheme}'")]
    UnknownDialect {
        /// URLのスキーム
        scheme: String,
    },

    /// Argument not accepted by the dialect
    #[error("Invalid argument '{argument}' sent to create_engine() using dialect {dialect}")]
    UnsupportedArgument {
        /// 方言名
        dialect: String,
        /// 不正な引数名
        argument: String,
    },

    /// Pool argument not accepted by the pool class
    #[error("Argument '{argument}' is not supported by pool class {pool_class}")]
    IncompatiblePoolArgument {
        /// プールクラス名
        pool_class: String,
        /// 不正な引数名
        argument: String,
    },

    /// Unknown pool class name
    #[error("Unknown pool class '{name}'")]
    InvalidPoolClass {
        /// 指定されたプールクラス名
        name: String,
    },
}

impl EngineConfigError {
    /// URL欠落エラーかどうか
    pub fn is_missing_url(&self) -> bool {
        matches!(self, EngineConfigError::MissingUrl { .. })
    }

    /// URL解析エラーかどうか
    pub fn is_url(&self) -> bool {
        matches!(self, EngineConfigError::Url(_))
    }

    /// 値変換エラーかどうか
    pub fn is_value(&self) -> bool {
        matches!(self, EngineConfigError::Value(_))
    }

    /// 未知の方言エラーかどうか
    pub fn is_unknown_dialect(&self) -> bool {
        matches!(self, EngineConfigError::UnknownDialect { .. })
    }

    /// 未対応引数エラーかどうか
    pub fn is_unsupported_argument(&self) -> bool {
        matches!(self, EngineConfigError::UnsupportedArgument { .. })
    }

    /// プール引数の不整合エラーかどうか
    pub fn is_incompatible_pool_argument(&self) -> bool {
        matches!(self, EngineConfigError::IncompatiblePoolArgument { .. })
    }

    /// 不正な引数名を取得
    pub fn argument(&self) -> Option<&str> {
        match self {
            EngineConfigError::UnsupportedArgument { argument, .. }
            | EngineConfigError::IncompatiblePoolArgument { argument, .. } => Some(argument),
            _ => None,
        }
    }
}
