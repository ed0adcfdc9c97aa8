// checkコマンドハンドラー
//
// 設定ファイルの1セクションからエンジンオプションを構築し、
// 方言・プール・接続引数の検証結果を表示します。

use crate::cli::command_context::CommandContext;
use crate::cli::commands::{render_output, CommandOutput};
use crate::cli::OutputFormat;
use crate::core::coerce::ConfigValue;
use crate::core::dialect::Dialect;
use crate::core::engine_options::{ConvertUnicode, Echo, EngineOptions, PoolOptions};
use crate::services::engine_config::engine_from_config;
use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::debug;

/// checkコマンドの出力構造体
#[derive(Debug, Clone, Serialize)]
pub struct CheckOutput {
    /// パスワードをマスクしたURL
    pub url: String,
    pub dialect: Dialect,
    pub driver: String,
    /// 実効ポート（URL未指定なら方言の既定値）
    pub port: Option<u16>,
    pub echo: Echo,
    pub echo_pool: Echo,
    pub convert_unicode: ConvertUnicode,
    pub pool: PoolOptions,
    pub dialect_args: BTreeMap<String, ConfigValue>,
    /// ドライバへ渡す接続引数（パスワードはマスク）
    pub connect_params: BTreeMap<String, ConfigValue>,
}

impl CheckOutput {
    fn from_engine(engine: &EngineOptions) -> Self {
        let mut connect_params = engine.connect_params();
        for key in ["password", "passwd"] {
            if let Some(value) = connect_params.get_mut(key) {
                *value = ConfigValue::from(crate::core::url::PASSWORD_MASK);
            }
        }

        Self {
            url: engine.url.to_masked_string(),
            dialect: engine.dialect,
            driver: engine
                .url
                .driver_name()
                .unwrap_or(engine.dialect.default_driver())
                .to_string(),
            port: engine.url.port().or(engine.dialect.default_port()),
            echo: engine.echo,
            echo_pool: engine.echo_pool,
            convert_unicode: engine.convert_unicode,
            pool: engine.pool.clone(),
            dialect_args: engine.dialect_args.clone(),
            connect_params,
        }
    }
}

impl CommandOutput for CheckOutput {
    fn to_text(&self) -> String {
        let mut lines = vec![
            format!("{} {}", "✓".green(), "Engine configuration is valid".green()),
            format!("  url:      {}", self.url),
            format!("  dialect:  {} ({})", self.dialect, self.driver),
            format!(
                "  port:     {}",
                self.port.map_or_else(|| "-".to_string(), |p| p.to_string())
            ),
            format!("  echo:     {:?} (pool: {:?})", self.echo, self.echo_pool),
            format!(
                "  pool:     {} (recycle: {})",
                self.pool.class, self.pool.recycle
            ),
        ];

        if let Some(queue) = &self.pool.queue {
            lines.push(format!(
                "            size: {}, max_overflow: {}, timeout: {}s",
                queue.pool_size, queue.max_overflow, queue.pool_timeout
            ));
        }

        if !self.dialect_args.is_empty() {
            lines.push("  dialect arguments:".to_string());
            for (key, value) in &self.dialect_args {
                lines.push(format!("    {} = {}", key.cyan(), value));
            }
        }

        lines.push("  connect parameters:".to_string());
        for (key, value) in &self.connect_params {
            lines.push(format!("    {} = {}", key.cyan(), value));
        }

        lines.join("\n")
    }
}

/// checkコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct CheckCommand {
    /// 設定ファイルのパス
    pub config_path: PathBuf,
    /// セクション名
    pub section: String,
    /// キープレフィックス
    pub prefix: String,
    /// 出力フォーマット
    pub format: OutputFormat,
}

/// checkコマンドハンドラー
#[derive(Debug, Clone, Default)]
pub struct CheckCommandHandler {}

impl CheckCommandHandler {
    /// 新しいCheckCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// checkコマンドを実行
    pub fn execute(&self, command: &CheckCommand) -> Result<String> {
        let context = CommandContext::load(command.config_path.clone(), &command.section)?;
        debug!(
            config = %context.config_path.display(),
            section = %context.section_name,
            "Checking engine configuration"
        );

        let engine = engine_from_config(&context.section, &command.prefix).with_context(|| {
            format!(
                "Invalid engine configuration in section '{}'",
                context.section_name
            )
        })?;

        render_output(&CheckOutput::from_engine(&engine), &command.format)
    }
}
