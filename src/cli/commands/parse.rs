// parseコマンドハンドラー
//
// 接続URLを解析して構成要素を表示します。
// パスワードは --show-password が指定されない限りマスクします。

use crate::cli::commands::{render_output, CommandOutput};
use crate::cli::OutputFormat;
use crate::core::url::{Url, UrlComponents};
use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use tracing::debug;

/// parseコマンドの出力構造体
#[derive(Debug, Clone, Serialize)]
pub struct ParseOutput {
    /// 構成要素
    #[serde(flatten)]
    pub components: UrlComponents,
    /// 再構築したURL（パスワードはマスク）
    pub url: String,
}

impl CommandOutput for ParseOutput {
    fn to_text(&self) -> String {
        let c = &self.components;
        let or_none = |v: Option<&str>| v.map_or_else(|| "-".dimmed().to_string(), str::to_string);

        let mut lines = vec![
            format!("{:<10} {}", "url:".bold(), self.url),
            format!("{:<10} {}", "scheme:".bold(), c.scheme),
            format!("{:<10} {}", "backend:".bold(), c.backend),
            format!("{:<10} {}", "driver:".bold(), or_none(c.driver.as_deref())),
            format!("{:<10} {}", "username:".bold(), or_none(c.username.as_deref())),
            format!("{:<10} {}", "password:".bold(), or_none(c.password.as_deref())),
            format!("{:<10} {}", "host:".bold(), or_none(c.host.as_deref())),
            format!(
                "{:<10} {}",
                "port:".bold(),
                c.port.map_or_else(|| "-".dimmed().to_string(), |p| p.to_string())
            ),
            format!("{:<10} {}", "database:".bold(), or_none(c.database.as_deref())),
        ];

        if !c.query.is_empty() {
            lines.push("query:".bold().to_string());
            for (key, value) in &c.query {
                lines.push(format!("  {} = {}", key.cyan(), value));
            }
        }

        lines.join("\n")
    }
}

/// parseコマンドの入力パラメータ
#[derive(Debug, Clone)]
pub struct ParseCommand {
    /// 解析するURL
    pub url: String,
    /// パスワードを表示するかどうか
    pub show_password: bool,
    /// 出力フォーマット
    pub format: OutputFormat,
}

/// parseコマンドハンドラー
#[derive(Debug, Clone, Default)]
pub struct ParseCommandHandler {}

impl ParseCommandHandler {
    /// 新しいParseCommandHandlerを作成
    pub fn new() -> Self {
        Self {}
    }

    /// parseコマンドを実行
    pub fn execute(&self, command: &ParseCommand) -> Result<String> {
        let url = Url::parse(&command.url).with_context(|| "Failed to parse database URL")?;
        debug!(url = %url.to_masked_string(), "Parsed database URL");

        let output = ParseOutput {
            components: url.components(command.show_password),
            url: if command.show_password {
                url.to_string()
            } else {
                url.to_masked_string()
            },
        };

        render_output(&output, &command.format)
    }
}
