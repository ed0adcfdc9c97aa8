// Services Layer
// ファイルI/Oと設定解決を担うサービス層

pub mod config_loader;
pub mod engine_config;
