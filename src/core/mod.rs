// Core Domain
// URL解析、設定値の型変換、エンジンオプション検証の純粋なロジック

pub mod coerce;
pub mod dialect;
pub mod engine_options;
pub mod error;
pub mod naming;
pub mod url;
