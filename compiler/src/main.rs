//! kanadict 辞書コンパイラのメインエントリーポイント
//!
//! このモジュールは、語彙CSVからバイナリ辞書を構築するサブコマンドと、
//! 構築済みの辞書を検証するサブコマンドを提供します。

mod build;
mod verify;

use clap::Parser;
use thiserror::Error;

use crate::{build::BuildError, verify::VerifyError};

/// コマンドライン引数の構造体
///
/// `clap`を使用してコマンドライン引数をパースします。
#[derive(Parser, Debug)]
#[clap(name = "compile", version)]
struct Cli {
    /// 実行するサブコマンド
    #[clap(subcommand)]
    command: Command,
}

/// 利用可能なサブコマンド
#[derive(Parser, Debug)]
enum Command {
    /// 語彙CSVからバイナリ辞書を構築します
    ///
    /// ターゲットマップ、品詞テーブル、単語エントリバッファの3ファイルを出力します。
    Build(build::Args),

    /// バイナリ辞書を読み込んで整合性を検証します
    Verify(verify::Args),
}

/// コンパイラの実行中に発生する可能性のあるエラー
///
/// 各サブコマンドで発生したエラーをラップします。
#[derive(Debug, Error)]
pub enum CompileError {
    /// 辞書ビルド中のエラー
    #[error(transparent)]
    BuildError(#[from] BuildError),
    /// 辞書検証中のエラー
    #[error(transparent)]
    VerifyError(#[from] VerifyError),
}

fn main() -> Result<(), CompileError> {
    let cli = Cli::parse();
    match cli.command {
        Command::Build(args) => Ok(build::run(args)?),
        Command::Verify(args) => Ok(verify::run(args)?),
    }
}
