//! バイナリ辞書のビルドモジュール
//!
//! このモジュールは、IPADIC形式の語彙CSVから
//! `<prefix>$targetMap.dat`、`<prefix>$posDict.dat`、`<prefix>$buffer.dat` を構築します。

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use kanadict::dictionary::RawWordEntry;
use kanadict::{DictionaryBuilder, DictionaryPaths, KanadictError};

use clap::Parser;

/// ビルドコマンドの引数
#[derive(Parser, Debug)]
#[clap(
    name = "build",
    about = "A program to build the binary dictionary."
)]
pub struct Args {
    /// Lexicon files (*.csv). Entries of all files are merged.
    #[clap(short = 'l', long, required = true, num_args = 1..)]
    lexicon_in: Vec<PathBuf>,

    /// Path prefix of the output files.
    #[clap(short = 'o', long)]
    prefix_out: PathBuf,

    /// File to which the source id of each surface is written as TSV.
    #[clap(short = 's', long)]
    surfaces_out: Option<PathBuf>,
}

/// ビルド処理中に発生する可能性のあるエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// 入出力エラー
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// 辞書構築エラー
    #[error("Dictionary building failed: {0}")]
    Kanadict(#[from] KanadictError),
}

/// ビルドコマンドを実行する
///
/// # エラー
///
/// ファイルの読み書きや辞書構築に失敗した場合、`BuildError`を返します。
pub fn run(args: Args) -> Result<(), BuildError> {
    println!("Compiling the dictionary...");
    let builder = build_dictionary(&args.lexicon_in)?;
    println!(
        "Compiled {} sources into {} bytes of word entries",
        builder.surfaces().len(),
        builder.dictionary().words().len(),
    );

    println!("Writing the dictionary...");
    let paths = DictionaryPaths::from_prefix(&args.prefix_out);
    builder.write_to_paths(&paths)?;

    if let Some(surfaces_out) = &args.surfaces_out {
        let mut wtr = BufWriter::new(File::create(surfaces_out)?);
        for (source_id, surface) in builder.surfaces().iter().enumerate() {
            writeln!(wtr, "{source_id}\t{surface}")?;
        }
        wtr.flush()?;
    }

    println!(
        "Successfully built the dictionary to {}",
        paths
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    Ok(())
}

/// 語彙ファイルを読み込み、辞書を構築する
///
/// CLIに依存しないコアのビルドロジックです。
pub fn build_dictionary(lexicon_in: &[PathBuf]) -> Result<DictionaryBuilder, BuildError> {
    let mut entries = vec![];
    for path in lexicon_in {
        entries.extend(read_lexicon(path)?);
    }
    Ok(DictionaryBuilder::from_entries(entries)?)
}

fn read_lexicon(path: &Path) -> Result<Vec<RawWordEntry>, BuildError> {
    eprintln!("Reading {}", path.display());
    Ok(DictionaryBuilder::parse_csv(File::open(path)?, "lex.csv")?)
}
