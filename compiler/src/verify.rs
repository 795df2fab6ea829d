//! バイナリ辞書の検証モジュール
//!
//! 辞書をヒープ読み込みとメモリマップの両方で読み込み、
//! 全ての単語エントリがデコードでき、両者の内容が一致することを確認します。

use std::path::PathBuf;

use kanadict::{Dictionary, DictionaryPaths, KanadictError, LoadMode};

use clap::Parser;

/// 検証コマンドの引数
#[derive(Parser, Debug)]
#[clap(name = "verify", about = "A program to verify the binary dictionary.")]
pub struct Args {
    /// Path prefix of the dictionary files.
    #[clap(short = 'i', long)]
    prefix_in: PathBuf,
}

/// 検証中に発生する可能性のあるエラー
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    /// 辞書読み込みエラー
    #[error("Dictionary loading failed: {0}")]
    Kanadict(#[from] KanadictError),

    /// 読み込みモードによって内容が異なる
    #[error("Loaded dictionaries differ between read and mmap modes")]
    ModeMismatch,

    /// 左文脈IDが品詞テーブルの範囲外
    #[error("Word {word_id} refers to left id {left_id}, but the POS table has {num_pos} entries")]
    LeftIdOutOfRange {
        word_id: u32,
        left_id: u16,
        num_pos: usize,
    },
}

/// 検証コマンドを実行する
pub fn run(args: Args) -> Result<(), VerifyError> {
    let paths = DictionaryPaths::from_prefix(&args.prefix_in);

    eprintln!("Loading the dictionary...");
    let read = Dictionary::from_paths(&paths, LoadMode::Read)?;
    let mapped = Dictionary::from_paths(&paths, LoadMode::Mmap)?;

    if read.target_map().offsets() != mapped.target_map().offsets()
        || read.pos_table() != mapped.pos_table()
        || read.words().as_bytes() != mapped.words().as_bytes()
    {
        return Err(VerifyError::ModeMismatch);
    }

    let num_pos = read.pos_table().len();
    let mut num_words = 0;
    for (_, word_ids) in read.target_map().runs() {
        for &word_id in word_ids {
            let left_id = read.left_id(word_id);
            if usize::from(left_id) >= num_pos {
                return Err(VerifyError::LeftIdOutOfRange {
                    word_id: word_id.get(),
                    left_id,
                    num_pos,
                });
            }
            num_words += 1;
        }
    }

    println!(
        "OK: {} sources, {} words, {} POS entries, {} buffer bytes",
        read.num_sources(),
        num_words,
        num_pos,
        read.words().len(),
    );
    Ok(())
}
