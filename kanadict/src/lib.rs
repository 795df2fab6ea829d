//! # kanadict
//!
//! kanadictは、日本語形態素解析のためのコンパクトな読み取り専用バイナリ辞書です。
//!
//! ## 概要
//!
//! 辞書はソースID（表層形の候補集合）から単語IDの列を引くターゲットマップ、
//! 左文脈IDから品詞情報を引く品詞テーブル、
//! そして単語IDの位置に各単語の属性を詰めた単語エントリバッファから構成されます。
//!
//! ## 主な機能
//!
//! - **コンパクトな単語エントリ**: 原形・読み・発音は導出できない場合にのみ格納
//! - **メモリマップ**: 単語エントリバッファのゼロコピー読み込み
//! - **辞書構築**: IPADIC形式の語彙CSVからのビルド
//!
//! ## 使用例
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use kanadict::{Dictionary, DictionaryBuilder};
//!
//! let lexicon_csv = "\
//! 東京,1293,1293,3003,名詞,固有名詞,地域,一般,*,*,東京,トウキョウ,トーキョー
//! いった,577,577,7000,動詞,自立,*,*,五段・カ行促音便,連用タ接続,いく,イッタ,イッタ";
//!
//! let mut target_map = vec![];
//! let mut pos = vec![];
//! let mut buffer = vec![];
//! DictionaryBuilder::from_reader(lexicon_csv.as_bytes())?
//!     .write(&mut target_map, &mut pos, &mut buffer)?;
//!
//! let dict = Dictionary::from_readers(&target_map[..], &pos[..], &buffer[..])?;
//! assert_eq!(dict.num_sources(), 2);
//!
//! // Sources are numbered in surface order: いった < 東京
//! let surface: Vec<char> = "いった".chars().collect();
//! let word_id = dict.candidates(0)[0];
//! assert_eq!(dict.part_of_speech(word_id), "動詞-自立");
//! assert_eq!(dict.base_form(word_id, &surface).as_deref(), Some("いく"));
//! assert_eq!(dict.reading(word_id, &surface), "イッタ");
//!
//! let surface: Vec<char> = "東京".chars().collect();
//! let word_id = dict.candidates(1)[0];
//! assert_eq!(dict.pronunciation(word_id, &surface), "トーキョー");
//! # Ok(())
//! # }
//! ```
#![cfg_attr(docsrs, feature(doc_cfg))]

#[cfg(not(any(target_pointer_width = "32", target_pointer_width = "64")))]
compile_error!("`target_pointer_width` must be 32 or 64");

/// 辞書データ構造とビルダー
pub mod dictionary;

/// エラー型の定義
pub mod errors;

/// 内部ユーティリティ関数
pub mod utils;


// Re-exports
pub use dictionary::{
    Dictionary, DictionaryBuilder, DictionaryPaths, LoadMode, TextField, WordEntry, WordId,
};
pub use errors::{KanadictError, Result};

/// このライブラリのバージョン番号
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
