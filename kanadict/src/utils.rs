//! ユーティリティ関数と型変換トレイトを提供するモジュール
//!
//! - `FromU32`: u32からの型変換トレイト
//! - ひらがな・カタカナの変換
//! - CSV行の解析
//! - テスト用のマクロ

use csv_core::ReadFieldResult;

use crate::errors::{KanadictError, Result};

/// ひらがなとして扱う範囲の下限（この値を含まない）
const HIRAGANA_LOWER: u32 = 0x3040;

/// ひらがなとして扱う範囲の上限（この値を含まない）
const HIRAGANA_UPPER: u32 = 0x3097;

/// ひらがなから対応するカタカナへのオフセット
const HIRAGANA_TO_KATAKANA: u32 = 0x60;

/// 1バイトカナ符号化の基準コードポイント
pub(crate) const KANA_BASE: u32 = 0x30A0;

/// 1バイトカナ符号化で表現できる最大コードポイント
const KANA_LAST: u32 = 0x30FF;

/// u32から他の型への変換を提供するトレイト
pub trait FromU32 {
    /// u32値から実装型を生成する
    fn from_u32(src: u32) -> Self;
}

#[cfg(any(target_pointer_width = "32", target_pointer_width = "64"))]
impl FromU32 for usize {
    #[inline(always)]
    fn from_u32(src: u32) -> Self {
        // Since the pointer width is guaranteed to be 32 or 64,
        // the following process always succeeds.
        unsafe { Self::try_from(src).unwrap_unchecked() }
    }
}

/// 文字がひらがなであれば対応するカタカナに変換します。
///
/// `(0x3040, 0x3097)` の範囲の文字だけを `+0x60` シフトし、
/// それ以外の文字はそのまま返します。
#[inline(always)]
pub fn hiragana_to_katakana(ch: char) -> char {
    let cp = u32::from(ch);
    if HIRAGANA_LOWER < cp && cp < HIRAGANA_UPPER {
        // The shifted range (0x30A1..0x30F7) contains no surrogates.
        char::from_u32(cp + HIRAGANA_TO_KATAKANA).unwrap_or(ch)
    } else {
        ch
    }
}

/// 表層形のひらがなをすべてカタカナに変換した文字列を返します。
///
/// # 例
///
/// ```
/// # use kanadict::utils::katakana_reading;
/// let surface: Vec<char> = "あいう漢".chars().collect();
/// assert_eq!(katakana_reading(&surface), "アイウ漢");
/// ```
pub fn katakana_reading(surface: &[char]) -> String {
    surface.iter().copied().map(hiragana_to_katakana).collect()
}

/// 1バイトカナ符号化のバイトを文字に復元します。
#[inline(always)]
pub(crate) fn kana_from_byte(b: u8) -> char {
    char::from_u32(KANA_BASE + u32::from(b)).unwrap_or(char::REPLACEMENT_CHARACTER)
}

/// 文字を1バイトカナ符号化できる場合はそのバイトを返します。
#[inline(always)]
pub(crate) fn kana_to_byte(ch: char) -> Option<u8> {
    let cp = u32::from(ch);
    if (KANA_BASE..=KANA_LAST).contains(&cp) {
        u8::try_from(cp - KANA_BASE).ok()
    } else {
        None
    }
}

/// CSV形式の行を解析してフィールドのベクターに分割する
///
/// ダブルクォートで囲まれたフィールドや、フィールド内のカンマも正しく処理します。
///
/// # 引数
///
/// * `row` - 解析するCSV形式の文字列
/// * `name` - エラーメッセージに使用する入力名
///
/// # 例
///
/// ```
/// # use kanadict::utils::parse_csv_row;
/// let fields = parse_csv_row("名詞,\"1,2-ジクロロエタン\"", "lex.csv").unwrap();
/// assert_eq!(fields, vec!["名詞", "1,2-ジクロロエタン"]);
/// ```
pub fn parse_csv_row(row: &str, name: &'static str) -> Result<Vec<String>> {
    let mut fields = vec![];
    let mut rdr = csv_core::Reader::new();
    let mut bytes = row.as_bytes();
    let mut output = [0; 4096];
    loop {
        let (result, nin, nout) = rdr.read_field(bytes, &mut output);
        let end = match result {
            ReadFieldResult::InputEmpty | ReadFieldResult::End => true,
            ReadFieldResult::Field { .. } => false,
            ReadFieldResult::OutputFull => {
                return Err(KanadictError::invalid_format(name, "Field too large"));
            }
        };
        fields.push(std::str::from_utf8(&output[..nout])?.to_string());
        if end {
            break;
        }
        bytes = &bytes[nin..];
    }
    Ok(fields)
}

#[cfg(test)]
/// HashMapリテラルを簡潔に記述するためのマクロ
///
/// このマクロはテスト時のみ利用可能です。
macro_rules! hashmap {
    ( $($k:expr => $v:expr,)* ) => {
        {
            #[allow(unused_mut)]
            let mut h = hashbrown::HashMap::new();
            $(
                h.insert($k, $v);
            )*
            h
        }
    };
    ( $($k:expr => $v:expr),* ) => {
        hashmap![$( $k => $v, )*]
    };
}

#[cfg(test)]
pub(crate) use hashmap;
