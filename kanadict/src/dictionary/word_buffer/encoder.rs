//! 単語エントリの符号化
//!
//! [`WordBuffer`](super::WordBuffer) が読む形式で単語エントリを書き込みます。

use crate::dictionary::builder::RawWordEntry;
use crate::dictionary::word_buffer::{
    FLAG_BITS, HAS_BASEFORM, HAS_PRONUNCIATION, HAS_READING, WordBuffer,
};
use crate::dictionary::word_idx::WordId;
use crate::errors::{KanadictError, Result};
use crate::utils;

/// 左文脈IDとして格納できる最大値（13ビット）
pub const MAX_LEFT_ID: u16 = (1 << (16 - FLAG_BITS)) - 1;

const MAX_NIBBLE: usize = 0xF;
const MAX_TEXT_LEN: usize = 0x7F;

/// 単語エントリバッファを構築するビルダー
#[derive(Default)]
pub struct WordBufferBuilder {
    data: Vec<u8>,
}

impl WordBufferBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 書き込み済みのバイト数を返します。
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 単語エントリを追加し、その単語IDを返します。
    ///
    /// 原形・読み・発音は、それぞれ表層形・カタカナ化した表層形・読みと
    /// 異なる場合にのみ格納されます。
    ///
    /// # エラー
    ///
    /// 以下の場合にエラーを返します。
    /// - 左文脈IDと右文脈IDが異なる、または左文脈IDが13ビットを超える場合
    /// - 原形の接尾辞が15単位を超える場合
    /// - 読みまたは発音が127文字を超える場合
    pub fn push(&mut self, entry: &RawWordEntry) -> Result<WordId> {
        if entry.left_id != entry.right_id {
            return Err(KanadictError::invalid_argument(
                "entry",
                format!(
                    "left id and right id must be equal: {} != {} ({})",
                    entry.left_id, entry.right_id, entry.surface
                ),
            ));
        }
        if entry.left_id > MAX_LEFT_ID {
            return Err(KanadictError::invalid_argument(
                "entry",
                format!("left id {} exceeds {MAX_LEFT_ID}", entry.left_id),
            ));
        }

        let surface: Vec<char> = entry.surface.chars().collect();
        let mut flags = 0;

        let base_form = if entry.base_form != "*" && entry.base_form != entry.surface {
            flags |= HAS_BASEFORM;
            Some(encode_base_form(&entry.surface, &entry.base_form)?)
        } else {
            None
        };
        let reading = if entry.reading != utils::katakana_reading(&surface) {
            flags |= HAS_READING;
            Some(encode_text(&entry.reading, "reading")?)
        } else {
            None
        };
        let pronunciation = if entry.pronunciation != entry.reading {
            flags |= HAS_PRONUNCIATION;
            Some(encode_text(&entry.pronunciation, "pronunciation")?)
        } else {
            None
        };

        let word_id = WordId::new(u32::try_from(self.data.len())?);
        self.data
            .extend(((entry.left_id << FLAG_BITS) | flags).to_be_bytes());
        self.data.extend(entry.word_cost.to_be_bytes());
        for field in [base_form, reading, pronunciation].into_iter().flatten() {
            self.data.extend(field);
        }
        Ok(word_id)
    }

    pub fn build(self) -> WordBuffer {
        WordBuffer::from_bytes(self.data)
    }
}

fn push_utf16(out: &mut Vec<u8>, units: &[u16]) {
    out.extend(units.iter().flat_map(|u| u.to_be_bytes()));
}

/// 接頭辞と接尾辞の長さはどちらもUTF-16単位で数えます。
fn encode_base_form(surface: &str, base_form: &str) -> Result<Vec<u8>> {
    let base: Vec<u16> = base_form.encode_utf16().collect();
    let prefix = surface
        .encode_utf16()
        .zip(&base)
        .take_while(|&(a, &b)| a == b)
        .count()
        .min(MAX_NIBBLE);
    let suffix = &base[prefix..];
    if suffix.len() > MAX_NIBBLE {
        return Err(KanadictError::invalid_argument(
            "base_form",
            format!("suffix of {base_form:?} is longer than {MAX_NIBBLE} UTF-16 units"),
        ));
    }
    let mut out = vec![u8::try_from((prefix << 4) | suffix.len())?];
    push_utf16(&mut out, suffix);
    Ok(out)
}

fn encode_text(text: &str, arg: &'static str) -> Result<Vec<u8>> {
    let kana: Option<Vec<u8>> = text.chars().map(utils::kana_to_byte).collect();
    let mut out = vec![];
    match kana {
        Some(kana) => {
            if kana.len() > MAX_TEXT_LEN {
                return Err(too_long(arg, text));
            }
            out.push(u8::try_from((kana.len() << 1) | 1)?);
            out.extend(kana);
        }
        None => {
            let units: Vec<u16> = text.encode_utf16().collect();
            if units.len() > MAX_TEXT_LEN {
                return Err(too_long(arg, text));
            }
            out.push(u8::try_from(units.len() << 1)?);
            push_utf16(&mut out, &units);
        }
    }
    Ok(out)
}

fn too_long(arg: &'static str, text: &str) -> KanadictError {
    KanadictError::invalid_argument(
        arg,
        format!("{text:?} is longer than {MAX_TEXT_LEN} characters"),
    )
}
