//! デコード済みの単語エントリ

use std::fmt;

use crate::dictionary::word_idx::WordId;

/// 読みまたは発音の値
///
/// バッファに格納されていた値か、他のフィールドから導出された値かを区別します。
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum TextField {
    /// バッファに格納されていた値
    Stored(String),
    /// 表層形または読みから導出された値
    Derived(String),
}

impl TextField {
    #[inline(always)]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Stored(s) | Self::Derived(s) => s,
        }
    }

    #[inline(always)]
    pub fn into_string(self) -> String {
        match self {
            Self::Stored(s) | Self::Derived(s) => s,
        }
    }

    /// バッファに格納されていた値であれば`true`を返します。
    #[inline(always)]
    pub const fn is_stored(&self) -> bool {
        matches!(self, Self::Stored(_))
    }
}

impl fmt::Display for TextField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 1つの単語の全属性
///
/// [`Dictionary::decode`](crate::Dictionary::decode) が返します。
/// 品詞情報は辞書から借用します。
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct WordEntry<'a> {
    pub word_id: WordId,
    pub left_id: u16,
    pub right_id: u16,
    pub word_cost: i16,
    pub part_of_speech: &'a str,
    pub inflection_type: Option<&'a str>,
    pub inflection_form: Option<&'a str>,
    /// 原形データを持たない場合は`None`（原形は表層形と同じ）
    pub base_form: Option<String>,
    pub reading: TextField,
    pub pronunciation: TextField,
}

impl WordEntry<'_> {
    /// 原形を返します。原形データを持たない場合は`surface`を返します。
    pub fn base_form_or<'s>(&'s self, surface: &'s str) -> &'s str {
        self.base_form.as_deref().unwrap_or(surface)
    }
}
