//! 単語識別子
//!
//! このモジュールは、辞書バッファ内の単語エントリを識別するための型を提供します。

use std::fmt;

use crate::utils::FromU32;

/// 単語の識別子
///
/// 単語バッファ内のエントリ先頭（4バイトの固定ヘッダ）へのバイトオフセットです。
/// 有効な値はターゲットマップからのみ得られます。
#[derive(Clone, Copy, Default, Eq, PartialEq, Debug, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct WordId(pub u32);

impl WordId {
    /// 新しいインスタンスを作成します。
    #[inline(always)]
    pub const fn new(offset: u32) -> Self {
        Self(offset)
    }

    #[inline(always)]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// 単語バッファ内のバイト位置を返します。
    #[inline(always)]
    pub fn offset(self) -> usize {
        usize::from_u32(self.0)
    }
}

impl fmt::Display for WordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
