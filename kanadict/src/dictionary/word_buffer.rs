//! 単語エントリのバッファ
//!
//! 単語エントリは4バイトの固定ヘッダと、フラグで存在が示される可変長フィールドから構成されます。
//! 多バイト値はすべてビッグエンディアンです。
//!
//! | バイト | 内容 |
//! |---|---|
//! | 0–1 | `左文脈ID << 3` とフラグの論理和 |
//! | 2–3 | 単語コスト（符号付き16ビット） |
//! | 4– | 原形、読み、発音（フラグが立っているもののみ、この順に連続） |
//!
//! 各可変長フィールドの位置はそれより前のフィールドの長さに依存するため、
//! デコードはカーソルを順に受け渡して行います。

mod encoder;

use std::io::{Read, Write};

use memmap2::Mmap;

use crate::dictionary::codec::{DataReader, DataWriter};
use crate::dictionary::entry::TextField;
use crate::dictionary::word_idx::WordId;
use crate::errors::{KanadictError, Result};
use crate::utils::{self, FromU32};

pub use crate::dictionary::word_buffer::encoder::WordBufferBuilder;

/// 原形データを持つことを示すフラグ。持たない場合、原形は表層形と同じです。
pub const HAS_BASEFORM: u16 = 1;

/// 読みデータを持つことを示すフラグ。持たない場合、読みは表層形をカタカナにしたものです。
pub const HAS_READING: u16 = 2;

/// 発音データを持つことを示すフラグ。持たない場合、発音は読みと同じです。
pub const HAS_PRONUNCIATION: u16 = 4;

const FLAG_MASK: u16 = HAS_BASEFORM | HAS_READING | HAS_PRONUNCIATION;
const FLAG_BITS: u32 = 3;
const HEADER_LEN: usize = 4;

const WORD_BUFFER_SECTION: &str = "buffer";

/// 単語エントリのフラグ
#[derive(Clone, Copy, Default, Eq, PartialEq, Debug, Hash)]
pub struct WordFlags(u16);

impl WordFlags {
    #[inline(always)]
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits & FLAG_MASK)
    }

    #[inline(always)]
    pub const fn bits(self) -> u16 {
        self.0
    }

    #[inline(always)]
    pub const fn has_base_form(self) -> bool {
        self.0 & HAS_BASEFORM != 0
    }

    #[inline(always)]
    pub const fn has_reading(self) -> bool {
        self.0 & HAS_READING != 0
    }

    #[inline(always)]
    pub const fn has_pronunciation(self) -> bool {
        self.0 & HAS_PRONUNCIATION != 0
    }
}

/// バッファ内の読み出し位置
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
struct Cursor(usize);

impl Cursor {
    #[inline(always)]
    const fn fields_start(word_id: WordId) -> Self {
        Self(word_id.0 as usize + HEADER_LEN)
    }
}

/// 可変長フィールドをまとめてデコードした結果
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct WordFields {
    pub base_form: Option<String>,
    pub reading: TextField,
    pub pronunciation: TextField,
}

/// バッファの実体
enum Storage {
    Heap(Box<[u8]>),
    Mmap { mmap: Mmap, start: usize, len: usize },
}

/// 読み取り専用の単語エントリバッファ
pub struct WordBuffer {
    storage: Storage,
}

impl WordBuffer {
    /// バイト列からバッファを作成します。
    pub fn from_bytes<B>(bytes: B) -> Self
    where
        B: Into<Box<[u8]>>,
    {
        Self {
            storage: Storage::Heap(bytes.into()),
        }
    }

    /// ストリームの本体（ヘッダ以降）からバッファを読み込みます。
    ///
    /// # エラー
    ///
    /// 宣言された長さのバイト列を読み切れない場合はフォーマットエラーを返します。
    pub fn from_reader<R>(rdr: &mut DataReader<R>) -> Result<Self>
    where
        R: Read,
    {
        let len = usize::from_u32(rdr.read_vint()?);
        let data = rdr.read_vec(len)?;
        Ok(Self::from_bytes(data))
    }

    /// メモリマップされた辞書ファイルの一部をバッファとして使用します。
    ///
    /// # 引数
    ///
    /// * `mmap` - ヘッダを含む辞書ファイル全体のマップ
    /// * `start` - 本体のバイト列の開始位置
    /// * `len` - 宣言されたバイト長
    ///
    /// # エラー
    ///
    /// ファイルが宣言された長さより短い場合はフォーマットエラーを返します。
    pub fn from_mmap(mmap: Mmap, start: usize, len: usize) -> Result<Self> {
        match start.checked_add(len) {
            Some(end) if end <= mmap.len() => Ok(Self {
                storage: Storage::Mmap { mmap, start, len },
            }),
            _ => Err(KanadictError::invalid_format(
                WORD_BUFFER_SECTION,
                format!(
                    "Cannot read whole dictionary: expected {len} bytes, got {}",
                    mmap.len().saturating_sub(start)
                ),
            )),
        }
    }

    /// バッファを本体の形式で書き出します。
    pub fn write<W>(&self, wtr: &mut DataWriter<W>) -> Result<()>
    where
        W: Write,
    {
        let bytes = self.as_bytes();
        wtr.write_vint(u32::try_from(bytes.len())?)?;
        wtr.write_bytes(bytes)
    }

    /// バッファ全体のバイト列を返します。
    #[inline(always)]
    pub fn as_bytes(&self) -> &[u8] {
        match &self.storage {
            Storage::Heap(data) => &data[..],
            Storage::Mmap { mmap, start, len } => &mmap[*start..*start + *len],
        }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// メモリマップを使用している場合に`true`を返します。
    pub fn is_mapped(&self) -> bool {
        matches!(self.storage, Storage::Mmap { .. })
    }

    #[inline(always)]
    fn u16_at(bytes: &[u8], pos: usize) -> u16 {
        u16::from_be_bytes([bytes[pos], bytes[pos + 1]])
    }

    fn utf16_at(bytes: &[u8], pos: usize, count: usize) -> impl Iterator<Item = char> + '_ {
        char::decode_utf16((0..count).map(move |i| Self::u16_at(bytes, pos + (i << 1))))
            .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
    }

    /// 先頭2バイト（左文脈IDとフラグ）を返します。
    #[inline(always)]
    pub fn id_flags(&self, word_id: WordId) -> u16 {
        Self::u16_at(self.as_bytes(), word_id.offset())
    }

    #[inline(always)]
    pub fn left_id(&self, word_id: WordId) -> u16 {
        self.id_flags(word_id) >> FLAG_BITS
    }

    /// 右文脈IDを返します。現在の形式では常に左文脈IDと同じ値です。
    #[inline(always)]
    pub fn right_id(&self, word_id: WordId) -> u16 {
        self.id_flags(word_id) >> FLAG_BITS
    }

    #[inline(always)]
    pub fn flags(&self, word_id: WordId) -> WordFlags {
        WordFlags::from_bits(self.id_flags(word_id))
    }

    #[inline(always)]
    pub fn word_cost(&self, word_id: WordId) -> i16 {
        let bytes = self.as_bytes();
        let pos = word_id.offset() + 2;
        i16::from_be_bytes([bytes[pos], bytes[pos + 1]])
    }

    /// 原形フィールドを読み、次のフィールドの位置とともに返します。
    ///
    /// 先頭バイトの上位4ビットが表層形と共有する接頭辞のUTF-16単位数、
    /// 下位4ビットがバッファに格納された接尾辞のUTF-16単位数です。
    /// 接頭辞と接尾辞は単位列として連結してからデコードするため、
    /// 境界をまたぐサロゲートペアも復元されます。
    fn read_base_form(&self, cur: Cursor, surface: &[char]) -> (String, Cursor) {
        let bytes = self.as_bytes();
        let data = bytes[cur.0];
        let prefix = usize::from(data >> 4);
        let suffix = usize::from(data & 0xF);
        let pos = cur.0 + 1;
        let head: String = surface.iter().collect();
        let units = head
            .encode_utf16()
            .take(prefix)
            .chain((0..suffix).map(|i| Self::u16_at(bytes, pos + (i << 1))));
        let text = char::decode_utf16(units)
            .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect();
        (text, Cursor(pos + (suffix << 1)))
    }

    fn skip_base_form(&self, cur: Cursor) -> Cursor {
        let suffix = usize::from(self.as_bytes()[cur.0] & 0xF);
        Cursor(cur.0 + 1 + (suffix << 1))
    }

    /// 読みまたは発音のフィールドを読み、次のフィールドの位置とともに返します。
    ///
    /// 先頭バイトの最下位ビットがカナ符号化、残りのビットが文字数です。
    fn read_text(&self, cur: Cursor) -> (String, Cursor) {
        let bytes = self.as_bytes();
        let data = bytes[cur.0];
        let count = usize::from(data >> 1);
        let pos = cur.0 + 1;
        if data & 1 == 1 {
            let text = bytes[pos..pos + count]
                .iter()
                .copied()
                .map(utils::kana_from_byte)
                .collect();
            (text, Cursor(pos + count))
        } else {
            let text = Self::utf16_at(bytes, pos, count).collect();
            (text, Cursor(pos + (count << 1)))
        }
    }

    fn skip_text(&self, cur: Cursor) -> Cursor {
        let data = self.as_bytes()[cur.0];
        let count = usize::from(data >> 1);
        if data & 1 == 1 {
            Cursor(cur.0 + 1 + count)
        } else {
            Cursor(cur.0 + 1 + (count << 1))
        }
    }

    fn reading_cursor(&self, word_id: WordId, flags: WordFlags) -> Cursor {
        let cur = Cursor::fields_start(word_id);
        if flags.has_base_form() {
            self.skip_base_form(cur)
        } else {
            cur
        }
    }

    fn pronunciation_cursor(&self, word_id: WordId, flags: WordFlags) -> Cursor {
        let cur = self.reading_cursor(word_id, flags);
        if flags.has_reading() {
            self.skip_text(cur)
        } else {
            cur
        }
    }

    /// 原形を返します。原形データを持たない場合は`None`です。
    ///
    /// 格納された接頭辞長が`surface`のUTF-16単位数より長い場合、
    /// 接頭辞は`surface`全体で打ち切られます。
    pub fn base_form(&self, word_id: WordId, surface: &[char]) -> Option<String> {
        self.flags(word_id)
            .has_base_form()
            .then(|| self.read_base_form(Cursor::fields_start(word_id), surface).0)
    }

    /// 読みを返します。
    pub fn reading(&self, word_id: WordId, surface: &[char]) -> TextField {
        let flags = self.flags(word_id);
        if flags.has_reading() {
            TextField::Stored(self.read_text(self.reading_cursor(word_id, flags)).0)
        } else {
            TextField::Derived(utils::katakana_reading(surface))
        }
    }

    /// 発音を返します。
    pub fn pronunciation(&self, word_id: WordId, surface: &[char]) -> TextField {
        let flags = self.flags(word_id);
        if flags.has_pronunciation() {
            TextField::Stored(self.read_text(self.pronunciation_cursor(word_id, flags)).0)
        } else {
            TextField::Derived(self.reading(word_id, surface).into_string())
        }
    }

    /// 可変長フィールドを先頭から順に一度でデコードします。
    pub fn fields(&self, word_id: WordId, surface: &[char]) -> WordFields {
        let flags = self.flags(word_id);
        let cur = Cursor::fields_start(word_id);

        let (base_form, cur) = if flags.has_base_form() {
            let (text, next) = self.read_base_form(cur, surface);
            (Some(text), next)
        } else {
            (None, cur)
        };

        let (reading, cur) = if flags.has_reading() {
            let (text, next) = self.read_text(cur);
            (TextField::Stored(text), next)
        } else {
            (TextField::Derived(utils::katakana_reading(surface)), cur)
        };

        let pronunciation = if flags.has_pronunciation() {
            TextField::Stored(self.read_text(cur).0)
        } else {
            TextField::Derived(reading.as_str().to_string())
        };

        WordFields {
            base_form,
            reading,
            pronunciation,
        }
    }
}
