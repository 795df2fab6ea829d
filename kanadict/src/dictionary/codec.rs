//! バイナリ辞書の基本要素の読み書き
//!
//! 各セクションは `[ヘッダ: マジック, コーデック名, バージョン]` に続いて本体が並びます。
//! 本体は可変長整数（vint）、長さ付き文字列、生のバイト列で構成されます。
//!
//! - 可変長整数は7ビットずつ下位から並べ、最上位ビットを継続フラグとします。
//!   最大5バイトで、5バイト目は下位4ビットのみ使用できます。
//! - 文字列はバイト長の可変長整数に続くUTF-8です。
//! - ヘッダの整数はビッグエンディアンの32ビット値です。

use std::io::{self, Read, Write};

use crate::errors::{KanadictError, Result};

/// コーデックヘッダの先頭に置かれるマジック値
pub const CODEC_MAGIC: u32 = 0x3fd7_6c17;

// Lengths come from the stream and are not trusted for allocation.
const PREALLOC_LIMIT: usize = 1 << 26;

/// ストリームから基本要素を読み出すリーダー
///
/// 読み出し中に入力が尽きた場合は、セクション名付きのフォーマットエラーになります。
pub struct DataReader<R> {
    rdr: R,
    section: &'static str,
}

impl<R> DataReader<R>
where
    R: Read,
{
    /// 新しいリーダーを作成します。
    ///
    /// # 引数
    ///
    /// * `rdr` - 入力ストリーム
    /// * `section` - エラーメッセージに使用するセクション名
    pub const fn new(rdr: R, section: &'static str) -> Self {
        Self { rdr, section }
    }

    /// セクション名を返します。
    #[inline(always)]
    pub const fn section(&self) -> &'static str {
        self.section
    }

    /// 内部のストリームを取り出します。
    pub fn into_inner(self) -> R {
        self.rdr
    }

    /// 指定されたバッファを埋めるまで読み込みます。
    ///
    /// # エラー
    ///
    /// 入力が途中で尽きた場合はフォーマットエラーを返します。
    pub fn read_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        self.rdr.read_exact(buf).map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => KanadictError::invalid_format(
                self.section,
                format!("unexpected end of stream while reading {} bytes", buf.len()),
            ),
            _ => KanadictError::from(e),
        })
    }

    /// 指定された長さのバイト列を読み込みます。
    ///
    /// # エラー
    ///
    /// 入力が指定された長さに満たない場合はフォーマットエラーを返します。
    pub fn read_vec(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(len.min(PREALLOC_LIMIT));
        let read = self
            .rdr
            .by_ref()
            .take(u64::try_from(len)?)
            .read_to_end(&mut buf)?;
        if read != len {
            return Err(KanadictError::invalid_format(
                self.section,
                format!("Cannot read whole dictionary: expected {len} bytes, got {read}"),
            ));
        }
        Ok(buf)
    }

    #[inline(always)]
    pub fn read_byte(&mut self) -> Result<u8> {
        let mut buf = [0; 1];
        self.read_bytes(&mut buf)?;
        Ok(buf[0])
    }

    /// ビッグエンディアンの32ビット値を読み込みます。
    pub fn read_be_u32(&mut self) -> Result<u32> {
        let mut buf = [0; 4];
        self.read_bytes(&mut buf)?;
        Ok(u32::from_be_bytes(buf))
    }

    /// 可変長整数を読み込みます。
    ///
    /// # エラー
    ///
    /// 5バイト目が32ビットを超えるビットを含む場合はフォーマットエラーを返します。
    pub fn read_vint(&mut self) -> Result<u32> {
        let mut value = 0;
        let mut shift = 0;
        loop {
            let b = self.read_byte()?;
            if shift == 28 {
                if b & 0xF0 != 0 {
                    return Err(KanadictError::invalid_format(
                        self.section,
                        "invalid vint detected (too many bits)",
                    ));
                }
                return Ok(value | (u32::from(b) << 28));
            }
            value |= u32::from(b & 0x7F) << shift;
            if b & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
        }
    }

    /// 長さ付きUTF-8文字列を読み込みます。
    pub fn read_string(&mut self) -> Result<String> {
        let len = usize::try_from(self.read_vint()?)?;
        let buf = self.read_vec(len)?;
        String::from_utf8(buf).map_err(|e| {
            KanadictError::invalid_format(self.section, format!("invalid UTF-8 string: {e}"))
        })
    }

    /// コーデックヘッダを検証し、格納されているバージョンを返します。
    ///
    /// # 引数
    ///
    /// * `codec` - 期待するコーデック名
    /// * `min_version` - 許容する最小バージョン
    /// * `max_version` - 許容する最大バージョン
    ///
    /// # エラー
    ///
    /// マジック値、コーデック名、バージョンのいずれかが一致しない場合は
    /// フォーマットエラーを返します。
    pub fn check_header(&mut self, codec: &str, min_version: u32, max_version: u32) -> Result<u32> {
        let magic = self.read_be_u32()?;
        if magic != CODEC_MAGIC {
            return Err(KanadictError::invalid_format(
                self.section,
                format!(
                    "codec header mismatch: actual header={magic:#010x} vs expected header={CODEC_MAGIC:#010x}"
                ),
            ));
        }
        let actual_codec = self.read_string()?;
        if actual_codec != codec {
            return Err(KanadictError::invalid_format(
                self.section,
                format!("codec mismatch: actual codec={actual_codec} vs expected codec={codec}"),
            ));
        }
        let version = self.read_be_u32()?;
        if version < min_version || max_version < version {
            return Err(KanadictError::invalid_format(
                self.section,
                format!(
                    "unsupported format version {version} (needs to be between {min_version} and {max_version})"
                ),
            ));
        }
        Ok(version)
    }
}

/// ストリームへ基本要素を書き出すライター
pub struct DataWriter<W> {
    wtr: W,
}

impl<W> DataWriter<W>
where
    W: Write,
{
    pub const fn new(wtr: W) -> Self {
        Self { wtr }
    }

    /// 内部のストリームを取り出します。
    pub fn into_inner(self) -> W {
        self.wtr
    }

    #[inline(always)]
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.wtr.write_all(bytes)?;
        Ok(())
    }

    #[inline(always)]
    pub fn write_byte(&mut self, b: u8) -> Result<()> {
        self.write_bytes(&[b])
    }

    pub fn write_be_u32(&mut self, value: u32) -> Result<()> {
        self.write_bytes(&value.to_be_bytes())
    }

    /// 可変長整数を書き込みます。
    pub fn write_vint(&mut self, mut value: u32) -> Result<()> {
        while value & !0x7F != 0 {
            self.write_byte(((value & 0x7F) | 0x80) as u8)?;
            value >>= 7;
        }
        self.write_byte(value as u8)
    }

    /// 長さ付きUTF-8文字列を書き込みます。
    pub fn write_string(&mut self, s: &str) -> Result<()> {
        self.write_vint(u32::try_from(s.len())?)?;
        self.write_bytes(s.as_bytes())
    }

    /// コーデックヘッダを書き込みます。
    ///
    /// # エラー
    ///
    /// コーデック名が128バイト以上、またはASCII以外の文字を含む場合はエラーを返します。
    pub fn write_header(&mut self, codec: &str, version: u32) -> Result<()> {
        if codec.len() >= 128 || !codec.is_ascii() {
            return Err(KanadictError::invalid_argument(
                "codec",
                format!("codec name must be simple ASCII, less than 128 characters: {codec:?}"),
            ));
        }
        self.write_be_u32(CODEC_MAGIC)?;
        self.write_string(codec)?;
        self.write_be_u32(version)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.wtr.flush()?;
        Ok(())
    }
}
