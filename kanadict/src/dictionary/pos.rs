//! 品詞テーブル
//!
//! 左文脈IDごとに品詞、活用型、活用形を保持します。
//! ストリーム上では活用なしを空文字列で表しますが、読み込み後は `None` として扱います。

use std::io::{Read, Write};

use crate::dictionary::codec::{DataReader, DataWriter};
use crate::errors::Result;
use crate::utils::FromU32;

/// 1つの左文脈IDに対応する品詞情報
#[derive(Debug, Default, Clone, Eq, PartialEq, Hash)]
pub struct PosEntry {
    pub part_of_speech: String,
    pub inflection_type: Option<String>,
    pub inflection_form: Option<String>,
}

impl PosEntry {
    /// 新しい品詞情報を作成します。
    ///
    /// 空の活用型・活用形は `None` に正規化されます。
    pub fn new<S, T, F>(part_of_speech: S, inflection_type: Option<T>, inflection_form: Option<F>) -> Self
    where
        S: Into<String>,
        T: Into<String>,
        F: Into<String>,
    {
        Self {
            part_of_speech: part_of_speech.into(),
            inflection_type: inflection_type.map(Into::into).filter(|s| !s.is_empty()),
            inflection_form: inflection_form.map(Into::into).filter(|s| !s.is_empty()),
        }
    }
}

/// 左文脈IDで引く品詞テーブル
#[derive(Debug, Default, Clone, Eq, PartialEq)]
pub struct PosTable {
    entries: Vec<PosEntry>,
}

impl PosTable {
    pub fn new<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = PosEntry>,
    {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// ストリームの本体（ヘッダ以降）から品詞テーブルを読み込みます。
    pub fn from_reader<R>(rdr: &mut DataReader<R>) -> Result<Self>
    where
        R: Read,
    {
        let len = usize::from_u32(rdr.read_vint()?);
        let mut entries = Vec::with_capacity(len.min(1 << 16));
        for _ in 0..len {
            let part_of_speech = rdr.read_string()?;
            let inflection_type = rdr.read_string()?;
            let inflection_form = rdr.read_string()?;
            entries.push(PosEntry::new(
                part_of_speech,
                Some(inflection_type),
                Some(inflection_form),
            ));
        }
        Ok(Self { entries })
    }

    /// 品詞テーブルを本体の形式で書き出します。
    pub fn write<W>(&self, wtr: &mut DataWriter<W>) -> Result<()>
    where
        W: Write,
    {
        wtr.write_vint(u32::try_from(self.entries.len())?)?;
        for e in &self.entries {
            wtr.write_string(&e.part_of_speech)?;
            wtr.write_string(e.inflection_type.as_deref().unwrap_or_default())?;
            wtr.write_string(e.inflection_form.as_deref().unwrap_or_default())?;
        }
        Ok(())
    }

    /// 左文脈IDに対応する品詞情報を返します。
    ///
    /// # Panics
    ///
    /// `left_id` がテーブルの範囲外の場合はパニックします。
    #[inline(always)]
    pub fn get(&self, left_id: u16) -> &PosEntry {
        &self.entries[usize::from(left_id)]
    }

    #[inline(always)]
    pub fn part_of_speech(&self, left_id: u16) -> &str {
        &self.get(left_id).part_of_speech
    }

    #[inline(always)]
    pub fn inflection_type(&self, left_id: u16) -> Option<&str> {
        self.get(left_id).inflection_type.as_deref()
    }

    #[inline(always)]
    pub fn inflection_form(&self, left_id: u16) -> Option<&str> {
        self.get(left_id).inflection_form.as_deref()
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
