//! 読み取り専用のバイナリ辞書モジュール。
//!
//! 辞書は3つのセクションから構成されます。
//!
//! - ターゲットマップ: ソースIDから候補単語IDへの対応
//! - 品詞テーブル: 左文脈IDから品詞・活用型・活用形への対応
//! - 単語エントリバッファ: 単語IDの位置に格納された文脈ID・コスト・原形・読み・発音
//!
//! 各セクションは [`codec`] のヘッダに続いて本体が並ぶ独立したストリームです。
//!
//! # 辞書の読み込み方法
//!
//! - [`Dictionary::from_readers`]: 3つのリーダーから辞書を読み込む
//! - [`Dictionary::from_paths`]: ファイルパスから辞書を読み込む
//!
//! # 辞書のビルド
//!
//! [`DictionaryBuilder`]を使用して、CSV形式の語彙から辞書を構築できます。
pub mod builder;
pub mod codec;
pub mod config;
pub mod entry;
pub mod pos;
pub mod target_map;
pub mod word_buffer;
pub(crate) mod word_idx;

use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::Path;

use memmap2::Mmap;

use crate::dictionary::codec::{DataReader, DataWriter};
use crate::dictionary::config::{DICT_HEADER, POSDICT_HEADER, TARGETMAP_HEADER, VERSION};
use crate::errors::{KanadictError, Result};
use crate::utils::FromU32;

pub use crate::dictionary::builder::{DictionaryBuilder, RawWordEntry};
pub use crate::dictionary::config::DictionaryPaths;
pub use crate::dictionary::entry::{TextField, WordEntry};
pub use crate::dictionary::pos::{PosEntry, PosTable};
pub use crate::dictionary::target_map::{TargetMap, TargetMapBuilder};
pub use crate::dictionary::word_buffer::{WordBuffer, WordBufferBuilder, WordFields, WordFlags};
pub use crate::dictionary::word_idx::WordId;

/// 辞書の読み込みモード。
///
/// 単語エントリバッファの保持方法を指定します。
/// ターゲットマップと品詞テーブルはどちらのモードでもヒープに展開されます。
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// バッファをヒープに読み込みます。
    #[default]
    Read,
    /// バッファファイルを読み取り専用でメモリマップします。
    ///
    /// 辞書の使用中にファイルが書き換えられた場合の動作は未定義です。
    Mmap,
}

/// 読み取り専用のバイナリ辞書。
///
/// 構築後は不変で、複数のスレッドから同時に参照できます。
pub struct Dictionary {
    target_map: TargetMap,
    pos_table: PosTable,
    words: WordBuffer,
}

impl Dictionary {
    pub(crate) fn new(target_map: TargetMap, pos_table: PosTable, words: WordBuffer) -> Self {
        Self {
            target_map,
            pos_table,
            words,
        }
    }

    /// 3つのストリームから辞書を読み込みます。
    ///
    /// ターゲットマップ、品詞テーブル、単語エントリバッファの順に、
    /// それぞれのヘッダを検証してから本体をデコードします。
    ///
    /// # 引数
    ///
    ///  - `target_map_rdr`: ターゲットマップ `*$targetMap.dat` のリーダー
    ///  - `pos_rdr`: 品詞テーブル `*$posDict.dat` のリーダー
    ///  - `buffer_rdr`: 単語エントリバッファ `*$buffer.dat` のリーダー
    ///
    /// # エラー
    ///
    /// いずれかのセクションのヘッダが一致しない場合、本体が壊れている場合、
    /// またはストリームが途中で終わった場合は [`KanadictError`] を返します。
    /// 部分的に構築された辞書は返されません。
    pub fn from_readers<T, P, B>(target_map_rdr: T, pos_rdr: P, buffer_rdr: B) -> Result<Self>
    where
        T: Read,
        P: Read,
        B: Read,
    {
        let target_map = Self::read_target_map(target_map_rdr)?;
        let pos_table = Self::read_pos_table(pos_rdr)?;
        let mut rdr = DataReader::new(buffer_rdr, "buffer");
        rdr.check_header(DICT_HEADER, VERSION, VERSION)?;
        let words = WordBuffer::from_reader(&mut rdr)?;
        log::debug!("loaded buffer: {} bytes", words.len());

        Ok(Self::new(target_map, pos_table, words))
    }

    /// ファイルパスから辞書を読み込みます。
    ///
    /// # 引数
    ///
    /// * `paths` - 3つのセクションファイルのパス
    /// * `mode` - 単語エントリバッファの読み込みモード
    ///
    /// # エラー
    ///
    /// この関数は以下の場合にエラーを返します:
    /// - ファイルを開けない、または読み込めない場合。
    /// - ファイルが破損している、またはヘッダが一致しない場合。
    pub fn from_paths(paths: &DictionaryPaths, mode: LoadMode) -> Result<Self> {
        match mode {
            LoadMode::Read => Self::from_readers(
                open(&paths.target_map)?,
                open(&paths.pos)?,
                open(&paths.buffer)?,
            ),
            LoadMode::Mmap => {
                let target_map = Self::read_target_map(open(&paths.target_map)?)?;
                let pos_table = Self::read_pos_table(open(&paths.pos)?)?;
                let words = Self::map_buffer(&paths.buffer)?;
                Ok(Self::new(target_map, pos_table, words))
            }
        }
    }

    fn read_target_map<R>(rdr: R) -> Result<TargetMap>
    where
        R: Read,
    {
        let mut rdr = DataReader::new(BufReader::new(rdr), "targetMap");
        rdr.check_header(TARGETMAP_HEADER, VERSION, VERSION)?;
        let target_map = TargetMap::from_reader(&mut rdr)?;
        log::debug!(
            "loaded targetMap: {} sources, {} slots",
            target_map.num_sources(),
            target_map.len()
        );
        Ok(target_map)
    }

    fn read_pos_table<R>(rdr: R) -> Result<PosTable>
    where
        R: Read,
    {
        let mut rdr = DataReader::new(BufReader::new(rdr), "posDict");
        rdr.check_header(POSDICT_HEADER, VERSION, VERSION)?;
        let pos_table = PosTable::from_reader(&mut rdr)?;
        log::debug!("loaded posDict: {} entries", pos_table.len());
        Ok(pos_table)
    }

    fn map_buffer(path: &Path) -> Result<WordBuffer> {
        let file = open(path)?;
        // SAFETY: The file is opened read-only and the map is never written to.
        let mmap = unsafe { Mmap::map(&file)? };

        let (start, len) = {
            let mut rdr = DataReader::new(&mmap[..], "buffer");
            rdr.check_header(DICT_HEADER, VERSION, VERSION)?;
            let len = usize::from_u32(rdr.read_vint()?);
            (mmap.len() - rdr.into_inner().len(), len)
        };
        let words = WordBuffer::from_mmap(mmap, start, len)?;
        log::debug!("mapped buffer: {} bytes from {}", words.len(), path.display());
        Ok(words)
    }

    /// 3つのセクションをヘッダ付きで書き出します。
    pub fn write<T, P, B>(&self, target_map_wtr: T, pos_wtr: P, buffer_wtr: B) -> Result<()>
    where
        T: Write,
        P: Write,
        B: Write,
    {
        let mut wtr = DataWriter::new(target_map_wtr);
        wtr.write_header(TARGETMAP_HEADER, VERSION)?;
        self.target_map.write(&mut wtr)?;
        wtr.flush()?;

        let mut wtr = DataWriter::new(pos_wtr);
        wtr.write_header(POSDICT_HEADER, VERSION)?;
        self.pos_table.write(&mut wtr)?;
        wtr.flush()?;

        let mut wtr = DataWriter::new(buffer_wtr);
        wtr.write_header(DICT_HEADER, VERSION)?;
        self.words.write(&mut wtr)?;
        wtr.flush()
    }

    #[inline(always)]
    pub fn target_map(&self) -> &TargetMap {
        &self.target_map
    }

    #[inline(always)]
    pub fn pos_table(&self) -> &PosTable {
        &self.pos_table
    }

    #[inline(always)]
    pub fn words(&self) -> &WordBuffer {
        &self.words
    }

    /// ソースIDに対応する候補単語IDを返します。
    ///
    /// # Panics
    ///
    /// `source_id` が `num_sources()` 以上の場合はパニックします。
    #[inline(always)]
    pub fn candidates(&self, source_id: usize) -> &[WordId] {
        self.target_map.candidates(source_id)
    }

    #[inline(always)]
    pub fn num_sources(&self) -> usize {
        self.target_map.num_sources()
    }

    #[inline(always)]
    pub fn left_id(&self, word_id: WordId) -> u16 {
        self.words.left_id(word_id)
    }

    /// 右文脈IDを返します。常に [`left_id`](Self::left_id) と同じ値です。
    #[inline(always)]
    pub fn right_id(&self, word_id: WordId) -> u16 {
        self.words.right_id(word_id)
    }

    #[inline(always)]
    pub fn word_cost(&self, word_id: WordId) -> i16 {
        self.words.word_cost(word_id)
    }

    /// 品詞タグを返します。
    #[inline(always)]
    pub fn part_of_speech(&self, word_id: WordId) -> &str {
        self.pos_table.part_of_speech(self.left_id(word_id))
    }

    #[inline(always)]
    pub fn inflection_type(&self, word_id: WordId) -> Option<&str> {
        self.pos_table.inflection_type(self.left_id(word_id))
    }

    #[inline(always)]
    pub fn inflection_form(&self, word_id: WordId) -> Option<&str> {
        self.pos_table.inflection_form(self.left_id(word_id))
    }

    /// 原形を返します。原形データを持たない場合は`None`で、原形は表層形と同じです。
    ///
    /// # 引数
    ///
    /// * `word_id` - 単語ID
    /// * `surface` - この単語の表層形
    pub fn base_form(&self, word_id: WordId, surface: &[char]) -> Option<String> {
        self.words.base_form(word_id, surface)
    }

    /// 読みを返します。読みデータを持たない場合は表層形のひらがなをカタカナにしたものです。
    pub fn reading(&self, word_id: WordId, surface: &[char]) -> String {
        self.words.reading(word_id, surface).into_string()
    }

    /// 発音を返します。発音データを持たない場合は読みと同じです。
    pub fn pronunciation(&self, word_id: WordId, surface: &[char]) -> String {
        self.words.pronunciation(word_id, surface).into_string()
    }

    /// 単語の全属性をデコードします。
    ///
    /// # 例
    ///
    /// ```
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// use kanadict::DictionaryBuilder;
    ///
    /// let lexicon = "走る,772,772,5000,動詞,自立,*,*,五段・ラ行,基本形,走る,ハシル,ハシル";
    /// let dict = DictionaryBuilder::from_reader(lexicon.as_bytes())?.build();
    ///
    /// let surface: Vec<char> = "走る".chars().collect();
    /// let entry = dict.decode(dict.candidates(0)[0], &surface);
    /// assert_eq!(entry.part_of_speech, "動詞-自立");
    /// assert_eq!(entry.inflection_form, Some("基本形"));
    /// assert_eq!(entry.reading.as_str(), "ハシル");
    /// assert_eq!(entry.base_form, None);
    /// # Ok(())
    /// # }
    /// ```
    pub fn decode(&self, word_id: WordId, surface: &[char]) -> WordEntry<'_> {
        let left_id = self.left_id(word_id);
        let pos = self.pos_table.get(left_id);
        let WordFields {
            base_form,
            reading,
            pronunciation,
        } = self.words.fields(word_id, surface);
        WordEntry {
            word_id,
            left_id,
            right_id: self.right_id(word_id),
            word_cost: self.word_cost(word_id),
            part_of_speech: &pos.part_of_speech,
            inflection_type: pos.inflection_type.as_deref(),
            inflection_form: pos.inflection_form.as_deref(),
            base_form,
            reading,
            pronunciation,
        }
    }
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| {
        KanadictError::invalid_argument(
            "path",
            format!("Failed to open dictionary file {}: {e}", path.display()),
        )
    })
}
