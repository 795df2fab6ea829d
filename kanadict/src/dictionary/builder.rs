//! 辞書構築のためのビルダー
//!
//! このモジュールは、IPADIC形式の語彙CSVから [`Dictionary`] を構築し、
//! 3つのバイナリファイルとして書き出すためのビルダーを提供します。

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};

use hashbrown::HashMap;

use crate::dictionary::config::DictionaryPaths;
use crate::dictionary::pos::{PosEntry, PosTable};
use crate::dictionary::target_map::TargetMapBuilder;
use crate::dictionary::word_buffer::WordBufferBuilder;
use crate::dictionary::Dictionary;
use crate::errors::{KanadictError, Result};
use crate::utils;

/// 語彙CSVの1行に必要なフィールド数
pub const NUM_LEXICON_FIELDS: usize = 13;

/// 品詞情報で「値なし」を表す記号
const ABSENT: &str = "*";

/// 語彙CSVから読み込んだ単語エントリ
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RawWordEntry {
    pub surface: String,
    pub left_id: u16,
    pub right_id: u16,
    pub word_cost: i16,
    pub pos: PosEntry,
    pub base_form: String,
    pub reading: String,
    pub pronunciation: String,
}

impl RawWordEntry {
    /// CSVのフィールドから単語エントリを作成します。
    ///
    /// 品詞タグは `pos1` から `pos4` のうち `*` でないものを `-` で連結したものです。
    ///
    /// # 戻り値
    ///
    /// 表層形が空の場合は `None` を返します。
    ///
    /// # エラー
    ///
    /// フィールド数が不足している場合、または数値が解析できない場合はエラーを返します。
    pub fn from_fields(fields: &[String], name: &'static str) -> Result<Option<Self>> {
        if fields.len() < NUM_LEXICON_FIELDS {
            return Err(KanadictError::invalid_format(
                name,
                format!(
                    "A lexicon row must have at least {NUM_LEXICON_FIELDS} fields: {}",
                    fields.join(",")
                ),
            ));
        }
        if fields[0].is_empty() {
            return Ok(None);
        }

        let part_of_speech = fields[4..8]
            .iter()
            .map(String::as_str)
            .filter(|&p| p != ABSENT)
            .collect::<Vec<_>>()
            .join("-");
        let present = |s: &str| (s != ABSENT).then(|| s.to_string());

        Ok(Some(Self {
            surface: fields[0].clone(),
            left_id: fields[1].parse()?,
            right_id: fields[2].parse()?,
            word_cost: fields[3].parse()?,
            pos: PosEntry::new(
                part_of_speech,
                present(fields[8].as_str()),
                present(fields[9].as_str()),
            ),
            base_form: fields[10].clone(),
            reading: fields[11].clone(),
            pronunciation: fields[12].clone(),
        }))
    }
}

/// 語彙から [`Dictionary`] を構築するビルダー
///
/// エントリは表層形の順に並べ替えられ、異なる表層形ごとに1つのソースIDが割り当てられます。
pub struct DictionaryBuilder {
    dict: Dictionary,
    surfaces: Vec<String>,
}

impl DictionaryBuilder {
    /// 単語エントリから辞書を構築します。
    ///
    /// # エラー
    ///
    /// 以下の場合にエラーを返します。
    /// - 同じ左文脈IDに異なる品詞情報が割り当てられている場合
    /// - エントリが単語エントリバッファに格納できない場合
    pub fn from_entries(mut entries: Vec<RawWordEntry>) -> Result<Self> {
        entries.sort_by(|a, b| a.surface.cmp(&b.surface));

        let pos_table = Self::build_pos_table(&entries)?;

        let mut words = WordBufferBuilder::new();
        let mut target_map = TargetMapBuilder::new();
        let mut surfaces: Vec<String> = vec![];
        for entry in &entries {
            let word_id = words.push(entry)?;
            if surfaces.last() != Some(&entry.surface) {
                surfaces.push(entry.surface.clone());
            }
            target_map.push(surfaces.len() - 1, word_id)?;
        }

        let dict = Dictionary::new(target_map.build()?, pos_table, words.build());
        log::debug!(
            "built dictionary: {} entries, {} sources, {} POS ids",
            entries.len(),
            surfaces.len(),
            dict.pos_table().len(),
        );
        Ok(Self { dict, surfaces })
    }

    /// 語彙CSVのリーダーから辞書を構築します。
    ///
    /// # 引数
    ///
    ///  - `lexicon_rdr`: 語彙ファイル `*.csv` のリーダー
    ///
    /// # エラー
    ///
    /// 入力フォーマットが不正な場合に [`KanadictError`] を返します。
    pub fn from_reader<R>(lexicon_rdr: R) -> Result<Self>
    where
        R: Read,
    {
        Self::from_entries(Self::parse_csv(lexicon_rdr, "lex.csv")?)
    }

    /// 語彙CSVを解析します。表層形が空の行は警告を出して読み飛ばします。
    pub fn parse_csv<R>(rdr: R, name: &'static str) -> Result<Vec<RawWordEntry>>
    where
        R: Read,
    {
        let mut entries = vec![];
        for (i, line) in BufReader::new(rdr).lines().enumerate() {
            let line = line?;
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }
            let fields = utils::parse_csv_row(line, name)?;
            match RawWordEntry::from_fields(&fields, name)? {
                Some(entry) => entries.push(entry),
                None => log::warn!("{name}:{}: skipping an entry with an empty surface", i + 1),
            }
        }
        Ok(entries)
    }

    fn build_pos_table(entries: &[RawWordEntry]) -> Result<PosTable> {
        let mut pos_map: HashMap<u16, &PosEntry> = HashMap::new();
        for e in entries {
            match pos_map.get(&e.left_id) {
                Some(&pos) if pos != &e.pos => {
                    return Err(KanadictError::invalid_argument(
                        "lexicon",
                        format!(
                            "left id {} has conflicting POS: {:?} vs {:?}",
                            e.left_id, pos, e.pos
                        ),
                    ));
                }
                Some(_) => {}
                None => {
                    pos_map.insert(e.left_id, &e.pos);
                }
            }
        }
        let num_ids = pos_map.keys().max().map_or(0, |&id| usize::from(id) + 1);
        Ok(PosTable::new((0..num_ids).map(|id| {
            u16::try_from(id)
                .ok()
                .and_then(|id| pos_map.get(&id))
                .map_or_else(PosEntry::default, |&pos| pos.clone())
        })))
    }

    /// 構築した辞書への参照を返します。
    pub fn dictionary(&self) -> &Dictionary {
        &self.dict
    }

    /// ソースIDの順に表層形を返します。
    pub fn surfaces(&self) -> &[String] {
        &self.surfaces
    }

    /// 表層形に対応するソースIDを返します。
    pub fn source_id(&self, surface: &str) -> Option<usize> {
        self.surfaces
            .binary_search_by(|s| s.as_str().cmp(surface))
            .ok()
    }

    /// 3つのセクションをヘッダ付きで書き出します。
    pub fn write<T, P, B>(&self, target_map_wtr: T, pos_wtr: P, buffer_wtr: B) -> Result<()>
    where
        T: Write,
        P: Write,
        B: Write,
    {
        self.dict.write(target_map_wtr, pos_wtr, buffer_wtr)
    }

    /// 3つのセクションをそれぞれのファイルに書き出します。
    pub fn write_to_paths(&self, paths: &DictionaryPaths) -> Result<()> {
        self.write(
            BufWriter::new(File::create(&paths.target_map)?),
            BufWriter::new(File::create(&paths.pos)?),
            BufWriter::new(File::create(&paths.buffer)?),
        )
    }

    /// 構築した辞書を取り出します。
    pub fn build(self) -> Dictionary {
        self.dict
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEXICON: &str = "\
すもも,1285,1285,7546,名詞,一般,*,*,*,*,すもも,スモモ,スモモ
もも,1285,1285,7219,名詞,一般,*,*,*,*,もも,モモ,モモ
の,368,368,4816,助詞,連体化,*,*,*,*,の,ノ,ノ
も,262,262,4669,助詞,係助詞,*,*,*,*,も,モ,モ
も,1285,1285,9000,名詞,一般,*,*,*,*,も,モ,モ
";

    #[test]
    fn test_from_fields() {
        let fields = utils::parse_csv_row(
            "走っ,772,772,5812,動詞,自立,*,*,五段・ラ行,連用タ接続,走る,ハシッ,ハシッ",
            "test",
        )
        .unwrap();
        let entry = RawWordEntry::from_fields(&fields, "test").unwrap().unwrap();
        assert_eq!(entry.surface, "走っ");
        assert_eq!(entry.left_id, 772);
        assert_eq!(entry.word_cost, 5812);
        assert_eq!(entry.pos.part_of_speech, "動詞-自立");
        assert_eq!(entry.pos.inflection_type.as_deref(), Some("五段・ラ行"));
        assert_eq!(entry.pos.inflection_form.as_deref(), Some("連用タ接続"));
        assert_eq!(entry.base_form, "走る");
    }

    #[test]
    fn test_from_fields_too_few() {
        let fields = utils::parse_csv_row("走っ,772,772,5812,動詞", "test").unwrap();
        let err = RawWordEntry::from_fields(&fields, "test").unwrap_err();
        assert!(err.is_format_error());
    }

    #[test]
    fn test_from_fields_bad_number() {
        let fields =
            utils::parse_csv_row("a,x,0,0,名詞,*,*,*,*,*,a,a,a", "test").unwrap();
        assert!(RawWordEntry::from_fields(&fields, "test").is_err());
    }

    #[test]
    fn test_empty_surface_is_skipped() {
        let lexicon = format!(",1,1,0,名詞,*,*,*,*,*,*,*,*\n{LEXICON}");
        let entries = DictionaryBuilder::parse_csv(lexicon.as_bytes(), "test").unwrap();
        assert_eq!(entries.len(), 5);
    }

    #[test]
    fn test_sources_are_sorted_surfaces() {
        let builder = DictionaryBuilder::from_reader(LEXICON.as_bytes()).unwrap();
        assert_eq!(builder.surfaces(), &["すもも", "の", "も", "もも"]);
        assert_eq!(builder.source_id("も"), Some(2));
        assert_eq!(builder.source_id("桃"), None);

        let dict = builder.dictionary();
        assert_eq!(dict.num_sources(), 4);
        assert_eq!(dict.candidates(2).len(), 2);
        let costs: Vec<i16> = dict
            .candidates(2)
            .iter()
            .map(|&id| dict.word_cost(id))
            .collect();
        assert_eq!(costs, vec![4669, 9000]);
    }

    #[test]
    fn test_pos_table_is_indexed_by_left_id() {
        let dict = DictionaryBuilder::from_reader(LEXICON.as_bytes())
            .unwrap()
            .build();
        assert_eq!(dict.pos_table().len(), 1286);
        assert_eq!(dict.pos_table().part_of_speech(368), "助詞-連体化");
        assert_eq!(dict.pos_table().part_of_speech(1285), "名詞-一般");
        assert_eq!(dict.pos_table().part_of_speech(0), "");
    }

    #[test]
    fn test_conflicting_pos() {
        let lexicon = "\
a,5,5,0,名詞,一般,*,*,*,*,a,a,a
b,5,5,0,動詞,自立,*,*,*,*,b,b,b
";
        let err = DictionaryBuilder::from_reader(lexicon.as_bytes()).err().unwrap();
        assert!(matches!(err, KanadictError::InvalidArgument(_)));
    }

    #[test]
    fn test_empty_lexicon() {
        let builder = DictionaryBuilder::from_reader(&b""[..]).unwrap();
        assert!(builder.surfaces().is_empty());
        assert_eq!(builder.dictionary().num_sources(), 0);
    }
}
