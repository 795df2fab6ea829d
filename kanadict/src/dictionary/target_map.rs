//! ソースIDから候補単語IDへのターゲットマップ
//!
//! ターゲットマップは単語IDの列を、ソースIDごとの連続したランに分割したものです。
//! ストリーム上では各スロットを1つの可変長整数 `v` で表します。
//!
//! - `v & 1` が立っているスロットは新しいランの先頭です。
//! - `v >> 1` はストリーム全体で共有される累積値への差分です。
//!
//! したがって単語IDはソースの境界をまたいで単調非減少になります。

use std::io::{Read, Write};

use crate::dictionary::codec::{DataReader, DataWriter};
use crate::dictionary::word_idx::WordId;
use crate::errors::{KanadictError, Result};
use crate::utils::FromU32;

/// ソースIDごとの単語IDのラン
pub struct TargetMap {
    map: Vec<WordId>,
    // One more entry than the number of sources; the last one equals `map.len()`.
    offsets: Vec<u32>,
}

/// デコード中に持ち回す状態
struct RunFold {
    accum: u32,
    map: Vec<WordId>,
    offsets: Vec<u32>,
}

impl RunFold {
    fn with_capacity(num_values: usize, num_offsets: usize) -> Self {
        Self {
            accum: 0,
            map: Vec::with_capacity(num_values),
            offsets: Vec::with_capacity(num_offsets),
        }
    }

    fn step(mut self, value: u32) -> Result<Self> {
        if value & 1 != 0 {
            self.offsets.push(u32::try_from(self.map.len())?);
        }
        self.accum = self.accum.checked_add(value >> 1).ok_or_else(|| {
            KanadictError::invalid_format(TARGET_MAP_SECTION, "word id accumulator overflowed")
        })?;
        self.map.push(WordId::new(self.accum));
        Ok(self)
    }
}

const TARGET_MAP_SECTION: &str = "targetMap";

// Declared counts come from the stream and are not trusted for allocation.
const PREALLOC_LIMIT: usize = 1 << 20;

impl TargetMap {
    /// ストリームの本体（ヘッダ以降）からターゲットマップを読み込みます。
    ///
    /// # エラー
    ///
    /// ランの数と宣言されたオフセット数が一致しない場合、
    /// またはストリームが途中で終わった場合はフォーマットエラーを返します。
    pub fn from_reader<R>(rdr: &mut DataReader<R>) -> Result<Self>
    where
        R: Read,
    {
        let num_values = rdr.read_vint()?;
        let num_offsets = rdr.read_vint()?;
        let values = (0..num_values).map(|_| rdr.read_vint());
        Self::decode(num_offsets, values)
    }

    /// 符号化された値の列をデコードします。
    ///
    /// # 引数
    ///
    /// * `num_offsets` - 宣言されたオフセット数（ソース数 + 1）
    /// * `values` - ランの開始フラグと差分を詰めた値の列
    pub(crate) fn decode<I>(num_offsets: u32, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = Result<u32>>,
    {
        let mut values = values.into_iter();
        let state = RunFold::with_capacity(
            values.size_hint().0.min(PREALLOC_LIMIT),
            usize::from_u32(num_offsets).min(PREALLOC_LIMIT),
        );
        let RunFold {
            map, mut offsets, ..
        } = values.try_fold(state, |state: RunFold, value: Result<u32>| -> Result<RunFold> {
            state.step(value?)
        })?;

        if offsets.len() + 1 != usize::from_u32(num_offsets) {
            return Err(KanadictError::invalid_format(
                TARGET_MAP_SECTION,
                format!(
                    "targetMap file format broken; targetMap.length={}, targetMapOffsets.length={}, sourceId={}",
                    map.len(),
                    num_offsets,
                    offsets.len(),
                ),
            ));
        }
        offsets.push(u32::try_from(map.len())?);

        Ok(Self { map, offsets })
    }

    /// ターゲットマップを本体の形式で書き出します。
    pub fn write<W>(&self, wtr: &mut DataWriter<W>) -> Result<()>
    where
        W: Write,
    {
        wtr.write_vint(u32::try_from(self.map.len())?)?;
        wtr.write_vint(u32::try_from(self.offsets.len())?)?;

        let mut source_id = 0;
        let mut prev = 0;
        for (slot, word_id) in self.map.iter().enumerate() {
            let delta = word_id.get().checked_sub(prev).ok_or_else(|| {
                KanadictError::invalid_state("word ids must be non-decreasing", format!("slot {slot}"))
            })?;
            // `delta << 1` must not lose the top bit.
            if delta > u32::MAX >> 1 {
                return Err(KanadictError::invalid_state(
                    "word id delta does not fit in 31 bits",
                    format!("slot {slot}"),
                ));
            }
            let is_run_start = source_id < self.num_sources()
                && usize::from_u32(self.offsets[source_id]) == slot;
            if is_run_start {
                source_id += 1;
            }
            wtr.write_vint((delta << 1) | u32::from(is_run_start))?;
            prev = word_id.get();
        }
        Ok(())
    }

    /// ソースIDに対応する候補単語IDを返します。
    ///
    /// # Panics
    ///
    /// `source_id` が `num_sources()` 以上の場合はパニックします。
    #[inline(always)]
    pub fn candidates(&self, source_id: usize) -> &[WordId] {
        let start = usize::from_u32(self.offsets[source_id]);
        let end = usize::from_u32(self.offsets[source_id + 1]);
        &self.map[start..end]
    }

    /// ソースの数を返します。
    #[inline(always)]
    pub fn num_sources(&self) -> usize {
        self.offsets.len() - 1
    }

    /// 全スロットの数を返します。
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// 各ランの開始位置と番兵を返します。
    #[inline(always)]
    pub fn offsets(&self) -> &[u32] {
        &self.offsets
    }

    /// ソースIDと候補単語IDの組を順に返すイテレータを取得します。
    pub fn runs(&self) -> impl Iterator<Item = (usize, &[WordId])> + '_ {
        (0..self.num_sources()).map(move |source_id| (source_id, self.candidates(source_id)))
    }
}

/// ターゲットマップを構築するビルダー
///
/// ソースIDは0から1ずつ増やしながら追加しなければなりません。
/// 単語IDは全体で単調非減少でなければなりません。
#[derive(Default)]
pub struct TargetMapBuilder {
    map: Vec<WordId>,
    offsets: Vec<u32>,
}

impl TargetMapBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// ソースIDと単語IDの対応を追加します。
    ///
    /// # エラー
    ///
    /// ソースIDが飛んでいる・戻っている場合、または単語IDが減少する場合はエラーを返します。
    pub fn push(&mut self, source_id: usize, word_id: WordId) -> Result<()> {
        let current = self.offsets.len();
        if source_id == current {
            self.offsets.push(u32::try_from(self.map.len())?);
        } else if source_id + 1 != current {
            return Err(KanadictError::invalid_argument(
                "source_id",
                format!("source ids must be added consecutively: got {source_id}, expected {current}"),
            ));
        }
        if let Some(&last) = self.map.last()
            && word_id < last
        {
            return Err(KanadictError::invalid_argument(
                "word_id",
                format!("word ids must be non-decreasing: got {word_id} after {last}"),
            ));
        }
        self.map.push(word_id);
        Ok(())
    }

    /// ターゲットマップを構築します。
    pub fn build(self) -> Result<TargetMap> {
        let Self { map, mut offsets } = self;
        offsets.push(u32::try_from(map.len())?);
        Ok(TargetMap { map, offsets })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_values(num_offsets: u32, values: &[u32]) -> Result<TargetMap> {
        TargetMap::decode(num_offsets, values.iter().map(|&v| Ok(v)))
    }

    fn ids(values: &[u32]) -> Vec<WordId> {
        values.iter().copied().map(WordId::new).collect()
    }

    #[test]
    fn test_decode_accumulates_across_runs() {
        let tm = decode_values(4, &[(3 << 1) | 1, (5 << 1) | 1, 7 << 1, (2 << 1) | 1]).unwrap();
        assert_eq!(tm.num_sources(), 3);
        assert_eq!(tm.offsets(), &[0, 1, 3, 4]);
        assert_eq!(tm.candidates(0), ids(&[3]).as_slice());
        assert_eq!(tm.candidates(1), ids(&[8, 15]).as_slice());
        assert_eq!(tm.candidates(2), ids(&[17]).as_slice());
    }

    #[test]
    fn test_decode_zero_delta_run_start() {
        let tm = decode_values(3, &[1, 0, 1]).unwrap();
        assert_eq!(tm.candidates(0), ids(&[0, 0]).as_slice());
        assert_eq!(tm.candidates(1), ids(&[0]).as_slice());
    }

    #[test]
    fn test_decode_empty() {
        let tm = decode_values(1, &[]).unwrap();
        assert_eq!(tm.num_sources(), 0);
        assert!(tm.is_empty());
        assert_eq!(tm.offsets(), &[0]);
    }

    #[test]
    fn test_decode_too_few_runs() {
        let err = decode_values(4, &[1, 2, 3]).err().unwrap();
        assert!(err.is_format_error());
    }

    #[test]
    fn test_decode_too_many_runs() {
        let err = decode_values(2, &[1, 3, 3]).err().unwrap();
        assert!(err.is_format_error());
    }

    #[test]
    fn test_decode_accumulator_overflow() {
        let err = decode_values(2, &[u32::MAX, u32::MAX, u32::MAX]).err().unwrap();
        assert!(err.is_format_error());
    }

    #[test]
    fn test_decode_propagates_stream_error() {
        let values = vec![
            Ok(1),
            Err(KanadictError::invalid_format("targetMap", "truncated")),
        ];
        assert!(TargetMap::decode(2, values).err().unwrap().is_format_error());
    }

    #[test]
    fn test_offsets_are_monotonic() {
        let tm = decode_values(5, &[1, 1, 0, 2, 3, 0, 5]).unwrap();
        assert!(tm.offsets().windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*tm.offsets().last().unwrap() as usize, tm.len());
    }

    #[test]
    fn test_runs_recover_partition() {
        let partition = vec![vec![4, 4, 9], vec![12], vec![20, 31]];
        let mut builder = TargetMapBuilder::new();
        for (source_id, word_ids) in partition.iter().enumerate() {
            for &word_id in word_ids {
                builder.push(source_id, WordId::new(word_id)).unwrap();
            }
        }
        let tm = builder.build().unwrap();

        let mut wtr = DataWriter::new(vec![]);
        tm.write(&mut wtr).unwrap();
        let data = wtr.into_inner();
        let mut rdr = DataReader::new(data.as_slice(), "targetMap");
        let decoded = TargetMap::from_reader(&mut rdr).unwrap();

        let runs: Vec<Vec<u32>> = decoded
            .runs()
            .map(|(_, ids)| ids.iter().map(|id| id.get()).collect())
            .collect();
        assert_eq!(runs, partition);
        assert_eq!(decoded.offsets(), tm.offsets());
    }

    #[test]
    fn test_builder_rejects_skipped_source() {
        let mut builder = TargetMapBuilder::new();
        builder.push(0, WordId::new(0)).unwrap();
        assert!(builder.push(2, WordId::new(4)).is_err());
    }

    #[test]
    fn test_builder_rejects_decreasing_word_id() {
        let mut builder = TargetMapBuilder::new();
        builder.push(0, WordId::new(8)).unwrap();
        assert!(builder.push(1, WordId::new(4)).is_err());
    }
}
