//! 辞書ファイルの配置とヘッダ定数
//!
//! 1つの辞書は、共通の接頭辞を持つ3つのファイルで構成されます。
//!
//! | ファイル | 内容 |
//! |---|---|
//! | `<prefix>$targetMap.dat` | ターゲットマップ |
//! | `<prefix>$posDict.dat` | 品詞テーブル |
//! | `<prefix>$buffer.dat` | 単語エントリバッファ |

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// ターゲットマップのコーデック名
pub const TARGETMAP_HEADER: &str = "kuromoji_dict_map";

/// 品詞テーブルのコーデック名
pub const POSDICT_HEADER: &str = "kuromoji_dict_pos";

/// 単語エントリバッファのコーデック名
pub const DICT_HEADER: &str = "kuromoji_dict";

/// サポートする形式バージョン
pub const VERSION: u32 = 1;

pub const TARGETMAP_FILENAME_SUFFIX: &str = "$targetMap.dat";
pub const POSDICT_FILENAME_SUFFIX: &str = "$posDict.dat";
pub const DICT_FILENAME_SUFFIX: &str = "$buffer.dat";

/// 辞書を構成する3つのファイルのパス
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DictionaryPaths {
    pub target_map: PathBuf,
    pub pos: PathBuf,
    pub buffer: PathBuf,
}

impl DictionaryPaths {
    /// 共通の接頭辞からパスを作成します。
    ///
    /// # 例
    ///
    /// ```
    /// use std::path::Path;
    /// use kanadict::DictionaryPaths;
    ///
    /// let paths = DictionaryPaths::from_prefix("dict/TokenInfoDictionary");
    /// assert_eq!(paths.pos, Path::new("dict/TokenInfoDictionary$posDict.dat"));
    /// ```
    pub fn from_prefix<P>(prefix: P) -> Self
    where
        P: AsRef<Path>,
    {
        let prefix = prefix.as_ref();
        let with_suffix = |suffix: &str| {
            let mut name = OsString::from(prefix.as_os_str());
            name.push(suffix);
            PathBuf::from(name)
        };
        Self {
            target_map: with_suffix(TARGETMAP_FILENAME_SUFFIX),
            pos: with_suffix(POSDICT_FILENAME_SUFFIX),
            buffer: with_suffix(DICT_FILENAME_SUFFIX),
        }
    }

    /// ターゲットマップ・品詞テーブル・バッファの順にパスを返します。
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        [&self.target_map, &self.pos, &self.buffer]
            .into_iter()
            .map(PathBuf::as_path)
    }
}
