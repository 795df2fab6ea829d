//! 辞書を引くユーティリティ
//!
//! このバイナリは、標準入力から1行に1つずつ表層形を読み込み、
//! その候補となる単語エントリを指定された出力形式（mecab、detail）で出力します。

use std::collections::HashMap;
use std::error::Error;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::str::FromStr;

use kanadict::{Dictionary, DictionaryPaths, LoadMode, WordEntry};

use clap::Parser;

/// 出力モード
#[derive(Clone, Debug)]
enum OutputMode {
    Mecab,
    Detail,
}

impl FromStr for OutputMode {
    type Err = &'static str;

    fn from_str(mode: &str) -> Result<Self, Self::Err> {
        match mode {
            "mecab" => Ok(Self::Mecab),
            "detail" => Ok(Self::Detail),
            _ => Err("Could not parse a mode"),
        }
    }
}

/// コマンドライン引数
#[derive(Parser, Debug)]
#[clap(name = "lookup", about = "Looks up word entries by surface")]
struct Args {
    /// Path prefix of the dictionary files.
    #[clap(short = 'i', long)]
    prefix_in: PathBuf,

    /// Source id list written by `compile build --surfaces-out`.
    #[clap(short = 's', long)]
    surfaces_in: PathBuf,

    /// Output mode. Choices are mecab and detail.
    #[clap(short = 'O', long, default_value = "mecab")]
    output_mode: OutputMode,

    /// Memory-maps the word entry buffer instead of reading it.
    #[clap(long)]
    mmap: bool,
}

/// `source_id<TAB>surface` 形式の一覧を読み込む
///
/// 辞書のソース数以上のIDを含む一覧は、別の辞書から作られたものとしてエラーにする。
fn read_surfaces<R>(
    rdr: R,
    name: &str,
    num_sources: usize,
) -> Result<HashMap<String, usize>, Box<dyn Error>>
where
    R: BufRead,
{
    let mut surfaces = HashMap::new();
    for line in rdr.lines() {
        let line = line?;
        let Some((source_id, surface)) = line.split_once('\t') else {
            return Err(format!("Invalid line in {name}: {line}").into());
        };
        let source_id: usize = source_id.parse()?;
        if source_id >= num_sources {
            return Err(format!(
                "Source id {source_id} in {name} is out of range: the dictionary has {num_sources} sources"
            )
            .into());
        }
        surfaces.insert(surface.to_string(), source_id);
    }
    Ok(surfaces)
}

/// 値がなければ `*` を返す
fn or_absent(value: Option<&str>) -> &str {
    value.unwrap_or("*")
}

fn feature(surface: &str, entry: &WordEntry<'_>) -> String {
    format!(
        "{},{},{},{},{},{}",
        entry.part_of_speech,
        or_absent(entry.inflection_type),
        or_absent(entry.inflection_form),
        entry.base_form_or(surface),
        entry.reading,
        entry.pronunciation,
    )
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    eprintln!("Loading the dictionary...");
    let mode = if args.mmap {
        LoadMode::Mmap
    } else {
        LoadMode::Read
    };
    let dict = Dictionary::from_paths(&DictionaryPaths::from_prefix(&args.prefix_in), mode)?;
    let surfaces = read_surfaces(
        BufReader::new(File::open(&args.surfaces_in)?),
        &args.surfaces_in.display().to_string(),
        dict.num_sources(),
    )?;

    eprintln!("Ready to look up");

    let out = std::io::stdout();
    let mut out = BufWriter::new(out.lock());
    for line in std::io::stdin().lock().lines() {
        let line = line?;
        let surface = line.trim();
        if let Some(&source_id) = surfaces.get(surface) {
            let chars: Vec<char> = surface.chars().collect();
            for &word_id in dict.candidates(source_id) {
                let entry = dict.decode(word_id, &chars);
                match args.output_mode {
                    OutputMode::Mecab => {
                        writeln!(&mut out, "{surface}\t{}", feature(surface, &entry))?;
                    }
                    OutputMode::Detail => {
                        writeln!(
                            &mut out,
                            "{surface}\t{}\tword_id={}\tleft_id={}\tright_id={}\tword_cost={}\treading_stored={}\tpronunciation_stored={}",
                            feature(surface, &entry),
                            entry.word_id,
                            entry.left_id,
                            entry.right_id,
                            entry.word_cost,
                            entry.reading.is_stored(),
                            entry.pronunciation.is_stored(),
                        )?;
                    }
                }
            }
        }
        out.write_all(b"EOS\n")?;
        out.flush()?;
    }

    Ok(())
}
