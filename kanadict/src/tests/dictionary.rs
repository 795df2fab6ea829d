use crate::dictionary::*;
use crate::utils::hashmap;

const LEXICON: &str = "\
東京,1293,1293,3003,名詞,固有名詞,地域,一般,*,*,東京,トウキョウ,トーキョー
京都,1293,1293,2135,名詞,固有名詞,地域,一般,*,*,京都,キョウト,キョート
いく,577,577,5000,動詞,自立,*,*,五段・カ行促音便,基本形,いく,イク,イク
いった,578,578,7000,動詞,自立,*,*,五段・カ行促音便,連用タ接続,いく,イッタ,イッタ
いった,1285,1285,9000,名詞,一般,*,*,*,*,*,イッタ,イッタ
ABC,1285,1285,3000,名詞,一般,*,*,*,*,*,エービーシー,エービーシー
走っ,772,772,5812,動詞,自立,*,*,五段・ラ行,連用タ接続,走る,ハシッ,ハシッ
";

fn chars(s: &str) -> Vec<char> {
    s.chars().collect()
}

fn round_trip(builder: &DictionaryBuilder) -> Dictionary {
    let mut target_map = vec![];
    let mut pos = vec![];
    let mut buffer = vec![];
    builder.write(&mut target_map, &mut pos, &mut buffer).unwrap();
    Dictionary::from_readers(&target_map[..], &pos[..], &buffer[..]).unwrap()
}

fn source(builder: &DictionaryBuilder, surface: &str) -> usize {
    builder.source_id(surface).unwrap()
}

#[test]
fn test_dictionary_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Dictionary>();
}

#[test]
fn test_round_trip_preserves_sections() {
    let builder = DictionaryBuilder::from_reader(LEXICON.as_bytes()).unwrap();
    let dict = round_trip(&builder);

    assert_eq!(dict.num_sources(), builder.surfaces().len());
    assert_eq!(dict.target_map().offsets(), builder.dictionary().target_map().offsets());
    assert_eq!(dict.pos_table(), builder.dictionary().pos_table());
    assert_eq!(dict.words().as_bytes(), builder.dictionary().words().as_bytes());
}

#[test]
fn test_decode_entries() {
    let builder = DictionaryBuilder::from_reader(LEXICON.as_bytes()).unwrap();
    let dict = round_trip(&builder);

    let surface = chars("いった");
    let candidates = dict.candidates(source(&builder, "いった"));
    assert_eq!(candidates.len(), 2);

    let verb = dict.decode(candidates[0], &surface);
    assert_eq!(verb.left_id, 578);
    assert_eq!(verb.word_cost, 7000);
    assert_eq!(verb.part_of_speech, "動詞-自立");
    assert_eq!(verb.inflection_type, Some("五段・カ行促音便"));
    assert_eq!(verb.inflection_form, Some("連用タ接続"));
    assert_eq!(verb.base_form.as_deref(), Some("いく"));
    assert_eq!(verb.reading, TextField::Derived("イッタ".to_string()));
    assert_eq!(verb.pronunciation, TextField::Derived("イッタ".to_string()));

    let noun = dict.decode(candidates[1], &surface);
    assert_eq!(noun.part_of_speech, "名詞-一般");
    assert_eq!(noun.inflection_type, None);
    assert_eq!(noun.base_form, None);
    assert_eq!(noun.base_form_or("いった"), "いった");

    let surface = chars("東京");
    let word_id = dict.candidates(source(&builder, "東京"))[0];
    let entry = dict.decode(word_id, &surface);
    assert_eq!(entry.part_of_speech, "名詞-固有名詞-地域-一般");
    assert_eq!(entry.reading, TextField::Stored("トウキョウ".to_string()));
    assert_eq!(entry.pronunciation, TextField::Stored("トーキョー".to_string()));

    let surface = chars("走っ");
    let word_id = dict.candidates(source(&builder, "走っ"))[0];
    assert_eq!(dict.base_form(word_id, &surface).as_deref(), Some("走る"));
    assert_eq!(dict.reading(word_id, &surface), "ハシッ");
}

#[test]
fn test_facade_accessors_agree_with_decode() {
    let builder = DictionaryBuilder::from_reader(LEXICON.as_bytes()).unwrap();
    let dict = round_trip(&builder);

    for (source_id, surface) in builder.surfaces().iter().enumerate() {
        let surface = chars(surface);
        for &word_id in dict.candidates(source_id) {
            let entry = dict.decode(word_id, &surface);
            assert_eq!(entry.word_id, word_id);
            assert_eq!(entry.left_id, dict.left_id(word_id));
            assert_eq!(entry.word_cost, dict.word_cost(word_id));
            assert_eq!(entry.part_of_speech, dict.part_of_speech(word_id));
            assert_eq!(entry.inflection_type, dict.inflection_type(word_id));
            assert_eq!(entry.inflection_form, dict.inflection_form(word_id));
            assert_eq!(entry.base_form, dict.base_form(word_id, &surface));
            assert_eq!(entry.reading.as_str(), dict.reading(word_id, &surface));
            assert_eq!(
                entry.pronunciation.as_str(),
                dict.pronunciation(word_id, &surface)
            );
        }
    }
}

#[test]
fn test_left_id_equals_right_id() {
    let dict = DictionaryBuilder::from_reader(LEXICON.as_bytes())
        .unwrap()
        .build();
    for (_, word_ids) in dict.target_map().runs() {
        for &word_id in word_ids {
            assert_eq!(dict.left_id(word_id), dict.right_id(word_id));
        }
    }
}

#[test]
fn test_absent_pronunciation_equals_reading() {
    let builder = DictionaryBuilder::from_reader(LEXICON.as_bytes()).unwrap();
    let dict = round_trip(&builder);

    for (source_id, surface) in builder.surfaces().iter().enumerate() {
        let surface = chars(surface);
        for &word_id in dict.candidates(source_id) {
            if !dict.words().flags(word_id).has_pronunciation() {
                assert_eq!(
                    dict.pronunciation(word_id, &surface),
                    dict.reading(word_id, &surface)
                );
            }
        }
    }
}

#[test]
fn test_word_costs_by_surface() {
    let builder = DictionaryBuilder::from_reader(LEXICON.as_bytes()).unwrap();
    let dict = round_trip(&builder);

    let expected = hashmap![
        "東京" => vec![3003],
        "京都" => vec![2135],
        "いく" => vec![5000],
        "いった" => vec![7000, 9000],
        "ABC" => vec![3000],
        "走っ" => vec![5812],
    ];
    let mut actual = hashbrown::HashMap::new();
    for (source_id, word_ids) in dict.target_map().runs() {
        let costs: Vec<i16> = word_ids.iter().map(|&id| dict.word_cost(id)).collect();
        actual.insert(builder.surfaces()[source_id].as_str(), costs);
    }
    assert_eq!(actual, expected);
}
