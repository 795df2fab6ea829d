use crate::dictionary::codec::DataWriter;
use crate::dictionary::config::{DICT_HEADER, POSDICT_HEADER, TARGETMAP_HEADER, VERSION};
use crate::dictionary::*;
use crate::errors::KanadictError;

fn target_map_section(num_offsets: u32, values: &[u32]) -> Vec<u8> {
    let mut wtr = DataWriter::new(vec![]);
    wtr.write_header(TARGETMAP_HEADER, VERSION).unwrap();
    wtr.write_vint(values.len() as u32).unwrap();
    wtr.write_vint(num_offsets).unwrap();
    for &v in values {
        wtr.write_vint(v).unwrap();
    }
    wtr.into_inner()
}

fn pos_section(entries: &[(&str, &str, &str)]) -> Vec<u8> {
    let mut wtr = DataWriter::new(vec![]);
    wtr.write_header(POSDICT_HEADER, VERSION).unwrap();
    wtr.write_vint(entries.len() as u32).unwrap();
    for (pos, infl_type, infl_form) in entries {
        wtr.write_string(pos).unwrap();
        wtr.write_string(infl_type).unwrap();
        wtr.write_string(infl_form).unwrap();
    }
    wtr.into_inner()
}

fn buffer_section(declared_len: u32, body: &[u8]) -> Vec<u8> {
    let mut wtr = DataWriter::new(vec![]);
    wtr.write_header(DICT_HEADER, VERSION).unwrap();
    wtr.write_vint(declared_len).unwrap();
    wtr.write_bytes(body).unwrap();
    wtr.into_inner()
}

/// 2つのエントリを持つバッファ本体:
/// - offset 0: left id 1, cost -10, kana reading アグ
/// - offset 7: left id 0, cost 250, 格納フィールドなし
fn buffer_body() -> Vec<u8> {
    let mut body = ((1u16 << 3) | 2).to_be_bytes().to_vec();
    body.extend((-10i16).to_be_bytes());
    body.extend([(2 << 1) | 1, 0x02, 0x10]);
    body.extend(0u16.to_be_bytes());
    body.extend(250i16.to_be_bytes());
    body
}

#[test]
fn test_hand_built_dictionary() {
    let target_map = target_map_section(3, &[1, 7 << 1, 1]);
    let pos = pos_section(&[("名詞-一般", "", ""), ("動詞-自立", "五段・ガ行", "基本形")]);
    let body = buffer_body();
    let buffer = buffer_section(body.len() as u32, &body);

    let dict = Dictionary::from_readers(&target_map[..], &pos[..], &buffer[..]).unwrap();
    assert_eq!(dict.num_sources(), 2);
    assert_eq!(dict.candidates(0), &[WordId::new(0), WordId::new(7)]);
    assert_eq!(dict.candidates(1), &[WordId::new(7)]);

    let first = WordId::new(0);
    let surface: Vec<char> = "仰ぐ".chars().collect();
    assert_eq!(dict.left_id(first), 1);
    assert_eq!(dict.word_cost(first), -10);
    assert_eq!(dict.part_of_speech(first), "動詞-自立");
    assert_eq!(dict.inflection_type(first), Some("五段・ガ行"));
    assert_eq!(dict.reading(first, &surface), "アグ");
    assert_eq!(dict.pronunciation(first, &surface), "アグ");
    assert_eq!(dict.base_form(first, &surface), None);

    let second = WordId::new(7);
    let surface: Vec<char> = "すし".chars().collect();
    assert_eq!(dict.word_cost(second), 250);
    assert_eq!(dict.part_of_speech(second), "名詞-一般");
    assert_eq!(dict.inflection_form(second), None);
    assert_eq!(dict.reading(second, &surface), "スシ");
}

#[test]
fn test_run_count_mismatch_fails() {
    let target_map = target_map_section(4, &[1, 2, 3]);
    let pos = pos_section(&[("名詞", "", "")]);
    let buffer = buffer_section(0, &[]);
    let err = Dictionary::from_readers(&target_map[..], &pos[..], &buffer[..])
        .err()
        .unwrap();
    match err {
        KanadictError::InvalidFormat(e) => assert_eq!(e.section(), "targetMap"),
        e => panic!("unexpected error: {e}"),
    }
}

#[test]
fn test_truncated_buffer_fails() {
    let target_map = target_map_section(2, &[1]);
    let pos = pos_section(&[("名詞", "", "")]);
    let body = buffer_body();
    let buffer = buffer_section(body.len() as u32 + 1, &body);
    let err = Dictionary::from_readers(&target_map[..], &pos[..], &buffer[..])
        .err()
        .unwrap();
    assert!(err.is_format_error());
}

#[test]
fn test_truncated_pos_table_fails() {
    let target_map = target_map_section(2, &[1]);
    let mut pos = pos_section(&[("名詞", "", "")]);
    pos.pop();
    let buffer = buffer_section(0, &[]);
    assert!(
        Dictionary::from_readers(&target_map[..], &pos[..], &buffer[..])
            .err()
            .unwrap()
            .is_format_error()
    );
}

#[test]
fn test_sections_in_wrong_slots_fail() {
    let target_map = target_map_section(2, &[1]);
    let pos = pos_section(&[("名詞", "", "")]);
    let buffer = buffer_section(0, &[]);

    let err = Dictionary::from_readers(&pos[..], &target_map[..], &buffer[..])
        .err()
        .unwrap();
    assert!(err.is_format_error());

    let err = Dictionary::from_readers(&target_map[..], &buffer[..], &pos[..])
        .err()
        .unwrap();
    assert!(err.is_format_error());
}

#[test]
fn test_unsupported_version_fails() {
    let mut wtr = DataWriter::new(vec![]);
    wtr.write_header(TARGETMAP_HEADER, VERSION + 1).unwrap();
    wtr.write_vint(0).unwrap();
    wtr.write_vint(1).unwrap();
    let target_map = wtr.into_inner();
    let pos = pos_section(&[]);
    let buffer = buffer_section(0, &[]);
    assert!(
        Dictionary::from_readers(&target_map[..], &pos[..], &buffer[..])
            .err()
            .unwrap()
            .is_format_error()
    );
}
