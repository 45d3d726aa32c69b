//! Tests for ChunkText

use chunk_core::{ChunkText, Error};
use pretty_assertions::assert_eq;
use rstest::rstest;

#[rstest]
#[case("")]
#[case("\n")]
#[case("<ITEM\n>\n")]
#[case("<ITEM\n>")]
#[case("<ITEM\r\n  NAME \"x y\"\r\n>\r\n")]
#[case("a\n\n\nb\n\n")]
#[case("   leading and trailing   \n\t>\n")]
fn test_load_to_text_is_byte_identical(#[case] raw: &str) {
    let text = ChunkText::load(raw).unwrap();
    assert_eq!(text.to_text(), raw);

    let again = ChunkText::load(&text.to_text()).unwrap();
    assert_eq!(again, text);
}

#[test]
fn test_load_splits_lines_verbatim() {
    let text = ChunkText::load("<TRACK\n  NAME \"Bass\"\n>\n").unwrap();
    assert_eq!(text.len(), 3);
    assert_eq!(text.line(1).unwrap(), "  NAME \"Bass\"");
}

#[test]
fn test_load_rejects_nul() {
    let err = ChunkText::load("<ITEM\nNAME a\0b\n>\n").unwrap_err();
    assert!(matches!(err, Error::Parse { line: 1, .. }));
}

#[test]
fn test_line_out_of_range() {
    let mut text = ChunkText::load("a\nb\n").unwrap();
    assert!(matches!(
        text.line(2),
        Err(Error::LineOutOfRange { index: 2, len: 2 })
    ));
    assert!(matches!(
        text.set_line(5, "x"),
        Err(Error::LineOutOfRange { index: 5, len: 2 })
    ));
    assert!(text.insert_lines(3, ["x"]).is_err());
    assert!(text.remove_lines(1..3).is_err());
    assert_eq!(text.to_text(), "a\nb\n");
}

#[test]
fn test_set_line_returns_previous() {
    let mut text = ChunkText::load("<TAKE\nNAME old\n>\n").unwrap();
    let previous = text.set_line(1, "NAME new").unwrap();
    assert_eq!(previous, "NAME old");
    assert_eq!(text.to_text(), "<TAKE\nNAME new\n>\n");
}

#[test]
fn test_set_line_rejects_embedded_terminator() {
    let mut text = ChunkText::load("a\n").unwrap();
    assert!(matches!(text.set_line(0, "b\nc"), Err(Error::Parse { .. })));
    assert_eq!(text.line(0).unwrap(), "a");
}

#[test]
fn test_insert_lines_shifts_following_lines() {
    let mut text = ChunkText::load("<FXCHAIN\nWAK 0\n>\n").unwrap();
    let inserted = text.insert_lines(1, ["PARM_TCP 3", "PARM_TCP 4"]).unwrap();
    assert_eq!(inserted, 2);
    assert_eq!(text.line(3).unwrap(), "WAK 0");
    assert_eq!(text.to_text(), "<FXCHAIN\nPARM_TCP 3\nPARM_TCP 4\nWAK 0\n>\n");
}

#[test]
fn test_insert_into_empty_text() {
    let mut text = ChunkText::new();
    text.insert_lines(0, ["<TAKE", ">"]).unwrap();
    assert_eq!(text.to_text(), "<TAKE\n>\n");
}

#[test]
fn test_remove_lines_inclusive_range() {
    let mut text = ChunkText::load("<ITEM\n<SOURCE WAVE\nFILE a\n>\n>\n").unwrap();
    let removed = text.remove_lines(1..=3).unwrap();
    assert_eq!(removed, vec!["<SOURCE WAVE", "FILE a", ">"]);
    assert_eq!(text.to_text(), "<ITEM\n>\n");
}

#[test]
fn test_slice_copies_range() {
    let text = ChunkText::load("<ITEM\n<SOURCE WAVE\nFILE a\n>\n>\n").unwrap();
    let slice = text.slice(1, 3).unwrap();
    assert_eq!(slice.to_text(), "<SOURCE WAVE\nFILE a\n>\n");
    assert!(text.slice(3, 5).is_err());
}

#[test]
fn test_from_lines_and_display() {
    let text = ChunkText::from_lines(["<TAKE", "NAME x", ">"]).unwrap();
    assert_eq!(text.to_string(), "<TAKE\nNAME x\n>\n");
    assert!(ChunkText::from_lines(["a\nb"]).is_err());
}

#[test]
fn test_from_str() {
    let text: ChunkText = "<ITEM\n>\n".parse().unwrap();
    assert_eq!(text.len(), 2);
}
