//! Snapshot tests for session diffs

use chunk_core::{ChunkDiff, ChunkParserPatcher, LineChange, LineFilter, SubChunkQuery};

#[test]
fn test_unified_diff_of_removed_line() {
    let mut session = ChunkParserPatcher::from_text("<TAKE\nSOURCE WAVE\nFILE \"a.wav\"\n>\n").unwrap();
    session
        .remove_line(&SubChunkQuery::new("TAKE"), "FILE", 0, &LineFilter::Any)
        .unwrap();

    let diff = session.diff();
    insta::assert_snapshot!(diff.unified().trim_end(), @r###"
    --- original
    +++ patched
    @@ -1,4 +1,3 @@
     <TAKE
     SOURCE WAVE
    -FILE "a.wav"
     >
    "###);
}

#[test]
fn test_changes_carry_line_indices() {
    let diff = ChunkDiff::compute("<ITEM\nNAME a\n>\n", "<ITEM\nNAME b\n>\n");
    assert_eq!(
        diff.changes,
        vec![
            LineChange::Removed {
                line: 1,
                content: "NAME a".into(),
            },
            LineChange::Added {
                line: 1,
                content: "NAME b".into(),
            },
        ]
    );
    assert!(diff.similarity > 0.0 && diff.similarity < 1.0);
}

#[test]
fn test_identical_text_is_unchanged() {
    let diff = ChunkDiff::compute("<ITEM\n>\n", "<ITEM\n>\n");
    assert!(diff.is_unchanged);
    assert!(diff.unified().is_empty());
    assert_eq!(diff, ChunkDiff::default());
}
