//! Basic usage example for chunk-core

use chunk_core::{
    ChunkParserPatcher, LineFilter, MemoryHost, ObjectHandle, Receive, SendMode, SubChunkQuery,
    UndoBehavior,
};

fn main() -> chunk_core::Result<()> {
    let track = ObjectHandle::track(1);
    let mut host = MemoryHost::new();
    host.insert(
        track,
        r#"<TRACK
  NAME "Vocals"
  MAINSEND 1 0
  <ITEM
    POSITION 0
    <SOURCE WAVE
      FILE "take1.wav"
    >
  >
>
"#,
    );

    let mut session = ChunkParserPatcher::from_host(&host, track)?;

    // Extract a nested block
    if let Some(source) = session.get_sub_chunk(&SubChunkQuery::new("SOURCE").within("ITEM"))? {
        println!("Source at lines {}..={}:\n{}", source.start, source.end, source.text);
    }

    // Patch the chunk
    session.add_receive(&Receive::new(3).with_mode(SendMode::PreFx))?;
    session.remove_line(
        &SubChunkQuery::new("SOURCE"),
        "FILE",
        0,
        &LineFilter::contains("take1"),
    )?;
    println!("Pending changes:\n{}", session.diff().unified());

    // Hand the result back to the host
    let outcome = session.commit(&mut host, UndoBehavior::AddUndoPoint)?;
    println!("Commit: {outcome:?}");
    println!("\nFinal state:\n{}", host.state(track).unwrap_or_default());

    Ok(())
}
