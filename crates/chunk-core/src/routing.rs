//! Track receives (`AUXRECV` lines) and FX parameters shown in the track
//! control panel (`PARM_TCP` lines).

use std::fmt;
use std::str::FromStr;

use crate::edit::Edit;
use crate::error::{Error, Result};
use crate::line::{indentation, tokenize};
use crate::patcher::{ChunkParserPatcher, LineFilter};
use crate::scan::{ChunkElement, ElementKind, SubChunkQuery};

const TRACK_TAG: &str = "TRACK";
const RECEIVE_FIELD: &str = "AUXRECV";
const MAIN_SEND_FIELD: &str = "MAINSEND";
const FX_CHAIN_TAG: &str = "FXCHAIN";
const ITEM_TAG: &str = "ITEM";
const FX_END_FIELD: &str = "WAK";
const TCP_PARAM_FIELD: &str = "PARM_TCP";

/// Where a receive taps the source track's signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendMode {
    PostFader,
    PreFx,
    PostFx,
    Other(u8),
}

impl SendMode {
    fn code(self) -> u8 {
        match self {
            Self::PostFader => 0,
            Self::PreFx => 1,
            Self::PostFx => 3,
            Self::Other(code) => code,
        }
    }

    fn from_code(code: u8) -> Self {
        match code {
            0 => Self::PostFader,
            1 => Self::PreFx,
            3 => Self::PostFx,
            other => Self::Other(other),
        }
    }
}

/// One `AUXRECV` line of a track chunk
#[derive(Debug, Clone, PartialEq)]
pub struct Receive {
    /// 0-based index of the track the audio comes from
    pub source_track: usize,
    pub mode: SendMode,
    pub volume: f64,
    pub pan: f64,
    pub mute: bool,
    pub mono: bool,
    pub phase_invert: bool,
    pub source_channels: i32,
    pub dest_channels: i32,
    /// -1 uses the project default
    pub pan_law: f64,
    pub midi_flags: i32,
    /// -1 follows the track's automation mode
    pub automation_mode: i32,
}

impl Receive {
    pub fn new(source_track: usize) -> Self {
        Self {
            source_track,
            mode: SendMode::PostFader,
            volume: 1.0,
            pan: 0.0,
            mute: false,
            mono: false,
            phase_invert: false,
            source_channels: 0,
            dest_channels: 0,
            pan_law: -1.0,
            midi_flags: 0,
            automation_mode: -1,
        }
    }

    pub fn with_mode(mut self, mode: SendMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = volume;
        self
    }

    pub fn with_pan(mut self, pan: f64) -> Self {
        self.pan = pan;
        self
    }
}

impl fmt::Display for Receive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{RECEIVE_FIELD} {} {} {:.14} {:.14} {} {} {} {} {} {:.14} {} {} ''",
            self.source_track,
            self.mode.code(),
            self.volume,
            self.pan,
            u8::from(self.mute),
            u8::from(self.mono),
            u8::from(self.phase_invert),
            self.source_channels,
            self.dest_channels,
            self.pan_law,
            self.midi_flags,
            self.automation_mode,
        )
    }
}

impl FromStr for Receive {
    type Err = Error;

    /// Parse an `AUXRECV` line. Trailing fields older hosts do not write
    /// fall back to their defaults.
    fn from_str(line: &str) -> Result<Self> {
        let tokens = tokenize(line);
        let values: Vec<&str> = tokens.iter().map(|t| t.value).collect();
        if values.first() != Some(&RECEIVE_FIELD) {
            return Err(Error::parse(0, format!("not an {RECEIVE_FIELD} line")));
        }

        let source_track = parse_at(&values, 1)?
            .ok_or_else(|| Error::parse(0, "AUXRECV without a source track"))?;
        let defaults = Self::new(source_track);
        let flag = |index: usize, default: bool| -> Result<bool> {
            Ok(parse_at::<u8>(&values, index)?.map_or(default, |v| v != 0))
        };

        Ok(Self {
            source_track,
            mode: parse_at::<u8>(&values, 2)?.map_or(defaults.mode, SendMode::from_code),
            volume: parse_at(&values, 3)?.unwrap_or(defaults.volume),
            pan: parse_at(&values, 4)?.unwrap_or(defaults.pan),
            mute: flag(5, defaults.mute)?,
            mono: flag(6, defaults.mono)?,
            phase_invert: flag(7, defaults.phase_invert)?,
            source_channels: parse_at(&values, 8)?.unwrap_or(defaults.source_channels),
            dest_channels: parse_at(&values, 9)?.unwrap_or(defaults.dest_channels),
            pan_law: parse_at(&values, 10)?.unwrap_or(defaults.pan_law),
            midi_flags: parse_at(&values, 11)?.unwrap_or(defaults.midi_flags),
            automation_mode: parse_at(&values, 12)?.unwrap_or(defaults.automation_mode),
        })
    }
}

fn parse_at<T: FromStr>(values: &[&str], index: usize) -> Result<Option<T>> {
    match values.get(index) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| Error::parse(0, format!("invalid AUXRECV field {index}: {raw:?}"))),
    }
}

fn track_query() -> SubChunkQuery {
    SubChunkQuery::new(TRACK_TAG)
}

/// The track's own FX chain, not an item's or a frozen copy
fn track_fx_chain_query() -> SubChunkQuery {
    SubChunkQuery::new(FX_CHAIN_TAG).at_depth(1).stop_at(ITEM_TAG)
}

impl ChunkParserPatcher {
    /// Receives of the first `TRACK` block, in chunk order
    pub fn receives(&self) -> Result<Vec<Receive>> {
        let outline = self.outline()?;
        let Some(track) = outline.locate(&track_query()).filter(|e| e.is_block()) else {
            return Ok(Vec::new());
        };
        outline
            .children(track.id)
            .filter(|e| e.kind == ElementKind::Field && e.tag == RECEIVE_FIELD)
            .map(|e| {
                self.text().lines()[e.start]
                    .parse::<Receive>()
                    .map_err(|err| relocate(err, e.start))
            })
            .collect()
    }

    /// Add an `AUXRECV` line to the track.
    ///
    /// It goes after the last existing receive, else after `MAINSEND`, else
    /// before the first nested block, else right before the closing marker.
    pub fn add_receive(&mut self, receive: &Receive) -> Result<bool> {
        let outline = self.outline()?;
        let Some(track) = outline.locate(&track_query()).filter(|e| e.is_block()) else {
            return Ok(false);
        };
        let children: Vec<_> = outline.children(track.id).collect();
        let field_named =
            |e: &ChunkElement, tag: &str| e.kind == ElementKind::Field && e.tag == tag;

        let at = children
            .iter()
            .rev()
            .find(|e| field_named(e, RECEIVE_FIELD))
            .or_else(|| children.iter().find(|e| field_named(e, MAIN_SEND_FIELD)))
            .map(|e| e.start + 1)
            .or_else(|| children.iter().find(|e| e.is_block()).map(|e| e.start))
            .unwrap_or(track.end);
        let indent = children
            .first()
            .map(|e| indentation(&self.text().lines()[e.start]).to_string())
            .unwrap_or_default();

        self.insert_fragment(at, &[format!("{indent}{receive}")])?;
        tracing::debug!(source_track = receive.source_track, line = at, "added receive");
        Ok(true)
    }

    /// Remove the `index`-th receive of the track
    pub fn remove_receive(&mut self, index: usize) -> Result<bool> {
        self.remove_line(&track_query(), RECEIVE_FIELD, index, &LineFilter::Any)
    }

    /// Remove every receive coming from `source_track`, returning how many
    pub fn remove_receives_from(&mut self, source_track: usize) -> Result<usize> {
        let outline = self.outline()?;
        let Some(track) = outline.locate(&track_query()).filter(|e| e.is_block()) else {
            return Ok(0);
        };
        let mut doomed = Vec::new();
        for element in outline
            .children(track.id)
            .filter(|e| e.kind == ElementKind::Field && e.tag == RECEIVE_FIELD)
        {
            let line = &self.text().lines()[element.start];
            let receive = line
                .parse::<Receive>()
                .map_err(|err| relocate(err, element.start))?;
            if receive.source_track == source_track {
                doomed.push((element.start, line.clone()));
            }
        }

        // bottom-up so earlier indices stay valid
        for (line, content) in doomed.iter().rev() {
            self.apply(Edit::delete(*line, vec![content.clone()]))?;
        }
        Ok(doomed.len())
    }

    /// Show parameter `param` of FX `fx` in the track control panel.
    ///
    /// Inserts `PARM_TCP <param>` before the FX's `WAK` line in the track FX
    /// chain. Returns `false` when the chain or FX does not exist or the
    /// parameter is already shown.
    pub fn add_tcp_fx_param(&mut self, fx: usize, param: usize) -> Result<bool> {
        let chain_query = track_fx_chain_query();
        let Some(chain) = self.get_sub_chunk(&chain_query)? else {
            return Ok(false);
        };

        let mut chain_session =
            ChunkParserPatcher::from_chunk(chain.text).with_config(self.config().clone());
        let root = SubChunkQuery::new(FX_CHAIN_TAG);
        let outline = chain_session.outline()?;
        let Some(root_block) = outline.locate(&root).filter(|e| e.is_block()) else {
            return Ok(false);
        };
        let fields: Vec<_> = outline
            .children(root_block.id)
            .filter(|e| e.kind == ElementKind::Field)
            .collect();
        let mut fx_ends = fields.iter().filter(|e| e.tag == FX_END_FIELD);
        let segment_start = match fx.checked_sub(1) {
            Some(previous) => match fx_ends.clone().nth(previous) {
                Some(e) => e.start,
                None => return Ok(false),
            },
            None => root_block.start,
        };
        let Some(wak) = fx_ends.nth(fx).map(|e| e.start) else {
            return Ok(false);
        };

        let param_text = param.to_string();
        let already_shown = fields
            .iter()
            .filter(|e| e.tag == TCP_PARAM_FIELD && e.start > segment_start && e.start < wak)
            .any(|e| {
                tokenize(&chain_session.text().lines()[e.start])
                    .get(1)
                    .is_some_and(|t| t.value == param_text)
            });
        if already_shown {
            return Ok(false);
        }

        let indent = indentation(&chain_session.text().lines()[wak]).to_string();
        let line = format!("{indent}{TCP_PARAM_FIELD} {param}");
        if !chain_session.insert_before_field(&root, FX_END_FIELD, fx, &[line])? {
            return Ok(false);
        }
        let patched = chain_session.into_text();
        self.replace_sub_chunk(&chain_query, &patched)
    }
}

/// Attach the chunk line number to a line-level parse error
fn relocate(err: Error, line: usize) -> Error {
    match err {
        Error::Parse { message, .. } => Error::Parse { line, message },
        other => other,
    }
}
