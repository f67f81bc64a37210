// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: parses the in-band `AESDCHAR_IOCSEEKTO:` seek directive out of an
//! accumulated request line
//!
//! The wire protocol is line-oriented text, not a binary frame, so this is a
//! much thinner cousin of a length-prefixed decoder: one fixed prefix, two
//! decimal fields, strict rejection of anything else.

/// Literal prefix identifying a seek directive rather than an ordinary write.
pub const SEEK_PREFIX: &str = "AESDCHAR_IOCSEEKTO:";

/// A parsed seek directive: `(command index, intra-command offset)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeekDirective {
    pub write_cmd: u32,
    pub write_cmd_offset: u32,
}

/// Classifies one accumulated, newline-terminated request line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request<'a> {
    /// A seek directive to act on instead of appending.
    Seek(SeekDirective),
    /// An ordinary command to append to the log, bytes as received
    /// (including the trailing newline).
    Append(&'a [u8]),
}

/// Classifies `line` (expected to already include its trailing `\n`).
///
/// Anything not matching the exact `AESDCHAR_IOCSEEKTO:<u32>,<u32>\n` shape,
/// including a line that merely starts with the prefix but is malformed
/// afterward, is treated as an ordinary append — malformed seek syntax is
/// not a protocol error here, it is just not a seek.
pub fn classify(line: &[u8]) -> Request<'_> {
    if let Some(rest) = line.strip_prefix(SEEK_PREFIX.as_bytes()) {
        if let Some(directive) = parse_seek_body(rest) {
            return Request::Seek(directive);
        }
    }
    Request::Append(line)
}

fn parse_seek_body(rest: &[u8]) -> Option<SeekDirective> {
    let rest = rest.strip_suffix(b"\n")?;
    let text = std::str::from_utf8(rest).ok()?;
    let (cmd, offset) = text.split_once(',')?;
    let write_cmd = cmd.trim().parse::<u32>().ok()?;
    let write_cmd_offset = offset.trim().parse::<u32>().ok()?;
    Some(SeekDirective { write_cmd, write_cmd_offset })
}
