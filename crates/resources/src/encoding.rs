//! Character set handling for filtered resources.
//!
//! Filtered resources are decoded to text before rendering and encoded again
//! on the way out, both with the same [`TextEncoding`]. Encodings are looked
//! up by label through `encoding_rs`, so the WHATWG label set applies
//! (`"UTF-8"`, `"windows-1252"`, `"Shift_JIS"`, `"UTF-16LE"`, ...), with two
//! exceptions:
//!
//! - ISO-8859-1 labels (`"ISO-8859-1"`, `"latin1"`, ...) select true ISO-8859-1,
//!   where bytes map one-to-one to U+0000..U+00FF. WHATWG folds them into
//!   windows-1252.
//! - UTF-16LE and UTF-16BE are written as UTF-16. `encoding_rs` only decodes
//!   them.

use crate::error::ProcessError;
use encoding_rs::{Encoder, EncoderResult, Encoding};
use sift_template::TextSink;
use std::borrow::Cow;
use std::fmt;
use std::io::{self, Write};

const ENCODE_BUFFER_SIZE: usize = 8 * 1024;

const LATIN1_NAME: &str = "ISO-8859-1";

const LATIN1_LABELS: &[&str] = &[
    "iso-8859-1",
    "iso8859-1",
    "iso_8859-1",
    "iso8859_1",
    "iso_8859-1:1987",
    "8859_1",
    "latin1",
    "l1",
    "cp819",
    "ibm819",
    "iso-ir-100",
    "csisolatin1",
];

#[derive(Clone, Copy, PartialEq, Eq)]
enum Charset {
    Whatwg(&'static Encoding),
    Latin1,
}

/// A text encoding used to read and write filtered resources.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TextEncoding {
    charset: Charset,
}

impl fmt::Debug for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TextEncoding").field(&self.name()).finish()
    }
}

impl Default for TextEncoding {
    /// UTF-8, the platform default.
    fn default() -> Self {
        Self::utf8()
    }
}

impl TextEncoding {
    pub fn utf8() -> Self {
        Self {
            charset: Charset::Whatwg(encoding_rs::UTF_8),
        }
    }

    /// Looks up an encoding by label. Labels are matched case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns `ProcessError::UnknownEncoding` if the label is not recognized.
    pub fn for_label(label: &str) -> Result<Self, ProcessError> {
        let trimmed = label.trim();
        if LATIN1_LABELS
            .iter()
            .any(|known| known.eq_ignore_ascii_case(trimmed))
        {
            return Ok(Self {
                charset: Charset::Latin1,
            });
        }
        Encoding::for_label(trimmed.as_bytes())
            .map(|encoding| Self {
                charset: Charset::Whatwg(encoding),
            })
            .ok_or_else(|| ProcessError::UnknownEncoding(label.to_string()))
    }

    /// Resolves an optional label, falling back to the platform default.
    pub fn resolve(label: Option<&str>) -> Result<Self, ProcessError> {
        match label {
            Some(label) => Self::for_label(label),
            None => Ok(Self::default()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self.charset {
            Charset::Whatwg(encoding) => encoding.name(),
            Charset::Latin1 => LATIN1_NAME,
        }
    }

    /// Decodes `bytes` without sniffing or stripping a byte-order mark, so a BOM
    /// present in the source survives into the output.
    ///
    /// Returns the text and whether malformed sequences had to be replaced
    /// with U+FFFD.
    pub fn decode<'b>(&self, bytes: &'b [u8]) -> (Cow<'b, str>, bool) {
        match self.charset {
            Charset::Whatwg(encoding) => encoding.decode_without_bom_handling(bytes),
            Charset::Latin1 => (encoding_rs::mem::decode_latin1(bytes), false),
        }
    }

    /// Wraps `inner` in a writer encoding text with this encoding.
    pub fn writer<W: Write>(&self, inner: W) -> EncodingWriter<W> {
        let encoder = match self.charset {
            Charset::Latin1 => TextEncoder::Direct(DirectCodec::Latin1),
            Charset::Whatwg(encoding) if encoding == encoding_rs::UTF_16LE => {
                TextEncoder::Direct(DirectCodec::Utf16Le)
            }
            Charset::Whatwg(encoding) if encoding == encoding_rs::UTF_16BE => {
                TextEncoder::Direct(DirectCodec::Utf16Be)
            }
            Charset::Whatwg(encoding) => TextEncoder::Whatwg(encoding.new_encoder()),
        };
        EncodingWriter {
            encoder,
            inner,
            buffer: vec![0; ENCODE_BUFFER_SIZE],
            unmappable: 0,
        }
    }
}

/// Encodings written without an `encoding_rs` encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DirectCodec {
    Utf16Le,
    Utf16Be,
    Latin1,
}

enum TextEncoder {
    Whatwg(Encoder),
    Direct(DirectCodec),
}

/// A [`TextSink`] that encodes text into a byte stream.
///
/// Characters the encoding cannot represent are written as `?`. Call
/// [`EncodingWriter::finish`] once all text has been written; stateful
/// encodings need it to emit their closing sequence.
pub struct EncodingWriter<W: Write> {
    encoder: TextEncoder,
    inner: W,
    buffer: Vec<u8>,
    unmappable: usize,
}

impl<W: Write> EncodingWriter<W> {
    /// Number of characters replaced because the encoding cannot represent them.
    pub fn unmappable(&self) -> usize {
        self.unmappable
    }

    /// Flushes the encoder state and the inner writer, and returns the inner writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.encode("", true)?;
        self.inner.flush()?;
        Ok(self.inner)
    }

    fn encode(&mut self, text: &str, last: bool) -> io::Result<()> {
        match &mut self.encoder {
            TextEncoder::Whatwg(encoder) => encode_whatwg(
                encoder,
                text,
                last,
                &mut self.buffer,
                &mut self.inner,
                &mut self.unmappable,
            ),
            TextEncoder::Direct(codec) => encode_direct(
                *codec,
                text,
                &mut self.buffer,
                &mut self.inner,
                &mut self.unmappable,
            ),
        }
    }
}

impl<W: Write> TextSink for EncodingWriter<W> {
    fn write_text(&mut self, text: &str) -> io::Result<()> {
        self.encode(text, false)
    }
}

fn encode_whatwg<W: Write>(
    encoder: &mut Encoder,
    text: &str,
    last: bool,
    buffer: &mut [u8],
    inner: &mut W,
    unmappable: &mut usize,
) -> io::Result<()> {
    let mut remaining = text;
    loop {
        let (result, read, written) =
            encoder.encode_from_utf8_without_replacement(remaining, buffer, last);
        inner.write_all(&buffer[..written])?;
        remaining = &remaining[read..];
        match result {
            EncoderResult::InputEmpty => return Ok(()),
            EncoderResult::OutputFull => {}
            EncoderResult::Unmappable(_) => {
                *unmappable += 1;
                encode_whatwg(encoder, "?", false, buffer, inner, unmappable)?;
            }
        }
    }
}

fn encode_direct<W: Write>(
    codec: DirectCodec,
    text: &str,
    buffer: &mut [u8],
    inner: &mut W,
    unmappable: &mut usize,
) -> io::Result<()> {
    // A char takes at most four bytes in either codec.
    let mut filled = 0;
    for c in text.chars() {
        if filled + 4 > buffer.len() {
            inner.write_all(&buffer[..filled])?;
            filled = 0;
        }
        match codec {
            DirectCodec::Latin1 => {
                buffer[filled] = u8::try_from(u32::from(c)).unwrap_or_else(|_| {
                    *unmappable += 1;
                    b'?'
                });
                filled += 1;
            }
            DirectCodec::Utf16Le | DirectCodec::Utf16Be => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units).iter() {
                    let bytes = if codec == DirectCodec::Utf16Le {
                        unit.to_le_bytes()
                    } else {
                        unit.to_be_bytes()
                    };
                    buffer[filled..filled + 2].copy_from_slice(&bytes);
                    filled += 2;
                }
            }
        }
    }
    inner.write_all(&buffer[..filled])
}
