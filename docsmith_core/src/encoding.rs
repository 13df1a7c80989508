use std::fmt;

use crate::DocsmithError;
use crate::DocsmithResult;

/// A text encoding that include files can be decoded with.
///
/// Decoding is strict: bytes that are invalid for the encoding produce an
/// error instead of replacement characters, so that a mismatched encoding is
/// reported rather than silently rendered as garbage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum TextEncoding {
	#[default]
	Utf8,
	/// UTF-8 with an optional leading byte order mark, which is stripped.
	Utf8Sig,
	Ascii,
	Latin1,
	Utf16Le,
	Utf16Be,
}

impl TextEncoding {
	/// Resolve an encoding label such as `utf-8` or `ISO_8859_1`.
	pub fn from_label(label: &str) -> DocsmithResult<Self> {
		let normalized = label.trim().to_ascii_lowercase().replace('_', "-");
		let encoding = match normalized.as_str() {
			"utf-8" | "utf8" => Self::Utf8,
			"utf-8-sig" | "utf8-sig" => Self::Utf8Sig,
			"ascii" | "us-ascii" => Self::Ascii,
			"latin-1" | "latin1" | "iso-8859-1" | "iso8859-1" | "l1" => Self::Latin1,
			"utf-16le" | "utf-16-le" => Self::Utf16Le,
			"utf-16be" | "utf-16-be" => Self::Utf16Be,
			_ => return Err(DocsmithError::UnknownEncoding(label.to_string())),
		};

		Ok(encoding)
	}

	pub fn label(self) -> &'static str {
		match self {
			Self::Utf8 => "utf-8",
			Self::Utf8Sig => "utf-8-sig",
			Self::Ascii => "ascii",
			Self::Latin1 => "latin-1",
			Self::Utf16Le => "utf-16le",
			Self::Utf16Be => "utf-16be",
		}
	}

	/// Decode `bytes` read from `path`. The path is only used for the error.
	pub fn decode(self, bytes: &[u8], path: &str) -> DocsmithResult<String> {
		let error = || DocsmithError::Decode {
			path: path.to_string(),
			encoding: self.label().to_string(),
		};

		match self {
			Self::Utf8 => String::from_utf8(bytes.to_vec()).map_err(|_| error()),
			Self::Utf8Sig => {
				let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);
				String::from_utf8(bytes.to_vec()).map_err(|_| error())
			}
			Self::Ascii => {
				if bytes.is_ascii() {
					Ok(bytes.iter().map(|&b| char::from(b)).collect())
				} else {
					Err(error())
				}
			}
			Self::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
			Self::Utf16Le | Self::Utf16Be => {
				if bytes.len() % 2 != 0 {
					return Err(error());
				}
				let units = bytes.chunks_exact(2).map(|pair| {
					let pair = [pair[0], pair[1]];
					if self == Self::Utf16Le {
						u16::from_le_bytes(pair)
					} else {
						u16::from_be_bytes(pair)
					}
				});
				let text: String = char::decode_utf16(units)
					.collect::<Result<_, _>>()
					.map_err(|_| error())?;
				if let Some(rest) = text.strip_prefix('\u{feff}') {
					return Ok(rest.to_string());
				}
				Ok(text)
			}
		}
	}
}

impl fmt::Display for TextEncoding {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}
