// ICY/SHOUTcast stream demultiplexer written in Rust
//
// Copyright (c) 2024 RustAudio contributors. All rights reserved.
// Licensed under MIT license, or Apache 2 license,
// at your option. Please see the LICENSE file
// attached to this source distribution for details.

/*!
The interleaved-stream demultiplexer

This is the core of the crate: [`IcyReader`] wraps a byte source that
interleaves periodic metadata blocks into an audio stream, and strips
them out transparently, handing the caller only audio bytes while
tracking the most recently parsed [`Metadata`] on the side.

See the protocol description in the crate root documentation for the
wire format this module consumes.
*/

use std::io;

use crate::error::IcyError;
use crate::metadata::Metadata;

/// The number of bytes a metadata block's length byte counts in.
const METADATA_BLOCK_UNIT: usize = 16;

/// A byte source an [`IcyReader`] can read from and close.
///
/// Most callers will reach for [`PlainSource`] to adapt a plain
/// [`std::io::Read`] value (an HTTP response body, a file, an in-memory
/// buffer) that has no separate close operation of its own.
pub trait IcySource {
	/// Reads into `buf`, following the same short-read contract as
	/// [`std::io::Read::read`]: `Ok(0)` means the source is exhausted,
	/// and a smaller-than-requested `Ok(n)` is not itself an error.
	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

	/// Releases the underlying transport. [`IcyReader::close`] guarantees
	/// this is called at most once, so implementations don't need to
	/// guard against a double close themselves.
	fn close(&mut self) -> io::Result<()>;
}

/// Adapts any [`std::io::Read`] into an [`IcySource`] with a no-op close.
///
/// Suitable for in-memory buffers, test fixtures, and any source whose
/// caller manages the underlying transport's lifetime independently of
/// this reader.
pub struct PlainSource<R>(pub R);

impl<R: io::Read> IcySource for PlainSource<R> {
	fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
		self.0.read(buf)
	}

	fn close(&mut self) -> io::Result<()> {
		Ok(())
	}
}

/// The outcome of a successful call to [`IcyReader::read`].
///
/// A transport error is not a variant here: it is reported through the
/// surrounding `io::Result`'s `Err` arm instead.
#[derive(Debug, PartialEq, Eq)]
pub enum ReadStatus {
	/// The read produced audio bytes normally, or crossed a metadata
	/// boundary without an error. A `(0, Ok)` result at a boundary is
	/// not the end of the stream; callers must try again.
	Ok,
	/// The source was exhausted cleanly, either between audio bytes or
	/// right before a metadata block's length byte.
	EndOfStream,
	/// The source was exhausted in the middle of a metadata block (the
	/// length byte or its payload). Distinguished from `EndOfStream`
	/// because it signals truncation rather than a clean close.
	UnexpectedEndOfStream,
}

enum BlockOutcome {
	Ok,
	UnexpectedEndOfStream,
}

/// A stateful adapter that strips ICY metadata blocks out of an
/// interleaved byte stream.
///
/// Constructed with the `metaint` stride advertised by the server (via
/// the `icy-metaint` response header, parsed by the surrounding HTTP
/// layer, not by this crate) and a source implementing [`IcySource`].
pub struct IcyReader<S> {
	source: S,
	metaint: usize,
	audio_since_last_meta: usize,
	current_metadata: Option<Metadata>,
	on_metadata_change: Option<Box<dyn FnMut(&Metadata)>>,
	closed: bool,
}

impl<S: IcySource> IcyReader<S> {
	/// Constructs a reader around `source`, which emits a metadata block
	/// every `metaint` audio bytes.
	///
	/// Returns [`IcyError::InvalidMetaint`] if `metaint` is zero; the
	/// surrounding HTTP layer is expected to have already rejected a
	/// response with a missing or non-positive `icy-metaint` header and
	/// not reach this constructor at all.
	pub fn new(source: S, metaint: usize) -> Result<Self, IcyError> {
		if metaint == 0 {
			return Err(IcyError::InvalidMetaint);
		}
		Ok(IcyReader {
			source,
			metaint,
			audio_since_last_meta: 0,
			current_metadata: None,
			on_metadata_change: None,
			closed: false,
		})
	}

	/// Registers a callback invoked synchronously, from inside `read`,
	/// whenever a newly parsed metadata block differs from the
	/// previously held one (including the first-ever parse).
	///
	/// Replaces any previously registered callback. Must not be called
	/// concurrently with `read`.
	pub fn set_on_metadata_change<F>(&mut self, callback: F)
	where
		F: FnMut(&Metadata) + 'static,
	{
		self.on_metadata_change = Some(Box::new(callback));
	}

	/// The most recently parsed metadata, if any block has been parsed yet.
	pub fn current_metadata(&self) -> Option<&Metadata> {
		self.current_metadata.as_ref()
	}

	/// Reads audio bytes into `buf`, transparently stripping any
	/// metadata block encountered along the way.
	///
	/// Returns the number of audio bytes written plus a [`ReadStatus`],
	/// or an `io::Error` propagated verbatim from the underlying source.
	/// A `(0, ReadStatus::Ok)` result means a metadata boundary was
	/// crossed without producing audio this call; it is not the end of
	/// the stream, and the caller should call `read` again.
	pub fn read(&mut self, buf: &mut [u8]) -> io::Result<(usize, ReadStatus)> {
		let remaining = self.metaint - self.audio_since_last_meta;
		if remaining == 0 {
			self.read_metadata_boundary()
		} else {
			self.read_audio(buf, remaining)
		}
	}

	fn read_audio(&mut self, buf: &mut [u8], remaining: usize) -> io::Result<(usize, ReadStatus)> {
		let want = buf.len().min(remaining);
		let n = self.source.read(&mut buf[..want])?;
		self.audio_since_last_meta += n;
		if n == 0 {
			tracing::trace!("source exhausted after {} audio bytes", self.audio_since_last_meta);
			Ok((0, ReadStatus::EndOfStream))
		} else {
			Ok((n, ReadStatus::Ok))
		}
	}

	fn read_metadata_boundary(&mut self) -> io::Result<(usize, ReadStatus)> {
		let mut length_byte = [0u8; 1];
		let n = self.source.read(&mut length_byte)?;
		if n == 0 {
			return Ok((0, ReadStatus::EndOfStream));
		}

		let block_len = length_byte[0] as usize * METADATA_BLOCK_UNIT;
		tracing::trace!(block_len, "metadata boundary crossed");
		if block_len == 0 {
			self.audio_since_last_meta = 0;
			return Ok((0, ReadStatus::Ok));
		}

		let mut payload = vec![0u8; block_len];
		match self.fill_exact(&mut payload)? {
			BlockOutcome::UnexpectedEndOfStream => return Ok((0, ReadStatus::UnexpectedEndOfStream)),
			BlockOutcome::Ok => {}
		}

		let metadata = Metadata::parse(&payload);
		let changed = !self.current_metadata.as_ref().is_some_and(|current| *current == metadata);
		if changed {
			tracing::debug!(stream_title = %metadata.stream_title, "metadata changed");
			if let Some(callback) = &mut self.on_metadata_change {
				callback(&metadata);
			}
			self.current_metadata = Some(metadata);
		}

		self.audio_since_last_meta = 0;
		Ok((0, ReadStatus::Ok))
	}

	/// Reads exactly `buf.len()` bytes, looping over short reads from
	/// the source. Unlike `read_audio`, this is filling an internal
	/// scratch buffer rather than the caller's buffer, so looping here
	/// does not violate the "don't smooth over boundaries" contract:
	/// the metadata block is an atomic unit that either arrives whole or
	/// is reported as truncated.
	fn fill_exact(&mut self, buf: &mut [u8]) -> io::Result<BlockOutcome> {
		let mut filled = 0;
		while filled < buf.len() {
			let n = self.source.read(&mut buf[filled..])?;
			if n == 0 {
				return Ok(BlockOutcome::UnexpectedEndOfStream);
			}
			filled += n;
		}
		Ok(BlockOutcome::Ok)
	}

	/// Closes the underlying source. Idempotent: a second call is a
	/// no-op and does not call the source's `close` again. After a
	/// close, further `read` calls are forwarded to the (now closed)
	/// source as usual, and fail with whatever error the source itself
	/// produces for reads past its own close.
	pub fn close(&mut self) -> io::Result<()> {
		if self.closed {
			return Ok(());
		}
		self.closed = true;
		self.source.close()
	}
}
