// ICY/SHOUTcast stream demultiplexer written in Rust
//
// Copyright (c) 2024 RustAudio contributors. All rights reserved.
// Licensed under MIT license, or Apache 2 license,
// at your option. Please see the LICENSE file
// attached to this source distribution for details.

//! The `error` module defines the error type returned by fallible
//! constructors in this crate.
//!
//! Read-time failures are not represented here: [`crate::reader::IcyReader::read`]
//! reports them through its own return value, per the distinction the
//! protocol draws between a clean end of stream, a truncated metadata
//! block, and a transport error (see the `reader` module).

use std::error;
use std::fmt;

/// An error that prevents an [`crate::reader::IcyReader`] from being constructed.
#[derive(Debug, PartialEq, Eq)]
pub enum IcyError {
	/// `metaint` must be a positive number of audio bytes between
	/// metadata blocks; a server response without a positive
	/// `icy-metaint` header should never reach this constructor.
	InvalidMetaint,
}

impl error::Error for IcyError {}

impl fmt::Display for IcyError {
	fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
		let description = match self {
			IcyError::InvalidMetaint => "metaint must be a positive integer",
		};
		write!(fmt, "{}", description)
	}
}
