// ICY/SHOUTcast stream demultiplexer written in Rust
//
// Copyright (c) 2024 RustAudio contributors. All rights reserved.
// Licensed under MIT license, or Apache 2 license,
// at your option. Please see the LICENSE file
// attached to this source distribution for details.

#![forbid(unsafe_code)]
#![cfg_attr(test, deny(warnings))]
#![doc = include_str!("../README.md")]

pub mod error;
pub mod metadata;
pub mod reader;

pub use error::IcyError;
pub use metadata::Metadata;
pub use reader::{IcyReader, IcySource, PlainSource, ReadStatus};
