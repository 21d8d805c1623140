//! DOCX → Markdown conversion, one file at a time or a directory at a time.
//!
//! The rendering itself is done by a [`render::DocumentRenderer`] backend
//! (`mammoth` through a Python runner, or `pandoc`). [`convert::Converter`]
//! owns the workflow around it and reports every attempt as a
//! [`convert::ConversionOutcome`].

pub mod batch;
pub mod cli;
pub mod config;
pub mod convert;
pub mod error;
pub mod paths;
pub mod postprocess;
pub mod render;
pub mod report;
pub mod util;

pub use batch::{BatchEntry, BatchSummary};
pub use convert::{ConversionOutcome, ConvertedFile, Converter};
pub use error::{ConvertError, RenderError};
