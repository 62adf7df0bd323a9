//! A rust library for interpreting chunked raw bytes as strongly-typed multidimensional arrays.
//!
//! Fixed-size numeric fields are stored as runs of raw bytes split into chunks, with a stored element type (including byte order) and a per-entry shape.
//! An [`Interpretation`](interpretation::Interpretation) reinterprets each chunk without copying, converts it to a destination element type and byte order, and assembles the chunks into one array covering a requested range of entries.
//!
//! ## Getting Started
//! - [`interpretation::TypedView`] assembles into a newly allocated [`TypedArray`](array::TypedArray).
//! - [`interpretation::TargetedView`] assembles into a caller supplied [`TypedArray`](array::TypedArray).
//! - [`element_type::ElementType`] describes element types, and parses string tags such as `">i4"`, `"<f8"`, or `"uint16"`.
//!
//! ## Example
//! ```rust
//! use numinterp::interpretation::{Interpretation, TypedView};
//!
//! // Two chunks of big endian 32-bit floats, grouped in threes
//! let chunks: Vec<Vec<u8>> = vec![
//!     [1.0f32, 2.0, 3.0].iter().flat_map(|v| v.to_be_bytes()).collect(),
//!     [4.0f32, 5.0, 6.0].iter().flat_map(|v| v.to_be_bytes()).collect(),
//! ];
//! let view = TypedView::new_with_destination(">f4", Some("f8".into()), &[3], None)?;
//!
//! let counts: Vec<usize> = chunks.iter().map(|chunk| view.num_items(chunk.len())).collect();
//! let total = counts.iter().sum();
//! let mut destination = view.allocate_destination(total, 2)?;
//! let mut item_start = 0;
//! for (chunk, count) in chunks.iter().zip(counts) {
//!     let source = view.read_chunk(chunk, None, 0, 1)?;
//!     view.fill(&source, &mut destination, item_start, item_start + count, 0, 2)?;
//!     item_start += count;
//! }
//! let array = view.finalize(destination);
//! assert_eq!(array.shape(), &[2, 3]);
//! assert_eq!(array.to_elements::<f64>()?, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Crate Features
//! #### Default
//!  - `ndarray`: [`ndarray`] utility functions for [`TypedArray`](array::TypedArray), [`ArrayView`](array::ArrayView), and the outputs of assemblies.
//!
//! ## Licence
//! `numinterp` is licensed under either of
//!  - the Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> or
//!  - the MIT license <http://opensource.org/licenses/MIT>, at your option.

#![warn(unused_variables)]
#![warn(dead_code)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![deny(clippy::missing_panics_doc)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod array;
pub mod config;
pub mod element;
pub mod element_type;
pub mod interpretation;
