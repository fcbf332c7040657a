#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]

pub mod error;
pub mod extension;

/// An allocation-optimized string.
pub type SharedString = std::borrow::Cow<'static, str>;
