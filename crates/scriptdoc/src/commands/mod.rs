//! CLI command implementations.

pub(crate) mod convert;
pub(crate) mod speakers;

pub(crate) use convert::ConvertArgs;
pub(crate) use speakers::SpeakersArgs;
