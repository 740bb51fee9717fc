//! Application layer: turning a selection into a link.

pub mod disambiguate;
pub mod link;
pub mod locate;
pub mod permalink;
pub mod remotes;
pub mod revision;
pub mod workspace;

#[cfg(test)]
pub(crate) mod testing;
