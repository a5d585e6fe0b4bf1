//! Defines the update consumer interface --- [`Consumer`].

use async_trait::async_trait;

use crate::entries::Revnum;
use crate::Result;

/// The external collaborator a [`super::Reporter`] describes the working
/// copy to.
///
/// The reporter emits a sequence of `set_path`/`link_path`/`delete_path`
/// calls and closes with exactly one of `finish_report` or `abort_report`.
/// Reports for a directory always precede reports for its children. Paths
/// are `/`-separated and relative to the drive target; the empty path names
/// the target itself.
#[async_trait]
pub trait Consumer: Send {
    /// The subtree at `path` is currently at `revision`. With `start_empty`
    /// the consumer assumes the subtree has no children unless they are
    /// subsequently reported.
    async fn set_path(
        &mut self,
        path: &str,
        revision: Revnum,
        start_empty: bool,
        lock_token: Option<&str>,
    ) -> Result<()>;

    /// Like `set_path`, but the subtree is switched to the foreign `url`.
    async fn link_path(
        &mut self,
        path: &str,
        url: &str,
        revision: Revnum,
        start_empty: bool,
        lock_token: Option<&str>,
    ) -> Result<()>;

    /// The subtree at `path` is absent locally.
    async fn delete_path(&mut self, path: &str) -> Result<()>;

    /// No more reports follow; the consumer may now drive its edit.
    async fn finish_report(&mut self) -> Result<()>;

    /// Discard everything reported; no edit will follow.
    async fn abort_report(&mut self) -> Result<()>;
}
