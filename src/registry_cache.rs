//! Clearing of the registry's on-disk cache before bootstrap.
//!
//! Some registries occasionally corrupt their cache between runs. Deleting it
//! only costs a rescan, so the bootstrap clears it before initialising. What
//! "the cache" is depends on the registry, hence the [`RegistryCache`] trait.

use std::io ;
use std::path::{ Path, PathBuf };
use tracing::debug ;



/// A cache that may be discarded before the registry is initialised.
pub trait RegistryCache: Send + Sync {
    /// Removes the cache. Missing caches are not an error.
    ///
    /// # Errors
    /// Any filesystem error while deleting.
    fn clear( &self ) -> io::Result<()> ;
}

impl<F> RegistryCache for F
where
    F: Fn() -> io::Result<()> + Send + Sync,
{
    fn clear( &self ) -> io::Result<()> { self() }
}

/// Cache made of whole directories, deleted recursively.
#[derive( Debug, Clone, PartialEq, Eq )]
pub struct CacheDirectories {
    directories: Vec<PathBuf>,
}

impl CacheDirectories {

    /// Directory names used by addin registries, relative to the working directory.
    pub const DEFAULT_NAMES: [&'static str; 2] = [ "addin-db-000", "addin-db-001" ];

    pub fn new( directories: impl IntoIterator<Item = impl Into<PathBuf>> ) -> Self {
        Self { directories: directories.into_iter().map( Into::into ).collect() }
    }

    /// The default directory names, resolved against `base`.
    pub fn in_directory( base: impl AsRef<Path> ) -> Self {
        Self::new( Self::DEFAULT_NAMES.iter().map(| name | base.as_ref().join( name )))
    }

    #[inline] pub fn directories( &self ) -> &[PathBuf] { &self.directories }

}

impl Default for CacheDirectories {
    fn default() -> Self { Self::new( Self::DEFAULT_NAMES ) }
}

impl RegistryCache for CacheDirectories {
    fn clear( &self ) -> io::Result<()> {
        self.directories.iter()
            .filter(| directory | directory.is_dir() )
            .try_for_each(| directory | {
                debug!( directory = %directory.display(), "Removing registry cache" );
                std::fs::remove_dir_all( directory )
            })
    }
}
