//! Bootstrap configuration.
//!
//! Hosts that want the bootstrap to be tunable without recompiling can keep a
//! small TOML table around:
//!
//! ```toml
//! root_dir = "./addins"
//! clear_cache = true
//! cache_dirs = [ "addin-db-000", "addin-db-001" ]
//! suppress_output = false
//! ```
//!
//! Every key is optional and defaults to the values of [`BootstrapConfig::default`].

use std::path::{ Path, PathBuf };
use pipe_trait::Pipe ;
use serde::Deserialize ;
use thiserror::Error ;

use crate::registry_cache::CacheDirectories ;



#[derive( Debug, Error )]
pub enum ConfigError {
    #[error( "Failed to read {}: {source}", path.display() )]
    Io { path: PathBuf, #[source] source: std::io::Error },
    #[error( "Invalid bootstrap configuration: {0}" )] Parse( #[from] toml::de::Error ),
}

/// Settings for the one-time registry bootstrap.
#[derive( Debug, Clone, PartialEq, Eq, Deserialize )]
#[serde( default, deny_unknown_fields )]
pub struct BootstrapConfig {
    /// Directory the registry is initialised at.
    pub root_dir: PathBuf,
    /// Whether stale registry caches are deleted before initialising.
    pub clear_cache: bool,
    /// Cache directories to delete, relative to the working directory.
    pub cache_dirs: Vec<PathBuf>,
    /// Whether standard output is suppressed while the registry initialises.
    pub suppress_output: bool,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from( "." ),
            clear_cache: true,
            cache_dirs: CacheDirectories::DEFAULT_NAMES.iter().map( PathBuf::from ).collect(),
            suppress_output: true,
        }
    }
}

impl BootstrapConfig {

    /// Parses a configuration from TOML text.
    ///
    /// ```
    /// use addin_loader::BootstrapConfig ;
    ///
    /// let config = BootstrapConfig::from_toml_str( r#"root_dir = "plugins""# ).unwrap();
    /// assert_eq!( config.root_dir, std::path::PathBuf::from( "plugins" ));
    /// assert!( config.clear_cache );
    /// ```
    ///
    /// # Errors
    /// [`ConfigError::Parse`] for malformed TOML or unknown keys.
    pub fn from_toml_str( text: &str ) -> Result<Self, ConfigError> {
        Ok( toml::from_str( text )? )
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    /// [`ConfigError::Io`] if the file cannot be read, [`ConfigError::Parse`] otherwise.
    pub fn from_file( path: impl AsRef<Path> ) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        std::fs::read_to_string( path )
            .map_err(| source | ConfigError::Io { path: path.to_path_buf(), source })?
            .pipe(| text | Self::from_toml_str( &text ))
    }

    /// The cache to clear, if clearing is enabled.
    pub fn registry_cache( &self ) -> Option<CacheDirectories> {
        self.clear_cache.then(|| CacheDirectories::new( self.cache_dirs.iter().cloned() ))
    }

}
