//! A registry gateway that discovers addins from TOML manifests on disk.
//!
//! Every file ending in `.addin.toml` below the root directory describes one
//! addin and the nodes it contributes to extension points:
//!
//! ```toml
//! id = "region-modules"
//!
//! [[node]]
//! extension_point = "/app/region-modules"
//! id = "terrain"
//! type = "terrain"
//! properties = { size = "256" }
//! ```
//!
//! Rust cannot instantiate a type from its name, so the host registers one
//! factory per `type` it is prepared to construct. Manifests that fail to parse
//! and nodes naming an unknown type are reported through the load error
//! handlers and skipped; the rest of the scan carries on.

use std::any::Any ;
use std::collections::{ BTreeMap, HashMap };
use std::io::Write ;
use std::path::{ Path, PathBuf };
use std::sync::{ Arc, Mutex, MutexGuard, PoisonError };
use itertools::Itertools ;
use serde::Deserialize ;
use thiserror::Error ;

use crate::BoxError ;
use crate::console ;
use crate::registry::{ CandidateNode, LoadErrorHandler, LoadedHandler, RegistryError, RegistryEvents, RegistryGateway };



/// Builds a plugin instance for a manifest node of a given `type`.
pub type ManifestFactory = dyn Fn( &ManifestNode ) -> Result<Box<dyn Any>, BoxError> + Send + Sync ;

/// Problems with individual manifests, reported through the load error handlers.
#[derive( Debug, Error )]
pub enum ManifestError {
    #[error( "Failed to read {}: {source}", path.display() )]
    Io { path: PathBuf, #[source] source: std::io::Error },
    #[error( "Failed to parse {}: {source}", path.display() )]
    Parse { path: PathBuf, #[source] source: toml::de::Error },
    #[error( "Node {node} of addin {addin} has unknown type {type_name}" )]
    UnknownType { addin: String, node: String, type_name: String },
}

#[derive( Debug, Deserialize )]
#[serde( deny_unknown_fields )]
struct AddinManifest {
    id: String,
    #[serde( default, rename = "node" )]
    nodes: Vec<NodeManifest>,
}

#[derive( Debug, Deserialize )]
#[serde( deny_unknown_fields )]
struct NodeManifest {
    extension_point: String,
    id: String,
    #[serde( rename = "type" )]
    type_name: String,
    #[serde( default )]
    properties: BTreeMap<String, String>,
}

/// A node declared in an addin manifest.
pub struct ManifestNode {
    addin_id: String,
    extension_point: String,
    id: String,
    path: String,
    type_name: String,
    properties: BTreeMap<String, String>,
    factory: Arc<ManifestFactory>,
}

impl ManifestNode {
    #[inline] pub fn addin_id( &self ) -> &str { &self.addin_id }
    #[inline] pub fn extension_point( &self ) -> &str { &self.extension_point }
    #[inline] pub fn type_name( &self ) -> &str { &self.type_name }
    #[inline] pub fn properties( &self ) -> &BTreeMap<String, String> { &self.properties }
    #[inline] pub fn property( &self, key: &str ) -> Option<&str> { self.properties.get( key ).map( String::as_str ) }
}

impl CandidateNode for ManifestNode {
    fn id( &self ) -> &str { &self.id }
    fn path( &self ) -> &str { &self.path }
    fn create_instance( &self ) -> Result<Box<dyn Any>, BoxError> { ( self.factory )( self ) }
}

impl std::fmt::Debug for ManifestNode {
    fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
        f.debug_struct( "ManifestNode" )
            .field( "addin_id", &self.addin_id )
            .field( "path", &self.path )
            .field( "type_name", &self.type_name )
            .field( "properties", &self.properties )
            .finish_non_exhaustive()
    }
}

#[derive( Default )]
struct ManifestRegistryState {
    root: Option<PathBuf>,
    nodes: HashMap<String, Vec<Arc<dyn CandidateNode>>>,
    addins: Vec<String>,
}

/// Registry gateway over a directory tree of `.addin.toml` manifests.
#[derive( Default )]
pub struct ManifestRegistry {
    factories: Mutex<HashMap<String, Arc<ManifestFactory>>>,
    state: Mutex<ManifestRegistryState>,
    events: RegistryEvents,
}

impl ManifestRegistry {

    /// File name suffix of addin manifests.
    pub const MANIFEST_SUFFIX: &'static str = ".addin.toml" ;

    pub fn new() -> Self { Self::default() }

    /// Registers the factory for nodes of `type_name`, replacing any previous one.
    pub fn with_factory(
        self,
        type_name: impl Into<String>,
        factory: impl Fn( &ManifestNode ) -> Result<Box<dyn Any>, BoxError> + Send + Sync + 'static,
    ) -> Self {
        self.register_factory( type_name, factory );
        self
    }

    /// Registers the factory for nodes of `type_name`. Takes effect on the next refresh.
    pub fn register_factory(
        &self,
        type_name: impl Into<String>,
        factory: impl Fn( &ManifestNode ) -> Result<Box<dyn Any>, BoxError> + Send + Sync + 'static,
    ) {
        self.factories.lock().unwrap_or_else( PoisonError::into_inner ).insert( type_name.into(), Arc::new( factory ));
    }

    fn lock( &self ) -> MutexGuard<'_, ManifestRegistryState> {
        self.state.lock().unwrap_or_else( PoisonError::into_inner )
    }

    /// Ids of the addins found by the last refresh, in manifest path order.
    pub fn addins( &self ) -> Vec<String> { self.lock().addins.clone() }

    fn is_manifest( path: &Path ) -> bool {
        path.is_file() && path.file_name()
            .and_then(| name | name.to_str() )
            .is_some_and(| name | name.ends_with( Self::MANIFEST_SUFFIX ))
    }

    fn find_manifests( directory: &Path ) -> std::io::Result<Vec<PathBuf>> {
        std::fs::read_dir( directory )?
            .map(| entry | {
                let path = entry?.path();
                match path.is_dir() {
                    true => Self::find_manifests( &path ),
                    false => Ok( match Self::is_manifest( &path ) {
                        true => vec![ path ],
                        false => Vec::with_capacity( 0 ),
                    }),
                }
            })
            .flatten_ok()
            .collect()
    }

    fn read_manifest( path: PathBuf ) -> Result<AddinManifest, ManifestError> {
        let text = std::fs::read_to_string( &path )
            .map_err(| source | ManifestError::Io { path: path.clone(), source })?;
        toml::from_str( &text ).map_err(| source | ManifestError::Parse { path, source })
    }

}

impl RegistryGateway for ManifestRegistry {

    fn is_initialized( &self ) -> bool { self.lock().root.is_some() }

    fn initialize( &self, root_directory: &Path ) -> Result<(), RegistryError> {
        if !root_directory.is_dir() { return Err( RegistryError::MissingRoot( root_directory.to_path_buf() )) }
        let _ = writeln!( console::stdout(), "Initializing addin registry at {}", root_directory.display() );
        self.lock().root = Some( root_directory.to_path_buf() );
        Ok(())
    }

    fn refresh_registry( &self ) -> Result<(), RegistryError> {

        let root = self.lock().root.clone().ok_or( RegistryError::NotInitialized )?;
        let factories = self.factories.lock().unwrap_or_else( PoisonError::into_inner ).clone();

        let mut manifest_paths = Self::find_manifests( &root )
            .map_err(| source | RegistryError::Io { path: root.clone(), source })?;
        manifest_paths.sort();

        let ( manifests, mut errors ) = manifest_paths.into_iter()
            .map(| path | {
                let _ = writeln!( console::stdout(), "Scanning {}", path.display() );
                Self::read_manifest( path )
            })
            .partition_result::<Vec<_>, Vec<_>, _, _>();

        let mut nodes = HashMap::<String, Vec<Arc<dyn CandidateNode>>>::new();
        let mut addins = Vec::with_capacity( manifests.len() );

        for manifest in manifests {
            for node in manifest.nodes {
                let Some( factory ) = factories.get( &node.type_name ) else {
                    errors.push( ManifestError::UnknownType {
                        addin: manifest.id.clone(),
                        node: node.id,
                        type_name: node.type_name,
                    });
                    continue ;
                };
                nodes.entry( node.extension_point.clone() ).or_default().push( Arc::new( ManifestNode {
                    addin_id: manifest.id.clone(),
                    path: format!( "{}/{}", node.extension_point, node.id ),
                    extension_point: node.extension_point,
                    id: node.id,
                    type_name: node.type_name,
                    properties: node.properties,
                    factory: Arc::clone( factory ),
                }));
            }
            addins.push( manifest.id );
        }

        {
            let mut state = self.lock();
            state.nodes = nodes ;
            state.addins.clone_from( &addins );
        }

        errors.iter().for_each(| err | self.events.emit_load_error( "Failed to load addin manifest", err ));
        addins.iter().for_each(| addin | self.events.emit_loaded( addin ));

        Ok(())

    }

    fn enumerate_candidates( &self, extension_point: &str ) -> Result<Vec<Arc<dyn CandidateNode>>, RegistryError> {
        let state = self.lock();
        if state.root.is_none() { return Err( RegistryError::NotInitialized ) }
        Ok( state.nodes.get( extension_point ).cloned().unwrap_or_default() )
    }

    fn on_loaded( &self, handler: LoadedHandler ) { self.events.subscribe_loaded( handler ) }

    fn on_load_error( &self, handler: LoadErrorHandler ) { self.events.subscribe_load_error( handler ) }

}

impl std::fmt::Debug for ManifestRegistry {
    fn fmt( &self, f: &mut std::fmt::Formatter<'_> ) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct( "ManifestRegistry" )
            .field( "root", &state.root )
            .field( "addins", &state.addins )
            .field( "factories", &self.factories.lock().map_or( 0, | factories | factories.len() ))
            .field( "events", &self.events )
            .finish()
    }
}
