//! Post-construction setup of freshly instantiated plugins.

use crate::BoxError ;



/// Host-supplied setup run on every instantiated plugin before it is considered loaded.
///
/// Any `Fn( &mut P ) -> Result<(), BoxError>` closure is an initialiser as well.
///
/// ```
/// use addin_loader::{ Initialiser, BoxError };
///
/// struct Counter { started: bool }
///
/// let start = | plugin: &mut Counter | -> Result<(), BoxError> {
///     plugin.started = true ;
///     Ok(())
/// };
///
/// let mut plugin = Counter { started: false };
/// start.initialise( &mut plugin ).unwrap();
/// assert!( plugin.started );
/// ```
pub trait Initialiser<P> {
    /// Prepares `plugin` for use.
    ///
    /// # Errors
    /// Any setup failure. The loader aborts the load pass and discards the plugin.
    fn initialise( &self, plugin: &mut P ) -> Result<(), BoxError> ;
}

impl<P, F> Initialiser<P> for F
where
    F: Fn( &mut P ) -> Result<(), BoxError>,
{
    fn initialise( &self, plugin: &mut P ) -> Result<(), BoxError> { self( plugin ) }
}

/// The default initialiser. Leaves plugins untouched.
#[derive( Debug, Default, Clone, Copy, PartialEq, Eq )]
pub struct NoopInitialiser ;

impl<P> Initialiser<P> for NoopInitialiser {
    fn initialise( &self, _plugin: &mut P ) -> Result<(), BoxError> { Ok(()) }
}
