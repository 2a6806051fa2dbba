//! Constraints over the candidate set of an extension point.
//!
//! A constraint is evaluated once per extension point per load pass, before any
//! candidate of that point is instantiated.

use thiserror::Error ;

use crate::registry::{ RegistryGateway, RegistryError };



/// Errors produced while evaluating a [`Constraint`].
#[derive( Debug, Error )]
pub enum ConstraintError {
    /// The constrained property does not hold. Aborts the whole load pass.
    #[error( "{extension_point} failed constraint: {message} (found {count})" )]
    Violated { extension_point: String, count: usize, message: String },
    /// The registry could not be queried.
    #[error( "Registry error: {0}" )] Registry( #[from] RegistryError ),
}

/// A validation rule over the candidate set registered under one extension point.
///
/// Failure is signalled through [`ConstraintError::Violated`]. The `bool` in the
/// success value is a soft verdict: the loader logs a `false` and carries on.
/// [`CountConstraint`] never produces `false`.
pub trait Constraint {

    /// Human readable description of the rule.
    fn message( &self ) -> String ;

    /// Checks the rule against `extension_point`.
    ///
    /// # Errors
    /// [`ConstraintError::Violated`] when the rule does not hold,
    /// [`ConstraintError::Registry`] when the registry cannot be queried.
    fn apply( &self, extension_point: &str, registry: &dyn RegistryGateway ) -> Result<bool, ConstraintError> ;

}

/// Bounds the number of candidates of an extension point to an inclusive range.
///
/// ```
/// use addin_loader::{ Constraint, CountConstraint };
///
/// let constraint = CountConstraint::exactly( 1 );
/// assert_eq!( constraint.message(), "The number of plugins is constrained to the interval [1, 1]" );
/// assert!( CountConstraint::between( 2, 4 ).admits( 3 ));
/// assert!( !CountConstraint::at_least( 1 ).admits( 0 ));
/// ```
#[derive( Debug, Clone, Copy, PartialEq, Eq )]
pub struct CountConstraint {
    min: usize,
    max: usize,
}

impl CountConstraint {

    /// Exactly `count` candidates.
    pub const fn exactly( count: usize ) -> Self { Self { min: count, max: count }}

    /// Between `min` and `max` candidates, both inclusive.
    ///
    /// A range with `min > max` admits nothing, so every load against it fails.
    pub const fn between( min: usize, max: usize ) -> Self { Self { min, max }}

    /// At most `max` candidates.
    pub const fn at_most( max: usize ) -> Self { Self { min: 0, max }}

    /// At least `min` candidates.
    pub const fn at_least( min: usize ) -> Self { Self { min, max: usize::MAX }}

    #[inline] pub fn min( &self ) -> usize { self.min }
    #[inline] pub fn max( &self ) -> usize { self.max }

    /// Whether `count` lies within the bounds.
    #[inline] pub fn admits( &self, count: usize ) -> bool { ( self.min..=self.max ).contains( &count ) }

}

impl Constraint for CountConstraint {

    fn message( &self ) -> String {
        format!( "The number of plugins is constrained to the interval [{}, {}]", self.min, self.max )
    }

    fn apply( &self, extension_point: &str, registry: &dyn RegistryGateway ) -> Result<bool, ConstraintError> {
        let count = registry.candidate_count( extension_point )?;
        match self.admits( count ) {
            true => Ok( true ),
            false => Err( ConstraintError::Violated {
                extension_point: extension_point.to_string(),
                count,
                message: self.message(),
            }),
        }
    }

}
