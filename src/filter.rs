//! Per-candidate accept/reject predicates, applied before instantiation.

use crate::registry::CandidateNode ;



/// Decides whether a discovered candidate gets instantiated.
///
/// Any `Fn( &dyn CandidateNode ) -> bool` closure is a filter as well.
pub trait Filter {
	/// `true` keeps the candidate, `false` skips it.
	fn apply( &self, candidate: &dyn CandidateNode ) -> bool ;
}

impl<F> Filter for F
where
	F: Fn( &dyn CandidateNode ) -> bool,
{
	fn apply( &self, candidate: &dyn CandidateNode ) -> bool { self( candidate ) }
}

/// Keeps only the candidate whose id equals the target exactly.
#[derive( Debug, Clone, PartialEq, Eq )]
pub struct IdFilter {
	id: String,
}

impl IdFilter {
	pub fn new( id: impl Into<String> ) -> Self { Self { id: id.into() }}
	#[inline] pub fn id( &self ) -> &str { &self.id }
}

impl Filter for IdFilter {
	fn apply( &self, candidate: &dyn CandidateNode ) -> bool { candidate.id() == self.id }
}
