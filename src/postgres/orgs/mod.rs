//! Postgres implementations of the organization repository traits.

mod invitation;
mod member;
mod organization;

pub use invitation::PgInvitationRepository;
pub use member::PgMemberRepository;
pub use organization::PgOrganizationRepository;
