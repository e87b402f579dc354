//! Data models for the lending library

pub mod copy;
pub mod item;
pub mod loan;
pub mod member;
pub mod policy;

// Re-export commonly used types
pub use copy::{CopyDetails, CopyStatus, ItemCopy};
pub use item::{Item, ItemKind, ItemSummary, MediaType};
pub use loan::{Loan, LoanDetails, LoanScope};
pub use member::{Member, MemberKind, MemberSummary};
pub use policy::LoanPolicy;
