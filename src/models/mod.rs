//! Data models for the catalog

pub mod author;
pub mod book;
pub mod book_instance;
pub mod genre;
pub mod loan;
pub mod pagination;
pub mod user;

// Re-export commonly used types
pub use author::{Author, AuthorDetails};
pub use book::{Book, BookDetails};
pub use book_instance::{BookInstance, LoanStatus, LoanedCopy};
pub use genre::Genre;
pub use loan::{RenewalPolicy, RenewalProposal};
pub use pagination::{Page, PageQuery, PageWindow};
pub use user::{Capability, UserClaims};
