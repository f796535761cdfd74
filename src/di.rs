//! Dependency injection infrastructure.
//!
//! This module provides compile-time dependency injection using the `FromRef` trait
//! and derive macros from `di-macros`.
//!
//! # Overview
//!
//! - `FromRef<T>`: Trait for extracting a value from a reference to `T`
//! - `#[derive(Context)]`: Makes each field of a struct extractable via `FromRef`
//! - `#[derive(FromContext)]`: Generates `FromRef` impl by resolving each field
//!
//! # Example
//!
//! ```ignore
//! use crate::di::{Context, FromContext, FromRef};
//!
//! #[derive(Context, Clone)]
//! pub struct AppContext {
//!     pub db: AppDb,
//!     pub cursors: CursorCodec,
//! }
//!
//! #[derive(FromContext, Clone)]
//! #[from_context(Context = "AppContext")]
//! pub struct HouseRepository {
//!     db: AppDb,  // resolved via FromRef<AppContext>
//! }
//!
//! // Usage
//! let ctx = AppContext { db, cursors };
//! let repo = HouseRepository::from_ref(&ctx);
//! ```

/// Trait for extracting a value from a reference to another type.
///
/// This is the core trait for compile-time dependency injection.
/// Types that implement `FromRef<T>` can be extracted from `&T`.
pub trait FromRef<T> {
    fn from_ref(input: &T) -> Self;
}

/// Blanket implementation: any Clone type can be extracted from itself.
impl<T: Clone> FromRef<T> for T {
    fn from_ref(input: &T) -> Self {
        input.clone()
    }
}

// Re-export derive macros
pub use di_macros::{Context, FromContext};

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Context, Clone)]
    struct Context {
        label: String,
        size: usize,
    }

    #[derive(FromContext, Clone)]
    struct Labelled {
        label: String,
    }

    #[derive(FromContext, Clone)]
    struct Wrapper<T: Clone> {
        inner: T,
        label: String,
    }

    fn ctx() -> Context {
        Context {
            label: "catalog".into(),
            size: 25,
        }
    }

    #[test]
    fn test_context_fields_resolve() {
        let ctx = ctx();
        assert_eq!(String::from_ref(&ctx), "catalog");
        assert_eq!(usize::from_ref(&ctx), 25);
    }

    #[test]
    fn test_from_context_builds_struct() {
        assert_eq!(Labelled::from_ref(&ctx()).label, "catalog");
    }

    #[test]
    fn test_from_context_generic_struct() {
        let wrapper: Wrapper<usize> = Wrapper::from_ref(&ctx());
        assert_eq!(wrapper.inner, 25);
        assert_eq!(wrapper.label, "catalog");
    }
}
