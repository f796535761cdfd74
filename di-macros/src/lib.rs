//! Compile-time dependency injection macros for perfume-db.
//!
//! This crate provides derive macros for DI:
//! - `#[derive(Context)]` to make a struct's fields extractable
//! - `#[derive(FromContext)]` to auto-resolve fields from a context
//!
//! The `FromRef` trait must be defined in the consuming crate or imported
//! from a shared crate. By default, generated code references `crate::FromRef`.

use proc_macro::TokenStream;

mod context;
mod from_context;

/// Derive macro for creating a DI context.
///
/// When applied to a struct, generates `FromRef` implementations for each
/// field type, allowing them to be extracted from the context.
///
/// # Requirements
///
/// - All fields must implement `Clone`
/// - The struct itself should derive `Clone`
///
/// # Example
///
/// ```ignore
/// use di_macros::{Context, FromRef};
///
/// #[derive(Context, Clone)]
/// pub struct AppContext {
///     pub db: AppDb,
///     pub config: Arc<Config>,
///     pub cursors: CursorCodec,
/// }
///
/// // Generated implementations:
/// // impl FromRef<AppContext> for AppDb { ... }
/// // impl FromRef<AppContext> for Arc<Config> { ... }
/// // impl FromRef<AppContext> for CursorCodec { ... }
/// ```
#[proc_macro_derive(Context)]
pub fn derive_context(input: TokenStream) -> TokenStream {
    context::derive_context_impl(input)
}

/// Derive macro for types that can be constructed from a context.
///
/// When applied to a struct, generates a `FromRef<Context>` implementation
/// that resolves each field by calling `FromRef::from_ref` on the context.
///
/// # Requirements
///
/// - Each field type must implement `FromRef<Context>`
/// - The context type defaults to `Context` but can be overridden with
///   `#[from_context(Context = MyContext)]`
///
/// # Example
///
/// ```ignore
/// use di_macros::{FromContext, FromRef};
///
/// #[derive(FromContext, Clone)]
/// pub struct HouseRepository {
///     db: AppDb,             // resolved via AppDb::from_ref(ctx)
///     cursors: CursorCodec,  // resolved via CursorCodec::from_ref(ctx)
/// }
///
/// // Generated implementation:
/// // impl FromRef<Context> for HouseRepository {
/// //     fn from_ref(ctx: &Context) -> Self {
/// //         Self {
/// //             db: AppDb::from_ref(ctx),
/// //             cursors: CursorCodec::from_ref(ctx),
/// //         }
/// //     }
/// // }
/// ```
///
/// # Generic Structs
///
/// Type parameters are allowed. The generated impl is bounded so that it
/// applies only when every field type resolves from the context:
///
/// ```ignore
/// #[derive(FromContext, Clone)]
/// pub struct PerfumeRepository<C: DbClient = PostgresClient> {
///     db: Db<C>,
/// }
///
/// // impl<C: DbClient> FromRef<Context> for PerfumeRepository<C>
/// // where
/// //     Db<C>: FromRef<Context>,
/// // { ... }
/// ```
///
/// # Custom Context Type
///
/// ```ignore
/// #[derive(FromContext)]
/// #[from_context(Context = "AdminContext")]
/// pub struct AuditRepository {
///     db: AppDb,
/// }
/// ```
#[proc_macro_derive(FromContext, attributes(from_context))]
pub fn derive_from_context(input: TokenStream) -> TokenStream {
    from_context::derive_from_context_impl(input)
}
