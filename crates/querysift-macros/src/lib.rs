//! Proc macros for querysift.
//!
//! - [`Record`] - Make a struct queryable by compiled filter queries

mod record;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives the `Record` trait for queryable structs.
///
/// Every named field becomes a property whose declared type is taken from
/// the field's Rust type through `querysift::FieldType`. Supported field
/// types are the scalars (`bool`, `char`, integers, floats, `BigDecimal`,
/// `String`, chrono date/times and `TimeDelta`, `Uuid`), `Option` of a
/// scalar, and arrays, `Vec`, `VecDeque` and `BTreeSet` of scalars or
/// optional scalars.
///
/// # Attributes
///
/// | Attribute | Placement | Description |
/// |-----------|-----------|-------------|
/// | `skip` | field | Exclude this field from queries |
/// | `rename = "..."` | field | Use a custom property name |
/// | `rename_all = "..."` | struct | `PascalCase`, `camelCase` or `snake_case` for all fields |
///
/// # Generated Code
///
/// The macro generates:
///
/// 1. Property name constants (e.g., `Task::NAME`, `Task::PRIORITY`)
/// 2. An implementation of `querysift::Record`
///
/// # Example
///
/// ```ignore
/// use querysift::Record;
///
/// #[derive(Record)]
/// #[sift(rename_all = "PascalCase")]
/// struct Task {
///     name: String,
///     priority: u8,
///     done: bool,
///     #[sift(skip)]
///     internal_id: u64,
/// }
///
/// let tasks = vec![
///     Task { name: "Write docs".into(), priority: 3, done: false, internal_id: 1 },
///     Task { name: "Fix bug".into(), priority: 5, done: true, internal_id: 2 },
/// ];
///
/// let query = querysift::QueryBuilder::new()
///     .and_gte(Task::PRIORITY, 3u8)
///     .and_ne(Task::DONE, true)
///     .build();
///
/// let open = querysift::compile::<Task>(&query).unwrap();
/// assert_eq!(open.count(&tasks), 1);
/// ```
#[proc_macro_derive(Record, attributes(sift))]
pub fn record_derive(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::record_derive_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
