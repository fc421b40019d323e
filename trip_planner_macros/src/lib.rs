mod completion_schema;
mod schema_extraction;

use proc_macro::TokenStream;
use syn::{parse_macro_input, ItemStruct};

/// Attaches a cached JSON schema handle to a response struct.
///
/// The struct must also derive `schemars::JsonSchema` and `serde::Deserialize`.
/// Accepts optional `name = "..."` and `description = "..."` arguments; the
/// description falls back to the struct's doc comment.
#[proc_macro_attribute]
pub fn completion_schema(attr: TokenStream, item: TokenStream) -> TokenStream {
    let args = match schema_extraction::parse_completion_schema_args(attr) {
        Ok(args) => args,
        Err(err) => return err.into_compile_error().into(),
    };
    let item = parse_macro_input!(item as ItemStruct);

    completion_schema::expand(args, item)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
