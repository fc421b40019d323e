use proc_macro2::TokenStream;
use quote::quote;
use syn::{spanned::Spanned, Ident, ItemStruct, LitStr};

use crate::schema_extraction::{
    collect_doc_comments, ensure_named_struct, CompletionSchemaArgs,
};

/// Everything the generated impl needs, resolved from the item and its arguments.
struct ResponseSchema<'a> {
    ident: &'a Ident,
    name: LitStr,
    description: Option<LitStr>,
}

impl<'a> ResponseSchema<'a> {
    fn resolve(args: CompletionSchemaArgs, item: &'a ItemStruct) -> syn::Result<Self> {
        ensure_named_struct(item)?;
        if !item.generics.params.is_empty() {
            return Err(syn::Error::new(
                item.generics.span(),
                "`#[completion_schema]` does not support generic structs",
            ));
        }

        let name = args
            .name
            .unwrap_or_else(|| LitStr::new(&item.ident.to_string(), item.ident.span()));
        let description = args.description.or_else(|| {
            collect_doc_comments(&item.attrs).map(|text| LitStr::new(&text, item.ident.span()))
        });

        Ok(Self {
            ident: &item.ident,
            name,
            description,
        })
    }

    fn impl_block(&self) -> TokenStream {
        let ident = self.ident;
        let name = &self.name;
        let type_name = ident.to_string();
        let description = match &self.description {
            Some(text) => quote!(::core::option::Option::Some(#text)),
            None => quote!(::core::option::Option::None),
        };

        quote! {
            impl trip_planner_rs::schema::CompletionSchema for #ident {
                fn schema() -> &'static trip_planner_rs::schema::SchemaHandle {
                    static HANDLE: ::std::sync::OnceLock<trip_planner_rs::schema::SchemaHandle> =
                        ::std::sync::OnceLock::new();
                    HANDLE.get_or_init(|| {
                        let mut root = schemars::schema_for!(#ident);
                        trip_planner_rs::schema::apply_schema_metadata(&mut root, #name, #description);
                        trip_planner_rs::schema::SchemaHandle::from_root_schema::<#ident>(
                            #name, #type_name, root,
                        )
                    })
                }
            }
        }
    }
}

pub fn expand(args: CompletionSchemaArgs, item: ItemStruct) -> syn::Result<TokenStream> {
    let generated = ResponseSchema::resolve(args, &item)?.impl_block();
    Ok(quote! {
        #item
        #generated
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    #[test]
    fn test_doc_comment_becomes_description() {
        let item: ItemStruct = parse_quote! {
            /// Packing advice for one trip.
            struct Packing { items: Vec<String> }
        };
        let expanded = expand(CompletionSchemaArgs::default(), item).unwrap().to_string();
        assert!(expanded.contains("\"Packing advice for one trip.\""));
        assert!(expanded.contains("CompletionSchema for Packing"));
    }

    #[test]
    fn test_explicit_name_wins() {
        let item: ItemStruct = parse_quote! { struct Packing { items: Vec<String> } };
        let args = CompletionSchemaArgs {
            name: Some(parse_quote!("PackingAdvice")),
            description: None,
        };
        let expanded = expand(args, item).unwrap().to_string();
        assert!(expanded.contains("\"PackingAdvice\""));
        assert!(expanded.contains("Option :: None"));
    }

    #[test]
    fn test_rejects_tuple_and_generic_structs() {
        let tuple: ItemStruct = parse_quote! { struct Pair(u32, u32); };
        assert!(expand(CompletionSchemaArgs::default(), tuple).is_err());

        let generic: ItemStruct = parse_quote! { struct Wrapper<T> { inner: T } };
        let err = expand(CompletionSchemaArgs::default(), generic).unwrap_err();
        assert!(err.to_string().contains("generic"));
    }
}
