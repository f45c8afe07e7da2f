//! Implementation of the `#[derive(Record)]` macro.
//!
//! This macro generates an implementation of the `Record` trait and
//! property name constants for building queries without typos.

use std::collections::HashSet;

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{spanned::Spanned, Data, DeriveInput, Error, Fields, Result};

use super::attrs::{parse_container_attrs, parse_field_attrs};

/// Main implementation of the Record derive macro.
pub fn record_derive_impl(input: DeriveInput) -> Result<TokenStream> {
    let struct_name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(Error::new(
            input.generics.span(),
            "Record cannot be derived for generic structs",
        ));
    }

    // Ensure we have a struct with named fields
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(Error::new(
                    input.span(),
                    "Record can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(Error::new(
                input.span(),
                "Record can only be derived for structs",
            ))
        }
    };

    let container = parse_container_attrs(&input.attrs)?;

    let mut property_arms: Vec<TokenStream> = Vec::new();
    let mut property_names: Vec<String> = Vec::new();
    let mut property_constants: Vec<TokenStream> = Vec::new();
    let mut seen = HashSet::new();
    let mut seen_consts = HashSet::new();

    for field in fields.iter() {
        let field_name = field
            .ident
            .as_ref()
            .ok_or_else(|| Error::new(field.span(), "expected named field"))?;
        let field_ty = &field.ty;

        let attrs = parse_field_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }

        // raw identifiers (r#type) query as their plain name
        let plain = field_name.to_string().trim_start_matches("r#").to_string();
        let query_name = match (attrs.rename, container.rename_all) {
            (Some(name), _) => name,
            (None, Some(rule)) => rule.apply(&plain),
            (None, None) => plain,
        };

        if !seen.insert(query_name.clone()) {
            return Err(Error::new(
                field.span(),
                format!("duplicate property name '{}'", query_name),
            ));
        }

        let const_str = to_screaming_snake_case(&query_name);
        if const_str.chars().all(|c| c == '_') {
            return Err(Error::new(
                field.span(),
                format!(
                    "property name '{}' has no letters or digits to form a constant name",
                    query_name
                ),
            ));
        }
        if !seen_consts.insert(const_str.clone()) {
            return Err(Error::new(
                field.span(),
                format!(
                    "property name '{}' maps to constant {} which is already taken; rename one of the fields",
                    query_name, const_str
                ),
            ));
        }
        let const_name = format_ident!("{}", const_str);
        property_constants.push(quote! {
            /// Property name constant for type-safe queries.
            pub const #const_name: &'static str = #query_name;
        });

        property_arms.push(quote! {
            #query_name => {
                fn read(record: &#struct_name) -> ::querysift::FieldValue<'_> {
                    ::querysift::FieldType::field_value(&record.#field_name)
                }
                ::core::option::Option::Some(::querysift::Property::new(
                    #query_name,
                    <#field_ty as ::querysift::FieldType>::DESCRIPTOR,
                    read,
                ))
            }
        });

        property_names.push(query_name);
    }

    let expanded = quote! {
        impl #struct_name {
            #(#property_constants)*
        }

        impl ::querysift::Record for #struct_name {
            fn property(name: &str) -> ::core::option::Option<::querysift::Property<Self>> {
                match name {
                    #(#property_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            fn property_names() -> &'static [&'static str] {
                &[#(#property_names),*]
            }
        }
    };

    Ok(expanded)
}

/// Convert a string to SCREAMING_SNAKE_CASE.
fn to_screaming_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_was_lower = false;

    for c in s.chars() {
        if c.is_uppercase() {
            if prev_was_lower {
                result.push('_');
            }
            result.push(c);
            prev_was_lower = false;
        } else if c.is_ascii_alphanumeric() {
            result.push(c.to_ascii_uppercase());
            prev_was_lower = c.is_ascii_lowercase();
        } else {
            // '_', '-', spaces and anything else not valid in an identifier
            if !result.ends_with('_') {
                result.push('_');
            }
            prev_was_lower = false;
        }
    }

    if result.starts_with(|c: char| c.is_ascii_digit()) {
        result.insert(0, '_');
    }
    result
}
