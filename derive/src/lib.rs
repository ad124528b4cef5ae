// Copyright 2021 Dmitry Tantsur <dtantsur@protonmail.com>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Derive macros for `osroute`.

use convert_case::{Case, Casing};
use proc_macro::TokenStream;
use quote::quote;

/// Derive `Resource` and, if a field is marked with `#[resource_id]`, `MarkerResource`.
#[proc_macro_derive(Resource, attributes(resource_id, collection_name))]
pub fn resource_macro_derive(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as syn::DeriveInput);

    let class_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let collection_name = match get_collection_name(&input) {
        Ok(name) => name,
        Err(err) => return err.into_compile_error().into(),
    };
    let maybe_id = match get_id_field(&input) {
        Ok(tpl) => tpl,
        Err(err) => return err.into_compile_error().into(),
    };

    let resource = quote! {
        #[allow(missing_docs, unused)]
        impl #impl_generics ::osroute::Resource for #class_name #ty_generics #where_clause {
            fn collection_name() -> &'static str {
                #collection_name
            }
        }
    };

    if let Some((id_name, id_type)) = maybe_id {
        quote! {
            #resource

            #[allow(missing_docs, unused)]
            impl #impl_generics ::osroute::MarkerResource for #class_name #ty_generics #where_clause {
                type Id = #id_type;
                fn resource_id(&self) -> Self::Id {
                    self.#id_name.clone()
                }
            }
        }
    } else {
        resource
    }
    .into()
}

/// Derive `QueryItem` for an enum with single-field variants.
///
/// The key is the snake-case variant name unless overridden with `#[query_item = "key"]`.
/// Values are converted using `Display`.
#[proc_macro_derive(QueryItem, attributes(query_item))]
pub fn query_item_macro_derive(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as syn::DeriveInput);

    let class_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let variants = match input.data {
        syn::Data::Enum(ref en) => &en.variants,
        _ => {
            return syn::Error::new_spanned(&input, "only enums are supported for derive(QueryItem)")
                .into_compile_error()
                .into()
        }
    };

    let mut arms = Vec::new();
    for variant in variants {
        match variant.fields {
            syn::Fields::Unnamed(ref fs) if fs.unnamed.len() == 1 => {}
            _ => {
                return syn::Error::new_spanned(
                    variant,
                    "only variants with exactly one unnamed field are supported",
                )
                .into_compile_error()
                .into()
            }
        }

        let key = match get_string_attr(&variant.attrs, "query_item") {
            Ok(Some(key)) => key,
            Ok(None) => variant.ident.to_string().to_case(Case::Snake),
            Err(err) => return err.into_compile_error().into(),
        };
        let ident = &variant.ident;
        arms.push(quote! {
            #class_name::#ident(value) => (
                #key,
                ::std::borrow::Cow::Owned(::std::string::ToString::to_string(value)),
            ),
        });
    }

    quote! {
        #[allow(missing_docs, unused)]
        impl #impl_generics ::osroute::QueryItem for #class_name #ty_generics #where_clause {
            fn query_item(
                &self,
            ) -> ::std::result::Result<(&str, ::std::borrow::Cow<str>), ::osroute::Error> {
                Ok(match self {
                    #(#arms)*
                })
            }
        }
    }
    .into()
}

fn has_attr(attrs: &[syn::Attribute], attr: &str) -> bool {
    attrs.iter().any(|x| x.path.is_ident(attr))
}

fn get_string_attr(attrs: &[syn::Attribute], name: &str) -> syn::Result<Option<String>> {
    for attr in attrs {
        if !attr.path.is_ident(name) {
            continue;
        }
        return match attr.parse_meta()? {
            syn::Meta::NameValue(syn::MetaNameValue {
                lit: syn::Lit::Str(s),
                ..
            }) => Ok(Some(s.value())),
            _ => Err(syn::Error::new_spanned(
                attr,
                format!("{} must be a string, e.g. #[{} = \"value\"]", name, name),
            )),
        };
    }
    Ok(None)
}

fn get_id_field(input: &syn::DeriveInput) -> syn::Result<Option<(&syn::Ident, &syn::Type)>> {
    if let syn::Data::Struct(ref st) = input.data {
        if let syn::Fields::Named(ref fs) = st.fields {
            for field in &fs.named {
                if has_attr(&field.attrs, "resource_id") {
                    return match field.ident {
                        Some(ref ident) => Ok(Some((ident, &field.ty))),
                        None => Err(syn::Error::new_spanned(field, "no ident for resource_id")),
                    };
                }
            }
            Ok(None)
        } else {
            Err(syn::Error::new_spanned(
                input,
                "only named fields are supported for derive(Resource)",
            ))
        }
    } else {
        Err(syn::Error::new_spanned(
            input,
            "only structs are supported for derive(Resource)",
        ))
    }
}

fn get_collection_name(input: &syn::DeriveInput) -> syn::Result<String> {
    if let Some(name) = get_string_attr(&input.attrs, "collection_name")? {
        return Ok(name);
    }

    let ident = input.ident.to_string().to_case(Case::Snake);
    Ok(if ident.ends_with('s') {
        format!("{}es", ident)
    } else {
        format!("{}s", ident)
    })
}
